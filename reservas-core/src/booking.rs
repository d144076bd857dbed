//! Booking session for one space: pick a day, pick hours or a preset
//! period, name the reservation, submit.

use chrono::NaiveDate;
use reservas_shared::{CreateReservationRequest, ReservationDetails, Space};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::availability::{hour_grid, CoworkingPeriod, HourSelection, HourSlot, Interval, Occupancy, PERIODS};
use crate::gateway::{GatewayError, ReservationGateway};
use crate::{CoreError, CoreResult};

pub const SUBMIT_FAILED_NOTICE: &str = "Hubo un error al crear la reserva. Por favor, intente nuevamente.";

#[derive(Debug, Deserialize, Clone)]
pub struct BookingRules {
    #[serde(default = "default_first_hour")]
    pub first_hour: u32,
    #[serde(default = "default_last_hour")]
    pub last_hour: u32,
    #[serde(default = "default_period_types")]
    pub period_resource_types: Vec<String>,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_equipment")]
    pub default_equipment: Vec<String>,
    #[serde(default = "default_comment")]
    pub default_comment: String,
}

fn default_first_hour() -> u32 { 7 }
fn default_last_hour() -> u32 { 21 }
fn default_period_types() -> Vec<String> { vec!["Sala de reuniones".to_string()] }
fn default_page_size() -> usize { 10 }
fn default_equipment() -> Vec<String> { vec!["Proyector".to_string()] }
fn default_comment() -> String { "Reserva realizada desde el sistema".to_string() }

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            first_hour: default_first_hour(),
            last_hour: default_last_hour(),
            period_resource_types: default_period_types(),
            page_size: default_page_size(),
            default_equipment: default_equipment(),
            default_comment: default_comment(),
        }
    }
}

/// The static user identity attached to every reservation request.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            id: "U001".to_string(),
            name: "Juan Pérez".to_string(),
            email: "juan.perez@example.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodSlot {
    pub id: u8,
    pub name: &'static str,
    pub label: String,
    pub available: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    pub reservation_id: String,
    pub created_at: Option<String>,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] CoreError),
    #[error("{}", SUBMIT_FAILED_NOTICE)]
    Failed(#[source] GatewayError),
}

pub struct BookingSession {
    space: Space,
    rules: BookingRules,
    occupancy: Occupancy,
    date: NaiveDate,
    hours: HourSelection,
    period: Option<CoworkingPeriod>,
    range: Option<Interval>,
    title: String,
    description: String,
    open: bool,
}

impl BookingSession {
    pub fn open(space: Space, rules: BookingRules, date: NaiveDate) -> Self {
        let occupancy = Occupancy::from_reservations(&space.reservations);
        Self {
            space,
            rules,
            occupancy,
            date,
            hours: HourSelection::default(),
            period: None,
            range: None,
            title: String::new(),
            description: String::new(),
            open: true,
        }
    }

    pub fn space(&self) -> &Space {
        &self.space
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Spaces of a period resource type are booked by preset, not by the hour.
    pub fn uses_periods(&self) -> bool {
        self.rules
            .period_resource_types
            .iter()
            .any(|t| t == &self.space.resource_type)
    }

    /// Picks were vetted against the old day, so moving drops them.
    pub fn set_date(&mut self, date: NaiveDate) {
        if date != self.date {
            self.date = date;
            self.hours.clear();
            self.period = None;
            self.range = None;
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn hour_grid(&self) -> Vec<HourSlot> {
        hour_grid(self.date, self.rules.first_hour, self.rules.last_hour, &self.occupancy)
    }

    pub fn periods(&self) -> Vec<PeriodSlot> {
        PERIODS
            .iter()
            .map(|p| PeriodSlot {
                id: p.id,
                name: p.name,
                label: p.label(),
                available: p
                    .interval_on(self.date)
                    .map(|i| !self.occupancy.is_occupied(&i))
                    .unwrap_or(false),
                selected: self.period.map(|s| s.id) == Some(p.id),
            })
            .collect()
    }

    pub fn selected_hours(&self) -> &HourSelection {
        &self.hours
    }

    /// Occupied hours behave like disabled buttons and cannot be picked.
    pub fn toggle_hour(&mut self, hour: u32) -> CoreResult<()> {
        if hour < self.rules.first_hour || hour > self.rules.last_hour {
            return Err(CoreError::HourOutOfRange(hour));
        }
        if !self.hours.contains(hour) {
            self.occupancy.vet(&Interval::hour(self.date, hour)?)?;
        }
        self.hours.toggle(hour)
    }

    pub fn select_period(&mut self, id: u8) -> CoreResult<()> {
        let period = CoworkingPeriod::find(id)?;
        self.occupancy.vet(&period.interval_on(self.date)?)?;
        self.period = Some(period);
        Ok(())
    }

    /// Free drag selection on the calendar.
    pub fn select_range(&mut self, candidate: Interval) -> CoreResult<()> {
        self.occupancy.vet(&candidate)?;
        self.range = Some(candidate);
        Ok(())
    }

    pub fn selected_range(&self) -> Option<Interval> {
        self.range
    }

    pub fn is_free(&self, candidate: &Interval) -> bool {
        !self.occupancy.is_occupied(candidate)
    }

    /// The booking window: the chosen period for preset spaces, otherwise the
    /// hour run extended one hour past its last hour.
    pub fn window(&self) -> CoreResult<Interval> {
        if self.uses_periods() {
            let period = self.period.ok_or(CoreError::MissingPeriod)?;
            return period.interval_on(self.date);
        }
        self.hours.window(self.date)?.ok_or(CoreError::MissingHours)
    }

    /// Builds the creation request. Nothing is sent.
    pub fn draft(&self, identity: &Identity) -> CoreResult<CreateReservationRequest> {
        if self.title.trim().is_empty() {
            return Err(CoreError::MissingTitle);
        }
        let window = self.window()?;

        Ok(CreateReservationRequest {
            space_id: self.space.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            start: window.start,
            end: window.end,
            user_id: identity.id.clone(),
            user_name: identity.name.clone(),
            user_email: identity.email.clone(),
            details: ReservationDetails {
                equipment: self.rules.default_equipment.clone(),
                comments: self.rules.default_comment.clone(),
            },
        })
    }

    /// Validates locally, then issues exactly one creation call.
    ///
    /// On success the session closes. On failure it stays open with every
    /// selection intact so the operator can retry by hand.
    pub async fn submit(
        &mut self,
        gateway: &dyn ReservationGateway,
        identity: &Identity,
    ) -> Result<Confirmation, SubmitError> {
        let request = self.draft(identity)?;
        info!(
            "Submitting reservation for space {} from {} to {}",
            request.space_id, request.start, request.end
        );

        let created = gateway.create_reservation(&request).await.map_err(|e| {
            error!("Reservation for space {} failed: {}", request.space_id, e);
            SubmitError::Failed(e)
        })?;

        info!("Reservation created: {} (created_at {:?})", created.id, created.created_at);
        self.open = false;

        Ok(Confirmation {
            reservation_id: created.id,
            created_at: created.created_at,
            message: format!(
                "Reserva confirmada con éxito para el día {} de {} a {}",
                self.date.format("%d/%m/%Y"),
                request.start.format("%H:%M"),
                request.end.format("%H:%M"),
            ),
        })
    }
}
