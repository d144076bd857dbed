use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate, NaiveDateTime};
use reservas_core::booking::SUBMIT_FAILED_NOTICE;
use reservas_core::{BookingSession, Confirmation, CoreError, HourSlot, Interval, PeriodSlot, SubmitError};
use reservas_shared::codec;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct DateQuery {
    date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum SelectionMode {
    Hours,
    Periods,
}

#[derive(Debug, Serialize)]
struct CalendarEvent {
    id: String,
    title: String,
    #[serde(with = "codec::wire")]
    start: NaiveDateTime,
    #[serde(with = "codec::wire")]
    end: NaiveDateTime,
    desc: String,
    status: Option<String>,
}

#[derive(Debug, Serialize)]
struct AvailabilityResponse {
    space_id: String,
    date: NaiveDate,
    mode: SelectionMode,
    hours: Vec<HourSlot>,
    periods: Vec<PeriodSlot>,
    events: Vec<CalendarEvent>,
}

#[derive(Debug, Deserialize)]
struct RangeCheckRequest {
    #[serde(with = "codec::wire")]
    start: NaiveDateTime,
    #[serde(with = "codec::wire")]
    end: NaiveDateTime,
}

#[derive(Debug, Serialize)]
struct RangeCheckResponse {
    available: bool,
    notice: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BookingRequest {
    date: NaiveDate,
    #[serde(default)]
    hours: Vec<String>,
    period: Option<u8>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/spaces/{id}/availability", get(availability))
        .route("/v1/spaces/{id}/availability/check", post(check_range))
        .route("/v1/spaces/{id}/reservations", post(book))
}

async fn open_session(state: &AppState, id: &str, date: NaiveDate) -> Result<BookingSession, AppError> {
    let space = state
        .spaces
        .get_space(id)
        .await
        .map_err(|e| AppError::from_gateway(e, "Error al cargar el espacio"))?
        .ok_or_else(|| AppError::NotFoundError(format!("Espacio no encontrado: {id}")))?;
    Ok(BookingSession::open(space, state.booking.clone(), date))
}

/// GET /v1/spaces/{id}/availability?date=YYYY-MM-DD
async fn availability(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DateQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let date = query.date.unwrap_or_else(|| Local::now().date_naive());
    let session = open_session(&state, &id, date).await?;

    let (mode, hours, periods) = if session.uses_periods() {
        (SelectionMode::Periods, Vec::new(), session.periods())
    } else {
        (SelectionMode::Hours, session.hour_grid(), Vec::new())
    };

    let events = session
        .space()
        .reservations
        .iter()
        .filter_map(|r| {
            let (start, end) = r.bounds()?;
            Some(CalendarEvent {
                id: r.id.clone(),
                title: r.title.clone(),
                start,
                end,
                desc: r.booked_by(),
                status: r.status.clone(),
            })
        })
        .collect();

    Ok(Json(AvailabilityResponse {
        space_id: id,
        date,
        mode,
        hours,
        periods,
        events,
    }))
}

/// POST /v1/spaces/{id}/availability/check
async fn check_range(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RangeCheckRequest>,
) -> Result<Json<RangeCheckResponse>, AppError> {
    let candidate = Interval::new(req.start, req.end).map_err(AppError::from_core)?;
    let mut session = open_session(&state, &id, req.start.date()).await?;

    Ok(Json(match session.select_range(candidate) {
        Ok(()) => RangeCheckResponse { available: true, notice: None },
        Err(e) => RangeCheckResponse { available: false, notice: Some(e.to_string()) },
    }))
}

/// Accepts the button labels (`"09:00"`) as well as bare hours (`"9"`).
fn parse_hour(raw: &str) -> Result<u32, CoreError> {
    let hour = raw.split(':').next().unwrap_or_default().trim();
    hour.parse()
        .map_err(|_| CoreError::ValidationError(format!("invalid hour: {raw}")))
}

/// POST /v1/spaces/{id}/reservations
async fn book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<BookingRequest>,
) -> Result<(StatusCode, Json<Confirmation>), AppError> {
    // Checked before anything leaves the process, including the space lookup.
    if req.title.trim().is_empty() {
        return Err(AppError::from_core(CoreError::MissingTitle));
    }

    let mut hours = req
        .hours
        .iter()
        .map(|h| parse_hour(h))
        .collect::<Result<Vec<u32>, _>>()
        .map_err(AppError::from_core)?;
    hours.sort_unstable();
    hours.dedup();

    let mut session = open_session(&state, &id, req.date).await?;
    session.set_title(req.title);
    session.set_description(req.description);

    if session.uses_periods() {
        if let Some(period) = req.period {
            session.select_period(period).map_err(AppError::from_core)?;
        }
    } else {
        for hour in hours {
            session.toggle_hour(hour).map_err(AppError::from_core)?;
        }
    }

    match session.submit(state.reservations.as_ref(), &state.identity).await {
        Ok(confirmation) => {
            info!("Reservation {} confirmed for space {}", confirmation.reservation_id, id);
            Ok((StatusCode::CREATED, Json(confirmation)))
        }
        Err(SubmitError::Invalid(e)) => Err(AppError::from_core(e)),
        Err(SubmitError::Failed(_)) => Err(AppError::UpstreamError(SUBMIT_FAILED_NOTICE.to_string())),
    }
}
