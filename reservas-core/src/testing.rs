use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reservas_shared::{CreateReservationRequest, CreatedReservation, Reservation, Space};

use crate::filters::{SpaceFilter, SpaceQuery};
use crate::gateway::{GatewayError, GatewayResult, ReservationGateway, SpaceGateway};

/// In-memory backend double.
#[derive(Default)]
pub struct FakeBackend {
    spaces: Mutex<Vec<Space>>,
    reservations: Mutex<Vec<Reservation>>,
    create_calls: AtomicUsize,
    create_failure: Mutex<Option<GatewayError>>,
    list_failure: Mutex<Option<GatewayError>>,
    list_delays: Mutex<VecDeque<Duration>>,
}

impl FakeBackend {
    pub fn with_spaces(spaces: Vec<Space>) -> Self {
        let backend = Self::default();
        *backend.spaces.lock().unwrap() = spaces;
        backend
    }

    pub fn with_reservations(reservations: Vec<Reservation>) -> Self {
        let backend = Self::default();
        *backend.reservations.lock().unwrap() = reservations;
        backend
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn fail_creates(&self, err: GatewayError) {
        *self.create_failure.lock().unwrap() = Some(err);
    }

    pub fn fail_listings(&self, err: Option<GatewayError>) {
        *self.list_failure.lock().unwrap() = err;
    }

    /// Each listing call pops the next delay, if any.
    pub fn delay_listings(&self, delays: &[Duration]) {
        self.list_delays.lock().unwrap().extend(delays.iter().copied());
    }

    async fn listing_gate(&self) -> GatewayResult<()> {
        let delay = self.list_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.list_failure.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SpaceGateway for FakeBackend {
    async fn list_spaces(&self, query: &SpaceQuery) -> GatewayResult<Vec<Space>> {
        self.listing_gate().await?;
        let spaces = self.spaces.lock().unwrap();
        Ok(spaces
            .iter()
            .filter(|s| query.filter.site.as_ref().map_or(true, |site| &s.site == site))
            .cloned()
            .collect())
    }

    async fn get_space(&self, id: &str) -> GatewayResult<Option<Space>> {
        Ok(self.spaces.lock().unwrap().iter().find(|s| s.id == id).cloned())
    }
}

#[async_trait]
impl ReservationGateway for FakeBackend {
    async fn create_reservation(
        &self,
        _request: &CreateReservationRequest,
    ) -> GatewayResult<CreatedReservation> {
        let n = self.create_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(err) = self.create_failure.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(CreatedReservation {
            id: format!("R-{n}"),
            created_at: Some("2024-04-30T12:00:00".into()),
            start: None,
            end: None,
        })
    }

    async fn cancel_reservation(&self, id: &str) -> GatewayResult<Option<serde_json::Value>> {
        let mut rows = self.reservations.lock().unwrap();
        match rows.iter().position(|r| r.id == id) {
            Some(idx) => {
                let removed = rows.remove(idx);
                Ok(Some(serde_json::json!({ "id": removed.id })))
            }
            None => Err(GatewayError::rejected(Some(404), Some("Reserva no encontrada".into()))),
        }
    }

    async fn list_reservations(&self, _filter: &SpaceFilter) -> GatewayResult<Vec<Reservation>> {
        self.listing_gate().await?;
        Ok(self.reservations.lock().unwrap().clone())
    }
}
