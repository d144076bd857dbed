use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use reservas_shared::Reservation;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::filters::SpaceFilter;
use crate::gateway::{GatewayError, GatewayResult, ReservationGateway};

pub const LOAD_RESERVATIONS_FAILED_NOTICE: &str = "Error al cargar las reservas";
pub const CANCEL_FAILED_NOTICE: &str = "Error al cancelar la reserva";
pub const CANCELLED_NOTICE: &str = "Reserva cancelada con éxito";

/// A confirmed cancellation. The reload that follows it may still fail.
#[derive(Debug, Clone, PartialEq)]
pub struct CancelOutcome {
    pub rows: Vec<Reservation>,
    pub reload_error: Option<GatewayError>,
}

/// Every reservation matching the admin filters, as last fetched.
pub struct AdminBoard {
    generation: AtomicU64,
    rows: RwLock<Vec<Reservation>>,
}

impl AdminBoard {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            rows: RwLock::new(Vec::new()),
        }
    }

    pub async fn rows(&self) -> Vec<Reservation> {
        self.rows.read().await.clone()
    }

    /// Rows whose start falls on `day`.
    pub async fn rows_on(&self, day: NaiveDate) -> Vec<Reservation> {
        on_day(&self.rows.read().await, day)
    }

    /// Re-fetches the list. Superseded responses are dropped the same way the
    /// space listing drops them.
    pub async fn refresh(
        &self,
        gateway: &dyn ReservationGateway,
        filter: &SpaceFilter,
    ) -> GatewayResult<Vec<Reservation>> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let result = gateway.list_reservations(filter).await;

        let mut rows = self.rows.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Discarding reservation listing generation {}", generation);
            return Ok(rows.clone());
        }

        let fetched = result.map_err(|e| {
            error!("Reservation listing failed: {}", e);
            e
        })?;
        *rows = fetched.clone();
        Ok(fetched)
    }

    /// Cancels remotely, then reloads. A failed cancellation leaves the
    /// displayed rows exactly as they were. If only the reload fails, the
    /// cancellation still stands: the old rows are kept minus the cancelled one.
    pub async fn cancel(
        &self,
        gateway: &dyn ReservationGateway,
        id: &str,
        filter: &SpaceFilter,
    ) -> GatewayResult<CancelOutcome> {
        info!("Cancelling reservation {}", id);
        gateway.cancel_reservation(id).await.map_err(|e| {
            error!("Cancellation of reservation {} failed: {}", id, e);
            e
        })?;
        info!("Reservation {} cancelled", id);

        match self.refresh(gateway, filter).await {
            Ok(rows) => Ok(CancelOutcome { rows, reload_error: None }),
            Err(e) => {
                warn!("Reload after cancelling {} failed: {}", id, e);
                let mut rows = self.rows.write().await;
                rows.retain(|r| r.id != id);
                Ok(CancelOutcome {
                    rows: rows.clone(),
                    reload_error: Some(e),
                })
            }
        }
    }
}

impl Default for AdminBoard {
    fn default() -> Self {
        Self::new()
    }
}

pub fn on_day(rows: &[Reservation], day: NaiveDate) -> Vec<Reservation> {
    rows.iter()
        .filter(|r| r.start.is_some_and(|s| s.date() == day))
        .cloned()
        .collect()
}

/// The "my reservations" view: rows owned by `user_id`.
pub fn owned_by(rows: Vec<Reservation>, user_id: &str) -> Vec<Reservation> {
    rows.into_iter().filter(|r| r.owner_id() == Some(user_id)).collect()
}
