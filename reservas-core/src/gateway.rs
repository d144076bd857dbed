use async_trait::async_trait;
use reservas_shared::{CreateReservationRequest, CreatedReservation, Reservation, Space};

use crate::filters::{SpaceFilter, SpaceQuery};

/// Remote failures. Nothing here is retried; callers turn these into notices.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    #[error("Transport failure: {0}")]
    Transport(String),
    #[error("Rejected by backend: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: Option<u16>,
        message: Option<String>,
    },
    #[error("Undecodable response: {0}")]
    Decode(String),
    /// An id that cannot name a single backend resource (empty, `.` or `..`).
    #[error("Invalid identifier: {0:?}")]
    InvalidId(String),
}

impl GatewayError {
    pub fn rejected(status: Option<u16>, message: Option<String>) -> Self {
        GatewayError::Rejected { status, message }
    }

    /// Server-provided message when there is one, otherwise `fallback`.
    pub fn notice(&self, fallback: &str) -> String {
        match self {
            GatewayError::Rejected { message: Some(m), .. } if !m.trim().is_empty() => m.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Rejected { status, .. } => *status,
            _ => None,
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Read access to the space catalogue.
#[async_trait]
pub trait SpaceGateway: Send + Sync {
    async fn list_spaces(&self, query: &SpaceQuery) -> GatewayResult<Vec<Space>>;

    async fn get_space(&self, id: &str) -> GatewayResult<Option<Space>>;
}

/// Reservation lifecycle calls. All state transitions happen on the backend.
#[async_trait]
pub trait ReservationGateway: Send + Sync {
    async fn create_reservation(
        &self,
        request: &CreateReservationRequest,
    ) -> GatewayResult<CreatedReservation>;

    /// Returns whatever the backend echoes back about the cancelled reservation.
    async fn cancel_reservation(&self, id: &str) -> GatewayResult<Option<serde_json::Value>>;

    async fn list_reservations(&self, filter: &SpaceFilter) -> GatewayResult<Vec<Reservation>>;
}
