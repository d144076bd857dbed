use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use reservas_core::{CoreError, GatewayError};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    UpstreamError(String),
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl AppError {
    /// Occupied slots are conflicts; every other local rule is a bad request.
    pub fn from_core(err: CoreError) -> Self {
        match err {
            CoreError::SlotOccupied => AppError::ConflictError(err.to_string()),
            other => AppError::ValidationError(other.to_string()),
        }
    }

    /// An id that cannot address a backend resource is not found; any other
    /// remote failure is a 502 carrying the server message or `fallback`.
    pub fn from_gateway(err: GatewayError, fallback: &str) -> Self {
        match err {
            GatewayError::InvalidId(id) => AppError::NotFoundError(format!("Identificador no válido: {id:?}")),
            other => AppError::UpstreamError(other.notice(fallback)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::UpstreamError(msg) => {
                tracing::warn!("Upstream failure surfaced to client: {}", msg);
                (StatusCode::BAD_GATEWAY, msg)
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_errors_map_to_statuses() {
        let bad_id = AppError::from_gateway(GatewayError::InvalidId("..".into()), "Error al cancelar la reserva");
        assert_eq!(bad_id.into_response().status(), StatusCode::NOT_FOUND);

        let refused = AppError::from_gateway(
            GatewayError::rejected(Some(404), Some("Reserva no encontrada".into())),
            "Error al cancelar la reserva",
        );
        assert!(matches!(&refused, AppError::UpstreamError(m) if m == "Reserva no encontrada"));
        assert_eq!(refused.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
