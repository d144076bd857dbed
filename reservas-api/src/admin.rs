use axum::{
    extract::{Path, Query, State},
    routing::{delete, get},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use reservas_core::admin::{self, CANCELLED_NOTICE, CANCEL_FAILED_NOTICE, LOAD_RESERVATIONS_FAILED_NOTICE};
use reservas_core::SpaceFilter;
use reservas_shared::Reservation;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct DayBoardResponse {
    pub day: NaiveDate,
    pub total: usize,
    pub rows: Vec<Reservation>,
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub notice: &'static str,
    /// Set when the cancellation went through but the list could not be reloaded.
    pub warning: Option<&'static str>,
    pub day: NaiveDate,
    pub rows: Vec<Reservation>,
}

#[derive(Debug, Serialize)]
pub struct MyReservationsResponse {
    pub user_id: String,
    pub rows: Vec<Reservation>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/reservations", get(day_board))
        .route("/v1/admin/reservations/{id}", delete(cancel_reservation))
        .route("/v1/me/reservations", get(my_reservations))
}

// ============================================================================
// Admin calendar
// ============================================================================

/// GET /v1/admin/reservations?date=YYYY-MM-DD
///
/// A given date becomes the selected day; without one the last selected day
/// (or today) is shown.
async fn day_board(
    State(state): State<AppState>,
    Query(query): Query<DayQuery>,
) -> Result<Json<DayBoardResponse>, AppError> {
    let snapshot = match query.date {
        Some(day) => state.shell.set_admin_day(day).await,
        None => state.shell.snapshot().await,
    };
    let day = snapshot.admin_day.unwrap_or_else(|| Local::now().date_naive());

    let all = state
        .shell
        .admin
        .refresh(state.reservations.as_ref(), &snapshot.admin_filters)
        .await
        .map_err(|_| AppError::UpstreamError(LOAD_RESERVATIONS_FAILED_NOTICE.to_string()))?;

    let rows = admin::on_day(&all, day);
    Ok(Json(DayBoardResponse {
        day,
        total: all.len(),
        rows,
    }))
}

/// DELETE /v1/admin/reservations/{id}
async fn cancel_reservation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CancelResponse>, AppError> {
    let snapshot = state.shell.snapshot().await;
    let day = snapshot.admin_day.unwrap_or_else(|| Local::now().date_naive());

    let outcome = state
        .shell
        .admin
        .cancel(state.reservations.as_ref(), &id, &snapshot.admin_filters)
        .await
        .map_err(|e| AppError::from_gateway(e, CANCEL_FAILED_NOTICE))?;

    Ok(Json(CancelResponse {
        notice: CANCELLED_NOTICE,
        warning: outcome.reload_error.map(|_| LOAD_RESERVATIONS_FAILED_NOTICE),
        day,
        rows: admin::on_day(&outcome.rows, day),
    }))
}

// ============================================================================
// Personal reservations
// ============================================================================

/// GET /v1/me/reservations
async fn my_reservations(State(state): State<AppState>) -> Result<Json<MyReservationsResponse>, AppError> {
    let all = state
        .reservations
        .list_reservations(&SpaceFilter::default())
        .await
        .map_err(|_| AppError::UpstreamError(LOAD_RESERVATIONS_FAILED_NOTICE.to_string()))?;

    let mut rows = admin::owned_by(all, &state.identity.id);
    // Rows without a readable start sort first.
    rows.sort_by_key(|r| r.start);

    Ok(Json(MyReservationsResponse {
        user_id: state.identity.id.clone(),
        rows,
    }))
}
