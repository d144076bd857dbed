use axum::{
    extract::{Query, State},
    routing::{get, put},
    Json, Router,
};
use reservas_core::{FilterField, FilterScope, ShellState, View};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct SwitchViewRequest {
    view: View,
}

/// One form control change, e.g. `{"field": "capacidad", "value": "20"}`.
#[derive(Debug, Deserialize)]
struct FilterEditRequest {
    field: String,
    #[serde(default)]
    value: String,
    #[serde(default)]
    scope: FilterScope,
}

#[derive(Debug, Deserialize)]
struct ScopeQuery {
    #[serde(default)]
    scope: FilterScope,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/shell", get(snapshot))
        .route("/v1/shell/view", put(switch_view))
        .route("/v1/shell/filters", put(edit_filter).delete(clear_filters))
}

async fn snapshot(State(state): State<AppState>) -> Json<ShellState> {
    Json(state.shell.snapshot().await)
}

async fn switch_view(
    State(state): State<AppState>,
    Json(req): Json<SwitchViewRequest>,
) -> Json<ShellState> {
    Json(state.shell.switch_view(req.view).await)
}

async fn edit_filter(
    State(state): State<AppState>,
    Json(req): Json<FilterEditRequest>,
) -> Result<Json<ShellState>, AppError> {
    let field: FilterField = req.field.parse().map_err(AppError::from_core)?;
    let snapshot = state
        .shell
        .edit_filter(req.scope, field, &req.value)
        .await
        .map_err(AppError::from_core)?;
    Ok(Json(snapshot))
}

async fn clear_filters(
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
) -> Json<ShellState> {
    Json(state.shell.clear_filters(query.scope).await)
}
