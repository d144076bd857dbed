use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use reservas_core::results::{LOAD_FAILED_NOTICE, NO_RESULTS_NOTICE};
use reservas_core::{FilterOptions, LoadOutcome, SpaceQuery};
use reservas_shared::Space;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct CatalogQuery {
    page: Option<usize>,
}

#[derive(Debug, Serialize)]
struct CatalogResponse {
    page: usize,
    has_next: bool,
    /// True when a newer query overtook this one and the body is the newer page.
    superseded: bool,
    notice: Option<&'static str>,
    items: Vec<Space>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/catalog", get(catalog_page))
        .route("/v1/filters/options", get(filter_options))
}

/// GET /v1/catalog?page=N
///
/// A given `page` is stored as the shell's current page before loading, the
/// same as clicking a pagination button. Without it the stored page is loaded.
async fn catalog_page(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<CatalogResponse>, AppError> {
    let snapshot = match query.page {
        Some(page) => state.shell.set_page(page).await,
        None => state.shell.snapshot().await,
    };

    let outcome = state
        .shell
        .results
        .load(state.spaces.as_ref(), &snapshot.filters, snapshot.page)
        .await
        .map_err(|_| AppError::UpstreamError(LOAD_FAILED_NOTICE.to_string()))?;

    let superseded = matches!(outcome, LoadOutcome::Superseded(_));
    let Some(page) = outcome.page().cloned() else {
        return Err(AppError::UpstreamError(LOAD_FAILED_NOTICE.to_string()));
    };

    Ok(Json(CatalogResponse {
        page: page.page,
        has_next: page.has_next,
        superseded,
        notice: page.items.is_empty().then_some(NO_RESULTS_NOTICE),
        items: page.items,
    }))
}

/// GET /v1/filters/options
async fn filter_options(State(state): State<AppState>) -> Result<Json<FilterOptions>, AppError> {
    let spaces = state
        .spaces
        .list_spaces(&SpaceQuery::unfiltered())
        .await
        .map_err(|e| {
            error!("Failed to load filter options: {}", e);
            AppError::UpstreamError(LOAD_FAILED_NOTICE.to_string())
        })?;
    Ok(Json(FilterOptions::from_spaces(&spaces)))
}
