use std::sync::atomic::{AtomicU64, Ordering};

use reservas_shared::Space;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::filters::{SpaceFilter, SpaceQuery};
use crate::gateway::{GatewayResult, SpaceGateway};

pub const LOAD_FAILED_NOTICE: &str = "Error al cargar los datos. Por favor, inténtalo de nuevo.";
pub const NO_RESULTS_NOTICE: &str = "No se encontraron resultados para los filtros seleccionados.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpacePage {
    pub page: usize,
    pub filter: SpaceFilter,
    pub items: Vec<Space>,
    pub has_next: bool,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// This request was the newest; its page is now current.
    Fresh(SpacePage),
    /// A newer request was issued while this one was in flight. Carries
    /// whatever page is current, if any.
    Superseded(Option<SpacePage>),
}

impl LoadOutcome {
    pub fn page(&self) -> Option<&SpacePage> {
        match self {
            LoadOutcome::Fresh(page) => Some(page),
            LoadOutcome::Superseded(page) => page.as_ref(),
        }
    }
}

/// Paged results of the space listing.
///
/// Every load takes a generation number. A response only becomes current
/// if no newer load was started meanwhile, so a slow query can never
/// overwrite the answer to a later one. The last committed page stays
/// readable while a load is in flight.
pub struct ResultsView {
    page_size: usize,
    generation: AtomicU64,
    current: RwLock<Option<SpacePage>>,
}

impl ResultsView {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            generation: AtomicU64::new(0),
            current: RwLock::new(None),
        }
    }

    pub async fn current(&self) -> Option<SpacePage> {
        self.current.read().await.clone()
    }

    pub async fn load(
        &self,
        gateway: &dyn SpaceGateway,
        filter: &SpaceFilter,
        page: usize,
    ) -> GatewayResult<LoadOutcome> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = SpaceQuery::page(filter.clone(), page);
        let result = gateway.list_spaces(&query).await;

        let mut current = self.current.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Discarding listing generation {} (page {}), superseded", generation, page);
            return Ok(LoadOutcome::Superseded(current.clone()));
        }

        let items = result.map_err(|e| {
            error!("Space listing failed for page {}: {}", page, e);
            e
        })?;

        let fresh = SpacePage {
            page,
            filter: filter.clone(),
            has_next: self.page_size > 0 && items.len() >= self.page_size,
            items,
            generation,
        };
        *current = Some(fresh.clone());
        Ok(LoadOutcome::Fresh(fresh))
    }
}
