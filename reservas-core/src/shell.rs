use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::admin::AdminBoard;
use crate::filters::{FilterField, SpaceFilter};
use crate::results::ResultsView;
use crate::CoreResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Catalog,
    MyReservations,
    AdminCalendar,
}

/// Which filter set a form edit targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterScope {
    #[default]
    Catalog,
    Admin,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShellState {
    pub view: View,
    pub filters: SpaceFilter,
    pub page: usize,
    pub admin_filters: SpaceFilter,
    pub admin_day: Option<NaiveDate>,
}

/// Top-level UI state for one operator session, shared by reference with
/// every handler instead of living in globals.
pub struct Shell {
    state: RwLock<ShellState>,
    pub results: ResultsView,
    pub admin: AdminBoard,
}

impl Shell {
    pub fn new(page_size: usize) -> Self {
        Self {
            state: RwLock::new(ShellState::default()),
            results: ResultsView::new(page_size),
            admin: AdminBoard::new(),
        }
    }

    pub async fn snapshot(&self) -> ShellState {
        self.state.read().await.clone()
    }

    /// Leaving the admin calendar discards its filters.
    pub async fn switch_view(&self, view: View) -> ShellState {
        let mut state = self.state.write().await;
        if state.view == View::AdminCalendar && view != View::AdminCalendar {
            state.admin_filters.clear();
            state.admin_day = None;
        }
        if state.view != view {
            info!("Switching view {:?} -> {:?}", state.view, view);
        }
        state.view = view;
        state.clone()
    }

    /// Editing a catalogue filter sends the results back to the first page.
    pub async fn edit_filter(&self, scope: FilterScope, field: FilterField, raw: &str) -> CoreResult<ShellState> {
        let mut state = self.state.write().await;
        match scope {
            FilterScope::Catalog => {
                state.filters.apply(field, raw)?;
                state.page = 0;
            }
            FilterScope::Admin => state.admin_filters.apply(field, raw)?,
        }
        Ok(state.clone())
    }

    pub async fn clear_filters(&self, scope: FilterScope) -> ShellState {
        let mut state = self.state.write().await;
        match scope {
            FilterScope::Catalog => {
                state.filters.clear();
                state.page = 0;
            }
            FilterScope::Admin => state.admin_filters.clear(),
        }
        state.clone()
    }

    pub async fn set_page(&self, page: usize) -> ShellState {
        let mut state = self.state.write().await;
        state.page = page;
        state.clone()
    }

    pub async fn set_admin_day(&self, day: NaiveDate) -> ShellState {
        let mut state = self.state.write().await;
        state.admin_day = Some(day);
        state.clone()
    }
}
