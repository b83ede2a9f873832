//! Catalog browsing session
//!
//! Wires a [`Paginator`], an [`AccumulatorStore`] and a [`SearchOverlay`]
//! together and exposes them as actions in and snapshots out.

use super::model::Game;
use super::source::RawgSource;
use crate::config::CatalogConfig;
use crate::error::Result;
use crate::pagination::{PaginationState, Paginator, PaginatorConfig};
use crate::search::SearchOverlay;
use crate::source::PageSource;
use crate::store::AccumulatorStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// User intents a session reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogAction {
    /// Fetch the next page
    LoadMore,
    /// Retry the page that failed
    Retry,
    /// Filter loaded games by name
    Search(String),
    /// Drop the query and close search
    ClearSearch,
    /// Open or close search; closing also drops the query
    ToggleSearch,
    /// Forget everything and fetch the first page again
    Refresh,
}

/// Point-in-time view of a session
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogState {
    /// Games visible under the current query
    pub games: Arc<Vec<Game>>,
    pub pagination: PaginationState,
    pub search_query: String,
    pub search_active: bool,
}

impl CatalogState {
    /// First page is loading
    pub fn is_initial_loading(&self) -> bool {
        matches!(self.pagination, PaginationState::InitialLoading)
    }

    /// A later page is loading
    pub fn is_page_loading(&self) -> bool {
        matches!(self.pagination, PaginationState::PageLoading)
    }

    /// Message of the last failure, if the session is in error
    pub fn error_message(&self) -> Option<String> {
        self.pagination.cause().map(ToString::to_string)
    }

    pub fn can_retry(&self) -> bool {
        self.pagination.can_retry()
    }

    /// More pages can be requested right now
    pub fn can_load_more(&self) -> bool {
        self.pagination.is_idle() && self.search_query.is_empty()
    }

    pub fn end_reached(&self) -> bool {
        self.pagination.is_end_reached()
    }
}

/// A browsing session over a paged games catalog
pub struct CatalogSession {
    paginator: Paginator<Game>,
    overlay: SearchOverlay<Game>,
    search_active: AtomicBool,
}

impl CatalogSession {
    /// Create a session over any games page source
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(source: impl PageSource<Game> + 'static, config: PaginatorConfig) -> Result<Self> {
        let store = AccumulatorStore::new();
        let sink = store.clone();
        let paginator = Paginator::builder(source)
            .config(config)
            .on_success(move |games, _next| sink.append(games))
            .build()?;

        Ok(Self {
            paginator,
            overlay: SearchOverlay::new(store),
            search_active: AtomicBool::new(false),
        })
    }

    /// Create a session over the HTTP catalog described by `config`
    pub fn from_config(config: CatalogConfig) -> Result<Self> {
        let pagination = config.pagination;
        Self::new(RawgSource::new(config)?, pagination)
    }

    /// Request the first page
    pub fn start(&self) -> bool {
        self.paginator.load_next()
    }

    /// Apply a user action
    pub fn dispatch(&self, action: CatalogAction) {
        debug!(?action, "dispatching catalog action");
        match action {
            CatalogAction::LoadMore => {
                // The filtered view does not grow while a query is set
                if self.overlay.is_active() {
                    debug!("load more ignored while searching");
                    return;
                }
                self.paginator.load_next();
            }
            CatalogAction::Retry => {
                self.paginator.retry();
            }
            CatalogAction::Search(query) => self.overlay.set_query(query),
            CatalogAction::ClearSearch => self.clear_search(),
            CatalogAction::ToggleSearch => {
                let was_active = self.search_active.fetch_xor(true, Ordering::SeqCst);
                if was_active {
                    self.clear_search();
                }
            }
            CatalogAction::Refresh => {
                self.paginator.reset();
                self.overlay.store().clear();
                self.paginator.load_next();
            }
        }
    }

    /// Current view of the session
    pub fn snapshot(&self) -> CatalogState {
        CatalogState {
            games: self.overlay.view(),
            pagination: self.paginator.state(),
            search_query: self.overlay.query(),
            search_active: self.search_active.load(Ordering::SeqCst),
        }
    }

    /// Wait until no page is loading and return the view at that point
    pub async fn settled(&self) -> CatalogState {
        self.paginator.settled().await;
        self.snapshot()
    }

    /// Watch pagination state changes
    pub fn subscribe(&self) -> watch::Receiver<PaginationState> {
        self.paginator.subscribe()
    }

    /// Every game loaded so far, ignoring the query
    pub fn loaded(&self) -> Arc<Vec<Game>> {
        self.overlay.store().all()
    }

    pub fn paginator(&self) -> &Paginator<Game> {
        &self.paginator
    }

    fn clear_search(&self) {
        self.overlay.clear_query();
        self.search_active.store(false, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for CatalogSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogSession")
            .field("paginator", &self.paginator)
            .field("overlay", &self.overlay)
            .field("search_active", &self.search_active.load(Ordering::SeqCst))
            .finish()
    }
}
