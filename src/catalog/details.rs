//! Single-game details view
//!
//! Loads one game's full record and tracks the loading flag, the last error
//! and whether the description is expanded.

use super::model::GameDetails;
use super::source::RawgSource;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, warn};

/// Shown when a load fails with an error that has no message
const LOAD_FAILED: &str = "Failed to load game details";

/// Anything that can fetch one game's full record
#[async_trait]
pub trait DetailsSource: Send + Sync {
    async fn fetch_details(&self, id: u64) -> Result<GameDetails>;
}

#[async_trait]
impl DetailsSource for RawgSource {
    async fn fetch_details(&self, id: u64) -> Result<GameDetails> {
        RawgSource::fetch_details(self, id).await
    }
}

/// Point-in-time view of a details session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailsState {
    /// Game most recently requested
    pub game_id: Option<u64>,
    pub details: Option<GameDetails>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub description_expanded: bool,
}

/// Loads and holds the details of one game at a time
pub struct DetailsSession {
    source: Box<dyn DetailsSource>,
    state_tx: watch::Sender<DetailsState>,
    /// Bumped per load so an older response cannot overwrite a newer one
    request: AtomicU64,
}

impl DetailsSession {
    pub fn new(source: impl DetailsSource + 'static) -> Self {
        let (state_tx, _) = watch::channel(DetailsState::default());
        Self {
            source: Box::new(source),
            state_tx,
            request: AtomicU64::new(0),
        }
    }

    /// Fetch the details of `id`, replacing whatever was shown
    pub async fn load(&self, id: u64) -> DetailsState {
        let request = self.request.fetch_add(1, Ordering::SeqCst) + 1;
        self.state_tx.send_modify(|state| {
            state.game_id = Some(id);
            state.is_loading = true;
            state.error = None;
        });

        let result = self.source.fetch_details(id).await;
        if self.request.load(Ordering::SeqCst) != request {
            debug!(id, "discarding superseded details response");
            return self.state();
        }

        self.state_tx.send_modify(|state| {
            state.is_loading = false;
            match result {
                Ok(details) => state.details = Some(details),
                Err(e) => {
                    warn!(id, error = %e, "failed to load game details");
                    let message = e.to_string();
                    state.error = Some(if message.is_empty() {
                        LOAD_FAILED.to_string()
                    } else {
                        message
                    });
                }
            }
        });
        self.state()
    }

    /// Reload the most recently requested game
    ///
    /// Returns `None` when nothing has been requested yet.
    pub async fn retry(&self) -> Option<DetailsState> {
        let id = self.state_tx.borrow().game_id?;
        Some(self.load(id).await)
    }

    /// Flip between the collapsed and the full description
    pub fn toggle_description(&self) {
        self.state_tx
            .send_modify(|state| state.description_expanded = !state.description_expanded);
    }

    pub fn state(&self) -> DetailsState {
        self.state_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailsState> {
        self.state_tx.subscribe()
    }
}

impl std::fmt::Debug for DetailsSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetailsSession")
            .field("state", &*self.state_tx.borrow())
            .finish_non_exhaustive()
    }
}
