//! Pagination types
//!
//! Defines the externally observed pagination state and the cursor settings
//! shared by the engine and the configuration layer.

use crate::error::{Error, Result};
use crate::types::PageKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Observable status of a paginator
#[derive(Debug, Clone, Default)]
pub enum PaginationState {
    /// No fetch in flight, more pages may exist
    #[default]
    Idle,
    /// Fetch in flight for the initial page key
    InitialLoading,
    /// Fetch in flight for a subsequent page key
    PageLoading,
    /// Last fetch failed; previously accumulated items are untouched
    Error {
        /// Underlying failure
        cause: Arc<Error>,
        /// Whether `retry()` may re-issue the fetch
        retryable: bool,
    },
    /// Last fetch returned an empty page
    EndReached,
}

impl PaginationState {
    /// Create an error state
    pub fn error(cause: Error, retryable: bool) -> Self {
        Self::Error {
            cause: Arc::new(cause),
            retryable,
        }
    }

    /// Check if no fetch is in flight and more pages may exist
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Check if a fetch is in flight
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::InitialLoading | Self::PageLoading)
    }

    /// Check if the last fetch failed
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Check if the end of the catalog was reached
    pub fn is_end_reached(&self) -> bool {
        matches!(self, Self::EndReached)
    }

    /// Get the failure cause, if any
    pub fn cause(&self) -> Option<&Error> {
        match self {
            Self::Error { cause, .. } => Some(cause),
            _ => None,
        }
    }

    /// Check if this is a retryable error
    pub fn can_retry(&self) -> bool {
        matches!(
            self,
            Self::Error {
                retryable: true,
                ..
            }
        )
    }

    /// Short name of the variant, for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::InitialLoading => "initial_loading",
            Self::PageLoading => "page_loading",
            Self::Error { .. } => "error",
            Self::EndReached => "end_reached",
        }
    }
}

impl PartialEq for PaginationState {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::Error {
                    cause: a,
                    retryable: ra,
                },
                Self::Error {
                    cause: b,
                    retryable: rb,
                },
            ) => ra == rb && (Arc::ptr_eq(a, b) || a.to_string() == b.to_string()),
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl fmt::Display for PaginationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error { cause, .. } => write!(f, "error: {cause}"),
            other => f.write_str(other.name()),
        }
    }
}

/// Cursor settings for a paginator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatorConfig {
    /// First page key (usually 0 or 1)
    #[serde(default = "default_initial_key")]
    pub initial_key: PageKey,
    /// Amount the key advances after each non-empty page
    #[serde(default = "default_increment")]
    pub increment: PageKey,
}

fn default_initial_key() -> PageKey {
    1
}

fn default_increment() -> PageKey {
    1
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            initial_key: default_initial_key(),
            increment: default_increment(),
        }
    }
}

impl PaginatorConfig {
    /// Create cursor settings
    pub fn new(initial_key: PageKey, increment: PageKey) -> Self {
        Self {
            initial_key,
            increment,
        }
    }

    /// Reject settings under which the cursor could not advance
    pub fn validate(&self) -> Result<()> {
        if self.increment == 0 {
            return Err(Error::invalid_value(
                "pagination.increment",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}
