//! Pagination module
//!
//! # Overview
//!
//! The pagination module provides a generic, single-flight state machine that
//! fetches pages from a [`PageSource`](crate::source::PageSource) one at a
//! time, advancing an integer page key after every non-empty page and
//! reporting its progress as a [`PaginationState`].
//!
//! ```text
//!            load_next                 non-empty page
//!   Idle ───────────────► Loading ─────────────────────► Idle (key += increment)
//!    ▲                      │   │
//!    │ retry                │   └──── empty page ──────► EndReached
//!    └─────── Error ◄───────┘ failure
//! ```

mod paginator;
mod types;

pub use paginator::{ObserverId, Paginator, PaginatorBuilder};
pub use types::{PaginationState, PaginatorConfig};
