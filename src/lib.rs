// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # catalog-pager
//!
//! A generic, single-flight pagination engine for remote catalogs, with an
//! ordered deduplicating accumulator and a client-side search overlay.
//!
//! ## Features
//!
//! - **Single-flight Paging**: At most one page fetch in flight, ever
//! - **Observable State**: Idle, loading, error, and end-of-data as a watch channel
//! - **Retry and Reset**: Re-issue a failed page or start over from the first key
//! - **Deduplicating Store**: Arrival order kept, repeated identities dropped
//! - **Search Overlay**: Case-insensitive filtering that never fetches
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use catalog_pager::pagination::Paginator;
//! use catalog_pager::source::from_fn;
//! use catalog_pager::store::AccumulatorStore;
//!
//! #[tokio::main]
//! async fn main() -> catalog_pager::Result<()> {
//!     let store = AccumulatorStore::new();
//!     let sink = store.clone();
//!
//!     let paginator = Paginator::builder(from_fn(|page| async move {
//!         Ok(if page <= 3 { vec![Item::new(page)] } else { vec![] })
//!     }))
//!     .on_success(move |items, _next| sink.append(items))
//!     .build()?;
//!
//!     paginator.load_next();
//!     paginator.settled().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        CatalogSession                           │
//! │  dispatch(action)        snapshot() → CatalogState              │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌───────────────┬──────────────┴──────────┬───────────────────────┐
//! │   Paginator   │   AccumulatorStore      │   SearchOverlay       │
//! ├───────────────┼─────────────────────────┼───────────────────────┤
//! │ load_next     │ append (dedup by id)    │ set_query             │
//! │ retry / reset │ all (snapshot)          │ view (filtered)       │
//! │ state watch   │ clear                   │                       │
//! └───────┬───────┴─────────────────────────┴───────────────────────┘
//!         │ PageSource::fetch_page(key)
//! ┌───────┴───────────────────────────────┐
//! │ RawgSource → HttpClient (retry, rate) │
//! └───────────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the crate
pub mod error;

/// Common types and type aliases
pub mod types;

/// Page source abstraction
pub mod source;

/// Single-flight pagination state machine
pub mod pagination;

/// Ordered, deduplicating item store
pub mod store;

/// Client-side search over accumulated items
pub mod search;

/// HTTP client with retry and rate limiting
pub mod http;

/// Games catalog domain, HTTP source and session
pub mod catalog;

/// Catalog client configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use pagination::{ObserverId, PaginationState, Paginator, PaginatorConfig};
pub use search::SearchOverlay;
pub use source::{from_fn, PageSource};
pub use store::AccumulatorStore;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
