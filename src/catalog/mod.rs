//! Games catalog
//!
//! The concrete domain on top of the generic engine: the `Game` model and its
//! wire format, an HTTP source for the paged games listing, and a session
//! that combines paging, accumulation and search. A separate details session
//! loads one game's full record.
//!
//! # Example
//!
//! ```rust,ignore
//! use catalog_pager::catalog::{CatalogAction, CatalogSession};
//! use catalog_pager::config::CatalogConfig;
//!
//! let session = CatalogSession::from_config(CatalogConfig::default())?;
//! session.start();
//! let state = session.settled().await;
//! session.dispatch(CatalogAction::Search("zelda".into()));
//! ```

mod details;
mod model;
mod session;
mod source;

pub use details::{DetailsSession, DetailsSource, DetailsState};
pub use model::{Game, GameDetails, GameDetailsDto, GameDto, GamesResponse, GenreDto};
pub use session::{CatalogAction, CatalogSession, CatalogState};
pub use source::RawgSource;
