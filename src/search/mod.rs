//! Search overlay module
//!
//! Client-side filtering of the accumulated items. The overlay owns no items of
//! its own; it projects the store it was built over.

mod overlay;

pub use overlay::{matches_needle, SearchOverlay};
