//! Accumulator store module
//!
//! Holds every item fetched so far, in arrival order, with duplicates
//! (by identity key) dropped. It is the source of truth for both the live feed
//! and the search overlay.
//!
//! # Overview
//!
//! - `AccumulatorStore` - shared handle; `append` from the paging path,
//!   `all` from readers
//! - Reads return an immutable `Arc<Vec<T>>` snapshot, so readers never hold
//!   the lock while they iterate

mod accumulator;

pub use accumulator::AccumulatorStore;
