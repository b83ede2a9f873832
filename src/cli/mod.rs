//! CLI module
//!
//! Command-line interface for browsing the catalog.
//!
//! # Commands
//!
//! - `browse` - Load pages and print every game
//! - `search` - Load pages and print the games matching a query
//! - `config` - Print the effective configuration

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{load_pages, Runner};
