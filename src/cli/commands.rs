//! CLI commands and argument parsing

use crate::types::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Browse and search a paged games catalog
#[derive(Parser, Debug)]
#[command(name = "catalog-pager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Override the API key
    #[arg(long, global = true, env = "CATALOG_API_KEY")]
    pub api_key: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load pages and print every game
    Browse {
        /// Maximum number of pages to load
        #[arg(short, long, default_value = "1")]
        pages: u32,

        /// Times each failed page is retried before giving up
        #[arg(long, default_value = "0")]
        max_retries: u32,
    },

    /// Load pages and print the games whose name matches a query
    Search {
        /// Case-insensitive name fragment
        query: String,

        /// Maximum number of pages to load
        #[arg(short, long, default_value = "1")]
        pages: u32,

        /// Times each failed page is retried before giving up
        #[arg(long, default_value = "0")]
        max_retries: u32,
    },

    /// Print the full record of one game
    Details {
        /// Catalog id of the game
        id: u64,

        /// Times the request is retried before giving up
        #[arg(long, default_value = "0")]
        max_retries: u32,
    },

    /// Print the effective configuration
    Config,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

impl Cli {
    /// Level the subscriber should default to when RUST_LOG is unset
    pub fn default_log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else {
            self.log_level.map_or(tracing::Level::INFO, Into::into)
        }
    }
}
