//! Common types used throughout catalog-pager
//!
//! Shared type definitions and traits used across multiple modules.

use serde::{Deserialize, Serialize};
use std::hash::Hash;

// ============================================================================
// Type Aliases
// ============================================================================

/// Page cursor: an integer page index
pub type PageKey = u32;

// ============================================================================
// Item Traits
// ============================================================================

/// An item with a stable identity key used for deduplication
pub trait Identify {
    /// Identity key type
    type Key: Eq + Hash + Clone + Send + Sync;

    /// Stable identity of this item
    fn id(&self) -> Self::Key;
}

/// An item that can be matched by the search overlay
pub trait Searchable {
    /// Human-readable name used for substring search
    fn display_name(&self) -> &str;
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Backoff strategy for HTTP retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

// ============================================================================
// Log Level
// ============================================================================

/// Log level accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_type_serde() {
        let backoff: BackoffType = serde_yaml::from_str("linear").unwrap();
        assert_eq!(backoff, BackoffType::Linear);
        assert_eq!(BackoffType::default(), BackoffType::Exponential);
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(tracing::Level::from(LogLevel::Debug), tracing::Level::DEBUG);
        assert_eq!(tracing::Level::from(LogLevel::Error), tracing::Level::ERROR);
    }
}
