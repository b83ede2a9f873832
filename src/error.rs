//! Error types for catalog-pager
//!
//! Fallible public APIs return [`Result`]. The pagination engine never
//! returns these directly; a failed page is carried inside
//! `PaginationState::Error`.

use thiserror::Error;

/// Every failure the crate can report
#[derive(Error, Debug)]
pub enum Error {
    // ------------------------------------------------------------------------
    // Paging
    // ------------------------------------------------------------------------
    /// A page could not be fetched. `source` holds the transport failure
    /// when there is one.
    #[error("Failed to fetch page {page}: {message}")]
    Fetch {
        page: u32,
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },

    #[error("Page fetch panicked: {message}")]
    FetchPanicked { message: String },

    #[error("Game {id} not found")]
    GameNotFound { id: u64 },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    // ------------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------------
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ------------------------------------------------------------------------
    // Configuration and files
    // ------------------------------------------------------------------------
    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ------------------------------------------------------------------------
    // Everything else
    // ------------------------------------------------------------------------
    #[error("Runtime error: {message}")]
    Runtime { message: String },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Page failure described only by a message
    pub fn fetch(page: u32, message: impl Into<String>) -> Self {
        Self::Fetch {
            page,
            message: message.into(),
            source: None,
        }
    }

    /// Page failure caused by another error, which stays reachable as the source
    pub fn page_failed(page: u32, cause: Error) -> Self {
        Self::Fetch {
            page,
            message: cause.to_string(),
            source: Some(Box::new(cause)),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
        }
    }

    /// HTTP status behind this error, looking through page failures
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            Self::Fetch {
                source: Some(inner),
                ..
            } => inner.status(),
            _ => None,
        }
    }
}

/// Result type alias for catalog-pager
pub type Result<T> = std::result::Result<T, Error>;

/// Prefix an error with what was being attempted
pub trait ResultExt<T> {
    fn context(self, message: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Other(format!("{}: {}", message.into(), e.into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = Error::missing_field("base_url");
        assert_eq!(err.to_string(), "Missing required config field: base_url");

        let err = Error::http_status(404, "Not found");
        assert_eq!(err.to_string(), "HTTP 404: Not found");

        let err = Error::fetch(3, "connection reset");
        assert_eq!(err.to_string(), "Failed to fetch page 3: connection reset");

        let err = Error::GameNotFound { id: 3328 };
        assert_eq!(err.to_string(), "Game 3328 not found");
    }

    #[test]
    fn test_page_failed_keeps_cause() {
        let err = Error::page_failed(2, Error::http_status(503, "maintenance"));

        assert_eq!(err.to_string(), "Failed to fetch page 2: HTTP 503: maintenance");
        assert_eq!(err.status(), Some(503));
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "HTTP 503: maintenance");
    }

    #[test]
    fn test_status_absent_without_http_cause() {
        assert_eq!(Error::fetch(1, "boom").status(), None);
        assert!(Error::fetch(1, "boom").source().is_none());
        assert_eq!(Error::decode("bad json").status(), None);
        assert_eq!(
            Error::page_failed(1, Error::decode("bad json")).status(),
            None
        );
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::missing_field("inner"));
        let err = result.context("outer").unwrap_err();
        assert_eq!(
            err.to_string(),
            "outer: Missing required config field: inner"
        );
    }
}
