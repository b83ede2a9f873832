//! Configuration for the catalog client
//!
//! `CatalogConfig` is loaded from YAML or built from defaults, then overridden
//! by command-line flags. Everything has a default, so an empty document is a
//! valid configuration.

use crate::error::{Error, Result};
use crate::http::{Backoff, HttpClientConfig, RateLimit};
use crate::pagination::PaginatorConfig;
use crate::types::BackoffType;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-Level Catalog Config
// ============================================================================

/// Complete catalog client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the catalog API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the games listing, relative to `base_url`
    #[serde(default = "default_games_endpoint")]
    pub games_endpoint: String,

    /// Path prefix of a single game, relative to `base_url`; the id is appended
    #[serde(default = "default_details_endpoint")]
    pub details_endpoint: String,

    /// API key sent as a query parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Query parameter carrying the API key
    #[serde(default = "default_key_param")]
    pub key_param: String,

    /// Query parameter carrying the page number
    #[serde(default = "default_page_param")]
    pub page_param: String,

    /// Items per page; omitted from requests when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,

    /// Query parameter carrying the page size
    #[serde(default = "default_page_size_param")]
    pub page_size_param: String,

    /// Page key sequencing
    #[serde(default)]
    pub pagination: PaginatorConfig,

    /// HTTP client configuration
    #[serde(default)]
    pub http: HttpSettings,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            games_endpoint: default_games_endpoint(),
            details_endpoint: default_details_endpoint(),
            api_key: None,
            key_param: default_key_param(),
            page_param: default_page_param(),
            page_size: None,
            page_size_param: default_page_size_param(),
            pagination: PaginatorConfig::default(),
            http: HttpSettings::default(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.rawg.io/api".to_string()
}

fn default_games_endpoint() -> String {
    "games".to_string()
}

fn default_details_endpoint() -> String {
    "games".to_string()
}

fn default_key_param() -> String {
    "key".to_string()
}

fn default_page_param() -> String {
    "page".to_string()
}

fn default_page_size_param() -> String {
    "page_size".to_string()
}

// ============================================================================
// HTTP Settings
// ============================================================================

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Transport-level retries per page request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry backoff configuration
    #[serde(default)]
    pub backoff: BackoffSettings,

    /// Client-side rate limit; `null` disables it
    #[serde(default = "default_rate_limit")]
    pub rate_limit: Option<RateLimit>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            backoff: BackoffSettings::default(),
            rate_limit: default_rate_limit(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_rate_limit() -> Option<RateLimit> {
    Some(RateLimit::default())
}

/// Backoff configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffSettings {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffSettings {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
        }
    }
}

fn default_initial_ms() -> u64 {
    100
}

fn default_max_ms() -> u64 {
    10_000
}

// ============================================================================
// Loading and Validation
// ============================================================================

impl CatalogConfig {
    /// Load and validate a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::Io(e)
            }
        })?;

        Self::from_yaml_str(&content)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as an empty mapping
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };

        config.validate()?;
        Ok(config)
    }

    /// Serialize as YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check the configuration for values that cannot work
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::missing_field("base_url"));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| Error::invalid_value("base_url", e.to_string()))?;

        if self.games_endpoint.trim().is_empty() {
            return Err(Error::missing_field("games_endpoint"));
        }
        if self.details_endpoint.trim().is_empty() {
            return Err(Error::missing_field("details_endpoint"));
        }

        if self.page_size == Some(0) {
            return Err(Error::invalid_value(
                "page_size",
                "must be greater than zero",
            ));
        }

        if self.http.timeout_secs == 0 {
            return Err(Error::invalid_value(
                "http.timeout_secs",
                "must be greater than zero",
            ));
        }

        if self.http.backoff.initial_ms > self.http.backoff.max_ms {
            return Err(Error::invalid_value(
                "http.backoff.initial_ms",
                "must not exceed http.backoff.max_ms",
            ));
        }

        self.pagination.validate()
    }

    /// Build the HTTP client configuration for these settings
    pub fn to_http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            timeout: Duration::from_secs(self.http.timeout_secs),
            max_retries: self.http.max_retries,
            backoff: Backoff {
                kind: self.http.backoff.backoff_type,
                initial: Duration::from_millis(self.http.backoff.initial_ms),
                max: Duration::from_millis(self.http.backoff.max_ms),
            },
            rate_limit: self.http.rate_limit,
            ..HttpClientConfig::new(&self.base_url)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = CatalogConfig::default();
        assert_eq!(config.base_url, "https://api.rawg.io/api");
        assert_eq!(config.games_endpoint, "games");
        assert_eq!(config.details_endpoint, "games");
        assert_eq!(config.key_param, "key");
        assert_eq!(config.page_param, "page");
        assert_eq!(config.page_size, None);
        assert_eq!(config.pagination, PaginatorConfig::new(1, 1));
        assert_eq!(config.http.timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = CatalogConfig::from_yaml_str("").unwrap();
        assert_eq!(config, CatalogConfig::default());
    }

    #[test]
    fn test_parse_partial_config() {
        let yaml = r#"
base_url: http://localhost:8080/api
api_key: secret
page_size: 20
pagination:
  initial_key: 3
http:
  max_retries: 1
  backoff:
    type: constant
    initial_ms: 50
  rate_limit: null
"#;
        let config = CatalogConfig::from_yaml_str(yaml).unwrap();

        assert_eq!(config.base_url, "http://localhost:8080/api");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.page_size, Some(20));
        assert_eq!(config.pagination.initial_key, 3);
        assert_eq!(config.pagination.increment, 1);
        assert_eq!(config.http.max_retries, 1);
        assert_eq!(config.http.backoff.backoff_type, BackoffType::Constant);
        assert_eq!(config.http.backoff.initial_ms, 50);
        assert_eq!(config.http.backoff.max_ms, 10_000);
        assert!(config.http.rate_limit.is_none());
        assert_eq!(config.games_endpoint, "games");
    }

    #[test]
    fn test_zero_increment_rejected() {
        let err = CatalogConfig::from_yaml_str("pagination:\n  increment: 0\n").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfigValue { ref field, .. } if field == "pagination.increment"
        ));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let err = CatalogConfig::from_yaml_str("base_url: not a url\n").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfigValue { ref field, .. } if field == "base_url"
        ));

        let err = CatalogConfig::from_yaml_str("base_url: ''\n").unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { .. }));
    }

    #[test]
    fn test_empty_details_endpoint_rejected() {
        let err = CatalogConfig::from_yaml_str("details_endpoint: ' '\n").unwrap_err();
        assert!(matches!(
            err,
            Error::MissingConfigField { ref field } if field == "details_endpoint"
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = CatalogConfig::from_yaml_str("http:\n  timeout_secs: 0\n").unwrap_err();
        assert!(err.to_string().contains("http.timeout_secs"));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let err = CatalogConfig::from_yaml_str("page_size: 0\n").unwrap_err();
        assert!(err.to_string().contains("page_size"));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = CatalogConfig::from_yaml_str("base_url: [unclosed\n").unwrap_err();
        assert!(matches!(err, Error::YamlParse(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "games_endpoint: games/lists/main").unwrap();

        let config = CatalogConfig::from_file(file.path()).unwrap();
        assert_eq!(config.games_endpoint, "games/lists/main");
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = CatalogConfig::from_file(dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_yaml_output_parses_back() {
        let mut config = CatalogConfig::default();
        config.api_key = Some("abc".into());
        config.page_size = Some(40);

        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("base_url: https://api.rawg.io/api"));
        assert_eq!(CatalogConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn test_to_http_client_config() {
        let mut config = CatalogConfig::default();
        config.http.timeout_secs = 5;
        config.http.max_retries = 7;
        config.http.rate_limit = None;

        let http = config.to_http_client_config();
        assert_eq!(http.base_url, "https://api.rawg.io/api");
        assert_eq!(http.timeout, Duration::from_secs(5));
        assert_eq!(http.max_retries, 7);
        assert_eq!(http.backoff.kind, BackoffType::Exponential);
        assert_eq!(http.backoff.max, Duration::from_secs(10));
        assert!(http.rate_limit.is_none());
    }
}
