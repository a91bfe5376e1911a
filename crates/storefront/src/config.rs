//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; the defaults point at a local
//! marketplace API and a data directory in the working directory.
//!
//! - `NAQSH_API_BASE_URL` - Marketplace API base URL
//!   (default: `http://localhost:5000/api`)
//! - `NAQSH_DATA_DIR` - Directory for persisted cart/wishlist snapshots
//!   (default: `.naqsh`)
//! - `NAQSH_API_TOKEN` - Bearer token for authenticated calls; checkout
//!   requires it, browsing does not
//! - `NAQSH_HTTP_TIMEOUT_SECS` - Per-request HTTP timeout (default: 10)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
const DEFAULT_DATA_DIR: &str = ".naqsh";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Marketplace API base URL, without a trailing slash.
    pub api_base_url: String,
    /// Directory holding persisted cart and wishlist snapshots.
    pub data_dir: PathBuf,
    /// Bearer token for authenticated calls. Checkout requires one.
    pub api_token: Option<SecretString>,
    /// Per-request HTTP timeout.
    pub http_timeout: Duration,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            api_token: None,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable that is set fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url =
            normalize_base_url(&get_env_or_default("NAQSH_API_BASE_URL", DEFAULT_API_BASE_URL))?;
        let data_dir = PathBuf::from(get_env_or_default("NAQSH_DATA_DIR", DEFAULT_DATA_DIR));
        let api_token = get_optional_env("NAQSH_API_TOKEN").map(SecretString::from);
        let http_timeout = match get_optional_env("NAQSH_HTTP_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("NAQSH_HTTP_TIMEOUT_SECS".to_owned(), e.to_string())
            })?),
            None => DEFAULT_HTTP_TIMEOUT,
        };

        Ok(Self {
            api_base_url,
            data_dir,
            api_token,
            http_timeout,
        })
    }

    /// The bearer token, for flows that cannot proceed without one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when no token was
    /// configured.
    pub fn require_token(&self) -> Result<&SecretString, ConfigError> {
        self.api_token
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("NAQSH_API_TOKEN".to_owned()))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate a base URL and strip any trailing slash, so endpoint paths
/// can always be appended with a single `/`.
fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let parsed = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar("NAQSH_API_BASE_URL".to_owned(), e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "NAQSH_API_BASE_URL".to_owned(),
            format!("unsupported scheme: {}", parsed.scheme()),
        ));
    }
    Ok(raw.trim_end_matches('/').to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url_strips_trailing_slash() {
        assert_eq!(
            normalize_base_url("http://localhost:5000/api/").unwrap(),
            "http://localhost:5000/api"
        );
        assert_eq!(
            normalize_base_url("https://api.naqshcouture.com/api").unwrap(),
            "https://api.naqshcouture.com/api"
        );
    }

    #[test]
    fn test_normalize_base_url_rejects_garbage() {
        assert!(normalize_base_url("not a url").is_err());
    }

    #[test]
    fn test_normalize_base_url_rejects_non_http_schemes() {
        let err = normalize_base_url("ftp://example.com/api").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_default_config() {
        let config = StorefrontConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:5000/api");
        assert_eq!(config.data_dir, PathBuf::from(".naqsh"));
        assert!(config.api_token.is_none());
        assert_eq!(config.http_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_require_token_missing() {
        let config = StorefrontConfig::default();
        let err = config.require_token().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing environment variable: NAQSH_API_TOKEN"
        );
    }

    #[test]
    fn test_require_token_present() {
        let config = StorefrontConfig {
            api_token: Some(SecretString::from("shopper-jwt".to_owned())),
            ..StorefrontConfig::default()
        };
        assert!(config.require_token().is_ok());
    }
}
