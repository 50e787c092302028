//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SANITY_PROJECT_ID` - CMS project identifier
//! - `SANITY_DATASET` - CMS dataset name (e.g., production)
//!
//! ## Optional
//! - `SANITY_API_VERSION` - Query API version date (default: 2025-01-01)
//! - `SANITY_API_TOKEN` - Read token for private datasets
//! - `SANITY_USE_CDN` - Query the edge-cached API host (default: true)
//! - `SANITY_API_HOST` - Override the API base URL (e.g., a local mock)
//! - `TIENDA_DATA_DIR` - Directory holding the persisted cart (default: .tienda)
//! - `TIENDA_SEARCH_DEBOUNCE_MS` - Search quiet period in ms (default: 300)
//! - `TIENDA_CACHE_TTL_SECS` - Query response cache TTL (default: 60)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Default quiet period before a search query is sent.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// CMS query API configuration
    pub cms: CmsConfig,
    /// Directory for the persisted cart
    pub data_dir: PathBuf,
    /// Quiet period before a search query is sent
    pub search_debounce: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., production, staging)
    pub sentry_environment: Option<String>,
}

/// CMS query API configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct CmsConfig {
    /// Project identifier (first label of the API host)
    pub project_id: String,
    /// Dataset to query
    pub dataset: String,
    /// API version date (e.g., 2025-01-01)
    pub api_version: String,
    /// Read token, required only for private datasets
    pub token: Option<SecretString>,
    /// Use the edge-cached API host
    pub use_cdn: bool,
    /// Explicit base URL, overriding the host derived from `project_id`
    pub api_host: Option<String>,
    /// TTL for cached query responses
    pub cache_ttl: Duration,
}

impl std::fmt::Debug for CmsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CmsConfig")
            .field("project_id", &self.project_id)
            .field("dataset", &self.dataset)
            .field("api_version", &self.api_version)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("use_cdn", &self.use_cdn)
            .field("api_host", &self.api_host)
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

impl CmsConfig {
    /// Configuration for a public dataset with default settings.
    #[must_use]
    pub fn new(project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            dataset: dataset.into(),
            api_version: "2025-01-01".to_string(),
            token: None,
            use_cdn: true,
            api_host: None,
            cache_ttl: Duration::from_secs(60),
        }
    }

    /// Base URL of the query API.
    #[must_use]
    pub fn base_url(&self) -> String {
        if let Some(host) = &self.api_host {
            return host.trim_end_matches('/').to_string();
        }
        let domain = if self.use_cdn {
            "apicdn.sanity.io"
        } else {
            "api.sanity.io"
        };
        format!("https://{}.{domain}", self.project_id)
    }

    fn from_env() -> Result<Self, ConfigError> {
        let token = match get_optional_env("SANITY_API_TOKEN") {
            Some(value) => {
                validate_secret_strength(&value, "SANITY_API_TOKEN")?;
                Some(SecretString::from(value))
            }
            None => None,
        };

        Ok(Self {
            project_id: get_required_env("SANITY_PROJECT_ID")?,
            dataset: get_required_env("SANITY_DATASET")?,
            api_version: get_env_or_default("SANITY_API_VERSION", "2025-01-01"),
            token,
            use_cdn: get_parsed_env("SANITY_USE_CDN", true)?,
            api_host: get_optional_env("SANITY_API_HOST"),
            cache_ttl: Duration::from_secs(get_parsed_env("TIENDA_CACHE_TTL_SECS", 60)?),
        })
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the API token looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let cms = CmsConfig::from_env()?;
        let data_dir = PathBuf::from(get_env_or_default("TIENDA_DATA_DIR", ".tienda"));
        let search_debounce =
            Duration::from_millis(get_parsed_env("TIENDA_SEARCH_DEBOUNCE_MS", 300)?);

        Ok(Self {
            cms,
            data_dir,
            search_debounce,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration for the given CMS settings with default local options.
    #[must_use]
    pub fn with_cms(cms: CmsConfig, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            cms,
            data_dir: data_dir.into(),
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an optional environment variable, falling back to `default`.
fn get_parsed_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_token_placeholder() {
        let result = validate_secret_strength("your-sanity-token", "SANITY_API_TOKEN");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_token_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaa", "SANITY_API_TOKEN");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_token_valid() {
        let result = validate_secret_strength("skQ8v3Lm2Rt9Zp4Xw7Nc1Yb6Hd5Jf0Kg", "SANITY_API_TOKEN");
        assert!(result.is_ok());
    }

    #[test]
    fn test_base_url_cdn_and_api() {
        let mut cms = CmsConfig::new("abc123", "production");
        assert_eq!(cms.base_url(), "https://abc123.apicdn.sanity.io");
        cms.use_cdn = false;
        assert_eq!(cms.base_url(), "https://abc123.api.sanity.io");
    }

    #[test]
    fn test_base_url_override_trims_slash() {
        let mut cms = CmsConfig::new("abc123", "production");
        cms.api_host = Some("http://127.0.0.1:4000/".to_string());
        assert_eq!(cms.base_url(), "http://127.0.0.1:4000");
    }

    #[test]
    fn test_cms_config_debug_redacts_token() {
        let mut cms = CmsConfig::new("abc123", "production");
        cms.token = Some(SecretString::from("skSuperSecretTokenValue"));

        let debug_output = format!("{cms:?}");
        assert!(debug_output.contains("abc123"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("skSuperSecretTokenValue"));
    }

    #[test]
    fn test_with_cms_defaults() {
        let config = StorefrontConfig::with_cms(CmsConfig::new("p", "d"), "/tmp/cart");
        assert_eq!(config.search_debounce, DEFAULT_SEARCH_DEBOUNCE);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/cart"));
        assert!(config.sentry_dsn.is_none());
    }
}
