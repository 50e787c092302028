//! Headless CMS query API client.
//!
//! # Architecture
//!
//! - Documents are read with GROQ queries over the HTTP query endpoint
//!   (`/v{version}/data/query/{dataset}`)
//! - The CMS is the source of truth - no local sync, direct API calls
//! - In-memory caching via `moka` for query responses (short TTL)
//!
//! # Example
//!
//! ```rust,ignore
//! use tienda_storefront::cms::{CmsClient, QueryParams, queries};
//!
//! let client = CmsClient::new(&config.cms)?;
//! let products: Vec<Product> = client
//!     .fetch(queries::SEARCH_PRODUCTS, &QueryParams::new().with("search", "camis*"))
//!     .await?;
//! ```

mod cache;
mod client;
pub mod queries;

pub use client::CmsClient;

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when querying the CMS.
#[derive(Debug, Error)]
pub enum CmsError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API rejected the query.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The configured base URL is invalid.
    #[error("Invalid API URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Named GROQ parameters (`$name` in the query).
///
/// Kept sorted so equal parameter sets produce equal cache keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(BTreeMap<String, serde_json::Value>);

impl QueryParams {
    /// Create an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<serde_json::Value>) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    /// Iterate parameters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.0.iter()
    }

    /// Whether no parameters are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Successful query response envelope.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: serde_json::Value,
    /// Server-side execution time in milliseconds.
    #[serde(default)]
    ms: Option<u64>,
}

/// Error response envelope (`{"error": {...}}`).
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

impl ErrorBody {
    fn message(&self) -> String {
        match (&self.kind, &self.description) {
            (Some(kind), Some(description)) => format!("{kind}: {description}"),
            (None, Some(description)) => description.clone(),
            (Some(kind), None) => kind.clone(),
            (None, None) => "(no error details provided)".to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cms_error_display() {
        let err = CmsError::Api {
            status: 400,
            message: "queryParseError: unexpected token".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API error: 400 - queryParseError: unexpected token"
        );
    }

    #[test]
    fn test_rate_limited_error() {
        let err = CmsError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }

    #[test]
    fn test_query_params_sorted() {
        let params = QueryParams::new().with("variant", "gorras").with("search", "a*");
        let names: Vec<&str> = params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["search", "variant"]);
    }

    #[test]
    fn test_error_body_message() {
        let body: ErrorResponse = serde_json::from_str(
            r#"{"error":{"description":"Param $search referenced, but not provided","type":"queryParseError"}}"#,
        )
        .unwrap();
        assert_eq!(
            body.error.message(),
            "queryParseError: Param $search referenced, but not provided"
        );

        let bare: ErrorResponse = serde_json::from_str(r#"{"error":{}}"#).unwrap();
        assert_eq!(bare.error.message(), "(no error details provided)");
    }
}
