//! CMS query API client implementation.
//!
//! Sends GROQ queries with `reqwest` and caches raw results with `moka`.

use std::sync::Arc;

use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::cache::CacheKey;
use super::{CmsError, ErrorResponse, QueryParams, QueryResponse};
use crate::config::CmsConfig;

/// Longest response excerpt included in logs and error messages.
const BODY_EXCERPT_CHARS: usize = 500;

/// Client for the CMS query API.
///
/// Cheaply cloneable; clones share the HTTP connection pool and cache.
#[derive(Clone)]
pub struct CmsClient {
    inner: Arc<CmsClientInner>,
}

struct CmsClientInner {
    client: reqwest::Client,
    endpoint: Url,
    token: Option<SecretString>,
    cache: Option<Cache<CacheKey, serde_json::Value>>,
}

impl CmsClient {
    /// Create a new query API client.
    ///
    /// A zero `cache_ttl` disables response caching.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured base URL is invalid or the HTTP
    /// client fails to build.
    pub fn new(config: &CmsConfig) -> Result<Self, CmsError> {
        let endpoint = Url::parse(&format!(
            "{}/v{}/data/query/{}",
            config.base_url(),
            config.api_version,
            config.dataset
        ))?;

        let cache = (!config.cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(1000)
                .time_to_live(config.cache_ttl)
                .build()
        });

        let client = reqwest::Client::builder()
            .user_agent(concat!("tienda/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(CmsClientInner {
                client,
                endpoint,
                token: config.token.clone(),
                cache,
            }),
        })
    }

    /// Run a query and deserialize its `result`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API rejects the query, or
    /// the result does not match `T`.
    #[instrument(skip_all, fields(query = %query))]
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        query: &str,
        params: &QueryParams,
    ) -> Result<T, CmsError> {
        let key = CacheKey::new(query, params);

        if let Some(cache) = &self.inner.cache
            && let Some(result) = cache.get(&key).await
        {
            debug!("Cache hit for query");
            return Ok(serde_json::from_value(result)?);
        }

        let result = self.execute(query, params).await?;

        if let Some(cache) = &self.inner.cache {
            cache.insert(key, result.clone()).await;
        }

        Ok(serde_json::from_value(result)?)
    }

    /// Drop all cached responses.
    pub fn invalidate_cache(&self) {
        if let Some(cache) = &self.inner.cache {
            cache.invalidate_all();
        }
    }

    /// Build the request URL with the query and `$`-prefixed JSON params.
    fn query_url(&self, query: &str, params: &QueryParams) -> Url {
        let mut url = self.inner.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", query);
            for (name, value) in params.iter() {
                pairs.append_pair(&format!("${name}"), &value.to_string());
            }
        }
        url
    }

    async fn execute(
        &self,
        query: &str,
        params: &QueryParams,
    ) -> Result<serde_json::Value, CmsError> {
        let mut request = self.inner.client.get(self.query_url(query, params));
        if let Some(token) = &self.inner.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CmsError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&response_text).map_or_else(
                |_| excerpt(&response_text),
                |body| body.error.message(),
            );
            tracing::error!(
                status = %status,
                message = %message,
                "CMS query returned non-success status"
            );
            return Err(CmsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let response: QueryResponse = serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %excerpt(&response_text),
                "Failed to parse CMS query response"
            );
            CmsError::Parse(e)
        })?;

        debug!(server_ms = ?response.ms, "CMS query complete");
        Ok(response.result)
    }
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}
