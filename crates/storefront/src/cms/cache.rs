//! Cache key for CMS query responses.

use super::QueryParams;

/// A query and its parameters, rendered to a stable string form.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct CacheKey {
    query: String,
    params: String,
}

impl CacheKey {
    pub fn new(query: &str, params: &QueryParams) -> Self {
        let params = params
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        Self {
            query: query.to_string(),
            params,
        }
    }
}
