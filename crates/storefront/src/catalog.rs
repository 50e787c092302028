//! Catalog and order data access.
//!
//! [`CatalogSource`] is the read interface the rest of the storefront
//! depends on; [`Catalog`] implements it over the CMS query API. The
//! `load_*` functions are the page loaders: they log transient failures and
//! degrade to an empty list so a CMS outage renders as "no results" rather
//! than an error.

use std::future::Future;

use thiserror::Error;
use tienda_core::{Category, Order, Product, UserId};
use tracing::instrument;

use crate::cms::{CmsClient, CmsError, QueryParams, queries};

/// Errors returned by catalog reads.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The CMS query failed.
    #[error("CMS error: {0}")]
    Cms(#[from] CmsError),

    /// Order lookup without a user id.
    #[error("User ID is required")]
    MissingUserId,
}

impl CatalogError {
    /// Whether the failure is a fetch problem (as opposed to bad input).
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Cms(_))
    }
}

/// Read access to products, categories and orders.
///
/// Results are ordered by name ascending, except orders (newest first).
pub trait CatalogSource: Send + Sync {
    /// Every product.
    fn all_products(&self) -> impl Future<Output = Result<Vec<Product>, CatalogError>> + Send;

    /// Products listed under a home-page tab. Matching is case-insensitive
    /// on the tab title.
    fn products_by_variant(
        &self,
        variant: &str,
    ) -> impl Future<Output = Result<Vec<Product>, CatalogError>> + Send;

    /// Products in the category with the given slug.
    fn products_by_category(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Vec<Product>, CatalogError>> + Send;

    /// A single product by slug.
    fn product_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Option<Product>, CatalogError>> + Send;

    /// Products whose name matches `text` as a prefix.
    fn search_products(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Vec<Product>, CatalogError>> + Send;

    /// Categories, limited to the first `limit` when given.
    fn categories(
        &self,
        limit: Option<usize>,
    ) -> impl Future<Output = Result<Vec<Category>, CatalogError>> + Send;

    /// Orders placed by a user, newest first.
    ///
    /// Fails with [`CatalogError::MissingUserId`] if `user_id` is empty.
    fn orders_for_user(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<Order>, CatalogError>> + Send;
}

/// [`CatalogSource`] backed by the CMS query API.
#[derive(Clone)]
pub struct Catalog {
    cms: CmsClient,
}

impl Catalog {
    /// Create a catalog over a CMS client.
    #[must_use]
    pub const fn new(cms: CmsClient) -> Self {
        Self { cms }
    }

    /// The underlying CMS client.
    #[must_use]
    pub const fn cms(&self) -> &CmsClient {
        &self.cms
    }
}

impl CatalogSource for Catalog {
    #[instrument(skip(self))]
    async fn all_products(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self
            .cms
            .fetch(queries::ALL_PRODUCTS, &QueryParams::new())
            .await?)
    }

    #[instrument(skip(self))]
    async fn products_by_variant(&self, variant: &str) -> Result<Vec<Product>, CatalogError> {
        let params = QueryParams::new().with("variant", variant.to_lowercase());
        Ok(self.cms.fetch(queries::PRODUCTS_BY_VARIANT, &params).await?)
    }

    #[instrument(skip(self))]
    async fn products_by_category(&self, slug: &str) -> Result<Vec<Product>, CatalogError> {
        let params = QueryParams::new().with("slug", slug);
        Ok(self.cms.fetch(queries::PRODUCTS_BY_CATEGORY, &params).await?)
    }

    #[instrument(skip(self))]
    async fn product_by_slug(&self, slug: &str) -> Result<Option<Product>, CatalogError> {
        let params = QueryParams::new().with("slug", slug);
        Ok(self.cms.fetch(queries::PRODUCT_BY_SLUG, &params).await?)
    }

    #[instrument(skip(self))]
    async fn search_products(&self, text: &str) -> Result<Vec<Product>, CatalogError> {
        let params = QueryParams::new().with("search", queries::search_pattern(text));
        Ok(self.cms.fetch(queries::SEARCH_PRODUCTS, &params).await?)
    }

    #[instrument(skip(self))]
    async fn categories(&self, limit: Option<usize>) -> Result<Vec<Category>, CatalogError> {
        Ok(self
            .cms
            .fetch(&queries::all_categories(limit), &QueryParams::new())
            .await?)
    }

    #[instrument(skip(self))]
    async fn orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, CatalogError> {
        let user_id = UserId::parse(user_id).map_err(|_| CatalogError::MissingUserId)?;
        let params = QueryParams::new().with("userId", user_id.as_str());
        Ok(self.cms.fetch(queries::MY_ORDERS, &params).await?)
    }
}

// =============================================================================
// Page loaders
// =============================================================================

/// All products, or an empty list if the fetch fails.
pub async fn load_products<C: CatalogSource>(catalog: &C) -> Vec<Product> {
    or_empty(catalog.all_products().await, "all products")
}

/// Products for a home-page tab, or an empty list if the fetch fails.
pub async fn load_products_by_variant<C: CatalogSource>(catalog: &C, variant: &str) -> Vec<Product> {
    or_empty(catalog.products_by_variant(variant).await, "products by variant")
}

/// Categories, or an empty list if the fetch fails.
pub async fn load_categories<C: CatalogSource>(catalog: &C, limit: Option<usize>) -> Vec<Category> {
    or_empty(catalog.categories(limit).await, "all categories")
}

/// A user's orders, or an empty list if the fetch fails.
///
/// # Errors
///
/// Returns [`CatalogError::MissingUserId`] if `user_id` is empty; only
/// transient fetch failures are degraded.
pub async fn load_orders<C: CatalogSource>(
    catalog: &C,
    user_id: &str,
) -> Result<Vec<Order>, CatalogError> {
    match catalog.orders_for_user(user_id).await {
        Err(e) if !e.is_transient() => Err(e),
        result => Ok(or_empty(result, "orders")),
    }
}

fn or_empty<T>(result: Result<Vec<T>, CatalogError>, what: &str) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Error fetching {what}");
        Vec::new()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use rust_decimal::Decimal;

    use super::*;

    /// Catalog double that fails every fetch or serves a fixed product list.
    struct StubCatalog {
        fail: bool,
        products: Vec<Product>,
        order_lookups: Mutex<Vec<String>>,
    }

    impl StubCatalog {
        fn failing() -> Self {
            Self {
                fail: true,
                products: Vec::new(),
                order_lookups: Mutex::new(Vec::new()),
            }
        }

        fn with_products(products: Vec<Product>) -> Self {
            Self {
                fail: false,
                products,
                order_lookups: Mutex::new(Vec::new()),
            }
        }

        fn result<T: Clone>(&self, value: Vec<T>) -> Result<Vec<T>, CatalogError> {
            if self.fail {
                Err(CatalogError::Cms(CmsError::RateLimited(1)))
            } else {
                Ok(value)
            }
        }
    }

    impl CatalogSource for StubCatalog {
        async fn all_products(&self) -> Result<Vec<Product>, CatalogError> {
            self.result(self.products.clone())
        }

        async fn products_by_variant(&self, _variant: &str) -> Result<Vec<Product>, CatalogError> {
            self.result(self.products.clone())
        }

        async fn products_by_category(&self, _slug: &str) -> Result<Vec<Product>, CatalogError> {
            self.result(self.products.clone())
        }

        async fn product_by_slug(&self, _slug: &str) -> Result<Option<Product>, CatalogError> {
            self.result(self.products.clone()).map(|p| p.into_iter().next())
        }

        async fn search_products(&self, _text: &str) -> Result<Vec<Product>, CatalogError> {
            self.result(self.products.clone())
        }

        async fn categories(&self, _limit: Option<usize>) -> Result<Vec<Category>, CatalogError> {
            self.result(Vec::new())
        }

        async fn orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, CatalogError> {
            UserId::parse(user_id).map_err(|_| CatalogError::MissingUserId)?;
            self.order_lookups.lock().unwrap().push(user_id.to_string());
            self.result(Vec::new())
        }
    }

    #[test]
    fn test_error_classification() {
        assert!(CatalogError::Cms(CmsError::RateLimited(1)).is_transient());
        assert!(!CatalogError::MissingUserId.is_transient());
        assert_eq!(CatalogError::MissingUserId.to_string(), "User ID is required");
    }

    #[tokio::test]
    async fn test_load_products_degrades_to_empty() {
        let catalog = StubCatalog::failing();
        assert!(load_products(&catalog).await.is_empty());
        assert!(load_products_by_variant(&catalog, "Gorras").await.is_empty());
        assert!(load_categories(&catalog, Some(3)).await.is_empty());
    }

    #[tokio::test]
    async fn test_load_products_passes_through() {
        let catalog =
            StubCatalog::with_products(vec![Product::new("p1", "Gorra", Decimal::TEN)]);
        let products = load_products(&catalog).await;
        assert_eq!(products.len(), 1);
    }

    #[tokio::test]
    async fn test_load_orders_requires_user_id() {
        let catalog = StubCatalog::failing();
        let result = load_orders(&catalog, "").await;
        assert!(matches!(result, Err(CatalogError::MissingUserId)));
        assert!(catalog.order_lookups.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_orders_degrades_fetch_failure() {
        let catalog = StubCatalog::failing();
        let orders = load_orders(&catalog, "user_2abc").await.unwrap();
        assert!(orders.is_empty());
        assert_eq!(*catalog.order_lookups.lock().unwrap(), vec!["user_2abc"]);
    }

    #[tokio::test]
    async fn test_catalog_rejects_empty_user_before_request() {
        // Unroutable host: the call must fail on validation, not the network.
        let mut config = crate::config::CmsConfig::new("abc123", "production");
        config.api_host = Some("http://127.0.0.1:9".to_string());
        let catalog = Catalog::new(CmsClient::new(&config).unwrap());
        let result = catalog.orders_for_user("   ").await;
        assert!(matches!(result, Err(CatalogError::MissingUserId)));
    }
}
