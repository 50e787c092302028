//! Storefront session state shared across front-end handlers.

use std::sync::Arc;

use crate::cart::{CartStorage, CartStore, FileStorage};
use crate::catalog::Catalog;
use crate::cms::{CmsClient, CmsError};
use crate::config::StorefrontConfig;
use crate::search::SearchBar;

/// Session state shared across handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// catalog, the persisted cart and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Arc<Catalog>,
    cart: CartStore,
}

impl AppState {
    /// Create session state with the cart persisted under `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the CMS client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, CmsError> {
        let storage: Arc<dyn CartStorage> = Arc::new(FileStorage::new(config.data_dir.clone()));
        Self::with_storage(config, storage)
    }

    /// Create session state over a caller-supplied cart storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the CMS client cannot be built.
    pub fn with_storage(
        config: StorefrontConfig,
        storage: Arc<dyn CartStorage>,
    ) -> Result<Self, CmsError> {
        let cms = CmsClient::new(&config.cms)?;
        let catalog = Arc::new(Catalog::new(cms));
        let cart = CartStore::open(storage);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                cart,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the session cart.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Create a search bar over this session's catalog.
    #[must_use]
    pub fn search_bar(&self) -> SearchBar<Catalog> {
        SearchBar::with_debounce(
            Arc::clone(&self.inner.catalog),
            self.inner.config.search_debounce,
        )
    }
}
