//! Client-side shopping cart store.
//!
//! [`CartStore`] is an explicitly constructed handle around [`CartState`]:
//! build one per session, clone it into whatever needs it, and read or
//! mutate through its methods. Every mutation that changes the cart is
//! committed to a [`CartStorage`] slot before the call returns, in the
//! order the mutations were made. A failed commit is logged and the
//! in-memory cart stays authoritative.
//!
//! Stores in separate processes sharing one slot do not coordinate; the
//! last commit wins.

pub mod persist;
pub mod storage;

use std::sync::Arc;

use tienda_core::{CartItem, CartState, GroupedItem, Product, ProductId};
use tokio::sync::watch;
use tracing::{debug, warn};

pub use storage::{CartStorage, FileStorage, MemoryStorage, StorageError};

use crate::error::add_breadcrumb;

/// Storage slot the cart is persisted under.
pub const STORAGE_KEY: &str = "cart-store";

/// Handle to a session's cart.
///
/// Cheaply cloneable; clones share the same cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    storage: Arc<dyn CartStorage>,
    key: String,
    state: watch::Sender<CartState>,
}

impl CartStore {
    /// Open the cart persisted under [`STORAGE_KEY`].
    #[must_use]
    pub fn open(storage: Arc<dyn CartStorage>) -> Self {
        Self::open_with_key(storage, STORAGE_KEY)
    }

    /// Open the cart persisted under `key`.
    ///
    /// Rehydrates from the slot; a missing, unreadable or malformed slot
    /// starts an empty cart.
    #[must_use]
    pub fn open_with_key(storage: Arc<dyn CartStorage>, key: &str) -> Self {
        let state = rehydrate(storage.as_ref(), key);
        let (tx, _rx) = watch::channel(state);
        Self {
            inner: Arc::new(CartStoreInner {
                storage,
                key: key.to_string(),
                state: tx,
            }),
        }
    }

    /// Add one unit of `product`.
    ///
    /// Callers gate on [`Product::is_out_of_stock`]; the store does not.
    pub fn add_item(&self, product: Product) {
        let product_id = product.id.clone();
        let mut quantity = 0;
        self.mutate(|state| {
            quantity = state.add(product);
            true
        });
        debug!(product_id = %product_id, quantity, "Added item to cart");
        add_breadcrumb("cart", "Added item", Some(&[("product_id", product_id.as_str())]));
    }

    /// Remove one unit of a product; drops the line at zero. No-op if absent.
    pub fn remove_item(&self, product_id: &ProductId) {
        if self.mutate(|state| state.remove(product_id)) {
            debug!(product_id = %product_id, "Removed item from cart");
            add_breadcrumb("cart", "Removed item", Some(&[("product_id", product_id.as_str())]));
        }
    }

    /// Remove a product's line regardless of quantity. No-op if absent.
    pub fn delete_item(&self, product_id: &ProductId) {
        if self.mutate(|state| state.delete(product_id)) {
            debug!(product_id = %product_id, "Deleted cart line");
        }
    }

    /// Empty the cart (after a completed order).
    pub fn clear(&self) {
        if self.mutate(CartState::clear) {
            debug!("Cleared cart");
            add_breadcrumb("cart", "Cleared cart", None);
        }
    }

    /// Quantity of a product, or 0 if absent.
    #[must_use]
    pub fn get_item_count(&self, product_id: &ProductId) -> u32 {
        self.inner.state.borrow().item_count(product_id)
    }

    /// One entry per distinct product, in first-insertion order.
    #[must_use]
    pub fn get_grouped_items(&self) -> Vec<GroupedItem> {
        self.inner.state.borrow().grouped_items()
    }

    /// Current line items.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.inner.state.borrow().items().to_vec()
    }

    /// Copy of the current cart.
    #[must_use]
    pub fn snapshot(&self) -> CartState {
        self.inner.state.borrow().clone()
    }

    /// Receive every committed cart state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.inner.state.subscribe()
    }

    /// Apply `op`; when it reports a change, commit and notify subscribers.
    ///
    /// The commit happens under the state lock so slot writes land in
    /// mutation order.
    fn mutate(&self, op: impl FnOnce(&mut CartState) -> bool) -> bool {
        self.inner.state.send_if_modified(|state| {
            let changed = op(state);
            if changed {
                self.commit(state);
            }
            changed
        })
    }

    fn commit(&self, state: &CartState) {
        let encoded = match persist::encode(state) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(error = %e, "Failed to serialize cart; keeping in-memory state");
                return;
            }
        };
        if let Err(e) = self.inner.storage.save(&self.inner.key, &encoded) {
            warn!(
                error = %e,
                key = %self.inner.key,
                "Failed to persist cart; keeping in-memory state"
            );
        }
    }
}

fn rehydrate(storage: &dyn CartStorage, key: &str) -> CartState {
    let raw = match storage.load(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return CartState::new(),
        Err(e) => {
            warn!(error = %e, key, "Failed to read persisted cart; starting empty");
            return CartState::new();
        }
    };
    match persist::decode(&raw) {
        Ok(state) => {
            debug!(items = state.items().len(), "Rehydrated cart");
            state
        }
        Err(e) => {
            warn!(error = %e, key, "Discarding unreadable persisted cart");
            CartState::new()
        }
    }
}
