//! Cart state and its pure transitions.
//!
//! `CartState` holds at most one [`CartItem`] per product id, in the order
//! products were first added. Every mutator reports whether it changed the
//! state so callers can skip persisting no-ops.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::product::Product;

/// One product snapshot and how many units of it are in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    /// Line subtotal: unit price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// Derived per-product view of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupedItem {
    pub product: Product,
    pub quantity: u32,
}

impl GroupedItem {
    /// Line subtotal: unit price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// The cart's line items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartState {
    #[serde(default)]
    items: Vec<CartItem>,
}

impl CartState {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from raw items, restoring the one-item-per-product
    /// invariant.
    ///
    /// Items for the same product are folded into the first occurrence
    /// (quantities summed, first snapshot kept) and zero-quantity items are
    /// dropped.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut folded: Vec<CartItem> = Vec::with_capacity(items.len());
        for item in items {
            if item.quantity == 0 {
                continue;
            }
            match folded.iter_mut().find(|i| i.product.id == item.product.id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                }
                None => folded.push(item),
            }
        }
        Self { items: folded }
    }

    /// Line items in first-insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Consume the cart, returning its items.
    #[must_use]
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    /// Whether the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add one unit of `product`.
    ///
    /// Inserts a new line with quantity 1, or increments the existing line.
    /// The stored snapshot is the one passed the first time the product was
    /// added. Stock is not checked here. Returns the new quantity.
    pub fn add(&mut self, product: Product) -> u32 {
        if let Some(item) = self.find_mut(&product.id) {
            item.quantity = item.quantity.saturating_add(1);
            return item.quantity;
        }
        self.items.push(CartItem {
            product,
            quantity: 1,
        });
        1
    }

    /// Remove one unit of a product.
    ///
    /// Drops the line entirely when its quantity would reach zero. Returns
    /// `false` if the product was not in the cart.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let Some(index) = self.position(product_id) else {
            return false;
        };
        let Some(item) = self.items.get_mut(index) else {
            return false;
        };
        if item.quantity > 1 {
            item.quantity -= 1;
        } else {
            self.items.remove(index);
        }
        true
    }

    /// Remove a product's line regardless of quantity.
    pub fn delete(&mut self, product_id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.product.id != product_id);
        self.items.len() != before
    }

    /// Empty the cart. Returns `false` if it was already empty.
    pub fn clear(&mut self) -> bool {
        if self.items.is_empty() {
            return false;
        }
        self.items.clear();
        true
    }

    /// Quantity of a product, or 0 if absent.
    #[must_use]
    pub fn item_count(&self, product_id: &ProductId) -> u32 {
        self.items
            .iter()
            .find(|item| &item.product.id == product_id)
            .map_or(0, |item| item.quantity)
    }

    /// One entry per distinct product, in first-insertion order.
    #[must_use]
    pub fn grouped_items(&self) -> Vec<GroupedItem> {
        let mut grouped: Vec<GroupedItem> = Vec::with_capacity(self.items.len());
        for item in &self.items {
            match grouped.iter_mut().find(|g| g.product.id == item.product.id) {
                Some(group) => group.quantity = group.quantity.saturating_add(item.quantity),
                None => grouped.push(GroupedItem {
                    product: item.product.clone(),
                    quantity: item.quantity,
                }),
            }
        }
        grouped
    }

    /// Total number of units in the cart.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Sum of line subtotals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    /// Savings against the "before" prices of discounted products.
    #[must_use]
    pub fn total_discount(&self) -> Decimal {
        self.items
            .iter()
            .filter_map(|item| {
                let original = item.product.original_price()?;
                Some((original - item.product.price) * Decimal::from(item.quantity))
            })
            .sum()
    }

    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.items
            .iter()
            .position(|item| &item.product.id == product_id)
    }

    fn find_mut(&mut self, product_id: &ProductId) -> Option<&mut CartItem> {
        self.items
            .iter_mut()
            .find(|item| &item.product.id == product_id)
    }
}
