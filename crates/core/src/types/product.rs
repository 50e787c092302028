//! Catalog documents: products and categories.
//!
//! Field names follow the CMS document shape (`_id`, `slug.current`, ...),
//! so these types deserialize straight from query results and serialize back
//! unchanged into the persisted cart.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId};
use super::status::ProductStatus;

/// URL slug (`{ "current": "..." }` in the CMS).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slug {
    pub current: String,
}

/// A reference to another document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "_ref")]
    pub reference: String,
    #[serde(rename = "_key", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// An image field; `asset` references the uploaded image asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(rename = "_key", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub asset: Reference,
}

/// A catalog product snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<Slug>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Selling price; a missing price counts as zero.
    #[serde(default)]
    pub price: Decimal,
    /// Discount percentage shown against the "before" price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<Reference>,
    /// Units in stock. `None` means stock is not tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProductStatus>,
    /// Home-page tab this product is listed under (e.g. "camisetas").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(rename = "_createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Create a bare product with a name and price.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            slug: None,
            images: Vec::new(),
            description: None,
            price,
            discount: None,
            categories: Vec::new(),
            stock: None,
            status: None,
            variant: None,
            created_at: None,
        }
    }

    /// Whether the product must not be added to a cart.
    ///
    /// Only an explicit stock of zero counts; untracked stock is purchasable.
    #[must_use]
    pub const fn is_out_of_stock(&self) -> bool {
        matches!(self.stock, Some(0))
    }

    /// The struck-through "before" price, when a discount applies.
    ///
    /// Computed as `price + discount * price / 100`.
    #[must_use]
    pub fn original_price(&self) -> Option<Decimal> {
        let discount = self.discount.filter(|d| !d.is_zero())?;
        if self.price.is_zero() {
            return None;
        }
        Some(self.price + discount * self.price / Decimal::ONE_HUNDRED)
    }

    /// URL slug, if the product has one.
    #[must_use]
    pub fn slug(&self) -> Option<&str> {
        self.slug.as_ref().map(|s| s.current.as_str())
    }

    /// Short display name, truncated to `max_chars` characters.
    #[must_use]
    pub fn short_name(&self, max_chars: usize) -> String {
        self.name.chars().take(max_chars).collect()
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: CategoryId,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<Slug>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Starting price shown on the category card.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Decimal>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_cms_document() {
        let json = r#"{
            "_id": "prod-1",
            "_type": "product",
            "_createdAt": "2025-02-10T12:00:00Z",
            "name": "Camiseta básica",
            "slug": { "_type": "slug", "current": "camiseta-basica" },
            "images": [{ "_key": "k1", "_type": "image", "asset": { "_ref": "image-abc-800x800-png", "_type": "reference" } }],
            "price": 19.99,
            "discount": 10,
            "categories": [{ "_key": "c1", "_ref": "cat-1", "_type": "reference" }],
            "stock": 4,
            "status": "hot",
            "variant": "camisetas"
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id.as_str(), "prod-1");
        assert_eq!(product.slug(), Some("camiseta-basica"));
        assert_eq!(product.price, Decimal::new(1999, 2));
        assert_eq!(product.images.len(), 1);
        assert_eq!(product.status, Some(ProductStatus::Hot));
        assert!(!product.is_out_of_stock());
    }

    #[test]
    fn test_missing_fields_default() {
        let product: Product = serde_json::from_str(r#"{ "_id": "p" }"#).unwrap();
        assert_eq!(product.price, Decimal::ZERO);
        assert!(product.name.is_empty());
        assert!(product.stock.is_none());
        assert!(!product.is_out_of_stock());
    }

    #[test]
    fn test_out_of_stock_only_when_zero() {
        let mut product = Product::new("p", "Gorra", Decimal::TEN);
        product.stock = Some(0);
        assert!(product.is_out_of_stock());
        product.stock = Some(3);
        assert!(!product.is_out_of_stock());
    }

    #[test]
    fn test_original_price_with_discount() {
        let mut product = Product::new("p", "Gorra", Decimal::new(100, 0));
        product.discount = Some(Decimal::new(15, 0));
        assert_eq!(product.original_price(), Some(Decimal::new(115, 0)));
    }

    #[test]
    fn test_original_price_without_discount() {
        let mut product = Product::new("p", "Gorra", Decimal::new(100, 0));
        assert_eq!(product.original_price(), None);
        product.discount = Some(Decimal::ZERO);
        assert_eq!(product.original_price(), None);
    }

    #[test]
    fn test_short_name_counts_chars() {
        let product = Product::new("p", "Sudadera azul marino", Decimal::ONE);
        assert_eq!(product.short_name(12), "Sudadera azu");
    }
}
