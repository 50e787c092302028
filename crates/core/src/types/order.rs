//! Order history documents.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{OrderId, UserId};
use super::price::CurrencyCode;
use super::product::Product;
use super::status::OrderStatus;

/// One purchased line, with the product dereferenced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(rename = "_key", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// `None` when the product has since been deleted from the catalog.
    #[serde(default)]
    pub product: Option<Product>,
    #[serde(default)]
    pub quantity: u32,
}

/// A completed order belonging to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    #[serde(default)]
    pub order_number: String,
    #[serde(rename = "clerkUserId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub products: Vec<OrderLine>,
    #[serde(default)]
    pub total_price: Decimal,
    #[serde(default, deserialize_with = "currency_or_default")]
    pub currency: CurrencyCode,
    #[serde(default)]
    pub amount_discount: Decimal,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_date: Option<DateTime<Utc>>,
}

impl Order {
    /// Total before the discount was applied.
    #[must_use]
    pub fn subtotal_before_discount(&self) -> Decimal {
        self.total_price + self.amount_discount
    }

    /// Whether a discount was applied to this order.
    #[must_use]
    pub const fn has_discount(&self) -> bool {
        !self.amount_discount.is_zero()
    }

    /// Number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.products.iter().map(|line| line.quantity).sum()
    }
}

/// Payment providers report currency in lower case (`"usd"`); anything
/// unrecognised falls back to the store currency.
fn currency_or_default<'de, D>(deserializer: D) -> Result<CurrencyCode, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(match raw.as_deref().map(str::to_ascii_uppercase).as_deref() {
        Some("EUR") => CurrencyCode::EUR,
        _ => CurrencyCode::USD,
    })
}
