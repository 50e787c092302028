//! Status enums for catalog and order documents.

use serde::{Deserialize, Serialize};

/// Order lifecycle status as recorded by the checkout webhook.
///
/// Unknown values deserialize to [`OrderStatus::Unknown`] so a new status
/// added in the CMS never breaks order history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Paid,
    Shipped,
    OutForDelivery,
    Delivered,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Paid => "paid",
            Self::Shipped => "shipped",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Merchandising badge on a product card.
///
/// Badges the storefront does not know deserialize to
/// [`ProductStatus::Unknown`] so one product never breaks a listing or a
/// persisted cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    New,
    Hot,
    Sale,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::New => "new",
            Self::Hot => "hot",
            Self::Sale => "sale",
            Self::Unknown => "unknown",
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_snake_case() {
        let status: OrderStatus = serde_json::from_str("\"out_for_delivery\"").unwrap();
        assert_eq!(status, OrderStatus::OutForDelivery);
        assert_eq!(status.to_string(), "out_for_delivery");
    }

    #[test]
    fn test_order_status_unknown_value() {
        let status: OrderStatus = serde_json::from_str("\"refunded\"").unwrap();
        assert_eq!(status, OrderStatus::Unknown);
    }

    #[test]
    fn test_product_status_unknown_value() {
        let status: ProductStatus = serde_json::from_str("\"featured\"").unwrap();
        assert_eq!(status, ProductStatus::Unknown);
        assert_eq!(status.to_string(), "unknown");

        let status: ProductStatus = serde_json::from_str("\"sale\"").unwrap();
        assert_eq!(status, ProductStatus::Sale);
    }
}
