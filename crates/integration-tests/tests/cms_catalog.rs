//! Catalog reads against the fake CMS query API.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::http::StatusCode;
use secrecy::SecretString;
use serde_json::json;
use tienda_core::ProductStatus;
use tienda_integration_tests::{CmsReply, FakeCms, product_doc};
use tienda_storefront::catalog::{self, Catalog, CatalogError, CatalogSource};
use tienda_storefront::cms::{CmsClient, CmsError};
use tienda_storefront::config::CmsConfig;

fn catalog_for(config: &CmsConfig) -> Catalog {
    Catalog::new(CmsClient::new(config).unwrap())
}

#[tokio::test]
async fn test_all_products_hits_versioned_dataset_endpoint() {
    let cms = FakeCms::start(|_| {
        CmsReply::result(json!([
            product_doc("p1", "Camiseta", "camiseta", 15.0),
            product_doc("p2", "Gorra", "gorra", 8.0),
        ]))
    })
    .await;

    let products = catalog_for(&cms.config()).all_products().await.unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products.first().unwrap().slug(), Some("camiseta"));

    let request = cms.requests().pop().unwrap();
    assert_eq!(request.api_version, "v2025-01-01");
    assert_eq!(request.dataset, "production");
    assert!(request.query.contains(r#"_type == "product""#));
    assert!(request.authorization.is_none());
}

#[tokio::test]
async fn test_unrecognised_badge_does_not_break_listing() {
    let cms = FakeCms::start(|_| {
        let mut featured = product_doc("p1", "Camiseta", "camiseta", 15.0);
        featured["status"] = json!("featured");
        let mut sale = product_doc("p2", "Gorra", "gorra", 8.0);
        sale["status"] = json!("sale");
        CmsReply::result(json!([featured, sale]))
    })
    .await;

    let products = catalog_for(&cms.config()).all_products().await.unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products.first().unwrap().status, Some(ProductStatus::Unknown));
    assert_eq!(products.get(1).unwrap().status, Some(ProductStatus::Sale));
}

#[tokio::test]
async fn test_repeated_queries_are_cached() {
    let cms = FakeCms::start(|_| CmsReply::result(json!([]))).await;
    let catalog = catalog_for(&cms.config());

    catalog.all_products().await.unwrap();
    catalog.all_products().await.unwrap();
    assert_eq!(cms.hits(), 1);

    // Different params are a different cache entry
    catalog.products_by_variant("gorras").await.unwrap();
    assert_eq!(cms.hits(), 2);

    catalog.cms().invalidate_cache();
    catalog.all_products().await.unwrap();
    assert_eq!(cms.hits(), 3);
}

#[tokio::test]
async fn test_zero_ttl_disables_cache() {
    let cms = FakeCms::start(|_| CmsReply::result(json!([]))).await;
    let mut config = cms.config();
    config.cache_ttl = Duration::ZERO;
    let catalog = catalog_for(&config);

    catalog.all_products().await.unwrap();
    catalog.all_products().await.unwrap();
    assert_eq!(cms.hits(), 2);
}

#[tokio::test]
async fn test_variant_is_lowercased() {
    let cms = FakeCms::start(|_| CmsReply::result(json!([]))).await;
    catalog_for(&cms.config())
        .products_by_variant("Camisetas")
        .await
        .unwrap();

    let request = cms.requests().pop().unwrap();
    assert_eq!(request.param("variant"), Some("camisetas"));
}

#[tokio::test]
async fn test_search_sends_prefix_pattern() {
    let cms = FakeCms::start(|request| {
        if request.param("search") == Some("cam*") {
            CmsReply::result(json!([product_doc("p1", "Camiseta", "camiseta", 15.0)]))
        } else {
            CmsReply::result(json!([]))
        }
    })
    .await;

    let results = catalog_for(&cms.config()).search_products("  cam ").await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(cms.requests().pop().unwrap().query.contains("match $search"));
}

#[tokio::test]
async fn test_product_by_slug_missing_is_none() {
    let cms = FakeCms::start(|request| match request.param("slug") {
        Some("gorra") => CmsReply::result(product_doc("p2", "Gorra", "gorra", 8.0)),
        _ => CmsReply::result(json!(null)),
    })
    .await;
    let catalog = catalog_for(&cms.config());

    let found = catalog.product_by_slug("gorra").await.unwrap().unwrap();
    assert_eq!(found.name, "Gorra");
    assert!(catalog.product_by_slug("pantalon").await.unwrap().is_none());
}

#[tokio::test]
async fn test_categories_limit_is_in_query() {
    let cms = FakeCms::start(|_| {
        CmsReply::result(json!([
            { "_id": "c1", "title": "Hombre", "slug": { "current": "hombre" }, "range": 10 }
        ]))
    })
    .await;

    let categories = catalog::load_categories(&catalog_for(&cms.config()), Some(3)).await;
    assert_eq!(categories.len(), 1);
    assert!(cms.requests().pop().unwrap().query.contains("[0...3]"));
}

#[tokio::test]
async fn test_orders_filtered_by_user() {
    let cms = FakeCms::start(|request| {
        assert_eq!(request.param("userId"), Some("user_42"));
        CmsReply::result(json!([
            {
                "_id": "o2",
                "orderNumber": "A-2",
                "clerkUserId": "user_42",
                "totalPrice": 30,
                "amountDiscount": 0,
                "currency": "usd",
                "status": "shipped",
                "orderDate": "2025-04-02T09:00:00Z",
                "products": []
            },
            {
                "_id": "o1",
                "orderNumber": "A-1",
                "clerkUserId": "user_42",
                "totalPrice": 12,
                "status": "paid",
                "orderDate": "2025-03-01T09:00:00Z"
            }
        ]))
    })
    .await;

    let orders = catalog::load_orders(&catalog_for(&cms.config()), "user_42")
        .await
        .unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders.first().unwrap().order_number, "A-2");
}

#[tokio::test]
async fn test_empty_user_id_never_reaches_cms() {
    let cms = FakeCms::start(|_| CmsReply::result(json!([]))).await;
    let err = catalog::load_orders(&catalog_for(&cms.config()), "")
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::MissingUserId));
    assert_eq!(err.to_string(), "User ID is required");
    assert_eq!(cms.hits(), 0);
}

#[tokio::test]
async fn test_rate_limit_reports_retry_after() {
    let cms = FakeCms::start(|_| CmsReply::rate_limited(7)).await;
    let catalog = catalog_for(&cms.config());

    let err = catalog.all_products().await.unwrap_err();
    assert!(matches!(err, CatalogError::Cms(CmsError::RateLimited(7))));

    // Page loaders degrade to an empty list
    assert!(catalog::load_products(&catalog).await.is_empty());
}

#[tokio::test]
async fn test_api_error_carries_description() {
    let cms = FakeCms::start(|_| {
        CmsReply::error(StatusCode::BAD_REQUEST, "expected ']' following expression")
    })
    .await;

    let err = catalog_for(&cms.config()).all_products().await.unwrap_err();
    match err {
        CatalogError::Cms(CmsError::Api { status, message }) => {
            assert_eq!(status, 400);
            assert!(message.contains("expected ']'"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_failed_responses_are_not_cached() {
    let cms = FakeCms::start(|_| CmsReply::rate_limited(1)).await;
    let catalog = catalog_for(&cms.config());

    assert!(catalog.all_products().await.is_err());
    assert!(catalog.all_products().await.is_err());
    assert_eq!(cms.hits(), 2);
}

#[tokio::test]
async fn test_token_sent_as_bearer() {
    let cms = FakeCms::start(|_| CmsReply::result(json!([]))).await;
    let mut config = cms.config();
    config.token = Some(SecretString::from("skTienda8f3kQ9zLmW2xV7pR4tY6u"));

    catalog_for(&config).all_products().await.unwrap();
    assert_eq!(
        cms.requests().pop().unwrap().authorization.as_deref(),
        Some("Bearer skTienda8f3kQ9zLmW2xV7pR4tY6u")
    );
}
