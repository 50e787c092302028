//! Debounced search end to end: session state, catalog and fake CMS.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tienda_integration_tests::{CmsReply, FakeCms, product_doc};
use tienda_storefront::cart::MemoryStorage;
use tienda_storefront::config::StorefrontConfig;
use tienda_storefront::search::{SearchBar, SearchStatus};
use tienda_storefront::state::AppState;

async fn fake_cms() -> FakeCms {
    FakeCms::start(|request| {
        let docs = [
            product_doc("p1", "Camiseta", "camiseta", 15.0),
            product_doc("p2", "Camisa", "camisa", 22.0),
            product_doc("p3", "Gorra", "gorra", 8.0),
        ];
        let prefix = request
            .param("search")
            .unwrap_or_default()
            .trim_end_matches('*')
            .to_lowercase();
        let matches: Vec<_> = docs
            .into_iter()
            .filter(|doc| {
                doc["name"]
                    .as_str()
                    .unwrap()
                    .to_lowercase()
                    .starts_with(&prefix)
            })
            .collect();
        CmsReply::result(json!(matches))
    })
    .await
}

fn state(cms: &FakeCms) -> AppState {
    let mut config = StorefrontConfig::with_cms(cms.config(), ".tienda");
    config.search_debounce = Duration::from_millis(100);
    AppState::with_storage(config, Arc::new(MemoryStorage::new())).unwrap()
}

async fn wait_until_settled<C>(bar: &SearchBar<C>)
where
    C: tienda_storefront::catalog::CatalogSource + 'static,
{
    let mut rx = bar.subscribe();
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if rx.borrow_and_update().status != SearchStatus::Pending {
                return;
            }
            rx.changed().await.unwrap();
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_typing_burst_sends_one_query() {
    let cms = fake_cms().await;
    let bar = state(&cms).search_bar();

    for text in ["c", "ca", "cam", "cami", "camis"] {
        bar.set_query(text);
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    wait_until_settled(&bar).await;

    assert_eq!(bar.status(), SearchStatus::Loaded);
    assert_eq!(bar.results().len(), 2);
    assert_eq!(cms.hits(), 1);
    assert_eq!(
        cms.requests().pop().unwrap().param("search"),
        Some("camis*")
    );
}

#[tokio::test]
async fn test_no_matches_is_loaded_and_empty() {
    let cms = fake_cms().await;
    let bar = state(&cms).search_bar();

    bar.set_query("zapato");
    wait_until_settled(&bar).await;

    assert_eq!(bar.status(), SearchStatus::Loaded);
    assert!(bar.results().is_empty());
}

#[tokio::test]
async fn test_blank_query_never_reaches_cms() {
    let cms = fake_cms().await;
    let bar = state(&cms).search_bar();

    bar.set_query("   ");
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(bar.status(), SearchStatus::Idle);
    assert_eq!(cms.hits(), 0);
}

#[tokio::test]
async fn test_cms_failure_clears_results() {
    let cms = FakeCms::start(|_| CmsReply::rate_limited(2)).await;
    let bar = state(&cms).search_bar();

    bar.set_query("camis");
    wait_until_settled(&bar).await;

    assert_eq!(bar.status(), SearchStatus::Error);
    assert!(bar.results().is_empty());
    assert!(!bar.is_loading());
}
