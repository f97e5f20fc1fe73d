//! Integration tests for catalog queries and the catalog cache.
//!
//! Run with: cargo test -p shopfront-integration-tests --test catalog

use rust_decimal::Decimal;
use secrecy::SecretString;
use shopfront_client::api::products::ProductQuery;
use shopfront_core::{CategoryId, Price, ProductId, ProductUpdate};
use shopfront_integration_tests::{
    ADMIN_EMAIL, COCONUT, MANGO, PANTRY, PASSWORD, PINEAPPLE, RETIRED, TestBackend,
};

fn ids(products: &[shopfront_core::Product]) -> Vec<&str> {
    products.iter().map(|p| p.id.as_str()).collect()
}

#[tokio::test]
async fn test_listing_filters() {
    let backend = TestBackend::start().await;
    let store = backend.storefront();
    let api = store.api();

    let all = api.list_products(&ProductQuery::new()).await.expect("list");
    assert_eq!(ids(&all), vec![PINEAPPLE, MANGO, COCONUT]);
    assert!(!ids(&all).contains(&RETIRED));

    let search = api
        .list_products(&ProductQuery::new().search("MANGO"))
        .await
        .expect("search");
    assert_eq!(ids(&search), vec![MANGO]);

    let pantry = api
        .list_products(&ProductQuery::new().category(CategoryId::new(PANTRY)))
        .await
        .expect("category");
    assert_eq!(ids(&pantry), vec![COCONUT]);

    let cheap = api
        .list_products(&ProductQuery::new().price_range(None, Price::new(Decimal::new(6, 0))))
        .await
        .expect("price range");
    assert_eq!(ids(&cheap), vec![MANGO]);

    let page = api
        .list_products(&ProductQuery::new().skip(1).limit(1))
        .await
        .expect("page");
    assert_eq!(ids(&page), vec![MANGO]);
}

#[tokio::test]
async fn test_product_detail_is_cached() {
    let backend = TestBackend::start().await;
    let store = backend.storefront();
    let id = ProductId::new(PINEAPPLE);

    let first = store.api().product(&id).await.expect("product");
    let second = store.api().product(&id).await.expect("product");

    assert_eq!(first, second);
    assert_eq!(backend.hits("GET", "/api/v1/products/p-pineapple"), 1);
}

#[tokio::test]
async fn test_listings_are_not_cached() {
    let backend = TestBackend::start().await;
    let store = backend.storefront();

    store.api().list_products(&ProductQuery::new()).await.expect("list");
    store.api().list_products(&ProductQuery::new()).await.expect("list");

    assert_eq!(backend.hits("GET", "/api/v1/products/"), 2);
}

#[tokio::test]
async fn test_categories_are_cached() {
    let backend = TestBackend::start().await;
    let store = backend.storefront();

    let categories = store.api().categories().await.expect("categories");
    assert_eq!(categories.len(), 2);
    store.api().categories().await.expect("categories");
    let fruit = store
        .api()
        .category(&categories[0].id)
        .await
        .expect("category");
    assert_eq!(fruit.name, "Fruit");

    assert_eq!(backend.hits("GET", "/api/v1/products/categories"), 1);
}

#[tokio::test]
async fn test_invalidation_picks_up_changes() {
    let backend = TestBackend::start().await;
    let store = backend.storefront();
    let id = ProductId::new(PINEAPPLE);
    store.api().product(&id).await.expect("product");

    backend.rename_product(PINEAPPLE, "Queen Pineapple");
    let cached = store.api().product(&id).await.expect("product");
    assert_eq!(cached.name, "Golden Pineapple");

    store.api().invalidate_catalog();
    let fresh = store.api().product(&id).await.expect("product");
    assert_eq!(fresh.name, "Queen Pineapple");
}

#[tokio::test]
async fn test_admin_update_invalidates_cache() {
    let backend = TestBackend::start().await;
    let store = backend.storefront();
    assert!(store.login(ADMIN_EMAIL, &SecretString::from(PASSWORD)).await);
    let id = ProductId::new(MANGO);
    store.api().product(&id).await.expect("product");

    let update = ProductUpdate {
        stock_quantity: Some(99),
        ..ProductUpdate::default()
    };
    store
        .api()
        .admin_update_product(&id, &update)
        .await
        .expect("admin update");

    let product = store.api().product(&id).await.expect("product");
    assert_eq!(product.stock_quantity, 99);
    assert_eq!(backend.hits("GET", "/api/v1/products/p-mango"), 2);
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let backend = TestBackend::start().await;
    let store = backend.storefront();

    let err = store
        .api()
        .product(&ProductId::new(RETIRED))
        .await
        .expect_err("inactive products are hidden");
    assert!(err.is_not_found());
    assert_eq!(err.detail(), Some("Product not found"));
}
