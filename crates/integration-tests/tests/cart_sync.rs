//! Integration tests for cart state against the backend.
//!
//! Run with: cargo test -p shopfront-integration-tests --test cart_sync

use rust_decimal::Decimal;
use secrecy::SecretString;
use shopfront_client::{NoticeLevel, Storefront};
use shopfront_core::{Price, ProductId, Quantity};
use shopfront_integration_tests::{
    COCONUT, CUSTOMER_EMAIL, MANGO, PASSWORD, PINEAPPLE, TestBackend, drain, drain_messages,
};

async fn logged_in(backend: &TestBackend) -> Storefront {
    let store = backend.storefront();
    assert!(
        store
            .login(CUSTOMER_EMAIL, &SecretString::from(PASSWORD))
            .await
    );
    store
}

fn qty(n: u32) -> Quantity {
    Quantity::new(n).expect("positive quantity")
}

#[tokio::test]
async fn test_add_without_login_sends_nothing() {
    let backend = TestBackend::start().await;
    let store = backend.storefront();
    let mut notices = store.notices().subscribe();

    assert!(!store.cart().add(&ProductId::new(PINEAPPLE), Quantity::ONE).await);

    assert_eq!(backend.total_hits(), 0);
    let notices = drain(&mut notices);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].message, "Please login to add items to cart");
}

#[tokio::test]
async fn test_every_mutation_rereads_the_server() {
    let backend = TestBackend::start().await;
    let store = logged_in(&backend).await;
    let cart = store.cart();

    assert!(cart.add(&ProductId::new(PINEAPPLE), qty(2)).await);
    assert_eq!(cart.items(), backend.cart_of(CUSTOMER_EMAIL));

    assert!(cart.add(&ProductId::new(MANGO), Quantity::ONE).await);
    assert_eq!(cart.items(), backend.cart_of(CUSTOMER_EMAIL));

    let mango = cart.items()[1].id.clone();
    assert!(cart.update(&mango, 3).await);
    assert_eq!(cart.items(), backend.cart_of(CUSTOMER_EMAIL));

    let pineapple = cart.items()[0].id.clone();
    assert!(cart.remove(&pineapple).await);
    assert_eq!(cart.items(), backend.cart_of(CUSTOMER_EMAIL));

    // One read at login plus one per mutation.
    assert_eq!(backend.hits("GET", "/api/v1/cart/"), 5);
}

#[tokio::test]
async fn test_adding_same_product_merges_on_server() {
    let backend = TestBackend::start().await;
    let store = logged_in(&backend).await;
    let mut notices = store.notices().subscribe();

    assert!(store.cart().add(&ProductId::new(PINEAPPLE), qty(2)).await);
    assert!(store.cart().add(&ProductId::new(PINEAPPLE), qty(3)).await);

    assert_eq!(store.cart().items().len(), 1);
    assert_eq!(store.cart().count(), 5);
    assert_eq!(
        drain_messages(&mut notices),
        vec!["Added to cart successfully!", "Added to cart successfully!"]
    );
}

#[tokio::test]
async fn test_update_below_one_sends_one() {
    let backend = TestBackend::start().await;
    backend.put_in_cart(CUSTOMER_EMAIL, PINEAPPLE, 4);
    let store = logged_in(&backend).await;
    let line = store.cart().items()[0].id.clone();

    assert!(store.cart().update(&line, 0).await);
    assert_eq!(backend.cart_of(CUSTOMER_EMAIL)[0].quantity, Quantity::ONE);

    assert!(store.cart().update(&line, -7).await);
    assert_eq!(backend.cart_of(CUSTOMER_EMAIL)[0].quantity, Quantity::ONE);
    assert_eq!(store.cart().count(), 1);
}

#[tokio::test]
async fn test_increment_and_decrement_stop_at_one() {
    let backend = TestBackend::start().await;
    backend.put_in_cart(CUSTOMER_EMAIL, PINEAPPLE, 1);
    let store = logged_in(&backend).await;
    let line = store.cart().items()[0].id.clone();

    assert!(store.cart().increment(&line).await);
    assert!(store.cart().increment(&line).await);
    assert_eq!(store.cart().quantity_of(&line), Some(qty(3)));

    for _ in 0..4 {
        assert!(store.cart().decrement(&line).await);
    }
    assert_eq!(store.cart().quantity_of(&line), Some(Quantity::ONE));
}

#[tokio::test]
async fn test_stock_error_uses_server_detail() {
    let backend = TestBackend::start().await;
    let store = logged_in(&backend).await;
    let mut notices = store.notices().subscribe();

    assert!(!store.cart().add(&ProductId::new(MANGO), qty(5)).await);

    assert!(store.cart().is_empty());
    assert_eq!(drain_messages(&mut notices), vec!["Not enough stock available"]);
}

#[tokio::test]
async fn test_error_without_detail_uses_fallback() {
    let backend = TestBackend::start().await;
    let store = logged_in(&backend).await;
    let mut notices = store.notices().subscribe();

    backend.fail_next("POST", "/api/v1/cart/", 500, None);
    assert!(!store.cart().add(&ProductId::new(PINEAPPLE), Quantity::ONE).await);
    assert_eq!(drain_messages(&mut notices), vec!["Failed to add to cart"]);

    backend.fail_next("PUT", "/api/v1/cart/missing", 502, None);
    assert!(!store.cart().update(&"missing".into(), 2).await);
    assert_eq!(drain_messages(&mut notices), vec!["Failed to update cart"]);
}

#[tokio::test]
async fn test_failed_read_keeps_last_good_state() {
    let backend = TestBackend::start().await;
    backend.put_in_cart(CUSTOMER_EMAIL, PINEAPPLE, 2);
    let store = logged_in(&backend).await;
    let before = store.cart().items();
    let mut notices = store.notices().subscribe();

    backend.fail_next("GET", "/api/v1/cart/", 503, Some("Service unavailable"));
    assert!(!store.cart().fetch().await);

    assert_eq!(store.cart().items(), before);
    assert!(!store.cart().is_loading());
    assert_eq!(drain_messages(&mut notices), vec!["Service unavailable"]);
}

#[tokio::test]
async fn test_clear_empty_cart_succeeds_without_reread() {
    let backend = TestBackend::start().await;
    let store = logged_in(&backend).await;
    let reads = backend.hits("GET", "/api/v1/cart/");

    assert!(store.cart().clear().await);

    assert!(store.cart().is_empty());
    assert_eq!(backend.hits("DELETE", "/api/v1/cart/"), 1);
    assert_eq!(backend.hits("GET", "/api/v1/cart/"), reads);
}

#[tokio::test]
async fn test_clear_non_empty_cart() {
    let backend = TestBackend::start().await;
    backend.put_in_cart(CUSTOMER_EMAIL, PINEAPPLE, 2);
    let store = logged_in(&backend).await;
    let mut notices = store.notices().subscribe();

    assert!(store.cart().clear().await);

    assert!(store.cart().is_empty());
    assert!(backend.cart_of(CUSTOMER_EMAIL).is_empty());
    assert_eq!(drain_messages(&mut notices), vec!["Cart cleared successfully!"]);
}

#[tokio::test]
async fn test_count_and_total_follow_server_lines() {
    let backend = TestBackend::start().await;
    // $10.00 x 2 and $5.00 x 1
    backend.put_in_cart(CUSTOMER_EMAIL, COCONUT, 2);
    backend.put_in_cart(CUSTOMER_EMAIL, MANGO, 1);
    let store = logged_in(&backend).await;

    assert_eq!(store.cart().count(), 3);
    assert_eq!(store.cart().total(), Price::from_cents(2500));
    assert_eq!(store.cart().total().amount(), Decimal::new(25, 0));
}

#[tokio::test]
async fn test_changes_made_elsewhere_appear_after_next_mutation() {
    let backend = TestBackend::start().await;
    let store = logged_in(&backend).await;

    backend.put_in_cart(CUSTOMER_EMAIL, MANGO, 2);
    assert!(store.cart().is_empty());

    assert!(store.cart().add(&ProductId::new(PINEAPPLE), Quantity::ONE).await);
    assert_eq!(store.cart().items().len(), 2);
    assert_eq!(store.cart().count(), 3);
}
