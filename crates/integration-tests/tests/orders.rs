//! Integration tests for checkout and order cancellation.
//!
//! Run with: cargo test -p shopfront-integration-tests --test orders

use rust_decimal::Decimal;
use secrecy::SecretString;
use shopfront_client::Storefront;
use shopfront_core::{OrderStatus, OrderUpdate, ProductId, Quantity};
use shopfront_integration_tests::{
    ADMIN_EMAIL, CUSTOMER_EMAIL, MANGO, PASSWORD, PINEAPPLE, TestBackend, drain_messages,
};

async fn login(backend: &TestBackend, email: &str) -> Storefront {
    let store = backend.storefront();
    assert!(store.login(email, &SecretString::from(PASSWORD)).await);
    store
}

#[tokio::test]
async fn test_checkout_places_order_and_reloads_cart() {
    let backend = TestBackend::start().await;
    backend.put_in_cart(CUSTOMER_EMAIL, PINEAPPLE, 2);
    backend.put_in_cart(CUSTOMER_EMAIL, MANGO, 1);
    let store = login(&backend, CUSTOMER_EMAIL).await;
    let mut notices = store.notices().subscribe();

    let order = store
        .checkout("  1 Dock Rd, Portsmouth ")
        .await
        .expect("order placed");

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.unit_count(), 3);
    assert_eq!(order.total_amount, Decimal::new(30, 0));
    assert_eq!(order.shipping_address, "1 Dock Rd, Portsmouth");

    assert!(store.cart().is_empty());
    assert!(backend.cart_of(CUSTOMER_EMAIL).is_empty());
    assert_eq!(backend.stock_of(PINEAPPLE), 38);
    assert_eq!(drain_messages(&mut notices), vec!["Order placed successfully!"]);

    let orders = store.api().orders().await.expect("orders");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, order.id);
}

#[tokio::test]
async fn test_checkout_with_empty_cart_sends_nothing() {
    let backend = TestBackend::start().await;
    let store = login(&backend, CUSTOMER_EMAIL).await;
    let mut notices = store.notices().subscribe();

    assert!(store.checkout("1 Dock Rd").await.is_none());
    assert_eq!(backend.hits("POST", "/api/v1/orders/"), 0);
    assert_eq!(drain_messages(&mut notices), vec!["Your cart is empty"]);
}

#[tokio::test]
async fn test_checkout_requires_address() {
    let backend = TestBackend::start().await;
    let store = login(&backend, CUSTOMER_EMAIL).await;
    store
        .cart()
        .add(&ProductId::new(PINEAPPLE), Quantity::ONE)
        .await;
    let mut notices = store.notices().subscribe();

    assert!(store.checkout("   ").await.is_none());
    assert_eq!(backend.hits("POST", "/api/v1/orders/"), 0);
    assert_eq!(
        drain_messages(&mut notices),
        vec!["Shipping address is required"]
    );
}

#[tokio::test]
async fn test_cancel_restores_stock_once() {
    let backend = TestBackend::start().await;
    backend.put_in_cart(CUSTOMER_EMAIL, MANGO, 2);
    let store = login(&backend, CUSTOMER_EMAIL).await;
    let order = store.checkout("1 Dock Rd").await.expect("order placed");
    assert_eq!(backend.stock_of(MANGO), 1);
    let mut notices = store.notices().subscribe();

    assert!(store.cancel_order(&order.id).await);
    let path = format!("/api/v1/orders/{}/cancel", order.id);
    assert_eq!(backend.hits("POST", &path), 1);
    assert_eq!(backend.stock_of(MANGO), 3);

    assert!(!store.cancel_order(&order.id).await);
    assert_eq!(backend.stock_of(MANGO), 3);
    assert_eq!(
        drain_messages(&mut notices),
        vec![
            "Order cancelled successfully!",
            "Only pending orders can be cancelled"
        ]
    );

    let reloaded = store.api().order(&order.id).await.expect("order");
    assert_eq!(reloaded.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn test_shipped_orders_cannot_be_cancelled() {
    let backend = TestBackend::start().await;
    backend.put_in_cart(CUSTOMER_EMAIL, PINEAPPLE, 1);
    let customer = login(&backend, CUSTOMER_EMAIL).await;
    let order = customer.checkout("1 Dock Rd").await.expect("order placed");

    let admin = login(&backend, ADMIN_EMAIL).await;
    let update = OrderUpdate {
        status: Some(OrderStatus::Shipped),
        shipping_address: None,
    };
    let shipped = admin
        .api()
        .admin_update_order(&order.id, &update)
        .await
        .expect("admin update");
    assert_eq!(shipped.status, OrderStatus::Shipped);
    assert!(!shipped.status.is_cancellable());

    assert!(!customer.cancel_order(&order.id).await);
}

#[tokio::test]
async fn test_other_users_orders_are_not_found() {
    let backend = TestBackend::start().await;
    backend.put_in_cart(CUSTOMER_EMAIL, PINEAPPLE, 1);
    let customer = login(&backend, CUSTOMER_EMAIL).await;
    let order = customer.checkout("1 Dock Rd").await.expect("order placed");

    let other = login(&backend, shopfront_integration_tests::SECOND_CUSTOMER_EMAIL).await;
    let err = other
        .api()
        .order(&order.id)
        .await
        .expect_err("not visible to other users");
    assert!(err.is_not_found());
}
