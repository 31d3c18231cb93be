//! Checkout stepper driven end to end against a mocked backend.

mod common;

use assert_matches::assert_matches;
use common::{address_json, cart_json, envelope, order_json, TestBackend};
use robotics_storefront::{
    models::{Address, OrderStatus, PaymentMethod},
    services::{CheckoutStep, CheckoutStepper},
    ServiceError,
};
use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, ResponseTemplate,
};

fn shipping_address() -> Address {
    serde_json::from_value(address_json()).expect("address fixture")
}

async fn mount_cart(backend: &TestBackend, price: &str, quantity: u32) {
    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_json(&[(1, price, quantity)])))
        .mount(&backend.server)
        .await;
}

#[tokio::test]
async fn placing_an_order_reaches_confirmation_and_clears_cart() {
    let backend = TestBackend::start().await;
    mount_cart(&backend, "15.00", 3).await;
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .and(body_partial_json(json!({
            "payment_method": "paypal",
            "subtotal": "45.00",
            "shipping": "9.99",
            "total": "58.59",
            "items": [{ "product_id": 501, "quantity": 3, "price": "15.00" }]
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(envelope(order_json(900, "pending"))),
        )
        .expect(1)
        .mount(&backend.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&backend.server)
        .await;

    let store = backend.store();
    store.cart.fetch_cart().await.expect("cart loads");
    assert_eq!(store.cart.totals().shipping, dec!(9.99));

    let mut stepper = CheckoutStepper::new(backend.config.pricing.clone());
    assert_eq!(stepper.handle_next(), CheckoutStep::Shipping);
    stepper.shipping_address = shipping_address();
    assert_eq!(stepper.handle_next(), CheckoutStep::Payment);
    stepper.payment_method = Some(PaymentMethod::Paypal);

    let order = stepper.place_order(&store).await.expect("order placed");

    assert_eq!(stepper.active_step(), CheckoutStep::Confirmation);
    assert_eq!(stepper.created_order().map(|o| o.id), Some(900));
    assert_eq!(order.status, OrderStatus::Pending);
    assert!(store.cart.snapshot().cart.is_empty());
    assert_eq!(store.orders.snapshot().current.map(|o| o.id), Some(900));
}

#[tokio::test]
async fn rejected_order_keeps_payment_step() {
    let backend = TestBackend::start().await;
    mount_cart(&backend, "60.00", 1).await;
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Insufficient stock for Sensor 1"
        })))
        .expect(1)
        .mount(&backend.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&backend.server)
        .await;

    let store = backend.store();
    store.cart.fetch_cart().await.expect("cart loads");

    let mut stepper = CheckoutStepper::new(backend.config.pricing.clone());
    stepper.handle_next();
    stepper.handle_next();
    stepper.shipping_address = shipping_address();
    stepper.payment_method = Some(PaymentMethod::CreditCard);

    let err = stepper.place_order(&store).await.unwrap_err();

    assert_matches!(err, ServiceError::ValidationError(_));
    assert_eq!(stepper.active_step(), CheckoutStep::Payment);
    assert!(stepper.created_order().is_none());
    assert_eq!(store.cart.snapshot().cart.items.len(), 1);
    assert_eq!(
        store.orders.snapshot().error.as_deref(),
        Some("Insufficient stock for Sensor 1")
    );
}

#[tokio::test]
async fn incomplete_form_never_calls_backend() {
    let backend = TestBackend::start().await;
    mount_cart(&backend, "10.00", 1).await;
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&backend.server)
        .await;

    let store = backend.store();
    store.cart.fetch_cart().await.expect("cart loads");

    let mut stepper = CheckoutStepper::new(backend.config.pricing.clone());
    stepper.payment_method = Some(PaymentMethod::CashOnDelivery);

    let err = stepper.place_order(&store).await.unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
    assert_eq!(stepper.active_step(), CheckoutStep::CartReview);
}

#[tokio::test]
async fn empty_cart_cannot_be_submitted() {
    let backend = TestBackend::start().await;
    let store = backend.store();
    let mut stepper = CheckoutStepper::new(backend.config.pricing.clone());
    stepper.shipping_address = shipping_address();
    stepper.payment_method = Some(PaymentMethod::Paypal);

    let err = stepper.place_order(&store).await.unwrap_err();
    assert_matches!(err, ServiceError::InvalidOperation(_));
}
