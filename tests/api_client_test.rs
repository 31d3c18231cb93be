//! HTTP client tests against a wiremock backend.
//!
//! Covers envelope decoding, query strings, request headers and the mapping
//! of error statuses onto `ServiceError`.

mod common;

use assert_matches::assert_matches;
use common::{cart_json, envelope, order_json, page, TestBackend};
use robotics_storefront::{
    api::{CartApi, CategoriesApi, CustomersApi, OrderQuery, OrdersApi, WishlistApi},
    models::{CustomerTier, OrderStatus},
    ServiceError,
};
use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::{
    matchers::{body_json, header, header_exists, method, path, query_param},
    Mock, ResponseTemplate,
};

#[tokio::test]
async fn list_orders_decodes_paginated_envelope_and_sends_query() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/api/orders"))
        .and(query_param("status", "pending"))
        .and(query_param("page", "2"))
        .and(header_exists("X-Request-Id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![
            order_json(1, "pending"),
            order_json(2, "pending"),
        ])))
        .expect(1)
        .mount(&backend.server)
        .await;

    let result = backend
        .client()
        .list_orders(&OrderQuery {
            page: Some(2),
            status: Some(OrderStatus::Pending),
            ..Default::default()
        })
        .await
        .expect("orders decode");

    assert_eq!(result.data.len(), 2);
    assert_eq!(result.meta.total, 2);
    assert_eq!(result.data[0].totals.total, dec!(58.59));
    assert_eq!(result.data[1].items[0].line_total(), dec!(45.00));
}

#[tokio::test]
async fn update_status_puts_snake_case_body() {
    let backend = TestBackend::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/orders/12/status"))
        .and(body_json(json!({ "status": "shipped" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(order_json(12, "shipped"))),
        )
        .expect(1)
        .mount(&backend.server)
        .await;

    let order = backend
        .client()
        .update_order_status(12, OrderStatus::Shipped)
        .await
        .expect("status updated");

    assert_eq!(order.status, OrderStatus::Shipped);
}

#[tokio::test]
async fn bearer_token_is_forwarded() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .and(header("Authorization", "Bearer session-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_json(&[(1, "12.00", 2)])))
        .expect(1)
        .mount(&backend.server)
        .await;

    let cart = backend
        .client()
        .with_token("session-token")
        .get_cart()
        .await
        .expect("cart loads");

    assert_eq!(cart.item_count(), 2);
    assert_eq!(cart.subtotal(), dec!(24.00));
}

#[tokio::test]
async fn validation_errors_are_flattened_into_message() {
    let backend = TestBackend::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/customers/3/tier"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "The given data was invalid.",
            "errors": { "tier": ["The selected tier is invalid."] }
        })))
        .mount(&backend.server)
        .await;

    let err = backend
        .client()
        .update_customer_tier(3, CustomerTier::Platinum)
        .await
        .unwrap_err();

    assert_matches!(
        err,
        ServiceError::ValidationError(ref message)
            if message == "The given data was invalid. (tier: The selected tier is invalid.)"
    );
}

#[tokio::test]
async fn status_codes_map_to_error_variants() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/api/orders/404"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Order not found" })),
        )
        .mount(&backend.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/orders/500"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&backend.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/orders/401"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&backend.server)
        .await;

    let client = backend.client();

    let not_found = client.get_order(404).await.unwrap_err();
    assert_matches!(not_found, ServiceError::NotFound(ref m) if m == "Order not found");
    assert_eq!(not_found.user_message(), "Order not found");

    let server_error = client.get_order(500).await.unwrap_err();
    assert_matches!(server_error, ServiceError::ApiError { status: 500, .. });
    assert!(server_error.is_retryable());
    assert_eq!(server_error.user_message(), "Something went wrong on our side.");

    let unauthorized = client.get_order(401).await.unwrap_err();
    assert_matches!(unauthorized, ServiceError::Unauthorized(_));
}

#[tokio::test]
async fn malformed_body_is_a_serialization_error() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/api/orders/8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 8 })))
        .mount(&backend.server)
        .await;

    let err = backend.client().get_order(8).await.unwrap_err();
    assert_matches!(err, ServiceError::SerializationError(_));
}

#[tokio::test]
async fn delete_endpoints_ignore_body() {
    let backend = TestBackend::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/wishlist/77"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&backend.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/cart"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "Cart cleared" })),
        )
        .expect(1)
        .mount(&backend.server)
        .await;

    let client = backend.client();
    client.remove_from_wishlist(77).await.expect("wishlist delete");
    client.clear_cart().await.expect("cart delete");
}

#[tokio::test]
async fn categories_decode_from_plain_envelope() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
            { "id": 1, "name": "Sensors", "slug": "sensors", "products_count": 14 },
            { "id": 2, "name": "Actuators" }
        ]))))
        .expect(1)
        .mount(&backend.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/categories/2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&backend.server)
        .await;

    let client = backend.client();
    let categories = client.list_categories().await.expect("categories decode");
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].products_count, Some(14));
    assert_eq!(categories[1].slug, None);

    client.delete_category(2).await.expect("category delete");
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let client = robotics_storefront::ApiClient::with_timeout(
        "http://127.0.0.1:9/api/",
        std::time::Duration::from_secs(2),
    )
    .expect("client builds");

    let err = client.get_cart().await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(
        err.user_message(),
        "Unable to reach the server. Check your connection."
    );
}
