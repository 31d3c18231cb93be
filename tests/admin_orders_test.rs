//! Admin orders board and tracking page against a mocked backend.

mod common;

use std::sync::Arc;

use common::{envelope, order_json, page, TestBackend};
use robotics_storefront::{
    api::OrderQuery,
    models::OrderStatus,
    services::{AdminOrderBoard, OrderSort, OrderTrackingService, Selection},
};
use serde_json::json;
use wiremock::{
    matchers::{method, path},
    Mock, ResponseTemplate,
};

async fn mount_orders(backend: &TestBackend) {
    Mock::given(method("GET"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![
            order_json(1, "pending"),
            order_json(2, "processing"),
            order_json(3, "pending"),
            order_json(4, "delivered"),
        ])))
        .mount(&backend.server)
        .await;
}

#[tokio::test]
async fn shipping_one_order_leaves_the_rest_untouched() {
    let backend = TestBackend::start().await;
    mount_orders(&backend).await;
    Mock::given(method("PUT"))
        .and(path("/api/orders/2/status"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(order_json(2, "shipped"))),
        )
        .expect(1)
        .mount(&backend.server)
        .await;

    let store = backend.store();
    let mut board = AdminOrderBoard::for_store(&store);
    board.load(OrderQuery::default()).await.expect("orders load");
    let before = board.orders().to_vec();

    board
        .handle_status_update(2, OrderStatus::Shipped)
        .await
        .expect("status updated");

    let after = board.orders();
    assert_eq!(after[1].status, OrderStatus::Shipped);
    for index in [0, 2, 3] {
        assert!(Arc::ptr_eq(&before[index], &after[index]));
    }
}

#[tokio::test]
async fn pending_filter_then_reset_restores_original_list() {
    let backend = TestBackend::start().await;
    mount_orders(&backend).await;

    let mut board = AdminOrderBoard::new(backend.services().orders);
    board.load(OrderQuery::default()).await.expect("orders load");

    board.filters.status = Selection::Only(OrderStatus::Pending);
    board.filters.category = Selection::All;
    board.filters.sort = Some(OrderSort::Oldest);
    let filtered: Vec<u64> = board.visible_orders().iter().map(|o| o.id).collect();
    assert_eq!(filtered, vec![1, 3]);

    board.reset_filters();
    let all = board.visible_orders();
    assert_eq!(all.len(), board.orders().len());
    assert!(all.iter().zip(board.orders()).all(|(a, b)| Arc::ptr_eq(a, b)));
}

#[tokio::test]
async fn failed_load_sets_banner_and_retry_recovers() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&backend.server)
        .await;
    mount_orders(&backend).await;

    let mut board = AdminOrderBoard::new(backend.services().orders);
    assert!(board.load(OrderQuery::default()).await.is_err());
    assert_eq!(board.error(), Some("Something went wrong on our side."));
    assert!(!board.is_loading());
    assert!(board.can_retry());

    board.retry().await.expect("retry succeeds");
    assert!(board.error().is_none());
    assert_eq!(board.orders().len(), 4);
}

#[tokio::test]
async fn tracking_view_renders_timeline() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/api/orders/4/tracking"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "order_id": 4,
            "status": "returned",
            "tracking_number": "1Z4",
            "carrier": "UPS",
            "events": [
                { "status": "pending", "description": "Order placed", "timestamp": "2024-02-01T09:00:00Z" },
                { "status": "delivered", "description": "Delivered", "timestamp": "2024-02-05T16:30:00Z", "location": "Austin, TX" },
                { "status": "returned", "description": "Return received", "timestamp": "2024-02-12T11:00:00Z" }
            ]
        }))))
        .mount(&backend.server)
        .await;

    let view = OrderTrackingService::new(backend.services().orders)
        .track(4)
        .await
        .expect("tracking loads");

    assert_eq!(view.progress, None);
    assert_eq!(view.rows.len(), 3);
    assert!(view.rows[2].is_current);
    assert_eq!(view.rows[1].location.as_deref(), Some("Austin, TX"));
    assert_eq!(view.rows[0].display_time, "Feb 01, 2024 09:00");
}
