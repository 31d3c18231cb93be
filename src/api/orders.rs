use async_trait::async_trait;
use tracing::instrument;

use super::{ApiClient, OrderQuery, OrdersApi};
use crate::{
    errors::ServiceError,
    models::{
        CreateOrderRequest, Order, OrderStatus, OrderTracking, ResourceId,
        UpdateOrderStatusRequest,
    },
    Paginated,
};

#[async_trait]
impl OrdersApi for ApiClient {
    #[instrument(skip(self))]
    async fn list_orders(&self, query: &OrderQuery) -> Result<Paginated<Order>, ServiceError> {
        self.get_with_query("orders", query).await
    }

    #[instrument(skip(self))]
    async fn get_order(&self, id: ResourceId) -> Result<Order, ServiceError> {
        self.get(&format!("orders/{}", id)).await
    }

    #[instrument(skip(self, request), fields(items = request.items.len()))]
    async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, ServiceError> {
        self.post("orders", request).await
    }

    #[instrument(skip(self), fields(order_id = %id, new_status = %status))]
    async fn update_order_status(
        &self,
        id: ResourceId,
        status: OrderStatus,
    ) -> Result<Order, ServiceError> {
        let body = UpdateOrderStatusRequest {
            status,
            notes: None,
        };
        self.put(&format!("orders/{}/status", id), &body).await
    }

    #[instrument(skip(self))]
    async fn cancel_order(&self, id: ResourceId) -> Result<Order, ServiceError> {
        self.put(&format!("orders/{}/cancel", id), &serde_json::json!({}))
            .await
    }

    #[instrument(skip(self))]
    async fn track_order(&self, id: ResourceId) -> Result<OrderTracking, ServiceError> {
        self.get(&format!("orders/{}/tracking", id)).await
    }
}
