use async_trait::async_trait;
use serde::Serialize;
use tracing::instrument;

use super::{ApiClient, CartApi, WishlistApi};
use crate::{
    errors::ServiceError,
    models::{AddToCartRequest, Cart, ResourceId, UpdateCartItemRequest, WishlistItem},
};

#[derive(Serialize)]
struct AddToWishlistRequest {
    product_id: ResourceId,
}

#[async_trait]
impl CartApi for ApiClient {
    #[instrument(skip(self))]
    async fn get_cart(&self) -> Result<Cart, ServiceError> {
        self.get("cart").await
    }

    #[instrument(skip(self))]
    async fn add_item(&self, request: &AddToCartRequest) -> Result<Cart, ServiceError> {
        self.post("cart/items", request).await
    }

    #[instrument(skip(self))]
    async fn update_item(
        &self,
        item_id: ResourceId,
        request: &UpdateCartItemRequest,
    ) -> Result<Cart, ServiceError> {
        self.put(&format!("cart/items/{}", item_id), request).await
    }

    #[instrument(skip(self))]
    async fn remove_item(&self, item_id: ResourceId) -> Result<Cart, ServiceError> {
        self.delete_returning(&format!("cart/items/{}", item_id))
            .await
    }

    #[instrument(skip(self))]
    async fn clear_cart(&self) -> Result<(), ServiceError> {
        self.delete("cart").await
    }
}

#[async_trait]
impl WishlistApi for ApiClient {
    #[instrument(skip(self))]
    async fn list_wishlist(&self) -> Result<Vec<WishlistItem>, ServiceError> {
        self.get("wishlist").await
    }

    #[instrument(skip(self))]
    async fn add_to_wishlist(&self, product_id: ResourceId) -> Result<WishlistItem, ServiceError> {
        self.post("wishlist", &AddToWishlistRequest { product_id })
            .await
    }

    #[instrument(skip(self))]
    async fn remove_from_wishlist(&self, product_id: ResourceId) -> Result<(), ServiceError> {
        self.delete(&format!("wishlist/{}", product_id)).await
    }
}
