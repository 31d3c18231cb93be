//! Backend seams.
//!
//! Each resource family is a trait so slices and page workflows can be driven
//! by the HTTP client in production and by mocks in tests. [`ApiClient`]
//! implements all of them.

use async_trait::async_trait;
use serde::Serialize;

use crate::{
    errors::ServiceError,
    models::{
        AddToCartRequest, Cart, Category, CategoryInput, CreateOrderRequest, Customer,
        CustomerStatus, CustomerTier, Order, OrderStatus, OrderTracking, Product, ProductInput,
        ProductStatus, ResourceId, UpdateCartItemRequest, WishlistItem,
    },
    Paginated,
};

pub mod cart;
pub mod catalog;
pub mod client;
pub mod customers;
pub mod orders;

pub use client::ApiClient;

/// Query string for `GET orders`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

/// Query string for `GET products`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<ResourceId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProductStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

/// Query string for `GET customers`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CustomerQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<CustomerTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CustomerStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrdersApi: Send + Sync {
    async fn list_orders(&self, query: &OrderQuery) -> Result<Paginated<Order>, ServiceError>;
    async fn get_order(&self, id: ResourceId) -> Result<Order, ServiceError>;
    async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, ServiceError>;
    async fn update_order_status(
        &self,
        id: ResourceId,
        status: OrderStatus,
    ) -> Result<Order, ServiceError>;
    async fn cancel_order(&self, id: ResourceId) -> Result<Order, ServiceError>;
    async fn track_order(&self, id: ResourceId) -> Result<OrderTracking, ServiceError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductsApi: Send + Sync {
    async fn list_products(&self, query: &ProductQuery)
        -> Result<Paginated<Product>, ServiceError>;
    async fn get_product(&self, id: ResourceId) -> Result<Product, ServiceError>;
    async fn create_product(&self, input: &ProductInput) -> Result<Product, ServiceError>;
    async fn update_product(
        &self,
        id: ResourceId,
        input: &ProductInput,
    ) -> Result<Product, ServiceError>;
    async fn delete_product(&self, id: ResourceId) -> Result<(), ServiceError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoriesApi: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>, ServiceError>;
    async fn create_category(&self, input: &CategoryInput) -> Result<Category, ServiceError>;
    async fn update_category(
        &self,
        id: ResourceId,
        input: &CategoryInput,
    ) -> Result<Category, ServiceError>;
    async fn delete_category(&self, id: ResourceId) -> Result<(), ServiceError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomersApi: Send + Sync {
    async fn list_customers(
        &self,
        query: &CustomerQuery,
    ) -> Result<Paginated<Customer>, ServiceError>;
    async fn update_customer_tier(
        &self,
        id: ResourceId,
        tier: CustomerTier,
    ) -> Result<Customer, ServiceError>;
    async fn update_customer_status(
        &self,
        id: ResourceId,
        status: CustomerStatus,
    ) -> Result<Customer, ServiceError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartApi: Send + Sync {
    async fn get_cart(&self) -> Result<Cart, ServiceError>;
    async fn add_item(&self, request: &AddToCartRequest) -> Result<Cart, ServiceError>;
    async fn update_item(
        &self,
        item_id: ResourceId,
        request: &UpdateCartItemRequest,
    ) -> Result<Cart, ServiceError>;
    async fn remove_item(&self, item_id: ResourceId) -> Result<Cart, ServiceError>;
    async fn clear_cart(&self) -> Result<(), ServiceError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WishlistApi: Send + Sync {
    async fn list_wishlist(&self) -> Result<Vec<WishlistItem>, ServiceError>;
    async fn add_to_wishlist(&self, product_id: ResourceId) -> Result<WishlistItem, ServiceError>;
    async fn remove_from_wishlist(&self, product_id: ResourceId) -> Result<(), ServiceError>;
}
