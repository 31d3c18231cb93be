use async_trait::async_trait;
use tracing::instrument;

use super::{ApiClient, CategoriesApi, ProductQuery, ProductsApi};
use crate::{
    errors::ServiceError,
    models::{Category, CategoryInput, Product, ProductInput, ResourceId},
    Paginated,
};

#[async_trait]
impl ProductsApi for ApiClient {
    #[instrument(skip(self))]
    async fn list_products(
        &self,
        query: &ProductQuery,
    ) -> Result<Paginated<Product>, ServiceError> {
        self.get_with_query("products", query).await
    }

    #[instrument(skip(self))]
    async fn get_product(&self, id: ResourceId) -> Result<Product, ServiceError> {
        self.get(&format!("products/{}", id)).await
    }

    #[instrument(skip(self, input), fields(sku = %input.sku))]
    async fn create_product(&self, input: &ProductInput) -> Result<Product, ServiceError> {
        self.post("products", input).await
    }

    #[instrument(skip(self, input), fields(sku = %input.sku))]
    async fn update_product(
        &self,
        id: ResourceId,
        input: &ProductInput,
    ) -> Result<Product, ServiceError> {
        self.put(&format!("products/{}", id), input).await
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, id: ResourceId) -> Result<(), ServiceError> {
        self.delete(&format!("products/{}", id)).await
    }
}

#[async_trait]
impl CategoriesApi for ApiClient {
    #[instrument(skip(self))]
    async fn list_categories(&self) -> Result<Vec<Category>, ServiceError> {
        self.get("categories").await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    async fn create_category(&self, input: &CategoryInput) -> Result<Category, ServiceError> {
        self.post("categories", input).await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    async fn update_category(
        &self,
        id: ResourceId,
        input: &CategoryInput,
    ) -> Result<Category, ServiceError> {
        self.put(&format!("categories/{}", id), input).await
    }

    #[instrument(skip(self))]
    async fn delete_category(&self, id: ResourceId) -> Result<(), ServiceError> {
        self.delete(&format!("categories/{}", id)).await
    }
}
