use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, instrument};
use validator::Validate;

use super::{replace_by_id, Reducer, StateCell};
use crate::{
    api::{CategoriesApi, ProductQuery, ProductsApi},
    errors::ServiceError,
    models::{Category, CategoryInput, Product, ProductInput, ResourceId},
    Paginated, PaginationMeta,
};

/// Products and categories as shown on the shop grid and the admin catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogState {
    pub products: Vec<Arc<Product>>,
    /// Product open in the detail view; it need not be on the listed page.
    pub current_product: Option<Arc<Product>>,
    pub categories: Vec<Arc<Category>>,
    pub pagination: Option<PaginationMeta>,
    pub last_query: Option<ProductQuery>,
    pub loading: bool,
    pub error: Option<String>,
}

impl CatalogState {
    pub fn category_name(&self, id: ResourceId) -> Option<&str> {
        self.categories
            .iter()
            .find(|category| category.id == id)
            .map(|category| category.name.as_str())
    }
}

#[derive(Debug)]
pub enum CatalogAction {
    ProductsRequested(ProductQuery),
    Pending,
    ProductsLoaded(Paginated<Product>),
    ProductLoaded(Arc<Product>),
    ProductCreated(Arc<Product>),
    ProductUpdated(Arc<Product>),
    ProductDeleted(ResourceId),
    CategoriesLoaded(Vec<Category>),
    CategorySaved(Arc<Category>),
    CategoryDeleted(ResourceId),
    Rejected(String),
}

impl Reducer for CatalogState {
    type Action = CatalogAction;

    fn reduce(&mut self, action: CatalogAction) {
        match action {
            CatalogAction::ProductsRequested(query) => {
                self.last_query = Some(query);
                self.loading = true;
                self.error = None;
            }
            CatalogAction::Pending => {
                self.loading = true;
                self.error = None;
            }
            CatalogAction::ProductsLoaded(page) => {
                self.products = page.data.into_iter().map(Arc::new).collect();
                self.pagination = Some(page.meta);
                self.loading = false;
            }
            CatalogAction::ProductLoaded(product) => {
                replace_by_id(&mut self.products, product.clone());
                self.current_product = Some(product);
                self.loading = false;
            }
            CatalogAction::ProductCreated(product) => {
                if !replace_by_id(&mut self.products, product.clone()) {
                    self.products.insert(0, product);
                }
                self.loading = false;
            }
            CatalogAction::ProductUpdated(product) => {
                replace_by_id(&mut self.products, product.clone());
                if self.current_product.as_ref().map(|p| p.id) == Some(product.id) {
                    self.current_product = Some(product);
                }
                self.loading = false;
            }
            CatalogAction::ProductDeleted(id) => {
                self.products.retain(|product| product.id != id);
                if self.current_product.as_ref().map(|p| p.id) == Some(id) {
                    self.current_product = None;
                }
                self.loading = false;
            }
            CatalogAction::CategoriesLoaded(categories) => {
                self.categories = categories.into_iter().map(Arc::new).collect();
                self.loading = false;
            }
            CatalogAction::CategorySaved(category) => {
                if !replace_by_id(&mut self.categories, category.clone()) {
                    self.categories.push(category);
                }
                self.loading = false;
            }
            CatalogAction::CategoryDeleted(id) => {
                self.categories.retain(|category| category.id != id);
                self.loading = false;
            }
            CatalogAction::Rejected(message) => {
                self.loading = false;
                self.error = Some(message);
            }
        }
    }
}

pub struct CatalogStore {
    products: Arc<dyn ProductsApi>,
    categories: Arc<dyn CategoriesApi>,
    state: StateCell<CatalogState>,
}

impl CatalogStore {
    pub fn new(products: Arc<dyn ProductsApi>, categories: Arc<dyn CategoriesApi>) -> Self {
        Self {
            products,
            categories,
            state: StateCell::default(),
        }
    }

    pub fn snapshot(&self) -> CatalogState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<CatalogState> {
        self.state.subscribe()
    }

    fn reject<T>(&self, context: &str, err: ServiceError) -> Result<T, ServiceError> {
        error!(error = %err, "{}", context);
        self.state
            .dispatch(CatalogAction::Rejected(err.user_message()));
        Err(err)
    }

    #[instrument(skip(self))]
    pub async fn fetch_products(&self, query: ProductQuery) -> Result<(), ServiceError> {
        self.state
            .dispatch(CatalogAction::ProductsRequested(query.clone()));
        match self.products.list_products(&query).await {
            Ok(page) => {
                info!(count = page.data.len(), total = page.meta.total, "products loaded");
                self.state.dispatch(CatalogAction::ProductsLoaded(page));
                Ok(())
            }
            Err(e) => self.reject("Failed to fetch products", e),
        }
    }

    pub async fn retry(&self) -> Result<(), ServiceError> {
        let query = self
            .state
            .read(|s| s.last_query.clone())
            .unwrap_or_default();
        self.fetch_products(query).await
    }

    #[instrument(skip(self))]
    pub async fn fetch_product(&self, id: ResourceId) -> Result<Arc<Product>, ServiceError> {
        self.state.dispatch(CatalogAction::Pending);
        match self.products.get_product(id).await {
            Ok(product) => {
                let product = Arc::new(product);
                self.state
                    .dispatch(CatalogAction::ProductLoaded(product.clone()));
                Ok(product)
            }
            Err(e) => self.reject("Failed to fetch product", e),
        }
    }

    #[instrument(skip(self, input), fields(sku = %input.sku))]
    pub async fn create_product(&self, input: &ProductInput) -> Result<Arc<Product>, ServiceError> {
        input.validate()?;
        self.state.dispatch(CatalogAction::Pending);
        match self.products.create_product(input).await {
            Ok(product) => {
                info!(product_id = product.id, "product created");
                let product = Arc::new(product);
                self.state
                    .dispatch(CatalogAction::ProductCreated(product.clone()));
                Ok(product)
            }
            Err(e) => self.reject("Failed to create product", e),
        }
    }

    #[instrument(skip(self, input), fields(sku = %input.sku))]
    pub async fn update_product(
        &self,
        id: ResourceId,
        input: &ProductInput,
    ) -> Result<Arc<Product>, ServiceError> {
        input.validate()?;
        self.state.dispatch(CatalogAction::Pending);
        match self.products.update_product(id, input).await {
            Ok(product) => {
                let product = Arc::new(product);
                self.state
                    .dispatch(CatalogAction::ProductUpdated(product.clone()));
                Ok(product)
            }
            Err(e) => self.reject("Failed to update product", e),
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ResourceId) -> Result<(), ServiceError> {
        self.state.dispatch(CatalogAction::Pending);
        match self.products.delete_product(id).await {
            Ok(()) => {
                info!(product_id = id, "product deleted");
                self.state.dispatch(CatalogAction::ProductDeleted(id));
                Ok(())
            }
            Err(e) => self.reject("Failed to delete product", e),
        }
    }

    #[instrument(skip(self))]
    pub async fn fetch_categories(&self) -> Result<(), ServiceError> {
        self.state.dispatch(CatalogAction::Pending);
        match self.categories.list_categories().await {
            Ok(categories) => {
                self.state
                    .dispatch(CatalogAction::CategoriesLoaded(categories));
                Ok(())
            }
            Err(e) => self.reject("Failed to fetch categories", e),
        }
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_category(
        &self,
        input: &CategoryInput,
    ) -> Result<Arc<Category>, ServiceError> {
        input.validate()?;
        self.state.dispatch(CatalogAction::Pending);
        match self.categories.create_category(input).await {
            Ok(category) => {
                let category = Arc::new(category);
                self.state
                    .dispatch(CatalogAction::CategorySaved(category.clone()));
                Ok(category)
            }
            Err(e) => self.reject("Failed to create category", e),
        }
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn update_category(
        &self,
        id: ResourceId,
        input: &CategoryInput,
    ) -> Result<Arc<Category>, ServiceError> {
        input.validate()?;
        self.state.dispatch(CatalogAction::Pending);
        match self.categories.update_category(id, input).await {
            Ok(category) => {
                let category = Arc::new(category);
                self.state
                    .dispatch(CatalogAction::CategorySaved(category.clone()));
                Ok(category)
            }
            Err(e) => self.reject("Failed to update category", e),
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: ResourceId) -> Result<(), ServiceError> {
        self.state.dispatch(CatalogAction::Pending);
        match self.categories.delete_category(id).await {
            Ok(()) => {
                self.state.dispatch(CatalogAction::CategoryDeleted(id));
                Ok(())
            }
            Err(e) => self.reject("Failed to delete category", e),
        }
    }
}
