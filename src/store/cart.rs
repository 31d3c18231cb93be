use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::watch;
use tracing::{error, info, instrument};
use validator::Validate;

use super::{Reducer, StateCell};
use crate::{
    api::CartApi,
    config::PricingConfig,
    errors::ServiceError,
    models::{AddToCartRequest, Cart, OrderTotals, ResourceId, UpdateCartItemRequest},
    services::pricing,
};

#[derive(Debug, Clone, Default)]
pub struct CartState {
    pub cart: Arc<Cart>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug)]
pub enum CartAction {
    Pending,
    Loaded(Cart),
    Cleared,
    Rejected(String),
}

impl Reducer for CartState {
    type Action = CartAction;

    fn reduce(&mut self, action: CartAction) {
        match action {
            CartAction::Pending => {
                self.loading = true;
                self.error = None;
            }
            CartAction::Loaded(cart) => {
                self.cart = Arc::new(cart);
                self.loading = false;
            }
            CartAction::Cleared => {
                self.cart = Arc::new(Cart::default());
                self.loading = false;
            }
            CartAction::Rejected(message) => {
                self.loading = false;
                self.error = Some(message);
            }
        }
    }
}

/// Mirrors the server-side cart. Every mutation is a backend round trip and the
/// local copy is replaced by the cart the backend returns.
pub struct CartStore {
    api: Arc<dyn CartApi>,
    pricing: PricingConfig,
    state: StateCell<CartState>,
}

impl CartStore {
    pub fn new(api: Arc<dyn CartApi>, pricing: PricingConfig) -> Self {
        Self {
            api,
            pricing,
            state: StateCell::default(),
        }
    }

    pub fn snapshot(&self) -> CartState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.state.subscribe()
    }

    pub fn cart(&self) -> Arc<Cart> {
        self.state.read(|s| s.cart.clone())
    }

    pub fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }

    /// Subtotal, shipping, tax and total for the current cart.
    pub fn totals(&self) -> OrderTotals {
        self.state
            .read(|s| pricing::compute(&s.cart, Decimal::ZERO, &self.pricing))
    }

    fn apply(
        &self,
        context: &str,
        result: Result<Cart, ServiceError>,
    ) -> Result<Arc<Cart>, ServiceError> {
        match result {
            Ok(cart) => {
                self.state.dispatch(CartAction::Loaded(cart));
                Ok(self.cart())
            }
            Err(e) => {
                error!(error = %e, "{}", context);
                self.state.dispatch(CartAction::Rejected(e.user_message()));
                Err(e)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn fetch_cart(&self) -> Result<Arc<Cart>, ServiceError> {
        self.state.dispatch(CartAction::Pending);
        let result = self.api.get_cart().await;
        self.apply("Failed to fetch cart", result)
    }

    #[instrument(skip(self))]
    pub async fn add_to_cart(
        &self,
        product_id: ResourceId,
        quantity: u32,
    ) -> Result<Arc<Cart>, ServiceError> {
        let request = AddToCartRequest {
            product_id,
            quantity,
        };
        request.validate()?;

        self.state.dispatch(CartAction::Pending);
        let result = self.api.add_item(&request).await;
        let cart = self.apply("Failed to add item to cart", result)?;
        info!(product_id, quantity, items = cart.items.len(), "item added to cart");
        Ok(cart)
    }

    /// Sets a line's quantity. Zero removes the line.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        item_id: ResourceId,
        quantity: u32,
    ) -> Result<Arc<Cart>, ServiceError> {
        if quantity == 0 {
            return self.remove_item(item_id).await;
        }

        let request = UpdateCartItemRequest { quantity };
        request.validate()?;

        self.state.dispatch(CartAction::Pending);
        let result = self.api.update_item(item_id, &request).await;
        self.apply("Failed to update cart item", result)
    }

    #[instrument(skip(self))]
    pub async fn remove_item(&self, item_id: ResourceId) -> Result<Arc<Cart>, ServiceError> {
        self.state.dispatch(CartAction::Pending);
        let result = self.api.remove_item(item_id).await;
        self.apply("Failed to remove cart item", result)
    }

    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<(), ServiceError> {
        self.state.dispatch(CartAction::Pending);
        match self.api.clear_cart().await {
            Ok(()) => {
                info!("cart cleared");
                self.state.dispatch(CartAction::Cleared);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to clear cart");
                self.state.dispatch(CartAction::Rejected(e.user_message()));
                Err(e)
            }
        }
    }
}
