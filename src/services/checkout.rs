//! Four-step checkout: Cart Review, Shipping, Payment, Confirmation.
//!
//! The stepper only tracks which step is showing plus the form state collected
//! along the way. Moving between steps is never validated; validation happens
//! once, when the order is submitted.

use std::sync::Arc;

use rust_decimal::Decimal;
use strum::{Display, EnumIter};
use tracing::{error, info, instrument, warn};
use validator::Validate;

use crate::{
    config::PricingConfig,
    errors::ServiceError,
    models::{
        Address, Cart, CreateOrderItem, CreateOrderRequest, Order, OrderTotals, PaymentMethod,
    },
    services::pricing,
    store::{OrdersStore, Store},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
pub enum CheckoutStep {
    #[strum(serialize = "Cart Review")]
    CartReview,
    Shipping,
    Payment,
    Confirmation,
}

impl CheckoutStep {
    pub const ALL: [CheckoutStep; 4] = [
        CheckoutStep::CartReview,
        CheckoutStep::Shipping,
        CheckoutStep::Payment,
        CheckoutStep::Confirmation,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn is_first(self) -> bool {
        self == CheckoutStep::CartReview
    }

    pub fn is_last(self) -> bool {
        self == CheckoutStep::Confirmation
    }
}

#[derive(Debug, Clone)]
pub struct CheckoutStepper {
    active_step: CheckoutStep,
    pricing: PricingConfig,
    pub shipping_address: Address,
    /// `None` bills to the shipping address.
    pub billing_address: Option<Address>,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
    created_order: Option<Arc<Order>>,
}

impl CheckoutStepper {
    pub fn new(pricing: PricingConfig) -> Self {
        Self {
            active_step: CheckoutStep::CartReview,
            pricing,
            shipping_address: Address::default(),
            billing_address: None,
            payment_method: None,
            notes: None,
            created_order: None,
        }
    }

    pub fn active_step(&self) -> CheckoutStep {
        self.active_step
    }

    pub fn created_order(&self) -> Option<&Arc<Order>> {
        self.created_order.as_ref()
    }

    /// Advances one step; stays put on Confirmation.
    pub fn handle_next(&mut self) -> CheckoutStep {
        if let Some(next) = CheckoutStep::from_index(self.active_step.index() + 1) {
            self.active_step = next;
        }
        self.active_step
    }

    /// Goes back one step; stays put on Cart Review.
    pub fn handle_back(&mut self) -> CheckoutStep {
        if let Some(previous) = self
            .active_step
            .index()
            .checked_sub(1)
            .and_then(CheckoutStep::from_index)
        {
            self.active_step = previous;
        }
        self.active_step
    }

    /// Clears everything, as when the customer leaves the checkout page.
    pub fn reset(&mut self) {
        *self = Self::new(self.pricing.clone());
    }

    /// Totals shown in the order summary sidebar.
    pub fn summary(&self, cart: &Cart) -> OrderTotals {
        pricing::compute(cart, Decimal::ZERO, &self.pricing)
    }

    /// Checks the collected form and turns it into an order submission.
    pub fn build_request(&self, cart: &Cart) -> Result<CreateOrderRequest, ServiceError> {
        if cart.is_empty() {
            return Err(ServiceError::InvalidOperation(
                "Your cart is empty".to_string(),
            ));
        }

        self.shipping_address.validate()?;
        if let Some(billing) = &self.billing_address {
            billing.validate()?;
        }

        let payment_method = self.payment_method.ok_or_else(|| {
            ServiceError::ValidationError("Please select a payment method".to_string())
        })?;

        let request = CreateOrderRequest {
            items: cart
                .items
                .iter()
                .map(|item| CreateOrderItem {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    price: item.price,
                })
                .collect(),
            shipping_address: self.shipping_address.clone(),
            billing_address: self.billing_address.clone(),
            payment_method,
            totals: self.summary(cart),
            notes: self.notes.clone().filter(|n| !n.trim().is_empty()),
        };
        request.validate()?;
        Ok(request)
    }

    /// Submits the order. Success stores the returned order and jumps to
    /// Confirmation; any failure leaves the step and stored order untouched.
    #[instrument(skip_all, fields(step = %self.active_step, lines = cart.items.len()))]
    pub async fn create_order_handler(
        &mut self,
        orders: &OrdersStore,
        cart: &Cart,
    ) -> Result<Arc<Order>, ServiceError> {
        let request = self.build_request(cart).map_err(|e| {
            warn!(error = %e, "Checkout form incomplete");
            e
        })?;

        match orders.create_order(&request).await {
            Ok(order) => {
                info!(order_id = order.id, total = %order.totals.total, "checkout completed");
                self.created_order = Some(order.clone());
                self.active_step = CheckoutStep::Confirmation;
                Ok(order)
            }
            Err(e) => {
                error!(error = %e, "Order creation failed");
                Err(e)
            }
        }
    }

    /// Submits the store's current cart and empties it once the order exists.
    /// A failure to clear the cart does not fail the checkout.
    pub async fn place_order(&mut self, store: &Store) -> Result<Arc<Order>, ServiceError> {
        let cart = store.cart.cart();
        let order = self.create_order_handler(&store.orders, &cart).await?;

        if let Err(e) = store.cart.clear_cart().await {
            warn!(order_id = order.id, error = %e, "Order placed but cart was not cleared");
        }
        Ok(order)
    }
}
