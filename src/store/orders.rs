use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, instrument};

use super::{replace_by_id, Reducer, StateCell};
use crate::{
    api::{OrderQuery, OrdersApi},
    errors::ServiceError,
    models::{CreateOrderRequest, Order, ResourceId},
    Paginated, PaginationMeta,
};

/// Customer-facing orders slice: "my orders", the order being viewed and the
/// order just placed.
#[derive(Debug, Clone, Default)]
pub struct OrdersState {
    pub orders: Vec<Arc<Order>>,
    pub current: Option<Arc<Order>>,
    pub pagination: Option<PaginationMeta>,
    pub last_query: Option<OrderQuery>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug)]
pub enum OrdersAction {
    ListRequested(OrderQuery),
    Pending,
    ListLoaded(Paginated<Order>),
    OrderLoaded(Arc<Order>),
    OrderCreated(Arc<Order>),
    OrderUpdated(Arc<Order>),
    Rejected(String),
}

impl Reducer for OrdersState {
    type Action = OrdersAction;

    fn reduce(&mut self, action: OrdersAction) {
        match action {
            OrdersAction::ListRequested(query) => {
                self.last_query = Some(query);
                self.loading = true;
                self.error = None;
            }
            OrdersAction::Pending => {
                self.loading = true;
                self.error = None;
            }
            OrdersAction::ListLoaded(page) => {
                self.orders = page.data.into_iter().map(Arc::new).collect();
                self.pagination = Some(page.meta);
                self.loading = false;
            }
            OrdersAction::OrderLoaded(order) => {
                replace_by_id(&mut self.orders, order.clone());
                self.current = Some(order);
                self.loading = false;
            }
            OrdersAction::OrderUpdated(order) => {
                replace_by_id(&mut self.orders, order.clone());
                let viewing = self
                    .current
                    .as_ref()
                    .map_or(true, |current| current.id == order.id);
                if viewing {
                    self.current = Some(order);
                }
                self.loading = false;
            }
            OrdersAction::OrderCreated(order) => {
                self.orders.insert(0, order.clone());
                self.current = Some(order);
                self.loading = false;
            }
            OrdersAction::Rejected(message) => {
                self.loading = false;
                self.error = Some(message);
            }
        }
    }
}

pub struct OrdersStore {
    api: Arc<dyn OrdersApi>,
    state: StateCell<OrdersState>,
}

impl OrdersStore {
    pub fn new(api: Arc<dyn OrdersApi>) -> Self {
        Self {
            api,
            state: StateCell::default(),
        }
    }

    pub fn snapshot(&self) -> OrdersState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<OrdersState> {
        self.state.subscribe()
    }

    pub(crate) fn api(&self) -> Arc<dyn OrdersApi> {
        self.api.clone()
    }

    fn reject(&self, context: &str, err: &ServiceError) {
        error!(error = %err, "{}", context);
        self.state.dispatch(OrdersAction::Rejected(err.user_message()));
    }

    #[instrument(skip(self))]
    pub async fn fetch_orders(&self, query: OrderQuery) -> Result<(), ServiceError> {
        self.state
            .dispatch(OrdersAction::ListRequested(query.clone()));

        match self.api.list_orders(&query).await {
            Ok(page) => {
                info!(count = page.data.len(), total = page.meta.total, "orders loaded");
                self.state.dispatch(OrdersAction::ListLoaded(page));
                Ok(())
            }
            Err(e) => {
                self.reject("Failed to fetch orders", &e);
                Err(e)
            }
        }
    }

    /// Re-dispatches the last list request (the "Retry" button).
    pub async fn retry(&self) -> Result<(), ServiceError> {
        let query = self
            .state
            .read(|s| s.last_query.clone())
            .unwrap_or_default();
        self.fetch_orders(query).await
    }

    #[instrument(skip(self))]
    pub async fn fetch_order(&self, id: ResourceId) -> Result<Arc<Order>, ServiceError> {
        self.state.dispatch(OrdersAction::Pending);

        match self.api.get_order(id).await {
            Ok(order) => {
                let order = Arc::new(order);
                self.state
                    .dispatch(OrdersAction::OrderLoaded(order.clone()));
                Ok(order)
            }
            Err(e) => {
                self.reject("Failed to fetch order", &e);
                Err(e)
            }
        }
    }

    /// Submits a new order. On success the order becomes `current` and is
    /// prepended to the list.
    #[instrument(skip(self, request), fields(items = request.items.len(), total = %request.totals.total))]
    pub async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<Arc<Order>, ServiceError> {
        self.state.dispatch(OrdersAction::Pending);

        match self.api.create_order(request).await {
            Ok(order) => {
                info!(order_id = order.id, "order created");
                let order = Arc::new(order);
                self.state
                    .dispatch(OrdersAction::OrderCreated(order.clone()));
                Ok(order)
            }
            Err(e) => {
                self.reject("Failed to create order", &e);
                Err(e)
            }
        }
    }

    /// Cancels an order. An order already known to be past confirmation is
    /// refused locally without a request.
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, id: ResourceId) -> Result<Arc<Order>, ServiceError> {
        let known_status = self.state.read(|s| {
            s.current
                .iter()
                .chain(s.orders.iter())
                .find(|order| order.id == id)
                .map(|order| order.status)
        });
        if let Some(status) = known_status.filter(|status| !status.is_cancellable()) {
            let err = ServiceError::InvalidOperation(format!(
                "Order #{} is {} and can no longer be cancelled",
                id,
                status.label().to_lowercase()
            ));
            self.reject("Cancel refused", &err);
            return Err(err);
        }

        self.state.dispatch(OrdersAction::Pending);

        match self.api.cancel_order(id).await {
            Ok(order) => {
                info!(order_id = id, status = %order.status, "order cancelled");
                let order = Arc::new(order);
                self.state
                    .dispatch(OrdersAction::OrderUpdated(order.clone()));
                Ok(order)
            }
            Err(e) => {
                self.reject("Failed to cancel order", &e);
                Err(e)
            }
        }
    }
}
