//! Admin order management: the orders table, its filters, and the status menu.
//!
//! Transitions are not checked here. Whatever status the operator picks is
//! sent to the backend, which is the only authority on legality.

use std::sync::Arc;

use serde::Serialize;
use strum::{Display, EnumIter, EnumString};
use tracing::{error, info, instrument, warn};

use super::{contains_ignore_case, Selection};
use crate::{
    api::{OrderQuery, OrdersApi},
    errors::ServiceError,
    models::{Order, OrderStatus, ResourceId},
    store::{replace_by_id, Store},
    PaginationMeta,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum OrderSort {
    Newest,
    Oldest,
    TotalHigh,
    TotalLow,
}

/// Client-side filters over the loaded page. `sort: None` keeps server order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilters {
    pub status: Selection<OrderStatus>,
    pub category: Selection<ResourceId>,
    pub search: String,
    pub sort: Option<OrderSort>,
}

impl OrderFilters {
    pub fn is_active(&self) -> bool {
        *self != Self::default()
    }

    pub fn matches(&self, order: &Order) -> bool {
        if !self.status.matches(&order.status) {
            return false;
        }
        if let Selection::Only(category_id) = self.category {
            if !order.contains_category(category_id) {
                return false;
            }
        }

        let term = self.search.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        contains_ignore_case(&order.id.to_string(), &term)
            || contains_ignore_case(&order.reference(), &term)
            || order
                .customer_name
                .as_deref()
                .map_or(false, |name| contains_ignore_case(name, &term))
            || order
                .customer_email
                .as_deref()
                .map_or(false, |email| contains_ignore_case(email, &term))
            || order
                .items
                .iter()
                .any(|item| contains_ignore_case(&item.name, &term))
    }

    fn sort(&self, orders: &mut [Arc<Order>]) {
        match self.sort {
            None => {}
            Some(OrderSort::Newest) => orders.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            Some(OrderSort::Oldest) => orders.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            Some(OrderSort::TotalHigh) => {
                orders.sort_by(|a, b| b.totals.total.cmp(&a.totals.total))
            }
            Some(OrderSort::TotalLow) => {
                orders.sort_by(|a, b| a.totals.total.cmp(&b.totals.total))
            }
        }
    }
}

/// Outcome of applying one status to several orders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchUpdateReport {
    pub status: Option<OrderStatus>,
    pub updated: Vec<ResourceId>,
    pub failed: Vec<(ResourceId, String)>,
}

impl BatchUpdateReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct AdminOrderBoard {
    api: Arc<dyn OrdersApi>,
    orders: Vec<Arc<Order>>,
    pagination: Option<PaginationMeta>,
    last_query: Option<OrderQuery>,
    pub filters: OrderFilters,
    loading: bool,
    error: Option<String>,
    retryable: bool,
}

impl AdminOrderBoard {
    pub fn new(api: Arc<dyn OrdersApi>) -> Self {
        Self {
            api,
            orders: Vec::new(),
            pagination: None,
            last_query: None,
            filters: OrderFilters::default(),
            loading: false,
            error: None,
            retryable: false,
        }
    }

    /// Shares the backend used by the store's orders slice.
    pub fn for_store(store: &Store) -> Self {
        Self::new(store.orders.api())
    }

    /// All loaded orders in server order, ignoring filters.
    pub fn orders(&self) -> &[Arc<Order>] {
        &self.orders
    }

    pub fn pagination(&self) -> Option<PaginationMeta> {
        self.pagination
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Banner text from the last failed call.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the last failed load is worth offering a Retry button for.
    pub fn can_retry(&self) -> bool {
        self.error.is_some() && self.retryable
    }

    pub fn find(&self, id: ResourceId) -> Option<&Arc<Order>> {
        self.orders.iter().find(|order| order.id == id)
    }

    #[instrument(skip(self))]
    pub async fn load(&mut self, query: OrderQuery) -> Result<(), ServiceError> {
        self.last_query = Some(query.clone());
        self.loading = true;
        self.error = None;
        self.retryable = false;

        let result = self.api.list_orders(&query).await;
        self.loading = false;

        match result {
            Ok(page) => {
                info!(count = page.data.len(), total = page.meta.total, "admin orders loaded");
                self.orders = page.data.into_iter().map(Arc::new).collect();
                self.pagination = Some(page.meta);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to load orders");
                self.error = Some(e.user_message());
                self.retryable = e.is_retryable();
                Err(e)
            }
        }
    }

    /// Re-dispatches the last list request.
    pub async fn retry(&mut self) -> Result<(), ServiceError> {
        let query = self.last_query.clone().unwrap_or_default();
        self.load(query).await
    }

    /// Sends the new status and swaps in the backend's copy of the order.
    /// On failure the list is left as it was.
    #[instrument(skip(self), fields(order_id = %order_id, new_status = %new_status))]
    pub async fn handle_status_update(
        &mut self,
        order_id: ResourceId,
        new_status: OrderStatus,
    ) -> Result<Arc<Order>, ServiceError> {
        match self.api.update_order_status(order_id, new_status).await {
            Ok(order) => {
                let order = Arc::new(order);
                if !replace_by_id(&mut self.orders, order.clone()) {
                    warn!("Updated order is not on the current page");
                }
                self.error = None;
                info!(status = %order.status, "order status updated");
                Ok(order)
            }
            Err(e) => {
                error!(error = %e, "Failed to update order status");
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Entries for the row's status menu: every status except the current one.
    pub fn status_menu(current: OrderStatus) -> Vec<OrderStatus> {
        OrderStatus::all().filter(|s| *s != current).collect()
    }

    /// Applies `status` to each order in turn, continuing past failures.
    #[instrument(skip(self, ids), fields(count = ids.len(), status = %status))]
    pub async fn batch_update_status(
        &mut self,
        ids: &[ResourceId],
        status: OrderStatus,
    ) -> BatchUpdateReport {
        let mut report = BatchUpdateReport {
            status: Some(status),
            ..Default::default()
        };

        for &id in ids {
            match self.handle_status_update(id, status).await {
                Ok(_) => report.updated.push(id),
                Err(e) => report.failed.push((id, e.user_message())),
            }
        }

        if report.is_complete() {
            self.error = None;
        } else {
            self.error = Some(format!(
                "{} of {} orders could not be updated",
                report.failed.len(),
                ids.len()
            ));
        }
        info!(
            updated = report.updated.len(),
            failed = report.failed.len(),
            "batch status update finished"
        );
        report
    }

    /// Dashboard counters: one entry per status, in declaration order.
    pub fn status_counts(&self) -> Vec<(OrderStatus, usize)> {
        OrderStatus::all()
            .map(|status| {
                let count = self
                    .orders
                    .iter()
                    .filter(|order| order.status == status)
                    .count();
                (status, count)
            })
            .collect()
    }

    /// Orders after filters and sort. Entries are the same `Arc`s as the list.
    pub fn visible_orders(&self) -> Vec<Arc<Order>> {
        let mut visible: Vec<Arc<Order>> = self
            .orders
            .iter()
            .filter(|order| self.filters.matches(order))
            .cloned()
            .collect();
        self.filters.sort(&mut visible);
        visible
    }

    pub fn reset_filters(&mut self) {
        self.filters = OrderFilters::default();
    }
}
