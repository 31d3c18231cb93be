use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, instrument};

use super::{replace_by_id, Reducer, StateCell};
use crate::{
    api::{CustomerQuery, CustomersApi},
    errors::ServiceError,
    models::{Customer, CustomerStatus, CustomerTier, ResourceId},
    Paginated, PaginationMeta,
};

#[derive(Debug, Clone, Default)]
pub struct CustomersState {
    pub customers: Vec<Arc<Customer>>,
    pub pagination: Option<PaginationMeta>,
    pub last_query: Option<CustomerQuery>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug)]
pub enum CustomersAction {
    ListRequested(CustomerQuery),
    Pending,
    ListLoaded(Paginated<Customer>),
    Updated(Arc<Customer>),
    Rejected(String),
}

impl Reducer for CustomersState {
    type Action = CustomersAction;

    fn reduce(&mut self, action: CustomersAction) {
        match action {
            CustomersAction::ListRequested(query) => {
                self.last_query = Some(query);
                self.loading = true;
                self.error = None;
            }
            CustomersAction::Pending => {
                self.loading = true;
                self.error = None;
            }
            CustomersAction::ListLoaded(page) => {
                self.customers = page.data.into_iter().map(Arc::new).collect();
                self.pagination = Some(page.meta);
                self.loading = false;
            }
            CustomersAction::Updated(customer) => {
                replace_by_id(&mut self.customers, customer);
                self.loading = false;
            }
            CustomersAction::Rejected(message) => {
                self.loading = false;
                self.error = Some(message);
            }
        }
    }
}

pub struct CustomersStore {
    api: Arc<dyn CustomersApi>,
    state: StateCell<CustomersState>,
}

impl CustomersStore {
    pub fn new(api: Arc<dyn CustomersApi>) -> Self {
        Self {
            api,
            state: StateCell::default(),
        }
    }

    pub fn snapshot(&self) -> CustomersState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<CustomersState> {
        self.state.subscribe()
    }

    fn reject<T>(&self, context: &str, err: ServiceError) -> Result<T, ServiceError> {
        error!(error = %err, "{}", context);
        self.state
            .dispatch(CustomersAction::Rejected(err.user_message()));
        Err(err)
    }

    #[instrument(skip(self))]
    pub async fn fetch_customers(&self, query: CustomerQuery) -> Result<(), ServiceError> {
        self.state
            .dispatch(CustomersAction::ListRequested(query.clone()));
        match self.api.list_customers(&query).await {
            Ok(page) => {
                self.state.dispatch(CustomersAction::ListLoaded(page));
                Ok(())
            }
            Err(e) => self.reject("Failed to fetch customers", e),
        }
    }

    pub async fn retry(&self) -> Result<(), ServiceError> {
        let query = self
            .state
            .read(|s| s.last_query.clone())
            .unwrap_or_default();
        self.fetch_customers(query).await
    }

    #[instrument(skip(self))]
    pub async fn update_tier(
        &self,
        id: ResourceId,
        tier: CustomerTier,
    ) -> Result<Arc<Customer>, ServiceError> {
        self.state.dispatch(CustomersAction::Pending);
        match self.api.update_customer_tier(id, tier).await {
            Ok(customer) => {
                info!(customer_id = id, tier = %customer.tier, "customer tier updated");
                let customer = Arc::new(customer);
                self.state
                    .dispatch(CustomersAction::Updated(customer.clone()));
                Ok(customer)
            }
            Err(e) => self.reject("Failed to update customer tier", e),
        }
    }

    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: ResourceId,
        status: CustomerStatus,
    ) -> Result<Arc<Customer>, ServiceError> {
        self.state.dispatch(CustomersAction::Pending);
        match self.api.update_customer_status(id, status).await {
            Ok(customer) => {
                info!(customer_id = id, status = %customer.status, "customer status updated");
                let customer = Arc::new(customer);
                self.state
                    .dispatch(CustomersAction::Updated(customer.clone()));
                Ok(customer)
            }
            Err(e) => self.reject("Failed to update customer status", e),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::MockCustomersApi;
    use rust_decimal_macros::dec;

    pub(crate) fn customer(id: ResourceId, tier: CustomerTier, status: CustomerStatus) -> Customer {
        Customer {
            id,
            name: format!("Customer {}", id),
            email: format!("customer{}@example.com", id),
            phone: None,
            tier,
            status,
            orders_count: 3,
            total_spent: dec!(240.00),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn tier_update_replaces_by_id() {
        let mut api = MockCustomersApi::new();
        api.expect_list_customers().returning(|_| {
            Ok(Paginated::single_page(vec![
                customer(1, CustomerTier::Bronze, CustomerStatus::Active),
                customer(2, CustomerTier::Silver, CustomerStatus::Active),
            ]))
        });
        api.expect_update_customer_tier()
            .returning(|id, tier| Ok(customer(id, tier, CustomerStatus::Active)));

        let store = CustomersStore::new(Arc::new(api));
        store.fetch_customers(CustomerQuery::default()).await.unwrap();
        let untouched = store.snapshot().customers[1].clone();

        store.update_tier(1, CustomerTier::Gold).await.unwrap();

        let state = store.snapshot();
        assert_eq!(state.customers[0].tier, CustomerTier::Gold);
        assert!(Arc::ptr_eq(&state.customers[1], &untouched));
    }

    #[tokio::test]
    async fn failed_status_update_sets_banner() {
        let mut api = MockCustomersApi::new();
        api.expect_update_customer_status()
            .returning(|_, _| Err(ServiceError::Forbidden("Admins only".into())));

        let store = CustomersStore::new(Arc::new(api));
        assert!(store
            .update_status(4, CustomerStatus::Blocked)
            .await
            .is_err());
        assert_eq!(store.snapshot().error.as_deref(), Some("Admins only"));
    }
}
