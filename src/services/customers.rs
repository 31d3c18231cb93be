//! Admin customer directory.

use std::sync::Arc;

use super::{contains_ignore_case, Selection};
use crate::{
    errors::ServiceError,
    models::{Customer, CustomerStatus, CustomerTier, ResourceId},
    store::CustomersStore,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerFilters {
    pub tier: Selection<CustomerTier>,
    pub status: Selection<CustomerStatus>,
    pub search: String,
}

impl CustomerFilters {
    pub fn matches(&self, customer: &Customer) -> bool {
        if !self.tier.matches(&customer.tier) || !self.status.matches(&customer.status) {
            return false;
        }
        let term = self.search.trim().to_lowercase();
        term.is_empty()
            || contains_ignore_case(&customer.name, &term)
            || contains_ignore_case(&customer.email, &term)
            || customer
                .phone
                .as_deref()
                .map_or(false, |phone| phone.contains(&term))
    }

    pub fn apply(&self, customers: &[Arc<Customer>]) -> Vec<Arc<Customer>> {
        customers
            .iter()
            .filter(|customer| self.matches(customer))
            .cloned()
            .collect()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// The customers page: filters over the customers slice plus the row actions.
pub struct CustomerDirectory<'a> {
    store: &'a CustomersStore,
    pub filters: CustomerFilters,
}

impl<'a> CustomerDirectory<'a> {
    pub fn new(store: &'a CustomersStore) -> Self {
        Self {
            store,
            filters: CustomerFilters::default(),
        }
    }

    pub fn visible(&self) -> Vec<Arc<Customer>> {
        self.store
            .snapshot()
            .customers
            .iter()
            .filter(|customer| self.filters.matches(customer))
            .cloned()
            .collect()
    }

    pub async fn change_tier(
        &self,
        id: ResourceId,
        tier: CustomerTier,
    ) -> Result<Arc<Customer>, ServiceError> {
        self.store.update_tier(id, tier).await
    }

    pub async fn block(&self, id: ResourceId) -> Result<Arc<Customer>, ServiceError> {
        self.store.update_status(id, CustomerStatus::Blocked).await
    }

    pub async fn activate(&self, id: ResourceId) -> Result<Arc<Customer>, ServiceError> {
        self.store.update_status(id, CustomerStatus::Active).await
    }

    /// Customers per tier, lowest tier first.
    pub fn tier_breakdown(&self) -> Vec<(CustomerTier, usize)> {
        let snapshot = self.store.snapshot();
        [
            CustomerTier::Bronze,
            CustomerTier::Silver,
            CustomerTier::Gold,
            CustomerTier::Platinum,
        ]
        .into_iter()
        .map(|tier| {
            let count = snapshot
                .customers
                .iter()
                .filter(|customer| customer.tier == tier)
                .count();
            (tier, count)
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CustomerQuery, MockCustomersApi};
    use crate::store::customers::tests::customer;
    use crate::Paginated;

    fn api_with_customers() -> MockCustomersApi {
        let mut api = MockCustomersApi::new();
        api.expect_list_customers().returning(|_| {
            Ok(Paginated::single_page(vec![
                customer(1, CustomerTier::Gold, CustomerStatus::Active),
                customer(2, CustomerTier::Bronze, CustomerStatus::Blocked),
                customer(3, CustomerTier::Gold, CustomerStatus::Inactive),
            ]))
        });
        api
    }

    #[tokio::test]
    async fn filters_by_tier_and_status() {
        let store = CustomersStore::new(Arc::new(api_with_customers()));
        store.fetch_customers(CustomerQuery::default()).await.unwrap();

        let mut directory = CustomerDirectory::new(&store);
        directory.filters.tier = Selection::Only(CustomerTier::Gold);
        assert_eq!(directory.visible().len(), 2);

        directory.filters.status = Selection::Only(CustomerStatus::Active);
        let ids: Vec<_> = directory.visible().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1]);

        directory.filters.reset();
        assert_eq!(directory.visible().len(), 3);
    }

    #[tokio::test]
    async fn search_matches_email() {
        let store = CustomersStore::new(Arc::new(api_with_customers()));
        store.fetch_customers(CustomerQuery::default()).await.unwrap();

        let mut directory = CustomerDirectory::new(&store);
        directory.filters.search = "CUSTOMER2@".into();
        assert_eq!(directory.visible()[0].id, 2);
    }

    #[tokio::test]
    async fn block_updates_row() {
        let mut api = api_with_customers();
        api.expect_update_customer_status()
            .returning(|id, status| Ok(customer(id, CustomerTier::Gold, status)));
        let store = CustomersStore::new(Arc::new(api));
        store.fetch_customers(CustomerQuery::default()).await.unwrap();

        let directory = CustomerDirectory::new(&store);
        directory.block(1).await.unwrap();

        assert_eq!(store.snapshot().customers[0].status, CustomerStatus::Blocked);
        assert_eq!(
            directory.tier_breakdown(),
            vec![
                (CustomerTier::Bronze, 1),
                (CustomerTier::Silver, 0),
                (CustomerTier::Gold, 2),
                (CustomerTier::Platinum, 0),
            ]
        );
    }
}
