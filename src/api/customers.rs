use async_trait::async_trait;
use tracing::instrument;

use super::{ApiClient, CustomerQuery, CustomersApi};
use crate::{
    errors::ServiceError,
    models::{
        customer::{UpdateCustomerStatusRequest, UpdateCustomerTierRequest},
        Customer, CustomerStatus, CustomerTier, ResourceId,
    },
    Paginated,
};

#[async_trait]
impl CustomersApi for ApiClient {
    #[instrument(skip(self))]
    async fn list_customers(
        &self,
        query: &CustomerQuery,
    ) -> Result<Paginated<Customer>, ServiceError> {
        self.get_with_query("customers", query).await
    }

    #[instrument(skip(self), fields(customer_id = %id, tier = %tier))]
    async fn update_customer_tier(
        &self,
        id: ResourceId,
        tier: CustomerTier,
    ) -> Result<Customer, ServiceError> {
        self.put(
            &format!("customers/{}/tier", id),
            &UpdateCustomerTierRequest { tier },
        )
        .await
    }

    #[instrument(skip(self), fields(customer_id = %id, status = %status))]
    async fn update_customer_status(
        &self,
        id: ResourceId,
        status: CustomerStatus,
    ) -> Result<Customer, ServiceError> {
        self.put(
            &format!("customers/{}/status", id),
            &UpdateCustomerStatusRequest { status },
        )
        .await
    }
}
