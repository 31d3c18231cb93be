use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use super::{Identified, ResourceId};

/// Loyalty tier assigned by operators.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CustomerTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CustomerStatus {
    Active,
    Inactive,
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: ResourceId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub tier: CustomerTier,
    pub status: CustomerStatus,
    #[serde(default)]
    pub orders_count: u32,
    #[serde(default)]
    pub total_spent: Decimal,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Identified for Customer {
    fn id(&self) -> ResourceId {
        self.id
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateCustomerTierRequest {
    pub tier: CustomerTier,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateCustomerStatusRequest {
    pub status: CustomerStatus,
}
