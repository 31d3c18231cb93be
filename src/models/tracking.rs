use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{OrderStatus, ResourceId};

/// One backend-recorded step in an order's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub status: OrderStatus,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Response of `GET orders/{id}/tracking`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTracking {
    pub order_id: ResourceId,
    pub status: OrderStatus,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub estimated_delivery: Option<NaiveDate>,
    #[serde(default)]
    pub events: Vec<TrackingEvent>,
}
