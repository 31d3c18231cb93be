//! Order tracking page: the progress bar and the event timeline.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::{
    api::OrdersApi,
    errors::ServiceError,
    models::{OrderStatus, OrderTracking, ResourceId, TrackingEvent},
};

const TIMESTAMP_FORMAT: &str = "%b %d, %Y %H:%M";

/// Percentage along `pending -> confirmed -> processing -> shipped -> delivered`.
///
/// Each step on the path counts as completed once reached, so `pending` is 20
/// and `delivered` is 100. Cancelled, refunded and returned orders have left
/// the path and get no progress bar at all.
pub fn delivery_progress(status: OrderStatus) -> Option<u8> {
    let position = status.path_position()?;
    let steps = OrderStatus::DELIVERY_PATH.len();
    Some(((position + 1) * 100 / steps) as u8)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineRow {
    pub status: OrderStatus,
    pub title: &'static str,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub display_time: String,
    pub location: Option<String>,
    pub is_current: bool,
}

/// One row per event, in the order the backend supplied them. The last row is
/// the current one.
pub fn render_timeline(events: &[TrackingEvent]) -> Vec<TimelineRow> {
    let last = events.len().saturating_sub(1);
    events
        .iter()
        .enumerate()
        .map(|(i, event)| TimelineRow {
            status: event.status,
            title: event.status.label(),
            description: event.description.clone(),
            timestamp: event.timestamp,
            display_time: event.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            location: event.location.clone(),
            is_current: i == last,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackingView {
    pub order_id: ResourceId,
    pub status: OrderStatus,
    pub progress: Option<u8>,
    pub tracking_number: Option<String>,
    pub carrier: Option<String>,
    pub estimated_delivery: Option<NaiveDate>,
    pub rows: Vec<TimelineRow>,
}

impl From<OrderTracking> for TrackingView {
    fn from(tracking: OrderTracking) -> Self {
        Self {
            order_id: tracking.order_id,
            status: tracking.status,
            progress: delivery_progress(tracking.status),
            rows: render_timeline(&tracking.events),
            tracking_number: tracking.tracking_number,
            carrier: tracking.carrier,
            estimated_delivery: tracking.estimated_delivery,
        }
    }
}

pub struct OrderTrackingService {
    api: Arc<dyn OrdersApi>,
}

impl OrderTrackingService {
    pub fn new(api: Arc<dyn OrdersApi>) -> Self {
        Self { api }
    }

    #[instrument(skip(self))]
    pub async fn track(&self, order_id: ResourceId) -> Result<TrackingView, ServiceError> {
        let tracking = self.api.track_order(order_id).await.map_err(|e| {
            error!(error = %e, "Failed to fetch tracking");
            e
        })?;

        info!(
            status = %tracking.status,
            events = tracking.events.len(),
            "tracking loaded"
        );
        Ok(tracking.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockOrdersApi;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case(OrderStatus::Pending, Some(20))]
    #[case(OrderStatus::Confirmed, Some(40))]
    #[case(OrderStatus::Processing, Some(60))]
    #[case(OrderStatus::Shipped, Some(80))]
    #[case(OrderStatus::Delivered, Some(100))]
    #[case(OrderStatus::Cancelled, None)]
    #[case(OrderStatus::Refunded, None)]
    #[case(OrderStatus::Returned, None)]
    fn progress_per_status(#[case] status: OrderStatus, #[case] expected: Option<u8>) {
        assert_eq!(delivery_progress(status), expected);
    }

    fn event(status: OrderStatus, day: u32, location: Option<&str>) -> TrackingEvent {
        TrackingEvent {
            status,
            description: format!("Order {}", status.label().to_lowercase()),
            timestamp: Utc.with_ymd_and_hms(2024, 3, day, 14, 5, 0).unwrap(),
            location: location.map(str::to_string),
        }
    }

    #[test]
    fn timeline_keeps_backend_order_and_marks_last() {
        let events = vec![
            event(OrderStatus::Pending, 1, None),
            event(OrderStatus::Shipped, 3, Some("Memphis, TN")),
            event(OrderStatus::Processing, 2, None),
        ];

        let rows = render_timeline(&events);

        let statuses: Vec<_> = rows.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![OrderStatus::Pending, OrderStatus::Shipped, OrderStatus::Processing]
        );
        assert!(rows[2].is_current);
        assert!(!rows[0].is_current && !rows[1].is_current);
        assert_eq!(rows[1].display_time, "Mar 03, 2024 14:05");
        assert_eq!(rows[1].location.as_deref(), Some("Memphis, TN"));
    }

    #[test]
    fn empty_timeline_renders_nothing() {
        assert!(render_timeline(&[]).is_empty());
    }

    #[tokio::test]
    async fn track_builds_view() {
        let mut api = MockOrdersApi::new();
        api.expect_track_order().withf(|id| *id == 9).returning(|id| {
            Ok(OrderTracking {
                order_id: id,
                status: OrderStatus::Shipped,
                tracking_number: Some("1Z999".into()),
                carrier: Some("UPS".into()),
                estimated_delivery: NaiveDate::from_ymd_opt(2024, 3, 6),
                events: vec![
                    event(OrderStatus::Pending, 1, None),
                    event(OrderStatus::Shipped, 3, None),
                ],
            })
        });

        let view = OrderTrackingService::new(Arc::new(api))
            .track(9)
            .await
            .expect("tracking loads");

        assert_eq!(view.progress, Some(80));
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.carrier.as_deref(), Some("UPS"));
    }
}
