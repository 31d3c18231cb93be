//! Page workflows built on top of the store slices.

// Order lifecycle
pub mod checkout;
pub mod order_status;
pub mod order_tracking;

// Pricing
pub mod pricing;

// Admin directories
pub mod catalog;
pub mod customers;

// Client-side persisted state
pub mod search_history;

pub use catalog::{ProductFilters, StockLevel};
pub use checkout::{CheckoutStep, CheckoutStepper};
pub use customers::{CustomerDirectory, CustomerFilters};
pub use order_status::{AdminOrderBoard, BatchUpdateReport, OrderFilters, OrderSort};
pub use order_tracking::{
    delivery_progress, render_timeline, OrderTrackingService, TimelineRow, TrackingView,
};
pub use search_history::{FileStorage, KeyValueStorage, MemoryStorage, SearchHistory};

/// A filter value that is either unset ("All") or pinned to one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selection<T> {
    All,
    Only(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T: PartialEq> Selection<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(expected) => expected == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

impl<T> From<Option<T>> for Selection<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Selection::All, Selection::Only)
    }
}

/// Case-insensitive substring match used by the admin search boxes.
pub(crate) fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}
