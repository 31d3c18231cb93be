//! Typed snapshots of the resources the storefront backend owns.
//!
//! The client never treats these as the source of truth: every value is the
//! last successful response for that resource.

pub mod cart;
pub mod customer;
pub mod order;
pub mod product;
pub mod tracking;

pub use cart::{AddToCartRequest, Cart, CartItem, UpdateCartItemRequest, WishlistItem};
pub use customer::{Customer, CustomerStatus, CustomerTier};
pub use order::{
    Address, CreateOrderItem, CreateOrderRequest, Order, OrderItem, OrderStatus, OrderTotals,
    PaymentMethod, PaymentStatus, UpdateOrderStatusRequest,
};
pub use product::{Category, CategoryInput, Product, ProductInput, ProductStatus};
pub use tracking::{OrderTracking, TrackingEvent};

/// Numeric identifier used by every backend resource.
pub type ResourceId = u64;

/// Resources that can be located in a list by identifier.
pub trait Identified {
    fn id(&self) -> ResourceId;
}
