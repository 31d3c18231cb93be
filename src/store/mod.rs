//! Application state.
//!
//! Each resource family owns a slice: a state value published through a
//! `watch` channel plus a reducer that applies actions to it. Readers take
//! immutable snapshots or subscribe for changes; async operations ("thunks")
//! call the backend and dispatch the outcome. There is no request queue and no
//! de-duplication, so the last response to complete wins.

use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    api::{ApiClient, CartApi, CategoriesApi, CustomersApi, OrdersApi, ProductsApi, WishlistApi},
    config::AppConfig,
    models::Identified,
};

pub mod cart;
pub mod catalog;
pub mod customers;
pub mod orders;
pub mod wishlist;

pub use cart::{CartState, CartStore};
pub use catalog::{CatalogState, CatalogStore};
pub use customers::{CustomersState, CustomersStore};
pub use orders::{OrdersState, OrdersStore};
pub use wishlist::{WishlistState, WishlistStore};

/// A state value that knows how to apply its own actions.
pub trait Reducer {
    type Action;

    fn reduce(&mut self, action: Self::Action);
}

/// Holds one slice and publishes a fresh snapshot after every dispatch.
#[derive(Debug)]
pub struct StateCell<S> {
    tx: watch::Sender<S>,
}

impl<S> StateCell<S>
where
    S: Reducer + Clone,
{
    pub fn new(initial: S) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Clones the current state.
    pub fn snapshot(&self) -> S {
        self.tx.borrow().clone()
    }

    /// Reads the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.tx.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.tx.subscribe()
    }

    pub fn dispatch(&self, action: S::Action) {
        self.tx.send_modify(move |state| state.reduce(action));
    }
}

impl<S> Default for StateCell<S>
where
    S: Reducer + Clone + Default,
{
    fn default() -> Self {
        Self::new(S::default())
    }
}

/// Replaces the entry whose id matches `updated`, leaving every other `Arc`
/// untouched. Returns `false` when no entry matched.
pub fn replace_by_id<T: Identified>(items: &mut [Arc<T>], updated: Arc<T>) -> bool {
    match items.iter().position(|item| item.id() == updated.id()) {
        Some(index) => {
            items[index] = updated;
            true
        }
        None => false,
    }
}

/// Backend implementations injected into the store.
#[derive(Clone)]
pub struct Services {
    pub orders: Arc<dyn OrdersApi>,
    pub products: Arc<dyn ProductsApi>,
    pub categories: Arc<dyn CategoriesApi>,
    pub customers: Arc<dyn CustomersApi>,
    pub cart: Arc<dyn CartApi>,
    pub wishlist: Arc<dyn WishlistApi>,
}

impl Services {
    /// Uses one HTTP client for every resource family.
    pub fn from_client(client: ApiClient) -> Self {
        let client = Arc::new(client);
        Self {
            orders: client.clone(),
            products: client.clone(),
            categories: client.clone(),
            customers: client.clone(),
            cart: client.clone(),
            wishlist: client,
        }
    }
}

/// Explicit application context passed to page workflows.
pub struct Store {
    pub orders: OrdersStore,
    pub cart: CartStore,
    pub wishlist: WishlistStore,
    pub catalog: CatalogStore,
    pub customers: CustomersStore,
}

impl Store {
    pub fn new(services: Services, config: &AppConfig) -> Self {
        Self {
            orders: OrdersStore::new(services.orders),
            cart: CartStore::new(services.cart, config.pricing.clone()),
            wishlist: WishlistStore::new(services.wishlist),
            catalog: CatalogStore::new(services.products, services.categories),
            customers: CustomersStore::new(services.customers),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, crate::errors::ServiceError> {
        let client = ApiClient::new(config)?;
        Ok(Self::new(Services::from_client(client), config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Counter {
        value: i32,
    }

    impl Reducer for Counter {
        type Action = i32;

        fn reduce(&mut self, action: i32) {
            self.value += action;
        }
    }

    #[derive(Debug, PartialEq)]
    struct Row {
        id: u64,
        label: &'static str,
    }

    impl Identified for Row {
        fn id(&self) -> u64 {
            self.id
        }
    }

    #[tokio::test]
    async fn dispatch_publishes_new_snapshot() {
        let cell = StateCell::new(Counter::default());
        let mut rx = cell.subscribe();

        cell.dispatch(5);
        rx.changed().await.expect("sender alive");

        assert_eq!(rx.borrow().value, 5);
        assert_eq!(cell.snapshot(), Counter { value: 5 });
        assert_eq!(cell.read(|c| c.value * 2), 10);
    }

    #[test]
    fn replace_by_id_keeps_unrelated_entries() {
        let mut rows = vec![
            Arc::new(Row { id: 1, label: "a" }),
            Arc::new(Row { id: 2, label: "b" }),
        ];
        let untouched = rows[0].clone();

        assert!(replace_by_id(&mut rows, Arc::new(Row { id: 2, label: "B" })));
        assert_eq!(rows[1].label, "B");
        assert!(Arc::ptr_eq(&rows[0], &untouched));

        assert!(!replace_by_id(&mut rows, Arc::new(Row { id: 9, label: "z" })));
    }
}
