use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, instrument};

use super::{Reducer, StateCell};
use crate::{
    api::WishlistApi,
    errors::ServiceError,
    models::{ResourceId, WishlistItem},
};

#[derive(Debug, Clone, Default)]
pub struct WishlistState {
    pub items: Vec<Arc<WishlistItem>>,
    pub loading: bool,
    pub error: Option<String>,
}

impl WishlistState {
    pub fn contains(&self, product_id: ResourceId) -> bool {
        self.items.iter().any(|item| item.product_id == product_id)
    }
}

#[derive(Debug)]
pub enum WishlistAction {
    Pending,
    Loaded(Vec<WishlistItem>),
    Added(WishlistItem),
    Removed(ResourceId),
    Rejected(String),
}

impl Reducer for WishlistState {
    type Action = WishlistAction;

    fn reduce(&mut self, action: WishlistAction) {
        match action {
            WishlistAction::Pending => {
                self.loading = true;
                self.error = None;
            }
            WishlistAction::Loaded(items) => {
                self.items = items.into_iter().map(Arc::new).collect();
                self.loading = false;
            }
            WishlistAction::Added(item) => {
                self.items.retain(|existing| existing.product_id != item.product_id);
                self.items.push(Arc::new(item));
                self.loading = false;
            }
            WishlistAction::Removed(product_id) => {
                self.items.retain(|item| item.product_id != product_id);
                self.loading = false;
            }
            WishlistAction::Rejected(message) => {
                self.loading = false;
                self.error = Some(message);
            }
        }
    }
}

pub struct WishlistStore {
    api: Arc<dyn WishlistApi>,
    state: StateCell<WishlistState>,
}

impl WishlistStore {
    pub fn new(api: Arc<dyn WishlistApi>) -> Self {
        Self {
            api,
            state: StateCell::default(),
        }
    }

    pub fn snapshot(&self) -> WishlistState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<WishlistState> {
        self.state.subscribe()
    }

    pub fn contains(&self, product_id: ResourceId) -> bool {
        self.state.read(|s| s.contains(product_id))
    }

    fn reject(&self, context: &str, err: &ServiceError) {
        error!(error = %err, "{}", context);
        self.state
            .dispatch(WishlistAction::Rejected(err.user_message()));
    }

    #[instrument(skip(self))]
    pub async fn fetch_wishlist(&self) -> Result<(), ServiceError> {
        self.state.dispatch(WishlistAction::Pending);
        match self.api.list_wishlist().await {
            Ok(items) => {
                self.state.dispatch(WishlistAction::Loaded(items));
                Ok(())
            }
            Err(e) => {
                self.reject("Failed to fetch wishlist", &e);
                Err(e)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn add(&self, product_id: ResourceId) -> Result<(), ServiceError> {
        self.state.dispatch(WishlistAction::Pending);
        match self.api.add_to_wishlist(product_id).await {
            Ok(item) => {
                info!(product_id, "added to wishlist");
                self.state.dispatch(WishlistAction::Added(item));
                Ok(())
            }
            Err(e) => {
                self.reject("Failed to add to wishlist", &e);
                Err(e)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, product_id: ResourceId) -> Result<(), ServiceError> {
        self.state.dispatch(WishlistAction::Pending);
        match self.api.remove_from_wishlist(product_id).await {
            Ok(()) => {
                info!(product_id, "removed from wishlist");
                self.state.dispatch(WishlistAction::Removed(product_id));
                Ok(())
            }
            Err(e) => {
                self.reject("Failed to remove from wishlist", &e);
                Err(e)
            }
        }
    }

    /// Heart button: removes the product if present, adds it otherwise.
    /// Returns whether the product is wishlisted afterwards.
    pub async fn toggle(&self, product_id: ResourceId) -> Result<bool, ServiceError> {
        if self.contains(product_id) {
            self.remove(product_id).await?;
            Ok(false)
        } else {
            self.add(product_id).await?;
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockWishlistApi;
    use rust_decimal_macros::dec;

    fn item(product_id: ResourceId) -> WishlistItem {
        WishlistItem {
            id: product_id * 10,
            product_id,
            name: format!("Lidar {}", product_id),
            image: None,
            price: dec!(129.00),
            in_stock: true,
        }
    }

    #[tokio::test]
    async fn toggle_adds_then_removes() {
        let mut api = MockWishlistApi::new();
        api.expect_add_to_wishlist()
            .times(1)
            .returning(|id| Ok(item(id)));
        api.expect_remove_from_wishlist()
            .times(1)
            .returning(|_| Ok(()));

        let store = WishlistStore::new(Arc::new(api));
        assert!(store.toggle(3).await.unwrap());
        assert!(store.contains(3));

        assert!(!store.toggle(3).await.unwrap());
        assert!(!store.contains(3));
    }

    #[tokio::test]
    async fn failed_remove_keeps_item() {
        let mut api = MockWishlistApi::new();
        api.expect_list_wishlist()
            .returning(|| Ok(vec![item(1), item(2)]));
        api.expect_remove_from_wishlist()
            .returning(|_| Err(ServiceError::NotFound("Wishlist item not found".into())));

        let store = WishlistStore::new(Arc::new(api));
        store.fetch_wishlist().await.unwrap();
        assert!(store.remove(2).await.is_err());

        let state = store.snapshot();
        assert_eq!(state.items.len(), 2);
        assert_eq!(state.error.as_deref(), Some("Wishlist item not found"));
    }
}
