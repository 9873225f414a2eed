//! Verification status backed by the linked user store.

use async_trait::async_trait;
use command_router::{HandlerError, VerificationCheck};
use linked_user_store::UserStore;
use std::sync::Arc;

/// A user is verified once a link record exists for their chat id.
pub struct StoreVerificationCheck {
    store: Arc<dyn UserStore>,
}

impl StoreVerificationCheck {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl VerificationCheck for StoreVerificationCheck {
    async fn is_verified(&self, user_id: &str) -> Result<bool, HandlerError> {
        Ok(self.store.get_user_by_chat(user_id).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linked_user_store::InMemoryUserStore;

    #[tokio::test]
    async fn test_linked_user_is_verified() {
        let check = StoreVerificationCheck::new(Arc::new(
            InMemoryUserStore::new().with_user("alice#0001", "21"),
        ));

        assert!(check.is_verified("alice#0001").await.unwrap());
        assert!(!check.is_verified("bob#0002").await.unwrap());
    }
}
