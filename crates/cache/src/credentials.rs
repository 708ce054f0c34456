//! Server-side record of each principal's single current session token

use opsgate_core::{PrincipalId, Result};
use std::sync::Arc;
use std::time::Duration;

use crate::keys::token_key;
use crate::traits::KeyValueStore;

/// Maps a principal to the one token string currently allowed to act for it.
///
/// Writing a new token for a principal replaces the previous one, which is
/// what turns every older token of that principal into a superseded session.
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Record `token` as the principal's current session
    pub async fn put(&self, principal: PrincipalId, token: &str, ttl: Duration) -> Result<()> {
        self.store.set(&token_key(principal), token, ttl).await
    }

    /// The principal's current token, if the session is still live
    pub async fn current(&self, principal: PrincipalId) -> Result<Option<String>> {
        self.store.get(&token_key(principal)).await
    }

    /// Forget the principal's session; returns whether one existed
    pub async fn remove(&self, principal: PrincipalId) -> Result<bool> {
        self.store.delete(&token_key(principal)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    #[tokio::test]
    async fn second_write_replaces_first() {
        let creds = CredentialStore::new(Arc::new(MemoryStore::new()));
        let alice = PrincipalId::new(1);
        creds.put(alice, "first", Duration::from_secs(60)).await.unwrap();
        creds.put(alice, "second", Duration::from_secs(60)).await.unwrap();

        assert_eq!(creds.current(alice).await.unwrap().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn principals_are_independent() {
        let creds = CredentialStore::new(Arc::new(MemoryStore::new()));
        creds
            .put(PrincipalId::new(1), "a", Duration::from_secs(60))
            .await
            .unwrap();
        creds
            .put(PrincipalId::new(2), "b", Duration::from_secs(60))
            .await
            .unwrap();

        assert!(creds.remove(PrincipalId::new(1)).await.unwrap());
        assert!(creds.current(PrincipalId::new(1)).await.unwrap().is_none());
        assert_eq!(
            creds.current(PrincipalId::new(2)).await.unwrap().as_deref(),
            Some("b")
        );
    }
}
