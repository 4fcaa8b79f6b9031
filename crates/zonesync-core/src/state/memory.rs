// # Memory State Store
//
// In-memory implementation of StateStore.
//
// ## Purpose
//
// Useful for embedding zonesync in a long-running process and for tests.
// Nothing survives a restart: the first pass after a restart always walks
// every zone.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::StateStore;

/// In-memory state store implementation
///
/// # Example
///
/// ```rust
/// use zonesync_core::state::MemoryStateStore;
/// use zonesync_core::traits::StateStore;
///
/// # tokio_test::block_on(async {
/// let store = MemoryStateStore::with_ip("1.2.3.4");
/// assert_eq!(store.load_ip().await.unwrap(), "1.2.3.4");
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    inner: Arc<RwLock<String>>,
}

impl MemoryStateStore {
    /// Create a new empty memory state store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with an IP
    pub fn with_ip(ip: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ip.into())),
        }
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load_ip(&self) -> Result<String, Error> {
        Ok(self.inner.read().await.clone())
    }

    async fn save_ip(&self, ip: &str) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        *guard = ip.to_string();
        Ok(())
    }
}
