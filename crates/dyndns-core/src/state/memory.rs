// # Memory State Store
//
// In-memory implementation of StateStore.
//
// ## Crash Behavior
//
// - All state is lost on restart
// - The first cycle after a restart is an "initial detection" and updates
//   every hostname

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::address::IpVersion;
use crate::traits::state_store::StateStore;

#[derive(Debug, Default)]
struct MemoryState {
    addresses: HashMap<IpVersion, String>,
    last_cycle: Option<i64>,
}

/// In-memory state store implementation
///
/// Clones share the same underlying state, so a test can keep one handle
/// while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    inner: Arc<RwLock<MemoryState>>,
}

impl MemoryStateStore {
    /// Create a new empty memory state store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with an IPv4 address
    pub fn with_ipv4(ip: impl Into<String>) -> Self {
        let mut state = MemoryState::default();
        state.addresses.insert(IpVersion::V4, ip.into());
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn read(&self, version: IpVersion) -> Result<String, Error> {
        let state = self.inner.read().await;
        Ok(state.addresses.get(&version).cloned().unwrap_or_default())
    }

    async fn write(&self, version: IpVersion, value: &str) -> Result<(), Error> {
        let mut state = self.inner.write().await;
        state.addresses.insert(version, value.trim().to_string());
        Ok(())
    }

    async fn record_cycle_timestamp(&self, epoch_secs: i64) -> Result<(), Error> {
        self.inner.write().await.last_cycle = Some(epoch_secs);
        Ok(())
    }

    async fn last_cycle_timestamp(&self) -> Result<Option<i64>, Error> {
        Ok(self.inner.read().await.last_cycle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryStateStore::new();
        assert_eq!(store.read(IpVersion::V4).await.unwrap(), "");

        store.write(IpVersion::V4, "203.0.113.5").await.unwrap();
        assert_eq!(store.read(IpVersion::V4).await.unwrap(), "203.0.113.5");
        assert_eq!(store.read(IpVersion::V6).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryStateStore::with_ipv4("1.2.3.4");
        let handle = store.clone();

        store.record_cycle_timestamp(42).await.unwrap();
        assert_eq!(handle.last_cycle_timestamp().await.unwrap(), Some(42));
        assert_eq!(handle.read(IpVersion::V4).await.unwrap(), "1.2.3.4");
    }
}
