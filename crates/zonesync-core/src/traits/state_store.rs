// # State Store Trait
//
// Defines the interface for persisting the last synchronized IP.
//
// ## Purpose
//
// The stored IP is what makes repeated invocations cheap: when it equals
// the resolved external IP, the pass ends without touching the provider.
//
// ## Implementations
//
// - File-based: `FileStateStore` (JSON `{"current_ip": "..."}`)
// - In-memory: `MemoryStateStore`

use async_trait::async_trait;

/// Trait for state store implementations
///
/// # Contract
///
/// - `load_ip` never fails on a missing field; it returns an empty string
/// - `save_ip` overwrites the previous value; it is not transactional
///   with respect to the provider updates that preceded it
/// - No business logic: the reconciler decides when to save
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Get the last synchronized IP, or `""` if none is recorded
    async fn load_ip(&self) -> Result<String, crate::Error>;

    /// Record a new synchronized IP
    async fn save_ip(&self, ip: &str) -> Result<(), crate::Error>;
}
