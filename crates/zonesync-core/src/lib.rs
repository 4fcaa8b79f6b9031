// # zonesync-core
//
// Core library for keeping DNS A records in sync with the host's public IP.
//
// ## Architecture Overview
//
// - **IpSource**: Trait for resolving the current external IP
// - **DnsProvider**: Trait for verifying credentials, listing and updating records
// - **StateStore**: Trait for persisting the last synchronized IP
// - **Reconciler**: Runs one synchronization pass over all configured zones
//
// ## Design Principles
//
// 1. **Single pass**: One invocation reconciles once and returns; scheduling is external
// 2. **Fail closed**: Nothing is written to the provider with an unverified token
// 3. **Best effort**: One broken zone or record never stops the others
// 4. **Idempotency**: An unchanged IP costs exactly one resolver call

pub mod config;
pub mod error;
pub mod reconciler;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use config::SyncConfig;
pub use error::{Error, Result};
pub use reconciler::{Reconciler, SyncReport};
pub use state::{FileStateStore, MemoryStateStore};
pub use traits::{DnsProvider, DnsRecord, IpSource, RecordType, StateStore};
