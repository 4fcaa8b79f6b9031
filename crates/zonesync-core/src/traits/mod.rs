//! Core traits for zonesync
//!
//! This module defines the seams the reconciler is built on.
//!
//! - [`IpSource`]: Resolve the external IP
//! - [`DnsProvider`]: Verify credentials, list and update records
//! - [`StateStore`]: Persist the last synchronized IP

pub mod dns_provider;
pub mod ip_source;
pub mod state_store;

pub use dns_provider::{DnsProvider, DnsRecord, RecordType};
pub use ip_source::IpSource;
pub use state_store::StateStore;
