//! Test doubles and common utilities for reconciliation contract tests
//!
//! The doubles record every call so tests can assert on exactly which
//! provider requests a pass issued.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use zonesync_core::error::{Error, Result};
use zonesync_core::traits::{DnsProvider, DnsRecord, IpSource, RecordType, StateStore};
use zonesync_core::{Reconciler, SyncConfig};

/// An IpSource that returns a fixed answer
#[derive(Clone)]
pub struct StaticIpSource {
    answer: std::result::Result<String, String>,
    call_count: Arc<AtomicUsize>,
}

impl StaticIpSource {
    /// Always resolve to `ip`
    pub fn resolving(ip: &str) -> Self {
        Self {
            answer: Ok(ip.to_string()),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Always fail as a non-200 response would
    pub fn unavailable(reason: &str) -> Self {
        Self {
            answer: Err(reason.to_string()),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times current() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for StaticIpSource {
    async fn current(&self) -> Result<String> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.answer.clone().map_err(Error::ip_unavailable)
    }
}

/// A provider request as observed by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Verify,
    List {
        zone: String,
    },
    Update {
        zone: String,
        record_id: String,
        name: String,
        record_type: RecordType,
        proxied: bool,
        content: String,
    },
}

#[derive(Default)]
struct ProviderState {
    zones: BTreeMap<String, Vec<DnsRecord>>,
    unlistable_zones: HashSet<String>,
    failing_records: HashSet<String>,
    token_valid: bool,
    calls: Vec<ProviderCall>,
}

/// A DnsProvider backed by in-memory zones
///
/// Clones share state, so a test can keep one handle while the
/// reconciler owns another.
#[derive(Clone)]
pub struct MockDnsProvider {
    state: Arc<Mutex<ProviderState>>,
}

impl MockDnsProvider {
    /// A provider with a valid token and no zones
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ProviderState {
                token_valid: true,
                ..Default::default()
            })),
        }
    }

    /// Add a zone with the given records
    pub fn with_zone(self, zone: &str, records: Vec<DnsRecord>) -> Self {
        self.state
            .lock()
            .unwrap()
            .zones
            .insert(zone.to_string(), records);
        self
    }

    /// Make listing this zone fail
    pub fn with_unlistable_zone(self, zone: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .unlistable_zones
            .insert(zone.to_string());
        self
    }

    /// Make updates to this record id fail
    pub fn with_failing_record(self, record_id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_records
            .insert(record_id.to_string());
        self
    }

    /// Make token verification fail
    pub fn with_invalid_token(self) -> Self {
        self.state.lock().unwrap().token_valid = false;
        self
    }

    /// Every call issued so far, in order
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Get the number of provider calls of any kind
    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    /// Get the number of verify calls
    pub fn verify_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ProviderCall::Verify))
            .count()
    }

    /// All update calls issued so far
    pub fn updates(&self) -> Vec<ProviderCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, ProviderCall::Update { .. }))
            .collect()
    }

    /// Current records of a zone
    pub fn records(&self, zone: &str) -> Vec<DnsRecord> {
        self.state
            .lock()
            .unwrap()
            .zones
            .get(zone)
            .cloned()
            .unwrap_or_default()
    }

    /// Every record of every zone
    pub fn all_records(&self) -> Vec<DnsRecord> {
        self.state
            .lock()
            .unwrap()
            .zones
            .values()
            .flatten()
            .cloned()
            .collect()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn verify_token(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ProviderCall::Verify);
        if state.token_valid {
            Ok(())
        } else {
            Err(Error::auth("Unable to verify token."))
        }
    }

    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ProviderCall::List {
            zone: zone_id.to_string(),
        });

        if state.unlistable_zones.contains(zone_id) {
            return Err(Error::zone_list(zone_id, "success=false"));
        }

        state
            .zones
            .get(zone_id)
            .cloned()
            .ok_or_else(|| Error::zone_list(zone_id, "zone not found"))
    }

    async fn update_record(&self, zone_id: &str, record: &DnsRecord, new_ip: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ProviderCall::Update {
            zone: zone_id.to_string(),
            record_id: record.id.clone(),
            name: record.name.clone(),
            record_type: record.record_type.clone(),
            proxied: record.proxied,
            content: new_ip.to_string(),
        });

        if state.failing_records.contains(&record.id) {
            return Err(Error::record_update(zone_id, &record.name, "success=false"));
        }

        if let Some(stored) = state
            .zones
            .get_mut(zone_id)
            .and_then(|records| records.iter_mut().find(|r| r.id == record.id))
        {
            stored.content = new_ip.to_string();
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A StateStore that counts reads and writes
#[derive(Clone, Default)]
pub struct CountingStateStore {
    ip: Arc<Mutex<String>>,
    load_count: Arc<AtomicUsize>,
    save_count: Arc<AtomicUsize>,
}

impl CountingStateStore {
    pub fn with_ip(ip: &str) -> Self {
        Self {
            ip: Arc::new(Mutex::new(ip.to_string())),
            ..Default::default()
        }
    }

    pub fn ip(&self) -> String {
        self.ip.lock().unwrap().clone()
    }

    pub fn load_count(&self) -> usize {
        self.load_count.load(Ordering::SeqCst)
    }

    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl StateStore for CountingStateStore {
    async fn load_ip(&self) -> Result<String> {
        self.load_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.ip())
    }

    async fn save_ip(&self, ip: &str) -> Result<()> {
        self.save_count.fetch_add(1, Ordering::SeqCst);
        *self.ip.lock().unwrap() = ip.to_string();
        Ok(())
    }
}

/// Build a record
pub fn record(id: &str, name: &str, record_type: &str, content: &str, proxied: bool) -> DnsRecord {
    DnsRecord {
        id: id.to_string(),
        name: name.to_string(),
        record_type: RecordType::from(record_type),
        content: content.to_string(),
        proxied,
        zone_name: name
            .splitn(2, '.')
            .nth(1)
            .unwrap_or(name)
            .to_string(),
    }
}

/// Build an `A` record
pub fn a_record(id: &str, name: &str, content: &str) -> DnsRecord {
    record(id, name, "A", content, false)
}

/// Helper to create a configuration for the given zones
pub fn config_for(zones: &[&str]) -> SyncConfig {
    SyncConfig::new("T", zones.iter().map(|z| z.to_string()).collect())
}

/// Wire a reconciler from shared test doubles
pub fn reconciler(
    config: SyncConfig,
    ip_source: &StaticIpSource,
    provider: &MockDnsProvider,
    state_store: impl StateStore + 'static,
) -> Reconciler {
    Reconciler::new(
        config,
        Box::new(ip_source.clone()),
        Box::new(provider.clone()),
        Box::new(state_store),
    )
    .expect("reconciler construction succeeds")
}
