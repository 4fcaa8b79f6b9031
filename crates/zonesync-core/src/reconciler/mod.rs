//! Reconciler
//!
//! The Reconciler runs one synchronization pass:
//! - Reads the last synchronized IP from the StateStore
//! - Resolves the external IP via IpSource
//! - Verifies the credential and rewrites mismatched `A` records via DnsProvider
//! - Persists the new IP
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐
//! │ StateStore  │   │  IpSource   │
//! │ (load)      │   │ (resolve)   │
//! └──────┬──────┘   └──────┬──────┘
//!        └────────┬────────┘
//!                 ▼
//!         ┌──────────────┐
//!         │  Reconciler  │── equal ──▶ done (no provider calls)
//!         └──────────────┘
//!                 │ differs
//!                 ▼
//!         ┌──────────────┐
//!         │ DnsProvider  │ verify → per zone: list → per A record: update
//!         └──────────────┘
//!                 │
//!                 ▼
//!         ┌──────────────┐
//!         │ StateStore   │
//!         │ (save)       │
//!         └──────────────┘
//! ```
//!
//! ## Failure Model
//!
//! - Unresolvable IP or rejected token: the pass aborts, nothing is written
//! - Failed zone listing or record update: logged, counted, pass continues
//! - The new IP is persisted once all zones were visited, whatever the
//!   per-record outcomes. A record that failed is therefore only retried
//!   after the external IP changes again.

use crate::config::SyncConfig;
use crate::error::Result;
use crate::traits::{DnsProvider, DnsRecord, IpSource, StateStore};
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

/// Outcome of a reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncReport {
    /// The external IP matched the stored IP; nothing was done
    Unchanged {
        /// The current IP address
        ip: String,
    },

    /// The external IP changed and all zones were visited
    Synced(SyncSummary),
}

impl SyncReport {
    /// Whether the pass went past the idempotence fast path
    pub fn is_changed(&self) -> bool {
        matches!(self, SyncReport::Synced(_))
    }

    /// The summary of a full pass, if one ran
    pub fn summary(&self) -> Option<&SyncSummary> {
        match self {
            SyncReport::Synced(summary) => Some(summary),
            SyncReport::Unchanged { .. } => None,
        }
    }
}

/// Counters collected while walking zones and records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    /// IP recorded by the previous pass (may be empty)
    pub previous_ip: String,
    /// IP the records were pointed at
    pub new_ip: String,
    /// Zones whose records were listed
    pub zones_processed: usize,
    /// Zones that could not be listed
    pub failed_zones: Vec<String>,
    /// `A` records rewritten (or that would have been, in dry-run mode)
    pub records_updated: usize,
    /// `A` records that already had the right content
    pub records_unchanged: usize,
    /// Records of other types, left untouched
    pub records_ignored: usize,
    /// Names of `A` records whose update failed
    pub failed_records: Vec<String>,
    /// Whether the pass ran in dry-run mode
    pub dry_run: bool,
    /// When the pass started
    pub started_at: DateTime<Utc>,
    /// When the pass finished
    pub finished_at: DateTime<Utc>,
}

impl SyncSummary {
    fn new(previous_ip: String, new_ip: String, dry_run: bool, started_at: DateTime<Utc>) -> Self {
        Self {
            previous_ip,
            new_ip,
            zones_processed: 0,
            failed_zones: Vec::new(),
            records_updated: 0,
            records_unchanged: 0,
            records_ignored: 0,
            failed_records: Vec::new(),
            dry_run,
            started_at,
            finished_at: started_at,
        }
    }

    /// Whether every zone was listed and every update accepted
    pub fn is_complete(&self) -> bool {
        self.failed_zones.is_empty() && self.failed_records.is_empty()
    }
}

/// Runs synchronization passes
///
/// ## Lifecycle
///
/// 1. Load a [`SyncConfig`] and build the components
/// 2. Create with [`Reconciler::new()`]
/// 3. Call [`Reconciler::run()`] once per scheduled invocation
///
/// ## Threading
///
/// Every provider call is awaited before the next one starts; nothing is
/// spawned.
pub struct Reconciler {
    /// Token and zones to manage
    config: SyncConfig,

    /// IP source for the external address
    ip_source: Box<dyn IpSource>,

    /// DNS provider for record reads and writes
    provider: Box<dyn DnsProvider>,

    /// State store for the last synchronized IP
    state_store: Box<dyn StateStore>,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Parameters
    ///
    /// - `config`: Token and zone configuration
    /// - `ip_source`: IP source implementation
    /// - `provider`: DNS provider implementation
    /// - `state_store`: State store implementation
    pub fn new(
        config: SyncConfig,
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        state_store: Box<dyn StateStore>,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            ip_source,
            provider,
            state_store,
        })
    }

    /// Run one reconciliation pass
    ///
    /// # Returns
    ///
    /// - `Ok(SyncReport)`: The pass completed, possibly with per-zone or
    ///   per-record failures recorded in the summary
    /// - `Err(Error)`: A fatal error (state unreadable, external IP
    ///   unavailable, authentication failed, state not writable)
    pub async fn run(&self) -> Result<SyncReport> {
        let started_at = Utc::now();

        let stored_ip = self.state_store.load_ip().await?;
        let external_ip = self.ip_source.current().await?;
        debug!("Stored IP: {:?}, external IP: {:?}", stored_ip, external_ip);

        if stored_ip == external_ip {
            info!("IP unchanged ({}), nothing to do", external_ip);
            return Ok(SyncReport::Unchanged { ip: external_ip });
        }

        info!(
            "IP changed: {:?} -> {:?}, syncing {} zone(s) via {}",
            stored_ip,
            external_ip,
            self.config.zone_ids().len(),
            self.provider.provider_name()
        );

        // Never write with an unverified credential
        self.provider.verify_token().await?;
        debug!("Access token verified");

        let mut summary =
            SyncSummary::new(stored_ip, external_ip, self.config.dry_run, started_at);

        for zone_id in self.config.zone_ids() {
            self.sync_zone(zone_id, &mut summary).await;
        }

        if self.config.dry_run {
            info!("[DRY-RUN] Not persisting {}", summary.new_ip);
        } else {
            self.state_store.save_ip(&summary.new_ip).await?;
        }

        summary.finished_at = Utc::now();
        Ok(SyncReport::Synced(summary))
    }

    /// Reconcile every `A` record of one zone
    async fn sync_zone(&self, zone_id: &str, summary: &mut SyncSummary) {
        debug!("Fetching records for zone {}", zone_id);

        let records = match self.provider.list_records(zone_id).await {
            Ok(records) => records,
            Err(e) => {
                warn!("Skipping zone {}: {}", zone_id, e);
                summary.failed_zones.push(zone_id.to_string());
                return;
            }
        };
        summary.zones_processed += 1;

        for record in &records {
            self.sync_record(zone_id, record, summary).await;
        }
    }

    /// Reconcile a single record
    async fn sync_record(&self, zone_id: &str, record: &DnsRecord, summary: &mut SyncSummary) {
        if !record.is_address_record() {
            debug!("Ignoring {} record {}", record.record_type, record.name);
            summary.records_ignored += 1;
            return;
        }

        if record.content == summary.new_ip {
            debug!("Record {} already points at {}", record.name, summary.new_ip);
            summary.records_unchanged += 1;
            return;
        }

        info!(
            "Record {}: provider has {}, current IP is {}",
            record.name, record.content, summary.new_ip
        );

        match self
            .provider
            .update_record(zone_id, record, &summary.new_ip)
            .await
        {
            Ok(()) => {
                info!("Updated {} in zone {}", record.name, record.zone_name);
                summary.records_updated += 1;
            }
            Err(e) => {
                error!("{}", e);
                summary.failed_records.push(record.name.clone());
            }
        }
    }
}
