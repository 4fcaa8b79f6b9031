// # DNS Provider Trait
//
// Defines the interface for the provider's record API.
//
// ## Implementations
//
// - Cloudflare: `zonesync-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use zonesync_core::{DnsProvider, RecordType};
//
// async fn repoint(provider: &dyn DnsProvider, zone: &str, ip: &str) -> zonesync_core::Result<()> {
//     provider.verify_token().await?;
//     for record in provider.list_records(zone).await? {
//         if record.record_type == RecordType::A && record.content != ip {
//             provider.update_record(zone, &record, ip).await?;
//         }
//     }
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// DNS record type
///
/// Only `A` records are ever rewritten; every other type is carried
/// through verbatim so it can be logged and ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// A record (IPv4)
    A,
    /// Any other record type (AAAA, CNAME, MX, TXT, ...)
    Other(String),
}

impl RecordType {
    /// Wire representation of the type
    pub fn as_str(&self) -> &str {
        match self {
            RecordType::A => "A",
            RecordType::Other(name) => name,
        }
    }
}

impl From<&str> for RecordType {
    fn from(value: &str) -> Self {
        match value {
            "A" => RecordType::A,
            other => RecordType::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RecordType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RecordType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(RecordType::from(value.as_str()))
    }
}

/// A DNS record as returned by the provider
///
/// Owned by the provider. The reconciler only reads it and, for
/// mismatched `A` records, asks the provider to rewrite `content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider-specific record ID
    pub id: String,
    /// Fully qualified record name
    pub name: String,
    /// Record type
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// Record content (the address for `A` records)
    pub content: String,
    /// Whether traffic is routed through the provider's proxy
    #[serde(default)]
    pub proxied: bool,
    /// Name of the zone the record belongs to
    #[serde(default)]
    pub zone_name: String,
}

impl DnsRecord {
    /// Whether this record is an address record the reconciler manages
    pub fn is_address_record(&self) -> bool {
        self.record_type == RecordType::A
    }
}

/// Trait for DNS provider implementations
///
/// # Contract
///
/// - Every call is a single API request, no retry or backoff
/// - No state beyond the credential and HTTP client
/// - The provider never decides whether an update is needed
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Verify the access token
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The token is valid
    /// - `Err(Error::Authentication)`: Any other outcome
    async fn verify_token(&self) -> Result<(), crate::Error>;

    /// List all records of a zone
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<DnsRecord>)`: All records in the zone
    /// - `Err(Error::ZoneList)`: If the listing failed
    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Point a record at a new address
    ///
    /// The record's name, type and proxied flag are preserved.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The provider accepted the update
    /// - `Err(Error::RecordUpdate)`: If the update failed
    async fn update_record(
        &self,
        zone_id: &str,
        record: &DnsRecord,
        new_ip: &str,
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
