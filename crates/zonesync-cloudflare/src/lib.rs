// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare v4 API client used by zonesync.
//
// ## Behavior
//
// - One HTTP request per trait call, no retry, no backoff
// - Token verification requires HTTP 200 *and* `success: true`
// - Listing and updating are judged by the body's `success` flag; the
//   `errors[]` entries end up in the error message
// - Dry-run mode performs every GET and logs the PUT payload instead of
//   sending it
//
// ## Security Requirements
//
// - The API token never appears in logs or `Debug` output
// - The token is not checked locally; `verify_token` is the only judge
//
// ## API Reference
//
// - Verify Token: GET `/user/tokens/verify`
// - List DNS Records: GET `/zones/:zone_id/dns_records`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use zonesync_core::traits::{DnsProvider, DnsRecord};
use zonesync_core::{Error, Result};

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Envelope shared by every Cloudflare v4 response
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiError>,
    result: Option<T>,
}

/// One entry of a response's `errors` array
#[derive(Debug, Deserialize)]
struct ApiError {
    code: i64,
    message: String,
}

impl<T> ApiResponse<T> {
    /// Human-readable summary of `errors`
    fn describe_errors(&self) -> String {
        if self.errors.is_empty() {
            return "success=false".to_string();
        }

        self.errors
            .iter()
            .map(|e| format!("[{}] {}", e.code, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Parse a response body into the v4 envelope
fn parse_envelope<T: DeserializeOwned>(
    status: u16,
    body: &str,
) -> std::result::Result<ApiResponse<T>, String> {
    serde_json::from_str(body)
        .map_err(|e| format!("unparseable response (HTTP {}): {}", status, e))
}

/// Judge a `/user/tokens/verify` response
fn check_verify(status: u16, body: &str) -> Result<()> {
    if status != 200 {
        return Err(Error::auth(format!("token verification returned HTTP {}", status)));
    }

    let response: ApiResponse<serde_json::Value> =
        parse_envelope(status, body).map_err(Error::auth)?;

    if !response.success {
        return Err(Error::auth(response.describe_errors()));
    }

    Ok(())
}

/// Judge a `/zones/:zone_id/dns_records` response
///
/// Entries are decoded one by one. A malformed `A` record fails the zone;
/// a malformed record of any other type is dropped, since it would be
/// ignored anyway.
fn check_list(zone_id: &str, status: u16, body: &str) -> Result<Vec<DnsRecord>> {
    let response: ApiResponse<Vec<serde_json::Value>> =
        parse_envelope(status, body).map_err(|e| Error::zone_list(zone_id, e))?;

    if !response.success {
        return Err(Error::zone_list(zone_id, response.describe_errors()));
    }

    let mut records = Vec::new();
    for entry in response.result.unwrap_or_default() {
        let record_type = entry
            .get("type")
            .and_then(|t| t.as_str())
            .unwrap_or_default()
            .to_string();
        match serde_json::from_value::<DnsRecord>(entry) {
            Ok(record) => records.push(record),
            Err(e) if record_type == "A" => {
                return Err(Error::zone_list(zone_id, format!("malformed A record: {}", e)));
            }
            Err(e) => {
                tracing::debug!(
                    "Dropping unreadable {:?} record in zone {}: {}",
                    record_type,
                    zone_id,
                    e
                );
            }
        }
    }

    Ok(records)
}

/// Judge a `PUT /zones/:zone_id/dns_records/:record_id` response
fn check_update(zone_id: &str, record_name: &str, status: u16, body: &str) -> Result<()> {
    let response: ApiResponse<serde_json::Value> = parse_envelope(status, body)
        .map_err(|e| Error::record_update(zone_id, record_name, e))?;

    if !response.success {
        return Err(Error::record_update(
            zone_id,
            record_name,
            response.describe_errors(),
        ));
    }

    Ok(())
}

/// Body of the record update request
///
/// Name, type and proxied flag are copied from the record as listed.
fn update_payload(record: &DnsRecord, new_ip: &str) -> serde_json::Value {
    serde_json::json!({
        "content": new_ip,
        "name": record.name,
        "type": record.record_type.as_str(),
        "proxied": record.proxied,
    })
}

/// Cloudflare DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all GET requests (token verification, record listing)
/// - Log the intended PUT payload
/// - **NOT** modify DNS records
pub struct CloudflareProvider {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API base URL, without trailing slash
    api_base: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform GET requests but skip PUT updates
    dry_run: bool,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("api_base", &self.api_base)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with Zone:DNS:Edit permissions
    /// - `dry_run`: If true, perform GET requests but skip PUT updates
    pub fn new(api_token: impl Into<String>, dry_run: bool) -> Self {
        Self {
            api_token: api_token.into(),
            api_base: CLOUDFLARE_API_BASE.to_string(),
            client: reqwest::Client::new(),
            dry_run,
        }
    }

    /// Create a provider that sends updates
    pub fn new_live(api_token: impl Into<String>) -> Self {
        Self::new(api_token, false)
    }

    /// Create a provider that only logs updates
    pub fn new_dry_run(api_token: impl Into<String>) -> Self {
        Self::new(api_token, true)
    }

    /// Point the client at a different API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Whether updates are only logged
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn verify_url(&self) -> String {
        format!("{}/user/tokens/verify", self.api_base)
    }

    fn records_url(&self, zone_id: &str) -> String {
        format!("{}/zones/{}/dns_records", self.api_base, zone_id)
    }

    fn record_url(&self, zone_id: &str, record_id: &str) -> String {
        format!("{}/zones/{}/dns_records/{}", self.api_base, zone_id, record_id)
    }

    /// Send a request with the standard headers, returning status and body
    ///
    /// Bodies must be attached with `body()`; `json()` would add a second
    /// `Content-Type`.
    async fn send(&self, request: reqwest::RequestBuilder) -> std::result::Result<(u16, String), String> {
        let response = request
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| format!("HTTP request failed: {}", e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| format!("Failed to read response: {}", e))?;

        Ok((status, body))
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// Verify the token
    ///
    /// ```http
    /// GET /user/tokens/verify
    /// Authorization: Bearer <token>
    /// ```
    async fn verify_token(&self) -> Result<()> {
        tracing::debug!("Verifying Cloudflare API token");

        let (status, body) = self
            .send(self.client.get(self.verify_url()))
            .await
            .map_err(Error::auth)?;

        check_verify(status, &body)
    }

    /// List every record in a zone
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records
    /// Authorization: Bearer <token>
    /// ```
    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>> {
        tracing::debug!("Listing DNS records for zone {}", zone_id);

        let (status, body) = self
            .send(self.client.get(self.records_url(zone_id)))
            .await
            .map_err(|e| Error::zone_list(zone_id, e))?;

        let records = check_list(zone_id, status, &body)?;
        tracing::debug!("Zone {} has {} record(s)", zone_id, records.len());
        Ok(records)
    }

    /// Rewrite a record's content
    ///
    /// ```http
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// {
    ///   "content": "2.2.2.2",
    ///   "name": "home.example.com",
    ///   "type": "A",
    ///   "proxied": false
    /// }
    /// ```
    async fn update_record(&self, zone_id: &str, record: &DnsRecord, new_ip: &str) -> Result<()> {
        let url = self.record_url(zone_id, &record.id);
        let payload = update_payload(record, new_ip);

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PUT request to {} with payload: {}",
                url,
                payload
            );
            return Ok(());
        }

        tracing::debug!("Updating {} -> {}", record.name, new_ip);

        let (status, body) = self
            .send(self.client.put(&url).body(payload.to_string()))
            .await
            .map_err(|e| Error::record_update(zone_id, &record.name, e))?;

        check_update(zone_id, &record.name, status, &body)
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}
