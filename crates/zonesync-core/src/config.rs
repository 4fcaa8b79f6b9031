//! Configuration types for zonesync
//!
//! The configuration file carries the provider access token and the
//! ordered list of zones to manage:
//!
//! ```json
//! {
//!   "access_token": "...",
//!   "zone_ids": ["023e105f4ecef8ad9ca31a8372d0c353"]
//! }
//! ```
//!
//! `api_token` is accepted as an alias for `access_token`.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Error;

/// Main zonesync configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Provider API token
    /// ⚠️ NEVER log this value
    #[serde(alias = "api_token")]
    pub access_token: String,

    /// Zones to reconcile, processed in this order
    pub zone_ids: Vec<String>,

    /// Perform reads only and log intended updates
    #[serde(default)]
    pub dry_run: bool,
}

/// Raw on-disk shape, so missing fields produce targeted messages
#[derive(Deserialize)]
struct RawConfig {
    #[serde(alias = "api_token")]
    access_token: Option<String>,
    zone_ids: Option<Vec<String>>,
    #[serde(default)]
    dry_run: bool,
}

// Custom Debug implementation that hides the access token
impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfig")
            .field("access_token", &"<REDACTED>")
            .field("zone_ids", &self.zone_ids)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl SyncConfig {
    /// Create a configuration from a token and zone list
    pub fn new(access_token: impl Into<String>, zone_ids: Vec<String>) -> Self {
        Self {
            access_token: access_token.into(),
            zone_ids,
            dry_run: false,
        }
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Load and validate the configuration file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the file is absent or unparseable,
    /// the token is missing, or the zone list is missing or empty.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config = Self::from_json(&content).map_err(|e| match e {
            Error::Config(msg) => Error::config(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;

        tracing::debug!(
            "Loaded config from {}: {} zone(s)",
            path.display(),
            config.zone_ids.len()
        );
        Ok(config)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(content: &str) -> Result<Self, Error> {
        let raw: RawConfig = serde_json::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse config: {}", e)))?;

        let access_token = raw
            .access_token
            .ok_or_else(|| Error::config("access_token not in config"))?;

        let zone_ids = raw
            .zone_ids
            .ok_or_else(|| Error::config("zone_ids is either missing or empty"))?;

        let config = Self {
            access_token,
            zone_ids,
            dry_run: raw.dry_run,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// The token is only checked for presence, when parsing; its value is
    /// judged by the provider.
    pub fn validate(&self) -> Result<(), Error> {
        if self.zone_ids.is_empty() {
            return Err(Error::config("zone_ids is either missing or empty"));
        }

        if let Some(pos) = self.zone_ids.iter().position(|z| z.trim().is_empty()) {
            return Err(Error::config(format!("zone_ids[{}] is blank", pos)));
        }

        Ok(())
    }

    /// The provider access token
    pub fn token(&self) -> &str {
        &self.access_token
    }

    /// The zones to manage, in processing order
    pub fn zone_ids(&self) -> &[String] {
        &self.zone_ids
    }
}
