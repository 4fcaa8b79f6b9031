// # zonesync
//
// Runs one synchronization pass and exits. Scheduling is left to cron or a
// systemd timer.
//
// The binary is responsible for:
// 1. Reading process settings from environment variables
// 2. Initializing logging and the runtime
// 3. Wiring the state store, IP source and Cloudflare provider
// 4. Mapping the outcome to an exit code
//
// ## Configuration
//
// - `ZONESYNC_CONFIG`: Credential/zone file (default `./config.json`)
// - `ZONESYNC_STATE`: State file (default `./storage.json`)
// - `ZONESYNC_IP_URL`: IP echo endpoint (default `http://ip.42.pl/raw`)
// - `ZONESYNC_API_BASE`: Cloudflare API base URL
// - `ZONESYNC_MODE`: `live` (default) or `dry-run`
// - `ZONESYNC_LOG_LEVEL`: trace, debug, info, warn, error (default `info`)
//
// ## Example
//
// ```bash
// cat > /etc/zonesync/config.json <<'JSON'
// {"access_token": "your_token", "zone_ids": ["023e105f4ecef8ad9ca31a8372d0c353"]}
// JSON
//
// export ZONESYNC_CONFIG=/etc/zonesync/config.json
// export ZONESYNC_STATE=/var/lib/zonesync/storage.json
//
// zonesync
// ```

use anyhow::Result;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use zonesync_cloudflare::{CLOUDFLARE_API_BASE, CloudflareProvider};
use zonesync_core::{Error, FileStateStore, Reconciler, SyncConfig, SyncReport};
use zonesync_ip_http::{DEFAULT_IP_URL, HttpIpSource};

/// Exit codes for the possible outcomes of a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncExitCode {
    /// The pass completed, with or without record changes
    Success = 0,
    /// Settings, config file or state file unusable
    ConfigError = 1,
    /// Runtime error (unexpected)
    RuntimeError = 2,
    /// The external IP could not be resolved
    IpUnavailable = 3,
    /// The provider rejected the token
    AuthFailed = 4,
}

impl From<SyncExitCode> for ExitCode {
    fn from(code: SyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl From<&Error> for SyncExitCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::Config(_) | Error::StateStore(_) => SyncExitCode::ConfigError,
            Error::ExternalIpUnavailable(_) => SyncExitCode::IpUnavailable,
            Error::Authentication(_) => SyncExitCode::AuthFailed,
            _ => SyncExitCode::RuntimeError,
        }
    }
}

/// Process settings
#[derive(Debug, Clone, PartialEq, Eq)]
struct Settings {
    config_path: PathBuf,
    state_path: PathBuf,
    ip_url: String,
    api_base: String,
    mode: String,
    log_level: String,
}

impl Settings {
    /// Load settings from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            config_path: PathBuf::from(var("ZONESYNC_CONFIG", "./config.json")),
            state_path: PathBuf::from(var("ZONESYNC_STATE", "./storage.json")),
            ip_url: var("ZONESYNC_IP_URL", DEFAULT_IP_URL),
            api_base: var("ZONESYNC_API_BASE", CLOUDFLARE_API_BASE),
            mode: var("ZONESYNC_MODE", "live").to_lowercase(),
            log_level: var("ZONESYNC_LOG_LEVEL", "info").to_lowercase(),
        })
    }

    /// Validate the settings
    fn validate(&self) -> Result<()> {
        if self.config_path.as_os_str().is_empty() {
            anyhow::bail!("ZONESYNC_CONFIG cannot be empty");
        }

        if self.state_path.as_os_str().is_empty() {
            anyhow::bail!("ZONESYNC_STATE cannot be empty");
        }

        // The state file's directory is created on first write, but its
        // parent has to exist
        if let Some(parent) = self.state_path.parent()
            && let Some(grandparent) = parent.parent()
            && !grandparent.as_os_str().is_empty()
            && !grandparent.exists()
        {
            anyhow::bail!(
                "ZONESYNC_STATE directory cannot be created, {} does not exist",
                grandparent.display()
            );
        }

        for (name, url) in [
            ("ZONESYNC_IP_URL", &self.ip_url),
            ("ZONESYNC_API_BASE", &self.api_base),
        ] {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                anyhow::bail!("{} must use HTTP or HTTPS scheme. Got: {}", name, url);
            }
        }

        match self.mode.as_str() {
            "live" | "dry-run" => {}
            _ => anyhow::bail!(
                "ZONESYNC_MODE '{}' is not valid. Valid modes: live, dry-run",
                self.mode
            ),
        }

        self.level()?;
        Ok(())
    }

    fn level(&self) -> Result<Level> {
        Ok(match self.log_level.as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => anyhow::bail!(
                "ZONESYNC_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        })
    }

    fn dry_run(&self) -> bool {
        self.mode == "dry-run"
    }
}

fn main() -> ExitCode {
    let settings = match Settings::from_env().and_then(|s| s.validate().map(|()| s)) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return SyncExitCode::ConfigError.into();
        }
    };

    let log_level = settings.level().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return SyncExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SyncExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match run(&settings).await {
            Ok(report) => {
                log_report(&report);
                SyncExitCode::Success
            }
            Err(e) => {
                error!("{}", e);
                SyncExitCode::from(&e)
            }
        }
    });

    code.into()
}

/// Wire the components and run one pass
async fn run(settings: &Settings) -> zonesync_core::Result<SyncReport> {
    let config = SyncConfig::from_file(&settings.config_path)?;
    let dry_run = config.dry_run || settings.dry_run();
    let config = config.with_dry_run(dry_run);

    if dry_run {
        warn!("Running in DRY-RUN mode, no records will be changed");
    }
    info!(
        "Loaded {} zone(s) from {}",
        config.zone_ids().len(),
        settings.config_path.display()
    );

    let provider =
        CloudflareProvider::new(config.token(), dry_run).with_api_base(&settings.api_base);
    let ip_source = HttpIpSource::new(&settings.ip_url);
    let state_store = FileStateStore::new(&settings.state_path);

    let reconciler = Reconciler::new(
        config,
        Box::new(ip_source),
        Box::new(provider),
        Box::new(state_store),
    )?;

    reconciler.run().await
}

fn log_report(report: &SyncReport) {
    match report {
        SyncReport::Unchanged { ip } => info!("No change, IP is still {}", ip),
        SyncReport::Synced(summary) => {
            info!(
                "Synced {:?} -> {}: {} updated, {} already current, {} ignored, {} zone(s) in {}ms",
                summary.previous_ip,
                summary.new_ip,
                summary.records_updated,
                summary.records_unchanged,
                summary.records_ignored,
                summary.zones_processed,
                (summary.finished_at - summary.started_at).num_milliseconds()
            );
            if !summary.is_complete() {
                warn!(
                    "Incomplete pass: zones failed {:?}, records failed {:?}",
                    summary.failed_zones, summary.failed_records
                );
            }
        }
    }
}
