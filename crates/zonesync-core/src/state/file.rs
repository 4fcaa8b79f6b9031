// # File State Store
//
// File-based implementation of StateStore.
//
// ## Purpose
//
// Remembers the last synchronized IP between invocations so that an
// unchanged IP costs nothing but the resolver call.
//
// ## Crash Behavior
//
// - Atomic writes: Uses write-then-rename, the file is never truncated
// - A crash before `save_ip` leaves the previous value; the next run
//   detects the mismatch again and redoes the whole pass
//
// ## File Format
//
// ```json
// {"current_ip":"1.2.3.4"}
// ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::traits::StateStore;

/// Serializable state file format
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct StateFileFormat {
    #[serde(default)]
    current_ip: String,
}

/// File-based state store
///
/// # Example
///
/// ```rust,no_run
/// use zonesync_core::state::FileStateStore;
/// use zonesync_core::traits::StateStore;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileStateStore::new("./storage.json");
///
///     store.save_ip("1.2.3.4").await?;
///     assert_eq!(store.load_ip().await?, "1.2.3.4");
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Create a store backed by `path`
    ///
    /// No I/O happens until the first load or save.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Get path to temporary file for atomic writes
    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    /// Write state to file atomically
    async fn write_state(&self, state: &StateFileFormat) -> Result<(), Error> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to create state directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let json = serde_json::to_string(state)
            .map_err(|e| Error::state_store(format!("Failed to serialize state: {}", e)))?;

        // Write to temporary file first
        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        // Atomic rename (temp -> actual)
        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::state_store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("State written to file: {}", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load_ip(&self) -> Result<String, Error> {
        if !self.path.exists() {
            tracing::debug!(
                "State file does not exist: {}, treating as first run",
                self.path.display()
            );
            return Ok(String::new());
        }

        let content = fs::read_to_string(&self.path).await.map_err(|e| {
            Error::state_store(format!(
                "Failed to read state file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let state: StateFileFormat = serde_json::from_str(&content).map_err(|e| {
            Error::state_store(format!(
                "Failed to parse state file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        tracing::debug!("Loaded stored IP: {:?}", state.current_ip);
        Ok(state.current_ip)
    }

    async fn save_ip(&self, ip: &str) -> Result<(), Error> {
        tracing::info!("Storing new IP {}", ip);
        self.write_state(&StateFileFormat {
            current_ip: ip.to_string(),
        })
        .await
    }
}
