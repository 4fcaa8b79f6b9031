//! Error types for zonesync
//!
//! Fatal kinds abort the pass and propagate to the process boundary.
//! [`Error::ZoneList`] and [`Error::RecordUpdate`] are reported by the
//! reconciler and never abort it.

use thiserror::Error;

/// Result type alias for zonesync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for zonesync
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The external IP could not be resolved
    #[error("External IP unavailable: {0}")]
    ExternalIpUnavailable(String),

    /// The provider rejected the access token
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Records for a zone could not be listed
    #[error("Failed to list records for zone {zone}: {message}")]
    ZoneList {
        /// Zone identifier
        zone: String,
        /// Error message
        message: String,
    },

    /// A single record could not be updated
    #[error("Failed to update record {record} in zone {zone}: {message}")]
    RecordUpdate {
        /// Zone identifier
        zone: String,
        /// Record name
        record: String,
        /// Error message
        message: String,
    },

    /// State store errors
    #[error("State store error: {0}")]
    StateStore(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an external IP error
    pub fn ip_unavailable(msg: impl Into<String>) -> Self {
        Self::ExternalIpUnavailable(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a zone listing error
    pub fn zone_list(zone: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ZoneList {
            zone: zone.into(),
            message: message.into(),
        }
    }

    /// Create a record update error
    pub fn record_update(
        zone: impl Into<String>,
        record: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::RecordUpdate {
            zone: zone.into(),
            record: record.into(),
            message: message.into(),
        }
    }

    /// Create a state store error
    pub fn state_store(msg: impl Into<String>) -> Self {
        Self::StateStore(msg.into())
    }

    /// Whether this error aborts a reconciliation pass
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::ZoneList { .. } | Self::RecordUpdate { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_zone_and_per_record_errors_are_not_fatal() {
        assert!(!Error::zone_list("z1", "boom").is_fatal());
        assert!(!Error::record_update("z1", "a.example.com", "boom").is_fatal());
    }

    #[test]
    fn test_preflight_errors_are_fatal() {
        assert!(Error::config("missing token").is_fatal());
        assert!(Error::ip_unavailable("503").is_fatal());
        assert!(Error::auth("invalid token").is_fatal());
        assert!(Error::state_store("unreadable").is_fatal());
    }

    #[test]
    fn test_every_kind_is_classified() {
        // No wildcard arm, new kinds must be classified here
        fn expected_fatal(err: &Error) -> bool {
            match err {
                Error::Config(_)
                | Error::ExternalIpUnavailable(_)
                | Error::Authentication(_)
                | Error::StateStore(_) => true,
                Error::ZoneList { .. } | Error::RecordUpdate { .. } => false,
            }
        }

        for err in [
            Error::config("x"),
            Error::ip_unavailable("x"),
            Error::auth("x"),
            Error::zone_list("z1", "x"),
            Error::record_update("z1", "a.example.com", "x"),
            Error::state_store("x"),
        ] {
            assert_eq!(err.is_fatal(), expected_fatal(&err), "{:?}", err);
        }
    }

    #[test]
    fn test_display_names_zone_and_record() {
        let err = Error::record_update("z1", "home.example.com", "rate limited");
        let msg = err.to_string();
        assert!(msg.contains("z1"));
        assert!(msg.contains("home.example.com"));
        assert!(msg.contains("rate limited"));
    }
}
