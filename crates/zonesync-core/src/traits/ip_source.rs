// # IP Source Trait
//
// Defines the interface for learning the host's current external IP.
//
// ## Implementations
//
// - HTTP echo service: `zonesync-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use zonesync_core::IpSource;
//
// #[tokio::main(flavor = "current_thread")]
// async fn main() -> zonesync_core::Result<()> {
//     let source = /* IpSource implementation */;
//     let external_ip = source.current().await?;
//     println!("external IP: {}", external_ip);
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Trait for IP source implementations
///
/// The address is an opaque string; the reconciler compares it
/// byte-for-byte with the stored state and with record contents.
///
/// # Contract
///
/// - One resolution attempt per call, no retry
/// - Any failure maps to [`Error::ExternalIpUnavailable`](crate::Error::ExternalIpUnavailable)
/// - No decision making: the reconciler decides what to do with the value
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Resolve the current external IP address
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The current IP address
    /// - `Err(Error::ExternalIpUnavailable)`: If the address could not be determined
    async fn current(&self) -> Result<String, crate::Error>;
}
