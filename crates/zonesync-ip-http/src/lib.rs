// # HTTP IP Source
//
// Resolves the host's external IP by asking a plaintext echo endpoint
// (default `http://ip.42.pl/raw`).
//
// ## Behavior
//
// - One GET per call, no caching between calls
// - Status 200: the trimmed body is the address
// - Any other status, a transport failure or an empty body:
//   `Error::ExternalIpUnavailable`
//
// The body is not parsed as an address; whatever the endpoint echoes is
// compared verbatim with the stored state and written into records.

use zonesync_core::traits::IpSource;
use zonesync_core::{Error, Result};

/// Default IP echo endpoint
pub const DEFAULT_IP_URL: &str = "http://ip.42.pl/raw";

/// HTTP-based IP source
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// URL to fetch the IP from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: Echo endpoint returning the caller's address as plain text
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// The endpoint this source queries
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Default for HttpIpSource {
    fn default() -> Self {
        Self::new(DEFAULT_IP_URL)
    }
}

/// Turn an echo endpoint response into an address
fn interpret_response(status: u16, body: &str) -> Result<String> {
    if status != 200 {
        return Err(Error::ip_unavailable(format!("HTTP status {}", status)));
    }

    let ip = body.trim();
    if ip.is_empty() {
        return Err(Error::ip_unavailable("empty response body"));
    }

    Ok(ip.to_string())
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<String> {
        tracing::debug!("Resolving external IP via {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::ip_unavailable(format!("Request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::ip_unavailable(format!("Failed to read response: {}", e)))?;

        let ip = interpret_response(status, &body)?;
        tracing::debug!("External IP is {}", ip);
        Ok(ip)
    }
}
