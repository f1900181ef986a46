//! Probe client built on the hyper legacy client.

use std::fmt;
use std::time::{Duration, Instant};

use bytes::Bytes;
use http::header::USER_AGENT;
use http::{HeaderMap, Method, Request, StatusCode, Uri};
use http_body_util::{BodyExt, Empty};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ProbeError, ProbeResult};

/// Overall request timeout, covering connect, headers and body.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of a probe that reached the dependency.
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    pub status: StatusCode,
    /// Time from sending the request until the response headers arrived.
    pub duration: Duration,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ProbeResponse {
    /// Header value as a string, if present and valid ASCII.
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Shared HTTP client for probes. Cheap to clone; clones share the
/// connection pool.
#[derive(Clone)]
pub struct ProbeClient {
    client: Client<HttpConnector, Empty<Bytes>>,
    timeout: Duration,
}

impl fmt::Debug for ProbeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeClient")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for ProbeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ProbeClient {
    /// Create a client with the default 5s timeout.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new()).build_http();
        Self { client, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send a `GET` and read the whole body.
    pub async fn get(&self, url: &str) -> ProbeResult<ProbeResponse> {
        let uri: Uri = url.parse().map_err(|e: http::uri::InvalidUri| ProbeError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        match tokio::time::timeout(self.timeout, self.fetch(uri)).await {
            Ok(result) => result,
            Err(_) => {
                debug!(%url, timeout_ms = self.timeout.as_millis() as u64, "probe timed out");
                Err(ProbeError::Timeout(self.timeout))
            }
        }
    }

    /// Send a `GET` and decode the body as `T`.
    ///
    /// A body that is not valid JSON for `T` yields [`ProbeError::Decode`]
    /// regardless of the status code.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> ProbeResult<(ProbeResponse, T)> {
        let response = self.get(url).await?;
        let decoded = serde_json::from_slice(&response.body).map_err(|e| {
            debug!(%url, status = %response.status, error = %e, "probe body is not valid json");
            ProbeError::Decode(e.to_string())
        })?;
        Ok((response, decoded))
    }

    async fn fetch(&self, uri: Uri) -> ProbeResult<ProbeResponse> {
        let req = Request::builder()
            .method(Method::GET)
            .uri(uri.clone())
            .header(USER_AGENT, concat!("vegahc-probe/", env!("CARGO_PKG_VERSION")))
            .body(Empty::<Bytes>::new())
            .map_err(|e| ProbeError::Request(e.to_string()))?;

        let start = Instant::now();
        let resp = self.client.request(req).await.map_err(|e| {
            debug!(%uri, error = %e, "probe request failed");
            ProbeError::Request(e.to_string())
        })?;
        let duration = start.elapsed();

        let (parts, body) = resp.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| ProbeError::ReadBody(e.to_string()))?
            .to_bytes();

        debug!(
            %uri,
            status = %parts.status,
            duration_ms = duration.as_millis() as u64,
            "probe finished"
        );

        Ok(ProbeResponse {
            status: parts.status,
            duration,
            headers: parts.headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_client_uses_five_second_timeout() {
        assert_eq!(ProbeClient::default().timeout(), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn malformed_url_is_rejected_before_sending() {
        let client = ProbeClient::new();
        let err = client.get("http://exa mple.com/").await.unwrap_err();
        assert!(matches!(err, ProbeError::InvalidUrl { .. }));
        assert!(!err.is_decode());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let mut headers = HeaderMap::new();
        headers.insert("x-block-height", "955".parse().unwrap());
        let resp = ProbeResponse {
            status: StatusCode::OK,
            duration: Duration::from_millis(1),
            headers,
            body: Bytes::new(),
        };
        assert_eq!(resp.header_str("X-Block-Height"), Some("955"));
        assert_eq!(resp.header_str("x-missing"), None);
    }
}
