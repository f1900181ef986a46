//! Error types for the probe client.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Ways a single probe can fail.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid probe url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to send http request: {0}")]
    Request(String),

    #[error("http request timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to read http response body: {0}")]
    ReadBody(String),

    #[error("failed to unmarshal http response body: {0}")]
    Decode(String),
}

impl ProbeError {
    /// Whether the dependency answered but the body was not the expected JSON.
    ///
    /// Every other variant means the dependency could not be reached or
    /// did not answer in time.
    pub fn is_decode(&self) -> bool {
        matches!(self, ProbeError::Decode(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_decode_failures_are_decode() {
        assert!(ProbeError::Decode("eof".into()).is_decode());
        assert!(!ProbeError::Request("refused".into()).is_decode());
        assert!(!ProbeError::ReadBody("reset".into()).is_decode());
        assert!(!ProbeError::Timeout(Duration::from_secs(5)).is_decode());
    }

    #[test]
    fn timeout_message_includes_duration() {
        let err = ProbeError::Timeout(Duration::from_secs(5));
        assert_eq!(err.to_string(), "http request timed out after 5s");
    }
}
