use std::time::Duration;

/// Outcome of one delivery attempt as seen by the caller.
///
/// `status` is the agent's HTTP status, or 0 when no response was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub url: String,
    pub compatibility_mode: bool,
    pub latency: Duration,
    pub bytes_sent: usize,
}

impl TransportResponse {
    /// Zero-status placeholder for a request that got no answer.
    pub fn unsent(url: impl Into<String>) -> Self {
        Self {
            status: 0,
            url: url.into(),
            compatibility_mode: false,
            latency: Duration::ZERO,
            bytes_sent: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the agent rejected the API version rather than the payload.
    pub fn is_unsupported_api(&self) -> bool {
        self.status == 404 || self.status == 415
    }
}
