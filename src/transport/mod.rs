pub mod config;
pub mod error;
pub mod http;
pub mod response;
pub mod stats;

pub use config::{ConfigError, TransportConfig};
pub use error::TransportError;
pub use http::HttpTransport;
pub use response::TransportResponse;
pub use stats::{TransportStats, TransportStatsSnapshot};

use crate::domain::Trace;
use std::future::Future;

/// Span submission to the trace agent.
pub trait Transport: Send + Sync {
    /// Delivers one batch of traces and reports how the agent answered.
    ///
    /// Non-2xx statuses are returned as responses, not errors; only failures
    /// to produce or deliver the request are errors.
    fn send(
        &self,
        traces: &[Trace],
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;

    fn set_header(&self, key: &str, value: &str) -> Result<(), TransportError>;
}

impl Transport for HttpTransport {
    fn send(
        &self,
        traces: &[Trace],
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send {
        HttpTransport::send(self, traces)
    }

    fn set_header(&self, key: &str, value: &str) -> Result<(), TransportError> {
        HttpTransport::set_header(self, key, value)
    }
}
