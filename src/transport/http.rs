use super::config::TransportConfig;
use super::error::TransportError;
use super::response::TransportResponse;
use super::stats::{TransportStats, TransportStatsSnapshot};
use crate::domain::Trace;
use crate::encoder::{EncoderPool, PoolStats};
use parking_lot::RwLock;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, ClientBuilder};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

const TRACE_COUNT_HEADER: &str = "x-trace-count";

/// URL and encoder pool currently in use. Replaced as a whole so a send never
/// pairs the legacy URL with the primary wire format or the other way round.
#[derive(Debug)]
struct ActiveEndpoint {
    url: String,
    pool: EncoderPool,
    compatibility_mode: bool,
}

/// Sends trace batches to the agent over HTTP.
///
/// Starts on the current API. The first 404 or 415 answer switches the
/// transport, once and for good, to the legacy API and its wire format, and the
/// rejected batch is re-sent there. Clones share the same state.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: TransportConfig,
    legacy_url: String,
    active: Arc<RwLock<Arc<ActiveEndpoint>>>,
    headers: Arc<RwLock<HeaderMap>>,
    stats: Arc<TransportStats>,
}

impl HttpTransport {
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let url = config.primary_url();
        let legacy_url = config.legacy_url();
        Self::with_endpoints(url, legacy_url, config)
    }

    /// Transport for an agent on the default host and port.
    pub fn with_defaults() -> Result<Self, TransportError> {
        Self::new(TransportConfig::default())
    }

    /// Transport with explicit delivery URLs instead of ones derived from the
    /// configured host and port.
    pub fn with_endpoints(
        url: impl Into<String>,
        legacy_url: impl Into<String>,
        config: TransportConfig,
    ) -> Result<Self, TransportError> {
        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| {
                TransportError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        let endpoint = ActiveEndpoint {
            url: url.into(),
            pool: EncoderPool::new(config.encoding, config.pool_size),
            compatibility_mode: false,
        };

        let transport = Self {
            client,
            config,
            legacy_url: legacy_url.into(),
            active: Arc::new(RwLock::new(Arc::new(endpoint))),
            headers: Arc::new(RwLock::new(HeaderMap::new())),
            stats: Arc::new(TransportStats::new()),
        };

        for (key, value) in &transport.config.headers {
            transport.set_header(key, value)?;
        }

        Ok(transport)
    }

    pub async fn send(&self, traces: &[Trace]) -> Result<TransportResponse, TransportError> {
        let endpoint = self.active_endpoint();
        let response = self.send_to(&endpoint, traces).await?;

        if endpoint.compatibility_mode || !response.is_unsupported_api() {
            return Ok(response);
        }

        self.downgrade(&endpoint, response.status);

        // The legacy endpoint is terminal, so this cannot downgrade again
        let legacy = self.active_endpoint();
        self.send_to(&legacy, traces).await
    }

    /// Sets a header on all future requests, replacing any previous value.
    ///
    /// `Content-Type` always follows the active wire format and cannot be
    /// overridden here.
    pub fn set_header(&self, key: &str, value: &str) -> Result<(), TransportError> {
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
            TransportError::Configuration(format!("Invalid header name '{key}': {e}"))
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            TransportError::Configuration(format!("Invalid value for header '{key}': {e}"))
        })?;

        self.headers.write().insert(name, value);
        Ok(())
    }

    pub fn url(&self) -> String {
        self.active_endpoint().url.clone()
    }

    pub fn legacy_url(&self) -> &str {
        &self.legacy_url
    }

    pub fn is_compatibility_mode(&self) -> bool {
        self.active_endpoint().compatibility_mode
    }

    pub fn content_type(&self) -> &'static str {
        self.active_endpoint().pool.content_type()
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.active_endpoint().pool.stats()
    }

    pub fn stats(&self) -> TransportStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn active_endpoint(&self) -> Arc<ActiveEndpoint> {
        Arc::clone(&*self.active.read())
    }

    async fn send_to(
        &self,
        endpoint: &ActiveEndpoint,
        traces: &[Trace],
    ) -> Result<TransportResponse, TransportError> {
        if endpoint.url.is_empty() {
            return Err(TransportError::Configuration(
                "provided an empty URL, giving up".to_string(),
            ));
        }

        let mut encoder = endpoint.pool.borrow().await?;
        let payload = encoder.encode(traces)?;
        let bytes_sent = payload.len();
        let headers = self.build_headers(endpoint, traces.len());

        debug!(
            "Sending {} traces ({} bytes, {}) to {}",
            traces.len(),
            bytes_sent,
            encoder.format(),
            endpoint.url
        );

        let start = Instant::now();
        let result = self
            .client
            .post(endpoint.url.as_str())
            .headers(headers)
            .body(payload)
            .send()
            .await;
        let latency = start.elapsed();
        drop(encoder);

        match result {
            Ok(response) => {
                let status = response.status();
                self.stats
                    .record_response(status.is_success(), bytes_sent, latency);

                Ok(TransportResponse {
                    status: status.as_u16(),
                    url: endpoint.url.clone(),
                    compatibility_mode: endpoint.compatibility_mode,
                    latency,
                    bytes_sent,
                })
            }
            Err(source) => {
                self.stats.record_transport_error(source.is_timeout());
                warn!("Failed to send {} traces to {}: {}", traces.len(), endpoint.url, source);

                Err(TransportError::Request {
                    response: TransportResponse {
                        compatibility_mode: endpoint.compatibility_mode,
                        latency,
                        ..TransportResponse::unsent(endpoint.url.as_str())
                    },
                    source,
                })
            }
        }
    }

    fn build_headers(&self, endpoint: &ActiveEndpoint, trace_count: usize) -> HeaderMap {
        let mut headers = self.headers.read().clone();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static(endpoint.pool.content_type()),
        );
        headers.insert(
            HeaderName::from_static(TRACE_COUNT_HEADER),
            HeaderValue::from(trace_count),
        );
        headers
    }

    /// Switches to the legacy URL and wire format. Only the first caller that
    /// observed the current API performs the switch.
    fn downgrade(&self, observed: &ActiveEndpoint, status: u16) {
        let mut active = self.active.write();
        if active.compatibility_mode {
            return;
        }

        warn!(
            "calling the endpoint '{}' but received {}; downgrading the API to '{}'",
            observed.url, status, self.legacy_url
        );

        *active = Arc::new(ActiveEndpoint {
            url: self.legacy_url.clone(),
            pool: EncoderPool::new(self.config.legacy_encoding, self.config.pool_size),
            compatibility_mode: true,
        });
        self.stats.record_downgrade();
    }
}
