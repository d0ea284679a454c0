use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An ordered sequence of related spans.
pub type Trace = Vec<Span>;

/// The unit handed to the transport for one send.
pub type TraceBatch = Vec<Trace>;

/// A single timed operation record, laid out the way the trace agent reads it.
///
/// Timestamps and durations are nanoseconds. `meta` and `metrics` are left out
/// of the payload when empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Span {
    pub name: String,
    pub service: String,
    pub resource: String,
    #[serde(rename = "type")]
    pub span_type: String,
    pub start: i64,
    pub duration: i64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metrics: BTreeMap<String, f64>,
    pub span_id: u64,
    pub trace_id: u64,
    pub parent_id: u64,
    pub error: i32,
}

impl Span {
    pub fn new(
        name: impl Into<String>,
        service: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            service: service.into(),
            resource: resource.into(),
            ..Default::default()
        }
    }

    pub fn with_ids(mut self, trace_id: u64, span_id: u64, parent_id: u64) -> Self {
        self.trace_id = trace_id;
        self.span_id = span_id;
        self.parent_id = parent_id;
        self
    }

    pub fn with_timing(mut self, start: i64, duration: i64) -> Self {
        self.start = start;
        self.duration = duration;
        self
    }

    pub fn with_type(mut self, span_type: impl Into<String>) -> Self {
        self.span_type = span_type.into();
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn with_metric(mut self, key: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(key.into(), value);
        self
    }

    pub fn with_error(mut self, error: i32) -> Self {
        self.error = error;
        self
    }
}
