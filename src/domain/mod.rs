//! Domain layer for trace-transport.
//!
//! Contains the data handed over by the instrumentation layer:
//! - `Span`: one timed operation
//! - `Trace`: the spans of one trace, in order
//! - `TraceBatch`: the unit submitted in a single send

pub mod span;

pub use span::{Span, Trace, TraceBatch};
