#![deny(warnings, rust_2024_compatibility)]
// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
// Noisy pedantic lints suppressed with justification:
#![allow(
    clippy::cast_possible_truncation, // Durations and sizes stay within u64
    clippy::missing_errors_doc,       // Internal API
    clippy::missing_panics_doc,       // Internal API
    clippy::module_name_repetitions,  // e.g. TransportError in transport module
    clippy::must_use_candidate,       // Annotated selectively on critical APIs
    clippy::doc_markdown              // Internal API
)]

pub mod domain;
pub mod encoder;
pub mod logging;
pub mod transport;

// Re-export main types for easy access
pub use domain::{Span, Trace, TraceBatch};
pub use encoder::{EncoderFormat, EncoderPool};
pub use transport::{
    HttpTransport, Transport, TransportConfig, TransportError, TransportResponse,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
