pub mod buffer;
pub mod error;
pub mod format;
pub mod pool;

pub use buffer::Encoder;
pub use error::{DecodeError, EncodeError};
pub use format::EncoderFormat;
pub use pool::{EncoderPool, PoolStats, PooledEncoder};
