use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("MessagePack encoding failed: {0}")]
    Msgpack(#[from] rmp_serde::encode::Error),
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Metric '{key}' is {value}, which JSON cannot represent")]
    NonFiniteMetric { key: String, value: f64 },
    #[error("Unknown encoder format: {0}")]
    UnknownFormat(String),
    #[error("Encoder pool is closed")]
    PoolClosed,
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("MessagePack decoding failed: {0}")]
    Msgpack(#[from] rmp_serde::decode::Error),
    #[error("JSON decoding failed: {0}")]
    Json(#[from] serde_json::Error),
}
