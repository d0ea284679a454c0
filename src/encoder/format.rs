use super::error::{DecodeError, EncodeError};
use crate::domain::TraceBatch;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wire format understood by the trace agent.
///
/// `Msgpack` is what the current API (`/v0.3/traces`) expects. `Json` is the
/// fallback for agents that only serve the legacy API (`/v0.2/traces`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderFormat {
    #[default]
    Msgpack,
    Json,
}

impl EncoderFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            EncoderFormat::Msgpack => "application/msgpack",
            EncoderFormat::Json => "application/json",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EncoderFormat::Msgpack => "msgpack",
            EncoderFormat::Json => "json",
        }
    }

    /// Decodes a payload produced by an encoder bound to this format.
    pub fn decode(self, payload: &[u8]) -> Result<TraceBatch, DecodeError> {
        match self {
            EncoderFormat::Msgpack => Ok(rmp_serde::from_slice(payload)?),
            EncoderFormat::Json => Ok(serde_json::from_slice(payload)?),
        }
    }
}

impl fmt::Display for EncoderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EncoderFormat {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "msgpack" => Ok(EncoderFormat::Msgpack),
            "json" => Ok(EncoderFormat::Json),
            other => Err(EncodeError::UnknownFormat(other.to_string())),
        }
    }
}
