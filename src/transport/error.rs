use super::response::TransportResponse;
use crate::encoder::EncodeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    #[error("Encoding failed: {0}")]
    Encoding(#[from] EncodeError),
    /// The request never produced an HTTP status. `response` is a zero-status
    /// placeholder and must not be read as a rejection from the agent.
    #[error("Request to {} failed: {source}", .response.url)]
    Request {
        response: TransportResponse,
        #[source]
        source: reqwest::Error,
    },
}

impl TransportError {
    /// The response associated with this error, if a request was attempted.
    pub fn placeholder_response(&self) -> Option<&TransportResponse> {
        match self {
            TransportError::Request { response, .. } => Some(response),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Request { source, .. } if source.is_timeout())
    }
}
