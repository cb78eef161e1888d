//! Transport-level error types.

use crate::errors::RetryableError;
use thiserror::Error;

/// Failure to obtain any response from the gateway.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Failed to build HTTP client.
    #[error("Failed to build HTTP client: {0}")]
    BuildHttpClient(#[source] reqwest::Error),

    /// Failed to send HTTP request.
    #[error("Failed to send HTTP request: {0}")]
    HttpRequest(#[from] reqwest_middleware::Error),

    /// Response headers arrived but the body could not be read.
    #[error("Failed to read response body: {0}")]
    ReadBody(#[source] reqwest::Error),

    /// The circuit breaker is open and rejected the call without sending it.
    #[error("Circuit breaker '{name}' is open")]
    CircuitOpen { name: String },
}

impl RetryableError for TransportError {
    fn is_retryable(&self) -> bool {
        match self {
            TransportError::HttpRequest(reqwest_middleware::Error::Reqwest(e)) => {
                e.is_connect() || e.is_timeout() || e.is_request() || e.is_body()
            }
            TransportError::HttpRequest(reqwest_middleware::Error::Middleware(_)) => false,
            TransportError::ReadBody(_) => true,
            TransportError::BuildHttpClient(_) | TransportError::CircuitOpen { .. } => false,
        }
    }

    fn trips_breaker(&self) -> bool {
        match self {
            TransportError::HttpRequest(_) | TransportError::ReadBody(_) => true,
            TransportError::BuildHttpClient(_) | TransportError::CircuitOpen { .. } => false,
        }
    }
}
