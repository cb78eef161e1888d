//! Sender-level error types.

use crate::errors::RetryableError;
use crate::transport::TransportError;
use crate::types::RequestError;
use thiserror::Error;

/// Errors raised while constructing a delivery client.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required account field is missing or blank.
    #[error("Missing required configuration field '{field}'")]
    MissingField { field: &'static str },

    /// A required environment variable is not set.
    #[error("Environment variable {var} is not set")]
    MissingEnv { var: &'static str },

    /// The base URL does not parse.
    #[error("Invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The base URL is not http or https.
    #[error("Unsupported base URL scheme '{scheme}'")]
    UnsupportedScheme { scheme: String },

    /// Worker pool sizing is unusable.
    #[error("Invalid worker pool configuration: {message}")]
    InvalidPool { message: String },

    /// The HTTP transport could not be built.
    #[error("Failed to build transport: {0}")]
    Transport(#[from] TransportError),

    /// The client was constructed outside a Tokio runtime.
    #[error("SMS delivery client must be created inside a Tokio runtime")]
    NoRuntime,
}

/// Errors that prevent a delivery from being dispatched.
///
/// Once a delivery is dispatched, failures are reported through the
/// resolved boolean of its [`DeliveryHandle`](crate::DeliveryHandle) instead.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Caller input failed validation.
    #[error("Invalid delivery request: {0}")]
    InvalidRequest(#[from] RequestError),

    /// A parameter could not be encoded into the request URL.
    #[error("Error building gateway request URL: {0}")]
    Encoding(#[source] serde_urlencoded::ser::Error),

    /// The pending-work queue is at capacity.
    #[error("Delivery queue is full ({capacity} deliveries pending)")]
    QueueFull { capacity: usize },

    /// The worker pool no longer accepts work.
    #[error("Delivery worker pool is shut down")]
    PoolShutDown,

    /// The operation is not implemented by this sender.
    #[error("Operation '{operation}' is not supported by this sender")]
    Unsupported { operation: &'static str },
}

impl RetryableError for DeliveryError {
    fn is_retryable(&self) -> bool {
        match self {
            DeliveryError::QueueFull { .. } => true,
            DeliveryError::InvalidRequest(_)
            | DeliveryError::Encoding(_)
            | DeliveryError::PoolShutDown
            | DeliveryError::Unsupported { .. } => false,
        }
    }

    fn trips_breaker(&self) -> bool {
        false
    }
}
