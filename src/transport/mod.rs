//! Fault-tolerant HTTP transport used to reach the SMS gateway.
//!
//! The delivery client only depends on the [`Transport`] trait. The default
//! implementation, [`FaultTolerantHttpClient`], composes `reqwest` with a
//! `failsafe` circuit breaker and `backon` retries.

pub(crate) mod breaker;
pub(crate) mod client;
pub(crate) mod error;
pub(crate) mod traits;

pub use breaker::CircuitBreakerConfig;
pub use client::{FaultTolerantHttpClient, FaultTolerantHttpClientBuilder, HttpConfig};
pub use error::TransportError;
pub use traits::{RenderedRequest, Transport, TransportResponse};
