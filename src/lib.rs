//! # Own SMS Sender
//!
//! A fault-tolerant client for delivering verification codes by SMS through a
//! bulk-SMS HTTP gateway.
//!
//! Each delivery is rendered into a single GET request carrying the account
//! credentials, destination, sender ID and a message text chosen by the
//! recipient's client platform. Requests run on a bounded worker pool, pass
//! through a circuit breaker and retry policy, and resolve to a plain
//! delivered / not delivered boolean.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use own_sms_sender::{InMemoryMetrics, SmsDeliveryClient, SmsSenderConfig, Transmitter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads OWN_SMS_ACCOUNT_NAME, OWN_SMS_ACCOUNT_PASSWORD,
//!     // OWN_SMS_ACCOUNT_FROM and OWN_SMS_BASE_URL
//!     let config = SmsSenderConfig::from_env()?;
//!     let metrics = InMemoryMetrics::new();
//!     let client = SmsDeliveryClient::new(config, &metrics)?;
//!
//!     let handle = client.deliver_sms_verification("+14155550123", Some("ios"), "428913")?;
//!     println!("Delivered: {}", handle.await);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! SmsDeliveryClient<T>
//!         │  render request, count sms.delivered
//!         ▼
//!    WorkerPool           (bounded queue, fixed workers)
//!         │
//!         ▼
//!   Transport             (trait: FaultTolerantHttpClient, etc.)
//!         │  circuit breaker → retry → HTTP GET
//!         ▼
//!  DeliveryOutcome        (count price, resolve DeliveryHandle)
//! ```
//!
//! ## Features
//!
//! - `tracing` - OpenTelemetry tracing instrumentation (enabled by default)
//! - `metrics` - `OtelMetrics` sink backed by an OpenTelemetry meter

pub mod errors;
pub mod metrics;
pub mod sender;
pub mod transport;
pub mod types;
mod utils;

// Re-export commonly used types at the crate root
pub use errors::RetryableError;
pub use metrics::{CounterHandle, InMemoryMetrics, MetricsSink, NoopMetrics};
#[cfg(feature = "metrics")]
pub use metrics::OtelMetrics;
pub use sender::{
    AccountConfig, ConfigError, DeliveryError, DeliveryHandle, DeliveryOutcome, MessageTemplates,
    PoolConfig, SmsDeliveryClient, SmsSenderConfig, Transmitter,
};
pub use transport::{
    CircuitBreakerConfig, FaultTolerantHttpClient, FaultTolerantHttpClientBuilder, HttpConfig,
    RenderedRequest, Transport, TransportError, TransportResponse,
};
pub use types::{ClientType, DeliveryRequest, Destination, Locale, RequestError, VerificationCode};
pub use utils::retry::RetryConfig;
