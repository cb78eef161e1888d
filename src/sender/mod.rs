//! Verification SMS delivery over the gateway's HTTP API.

pub(crate) mod config;
pub(crate) mod error;
pub(crate) mod pool;
pub(crate) mod request;
pub(crate) mod response;
pub(crate) mod structure;
pub(crate) mod traits;

pub use config::{AccountConfig, MessageTemplates, PoolConfig, SmsSenderConfig};
pub use error::{ConfigError, DeliveryError};
pub use pool::DeliveryHandle;
pub use response::DeliveryOutcome;
pub use structure::SmsDeliveryClient;
pub use traits::Transmitter;
