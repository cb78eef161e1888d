//! Main delivery client implementation.

use super::config::{AccountConfig, SmsSenderConfig};
use super::error::{ConfigError, DeliveryError};
use super::pool::{DeliveryHandle, WorkerPool};
use super::request::RequestRenderer;
use super::response::DeliveryOutcome;
use super::traits::Transmitter;
use crate::metrics::{CounterHandle, MetricsSink, PRICE, SMS_DELIVERED};
use crate::transport::{FaultTolerantHttpClient, Transport};
use crate::types::{DeliveryRequest, Locale};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

#[cfg(feature = "tracing")]
use tracing::{Instrument, debug, info, warn};

/// Counter handles resolved once at construction.
#[derive(Debug, Clone)]
struct DeliveryMeters {
    sms_delivered: Arc<dyn CounterHandle>,
    price: Arc<dyn CounterHandle>,
}

impl DeliveryMeters {
    fn register(sink: &dyn MetricsSink) -> Self {
        Self {
            sms_delivered: sink.counter(SMS_DELIVERED),
            price: sink.counter(PRICE),
        }
    }

    /// Record side effects of a completed attempt and project it to a boolean.
    fn settle(&self, outcome: &DeliveryOutcome) -> bool {
        match outcome {
            DeliveryOutcome::Success { price: _price } => {
                self.price.add(outcome.price_millis());
                #[cfg(feature = "tracing")]
                info!(price = *_price, "Verification SMS accepted by gateway");
                true
            }
            DeliveryOutcome::Failure {
                status: _status,
                message: _message,
            } => {
                #[cfg(feature = "tracing")]
                info!(
                    status = *_status,
                    message = %_message,
                    "Gateway request failed"
                );
                false
            }
            DeliveryOutcome::TransportError(_e) => {
                #[cfg(feature = "tracing")]
                warn!(error = %_e, "Gateway request failed");
                false
            }
        }
    }
}

/// Verification SMS sender backed by a fault-tolerant transport.
///
/// Deliveries are rendered on the caller's task, then sent and interpreted on
/// a bounded worker pool owned by the client. The client handles concurrent
/// deliveries from any number of tasks; dropping it stops the workers once
/// queued deliveries have finished.
///
/// # Type Parameters
///
/// - `T`: The transport implementation (defaults to [`FaultTolerantHttpClient`])
///
/// # Example
///
/// ```rust,ignore
/// use own_sms_sender::{InMemoryMetrics, SmsDeliveryClient, SmsSenderConfig, Transmitter};
///
/// let config = SmsSenderConfig::from_env()?;
/// let metrics = InMemoryMetrics::new();
/// let client = SmsDeliveryClient::new(config, &metrics)?;
///
/// let handle = client.deliver_sms_verification("+14155550123", Some("ios"), "428913")?;
/// if handle.await {
///     println!("delivered");
/// }
/// ```
pub struct SmsDeliveryClient<T: Transport = FaultTolerantHttpClient> {
    renderer: RequestRenderer,
    transport: Arc<T>,
    pool: WorkerPool,
    meters: DeliveryMeters,
}

impl<T: Transport + std::fmt::Debug> std::fmt::Debug for SmsDeliveryClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsDeliveryClient")
            .field("renderer", &self.renderer)
            .field("transport", &self.transport)
            .field("pool", &self.pool)
            .finish()
    }
}

impl SmsDeliveryClient<FaultTolerantHttpClient> {
    /// Create a client whose transport is built from `config`.
    ///
    /// Must be called inside a Tokio runtime; the worker pool is spawned on it.
    pub fn new(config: SmsSenderConfig, metrics: &dyn MetricsSink) -> Result<Self, ConfigError> {
        config.validate()?;
        let transport = FaultTolerantHttpClient::builder()
            .http(config.http.clone())
            .circuit_breaker(config.circuit_breaker.clone())
            .retry(config.retry.clone())
            .build()?;
        Self::with_transport(config, transport, metrics)
    }
}

impl<T: Transport> SmsDeliveryClient<T> {
    /// Create a client over a caller-supplied transport.
    ///
    /// The breaker, retry and HTTP blocks of `config` are not used; the
    /// transport is expected to be configured already.
    pub fn with_transport(
        config: SmsSenderConfig,
        transport: T,
        metrics: &dyn MetricsSink,
    ) -> Result<Self, ConfigError> {
        let account = config.validate()?;
        let pool = WorkerPool::start(&config.pool)?;

        #[cfg(feature = "tracing")]
        info!(
            account = %account.name(),
            from = %account.from(),
            workers = config.pool.workers,
            queue_capacity = config.pool.queue_capacity,
            "SMS delivery client started"
        );

        Ok(Self {
            renderer: RequestRenderer::new(account, config.templates),
            transport: Arc::new(transport),
            pool,
            meters: DeliveryMeters::register(metrics),
        })
    }

    /// Get reference to the account settings.
    pub fn account(&self) -> &AccountConfig {
        self.renderer.account()
    }

    /// Get reference to the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> Transmitter for SmsDeliveryClient<T> {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "SmsDeliveryClient::deliver_sms_verification",
            skip_all,
            fields(client_type = client_type.unwrap_or("default"))
        )
    )]
    fn deliver_sms_verification(
        &self,
        destination: &str,
        client_type: Option<&str>,
        verification_code: &str,
    ) -> Result<DeliveryHandle, DeliveryError> {
        let request = DeliveryRequest::new(destination, client_type, verification_code)?;
        let rendered = self.renderer.render(&request)?;

        let (result_tx, result_rx) = oneshot::channel();
        let cancel = CancellationToken::new();
        let job_cancel = cancel.clone();
        let transport = Arc::clone(&self.transport);
        let meters = self.meters.clone();

        let job = async move {
            let outcome = tokio::select! {
                biased;
                _ = job_cancel.cancelled() => {
                    #[cfg(feature = "tracing")]
                    debug!("Delivery cancelled before an outcome was recorded");
                    return;
                }
                result = transport.send(rendered) => DeliveryOutcome::from_transport(result),
            };

            let delivered = meters.settle(&outcome);
            let _ = result_tx.send(delivered);
        };

        #[cfg(feature = "tracing")]
        let job = job.in_current_span();

        self.meters.sms_delivered.add(1);
        self.pool.submit(Box::pin(job))?;

        Ok(DeliveryHandle::new(result_rx, cancel))
    }

    fn deliver_vox_verification(
        &self,
        destination: &str,
        verification_code: &str,
        locale: Option<&Locale>,
    ) -> Result<DeliveryHandle, DeliveryError> {
        let _ = (destination, verification_code, locale);

        #[cfg(feature = "tracing")]
        info!("Voice verification is not implemented by this sender");

        Err(DeliveryError::Unsupported {
            operation: "deliver_vox_verification",
        })
    }
}
