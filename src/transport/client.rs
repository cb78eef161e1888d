//! Default fault-tolerant HTTP transport.

use super::breaker::{CircuitBreakerConfig, GatewayBreaker};
use super::error::TransportError;
use super::traits::{RenderedRequest, Transport, TransportResponse};
use crate::errors::RetryableError;
use crate::utils::retry::RetryConfig;
use backon::Retryable;
use failsafe::futures::CircuitBreaker;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde::Deserialize;
use std::time::Duration;

#[cfg(feature = "tracing")]
use opentelemetry::trace::Status;
#[cfg(feature = "tracing")]
use tracing::{Span, debug};
#[cfg(feature = "tracing")]
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Default transport name, used in logs and breaker errors.
pub const DEFAULT_TRANSPORT_NAME: &str = "own_sms_sender";

/// Connection-level HTTP settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpConfig {
    /// Name of this transport instance (default: `own_sms_sender`).
    pub name: String,
    /// TCP/TLS connect timeout (default: 10 seconds).
    pub connect_timeout: Duration,
    /// Total per-attempt timeout, unlimited if `None` (default: `None`).
    pub request_timeout: Option<Duration>,
    /// Speak HTTP/2 without negotiation. When false, HTTP/2 is still
    /// preferred through ALPN on TLS connections (default: false).
    pub http2_prior_knowledge: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_TRANSPORT_NAME.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            http2_prior_knowledge: false,
        }
    }
}

impl HttpConfig {
    /// Set the transport name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the per-attempt request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Require HTTP/2 without protocol negotiation.
    pub fn with_http2_prior_knowledge(mut self, enabled: bool) -> Self {
        self.http2_prior_knowledge = enabled;
        self
    }
}

/// HTTP client with circuit breaking and retries.
///
/// Each attempt runs through the circuit breaker; attempts that fail with a
/// retryable [`TransportError`] are retried with exponential backoff. Gateway
/// responses are returned as-is whatever their status, and redirects are
/// never followed.
///
/// # Example
///
/// ```rust,ignore
/// use own_sms_sender::{CircuitBreakerConfig, FaultTolerantHttpClient, RetryConfig};
/// use std::time::Duration;
///
/// let transport = FaultTolerantHttpClient::builder()
///     .circuit_breaker(CircuitBreakerConfig::default().with_failure_threshold(10))
///     .retry(RetryConfig::default().with_max_retries(2))
///     .build()?;
/// ```
pub struct FaultTolerantHttpClient {
    name: String,
    http_client: ClientWithMiddleware,
    breaker: GatewayBreaker,
    retry_config: RetryConfig,
}

impl std::fmt::Debug for FaultTolerantHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaultTolerantHttpClient")
            .field("name", &self.name)
            .field("retry_config", &self.retry_config)
            .finish_non_exhaustive()
    }
}

/// Builder for configuring a [`FaultTolerantHttpClient`].
#[derive(Default)]
pub struct FaultTolerantHttpClientBuilder {
    http: HttpConfig,
    circuit_breaker: CircuitBreakerConfig,
    retry: RetryConfig,
    http_client: Option<ClientWithMiddleware>,
}

impl FaultTolerantHttpClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set connection-level HTTP settings.
    pub fn http(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    /// Set the circuit breaker configuration.
    pub fn circuit_breaker(mut self, config: CircuitBreakerConfig) -> Self {
        self.circuit_breaker = config;
        self
    }

    /// Set the retry configuration.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// Set a custom HTTP client with middleware.
    ///
    /// The connection settings from [`HttpConfig`] are not applied to a
    /// custom client; only its name is kept.
    pub fn http_client(mut self, client: ClientWithMiddleware) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Build the [`FaultTolerantHttpClient`].
    pub fn build(self) -> Result<FaultTolerantHttpClient, TransportError> {
        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = reqwest::Client::builder()
                    .connect_timeout(self.http.connect_timeout)
                    .redirect(redirect::Policy::none());
                if let Some(timeout) = self.http.request_timeout {
                    builder = builder.timeout(timeout);
                }
                if self.http.http2_prior_knowledge {
                    builder = builder.http2_prior_knowledge();
                }
                let client = builder.build().map_err(TransportError::BuildHttpClient)?;
                ClientBuilder::new(client).build()
            }
        };

        Ok(FaultTolerantHttpClient {
            name: self.http.name,
            http_client,
            breaker: self.circuit_breaker.build(),
            retry_config: self.retry,
        })
    }
}

impl FaultTolerantHttpClient {
    /// Create a transport with default settings.
    pub fn new() -> Result<Self, TransportError> {
        Self::builder().build()
    }

    /// Create a builder for configuring the transport.
    pub fn builder() -> FaultTolerantHttpClientBuilder {
        FaultTolerantHttpClientBuilder::new()
    }

    /// Name of this transport instance.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get reference to the retry configuration.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    /// One attempt, guarded by the circuit breaker.
    async fn send_once(&self, request: &RenderedRequest) -> Result<TransportResponse, TransportError> {
        let attempt = async {
            let response = self
                .http_client
                .get(request.url().clone())
                .send()
                .await
                .map_err(TransportError::HttpRequest)?;
            read_response(response).await
        };

        match self
            .breaker
            .call_with(|err: &TransportError| err.trips_breaker(), attempt)
            .await
        {
            Ok(response) => Ok(response),
            Err(failsafe::Error::Inner(err)) => Err(err),
            Err(failsafe::Error::Rejected) => Err(TransportError::CircuitOpen {
                name: self.name.clone(),
            }),
        }
    }
}

/// Collect status, content type and body text.
async fn read_response(response: reqwest::Response) -> Result<TransportResponse, TransportError> {
    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = response.text().await.map_err(TransportError::ReadBody)?;

    Ok(TransportResponse {
        status,
        content_type,
        body,
    })
}

impl Transport for FaultTolerantHttpClient {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "FaultTolerantHttpClient::send",
            skip_all,
            fields(
                transport = %self.name,
                host = request.url().host_str().unwrap_or_default(),
                status = tracing::field::Empty
            )
        )
    )]
    async fn send(&self, request: RenderedRequest) -> Result<TransportResponse, TransportError> {
        let response = (|| self.send_once(&request))
            .retry(self.retry_config.build_strategy())
            .when(|err: &TransportError| err.is_retryable())
            .notify(|err, duration| {
                let _ = (err, duration);
                #[cfg(feature = "tracing")]
                debug!(
                    error = %err,
                    retry_after_secs = %duration.as_secs_f64(),
                    "Retrying gateway request"
                );
            })
            .await?;

        #[cfg(feature = "tracing")]
        {
            Span::current()
                .record("status", response.status)
                .set_status(Status::Ok);
        }

        Ok(response)
    }
}
