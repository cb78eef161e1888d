//! Error classification traits shared by the transport layer.

/// Trait for errors that can be classified as transient or permanent.
///
/// The fault-tolerant transport uses two levels of classification:
///
/// 1. **Attempt-level** (`is_retryable`): whether the same request should be
///    sent again after a backoff delay. Use this for connect failures,
///    timeouts and interrupted bodies.
///
/// 2. **Breaker-level** (`trips_breaker`): whether the failure says something
///    about the health of the gateway and should be counted by the circuit
///    breaker. A call rejected by an already open breaker, for example, must
///    not be counted again.
///
/// # Examples
///
/// ```rust
/// use own_sms_sender::RetryableError;
///
/// enum GatewayError {
///     ConnectTimeout, // retry, count against the gateway
///     CircuitOpen,    // don't retry, don't count
///     BadRequest,     // don't retry, but the gateway is unhealthy for us
/// }
///
/// impl RetryableError for GatewayError {
///     fn is_retryable(&self) -> bool {
///         matches!(self, GatewayError::ConnectTimeout)
///     }
///
///     fn trips_breaker(&self) -> bool {
///         !matches!(self, GatewayError::CircuitOpen)
///     }
/// }
///
/// assert!(GatewayError::ConnectTimeout.is_retryable());
/// assert!(!GatewayError::CircuitOpen.trips_breaker());
/// assert!(GatewayError::BadRequest.trips_breaker());
/// ```
pub trait RetryableError {
    /// Returns true if this error represents a transient failure
    /// that might succeed when the same request is sent again.
    fn is_retryable(&self) -> bool;

    /// Returns true if this error should be recorded as a failure by the
    /// circuit breaker guarding the gateway.
    ///
    /// Default implementation returns the same as `is_retryable()`.
    fn trips_breaker(&self) -> bool {
        self.is_retryable()
    }
}
