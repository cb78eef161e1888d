//! Circuit breaker configuration.

use failsafe::backoff::{self, Constant};
use failsafe::failure_policy::{ConsecutiveFailures, consecutive_failures};
use failsafe::{Config, StateMachine};
use serde::Deserialize;
use std::time::Duration;

/// Breaker state machine guarding the gateway.
pub(crate) type GatewayBreaker = StateMachine<ConsecutiveFailures<Constant>, ()>;

/// Configuration for the circuit breaker wrapped around every gateway send.
///
/// The breaker opens after `failure_threshold` consecutive transport failures
/// and rejects calls for `wait_duration_in_open_state` before letting a probe
/// through.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the breaker (default: 5).
    pub failure_threshold: u32,
    /// How long the breaker stays open (default: 10 seconds).
    pub wait_duration_in_open_state: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            wait_duration_in_open_state: Duration::from_secs(10),
        }
    }
}

impl CircuitBreakerConfig {
    /// Set the number of consecutive failures that open the breaker.
    pub fn with_failure_threshold(mut self, failure_threshold: u32) -> Self {
        self.failure_threshold = failure_threshold;
        self
    }

    /// Set how long the breaker stays open.
    pub fn with_wait_duration_in_open_state(mut self, wait: Duration) -> Self {
        self.wait_duration_in_open_state = wait;
        self
    }

    /// Build the breaker state machine.
    ///
    /// A threshold of 0 is treated as 1.
    pub(crate) fn build(&self) -> GatewayBreaker {
        let policy = consecutive_failures(
            self.failure_threshold.max(1),
            backoff::constant(self.wait_duration_in_open_state),
        );
        Config::new().failure_policy(policy).build()
    }
}
