//! Retry configuration for gateway requests.

use backon::ExponentialBuilder;
use serde::Deserialize;
use std::time::Duration;

/// Configuration for transport-level retry behavior.
///
/// Only errors classified as retryable by
/// [`RetryableError`](crate::RetryableError) are retried; a gateway response
/// of any status is never retried.
///
/// ```rust
/// use own_sms_sender::RetryConfig;
/// use std::time::Duration;
///
/// let config = RetryConfig::default()
///     .with_min_delay(Duration::from_millis(200))
///     .with_max_delay(Duration::from_secs(5))
///     .with_factor(1.5)
///     .with_max_retries(2);
///
/// assert_eq!(config.max_retries, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetryConfig {
    /// Minimum delay between retries (default: 1 second).
    pub min_delay: Duration,
    /// Maximum delay between retries (default: 30 seconds).
    pub max_delay: Duration,
    /// Exponential backoff factor (default: 2.0).
    pub factor: f32,
    /// Maximum number of retry attempts after the first send (default: 3).
    pub max_retries: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            factor: 2.0,
            max_retries: 3,
        }
    }
}

impl RetryConfig {
    /// A configuration that sends exactly once.
    pub fn disabled() -> Self {
        Self::default().with_max_retries(0)
    }

    /// Set the minimum delay between retries.
    pub fn with_min_delay(mut self, delay: Duration) -> Self {
        self.min_delay = delay;
        self
    }

    /// Set the maximum delay between retries.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the exponential backoff factor.
    pub fn with_factor(mut self, factor: f32) -> Self {
        self.factor = factor;
        self
    }

    /// Set the maximum number of retry attempts.
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Build a backoff strategy from this configuration.
    pub fn build_strategy(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_factor(self.factor)
            .with_max_times(self.max_retries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_config_default() {
        let config = RetryConfig::default();
        assert_eq!(config.min_delay, Duration::from_secs(1));
        assert_eq!(config.max_delay, Duration::from_secs(30));
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_retry_config_disabled() {
        assert_eq!(RetryConfig::disabled().max_retries, 0);
    }

    #[test]
    fn test_retry_config_deserialize_partial() {
        let config: RetryConfig = serde_json::from_str(r#"{"maxRetries": 5}"#).unwrap();
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.factor, 2.0);
    }
}
