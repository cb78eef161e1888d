//! Sender configuration types.

use super::error::ConfigError;
use crate::transport::{CircuitBreakerConfig, HttpConfig};
use crate::types::{ClientType, VerificationCode};
use crate::utils::retry::RetryConfig;
use secrecy::SecretString;
use serde::Deserialize;
use std::fmt::{self, Debug, Formatter};
use url::Url;

/// Environment variable holding the gateway account name.
pub const ENV_ACCOUNT_NAME: &str = "OWN_SMS_ACCOUNT_NAME";
/// Environment variable holding the gateway account password.
pub const ENV_ACCOUNT_PASSWORD: &str = "OWN_SMS_ACCOUNT_PASSWORD";
/// Environment variable holding the sender id.
pub const ENV_ACCOUNT_FROM: &str = "OWN_SMS_ACCOUNT_FROM";
/// Environment variable holding the gateway base URL.
pub const ENV_BASE_URL: &str = "OWN_SMS_BASE_URL";

/// Placeholder replaced by the verification code in message templates.
pub const CODE_PLACEHOLDER: &str = "{code}";

/// Configuration for the SMS delivery client.
///
/// Account fields are required and must be non-empty; every nested block
/// falls back to its defaults when omitted. Field names follow the
/// camelCase keys used by the gateway account settings.
///
/// # Example
///
/// ```rust
/// use own_sms_sender::{PoolConfig, RetryConfig, SmsSenderConfig};
///
/// let config = SmsSenderConfig::new("acme", "secret", "ACME", "https://gateway.example/send")
///     .with_pool(PoolConfig::default().with_workers(4))
///     .with_retry(RetryConfig::default().with_max_retries(1));
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsSenderConfig {
    /// Gateway account name.
    pub account_name: String,
    /// Gateway account password.
    pub account_password: String,
    /// Sender id shown to the recipient.
    pub account_from: String,
    /// Gateway endpoint that accepts the GET request.
    pub base_url: String,
    /// Circuit breaker around gateway sends.
    #[serde(default)]
    pub circuit_breaker: CircuitBreakerConfig,
    /// Retry policy for transport failures.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Connection-level HTTP settings.
    #[serde(default)]
    pub http: HttpConfig,
    /// Worker pool sizing.
    #[serde(default)]
    pub pool: PoolConfig,
    /// Message wording per client type.
    #[serde(default)]
    pub templates: MessageTemplates,
}

impl Debug for SmsSenderConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmsSenderConfig")
            .field("account_name", &self.account_name)
            .field("account_password", &"[REDACTED]")
            .field("account_from", &self.account_from)
            .field("base_url", &self.base_url)
            .field("circuit_breaker", &self.circuit_breaker)
            .field("retry", &self.retry)
            .field("http", &self.http)
            .field("pool", &self.pool)
            .field("templates", &self.templates)
            .finish()
    }
}

impl SmsSenderConfig {
    /// Create a configuration with default nested blocks.
    pub fn new(
        account_name: impl Into<String>,
        account_password: impl Into<String>,
        account_from: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            account_name: account_name.into(),
            account_password: account_password.into(),
            account_from: account_from.into(),
            base_url: base_url.into(),
            circuit_breaker: CircuitBreakerConfig::default(),
            retry: RetryConfig::default(),
            http: HttpConfig::default(),
            pool: PoolConfig::default(),
            templates: MessageTemplates::default(),
        }
    }

    /// Read account settings from `OWN_SMS_*` environment variables.
    ///
    /// Nested blocks use their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        fn var(name: &'static str) -> Result<String, ConfigError> {
            std::env::var(name).map_err(|_| ConfigError::MissingEnv { var: name })
        }

        Ok(Self::new(
            var(ENV_ACCOUNT_NAME)?,
            var(ENV_ACCOUNT_PASSWORD)?,
            var(ENV_ACCOUNT_FROM)?,
            var(ENV_BASE_URL)?,
        ))
    }

    /// Set the circuit breaker configuration.
    pub fn with_circuit_breaker(mut self, config: CircuitBreakerConfig) -> Self {
        self.circuit_breaker = config;
        self
    }

    /// Set the retry configuration.
    pub fn with_retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// Set connection-level HTTP settings.
    pub fn with_http(mut self, config: HttpConfig) -> Self {
        self.http = config;
        self
    }

    /// Set the worker pool sizing.
    pub fn with_pool(mut self, config: PoolConfig) -> Self {
        self.pool = config;
        self
    }

    /// Set the message templates.
    pub fn with_templates(mut self, templates: MessageTemplates) -> Self {
        self.templates = templates;
        self
    }

    /// Check required fields and sizing, producing the immutable account settings.
    pub fn validate(&self) -> Result<AccountConfig, ConfigError> {
        fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ConfigError> {
            let value = value.trim();
            if value.is_empty() {
                return Err(ConfigError::MissingField { field });
            }
            Ok(value)
        }

        let name = required("accountName", &self.account_name)?;
        let password = required("accountPassword", &self.account_password)?;
        let from = required("accountFrom", &self.account_from)?;
        let raw_url = required("baseUrl", &self.base_url)?;

        let base_url = Url::parse(raw_url).map_err(|source| ConfigError::InvalidBaseUrl {
            url: raw_url.to_string(),
            source,
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme {
                scheme: base_url.scheme().to_string(),
            });
        }

        self.pool.validate()?;

        Ok(AccountConfig {
            name: name.to_string(),
            password: SecretString::from(password.to_string()),
            from: from.to_string(),
            base_url,
        })
    }
}

/// Validated gateway account settings, owned by a single client.
#[derive(Clone)]
pub struct AccountConfig {
    pub(crate) name: String,
    pub(crate) password: SecretString,
    pub(crate) from: String,
    pub(crate) base_url: Url,
}

impl AccountConfig {
    /// Account name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sender id.
    pub fn from(&self) -> &str {
        &self.from
    }

    /// Gateway endpoint.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

impl Debug for AccountConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountConfig")
            .field("name", &self.name)
            .field("password", &"[REDACTED]")
            .field("from", &self.from)
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

/// Sizing of the bounded worker pool that runs deliveries.
///
/// When `queue_capacity` deliveries are already waiting, new deliveries are
/// rejected instead of queued.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PoolConfig {
    /// Number of concurrent delivery workers (default: 10).
    pub workers: usize,
    /// Maximum number of deliveries waiting for a worker (default: 100).
    pub queue_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            queue_capacity: 100,
        }
    }
}

impl PoolConfig {
    /// Set the number of workers.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the pending-work queue capacity.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::InvalidPool {
                message: "workers must be at least 1".to_string(),
            });
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::InvalidPool {
                message: "queue capacity must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Message wording per client type.
///
/// Every occurrence of `{code}` is replaced by the verification code.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MessageTemplates {
    /// Used when no more specific template applies.
    pub default: String,
    /// Used for `ios` clients.
    pub ios: String,
    /// Used for `android-ng` clients.
    pub android_ng: String,
}

impl Default for MessageTemplates {
    fn default() -> Self {
        Self {
            default: "Your verification code: {code}".to_string(),
            ios: "Your verification code: {code}\n\nOr tap: sgnl://verify/{code}".to_string(),
            android_ng: "<#> Your verification code: {code}\n\ndoDiFGKPO1r".to_string(),
        }
    }
}

impl MessageTemplates {
    /// Pick the template for `client_type`.
    pub fn template(&self, client_type: ClientType) -> &str {
        match client_type {
            ClientType::Ios => &self.ios,
            ClientType::AndroidNg => &self.android_ng,
            ClientType::Default => &self.default,
        }
    }

    /// Render the message text for `client_type`.
    pub fn render(&self, client_type: ClientType, code: &VerificationCode) -> String {
        self.template(client_type)
            .replace(CODE_PLACEHOLDER, code.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SmsSenderConfig {
        SmsSenderConfig::new("acme", "secret", "ACME", "https://gateway.example/send")
    }

    #[test]
    fn test_validate_ok() {
        let account = config().validate().unwrap();
        assert_eq!(account.name(), "acme");
        assert_eq!(account.from(), "ACME");
        assert_eq!(account.base_url().as_str(), "https://gateway.example/send");
    }

    #[test]
    fn test_validate_missing_fields() {
        let mut c = config();
        c.account_password = "  ".to_string();
        assert!(matches!(
            c.validate(),
            Err(ConfigError::MissingField {
                field: "accountPassword"
            })
        ));

        let mut c = config();
        c.base_url = String::new();
        assert!(matches!(
            c.validate(),
            Err(ConfigError::MissingField { field: "baseUrl" })
        ));
    }

    #[test]
    fn test_validate_bad_url() {
        let mut c = config();
        c.base_url = "not a url".to_string();
        assert!(matches!(c.validate(), Err(ConfigError::InvalidBaseUrl { .. })));

        c.base_url = "ftp://gateway.example/send".to_string();
        assert!(matches!(
            c.validate(),
            Err(ConfigError::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn test_validate_pool_sizing() {
        let c = config().with_pool(PoolConfig::default().with_queue_capacity(0));
        assert!(matches!(c.validate(), Err(ConfigError::InvalidPool { .. })));

        let c = config().with_pool(PoolConfig::default().with_workers(0));
        assert!(matches!(c.validate(), Err(ConfigError::InvalidPool { .. })));
    }

    #[test]
    fn test_debug_redacts_password() {
        let c = config();
        assert!(!format!("{:?}", c).contains("secret"));
        assert!(!format!("{:?}", c.validate().unwrap()).contains("secret"));
    }

    #[test]
    fn test_deserialize_camel_case() {
        let c: SmsSenderConfig = serde_json::from_str(
            r#"{
                "accountName": "acme",
                "accountPassword": "secret",
                "accountFrom": "ACME",
                "baseUrl": "https://gateway.example/send",
                "pool": { "workers": 2, "queueCapacity": 5 }
            }"#,
        )
        .unwrap();

        assert_eq!(c.pool, PoolConfig { workers: 2, queue_capacity: 5 });
        assert_eq!(c.retry, RetryConfig::default());
        assert_eq!(c.templates, MessageTemplates::default());
    }

    #[test]
    fn test_templates_substitution_counts() {
        let templates = MessageTemplates::default();
        let code = VerificationCode::new("428913").unwrap();

        let ios = templates.render(ClientType::Ios, &code);
        let android = templates.render(ClientType::AndroidNg, &code);
        let default = templates.render(ClientType::Default, &code);

        assert_eq!(ios.matches("428913").count(), 2);
        assert_eq!(android.matches("428913").count(), 1);
        assert_eq!(default.matches("428913").count(), 1);
        assert!(android.starts_with("<#> "));
        assert_eq!(default, "Your verification code: 428913");
    }
}
