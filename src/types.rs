//! Core types for verification delivery requests.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// RequestError
// =============================================================================

/// Error when a delivery request field fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Destination phone number is empty.
    #[error("destination cannot be empty")]
    EmptyDestination,
    /// Verification code is empty.
    #[error("verification code cannot be empty")]
    EmptyVerificationCode,
}

// =============================================================================
// Destination
// =============================================================================

/// Destination phone number as accepted by the gateway (e.g., "+14155550123").
///
/// The number is passed through verbatim; formatting rules belong to the
/// gateway.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Destination(String);

impl Destination {
    /// Create a new Destination, rejecting blank input.
    pub fn new(number: impl AsRef<str>) -> Result<Self, RequestError> {
        let n = number.as_ref();
        if n.trim().is_empty() {
            return Err(RequestError::EmptyDestination);
        }
        Ok(Self(n.to_string()))
    }

    /// Get the number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Destination {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Destination {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Destination {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// =============================================================================
// VerificationCode
// =============================================================================

/// One-time verification code sent to the user.
///
/// `Debug` does not print the code so it never ends up in logs by accident.
#[derive(Clone, PartialEq, Eq)]
pub struct VerificationCode(String);

impl VerificationCode {
    /// Create a new VerificationCode, rejecting blank input.
    pub fn new(code: impl AsRef<str>) -> Result<Self, RequestError> {
        let c = code.as_ref();
        if c.trim().is_empty() {
            return Err(RequestError::EmptyVerificationCode);
        }
        Ok(Self(c.to_string()))
    }

    /// Get the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for VerificationCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VerificationCode").field(&"[REDACTED]").finish()
    }
}

impl AsRef<str> for VerificationCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for VerificationCode {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// =============================================================================
// ClientType
// =============================================================================

/// Platform hint supplied by the caller to pick the message wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClientType {
    /// iOS client; the message carries a tappable verification link.
    Ios,
    /// Android client using the SMS Retriever API.
    AndroidNg,
    /// Any other or absent client type.
    #[default]
    Default,
}

impl ClientType {
    /// Map an optional client-type tag to a [`ClientType`].
    ///
    /// Tags are matched exactly; anything unrecognised falls back to
    /// [`ClientType::Default`].
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("ios") => Self::Ios,
            Some("android-ng") => Self::AndroidNg,
            _ => Self::Default,
        }
    }

    /// Returns the wire tag for this client type.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Ios => "ios",
            Self::AndroidNg => "android-ng",
            Self::Default => "default",
        }
    }
}

impl FromStr for ClientType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_tag(Some(s)))
    }
}

impl Display for ClientType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

// =============================================================================
// Locale
// =============================================================================

/// Locale hint for voice delivery (e.g., "en-US").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale(String);

impl Locale {
    /// Create a new Locale.
    pub fn new(locale: impl Into<String>) -> Self {
        Self(locale.into())
    }

    /// Get the locale as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Locale {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Locale {
    fn from(locale: &str) -> Self {
        Self(locale.to_string())
    }
}

// =============================================================================
// DeliveryRequest
// =============================================================================

/// A single verification delivery, validated and immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRequest {
    /// Destination phone number.
    pub destination: Destination,
    /// Platform hint used to choose the message template.
    pub client_type: ClientType,
    /// Code to deliver.
    pub verification_code: VerificationCode,
}

impl DeliveryRequest {
    /// Validate raw caller input into a delivery request.
    pub fn new(
        destination: &str,
        client_type: Option<&str>,
        verification_code: &str,
    ) -> Result<Self, RequestError> {
        Ok(Self {
            destination: Destination::new(destination)?,
            client_type: ClientType::from_tag(client_type),
            verification_code: VerificationCode::new(verification_code)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_kept_verbatim() {
        let d = Destination::new(" +14155550123 ").unwrap();
        assert_eq!(d.as_str(), " +14155550123 ");
        assert_eq!(d.to_string(), " +14155550123 ");
    }

    #[test]
    fn test_verification_code_kept_verbatim() {
        let code = VerificationCode::new("428 913 ").unwrap();
        assert_eq!(code.as_str(), "428 913 ");
    }

    #[test]
    fn test_destination_empty() {
        assert_eq!(Destination::new(""), Err(RequestError::EmptyDestination));
        assert_eq!(Destination::new("   "), Err(RequestError::EmptyDestination));
    }

    #[test]
    fn test_verification_code_empty() {
        assert!(matches!(
            VerificationCode::new(""),
            Err(RequestError::EmptyVerificationCode)
        ));
    }

    #[test]
    fn test_verification_code_debug_redacted() {
        let code = VerificationCode::new("123456").unwrap();
        let debug = format!("{:?}", code);
        assert!(!debug.contains("123456"));
        assert_eq!(code.as_str(), "123456");
    }

    #[test]
    fn test_client_type_from_tag() {
        assert_eq!(ClientType::from_tag(Some("ios")), ClientType::Ios);
        assert_eq!(ClientType::from_tag(Some("android-ng")), ClientType::AndroidNg);
        assert_eq!(ClientType::from_tag(Some("android")), ClientType::Default);
        assert_eq!(ClientType::from_tag(Some("IOS")), ClientType::Default);
        assert_eq!(ClientType::from_tag(None), ClientType::Default);
    }

    #[test]
    fn test_client_type_from_str() {
        let ct: ClientType = "android-ng".parse().unwrap();
        assert_eq!(ct, ClientType::AndroidNg);
        assert_eq!(ct.to_string(), "android-ng");
    }

    #[test]
    fn test_delivery_request_validation() {
        let request = DeliveryRequest::new("+14155550123", Some("ios"), "123456").unwrap();
        assert_eq!(request.client_type, ClientType::Ios);
        assert_eq!(request.verification_code.as_str(), "123456");

        assert_eq!(
            DeliveryRequest::new("", None, "123456"),
            Err(RequestError::EmptyDestination)
        );
        assert_eq!(
            DeliveryRequest::new("+14155550123", None, " "),
            Err(RequestError::EmptyVerificationCode)
        );
    }
}
