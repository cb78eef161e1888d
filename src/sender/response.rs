//! Gateway response interpretation.

use crate::transport::{TransportError, TransportResponse};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[cfg(feature = "tracing")]
use tracing::warn;

/// Success body: `{"price": <number>}`.
#[derive(Debug, Default, Deserialize)]
struct SuccessBody {
    #[serde(default, deserialize_with = "lenient_f64")]
    price: f64,
}

/// Failure body: `{"status": <int>, "message": <string>}`.
#[derive(Debug, Default, Deserialize)]
struct FailureBody {
    #[serde(default, deserialize_with = "lenient_i32")]
    status: i32,
    #[serde(default, deserialize_with = "lenient_string")]
    message: Option<String>,
}

// Field readers below accept numbers and numeric strings alike and fall back
// to the field default instead of failing the whole body.

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_f64().unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0.0,
    })
}

fn lenient_i32<'de, D: Deserializer<'de>>(d: D) -> Result<i32, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Result of one completed delivery attempt.
#[derive(Debug)]
pub enum DeliveryOutcome {
    /// The gateway accepted the message.
    Success {
        /// Price charged by the gateway, 0 when not reported.
        price: f64,
    },
    /// The gateway answered with a non-2xx status.
    Failure {
        /// Status reported in the body, 0 when not reported.
        status: i32,
        /// Message reported in the body, empty when not reported.
        message: String,
    },
    /// No response could be obtained.
    TransportError(TransportError),
}

impl DeliveryOutcome {
    /// Interpret whatever the transport produced.
    pub fn from_transport(result: Result<TransportResponse, TransportError>) -> Self {
        match result {
            Ok(response) => Self::from_response(&response),
            Err(err) => Self::TransportError(err),
        }
    }

    /// Interpret a gateway response.
    ///
    /// A 2xx status is always a success and anything else always a failure;
    /// the body only fills in details. Bodies that are not JSON, or that fail
    /// to decode, leave the details at their defaults.
    pub fn from_response(response: &TransportResponse) -> Self {
        if response.is_success() {
            let body: SuccessBody = decode_body(response, "success");
            Self::Success { price: body.price }
        } else {
            let body: FailureBody = decode_body(response, "failure");
            Self::Failure {
                status: body.status,
                message: body.message.unwrap_or_default(),
            }
        }
    }

    /// Returns true for [`DeliveryOutcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Price in thousandths of the currency unit, truncated toward zero.
    /// Non-success outcomes, negative and non-finite prices give 0.
    pub fn price_millis(&self) -> u64 {
        match self {
            Self::Success { price } if price.is_finite() && *price > 0.0 => {
                (price * 1000.0).trunc() as u64
            }
            _ => 0,
        }
    }
}

fn decode_body<T: DeserializeOwned + Default>(response: &TransportResponse, kind: &'static str) -> T {
    if !response.is_json() {
        return T::default();
    }

    serde_json::from_str(&response.body).unwrap_or_else(|_e| {
        let _ = kind;
        #[cfg(feature = "tracing")]
        warn!(
            error = %_e,
            status = response.status,
            kind,
            "Error parsing gateway response body"
        );
        T::default()
    })
}
