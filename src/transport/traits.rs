//! Transport trait definition.

use super::error::TransportError;
use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use url::Url;

/// A fully rendered gateway request.
///
/// The gateway is driven with plain GET requests whose query string carries
/// the account credentials, so `Debug` prints the target without the query.
#[derive(Clone, PartialEq, Eq)]
pub struct RenderedRequest {
    url: Url,
}

impl RenderedRequest {
    /// Wrap a target URL.
    pub fn get(url: Url) -> Self {
        Self { url }
    }

    /// Full target URL, including the encoded query string.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Decoded query parameters, in wire order.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }
}

impl Debug for RenderedRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut target = self.url.clone();
        target.set_query(None);
        f.debug_struct("RenderedRequest")
            .field("method", &"GET")
            .field("target", &target.as_str())
            .field("query", &"[REDACTED]")
            .finish()
    }
}

/// Raw gateway response as seen by the delivery client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Value of the `Content-Type` header, if present.
    pub content_type: Option<String>,
    /// Response body decoded as text.
    pub body: String,
}

impl TransportResponse {
    /// Create a response from its parts.
    pub fn new(status: u16, content_type: Option<&str>, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: content_type.map(str::to_string),
            body: body.into(),
        }
    }

    /// Returns true for statuses in `[200, 300)`.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true if the content type names JSON.
    ///
    /// Media type parameters such as `charset` are ignored.
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .is_some_and(|media| media.trim().eq_ignore_ascii_case("application/json"))
    }
}

/// Fault-tolerant request execution.
///
/// Implementations own connection pooling, retries and circuit breaking. A
/// response with any HTTP status is a successful send; `Err` means no usable
/// response was obtained at all.
///
/// # Note on async methods
///
/// `send` returns a `Send` future so in-flight deliveries can run on a
/// multi-threaded executor.
///
/// # Example
///
/// ```rust,ignore
/// use own_sms_sender::{RenderedRequest, Transport, TransportError, TransportResponse};
///
/// #[derive(Clone)]
/// struct AlwaysPriced;
///
/// impl Transport for AlwaysPriced {
///     async fn send(&self, _request: RenderedRequest) -> Result<TransportResponse, TransportError> {
///         Ok(TransportResponse::new(200, Some("application/json"), r#"{"price":0.05}"#))
///     }
/// }
/// ```
pub trait Transport: Send + Sync + 'static {
    /// Send the request and return whatever the gateway answered.
    fn send(
        &self,
        request: RenderedRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_range() {
        assert!(TransportResponse::new(200, None, "").is_success());
        assert!(TransportResponse::new(299, None, "").is_success());
        assert!(!TransportResponse::new(300, None, "").is_success());
        assert!(!TransportResponse::new(199, None, "").is_success());
        assert!(!TransportResponse::new(403, None, "").is_success());
    }

    #[test]
    fn test_json_content_type() {
        assert!(TransportResponse::new(200, Some("application/json"), "").is_json());
        assert!(TransportResponse::new(200, Some("application/json; charset=utf-8"), "").is_json());
        assert!(TransportResponse::new(200, Some("Application/JSON"), "").is_json());
        assert!(!TransportResponse::new(200, Some("text/plain"), "").is_json());
        assert!(!TransportResponse::new(200, None, "").is_json());
    }

    #[test]
    fn test_rendered_request_debug_hides_query() {
        let url = Url::parse("https://gateway.example/send?name=acme&password=hunter2").unwrap();
        let request = RenderedRequest::get(url);
        let debug = format!("{:?}", request);
        assert!(debug.contains("gateway.example/send"));
        assert!(!debug.contains("hunter2"));
        assert_eq!(request.query_pairs()[1], ("password".into(), "hunter2".into()));
    }
}
