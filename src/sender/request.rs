//! Gateway request rendering.

use super::config::{AccountConfig, MessageTemplates};
use super::error::DeliveryError;
use crate::transport::RenderedRequest;
use crate::types::DeliveryRequest;
use secrecy::ExposeSecret;

/// Turns delivery requests into gateway GET requests.
#[derive(Debug, Clone)]
pub(crate) struct RequestRenderer {
    account: AccountConfig,
    templates: MessageTemplates,
}

impl RequestRenderer {
    pub(crate) fn new(account: AccountConfig, templates: MessageTemplates) -> Self {
        Self { account, templates }
    }

    pub(crate) fn account(&self) -> &AccountConfig {
        &self.account
    }

    /// Query parameters in wire order.
    fn parameters(&self, request: &DeliveryRequest) -> [(&'static str, String); 5] {
        [
            ("name", self.account.name.clone()),
            ("password", self.account.password.expose_secret().to_string()),
            ("to", request.destination.to_string()),
            ("from", self.account.from.clone()),
            (
                "text",
                self.templates
                    .render(request.client_type, &request.verification_code),
            ),
        ]
    }

    /// Build the target URL: `<baseUrl>?name=..&password=..&to=..&from=..&text=..`.
    ///
    /// A query already present on the base URL is kept in front of the
    /// delivery parameters.
    pub(crate) fn render(&self, request: &DeliveryRequest) -> Result<RenderedRequest, DeliveryError> {
        let encoded = serde_urlencoded::to_string(self.parameters(request))
            .map_err(DeliveryError::Encoding)?;

        let mut url = self.account.base_url.clone();
        let query = match url.query() {
            Some(existing) if !existing.is_empty() => format!("{existing}&{encoded}"),
            _ => encoded,
        };
        url.set_query(Some(&query));

        Ok(RenderedRequest::get(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sender::config::SmsSenderConfig;

    fn renderer(base_url: &str) -> RequestRenderer {
        let config = SmsSenderConfig::new("acme", "p@ss word", "ACME", base_url);
        RequestRenderer::new(config.validate().unwrap(), MessageTemplates::default())
    }

    fn render(client_type: Option<&str>) -> RenderedRequest {
        let request = DeliveryRequest::new("+14155550123", client_type, "428913").unwrap();
        renderer("https://gateway.example/send").render(&request).unwrap()
    }

    fn text_of(request: &RenderedRequest) -> String {
        request
            .query_pairs()
            .into_iter()
            .find(|(k, _)| k == "text")
            .map(|(_, v)| v)
            .unwrap()
    }

    #[test]
    fn test_parameter_order_is_fixed() {
        let keys: Vec<String> = render(None)
            .query_pairs()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, ["name", "password", "to", "from", "text"]);
    }

    #[test]
    fn test_values_are_percent_encoded() {
        let request = render(None);
        let query = request.url().query().unwrap();

        assert!(query.starts_with("name=acme&password=p%40ss+word&to=%2B14155550123&from=ACME&text="));
        assert_eq!(request.url().path(), "/send");

        let pairs = request.query_pairs();
        assert_eq!(pairs[1].1, "p@ss word");
        assert_eq!(pairs[2].1, "+14155550123");
    }

    #[test]
    fn test_template_selected_by_client_type() {
        let ios = text_of(&render(Some("ios")));
        let android = text_of(&render(Some("android-ng")));
        let other = text_of(&render(Some("windows")));
        let absent = text_of(&render(None));

        assert_eq!(ios.matches("428913").count(), 2);
        assert!(ios.contains("sgnl://verify/428913"));
        assert_eq!(android.matches("428913").count(), 1);
        assert!(android.starts_with("<#> "));
        assert_eq!(other, "Your verification code: 428913");
        assert_eq!(absent, other);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        assert_eq!(render(Some("ios")), render(Some("ios")));
    }

    #[test]
    fn test_destination_sent_as_given() {
        let request = DeliveryRequest::new(" +14155550123", None, "428913").unwrap();
        let rendered = renderer("https://gateway.example/send")
            .render(&request)
            .unwrap();

        assert_eq!(rendered.query_pairs()[2].1, " +14155550123");
    }

    #[test]
    fn test_existing_base_query_is_kept() {
        let request = DeliveryRequest::new("+14155550123", None, "428913").unwrap();
        let rendered = renderer("https://gateway.example/send?route=otp")
            .render(&request)
            .unwrap();

        let pairs = rendered.query_pairs();
        assert_eq!(pairs[0], ("route".to_string(), "otp".to_string()));
        assert_eq!(pairs[1].0, "name");
        assert_eq!(pairs.len(), 6);
    }
}
