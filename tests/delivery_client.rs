//! End-to-end delivery tests against a mock gateway.

use own_sms_sender::metrics::{PRICE, SMS_DELIVERED};
use own_sms_sender::{
    CircuitBreakerConfig, HttpConfig, InMemoryMetrics, RetryConfig, SmsDeliveryClient,
    SmsSenderConfig, Transmitter,
};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(base_url: &str) -> SmsSenderConfig {
    SmsSenderConfig::new("acme", "p@ss word", "ACME", base_url)
        .with_retry(RetryConfig::disabled())
}

#[tokio::test]
async fn test_accepted_delivery_counts_price() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/send"))
        .and(query_param("name", "acme"))
        .and(query_param("password", "p@ss word"))
        .and(query_param("to", "+14155550123"))
        .and(query_param("from", "ACME"))
        .and(query_param(
            "text",
            "Your verification code: 428913\n\nOr tap: sgnl://verify/428913",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"price": 0.05})))
        .expect(1)
        .mount(&server)
        .await;

    let metrics = InMemoryMetrics::new();
    let client =
        SmsDeliveryClient::new(config(&format!("{}/send", server.uri())), &metrics).unwrap();

    let handle = client
        .deliver_sms_verification("+14155550123", Some("ios"), "428913")
        .unwrap();

    assert!(handle.await);
    assert_eq!(metrics.value(SMS_DELIVERED), 1);
    assert_eq!(metrics.value(PRICE), 50);
}

#[tokio::test]
async fn test_rejected_delivery_resolves_false() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/send"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(serde_json::json!({"status": 403, "message": "blocked"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let metrics = InMemoryMetrics::new();
    let client =
        SmsDeliveryClient::new(config(&format!("{}/send", server.uri())), &metrics).unwrap();

    let handle = client
        .deliver_sms_verification("+14155550123", None, "428913")
        .unwrap();

    assert!(!handle.await);
    assert_eq!(metrics.value(SMS_DELIVERED), 1);
    assert_eq!(metrics.value(PRICE), 0);
}

#[tokio::test]
async fn test_plain_text_acceptance_resolves_true() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/send"))
        .and(query_param("text", "<#> Your verification code: 428913\n\ndoDiFGKPO1r"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&server)
        .await;

    let metrics = InMemoryMetrics::new();
    let client =
        SmsDeliveryClient::new(config(&format!("{}/send", server.uri())), &metrics).unwrap();

    let handle = client
        .deliver_sms_verification("+14155550123", Some("android-ng"), "428913")
        .unwrap();

    assert!(handle.await);
    assert_eq!(metrics.value(PRICE), 0);
}

#[tokio::test]
async fn test_open_breaker_short_circuits() {
    let server = MockServer::start().await;
    // First request times out and trips the breaker.
    Mock::given(method("GET"))
        .and(path("/send"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"price": 0.01}))
                .set_delay(Duration::from_secs(2)),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    // Would accept the second delivery if it ever reached the gateway.
    Mock::given(method("GET"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"price": 0.01})))
        .expect(0)
        .mount(&server)
        .await;

    let metrics = InMemoryMetrics::new();
    let config = config(&format!("{}/send", server.uri()))
        .with_http(HttpConfig::default().with_request_timeout(Duration::from_millis(200)))
        .with_circuit_breaker(
            CircuitBreakerConfig::default()
                .with_failure_threshold(1)
                .with_wait_duration_in_open_state(Duration::from_secs(60)),
        );
    let client = SmsDeliveryClient::new(config, &metrics).unwrap();

    let first = client
        .deliver_sms_verification("+14155550123", None, "111111")
        .unwrap();
    assert!(!first.await);

    let second = client
        .deliver_sms_verification("+14155550123", None, "222222")
        .unwrap();
    assert!(!second.await);

    assert_eq!(metrics.value(SMS_DELIVERED), 2);
    assert_eq!(metrics.value(PRICE), 0);
}

#[tokio::test]
async fn test_concurrent_deliveries_all_resolve() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/send"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"price": 0.002}))
                .set_delay(Duration::from_millis(20)),
        )
        .expect(20)
        .mount(&server)
        .await;

    let metrics = InMemoryMetrics::new();
    let client =
        SmsDeliveryClient::new(config(&format!("{}/send", server.uri())), &metrics).unwrap();

    let handles: Vec<_> = (0..20)
        .map(|i| {
            client
                .deliver_sms_verification("+14155550123", None, &format!("{:06}", i))
                .unwrap()
        })
        .collect();

    for handle in handles {
        assert!(handle.await);
    }
    assert_eq!(metrics.value(SMS_DELIVERED), 20);
    assert_eq!(metrics.value(PRICE), 40);
}
