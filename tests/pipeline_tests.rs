//! Integration tests for the webhook pipeline.
//!
//! These tests drive `WebhookProcessor` through its public API the way an
//! HTTP endpoint would: raw bytes, a header map and the resulting status.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use shopify_webhooks::webhooks::{
    challenge_response, compute_signature_base64, compute_signature_hex, response_status,
    HealthReport, HEADER_HMAC, HEADER_SHOP_DOMAIN, HEADER_TOPIC, HEADER_WEBHOOK_ID,
};
use shopify_webhooks::{
    EventStatus, HandlerRegistry, LoggingHandler, TopicHandler, WebhookConfig, WebhookError,
    WebhookHeaders, WebhookProcessor, WebhookSecret, WebhookTopic,
};
use tokio_test::{assert_err, assert_ok};

const SECRET: &str = "integration-secret";

fn config() -> WebhookConfig {
    WebhookConfig::builder()
        .webhook_secret(WebhookSecret::new(SECRET).unwrap())
        .build()
        .unwrap()
}

fn headers(body: &[u8], topic: &str, signature: String) -> WebhookHeaders {
    WebhookHeaders::from(vec![
        (HEADER_TOPIC, topic.to_string()),
        (HEADER_SHOP_DOMAIN, "test-shop.myshopify.com".to_string()),
        (HEADER_WEBHOOK_ID, format!("wh-{}", body.len())),
        (HEADER_HMAC, signature),
    ])
}

fn signed(body: &[u8], topic: &str) -> WebhookHeaders {
    headers(body, topic, compute_signature_base64(body, SECRET))
}

fn processor_with_order_counter() -> (WebhookProcessor, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let registry = HandlerRegistry::builder()
        .handler(TopicHandler::new(
            "order-created",
            [WebhookTopic::OrdersCreate],
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        ))
        .fallback(LoggingHandler)
        .build();
    (WebhookProcessor::new(config(), registry), calls)
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_valid_order_creation_webhook() {
    let (processor, calls) = processor_with_order_counter();
    let body = br#"{"id":123,"email":"a@b.com"}"#;

    let outcome = processor.process(body, signed(body, "orders/create")).await;
    assert_eq!(response_status(&outcome), 200);

    let event = assert_ok!(outcome);
    assert_eq!(event.kind(), WebhookTopic::OrdersCreate);
    assert_eq!(event.shop(), Some("test-shop.myshopify.com"));
    assert_eq!(event.entity_id(), Some(123));
    assert_eq!(event.payload_str("email").as_deref(), Some("a@b.com"));
    assert!(event.is_verified());
    assert_eq!(event.status(), EventStatus::Processed);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_tampered_payload_is_rejected() {
    let (processor, calls) = processor_with_order_counter();
    let signature = compute_signature_base64(br#"{"id":123}"#, SECRET);
    let tampered = br#"{"id":999}"#;

    let outcome = processor
        .process(tampered, headers(tampered, "orders/create", signature))
        .await;
    assert_eq!(response_status(&outcome), 500);

    let error = assert_err!(outcome);
    assert!(matches!(error, WebhookError::InvalidHmac));
    assert!(error.is_authentication_failure());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unknown_topic_degrades_to_unclassified() {
    let (processor, calls) = processor_with_order_counter();
    let body = br#"{"id":1}"#;

    let event = assert_ok!(
        processor
            .process(body, signed(body, "widgets/frobnicate"))
            .await
    );

    assert_eq!(event.kind(), WebhookTopic::Unclassified);
    assert_eq!(event.topic(), "widgets/frobnicate");
    assert!(event.is_processed());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(processor.stats().topic_count(WebhookTopic::Unclassified), 1);
}

#[tokio::test]
async fn test_hex_signature_is_accepted() {
    let (processor, _) = processor_with_order_counter();
    let body = br#"{"id":5}"#;
    let signature = format!("sha256={}", compute_signature_hex(body, SECRET));

    let event = assert_ok!(
        processor
            .process(body, headers(body, "orders/create", signature))
            .await
    );
    assert!(event.is_verified());
}

#[tokio::test]
async fn test_rotated_secret_still_verifies() {
    let config = WebhookConfig::builder()
        .webhook_secret(WebhookSecret::new("new-secret").unwrap())
        .old_webhook_secret(WebhookSecret::new(SECRET).unwrap())
        .build()
        .unwrap();
    let processor = WebhookProcessor::new(config, HandlerRegistry::new());
    let body = br#"{"id":6}"#;

    assert_ok!(processor.process(body, signed(body, "products/update")).await);
}

#[tokio::test]
async fn test_header_lookup_is_case_insensitive() {
    let (processor, calls) = processor_with_order_counter();
    let body = br#"{"id":7}"#;
    let headers = WebhookHeaders::from(vec![
        ("x-shopify-topic", "orders/create".to_string()),
        ("x-shopify-hmac-sha256", compute_signature_base64(body, SECRET)),
    ]);

    assert_ok!(processor.process(body, headers).await);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_malformed_payload_is_rejected() {
    let (processor, _) = processor_with_order_counter();
    let body = b"<xml/>";

    let outcome = processor.process(body, signed(body, "orders/create")).await;
    assert_eq!(response_status(&outcome), 500);
    assert!(matches!(
        assert_err!(outcome),
        WebhookError::MalformedPayload { .. }
    ));
}

// ============================================================================
// Endpoint helpers
// ============================================================================

#[test]
fn test_verification_challenge_echo() {
    assert_eq!(challenge_response("hub.challenge=abc123"), "abc123");
    assert_eq!(challenge_response(""), "Shopify webhook endpoint is active");
    assert_eq!(
        challenge_response("hub.challenge=%09"),
        "Shopify webhook endpoint is active"
    );
}

#[tokio::test]
async fn test_health_report_reflects_stats() {
    let (processor, _) = processor_with_order_counter();
    let body = br#"{"id":1}"#;
    assert_ok!(processor.process(body, signed(body, "orders/create")).await);

    let report = HealthReport::from_stats(&processor.stats());
    assert_eq!(report.status, "UP");
    assert_eq!(report.total_received, 1);
    assert_eq!(report.total_processed, 1);
}

// ============================================================================
// Statistics
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_stats_consistent_under_concurrent_load() {
    const SUCCESSES: usize = 40;
    const FAILURES: usize = 25;

    let (processor, calls) = processor_with_order_counter();
    let processor = Arc::new(processor);

    let mut tasks = Vec::new();
    for i in 0..SUCCESSES + FAILURES {
        let processor = Arc::clone(&processor);
        tasks.push(tokio::spawn(async move {
            let body = format!(r#"{{"id":{i}}}"#).into_bytes();
            let signature = if i < SUCCESSES {
                compute_signature_base64(&body, SECRET)
            } else {
                compute_signature_base64(&body, "wrong-secret")
            };
            processor
                .process(&body, headers(&body, "orders/create", signature))
                .await
                .is_ok()
        }));
    }

    let mut succeeded = 0;
    for task in tasks {
        if task.await.unwrap() {
            succeeded += 1;
        }
    }
    assert_eq!(succeeded, SUCCESSES);
    assert_eq!(calls.load(Ordering::SeqCst), SUCCESSES);

    let stats = processor.stats();
    let total = (SUCCESSES + FAILURES) as u64;
    assert_eq!(stats.total_received, total);
    assert_eq!(stats.total_processed, SUCCESSES as u64);
    assert_eq!(stats.total_failed, FAILURES as u64);
    assert_eq!(stats.total_processed + stats.total_failed, total);
    assert_eq!(stats.topic_count(WebhookTopic::OrdersCreate), total);

    let expected = SUCCESSES as f64 / total as f64;
    assert!((stats.success_rate() - expected).abs() < 1e-9);

    processor.reset_stats();
    let stats = processor.stats();
    assert_eq!(stats.total_received, 0);
    assert_eq!(stats.total_processed, 0);
    assert_eq!(stats.total_failed, 0);
    assert!(stats.per_topic.is_empty());
    assert_eq!(stats.success_rate(), 0.0);
}
