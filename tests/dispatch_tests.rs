//! Integration tests for handler selection, ordering and isolation.

use std::sync::{Arc, Mutex};

use serde_json::json;
use shopify_webhooks::webhooks::{BoxFuture, HANDLER_FAILURES_KEY, HEADER_TOPIC};
use shopify_webhooks::{
    EventStatus, HandlerError, HandlerRegistry, LoggingHandler, TopicHandler, WebhookConfig,
    WebhookError, WebhookEvent, WebhookHandler, WebhookHeaders, WebhookProcessor, WebhookTopic,
};
use tokio_test::{assert_err, assert_ok};

type CallLog = Arc<Mutex<Vec<String>>>;

/// Handler that records its invocations and optionally fails.
struct Tracked {
    name: String,
    priority: i32,
    topics: Vec<WebhookTopic>,
    fail: bool,
    escalate: bool,
    panic: bool,
    log: CallLog,
}

impl Tracked {
    fn new(name: &str, priority: i32, log: &CallLog) -> Self {
        Self {
            name: name.to_string(),
            priority,
            topics: vec![WebhookTopic::OrdersCreate],
            fail: false,
            escalate: false,
            panic: false,
            log: Arc::clone(log),
        }
    }

    fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    fn panicking(mut self) -> Self {
        self.panic = true;
        self
    }

    fn escalating(mut self) -> Self {
        self.fail = true;
        self.escalate = true;
        self
    }
}

impl WebhookHandler for Tracked {
    fn name(&self) -> &str {
        &self.name
    }

    fn can_handle(&self, event: &WebhookEvent) -> bool {
        self.topics.contains(&event.kind())
    }

    fn handle<'a>(&'a self, event: &'a WebhookEvent) -> BoxFuture<'a, Result<(), HandlerError>> {
        Box::pin(async move {
            self.log.lock().unwrap().push(format!("handle:{}", self.name));
            // Yield so ordering holds across suspension points
            tokio::task::yield_now().await;
            assert!(!self.panic, "{} hit a bug", self.name);
            event.metadata().insert(format!("seen_by_{}", self.name), true);
            if self.fail {
                Err(HandlerError::new(format!("{} failed", self.name)))
            } else {
                Ok(())
            }
        })
    }

    fn on_error<'a>(
        &'a self,
        _event: &'a WebhookEvent,
        error: &'a HandlerError,
    ) -> BoxFuture<'a, Result<(), HandlerError>> {
        Box::pin(async move {
            self.log.lock().unwrap().push(format!("on_error:{}", self.name));
            if self.escalate {
                Err(HandlerError::new(format!("could not recover: {error}")))
            } else {
                Ok(())
            }
        })
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn supported_topics(&self) -> Vec<WebhookTopic> {
        self.topics.clone()
    }
}

fn unsigned(topic: &str) -> WebhookHeaders {
    WebhookHeaders::from(vec![(HEADER_TOPIC, topic)])
}

fn processor(registry: HandlerRegistry) -> WebhookProcessor {
    WebhookProcessor::new(WebhookConfig::default(), registry)
}

fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

#[tokio::test]
async fn test_priority_order_with_registration_tiebreak() {
    let log = CallLog::default();
    let registry = HandlerRegistry::builder()
        .handler(Tracked::new("h2", 5, &log))
        .handler(Tracked::new("h3", 5, &log))
        .handler(Tracked::new("h1", 1, &log))
        .build();

    let event = assert_ok!(
        processor(registry)
            .process_unverified(br#"{"id":1}"#, unsigned("orders/create"))
            .await
    );

    assert_eq!(calls(&log), vec!["handle:h1", "handle:h2", "handle:h3"]);
    assert_eq!(event.metadata().len(), 3);
}

#[tokio::test]
async fn test_failure_is_isolated_and_annotated() {
    let log = CallLog::default();
    let registry = HandlerRegistry::builder()
        .handler(Tracked::new("first", 1, &log))
        .handler(Tracked::new("broken", 2, &log).failing())
        .handler(Tracked::new("last", 3, &log))
        .build();

    let event = assert_ok!(
        processor(registry)
            .process_unverified(br#"{"id":1}"#, unsigned("orders/create"))
            .await
    );

    assert_eq!(
        calls(&log),
        vec![
            "handle:first",
            "handle:broken",
            "on_error:broken",
            "handle:last"
        ]
    );
    assert_eq!(event.status(), EventStatus::Processed);
    assert_eq!(
        event.metadata().get(HANDLER_FAILURES_KEY),
        Some(json!([{ "handler": "broken", "error": "broken failed" }]))
    );
}

#[tokio::test]
async fn test_panicking_handler_is_contained() {
    let log = CallLog::default();
    let registry = HandlerRegistry::builder()
        .handler(Tracked::new("panicky", 1, &log).panicking())
        .handler(Tracked::new("after", 5, &log))
        .build();
    let processor = Arc::new(processor(registry));

    let task = {
        let processor = Arc::clone(&processor);
        tokio::spawn(async move {
            processor
                .process_unverified(br#"{"id":1}"#, unsigned("orders/create"))
                .await
        })
    };
    let event = assert_ok!(assert_ok!(task.await));

    assert_eq!(
        calls(&log),
        vec!["handle:panicky", "on_error:panicky", "handle:after"]
    );
    assert_eq!(event.status(), EventStatus::Processed);
    assert_eq!(event.metadata().get("seen_by_after"), Some(json!(true)));

    let failures = event.metadata().get(HANDLER_FAILURES_KEY).unwrap();
    assert_eq!(failures[0]["handler"], "panicky");
    assert_eq!(failures[0]["error"], "handler panicked: panicky hit a bug");

    let stats = processor.stats();
    assert_eq!(stats.total_received, 1);
    assert_eq!(stats.total_processed, 1);
    assert_eq!(stats.total_failed, 0);
}

#[tokio::test]
async fn test_escalation_fails_dispatch_after_all_handlers() {
    let log = CallLog::default();
    let registry = HandlerRegistry::builder()
        .handler(Tracked::new("fragile", 1, &log).escalating())
        .handler(Tracked::new("steady", 2, &log))
        .build();
    let processor = processor(registry);

    let error = assert_err!(
        processor
            .process_unverified(br#"{"id":1}"#, unsigned("orders/create"))
            .await
    );

    assert_eq!(
        calls(&log),
        vec!["handle:fragile", "on_error:fragile", "handle:steady"]
    );
    assert!(matches!(error, WebhookError::DispatchFailed { .. }));
    assert!(!error.is_authentication_failure());

    let event = error.event().unwrap();
    assert_eq!(event.status(), EventStatus::Failed);
    assert!(event.error().unwrap().contains("could not recover: fragile failed"));
    assert_eq!(processor.stats().total_failed, 1);
}

#[tokio::test]
async fn test_no_interested_handler_still_processes() {
    let log = CallLog::default();
    let registry = HandlerRegistry::builder()
        .handler(Tracked::new("orders", 1, &log))
        .build();

    let event = assert_ok!(
        processor(registry)
            .process_unverified(br#"{"id":1}"#, unsigned("products/create"))
            .await
    );

    assert!(calls(&log).is_empty());
    assert_eq!(event.status(), EventStatus::Processed);
}

#[tokio::test]
async fn test_fallback_only_for_unclaimed_events() {
    let log = CallLog::default();
    let unclassified_calls = Arc::new(Mutex::new(0_u32));
    let counter = Arc::clone(&unclassified_calls);

    let registry = HandlerRegistry::builder()
        .handler(Tracked::new("orders", 1, &log))
        .handler(TopicHandler::new(
            "catch-all",
            [WebhookTopic::Unclassified],
            move |_| {
                *counter.lock().unwrap() += 1;
                Ok(())
            },
        ))
        .fallback(LoggingHandler)
        .build();
    let processor = processor(registry);

    assert_ok!(
        processor
            .process_unverified(br#"{"id":1}"#, unsigned("orders/create"))
            .await
    );
    assert_ok!(
        processor
            .process_unverified(br#"{"id":1}"#, unsigned("widgets/frobnicate"))
            .await
    );
    assert_ok!(
        processor
            .process_unverified(br#"{"id":1}"#, unsigned("themes/publish"))
            .await
    );

    assert_eq!(calls(&log), vec!["handle:orders"]);
    assert_eq!(*unclassified_calls.lock().unwrap(), 1);
    assert_eq!(processor.stats().total_processed, 3);
}

#[tokio::test]
async fn test_unverified_entry_point_does_not_mark_verified() {
    let registry = HandlerRegistry::builder().fallback(LoggingHandler).build();
    let processor = processor(registry);

    let event = assert_ok!(
        processor
            .process_unverified(b"", unsigned("app/uninstalled"))
            .await
    );
    assert!(!event.is_verified());
    assert!(event.payload().is_null());

    // The production entry point rejects the same request
    let error = assert_err!(processor.process(b"", unsigned("app/uninstalled")).await);
    assert!(matches!(error, WebhookError::SecretNotConfigured));
}
