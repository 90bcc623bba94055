//! The webhook pipeline orchestrator.
//!
//! [`WebhookProcessor`] composes parsing, signature verification,
//! classification and dispatch into one asynchronous flow per request:
//!
//! ```text
//! received ──parse──> parsed ──verify──> verified ──dispatch──> processed | failed
//!                │                │
//!                └─ malformed     └─ rejected
//! ```
//!
//! # Example
//!
//! ```rust
//! use shopify_webhooks::webhooks::compute_signature_base64;
//! use shopify_webhooks::{
//!     HandlerRegistry, LoggingHandler, WebhookConfig, WebhookHeaders, WebhookProcessor,
//!     WebhookSecret, WebhookTopic,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let config = WebhookConfig::builder()
//!     .webhook_secret(WebhookSecret::new("secret").unwrap())
//!     .build()
//!     .unwrap();
//! let registry = HandlerRegistry::builder().fallback(LoggingHandler).build();
//! let processor = WebhookProcessor::new(config, registry);
//!
//! let body = br#"{"id":123,"email":"a@b.com"}"#;
//! let headers = WebhookHeaders::from(vec![
//!     ("X-Shopify-Topic", "orders/create".to_string()),
//!     ("X-Shopify-Hmac-SHA256", compute_signature_base64(body, "secret")),
//! ]);
//!
//! let event = processor.process(body, headers).await.unwrap();
//! assert_eq!(event.kind(), WebhookTopic::OrdersCreate);
//! assert!(event.is_verified());
//! assert!(event.is_processed());
//! # }
//! ```

use crate::config::WebhookConfig;

use super::errors::WebhookError;
use super::event::WebhookEvent;
use super::headers::WebhookHeaders;
use super::registry::HandlerRegistry;
use super::stats::{WebhookStatistics, WebhookStats};
use super::verification::SignatureVerifier;

/// Runs inbound webhooks through parse, verify and dispatch.
///
/// One processor is shared by all requests. Each call to
/// [`process`](Self::process) owns its own [`WebhookEvent`]; the only shared
/// mutable state is the statistics aggregator.
///
/// # Thread Safety
///
/// `WebhookProcessor` is `Send + Sync`; wrap it in an `Arc` to share it
/// between tasks.
#[derive(Debug)]
pub struct WebhookProcessor {
    verifier: SignatureVerifier,
    registry: HandlerRegistry,
    statistics: WebhookStatistics,
}

// Verify WebhookProcessor is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<WebhookProcessor>();
};

impl WebhookProcessor {
    /// Creates a processor with zeroed statistics.
    #[must_use]
    pub fn new(config: WebhookConfig, registry: HandlerRegistry) -> Self {
        Self {
            verifier: SignatureVerifier::new(config),
            registry,
            statistics: WebhookStatistics::new(),
        }
    }

    /// Returns the configuration in use.
    #[must_use]
    pub const fn config(&self) -> &WebhookConfig {
        self.verifier.config()
    }

    /// Returns the handler registry.
    #[must_use]
    pub const fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Processes one inbound webhook.
    ///
    /// # Errors
    ///
    /// - [`WebhookError::MalformedPayload`] if the body is not JSON
    /// - an authentication failure if the signature does not verify; no
    ///   handler runs in that case
    /// - [`WebhookError::DispatchFailed`] if a handler's error callback failed
    pub async fn process(
        &self,
        raw_body: &[u8],
        headers: impl Into<WebhookHeaders>,
    ) -> Result<WebhookEvent, WebhookError> {
        let headers = headers.into();
        let in_flight = InFlight::start(&self.statistics);
        let outcome = async {
            let event = self.parse(raw_body, headers)?;
            let event = self.verify(event)?;
            self.registry.dispatch(event).await
        }
        .await;
        Self::finish(in_flight, outcome)
    }

    /// Processes one inbound webhook without verifying its signature.
    ///
    /// Intended for tests and trusted integrations. The returned event reports
    /// `is_verified() == false`.
    ///
    /// # Errors
    ///
    /// Same as [`process`](Self::process), minus authentication failures.
    pub async fn process_unverified(
        &self,
        raw_body: &[u8],
        headers: impl Into<WebhookHeaders>,
    ) -> Result<WebhookEvent, WebhookError> {
        let headers = headers.into();
        let in_flight = InFlight::start(&self.statistics);
        let outcome = async {
            let event = self.parse(raw_body, headers)?;
            tracing::warn!(
                webhook_id = event.id(),
                topic = event.topic(),
                "Processing webhook without signature verification"
            );
            self.registry.dispatch(event).await
        }
        .await;
        Self::finish(in_flight, outcome)
    }

    /// Checks `signature` against `raw_body` with this processor's secrets.
    #[must_use]
    pub fn verify_signature(&self, raw_body: &[u8], signature: &str) -> bool {
        self.verifier.is_valid(raw_body, Some(signature))
    }

    /// Returns a snapshot of the pipeline statistics.
    #[must_use]
    pub fn stats(&self) -> WebhookStats {
        self.statistics.snapshot()
    }

    /// Zeroes the pipeline statistics.
    pub fn reset_stats(&self) {
        self.statistics.reset();
    }

    fn parse(&self, raw_body: &[u8], headers: WebhookHeaders) -> Result<WebhookEvent, WebhookError> {
        let event = WebhookEvent::parse(raw_body, headers).map_err(|error| {
            tracing::warn!(error = %error, "Rejected malformed webhook payload");
            error
        })?;
        self.statistics.record_topic(event.kind());
        tracing::debug!(
            webhook_id = event.id(),
            topic = event.topic(),
            shop = event.shop().unwrap_or_default(),
            "Parsed webhook"
        );
        Ok(event)
    }

    fn verify(&self, mut event: WebhookEvent) -> Result<WebhookEvent, WebhookError> {
        if let Err(error) = self
            .verifier
            .verify(event.raw_body(), event.hmac_signature())
        {
            tracing::warn!(
                webhook_id = event.id(),
                topic = event.topic(),
                shop = event.shop().unwrap_or_default(),
                error = %error,
                "Webhook signature verification failed"
            );
            return Err(error);
        }
        event.mark_verified();
        tracing::debug!(webhook_id = event.id(), "Webhook signature verified");
        Ok(event)
    }

    fn finish(
        in_flight: InFlight<'_>,
        outcome: Result<WebhookEvent, WebhookError>,
    ) -> Result<WebhookEvent, WebhookError> {
        match &outcome {
            Ok(event) => {
                in_flight.settle(true);
                tracing::debug!(
                    webhook_id = event.id(),
                    topic = event.topic(),
                    "Webhook processed"
                );
            }
            Err(error) => {
                in_flight.settle(false);
                tracing::error!(error = %error, "Webhook processing failed");
            }
        }
        outcome
    }
}

/// A received webhook whose outcome is not yet counted.
///
/// Dropped unsettled when the `process` future is cancelled, which counts the
/// webhook as failed.
struct InFlight<'a> {
    statistics: &'a WebhookStatistics,
    settled: bool,
}

impl<'a> InFlight<'a> {
    fn start(statistics: &'a WebhookStatistics) -> Self {
        statistics.record_received();
        Self {
            statistics,
            settled: false,
        }
    }

    fn settle(mut self, processed: bool) {
        if processed {
            self.statistics.record_processed();
        } else {
            self.statistics.record_failed();
        }
        self.settled = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.statistics.record_failed();
            tracing::warn!("Webhook processing cancelled before completion");
        }
    }
}
