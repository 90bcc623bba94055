//! Webhook ingestion and dispatch.
//!
//! This module receives Shopify webhook deliveries, authenticates them,
//! classifies them and fans them out to application handlers.
//!
//! # Overview
//!
//! The webhook system consists of:
//!
//! - [`WebhookEvent`]: One inbound delivery with its envelope, payload and lifecycle
//! - [`SignatureVerifier`]: HMAC-SHA256 verification of the raw body
//! - [`WebhookTopic`]: Closed classification of topic strings
//! - [`WebhookHandler`]: The plugin contract for business logic
//! - [`HandlerRegistry`]: Priority-ordered, immutable handler collection and dispatcher
//! - [`WebhookProcessor`]: The pipeline tying the above together, with statistics
//! - [`WebhookError`]: Error types for the pipeline
//!
//! # Pipeline
//!
//! 1. **Parse**: the raw body is parsed as JSON and the envelope read from headers
//! 2. **Verify**: the signature is checked against the exact bytes received
//! 3. **Dispatch**: interested handlers run in priority order, isolated from each other
//! 4. **Aggregate**: counters are updated for every outcome
//!
//! # Example
//!
//! ```rust
//! use shopify_webhooks::webhooks::compute_signature_base64;
//! use shopify_webhooks::{
//!     HandlerRegistry, LoggingHandler, TopicHandler, WebhookConfig, WebhookHeaders,
//!     WebhookProcessor, WebhookSecret, WebhookTopic,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let config = WebhookConfig::builder()
//!     .webhook_secret(WebhookSecret::new("my-secret").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let registry = HandlerRegistry::builder()
//!     .handler(TopicHandler::new("orders", [WebhookTopic::OrdersCreate], |event| {
//!         println!("new order {:?}", event.entity_id());
//!         Ok(())
//!     }))
//!     .fallback(LoggingHandler)
//!     .build();
//!
//! let processor = WebhookProcessor::new(config, registry);
//!
//! let body = br#"{"id":123}"#;
//! let headers = WebhookHeaders::from(vec![
//!     ("X-Shopify-Topic", "orders/create".to_string()),
//!     ("X-Shopify-Hmac-SHA256", compute_signature_base64(body, "my-secret")),
//! ]);
//! let event = processor.process(body, headers).await.unwrap();
//! assert!(event.is_processed());
//! # }
//! ```
//!
//! # Error Handling
//!
//! ```rust
//! use shopify_webhooks::webhooks::response_status;
//! use shopify_webhooks::{WebhookError, WebhookEvent};
//!
//! fn respond(outcome: Result<WebhookEvent, WebhookError>) -> u16 {
//!     match &outcome {
//!         Err(error) if error.is_authentication_failure() => {
//!             println!("Rejected unauthenticated webhook: {error}");
//!         }
//!         Err(WebhookError::MalformedPayload { message }) => {
//!             println!("Malformed payload: {message}");
//!         }
//!         Err(WebhookError::DispatchFailed { message, .. }) => {
//!             println!("Handler failure escalated: {message}");
//!         }
//!         _ => {}
//!     }
//!     response_status(&outcome)
//! }
//! ```
//!
//! # Thread Safety
//!
//! All types in this module are `Send + Sync`, making them safe to share
//! across async tasks.

mod endpoint;
mod errors;
mod event;
mod handler;
mod headers;
mod processor;
mod registry;
mod stats;
mod topic;
mod verification;

pub use endpoint::{
    challenge_response, response_status, HealthReport, CHALLENGE_PARAM, ENDPOINT_ACTIVE_MESSAGE,
    SERVICE_NAME,
};
pub use errors::{HandlerError, WebhookError};
pub use event::{EventMetadata, EventStatus, WebhookEvent};
pub use handler::{BoxFuture, LoggingHandler, TopicHandler, WebhookHandler, DEFAULT_PRIORITY};
pub use headers::{
    WebhookHeaders, HEADER_API_VERSION, HEADER_HMAC, HEADER_REQUEST_ID, HEADER_SHOP_DOMAIN,
    HEADER_TOPIC, HEADER_WEBHOOK_ID,
};
pub use processor::WebhookProcessor;
pub use registry::{HandlerRegistry, HandlerRegistryBuilder, HANDLER_FAILURES_KEY};
pub use stats::{WebhookStatistics, WebhookStats};
pub use topic::WebhookTopic;
pub use verification::{
    compute_signature_base64, compute_signature_hex, constant_time_compare, verify_hmac,
    SignatureVerifier,
};
