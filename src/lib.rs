//! # Shopify Webhooks
//!
//! A Rust engine for receiving Shopify webhooks: signature verification,
//! topic classification, prioritized handler dispatch and pipeline
//! statistics.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`WebhookConfig`] and [`WebhookConfigBuilder`]
//! - A validated, masked [`WebhookSecret`] newtype with key rotation support
//! - HMAC-SHA256 verification of the exact request bytes
//! - Classification of topic strings into [`WebhookTopic`]
//! - Handler plugins via [`WebhookHandler`], isolated from each other
//! - The [`WebhookProcessor`] pipeline with concurrent-safe [`WebhookStats`]
//!
//! ## Quick Start
//!
//! ```rust
//! use shopify_webhooks::{HandlerRegistry, LoggingHandler, WebhookConfig, WebhookProcessor, WebhookSecret};
//!
//! let config = WebhookConfig::builder()
//!     .webhook_secret(WebhookSecret::new("your-webhook-secret").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let registry = HandlerRegistry::builder().fallback(LoggingHandler).build();
//! let processor = WebhookProcessor::new(config, registry);
//! assert_eq!(processor.stats().total_received, 0);
//! ```
//!
//! ## Writing Handlers
//!
//! ```rust
//! use shopify_webhooks::webhooks::BoxFuture;
//! use shopify_webhooks::{HandlerError, WebhookEvent, WebhookHandler};
//!
//! struct InventorySync;
//!
//! impl WebhookHandler for InventorySync {
//!     fn can_handle(&self, event: &WebhookEvent) -> bool {
//!         event.kind().resource() == Some("inventory_levels")
//!     }
//!
//!     fn handle<'a>(&'a self, event: &'a WebhookEvent) -> BoxFuture<'a, Result<(), HandlerError>> {
//!         Box::pin(async move {
//!             let available = event.payload_i64("available");
//!             event.metadata().insert("synced", available.is_some());
//!             Ok(())
//!         })
//!     }
//! }
//! ```
//!
//! ## Logging
//!
//! The crate logs through [`tracing`] with `webhook_id`, `topic`, `shop` and
//! `handler` fields. It never installs a subscriber.
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: All newtypes validate on construction
//! - **Fail closed**: Unverifiable webhooks never reach a handler
//! - **Thread-safe**: All types are `Send + Sync`
//! - **Async-first**: Designed for use with Tokio async runtime

pub mod config;
pub mod error;
pub mod webhooks;

// Re-export public types at crate root for convenience
pub use config::{MissingSecretPolicy, WebhookConfig, WebhookConfigBuilder, WebhookSecret};
pub use error::ConfigError;

// Re-export pipeline types
pub use webhooks::{
    EventMetadata, EventStatus, HandlerError, HandlerRegistry, HandlerRegistryBuilder,
    LoggingHandler, SignatureVerifier, TopicHandler, WebhookError, WebhookEvent, WebhookHandler,
    WebhookHeaders, WebhookProcessor, WebhookStats, WebhookTopic,
};
