//! Handler registry and dispatcher.
//!
//! This module provides [`HandlerRegistry`], an immutable, priority-ordered
//! collection of [`WebhookHandler`]s built once at startup through
//! [`HandlerRegistryBuilder`].
//!
//! # Dispatch Rules
//!
//! For each event the registry:
//!
//! 1. Selects the handlers whose `can_handle` returns `true`
//! 2. Runs them in ascending priority order, ties in registration order
//! 3. Routes a failing `handle` to that handler's `on_error` and keeps going
//! 4. Falls back to the designated fallback handler when nothing else matched
//! 5. Marks the event terminal only after every selected handler has returned
//!
//! # Example
//!
//! ```rust
//! use shopify_webhooks::{HandlerRegistry, LoggingHandler, TopicHandler, WebhookTopic};
//!
//! let registry = HandlerRegistry::builder()
//!     .handler(TopicHandler::new("orders", [WebhookTopic::OrdersCreate], |_| Ok(())))
//!     .fallback(LoggingHandler)
//!     .build();
//!
//! assert_eq!(registry.len(), 1);
//! assert!(registry.has_fallback());
//! ```

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use serde_json::json;

use super::errors::{HandlerError, WebhookError};
use super::event::WebhookEvent;
use super::handler::WebhookHandler;

/// Metadata key under which recovered handler failures are recorded.
pub const HANDLER_FAILURES_KEY: &str = "handler_failures";

/// Immutable collection of webhook handlers.
///
/// # Thread Safety
///
/// `HandlerRegistry` is `Send + Sync` and is shared by all in-flight
/// pipelines without locking.
#[derive(Default)]
pub struct HandlerRegistry {
    /// Regular handlers, stably sorted by priority.
    handlers: Vec<Box<dyn WebhookHandler>>,
    fallback: Option<Box<dyn WebhookHandler>>,
}

// Implement Debug manually since trait objects don't implement Debug
impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.handlers.iter().map(|handler| handler.name()).collect();
        f.debug_struct("HandlerRegistry")
            .field("handlers", &names)
            .field("fallback", &self.fallback.as_ref().map(|handler| handler.name()))
            .finish()
    }
}

// Verify HandlerRegistry is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HandlerRegistry>();
};

impl HandlerRegistry {
    /// Creates a registry with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> HandlerRegistryBuilder {
        HandlerRegistryBuilder::new()
    }

    /// Returns the number of regular handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if no regular handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Returns `true` if a fallback handler is configured.
    #[must_use]
    pub const fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Returns the handlers that will run for `event`, in invocation order.
    ///
    /// The fallback is selected only when no regular handler matches.
    #[must_use]
    pub fn select(&self, event: &WebhookEvent) -> Vec<&dyn WebhookHandler> {
        let selected: Vec<&dyn WebhookHandler> = self
            .handlers
            .iter()
            .map(|handler| handler.as_ref())
            .filter(|handler| handler.can_handle(event))
            .collect();

        if selected.is_empty() {
            self.fallback
                .as_deref()
                .filter(|handler| handler.can_handle(event))
                .into_iter()
                .collect()
        } else {
            selected
        }
    }

    /// Dispatches `event` to the selected handlers.
    ///
    /// Returns the event in its terminal state. A handler failure recovered by
    /// its `on_error` is recorded under [`HANDLER_FAILURES_KEY`] in the event
    /// metadata and the event still ends processed.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::DispatchFailed`] if any handler's `on_error`
    /// failed. The remaining handlers still run first, and the error carries
    /// the event marked as failed.
    pub async fn dispatch(&self, mut event: WebhookEvent) -> Result<WebhookEvent, WebhookError> {
        let selected = self.select(&event);

        if selected.is_empty() {
            tracing::debug!(
                webhook_id = event.id(),
                topic = event.topic(),
                "No handler selected for webhook"
            );
        }

        let mut escalations = Vec::new();
        for handler in selected {
            if let Err(escalation) = run_handler(handler, &event).await {
                escalations.push(format!("{}: {escalation}", handler.name()));
            }
        }

        if escalations.is_empty() {
            event.mark_processed();
            Ok(event)
        } else {
            let message = escalations.join("; ");
            event.mark_failed(message.clone());
            Err(WebhookError::DispatchFailed {
                message,
                event: Box::new(event),
            })
        }
    }
}

/// Runs one handler, routing a failure to its `on_error`.
///
/// A panic in `handle` is treated as a handler failure, a panic in
/// `on_error` as a failed recovery. Returns the error of `on_error` if
/// recovery itself failed.
async fn run_handler(handler: &dyn WebhookHandler, event: &WebhookEvent) -> Result<(), HandlerError> {
    let error = match contain_panic(async { handler.handle(event).await }).await {
        Ok(()) => {
            tracing::debug!(
                handler = handler.name(),
                webhook_id = event.id(),
                topic = event.topic(),
                "Webhook handler succeeded"
            );
            return Ok(());
        }
        Err(error) => error,
    };

    tracing::error!(
        handler = handler.name(),
        webhook_id = event.id(),
        topic = event.topic(),
        error = %error,
        "Error in webhook handler"
    );

    match contain_panic(async { handler.on_error(event, &error).await }).await {
        Ok(()) => {
            event.metadata().push(
                HANDLER_FAILURES_KEY,
                json!({ "handler": handler.name(), "error": error.message() }),
            );
            Ok(())
        }
        Err(escalation) => {
            tracing::error!(
                handler = handler.name(),
                webhook_id = event.id(),
                topic = event.topic(),
                error = %escalation,
                "Webhook handler error callback failed"
            );
            Err(escalation)
        }
    }
}

/// Converts a panic raised while polling `future` into a [`HandlerError`].
async fn contain_panic<F>(future: F) -> Result<(), HandlerError>
where
    F: Future<Output = Result<(), HandlerError>>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| {
            Err(HandlerError::new(format!(
                "handler panicked: {}",
                panic_message(payload.as_ref())
            )))
        })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Builder for [`HandlerRegistry`].
///
/// Handlers are kept in registration order; [`build`](Self::build) sorts them
/// stably by priority.
#[derive(Default)]
pub struct HandlerRegistryBuilder {
    handlers: Vec<Box<dyn WebhookHandler>>,
    fallback: Option<Box<dyn WebhookHandler>>,
}

impl std::fmt::Debug for HandlerRegistryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistryBuilder")
            .field("handlers", &format!("<{} handlers>", self.handlers.len()))
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl HandlerRegistryBuilder {
    /// Creates a new builder with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler.
    #[must_use]
    pub fn handler<H: WebhookHandler + 'static>(mut self, handler: H) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Sets the handler that runs when no regular handler claims an event.
    ///
    /// Replaces any previously set fallback.
    #[must_use]
    pub fn fallback<H: WebhookHandler + 'static>(mut self, handler: H) -> Self {
        self.fallback = Some(Box::new(handler));
        self
    }

    /// Builds the registry.
    #[must_use]
    pub fn build(self) -> HandlerRegistry {
        let mut handlers = self.handlers;
        handlers.sort_by_key(|handler| handler.priority());
        HandlerRegistry {
            handlers,
            fallback: self.fallback,
        }
    }
}
