//! The handler plugin contract and the handlers shipped with the crate.
//!
//! Applications implement [`WebhookHandler`] for their business logic and
//! register implementations with a
//! [`HandlerRegistryBuilder`](super::HandlerRegistryBuilder).
//!
//! # Example
//!
//! ```rust
//! use shopify_webhooks::webhooks::BoxFuture;
//! use shopify_webhooks::{HandlerError, WebhookEvent, WebhookHandler, WebhookTopic};
//!
//! struct OrderSync;
//!
//! impl WebhookHandler for OrderSync {
//!     fn can_handle(&self, event: &WebhookEvent) -> bool {
//!         event.kind().is_order_event()
//!     }
//!
//!     fn handle<'a>(&'a self, event: &'a WebhookEvent) -> BoxFuture<'a, Result<(), HandlerError>> {
//!         Box::pin(async move {
//!             let _order_id = event.entity_id();
//!             Ok(())
//!         })
//!     }
//!
//!     fn priority(&self) -> i32 {
//!         10
//!     }
//! }
//! ```

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;

use super::errors::HandlerError;
use super::event::WebhookEvent;
use super::topic::WebhookTopic;

/// A boxed, `Send` future, as returned by [`WebhookHandler`] methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Priority used when a handler does not override [`WebhookHandler::priority`].
pub const DEFAULT_PRIORITY: i32 = 0;

/// A pluggable unit of webhook business logic.
///
/// Handlers are invoked in ascending [`priority`](Self::priority) order.
/// A failing [`handle`](Self::handle) is routed to the same handler's
/// [`on_error`](Self::on_error) and does not stop the other handlers.
pub trait WebhookHandler: Send + Sync {
    /// Name used in logs and failure annotations.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Returns `true` if this handler wants to process `event`.
    fn can_handle(&self, event: &WebhookEvent) -> bool;

    /// Processes the event.
    fn handle<'a>(&'a self, event: &'a WebhookEvent) -> BoxFuture<'a, Result<(), HandlerError>>;

    /// Recovers from a failure of [`handle`](Self::handle).
    ///
    /// Returning an error escalates to a dispatch failure for the whole
    /// event. The default logs the error and recovers.
    fn on_error<'a>(
        &'a self,
        event: &'a WebhookEvent,
        error: &'a HandlerError,
    ) -> BoxFuture<'a, Result<(), HandlerError>> {
        Box::pin(async move {
            tracing::error!(
                handler = self.name(),
                webhook_id = event.id(),
                topic = event.topic(),
                shop = event.shop().unwrap_or_default(),
                error = %error,
                "Webhook handler failed"
            );
            Ok(())
        })
    }

    /// Lower values run first.
    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    /// Topics this handler documents itself as supporting.
    fn supported_topics(&self) -> Vec<WebhookTopic> {
        Vec::new()
    }
}

/// Observability fallback that logs every event it receives.
///
/// Has the lowest-precedence priority (`i32::MAX`). Register it with
/// [`HandlerRegistryBuilder::fallback`](super::HandlerRegistryBuilder::fallback)
/// so it only runs for events no other handler claims.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingHandler;

impl LoggingHandler {
    fn log_details(event: &WebhookEvent) {
        let kind = event.kind();
        if kind.is_order_event() {
            tracing::debug!(
                order_id = ?event.payload_i64("id"),
                order_number = ?event.payload_str("order_number"),
                financial_status = ?event.payload_str("financial_status"),
                fulfillment_status = ?event.payload_str("fulfillment_status"),
                "Order event"
            );
        } else if kind.is_product_event() {
            tracing::debug!(
                product_id = ?event.payload_i64("id"),
                title = ?event.payload_str("title"),
                vendor = ?event.payload_str("vendor"),
                product_type = ?event.payload_str("product_type"),
                "Product event"
            );
        } else if kind.is_customer_event() {
            tracing::debug!(
                customer_id = ?event.payload_i64("id"),
                email = ?event.payload_str("email"),
                "Customer event"
            );
        } else if kind == WebhookTopic::AppUninstalled {
            tracing::info!(domain = ?event.payload_str("domain"), "App uninstalled");
        } else {
            tracing::debug!(topic = %kind, "Received event");
        }
    }
}

impl WebhookHandler for LoggingHandler {
    fn name(&self) -> &str {
        "LoggingHandler"
    }

    fn can_handle(&self, _event: &WebhookEvent) -> bool {
        true
    }

    fn handle<'a>(&'a self, event: &'a WebhookEvent) -> BoxFuture<'a, Result<(), HandlerError>> {
        Box::pin(async move {
            tracing::info!(
                webhook_id = event.id(),
                topic = event.topic(),
                shop = event.shop().unwrap_or_default(),
                "Received webhook"
            );
            tracing::debug!(
                headers = ?event.headers(),
                payload = %String::from_utf8_lossy(event.raw_body()),
                "Webhook contents"
            );
            Self::log_details(event);
            Ok(())
        })
    }

    fn priority(&self) -> i32 {
        i32::MAX
    }
}

type Callback = dyn Fn(&WebhookEvent) -> Result<(), HandlerError> + Send + Sync;

/// A handler backed by a closure and bound to a fixed set of topics.
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::{TopicHandler, WebhookTopic};
///
/// let handler = TopicHandler::new("order-created", [WebhookTopic::OrdersCreate], |event| {
///     println!("order {:?} created", event.entity_id());
///     Ok(())
/// })
/// .with_priority(5);
/// ```
pub struct TopicHandler {
    name: String,
    topics: HashSet<WebhookTopic>,
    priority: i32,
    callback: Box<Callback>,
}

impl TopicHandler {
    /// Creates a handler that runs `callback` for events of `topics`.
    pub fn new<F>(
        name: impl Into<String>,
        topics: impl IntoIterator<Item = WebhookTopic>,
        callback: F,
    ) -> Self
    where
        F: Fn(&WebhookEvent) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            topics: topics.into_iter().collect(),
            priority: DEFAULT_PRIORITY,
            callback: Box::new(callback),
        }
    }

    /// Sets the priority of this handler.
    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

// Implement Debug manually since closures don't implement Debug
impl std::fmt::Debug for TopicHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopicHandler")
            .field("name", &self.name)
            .field("topics", &self.topics)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

impl WebhookHandler for TopicHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn can_handle(&self, event: &WebhookEvent) -> bool {
        self.topics.contains(&event.kind())
    }

    fn handle<'a>(&'a self, event: &'a WebhookEvent) -> BoxFuture<'a, Result<(), HandlerError>> {
        Box::pin(async move { (self.callback)(event) })
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn supported_topics(&self) -> Vec<WebhookTopic> {
        let mut topics: Vec<WebhookTopic> = self.topics.iter().copied().collect();
        topics.sort();
        topics
    }
}
