//! The webhook event record carried through the pipeline.
//!
//! A [`WebhookEvent`] is created by [`WebhookEvent::parse`] from the exact
//! bytes and headers of one inbound request. It is owned by that request's
//! pipeline invocation and is never shared with another request.
//!
//! # Lifecycle
//!
//! ```text
//! parse ──> verified ──> dispatch ──> Processed | Failed
//! ```
//!
//! Terminal fields (`processed`, `processed_at`, `error`) are written exactly
//! once, after every selected handler has returned. Handlers only ever see a
//! shared reference and can annotate the event through [`EventMetadata`].

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::errors::WebhookError;
use super::headers::{
    WebhookHeaders, HEADER_API_VERSION, HEADER_HMAC, HEADER_REQUEST_ID, HEADER_SHOP_DOMAIN,
    HEADER_TOPIC, HEADER_WEBHOOK_ID,
};
use super::topic::WebhookTopic;

/// Entities whose nested `id` identifies the resource of a payload.
const NESTED_ENTITIES: [&str; 6] = ["order", "product", "customer", "collection", "cart", "checkout"];

/// Processing state of a [`WebhookEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventStatus {
    /// Not yet dispatched.
    Pending,
    /// All selected handlers ran (recovered handler failures included).
    Processed,
    /// Dispatch failed because a handler's error callback failed.
    Failed,
}

/// Open key/value bag for handler-to-handler and handler-to-caller annotations.
///
/// Writable through a shared reference so handlers can annotate the event
/// while the dispatcher holds it. Values are never interpreted by the engine.
#[derive(Debug, Default)]
pub struct EventMetadata {
    entries: Mutex<HashMap<String, Value>>,
}

impl EventMetadata {
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets a metadata value, returning the previous one.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.lock().insert(key.into(), value.into())
    }

    /// Returns a copy of the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if no annotations were made.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns a copy of every entry.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.lock().clone()
    }

    /// Appends `value` to the JSON array stored under `key`, creating it if needed.
    pub(crate) fn push(&self, key: &str, value: Value) {
        let mut entries = self.lock();
        let slot = entries
            .entry(key.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        match slot {
            Value::Array(items) => items.push(value),
            other => {
                let previous = other.take();
                *other = Value::Array(vec![previous, value]);
            }
        }
    }
}

/// A webhook received from Shopify.
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::{EventStatus, WebhookEvent, WebhookHeaders, WebhookTopic};
///
/// let headers = WebhookHeaders::from(vec![
///     ("X-Shopify-Topic", "orders/create"),
///     ("X-Shopify-Shop-Domain", "example.myshopify.com"),
///     ("X-Shopify-Webhook-Id", "wh-1"),
/// ]);
/// let event = WebhookEvent::parse(br#"{"id":123,"email":"a@b.com"}"#, headers).unwrap();
///
/// assert_eq!(event.id(), "wh-1");
/// assert_eq!(event.kind(), WebhookTopic::OrdersCreate);
/// assert_eq!(event.payload_i64("id"), Some(123));
/// assert!(!event.is_verified());
/// assert_eq!(event.status(), EventStatus::Pending);
/// ```
#[derive(Debug)]
pub struct WebhookEvent {
    id: String,
    topic: String,
    kind: WebhookTopic,
    shop: Option<String>,
    api_version: Option<String>,
    headers: WebhookHeaders,
    raw_body: Vec<u8>,
    payload: Value,
    hmac_signature: Option<String>,
    verified: bool,
    received_at: DateTime<Utc>,
    processed: bool,
    processed_at: Option<DateTime<Utc>>,
    error: Option<String>,
    metadata: EventMetadata,
}

impl WebhookEvent {
    /// Builds an event from the raw request body and headers.
    ///
    /// The body is stored byte-for-byte; the parsed payload is kept alongside
    /// it. An empty or whitespace-only body parses to [`Value::Null`]. The
    /// id comes from `X-Shopify-Webhook-Id` or is generated when absent.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::MalformedPayload`] if a non-empty body is not
    /// valid JSON.
    pub fn parse(raw_body: &[u8], headers: impl Into<WebhookHeaders>) -> Result<Self, WebhookError> {
        let headers = headers.into();

        let payload = if raw_body.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(raw_body).map_err(|e| WebhookError::MalformedPayload {
                message: e.to_string(),
            })?
        };

        let topic = headers.get(HEADER_TOPIC).unwrap_or_default().to_string();
        let owned = |name: &str| headers.get(name).map(String::from);
        let id = owned(HEADER_WEBHOOK_ID)
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let shop = owned(HEADER_SHOP_DOMAIN);
        let api_version = owned(HEADER_API_VERSION);
        let hmac_signature = owned(HEADER_HMAC);

        Ok(Self {
            id,
            kind: WebhookTopic::classify(&topic),
            topic,
            shop,
            api_version,
            hmac_signature,
            raw_body: raw_body.to_vec(),
            payload,
            headers,
            verified: false,
            received_at: Utc::now(),
            processed: false,
            processed_at: None,
            error: None,
            metadata: EventMetadata::default(),
        })
    }

    /// Returns the delivery id (from `X-Shopify-Webhook-Id` or generated).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the raw topic string as received (empty if the header was absent).
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Returns the classified topic.
    #[must_use]
    pub const fn kind(&self) -> WebhookTopic {
        self.kind
    }

    /// Returns the shop domain that sent the webhook.
    #[must_use]
    pub fn shop(&self) -> Option<&str> {
        self.shop.as_deref()
    }

    /// Returns the API version of the payload format.
    #[must_use]
    pub fn api_version(&self) -> Option<&str> {
        self.api_version.as_deref()
    }

    /// Returns the snapshot of all inbound headers.
    #[must_use]
    pub const fn headers(&self) -> &WebhookHeaders {
        &self.headers
    }

    /// Returns a header value, ignoring the case of `name`.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Returns the `X-Request-Id` header value.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.header(HEADER_REQUEST_ID)
    }

    /// Returns the request body exactly as received.
    #[must_use]
    pub fn raw_body(&self) -> &[u8] {
        &self.raw_body
    }

    /// Returns the parsed payload ([`Value::Null`] for an empty body).
    #[must_use]
    pub const fn payload(&self) -> &Value {
        &self.payload
    }

    /// Returns the signature presented in `X-Shopify-Hmac-SHA256`.
    #[must_use]
    pub fn hmac_signature(&self) -> Option<&str> {
        self.hmac_signature.as_deref()
    }

    /// Returns whether the signature has been verified.
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        self.verified
    }

    /// Returns when the webhook was parsed.
    #[must_use]
    pub const fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    /// Returns `true` once dispatch completed successfully.
    #[must_use]
    pub const fn is_processed(&self) -> bool {
        self.processed
    }

    /// Returns when the event reached its terminal state.
    #[must_use]
    pub const fn processed_at(&self) -> Option<DateTime<Utc>> {
        self.processed_at
    }

    /// Returns the dispatch failure message, if dispatch failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns the annotation bag.
    #[must_use]
    pub const fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    /// Returns the processing state.
    #[must_use]
    pub const fn status(&self) -> EventStatus {
        if self.processed {
            EventStatus::Processed
        } else if self.error.is_some() {
            EventStatus::Failed
        } else {
            EventStatus::Pending
        }
    }

    /// Returns `true` once the event is processed or failed.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self.status(), EventStatus::Pending)
    }

    /// Looks up a payload field by dot-separated path (e.g. `"order.id"`).
    #[must_use]
    pub fn payload_field(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return None;
        }
        path.split('.')
            .try_fold(&self.payload, |current, part| current.get(part))
    }

    /// Returns a payload field rendered as text.
    ///
    /// Strings are returned as-is, numbers and booleans are formatted; null,
    /// arrays and objects yield `None`.
    #[must_use]
    pub fn payload_str(&self, path: &str) -> Option<String> {
        match self.payload_field(path)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Returns a numeric payload field as `i64`.
    #[must_use]
    pub fn payload_i64(&self, path: &str) -> Option<i64> {
        self.payload_field(path)?.as_i64()
    }

    /// Returns the id of the resource the payload describes.
    ///
    /// Looks at the top-level `id` first, then `order.id`, `product.id`,
    /// `customer.id`, `collection.id`, `cart.id` and `checkout.id`.
    #[must_use]
    pub fn entity_id(&self) -> Option<i64> {
        if let Some(id) = self.payload_field("id") {
            return id.as_i64();
        }
        NESTED_ENTITIES
            .iter()
            .find_map(|entity| self.payload_field(&format!("{entity}.id")))
            .and_then(Value::as_i64)
    }

    pub(crate) fn mark_verified(&mut self) {
        if !self.is_terminal() {
            self.verified = true;
        }
    }

    /// Moves the event to [`EventStatus::Processed`]. No-op once terminal.
    pub(crate) fn mark_processed(&mut self) {
        if self.is_terminal() {
            return;
        }
        self.processed = true;
        self.processed_at = Some(Utc::now());
    }

    /// Moves the event to [`EventStatus::Failed`]. No-op once terminal.
    pub(crate) fn mark_failed(&mut self, error: impl Into<String>) {
        if self.is_terminal() {
            return;
        }
        self.error = Some(error.into());
        self.processed_at = Some(Utc::now());
    }
}
