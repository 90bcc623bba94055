//! Inbound webhook header names and a case-insensitive header snapshot.

use std::collections::HashMap;

/// HTTP header name for the HMAC-SHA256 signature.
///
/// Shopify includes this header in all webhook requests. The value is a
/// base64-encoded HMAC-SHA256 signature of the request body.
pub const HEADER_HMAC: &str = "X-Shopify-Hmac-SHA256";

/// HTTP header name for the webhook topic (e.g. "orders/create").
pub const HEADER_TOPIC: &str = "X-Shopify-Topic";

/// HTTP header name for the shop domain (e.g. "example.myshopify.com").
pub const HEADER_SHOP_DOMAIN: &str = "X-Shopify-Shop-Domain";

/// HTTP header name for the API version used for the payload format.
pub const HEADER_API_VERSION: &str = "X-Shopify-API-Version";

/// HTTP header name for the unique webhook delivery id.
pub const HEADER_WEBHOOK_ID: &str = "X-Shopify-Webhook-Id";

/// HTTP header name for the request id used for tracing.
pub const HEADER_REQUEST_ID: &str = "X-Request-Id";

/// Read-only snapshot of the headers of an inbound webhook request.
///
/// Original header names are preserved for inspection, lookups ignore ASCII
/// case. When the same name appears twice the last value wins.
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::WebhookHeaders;
///
/// let headers = WebhookHeaders::from(vec![
///     ("x-shopify-topic", "orders/create"),
///     ("X-Shopify-Shop-Domain", "example.myshopify.com"),
/// ]);
///
/// assert_eq!(headers.get("X-Shopify-Topic"), Some("orders/create"));
/// assert_eq!(headers.get("x-shopify-shop-domain"), Some("example.myshopify.com"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WebhookHeaders {
    /// Lowercased name -> (original name, value).
    entries: HashMap<String, (String, String)>,
}

impl WebhookHeaders {
    /// Creates an empty header snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of the header, ignoring ASCII case of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(|(_, value)| value.as_str())
    }

    /// Returns `true` if the header is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    /// Returns the number of distinct headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(original name, value)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    fn insert(&mut self, name: String, value: String) {
        self.entries.insert(name.to_ascii_lowercase(), (name, value));
    }
}

impl<K, V> FromIterator<(K, V)> for WebhookHeaders
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name.into(), value.into());
        }
        headers
    }
}

impl From<HashMap<String, String>> for WebhookHeaders {
    fn from(map: HashMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

impl<K, V> From<Vec<(K, V)>> for WebhookHeaders
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().collect()
    }
}
