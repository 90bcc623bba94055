//! Webhook-specific error types.
//!
//! # Error Handling
//!
//! The pipeline distinguishes the failure classes operators alert on:
//!
//! - [`WebhookError::MalformedPayload`]: the body is not valid JSON; no event exists
//! - [`WebhookError::MissingHmac`], [`WebhookError::InvalidHmac`] and
//!   [`WebhookError::SecretNotConfigured`]: authentication failures; no handler ran
//! - [`WebhookError::DispatchFailed`]: a handler's error callback itself failed
//!
//! Handlers report their own failures with [`HandlerError`]. A handler
//! failure is recovered by that handler's `on_error` and never surfaces as a
//! [`WebhookError`] on its own.
//!
//! # Example
//!
//! ```rust
//! use shopify_webhooks::WebhookError;
//!
//! let error = WebhookError::InvalidHmac;
//! assert!(error.is_authentication_failure());
//! assert_eq!(error.to_string(), "Webhook signature verification failed");
//! ```

use thiserror::Error;

use super::event::WebhookEvent;

/// Error type for the webhook pipeline.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The request body could not be parsed as JSON.
    ///
    /// Raised before an event exists; nothing was dispatched.
    #[error("Failed to parse webhook payload: {message}")]
    MalformedPayload {
        /// The parser error message.
        message: String,
    },

    /// The request carried no HMAC signature header.
    #[error("Webhook signature header is missing")]
    MissingHmac,

    /// Webhook signature verification failed.
    ///
    /// The error message is intentionally generic to avoid leaking security details.
    #[error("Webhook signature verification failed")]
    InvalidHmac,

    /// No webhook secret is configured and the configuration rejects
    /// unsigned webhooks.
    #[error("Webhook signature cannot be verified: no secret is configured")]
    SecretNotConfigured,

    /// A handler failed and its error callback failed as well.
    ///
    /// All selected handlers were attempted before this was raised. The
    /// failed event is attached so callers can inspect its state.
    #[error("Failed to process webhook with handlers: {message}")]
    DispatchFailed {
        /// Description of the escalated failure.
        message: String,
        /// The event in its terminal failed state.
        event: Box<WebhookEvent>,
    },
}

impl WebhookError {
    /// Returns `true` for errors raised by signature verification.
    #[must_use]
    pub const fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            Self::MissingHmac | Self::InvalidHmac | Self::SecretNotConfigured
        )
    }

    /// Returns the failed event for [`WebhookError::DispatchFailed`].
    #[must_use]
    pub fn event(&self) -> Option<&WebhookEvent> {
        match self {
            Self::DispatchFailed { event, .. } => Some(event),
            _ => None,
        }
    }
}

/// Error returned by a [`WebhookHandler`](super::WebhookHandler).
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::HandlerError;
///
/// let error = HandlerError::new("inventory service unavailable");
/// assert_eq!(error.to_string(), "inventory service unavailable");
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    /// Creates a handler error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(error.to_string())
    }
}

impl From<WebhookError> for HandlerError {
    fn from(error: WebhookError) -> Self {
        Self::new(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_payload_error_message() {
        let error = WebhookError::MalformedPayload {
            message: "expected value at line 1 column 1".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("Failed to parse webhook payload"));
        assert!(message.contains("line 1 column 1"));
        assert!(!error.is_authentication_failure());
    }

    #[test]
    fn test_invalid_hmac_error_message() {
        let error = WebhookError::InvalidHmac;
        let message = error.to_string();
        assert_eq!(message, "Webhook signature verification failed");
        // Ensure the message is generic and doesn't leak security details
        assert!(!message.contains("key"));
        assert!(!message.contains("expected"));
    }

    #[test]
    fn test_authentication_failures_are_grouped() {
        assert!(WebhookError::MissingHmac.is_authentication_failure());
        assert!(WebhookError::InvalidHmac.is_authentication_failure());
        assert!(WebhookError::SecretNotConfigured.is_authentication_failure());
    }

    #[test]
    fn test_event_accessor_is_none_for_non_dispatch_errors() {
        assert!(WebhookError::InvalidHmac.event().is_none());
        assert!(WebhookError::MalformedPayload {
            message: String::new()
        }
        .event()
        .is_none());
    }

    #[test]
    fn test_handler_error_from_serde_error() {
        let serde_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = HandlerError::from(serde_error);
        assert!(error.message().contains("EOF"));
    }

    #[test]
    fn test_handler_error_from_webhook_error() {
        let error = HandlerError::from(WebhookError::MissingHmac);
        assert_eq!(error.message(), "Webhook signature header is missing");
    }

    #[test]
    fn test_all_error_types_implement_std_error() {
        let error: &dyn std::error::Error = &WebhookError::SecretNotConfigured;
        let _ = error;
        let error: &dyn std::error::Error = &HandlerError::new("boom");
        let _ = error;
    }
}
