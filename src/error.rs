//! Error types for webhook engine configuration.
//!
//! This module contains the error type returned while building a
//! [`WebhookConfig`](crate::WebhookConfig) or its validated newtypes.
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use shopify_webhooks::{ConfigError, WebhookSecret};
//!
//! let result = WebhookSecret::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyWebhookSecret)));
//! ```

use thiserror::Error;

/// Errors that can occur while configuring the webhook engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Webhook secret cannot be empty.
    #[error("Webhook secret cannot be empty. Please provide the shared secret used to sign Shopify webhooks.")]
    EmptyWebhookSecret,

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_webhook_secret_error_message() {
        let message = ConfigError::EmptyWebhookSecret.to_string();
        assert!(message.contains("Webhook secret cannot be empty"));
        assert!(message.contains("shared secret"));
    }

    #[test]
    fn test_missing_required_field_error_message() {
        let error = ConfigError::MissingRequiredField {
            field: "webhook_secret",
        };
        let message = error.to_string();
        assert!(message.contains("webhook_secret"));
        assert!(message.contains("must be set"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let error = ConfigError::EmptyWebhookSecret;
        let _: &dyn std::error::Error = &error;
    }
}
