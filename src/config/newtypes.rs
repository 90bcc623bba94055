//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use std::fmt;

/// A validated webhook signing secret.
///
/// This newtype ensures the secret is non-empty and masks its value
/// in debug output to prevent accidental exposure in logs.
///
/// # Security
///
/// The `Debug` implementation masks the secret value, displaying only
/// `WebhookSecret(*****)` instead of the actual key.
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::WebhookSecret;
///
/// let secret = WebhookSecret::new("my-secret").unwrap();
/// assert_eq!(secret.as_ref(), "my-secret");
/// assert_eq!(format!("{:?}", secret), "WebhookSecret(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct WebhookSecret(String);

impl WebhookSecret {
    /// Creates a new validated webhook secret.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyWebhookSecret`] if the secret is empty.
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::EmptyWebhookSecret);
        }
        Ok(Self(secret))
    }
}

impl AsRef<str> for WebhookSecret {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WebhookSecret(*****)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_secret_rejects_empty_string() {
        assert!(matches!(
            WebhookSecret::new(""),
            Err(ConfigError::EmptyWebhookSecret)
        ));
    }

    #[test]
    fn test_webhook_secret_masks_value_in_debug() {
        let secret = WebhookSecret::new("super-secret-value").unwrap();
        let debug = format!("{secret:?}");
        assert_eq!(debug, "WebhookSecret(*****)");
        assert!(!debug.contains("super-secret-value"));
    }

    #[test]
    fn test_webhook_secret_exposes_value_through_as_ref() {
        let secret = WebhookSecret::new("abc").unwrap();
        assert_eq!(secret.as_ref(), "abc");
    }
}
