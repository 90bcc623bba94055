//! Configuration types for the webhook engine.
//!
//! # Overview
//!
//! - [`WebhookConfig`]: secrets and verification policy used by the pipeline
//! - [`WebhookConfigBuilder`]: builder for constructing [`WebhookConfig`]
//! - [`WebhookSecret`]: a validated secret newtype with masked debug output
//! - [`MissingSecretPolicy`]: what verification does when no secret is set
//!
//! # Example
//!
//! ```rust
//! use shopify_webhooks::{WebhookConfig, WebhookSecret};
//!
//! let config = WebhookConfig::builder()
//!     .webhook_secret(WebhookSecret::new("my-secret").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert!(config.webhook_secret().is_some());
//! ```

mod newtypes;

pub use newtypes::WebhookSecret;

use crate::error::ConfigError;

/// Behavior of signature verification when no webhook secret is configured.
///
/// The default is [`MissingSecretPolicy::Reject`]. Accepting unsigned
/// webhooks must be opted into explicitly and is only meant for development
/// and test deployments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MissingSecretPolicy {
    /// Every webhook fails verification.
    #[default]
    Reject,
    /// Every webhook passes verification. A warning is logged per event.
    Accept,
}

/// Configuration for the webhook pipeline.
///
/// # Key Rotation
///
/// The `old_webhook_secret` field supports seamless key rotation. The
/// verifier tries the primary secret first, then falls back to the old one,
/// so webhooks signed before a rotation keep verifying.
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::{MissingSecretPolicy, WebhookConfig, WebhookSecret};
///
/// let config = WebhookConfig::builder()
///     .webhook_secret(WebhookSecret::new("new-secret").unwrap())
///     .old_webhook_secret(WebhookSecret::new("old-secret").unwrap())
///     .build()
///     .unwrap();
///
/// assert_eq!(config.missing_secret_policy(), MissingSecretPolicy::Reject);
/// ```
#[derive(Clone, Debug, Default)]
pub struct WebhookConfig {
    webhook_secret: Option<WebhookSecret>,
    old_webhook_secret: Option<WebhookSecret>,
    missing_secret_policy: MissingSecretPolicy,
}

impl WebhookConfig {
    /// Creates a new builder for constructing a `WebhookConfig`.
    #[must_use]
    pub fn builder() -> WebhookConfigBuilder {
        WebhookConfigBuilder::new()
    }

    /// Returns the primary webhook secret, if configured.
    #[must_use]
    pub const fn webhook_secret(&self) -> Option<&WebhookSecret> {
        self.webhook_secret.as_ref()
    }

    /// Returns the old webhook secret, if configured.
    ///
    /// This is used during key rotation to verify signatures created with
    /// the previous secret.
    #[must_use]
    pub const fn old_webhook_secret(&self) -> Option<&WebhookSecret> {
        self.old_webhook_secret.as_ref()
    }

    /// Returns the policy applied when no secret is configured.
    #[must_use]
    pub const fn missing_secret_policy(&self) -> MissingSecretPolicy {
        self.missing_secret_policy
    }
}

// Verify WebhookConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<WebhookConfig>();
};

/// Builder for constructing [`WebhookConfig`] instances.
///
/// # Defaults
///
/// - `webhook_secret`: `None`
/// - `old_webhook_secret`: `None`
/// - `missing_secret_policy`: [`MissingSecretPolicy::Reject`]
#[derive(Debug, Default)]
pub struct WebhookConfigBuilder {
    webhook_secret: Option<WebhookSecret>,
    old_webhook_secret: Option<WebhookSecret>,
    missing_secret_policy: Option<MissingSecretPolicy>,
}

impl WebhookConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the shared secret used to verify webhook signatures.
    #[must_use]
    pub fn webhook_secret(mut self, secret: WebhookSecret) -> Self {
        self.webhook_secret = Some(secret);
        self
    }

    /// Sets the previous secret for key rotation support.
    ///
    /// Requires a primary secret to be set as well.
    #[must_use]
    pub fn old_webhook_secret(mut self, secret: WebhookSecret) -> Self {
        self.old_webhook_secret = Some(secret);
        self
    }

    /// Sets the policy applied when no secret is configured.
    #[must_use]
    pub const fn missing_secret_policy(mut self, policy: MissingSecretPolicy) -> Self {
        self.missing_secret_policy = Some(policy);
        self
    }

    /// Builds the [`WebhookConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if an old secret is set
    /// without a primary `webhook_secret`.
    pub fn build(self) -> Result<WebhookConfig, ConfigError> {
        if self.old_webhook_secret.is_some() && self.webhook_secret.is_none() {
            return Err(ConfigError::MissingRequiredField {
                field: "webhook_secret",
            });
        }

        Ok(WebhookConfig {
            webhook_secret: self.webhook_secret,
            old_webhook_secret: self.old_webhook_secret,
            missing_secret_policy: self.missing_secret_policy.unwrap_or_default(),
        })
    }
}
