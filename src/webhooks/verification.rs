//! Webhook signature verification.
//!
//! Shopify signs webhook requests using HMAC-SHA256 over the raw request
//! body, keyed by the app's webhook secret, and sends the base64-encoded
//! digest in the `X-Shopify-Hmac-SHA256` header.
//!
//! - [`verify_hmac`]: low-level check of one signature against one secret
//! - [`SignatureVerifier`]: applies a [`WebhookConfig`], with key rotation
//!   and the configured [`MissingSecretPolicy`]
//!
//! # Example
//!
//! ```rust
//! use shopify_webhooks::webhooks::{compute_signature_base64, verify_hmac};
//!
//! let body = br#"{"id":123}"#;
//! let hmac = compute_signature_base64(body, "secret");
//!
//! assert!(verify_hmac(body, &hmac, "secret"));
//! assert!(!verify_hmac(br#"{"id":124}"#, &hmac, "secret"));
//! ```
//!
//! # Security
//!
//! All comparisons are constant-time. Verification always runs against the
//! exact bytes received, never a re-serialized payload.

use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::config::{MissingSecretPolicy, WebhookConfig};

use super::errors::WebhookError;

type HmacSha256 = Hmac<Sha256>;

/// Optional prefix some senders put in front of the digest.
const SIGNATURE_PREFIX: &str = "sha256=";

/// Length of a hex-encoded SHA-256 digest.
const HEX_DIGEST_LEN: usize = 64;

fn digest(message: &[u8], secret: &str) -> impl AsRef<[u8]> {
    // HMAC accepts any key size, so this never panics
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message);
    mac.finalize().into_bytes()
}

/// Computes an HMAC-SHA256 signature for raw bytes, returning base64-encoded output.
///
/// This is the representation Shopify sends in the `X-Shopify-Hmac-SHA256`
/// header.
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::webhooks::compute_signature_base64;
///
/// let sig = compute_signature_base64(b"webhook payload", "secret-key");
/// assert_eq!(sig.len(), 44); // Base64 of 32 bytes
/// ```
#[must_use]
pub fn compute_signature_base64(message: &[u8], secret: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(digest(message, secret))
}

/// Computes an HMAC-SHA256 signature for raw bytes, returning lowercase hex.
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::webhooks::compute_signature_hex;
///
/// let sig = compute_signature_hex(b"webhook payload", "secret-key");
/// assert_eq!(sig.len(), 64);
/// ```
#[must_use]
pub fn compute_signature_hex(message: &[u8], secret: &str) -> String {
    hex::encode(digest(message, secret))
}

/// Performs constant-time comparison of two strings.
#[must_use]
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    // ConstantTimeEq handles different lengths securely
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Verifies the HMAC signature of a webhook request body.
///
/// The signature may be base64 (Shopify's format) or a 64-character hex
/// digest, optionally prefixed with `sha256=`. A malformed signature simply
/// fails verification.
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::webhooks::{compute_signature_hex, verify_hmac};
///
/// let body = b"payload";
/// let hex = compute_signature_hex(body, "secret");
///
/// assert!(verify_hmac(body, &format!("sha256={hex}"), "secret"));
/// assert!(!verify_hmac(body, "not-a-signature", "secret"));
/// ```
#[must_use]
pub fn verify_hmac(raw_body: &[u8], signature: &str, secret: &str) -> bool {
    let signature = signature.trim();
    let signature = signature
        .strip_prefix(SIGNATURE_PREFIX)
        .unwrap_or(signature);

    if is_hex_digest(signature) {
        let computed = compute_signature_hex(raw_body, secret);
        return constant_time_compare(&computed, &signature.to_ascii_lowercase());
    }

    let computed = compute_signature_base64(raw_body, secret);
    constant_time_compare(&computed, signature)
}

fn is_hex_digest(signature: &str) -> bool {
    signature.len() == HEX_DIGEST_LEN && signature.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Verifies webhook signatures according to a [`WebhookConfig`].
///
/// The verifier is a pure function of its inputs: it holds no state beyond
/// the configuration and never suspends.
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::webhooks::{compute_signature_base64, SignatureVerifier};
/// use shopify_webhooks::{WebhookConfig, WebhookSecret};
///
/// let config = WebhookConfig::builder()
///     .webhook_secret(WebhookSecret::new("secret").unwrap())
///     .build()
///     .unwrap();
/// let verifier = SignatureVerifier::new(config);
///
/// let body = b"{}";
/// let hmac = compute_signature_base64(body, "secret");
/// assert!(verifier.verify(body, Some(&hmac)).is_ok());
/// assert!(verifier.verify(body, None).is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct SignatureVerifier {
    config: WebhookConfig,
}

impl SignatureVerifier {
    /// Creates a verifier for the given configuration.
    #[must_use]
    pub const fn new(config: WebhookConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration used by this verifier.
    #[must_use]
    pub const fn config(&self) -> &WebhookConfig {
        &self.config
    }

    /// Verifies `signature` against `raw_body`.
    ///
    /// Tries the primary secret first, then the old secret if configured.
    /// When no secret is configured the [`MissingSecretPolicy`] decides.
    ///
    /// # Errors
    ///
    /// - [`WebhookError::SecretNotConfigured`] if no secret is set and the
    ///   policy is [`MissingSecretPolicy::Reject`]
    /// - [`WebhookError::MissingHmac`] if `signature` is `None` or blank
    /// - [`WebhookError::InvalidHmac`] if no configured secret matches
    pub fn verify(&self, raw_body: &[u8], signature: Option<&str>) -> Result<(), WebhookError> {
        let Some(secret) = self.config.webhook_secret() else {
            return match self.config.missing_secret_policy() {
                MissingSecretPolicy::Reject => Err(WebhookError::SecretNotConfigured),
                MissingSecretPolicy::Accept => {
                    tracing::warn!("Webhook secret not configured, accepting unsigned webhook");
                    Ok(())
                }
            };
        };

        let signature = match signature {
            Some(s) if !s.trim().is_empty() => s,
            _ => return Err(WebhookError::MissingHmac),
        };

        if verify_hmac(raw_body, signature, secret.as_ref()) {
            return Ok(());
        }

        // Fall back to old secret key if configured and primary fails
        if let Some(old_secret) = self.config.old_webhook_secret() {
            if verify_hmac(raw_body, signature, old_secret.as_ref()) {
                tracing::debug!("Webhook signature verified with old secret");
                return Ok(());
            }
        }

        Err(WebhookError::InvalidHmac)
    }

    /// Returns `true` if [`verify`](Self::verify) would succeed.
    #[must_use]
    pub fn is_valid(&self, raw_body: &[u8], signature: Option<&str>) -> bool {
        self.verify(raw_body, signature).is_ok()
    }
}

// Internal hex encoding since we don't want to add another dependency
mod hex {
    const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";

    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        let bytes = bytes.as_ref();
        let mut result = String::with_capacity(bytes.len() * 2);
        for &byte in bytes {
            result.push(HEX_CHARS[(byte >> 4) as usize] as char);
            result.push(HEX_CHARS[(byte & 0x0f) as usize] as char);
        }
        result
    }
}
