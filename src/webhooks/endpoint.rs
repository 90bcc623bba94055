//! Helpers for the HTTP layer that hosts the webhook endpoint.
//!
//! The crate does not depend on an HTTP framework. These functions capture
//! the endpoint contract so any server can apply it:
//!
//! - `GET` with `hub.challenge`: echo the challenge ([`challenge_response`])
//! - `POST`: run [`WebhookProcessor::process`](super::WebhookProcessor::process)
//!   and answer with [`response_status`]
//! - health and stats: serialize [`HealthReport`] or
//!   [`WebhookStats`](super::WebhookStats)

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::errors::WebhookError;
use super::event::WebhookEvent;
use super::stats::WebhookStats;

/// Query parameter carrying the endpoint verification challenge.
pub const CHALLENGE_PARAM: &str = "hub.challenge";

/// Body returned for a verification request without a challenge.
pub const ENDPOINT_ACTIVE_MESSAGE: &str = "Shopify webhook endpoint is active";

/// Service name reported by [`HealthReport`].
pub const SERVICE_NAME: &str = "shopify-webhooks";

/// Returns the body for a verification request with raw query string `query`.
///
/// The decoded `hub.challenge` value is echoed unmodified. Without a
/// challenge, or when it is blank after decoding, [`ENDPOINT_ACTIVE_MESSAGE`]
/// is returned.
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::webhooks::challenge_response;
///
/// assert_eq!(challenge_response("hub.challenge=abc%20123&x=1"), "abc 123");
/// assert_eq!(challenge_response(""), "Shopify webhook endpoint is active");
/// ```
#[must_use]
pub fn challenge_response(query: &str) -> String {
    query
        .trim_start_matches('?')
        .split('&')
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(key, _)| decode(key) == CHALLENGE_PARAM)
        .map(|(_, value)| decode(value))
        .filter(|challenge| !challenge.trim().is_empty())
        .map_or_else(|| ENDPOINT_ACTIVE_MESSAGE.to_string(), Cow::into_owned)
}

// Form encoding: '+' is a space. Undecodable input is kept verbatim.
fn decode(component: &str) -> Cow<'_, str> {
    let spaced = component.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => Cow::Owned(decoded.into_owned()),
        Err(_) => Cow::Borrowed(component),
    }
}

/// HTTP status for a pipeline outcome.
///
/// `200` once the event was processed (recovered handler failures
/// included), `500` for every error so the sender retries.
#[must_use]
pub const fn response_status(outcome: &Result<WebhookEvent, WebhookError>) -> u16 {
    match outcome {
        Ok(_) => 200,
        Err(_) => 500,
    }
}

/// Liveness payload for a health endpoint.
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::webhooks::HealthReport;
/// use shopify_webhooks::WebhookStats;
///
/// let report = HealthReport::from_stats(&WebhookStats::default());
/// assert_eq!(report.status, "UP");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HealthReport {
    /// Always `UP` while the process can answer.
    pub status: &'static str,
    /// Name of the service.
    pub service: &'static str,
    /// When the report was produced.
    pub timestamp: DateTime<Utc>,
    /// Requests received.
    pub total_received: u64,
    /// Events processed.
    pub total_processed: u64,
    /// Requests failed.
    pub total_failed: u64,
    /// `total_processed / total_received`.
    pub success_rate: f64,
}

impl HealthReport {
    /// Builds a report from a statistics snapshot.
    #[must_use]
    pub fn from_stats(stats: &WebhookStats) -> Self {
        Self {
            status: "UP",
            service: SERVICE_NAME,
            timestamp: Utc::now(),
            total_received: stats.total_received,
            total_processed: stats.total_processed,
            total_failed: stats.total_failed,
            success_rate: stats.success_rate(),
        }
    }
}
