//! Pipeline statistics.
//!
//! [`WebhookStatistics`] is the live, shared aggregator updated by every
//! in-flight pipeline. [`WebhookStats`] is an immutable snapshot of it.
//!
//! All counters live behind one lock, so a snapshot never observes a
//! partially applied update and [`WebhookStatistics::reset`] is atomic with
//! respect to concurrent increments.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use super::topic::WebhookTopic;

#[derive(Debug, Default)]
struct Counters {
    received: u64,
    processed: u64,
    failed: u64,
    per_topic: BTreeMap<WebhookTopic, u64>,
}

/// Concurrent counters for the webhook pipeline.
#[derive(Debug, Default)]
pub struct WebhookStatistics {
    counters: Mutex<Counters>,
}

impl WebhookStatistics {
    /// Creates zeroed statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Counters> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Counts one inbound request.
    pub fn record_received(&self) {
        self.lock().received += 1;
    }

    /// Counts one parsed event under its classified topic.
    pub fn record_topic(&self, topic: WebhookTopic) {
        *self.lock().per_topic.entry(topic).or_insert(0) += 1;
    }

    /// Counts one successfully processed event.
    pub fn record_processed(&self) {
        self.lock().processed += 1;
    }

    /// Counts one failed request.
    pub fn record_failed(&self) {
        self.lock().failed += 1;
    }

    /// Returns a consistent snapshot of all counters.
    #[must_use]
    pub fn snapshot(&self) -> WebhookStats {
        let counters = self.lock();
        WebhookStats {
            total_received: counters.received,
            total_processed: counters.processed,
            total_failed: counters.failed,
            per_topic: counters.per_topic.clone(),
        }
    }

    /// Zeroes every counter and clears the per-topic map.
    pub fn reset(&self) {
        *self.lock() = Counters::default();
        tracing::info!("Webhook statistics reset");
    }
}

/// Point-in-time view of the pipeline counters.
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::WebhookStats;
///
/// let stats = WebhookStats::default();
/// assert_eq!(stats.success_rate(), 0.0);
/// assert_eq!(stats.failure_rate(), 0.0);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WebhookStats {
    /// Requests that entered the pipeline.
    pub total_received: u64,
    /// Events that ended processed.
    pub total_processed: u64,
    /// Requests that failed (malformed, unauthenticated or failed dispatch).
    pub total_failed: u64,
    /// Parsed events per classified topic.
    pub per_topic: BTreeMap<WebhookTopic, u64>,
}

impl WebhookStats {
    /// Returns `total_processed / total_received`, or 0 when nothing was received.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        ratio(self.total_processed, self.total_received)
    }

    /// Returns `total_failed / total_received`, or 0 when nothing was received.
    #[must_use]
    pub fn failure_rate(&self) -> f64 {
        ratio(self.total_failed, self.total_received)
    }

    /// Returns the count for `topic`.
    #[must_use]
    pub fn topic_count(&self, topic: WebhookTopic) -> u64 {
        self.per_topic.get(&topic).copied().unwrap_or(0)
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}
