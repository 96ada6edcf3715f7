//! The dispatch engine: resolves routes, batches tokens, sends, and
//! surfaces per-token failures.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::batch::{self, TOKENS_PER_REQUEST};
use crate::config::ChannelConfig;
use crate::error::{ChannelError, Result};
use crate::events::{DeliveryFailed, EventSink};
use crate::gateway::PushGateway;
use crate::message::PushMessage;
use crate::metrics::ChannelMetrics;
use crate::platform::Platform;
use crate::report::BatchReport;

/// Platform-keyed device token lists resolved for one recipient.
///
/// Entries keep their insertion order; the engine processes them in that
/// order. An empty route map is the "nothing to send" signal.
#[derive(Debug, Clone, Default)]
pub struct TokenRoutes(Vec<(String, Vec<String>)>);

impl TokenRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a platform entry, builder-style.
    pub fn route(mut self, platform: impl Into<String>, tokens: Vec<String>) -> Self {
        self.0.push((platform.into(), tokens));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl From<Vec<(String, Vec<String>)>> for TokenRoutes {
    fn from(entries: Vec<(String, Vec<String>)>) -> Self {
        Self(entries)
    }
}

/// Caller-supplied recipient of a push notification.
///
/// The engine never mutates the recipient; it only resolves routes and reads
/// the identifier for failure events and logs.
pub trait PushRecipient: Send + Sync {
    /// Stable identifier used in failure events and logs.
    fn recipient_id(&self) -> &str;

    /// Resolve platform-keyed device tokens for this notification.
    fn push_routes(&self, notification: &dyn PushNotification) -> TokenRoutes;
}

/// Caller-supplied notification content.
pub trait PushNotification: Send + Sync {
    /// Stable identifier used in failure events and tracing.
    fn notification_id(&self) -> Uuid;

    /// Build the message payload for one platform. Called once per platform;
    /// all batches for that platform share the returned message.
    fn to_push_message(&self, recipient: &dyn PushRecipient, platform: Platform) -> PushMessage;
}

/// Counters for the push channel, relaxed atomics.
#[derive(Debug, Default)]
pub struct ChannelStats {
    pub total_sends: AtomicU64,
    pub total_batches: AtomicU64,
    pub tokens_delivered: AtomicU64,
    pub tokens_failed: AtomicU64,
}

impl ChannelStats {
    pub fn snapshot(&self) -> ChannelStatsSnapshot {
        ChannelStatsSnapshot {
            total_sends: self.total_sends.load(Ordering::Relaxed),
            total_batches: self.total_batches.load(Ordering::Relaxed),
            tokens_delivered: self.tokens_delivered.load(Ordering::Relaxed),
            tokens_failed: self.tokens_failed.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of channel statistics
#[derive(Debug, Clone, Serialize)]
pub struct ChannelStatsSnapshot {
    pub total_sends: u64,
    pub total_batches: u64,
    pub tokens_delivered: u64,
    pub tokens_failed: u64,
}

/// Dispatches push notifications through a backend gateway.
///
/// Stateless across calls apart from counters; one `send` invocation is a
/// linear pipeline per platform with no shared mutable state, so the channel
/// is safe to share behind an `Arc`.
pub struct PushChannel {
    client: Arc<dyn PushGateway>,
    events: Arc<dyn EventSink>,
    batch_size: usize,
    stats: ChannelStats,
}

impl std::fmt::Debug for PushChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushChannel")
            .field("batch_size", &self.batch_size)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl PushChannel {
    /// Create a channel with the backend's default batch size limit.
    pub fn new(client: Arc<dyn PushGateway>, events: Arc<dyn EventSink>) -> Self {
        Self {
            client,
            events,
            batch_size: TOKENS_PER_REQUEST,
            stats: ChannelStats::default(),
        }
    }

    /// Create a channel from configuration. The batch size must be between
    /// 1 and [`TOKENS_PER_REQUEST`]; a larger value would make the engine
    /// hand the gateway more tokens per call than the backend accepts.
    pub fn with_config(
        client: Arc<dyn PushGateway>,
        events: Arc<dyn EventSink>,
        config: &ChannelConfig,
    ) -> Result<Self> {
        if config.batch_size == 0 || config.batch_size > TOKENS_PER_REQUEST {
            return Err(ChannelError::InvalidBatchSize(config.batch_size));
        }
        Ok(Self {
            client,
            events,
            batch_size: config.batch_size,
            stats: ChannelStats::default(),
        })
    }

    /// Get channel statistics
    pub fn stats(&self) -> ChannelStatsSnapshot {
        self.stats.snapshot()
    }

    /// Send the notification to every platform the recipient routes to.
    ///
    /// Returns `Ok(None)` when the recipient resolves no routes at all —
    /// distinguishing "no platforms configured" from "sent with zero
    /// results". Otherwise returns the batch reports across all platforms,
    /// android batches before ios batches, batch order preserved within a
    /// platform.
    ///
    /// Routes whose key names no known platform are skipped with a warning;
    /// their tokens never reach the backend and produce no reports.
    ///
    /// A [`crate::gateway::TransportError`] aborts the whole call: remaining
    /// batches of the failing platform and any later platforms are not
    /// attempted. Reports for batches that already completed are dropped
    /// with the error, but their failure events have already been published.
    #[tracing::instrument(
        name = "push_channel.send",
        skip(self, recipient, notification),
        fields(
            recipient_id = %recipient.recipient_id(),
            notification_id = %notification.notification_id()
        )
    )]
    pub async fn send(
        &self,
        recipient: &dyn PushRecipient,
        notification: &dyn PushNotification,
    ) -> Result<Option<Vec<BatchReport>>> {
        let routes = recipient.push_routes(notification);
        if routes.is_empty() {
            tracing::debug!("No push routes resolved, nothing to send");
            return Ok(None);
        }

        self.stats.total_sends.fetch_add(1, Ordering::Relaxed);
        ChannelMetrics::record_send();

        // Group reports per platform, flattened in priority order at the end
        // so the merge order never depends on route iteration order.
        let mut grouped: BTreeMap<Platform, Vec<BatchReport>> = BTreeMap::new();

        for (key, tokens) in routes.iter() {
            let platform = match key.parse::<Platform>() {
                Ok(platform) => platform,
                Err(_) => {
                    tracing::warn!(
                        platform = %key,
                        token_count = tokens.len(),
                        "Dropping route for unrecognized platform key"
                    );
                    ChannelMetrics::record_dropped_platform();
                    continue;
                }
            };

            let message = notification.to_push_message(recipient, platform);
            // Override gateway is resolved once per platform, before batching.
            let client = message.client.clone().unwrap_or_else(|| self.client.clone());

            let reports = grouped.entry(platform).or_default();
            for chunk in batch::partition(tokens, self.batch_size)? {
                let report = client.send_multicast(&message, &chunk).await?;
                self.inspect_report(recipient, notification, &report).await;

                self.stats.total_batches.fetch_add(1, Ordering::Relaxed);
                ChannelMetrics::record_batch(platform.as_str());

                reports.push(report);
            }

            tracing::debug!(
                platform = %platform,
                token_count = tokens.len(),
                batches = reports.len(),
                "Sent platform batches"
            );
        }

        Ok(Some(grouped.into_values().flatten().collect()))
    }

    /// Publish one failure event per rejected token, in token order, before
    /// the report is handed back to the caller.
    async fn inspect_report(
        &self,
        recipient: &dyn PushRecipient,
        notification: &dyn PushNotification,
        report: &BatchReport,
    ) {
        let delivered = report.delivered_count() as u64;
        let failed = report.failed_count() as u64;

        self.stats
            .tokens_delivered
            .fetch_add(delivered, Ordering::Relaxed);
        self.stats.tokens_failed.fetch_add(failed, Ordering::Relaxed);
        ChannelMetrics::record_delivered(delivered);
        ChannelMetrics::record_failed(failed);

        for failure in report.failures() {
            self.events
                .publish(DeliveryFailed::new(
                    recipient.recipient_id(),
                    notification.notification_id(),
                    failure.clone(),
                ))
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_routes_keep_insertion_order() {
        let routes = TokenRoutes::new()
            .route("ios", vec!["i1".into()])
            .route("android", vec!["a1".into(), "a2".into()]);

        let keys: Vec<&str> = routes.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["ios", "android"]);
        assert!(!routes.is_empty());
    }

    #[test]
    fn empty_routes_signal_nothing_to_send() {
        assert!(TokenRoutes::new().is_empty());
        assert!(TokenRoutes::from(Vec::new()).is_empty());
    }

    #[test]
    fn stats_snapshot() {
        let stats = ChannelStats::default();
        stats.total_sends.fetch_add(2, Ordering::Relaxed);
        stats.tokens_delivered.fetch_add(7, Ordering::Relaxed);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_sends, 2);
        assert_eq!(snapshot.tokens_delivered, 7);
        assert_eq!(snapshot.tokens_failed, 0);
    }
}
