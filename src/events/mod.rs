//! Failure events published once per token the backend rejects.
//!
//! The sink is an explicit constructor dependency of the channel, so hosts
//! can bridge it onto their own event bus and tests can capture events with
//! a recording sink. [`TracingEventSink`] ships as the default.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::report::{DeliveryReport, DeliveryStatus};

/// Identity tag carried by every event this channel publishes.
pub const CHANNEL_TAG: &str = "push-channel";

/// One token the backend reported as failed.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryFailed {
    pub recipient_id: String,
    pub notification_id: Uuid,
    /// Source identity of the publishing channel.
    pub channel: &'static str,
    /// The failing per-token report.
    pub report: DeliveryReport,
    pub occurred_at: DateTime<Utc>,
}

impl DeliveryFailed {
    pub fn new(
        recipient_id: impl Into<String>,
        notification_id: Uuid,
        report: DeliveryReport,
    ) -> Self {
        Self {
            recipient_id: recipient_id.into(),
            notification_id,
            channel: CHANNEL_TAG,
            report,
            occurred_at: Utc::now(),
        }
    }
}

/// Publish side of the host's event bus, consumed by the channel.
///
/// Fire-and-forget: publish failures are the sink's concern and never affect
/// the channel's return value.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: DeliveryFailed);
}

/// Default sink that logs failures through `tracing`.
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn publish(&self, event: DeliveryFailed) {
        let reason = match &event.report.status {
            DeliveryStatus::Failed { reason } => reason.as_str(),
            DeliveryStatus::Delivered => "",
        };
        tracing::warn!(
            recipient_id = %event.recipient_id,
            notification_id = %event.notification_id,
            token = %event.report.token,
            reason = %reason,
            "Push delivery failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_carries_the_channel_tag() {
        let event = DeliveryFailed::new(
            "user-1",
            Uuid::new_v4(),
            DeliveryReport::failed("tok", "UNREGISTERED"),
        );
        assert_eq!(event.channel, CHANNEL_TAG);
        assert!(event.report.is_failure());
    }
}
