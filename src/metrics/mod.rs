//! Prometheus metrics for the push channel.
//!
//! - Send metrics (sends, batches by platform)
//! - Token metrics (delivered, failed)
//! - Dropped-platform counter (tokens routed to an unrecognized platform key)

use lazy_static::lazy_static;
use prometheus::{
    register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec,
    TextEncoder,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "push_channel";

lazy_static! {
    /// Total `send` invocations that had at least one route to process
    pub static ref SENDS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_sends_total", METRIC_PREFIX),
        "Total send invocations with resolved routes"
    ).unwrap();

    /// Total batches sent, by platform
    pub static ref BATCHES_SENT_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_batches_sent_total", METRIC_PREFIX),
        "Total multicast batches sent",
        &["platform"]
    ).unwrap();

    /// Total tokens the backend accepted
    pub static ref TOKENS_DELIVERED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_tokens_delivered_total", METRIC_PREFIX),
        "Total device tokens accepted by the backend"
    ).unwrap();

    /// Total tokens the backend rejected
    pub static ref TOKENS_FAILED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_tokens_failed_total", METRIC_PREFIX),
        "Total device tokens rejected by the backend"
    ).unwrap();

    /// Routes skipped because their platform key was not recognized
    pub static ref PLATFORMS_DROPPED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_platforms_dropped_total", METRIC_PREFIX),
        "Routes skipped due to an unrecognized platform key"
    ).unwrap();
}

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording channel metrics
pub struct ChannelMetrics;

impl ChannelMetrics {
    /// Record a send invocation that proceeded past route resolution
    pub fn record_send() {
        SENDS_TOTAL.inc();
    }

    /// Record a batch sent for a platform
    pub fn record_batch(platform: &str) {
        BATCHES_SENT_TOTAL.with_label_values(&[platform]).inc();
    }

    /// Record tokens the backend accepted
    pub fn record_delivered(count: u64) {
        TOKENS_DELIVERED_TOTAL.inc_by(count);
    }

    /// Record tokens the backend rejected
    pub fn record_failed(count: u64) {
        TOKENS_FAILED_TOTAL.inc_by(count);
    }

    /// Record a route skipped for an unrecognized platform key
    pub fn record_dropped_platform() {
        PLATFORMS_DROPPED_TOTAL.inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_registered_metrics() {
        ChannelMetrics::record_send();
        ChannelMetrics::record_batch("android");

        let output = encode_metrics().unwrap();
        assert!(output.contains("push_channel_sends_total"));
        assert!(output.contains("push_channel_batches_sent_total"));
    }
}
