//! Per-token and per-batch delivery reports returned by the backend.

use serde::{Deserialize, Serialize};

use crate::platform::Platform;

/// Outcome for a single device token within a batch send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// The backend accepted the message for this token.
    Delivered,
    /// The backend rejected this token, with the backend's reason.
    Failed { reason: String },
}

/// Per-token delivery report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReport {
    /// The device token this report is about.
    pub token: String,
    pub status: DeliveryStatus,
}

impl DeliveryReport {
    pub fn delivered(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            status: DeliveryStatus::Delivered,
        }
    }

    pub fn failed(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            status: DeliveryStatus::Failed {
                reason: reason.into(),
            },
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, DeliveryStatus::Failed { .. })
    }
}

/// Full result of one batch send: one [`DeliveryReport`] per token, in the
/// batch's token order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub platform: Platform,
    pub reports: Vec<DeliveryReport>,
}

impl BatchReport {
    pub fn new(platform: Platform, reports: Vec<DeliveryReport>) -> Self {
        Self { platform, reports }
    }

    /// Number of tokens the backend accepted.
    pub fn delivered_count(&self) -> usize {
        self.reports.len() - self.failed_count()
    }

    /// Number of tokens the backend rejected.
    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    /// The failed reports, in token order.
    pub fn failures(&self) -> impl Iterator<Item = &DeliveryReport> {
        self.reports.iter().filter(|r| r.is_failure())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_failures() {
        let report = BatchReport::new(
            Platform::Android,
            vec![
                DeliveryReport::delivered("a"),
                DeliveryReport::failed("b", "UNREGISTERED"),
                DeliveryReport::delivered("c"),
            ],
        );

        assert_eq!(report.delivered_count(), 2);
        assert_eq!(report.failed_count(), 1);

        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].token, "b");
    }

    #[test]
    fn failure_status_carries_the_reason() {
        let report = DeliveryReport::failed("t", "INVALID_ARGUMENT");
        assert!(report.is_failure());
        assert_eq!(
            report.status,
            DeliveryStatus::Failed {
                reason: "INVALID_ARGUMENT".to_string()
            }
        );
    }
}
