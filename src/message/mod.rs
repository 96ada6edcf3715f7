//! The message payload the channel hands to the backend.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::gateway::PushGateway;
use crate::platform::Platform;

/// Priority levels for push messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Low priority, can be delayed by the platform.
    Low,
    /// Normal priority (default).
    #[default]
    Normal,
    /// High priority, should wake the device.
    High,
}

/// A platform-specific message payload built once per platform.
///
/// All batches for a platform share the same message. The optional `client`
/// overrides the channel's default gateway for this message; it is resolved
/// once per platform, before batching.
#[derive(Clone)]
pub struct PushMessage {
    pub platform: Platform,
    pub title: Option<String>,
    pub body: Option<String>,
    /// Structured data payload delivered alongside the notification.
    pub data: serde_json::Value,
    pub priority: Priority,
    pub client: Option<Arc<dyn PushGateway>>,
}

impl PushMessage {
    pub fn builder(platform: Platform) -> PushMessageBuilder {
        PushMessageBuilder::new(platform)
    }
}

impl fmt::Debug for PushMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushMessage")
            .field("platform", &self.platform)
            .field("title", &self.title)
            .field("body", &self.body)
            .field("data", &self.data)
            .field("priority", &self.priority)
            .field("client_override", &self.client.is_some())
            .finish()
    }
}

/// Builder for [`PushMessage`].
#[derive(Clone)]
pub struct PushMessageBuilder {
    platform: Platform,
    title: Option<String>,
    body: Option<String>,
    data: serde_json::Value,
    priority: Priority,
    client: Option<Arc<dyn PushGateway>>,
}

impl PushMessageBuilder {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            title: None,
            body: None,
            data: serde_json::Value::Null,
            priority: Priority::default(),
            client: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    /// Set the data payload from a serializable value.
    pub fn data_from<T: Serialize>(mut self, data: &T) -> Result<Self, serde_json::Error> {
        self.data = serde_json::to_value(data)?;
        Ok(self)
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Route this message through a dedicated gateway instead of the
    /// channel's default.
    pub fn client(mut self, client: Arc<dyn PushGateway>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> PushMessage {
        PushMessage {
            platform: self.platform,
            title: self.title,
            body: self.body,
            data: self.data,
            priority: self.priority,
            client: self.client,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_defaults() {
        let message = PushMessage::builder(Platform::Android).build();
        assert_eq!(message.platform, Platform::Android);
        assert_eq!(message.priority, Priority::Normal);
        assert!(message.title.is_none());
        assert!(message.client.is_none());
        assert!(message.data.is_null());
    }

    #[test]
    fn builder_sets_all_fields() {
        let message = PushMessage::builder(Platform::Ios)
            .title("Order shipped")
            .body("Your order #42 is on its way")
            .data(json!({ "order_id": 42 }))
            .priority(Priority::High)
            .build();

        assert_eq!(message.title.as_deref(), Some("Order shipped"));
        assert_eq!(message.priority, Priority::High);
        assert_eq!(message.data["order_id"], 42);
    }
}
