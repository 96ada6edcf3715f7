//! Platform-aware push notification delivery channel.
//!
//! The channel takes a notification addressed to a recipient, resolves the
//! recipient's device tokens per platform, splits each token set into
//! multicast batches bounded by the backend's request limit, sends every
//! batch through a [`gateway::PushGateway`], and publishes one
//! [`events::DeliveryFailed`] event per token the backend reports as failed.
//!
//! Retry policy, token lifecycle, and message content are the caller's
//! concern; the channel only orchestrates batching and delivery reporting.

// Supporting modules
pub mod config;
pub mod error;
pub mod metrics;

// Channel domain
pub mod batch;
pub mod channel;
pub mod events;
pub mod gateway;
pub mod message;
pub mod platform;
pub mod report;

pub use batch::TOKENS_PER_REQUEST;
pub use channel::{
    ChannelStatsSnapshot, PushChannel, PushNotification, PushRecipient, TokenRoutes,
};
pub use error::{ChannelError, Result};
pub use events::{DeliveryFailed, EventSink, TracingEventSink, CHANNEL_TAG};
pub use gateway::{PushGateway, TransportError};
pub use message::{Priority, PushMessage, PushMessageBuilder};
pub use platform::Platform;
pub use report::{BatchReport, DeliveryReport, DeliveryStatus};
