use thiserror::Error;

use crate::gateway::TransportError;

/// Errors surfaced by the push channel.
///
/// Per-token delivery failures are not errors; they are reported as data in
/// [`crate::report::BatchReport`] and published through the event sink.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Batch partitioning or channel configuration with an out-of-range
    /// batch size.
    #[error("Invalid batch size: {0} (backend accepts 1 to 500 tokens per request)")]
    InvalidBatchSize(usize),

    /// A whole-batch backend failure, as opposed to a per-token one.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, ChannelError>;
