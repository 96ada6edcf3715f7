mod settings;

pub use settings::{ChannelConfig, Settings};
