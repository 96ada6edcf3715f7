//! Push platforms the channel delivers to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A platform the channel knows how to deliver to.
///
/// Declaration order doubles as the merge priority for aggregated results:
/// android batches always precede ios batches in the returned collection,
/// regardless of the order the recipient's routes were resolved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
}

impl Platform {
    /// All known platforms, in merge priority order.
    pub const ALL: [Platform; 2] = [Platform::Android, Platform::Ios];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a route key does not name a known platform.
#[derive(Debug, Clone, Error)]
#[error("Unknown platform key: {0}")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            other => Err(UnknownPlatform(other.to_string())),
        }
    }
}
