//! Resolution strategy model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// How a conflict is turned into a single record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// Keep the device's version
    LocalWins,
    /// Keep the cloud version
    RemoteWins,
    /// Combine both with the collection's merge function
    Merge,
    /// Defer to a person; never applied automatically
    Manual,
}

impl ResolutionStrategy {
    /// All strategies, in tag order
    pub const ALL: [Self; 4] = [Self::LocalWins, Self::RemoteWins, Self::Merge, Self::Manual];

    /// Wire tag of the strategy
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LocalWins => "local_wins",
            Self::RemoteWins => "remote_wins",
            Self::Merge => "merge",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for ResolutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ResolutionStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| Error::UnknownStrategy(s.to_string()))
    }
}

/// A recommended strategy together with the reason shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SuggestedStrategy {
    pub strategy: ResolutionStrategy,
    pub reason: &'static str,
}
