use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The three kinds of catalog entity the engine reconciles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Studio,
    Performer,
    Tag,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Studio => "studio",
            Self::Performer => "performer",
            Self::Tag => "tag",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "studio" | "studios" => Ok(Self::Studio),
            "performer" | "performers" => Ok(Self::Performer),
            "tag" | "tags" => Ok(Self::Tag),
            other => Err(CoreError::InvalidKind(other.to_string())),
        }
    }
}
