//! Supporting types for the book storage system.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a book within the storage system.
///
/// Freshly created books get a UUID v4, but imported records keep whatever
/// identifier their backup carried, so this stays an opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(pub String);

impl BookId {
    /// Create a new BookId
    pub fn new(id: String) -> Self {
        Self(id)
    }

    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for BookId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl From<&str> for BookId {
    fn from(id: &str) -> Self {
        Self::new(id.to_string())
    }
}

/// Board column a book lives in.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    ToBuy,
    ToRead,
    Library,
    ToRelease,
}

impl Stage {
    /// Every stage, in board order.
    pub const ALL: [Stage; 4] = [Stage::ToBuy, Stage::ToRead, Stage::Library, Stage::ToRelease];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ToBuy => "to_buy",
            Stage::ToRead => "to_read",
            Stage::Library => "library",
            Stage::ToRelease => "to_release",
        }
    }

    /// Human readable column label.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::ToBuy => "To buy",
            Stage::ToRead => "To read",
            Stage::Library => "Library",
            Stage::ToRelease => "To release",
        }
    }

    /// Stages a book usually moves to next from this one.
    pub fn transitions(&self) -> &'static [Stage] {
        match self {
            Stage::ToBuy => &[Stage::ToRead],
            Stage::ToRead => &[Stage::Library, Stage::ToRelease],
            Stage::Library => &[Stage::ToRelease],
            Stage::ToRelease => &[Stage::Library],
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known stage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown stage: {0}")]
pub struct UnknownStage(pub String);

impl FromStr for Stage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "to_buy" => Ok(Stage::ToBuy),
            "to_read" => Ok(Stage::ToRead),
            "library" => Ok(Stage::Library),
            "to_release" => Ok(Stage::ToRelease),
            _ => Err(UnknownStage(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_parsing() {
        assert_eq!("to_read".parse::<Stage>().unwrap(), Stage::ToRead);
        assert_eq!("To-Release".parse::<Stage>().unwrap(), Stage::ToRelease);
        assert!("shelf".parse::<Stage>().is_err());
    }

    #[test]
    fn test_stage_serializes_snake_case() {
        let json = serde_json::to_string(&Stage::ToBuy).unwrap();
        assert_eq!(json, "\"to_buy\"");
        let stage: Stage = serde_json::from_str("\"to_release\"").unwrap();
        assert_eq!(stage, Stage::ToRelease);
    }

    #[test]
    fn test_transitions_never_point_to_self() {
        for stage in Stage::ALL {
            assert!(!stage.transitions().contains(&stage));
        }
    }
}
