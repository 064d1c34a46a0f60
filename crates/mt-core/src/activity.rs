//! Activity type enum as the single source of truth for activity strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two kinds of tracked activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityType {
    /// Passive media intake.
    Consuming,
    /// Productive or creative work.
    Creating,
}

impl ActivityType {
    pub const ALL: [Self; 2] = [Self::Consuming, Self::Creating];

    /// String representation for storage and serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Consuming => "consuming",
            Self::Creating => "creating",
        }
    }

    /// Human-facing label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Consuming => "Consuming",
            Self::Creating => "Creating",
        }
    }

    /// Icon hint for presentation layers.
    #[must_use]
    pub const fn icon(&self) -> &'static str {
        match self {
            Self::Consuming => "spoon.serving",
            Self::Creating => "camera.macro",
        }
    }

    /// Color hint for presentation layers.
    #[must_use]
    pub const fn color(&self) -> &'static str {
        match self {
            Self::Consuming => "red",
            Self::Creating => "green",
        }
    }

    /// The opposite variant.
    #[must_use]
    pub const fn other(&self) -> Self {
        match self {
            Self::Consuming => Self::Creating,
            Self::Creating => Self::Consuming,
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = UnknownActivityType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "consuming" => Ok(Self::Consuming),
            "creating" => Ok(Self::Creating),
            _ => Err(UnknownActivityType(s.to_string())),
        }
    }
}

impl Serialize for ActivityType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ActivityType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown activity type strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownActivityType(String);

impl fmt::Display for UnknownActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown activity type: {}", self.0)
    }
}

impl std::error::Error for UnknownActivityType {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_all_variants() {
        for variant in &ActivityType::ALL {
            let s = variant.to_string();
            let parsed: ActivityType = s.parse().expect("should parse");
            assert_eq!(parsed, *variant, "roundtrip failed for {variant:?}");
        }
    }

    #[test]
    fn display_labels_parse() {
        assert_eq!(
            "Consuming".parse::<ActivityType>().unwrap(),
            ActivityType::Consuming
        );
        assert_eq!(
            "CREATING".parse::<ActivityType>().unwrap(),
            ActivityType::Creating
        );
    }

    #[test]
    fn unknown_type_errors() {
        let err = "watching".parse::<ActivityType>().unwrap_err();
        assert_eq!(err.to_string(), "unknown activity type: watching");
    }

    #[test]
    fn other_flips_variant() {
        assert_eq!(ActivityType::Consuming.other(), ActivityType::Creating);
        assert_eq!(ActivityType::Creating.other(), ActivityType::Consuming);
    }

    #[test]
    fn presentation_hints() {
        assert_eq!(ActivityType::Consuming.label(), "Consuming");
        assert_eq!(ActivityType::Consuming.color(), "red");
        assert_eq!(ActivityType::Creating.icon(), "camera.macro");
        assert_eq!(ActivityType::Creating.color(), "green");
    }

    #[test]
    fn serde_uses_storage_string() {
        let json = serde_json::to_string(&ActivityType::Creating).unwrap();
        assert_eq!(json, "\"creating\"");
        let parsed: ActivityType = serde_json::from_str("\"Consuming\"").unwrap();
        assert_eq!(parsed, ActivityType::Consuming);
        assert!(serde_json::from_str::<ActivityType>("\"idle\"").is_err());
    }
}
