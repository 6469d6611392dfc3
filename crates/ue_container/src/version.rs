//! Engine release tags and the container formats each one writes.

use crate::pak::PakVersion;
use std::fmt;
use std::str::FromStr;

/// Unreal Engine release a game was built with.
///
/// Selects the preferred pak layout and the newest IoStore TOC version that is
/// plausible for the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum EngineVersion {
    Ue4_25,
    Ue4_26,
    #[default]
    Ue4_27,
    Ue5_0,
    Ue5_1,
    Ue5_2,
    Ue5_3,
}

impl EngineVersion {
    pub const ALL: [EngineVersion; 7] = [
        EngineVersion::Ue4_25,
        EngineVersion::Ue4_26,
        EngineVersion::Ue4_27,
        EngineVersion::Ue5_0,
        EngineVersion::Ue5_1,
        EngineVersion::Ue5_2,
        EngineVersion::Ue5_3,
    ];

    /// Canonical tag, as written in config files.
    pub fn tag(self) -> &'static str {
        match self {
            EngineVersion::Ue4_25 => "UE4_25",
            EngineVersion::Ue4_26 => "UE4_26",
            EngineVersion::Ue4_27 => "UE4_27",
            EngineVersion::Ue5_0 => "UE5_0",
            EngineVersion::Ue5_1 => "UE5_1",
            EngineVersion::Ue5_2 => "UE5_2",
            EngineVersion::Ue5_3 => "UE5_3",
        }
    }

    /// Parse a tag case-insensitively. `UE5` is accepted as `UE5_0`.
    pub fn parse_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        if tag.eq_ignore_ascii_case("UE5") {
            return Some(EngineVersion::Ue5_0);
        }
        Self::ALL
            .into_iter()
            .find(|v| v.tag().eq_ignore_ascii_case(tag))
    }

    /// Pak layout this engine writes by default.
    pub fn pak_version(self) -> PakVersion {
        match self {
            EngineVersion::Ue4_25 => PakVersion::V9,
            _ => PakVersion::V11,
        }
    }

    /// Newest IoStore TOC version this engine writes.
    pub fn max_toc_version(self) -> u8 {
        match self {
            EngineVersion::Ue4_25 => 1,
            EngineVersion::Ue4_26 => 2,
            EngineVersion::Ue4_27 => 3,
            EngineVersion::Ue5_0 | EngineVersion::Ue5_1 | EngineVersion::Ue5_2 => 5,
            EngineVersion::Ue5_3 => 6,
        }
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Returned when a tag names no known engine release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEngineVersion(pub String);

impl fmt::Display for UnknownEngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown engine version '{}'", self.0)
    }
}

impl std::error::Error for UnknownEngineVersion {}

impl FromStr for EngineVersion {
    type Err = UnknownEngineVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_tag(s).ok_or_else(|| UnknownEngineVersion(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag_is_case_insensitive() {
        assert_eq!(EngineVersion::parse_tag("ue5_1"), Some(EngineVersion::Ue5_1));
        assert_eq!(EngineVersion::parse_tag(" UE4_26 "), Some(EngineVersion::Ue4_26));
    }

    #[test]
    fn test_ue5_alias() {
        assert_eq!("UE5".parse::<EngineVersion>().unwrap(), EngineVersion::Ue5_0);
    }

    #[test]
    fn test_unknown_tag() {
        assert!(EngineVersion::parse_tag("UE3").is_none());
        assert!("".parse::<EngineVersion>().is_err());
    }

    #[test]
    fn test_default_is_ue4_27() {
        assert_eq!(EngineVersion::default(), EngineVersion::Ue4_27);
    }

    #[test]
    fn test_format_mapping() {
        assert_eq!(EngineVersion::Ue4_25.pak_version(), PakVersion::V9);
        assert_eq!(EngineVersion::Ue5_3.pak_version(), PakVersion::V11);
        assert_eq!(EngineVersion::Ue4_25.max_toc_version(), 1);
        assert_eq!(EngineVersion::Ue4_27.max_toc_version(), 3);
        assert_eq!(EngineVersion::Ue5_2.max_toc_version(), 5);
        assert_eq!(EngineVersion::Ue5_3.max_toc_version(), 6);
    }

    #[test]
    fn test_tags_round_trip_through_display() {
        for v in EngineVersion::ALL {
            assert_eq!(EngineVersion::parse_tag(&v.to_string()), Some(v));
        }
    }
}
