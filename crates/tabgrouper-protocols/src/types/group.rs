//! Tab groups and their colors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::WindowId;

/// Host-assigned group identifier, unique for the host's lifetime.
pub type GroupId = i64;

/// Colors the host accepts for a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Pink,
    Cyan,
    Orange,
    #[default]
    Grey,
}

impl GroupColor {
    pub const ALL: [GroupColor; 9] = [
        GroupColor::Red,
        GroupColor::Blue,
        GroupColor::Green,
        GroupColor::Yellow,
        GroupColor::Purple,
        GroupColor::Pink,
        GroupColor::Cyan,
        GroupColor::Orange,
        GroupColor::Grey,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupColor::Red => "red",
            GroupColor::Blue => "blue",
            GroupColor::Green => "green",
            GroupColor::Yellow => "yellow",
            GroupColor::Purple => "purple",
            GroupColor::Pink => "pink",
            GroupColor::Cyan => "cyan",
            GroupColor::Orange => "orange",
            GroupColor::Grey => "grey",
        }
    }
}

impl fmt::Display for GroupColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        GroupColor::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| format!("unknown group color: {}", s))
    }
}

/// A host tab group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub color: GroupColor,
    pub window_id: WindowId,
}

impl Group {
    pub fn new(id: GroupId, title: impl Into<String>, color: GroupColor, window_id: WindowId) -> Self {
        Self {
            id,
            title: title.into(),
            color,
            window_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parse_case_insensitive() {
        assert_eq!("Purple".parse::<GroupColor>().unwrap(), GroupColor::Purple);
        assert_eq!(" cyan ".parse::<GroupColor>().unwrap(), GroupColor::Cyan);
    }

    #[test]
    fn test_color_parse_unknown() {
        assert!("magenta".parse::<GroupColor>().is_err());
        assert!("gray".parse::<GroupColor>().is_err());
    }

    #[test]
    fn test_color_default_is_grey() {
        assert_eq!(GroupColor::default(), GroupColor::Grey);
    }

    #[test]
    fn test_color_serde_lowercase() {
        let json = serde_json::to_value(GroupColor::Orange).unwrap();
        assert_eq!(json, "orange");
        let color: GroupColor = serde_json::from_value(serde_json::json!("red")).unwrap();
        assert_eq!(color, GroupColor::Red);
    }

    #[test]
    fn test_all_colors_roundtrip_through_display() {
        for color in GroupColor::ALL {
            assert_eq!(color.to_string().parse::<GroupColor>().unwrap(), color);
        }
    }
}
