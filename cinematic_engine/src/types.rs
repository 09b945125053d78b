// types.rs - Shared type definitions for themes, zones and playback
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error_handling::EngineError;

/// Number of zones every theme carries.
pub const ZONE_COUNT: usize = 6;

/// The two themed experiences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Cyberpunk,
    Nature,
}

impl Theme {
    pub const ALL: [Theme; 2] = [Theme::Cyberpunk, Theme::Nature];

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Cyberpunk => "cyberpunk",
            Theme::Nature => "nature",
        }
    }

    pub fn parse(s: &str) -> Option<Theme> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cyberpunk" => Some(Theme::Cyberpunk),
            "nature" => Some(Theme::Nature),
            _ => None,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Zone identity. Both themes share the same six zones in the same order;
/// the discriminant is the zone's index in a theme table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ZoneId {
    Landing,
    About,
    Skills,
    Projects,
    Experience,
    Contact,
}

impl ZoneId {
    pub const ALL: [ZoneId; ZONE_COUNT] = [
        ZoneId::Landing,
        ZoneId::About,
        ZoneId::Skills,
        ZoneId::Projects,
        ZoneId::Experience,
        ZoneId::Contact,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Zone at `index`, or Landing when the index is out of range.
    pub fn from_index(index: usize) -> ZoneId {
        ZoneId::ALL.get(index).copied().unwrap_or(ZoneId::Landing)
    }

    /// Lenient lookup; unknown ids fall back to Landing.
    pub fn parse(s: &str) -> ZoneId {
        match s.trim().to_ascii_lowercase().as_str() {
            "landing" => ZoneId::Landing,
            "about" => ZoneId::About,
            "skills" => ZoneId::Skills,
            "projects" => ZoneId::Projects,
            "experience" => ZoneId::Experience,
            "contact" => ZoneId::Contact,
            other => {
                log::warn!("Unknown zone id '{}', using landing", other);
                ZoneId::Landing
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ZoneId::Landing => "landing",
            ZoneId::About => "about",
            ZoneId::Skills => "skills",
            ZoneId::Projects => "projects",
            ZoneId::Experience => "experience",
            ZoneId::Contact => "contact",
        }
    }
}

impl From<String> for ZoneId {
    fn from(s: String) -> Self {
        ZoneId::parse(&s)
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Autoplay speed multiplier; only 1x, 2x and 3x exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PlaybackSpeed {
    #[default]
    X1,
    X2,
    X3,
}

impl PlaybackSpeed {
    #[inline]
    pub fn multiplier(self) -> f32 {
        match self {
            PlaybackSpeed::X1 => 1.0,
            PlaybackSpeed::X2 => 2.0,
            PlaybackSpeed::X3 => 3.0,
        }
    }
}

impl TryFrom<u8> for PlaybackSpeed {
    type Error = EngineError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(PlaybackSpeed::X1),
            2 => Ok(PlaybackSpeed::X2),
            3 => Ok(PlaybackSpeed::X3),
            other => Err(EngineError::InvalidSpeed(other)),
        }
    }
}

impl From<PlaybackSpeed> for u8 {
    fn from(speed: PlaybackSpeed) -> u8 {
        match speed {
            PlaybackSpeed::X1 => 1,
            PlaybackSpeed::X2 => 2,
            PlaybackSpeed::X3 => 3,
        }
    }
}

/// Which camera routine owns the render camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraMode {
    #[default]
    Autoplay,
    Explore,
}

/// Passive on-screen message; the only user-visible failure surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hint {
    #[default]
    None,
    ClickToExplore,
    Loading,
}
