// zones.rs - Per-theme zone tables and authored camera paths
//
// Built-in tables for both themes, plus loading of replacement tables from
// JSON. Pure data: the only behavior here is validation and nearest-zone
// lookup.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::animation::{Easing, Vec3};
use crate::error_handling::{EngineError, Result};
use crate::types::{Theme, ZoneId, ZONE_COUNT};

/// A named region of content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub description: String,
    pub world_position: Vec3,
}

/// Authored camera keyframe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub position: Vec3,
    pub target: Vec3,
    /// Normalized timeline position in [0, 1]
    pub time: f32,
    #[serde(default)]
    pub easing: Easing,
}

/// How zone proximity is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceMetric {
    /// Full 3D distance (autoplay)
    Spatial,
    /// X/Z plane only (free-look)
    Horizontal,
}

/// One theme's zones and camera path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeDirectory {
    zones: [Zone; ZONE_COUNT],
    waypoints: Vec<Waypoint>,
}

impl ThemeDirectory {
    pub fn new(zones: [Zone; ZONE_COUNT], waypoints: Vec<Waypoint>) -> Self {
        Self { zones, waypoints }
    }

    pub fn zones(&self) -> &[Zone; ZONE_COUNT] {
        &self.zones
    }

    pub fn zone(&self, id: ZoneId) -> &Zone {
        &self.zones[id.index()]
    }

    /// Zone by position in the table, for untyped indices from the HUD or scripts.
    pub fn zone_at(&self, index: usize) -> Result<&Zone> {
        self.zones.get(index).ok_or(EngineError::ZoneOutOfRange {
            index,
            count: ZONE_COUNT,
        })
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    /// Nearest zone to `position` and its distance under `metric`.
    pub fn nearest_zone(&self, position: Vec3, metric: DistanceMetric) -> (ZoneId, f32) {
        let mut best = (self.zones[0].id, f32::INFINITY);
        for zone in &self.zones {
            let d = match metric {
                DistanceMetric::Spatial => position.distance(zone.world_position),
                DistanceMetric::Horizontal => position.horizontal_distance(zone.world_position),
            };
            if d < best.1 {
                best = (zone.id, d);
            }
        }
        best
    }

    fn validate(&self, theme: Theme) -> Result<()> {
        for (i, zone) in self.zones.iter().enumerate() {
            if zone.id.index() != i {
                return Err(EngineError::directory(
                    theme,
                    format!("zone '{}' listed at position {}", zone.id, i),
                ));
            }
        }

        if self.waypoints.len() < 2 {
            return Err(EngineError::directory(theme, "camera path needs at least two waypoints"));
        }

        for pair in self.waypoints.windows(2) {
            if pair[1].time <= pair[0].time {
                return Err(EngineError::directory(
                    theme,
                    format!("waypoint times not increasing at {}", pair[1].time),
                ));
            }
        }

        if let Some(bad) = self
            .waypoints
            .iter()
            .find(|wp| !(0.0..=1.0).contains(&wp.time))
        {
            return Err(EngineError::directory(
                theme,
                format!("waypoint time {} outside [0, 1]", bad.time),
            ));
        }

        Ok(())
    }
}

/// Zone tables for every theme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneDirectory {
    cyberpunk: ThemeDirectory,
    nature: ThemeDirectory,
}

impl ZoneDirectory {
    pub fn theme(&self, theme: Theme) -> &ThemeDirectory {
        match theme {
            Theme::Cyberpunk => &self.cyberpunk,
            Theme::Nature => &self.nature,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let directory: ZoneDirectory = serde_json::from_str(json)?;
        directory.validate()?;
        Ok(directory)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let directory = Self::from_json_str(&contents)?;
        log::info!("Loaded zone directory from {}", path.display());
        Ok(directory)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        for theme in Theme::ALL {
            self.theme(theme).validate(theme)?;
        }
        Ok(())
    }

    /// Built-in tables shipped with the engine
    pub fn builtin() -> Self {
        Self {
            cyberpunk: builtin_theme(CYBERPUNK_ZONES),
            nature: builtin_theme(NATURE_ZONES),
        }
    }
}

impl Default for ZoneDirectory {
    fn default() -> Self {
        Self::builtin()
    }
}

// ============================================================================
// BUILT-IN TABLES
// ============================================================================

type ZoneSeed = (ZoneId, &'static str, &'static str, [f32; 3]);

const CYBERPUNK_ZONES: [ZoneSeed; ZONE_COUNT] = [
    (ZoneId::Landing, "Neon Gate", "Rain-slick plaza where the tour begins", [0.0, 0.0, 0.0]),
    (ZoneId::About, "Data Shrine", "Holographic biography and background", [12.0, 0.0, -40.0]),
    (ZoneId::Skills, "Circuit Market", "Stalls of languages, tools and frameworks", [-12.0, 0.0, -80.0]),
    (ZoneId::Projects, "Arcade Tower", "Playable cabinets for each project", [12.0, 0.0, -120.0]),
    (ZoneId::Experience, "Corporate Spire", "Floors of past roles and teams", [-12.0, 0.0, -160.0]),
    (ZoneId::Contact, "Signal Rooftop", "Broadcast antenna with contact links", [0.0, 0.0, -200.0]),
];

const NATURE_ZONES: [ZoneSeed; ZONE_COUNT] = [
    (ZoneId::Landing, "Forest Clearing", "Sunlit meadow at the trailhead", [0.0, 0.0, 0.0]),
    (ZoneId::About, "Old Oak", "Story carved into the rings of a tree", [40.0, 2.0, -30.0]),
    (ZoneId::Skills, "Crystal Stream", "Stones in the water, one per skill", [60.0, 4.0, -80.0]),
    (ZoneId::Projects, "Waterfall Ledge", "Projects glimpsed through the spray", [30.0, 6.0, -125.0]),
    (ZoneId::Experience, "Mountain Path", "Trail markers of past roles", [-20.0, 4.0, -140.0]),
    (ZoneId::Contact, "Summit Lookout", "Signal fire and contact links", [-55.0, 2.0, -105.0]),
];

/// Camera rests behind and above each zone
const VIEW_OFFSET: Vec3 = Vec3::new(0.0, 3.0, 10.0);
const LOOK_OFFSET: Vec3 = Vec3::new(0.0, 1.0, 0.0);
/// Final push-in toward the last zone
const FINAL_OFFSET: Vec3 = Vec3::new(0.0, 2.0, 7.0);

/// Zone `i` is reached at `i / ZONE_COUNT`; the last zone holds until 1.0.
fn builtin_theme(seeds: [ZoneSeed; ZONE_COUNT]) -> ThemeDirectory {
    let zones = seeds.map(|(id, name, description, position)| Zone {
        id,
        name: name.to_string(),
        description: description.to_string(),
        world_position: position.into(),
    });

    let mut waypoints: Vec<Waypoint> = zones
        .iter()
        .enumerate()
        .map(|(i, zone)| Waypoint {
            position: zone.world_position + VIEW_OFFSET,
            target: zone.world_position + LOOK_OFFSET,
            time: i as f32 / ZONE_COUNT as f32,
            easing: Easing::EaseInOut,
        })
        .collect();

    let last = &zones[ZONE_COUNT - 1];
    waypoints.push(Waypoint {
        position: last.world_position + FINAL_OFFSET,
        target: last.world_position + LOOK_OFFSET,
        time: 1.0,
        easing: Easing::EaseOut,
    });

    ThemeDirectory::new(zones, waypoints)
}
