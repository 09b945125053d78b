// config.rs - Tunable engine constants, loadable from JSON
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::animation::DEFAULT_TENSION;
use crate::error_handling::Result;

/// Every engine tunable in one place. Missing JSON fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // Timeline
    pub total_duration: f32, // seconds for a full autoplay traversal
    pub spline_tension: f32,
    pub smoothing_base: f32, // share of remaining distance left after one second
    pub detection_radius: f32,

    // Free-look
    pub sensitivity: f32, // radians per pixel of pointer movement
    pub base_speed: f32,  // world units per second
    pub sprint_multiplier: f32,
    pub damping: f32,     // velocity blend per frame
    pub pitch_limit: f32, // radians, just short of 90 degrees

    // Touch gestures
    pub swipe_distance: f32, // pixels
    pub swipe_max_duration: f32,
    pub tap_slop: f32,
    pub tap_max_duration: f32,
    pub double_tap_window: f32,

    // Audio
    pub crossfade_duration: f32,

    // Frame statistics
    pub fps_window: usize,
    pub low_fps_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            total_duration: 60.0,
            spline_tension: DEFAULT_TENSION,
            smoothing_base: 0.001,
            detection_radius: 15.0,

            sensitivity: 0.002,
            base_speed: 8.0,
            sprint_multiplier: 2.0,
            damping: 0.15,
            pitch_limit: std::f32::consts::FRAC_PI_2 - 0.01,

            swipe_distance: 50.0,
            swipe_max_duration: 0.5,
            tap_slop: 10.0,
            tap_max_duration: 0.3,
            double_tap_window: 0.3,

            crossfade_duration: 1.5,

            fps_window: 60,
            low_fps_threshold: 30.0,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&contents)?;
        log::info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Replace values that would break the frame loop with defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = EngineConfig::default();
        if !(self.total_duration > 0.0) {
            log::warn!("total_duration {} is not positive, using {}", self.total_duration, defaults.total_duration);
            self.total_duration = defaults.total_duration;
        }
        if !(self.smoothing_base > 0.0 && self.smoothing_base < 1.0) {
            log::warn!("smoothing_base {} outside (0, 1), using {}", self.smoothing_base, defaults.smoothing_base);
            self.smoothing_base = defaults.smoothing_base;
        }
        self.damping = self.damping.clamp(0.0, 1.0);
        self.pitch_limit = self.pitch_limit.clamp(0.0, defaults.pitch_limit);
        self.fps_window = self.fps_window.max(1);
        self
    }
}
