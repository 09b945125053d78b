// lib.rs - Library exports for cinematic-engine
// Camera timeline, zone navigation and input unification for a themed 3D tour

pub mod animation;
pub mod camera;
pub mod config;
pub mod error_handling;
pub mod input;
pub mod performance;
pub mod timeline;
pub mod types;
pub mod zones;

// Re-export commonly used types
pub use animation::{
    AudioMix, AudioMixer, AutoplayDriver, Easing, EngineHost, ExperienceOrchestrator, FreeLookController,
    MoveAxis, OrchestratorBuilder, PathSample, Quat, SplinePath, Vec3,
};
pub use camera::{CameraPose, CameraUniform, Orientation, SceneCamera};
pub use config::EngineConfig;
pub use error_handling::{EngineError, Result};
pub use input::{Command, InputEvent, IntentSender, Key};
pub use performance::{DeviceProfile, DeviceTier, FrameStats, QualityLevel};
pub use timeline::{Phase, TimelineState, TimelineStore};
pub use types::{CameraMode, Hint, PlaybackSpeed, Theme, ZoneId, ZONE_COUNT};
pub use zones::{ThemeDirectory, Waypoint, Zone, ZoneDirectory};
