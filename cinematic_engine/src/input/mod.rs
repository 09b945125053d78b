// input/mod.rs - Raw host input and the engine commands it maps to
//
// Hosts push `InputEvent`s into the intent queue from any thread. The
// orchestrator drains the queue at the start of each tick, translates events
// into `Command`s and applies them in arrival order.

pub mod gesture;
pub mod keyboard;
pub mod queue;

pub use gesture::*;
pub use keyboard::*;
pub use queue::*;

use serde::{Deserialize, Serialize};

use crate::animation::MoveAxis;
use crate::types::{CameraMode, PlaybackSpeed, Theme};

/// Something the host observed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    /// Relative pointer movement in pixels
    PointerMove { dx: f32, dy: f32 },
    /// Primary click on the render surface
    PointerClick,
    /// Outcome of a pointer-lock request, or loss of the lock
    PointerLockChanged(bool),
    TouchStart { x: f32, y: f32 },
    TouchEnd { x: f32, y: f32 },
    /// A HUD control invoked directly
    Command(Command),
}

/// Engine-level intent, independent of the device that produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Command {
    SelectExperience(Theme),
    Reset,

    Play,
    Pause,
    TogglePlayPause,
    SetSpeed(PlaybackSpeed),
    /// Scrub to a percentage of the timeline
    Seek(f32),

    JumpZone(usize),
    StepZone(i32),

    ToggleMute,
    SetVolume(f32),

    ToggleZoneMenu,
    SetZoneMenu(bool),
    ToggleControls,
    SetControls(bool),
    ToggleFullscreen,

    SetCameraMode(CameraMode),
    RequestPointerLock,
    ReleasePointerLock,
    Move { axis: MoveAxis, held: bool },
    Look { dx: f32, dy: f32 },
}

/// State the input mappers consult when an event arrives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputContext {
    pub experience_selected: bool,
    pub free_look_active: bool,
    pub pointer_locked: bool,
    pub zone_menu_open: bool,
}

impl InputContext {
    pub fn from_state(state: &crate::timeline::TimelineState) -> Self {
        Self {
            experience_selected: state.is_experience_selected(),
            free_look_active: state.camera_mode == CameraMode::Explore && state.pointer_locked,
            pointer_locked: state.pointer_locked,
            zone_menu_open: state.show_zone_menu,
        }
    }
}
