// input/keyboard.rs - Keyboard shortcut table and free-look key bindings
use serde::{Deserialize, Serialize};

use super::{Command, InputContext};
use crate::animation::MoveAxis;
use crate::types::PlaybackSpeed;

/// Physical keys the engine reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Key {
    Space,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Enter,
    Escape,
    Digit1,
    Digit2,
    Digit3,
    KeyM,
    KeyS,
    KeyF,
    KeyH,
    KeyW,
    KeyA,
    KeyD,
    KeyE,
    KeyQ,
    KeyC,
    Shift,
}

impl Key {
    /// Parse a DOM `KeyboardEvent.code` value. Unbound keys return None.
    pub fn from_code(code: &str) -> Option<Key> {
        let key = match code {
            "Space" => Key::Space,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "Enter" | "NumpadEnter" => Key::Enter,
            "Escape" => Key::Escape,
            "Digit1" | "Numpad1" => Key::Digit1,
            "Digit2" | "Numpad2" => Key::Digit2,
            "Digit3" | "Numpad3" => Key::Digit3,
            "KeyM" => Key::KeyM,
            "KeyS" => Key::KeyS,
            "KeyF" => Key::KeyF,
            "KeyH" => Key::KeyH,
            "KeyW" => Key::KeyW,
            "KeyA" => Key::KeyA,
            "KeyD" => Key::KeyD,
            "KeyE" => Key::KeyE,
            "KeyQ" => Key::KeyQ,
            "KeyC" => Key::KeyC,
            "ShiftLeft" | "ShiftRight" => Key::Shift,
            _ => return None,
        };
        Some(key)
    }

    /// Free-look binding for this key, if any
    pub fn move_axis(self) -> Option<MoveAxis> {
        match self {
            Key::KeyW | Key::ArrowUp => Some(MoveAxis::Forward),
            Key::KeyS | Key::ArrowDown => Some(MoveAxis::Back),
            Key::KeyA | Key::ArrowLeft => Some(MoveAxis::Left),
            Key::KeyD | Key::ArrowRight => Some(MoveAxis::Right),
            Key::KeyE | Key::Space => Some(MoveAxis::Up),
            Key::KeyQ | Key::KeyC => Some(MoveAxis::Down),
            Key::Shift => Some(MoveAxis::Sprint),
            _ => None,
        }
    }
}

/// Map a key press to a command.
///
/// While free-look owns the keyboard, movement keys and Escape are captured;
/// every other key still goes through the shortcut table.
pub fn map_key_down(key: Key, ctx: &InputContext) -> Option<Command> {
    if ctx.free_look_active {
        if key == Key::Escape {
            return Some(Command::ReleasePointerLock);
        }
        if let Some(axis) = key.move_axis() {
            return Some(Command::Move { axis, held: true });
        }
    }

    match key {
        Key::Space => Some(Command::TogglePlayPause),
        Key::ArrowLeft => Some(Command::StepZone(-1)),
        Key::ArrowRight | Key::Enter => Some(Command::StepZone(1)),
        Key::Digit1 => Some(Command::SetSpeed(PlaybackSpeed::X1)),
        Key::Digit2 => Some(Command::SetSpeed(PlaybackSpeed::X2)),
        Key::Digit3 => Some(Command::SetSpeed(PlaybackSpeed::X3)),
        Key::KeyM => Some(Command::ToggleZoneMenu),
        Key::KeyS => Some(Command::ToggleMute),
        Key::KeyF => Some(Command::ToggleFullscreen),
        Key::KeyH => Some(Command::ToggleControls),
        Key::Escape => {
            if ctx.pointer_locked {
                Some(Command::ReleasePointerLock)
            } else if ctx.zone_menu_open {
                Some(Command::SetZoneMenu(false))
            } else if ctx.experience_selected {
                Some(Command::Reset)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Releases always reach free-look so a key held across a lock change never sticks.
pub fn map_key_up(key: Key) -> Option<Command> {
    key.move_axis().map(|axis| Command::Move { axis, held: false })
}
