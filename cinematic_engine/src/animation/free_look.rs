// animation/free_look.rs - First-person explore camera
use serde::{Deserialize, Serialize};

use super::{forward_from_yaw_pitch, yaw_pitch_from_direction, Quat, Vec3};
use crate::camera::{CameraPose, Orientation};
use crate::config::EngineConfig;
use crate::types::ZoneId;
use crate::zones::{DistanceMetric, ThemeDirectory};

/// Held movement input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveAxis {
    Forward,
    Back,
    Left,
    Right,
    Up,
    Down,
    Sprint,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct MoveKeys {
    forward: bool,
    back: bool,
    left: bool,
    right: bool,
    up: bool,
    down: bool,
    sprint: bool,
}

impl MoveKeys {
    fn set(&mut self, axis: MoveAxis, held: bool) {
        let slot = match axis {
            MoveAxis::Forward => &mut self.forward,
            MoveAxis::Back => &mut self.back,
            MoveAxis::Left => &mut self.left,
            MoveAxis::Right => &mut self.right,
            MoveAxis::Up => &mut self.up,
            MoveAxis::Down => &mut self.down,
            MoveAxis::Sprint => &mut self.sprint,
        };
        *slot = held;
    }
}

#[inline]
fn axis_value(positive: bool, negative: bool) -> f32 {
    (positive as i8 - negative as i8) as f32
}

/// Result of one free-look frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreeLookFrame {
    pub pose: CameraPose,
    pub zone: ZoneId,
    pub distance: f32,
}

/// Yaw/pitch camera with damped WASD movement.
pub struct FreeLookController {
    yaw: f32,
    pitch: f32,
    position: Vec3,
    velocity: Vec3,
    keys: MoveKeys,

    sensitivity: f32,
    base_speed: f32,
    sprint_multiplier: f32,
    damping: f32,
    pitch_limit: f32,
}

impl FreeLookController {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            position: Vec3::zero(),
            velocity: Vec3::zero(),
            keys: MoveKeys::default(),
            sensitivity: config.sensitivity,
            base_speed: config.base_speed,
            sprint_multiplier: config.sprint_multiplier,
            damping: config.damping,
            pitch_limit: config.pitch_limit,
        }
    }

    /// Take over from another camera without a visible jump.
    pub fn seed_from_pose(&mut self, pose: &CameraPose) {
        self.position = pose.position;
        let (yaw, pitch) = yaw_pitch_from_direction(pose.direction());
        self.yaw = yaw;
        self.pitch = pitch.clamp(-self.pitch_limit, self.pitch_limit);
        self.velocity = Vec3::zero();
    }

    /// Pointer movement in pixels. Positive `dx` turns right, positive `dy` looks down.
    pub fn look(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * self.sensitivity;
        self.pitch = (self.pitch - dy * self.sensitivity).clamp(-self.pitch_limit, self.pitch_limit);
    }

    pub fn set_key(&mut self, axis: MoveAxis, held: bool) {
        self.keys.set(axis, held);
    }

    /// Drop all held keys, e.g. when pointer lock is lost.
    pub fn release_keys(&mut self) {
        self.keys = MoveKeys::default();
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.position,
            orientation: Orientation::Rotation(Quat::from_yaw_pitch(self.yaw, self.pitch)),
        }
    }

    /// Full view direction including pitch
    pub fn forward(&self) -> Vec3 {
        forward_from_yaw_pitch(self.yaw, self.pitch)
    }

    /// Integrate one frame of movement and report the nearest zone on the ground plane.
    pub fn update(&mut self, dt: f32, table: &ThemeDirectory) -> FreeLookFrame {
        let dt = dt.max(0.0);

        // Movement stays horizontal regardless of pitch
        let (sy, cy) = self.yaw.sin_cos();
        let forward = Vec3::new(-sy, 0.0, -cy);
        let right = Vec3::new(cy, 0.0, -sy);

        let k = self.keys;
        let direction = forward * axis_value(k.forward, k.back)
            + right * axis_value(k.right, k.left)
            + Vec3::UP * axis_value(k.up, k.down);

        let mut speed = self.base_speed;
        if k.sprint {
            speed *= self.sprint_multiplier;
        }
        let desired = direction.normalize() * speed;

        // Damping is tuned per 60 Hz frame
        let blend = 1.0 - (1.0 - self.damping).powf(dt * 60.0);
        self.velocity = self.velocity.lerp(desired, blend);
        self.position += self.velocity * dt;

        let (zone, distance) = table.nearest_zone(self.position, DistanceMetric::Horizontal);
        FreeLookFrame {
            pose: self.pose(),
            zone,
            distance,
        }
    }
}
