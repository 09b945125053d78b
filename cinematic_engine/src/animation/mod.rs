// animation/mod.rs - Camera timeline animation system

pub mod easing;
pub mod spline;
pub mod autoplay;
pub mod free_look;
pub mod audio_mix;
pub mod orchestrator;

pub use easing::*;
pub use spline::*;
pub use autoplay::*;
pub use free_look::*;
pub use audio_mix::*;
pub use orchestrator::*;

use serde::{Serialize, Deserialize};

// ============================================================================
// CORE MATH TYPES
// ============================================================================

/// 3D vector, serialized as `[x, y, z]`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    #[inline]
    pub fn lerp(self, other: Vec3, t: f32) -> Vec3 {
        // Clamp t to [0, 1] for safety
        let t = t.clamp(0.0, 1.0);
        Vec3::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
            self.z + (other.z - self.z) * t,
        )
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    #[inline]
    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    #[inline]
    pub fn distance(self, other: Vec3) -> f32 {
        (self - other).length()
    }

    /// Distance on the ground (X/Z) plane, height ignored
    #[inline]
    pub fn horizontal_distance(self, other: Vec3) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }

    #[inline]
    pub fn normalize(self) -> Vec3 {
        let len_sq = self.length_squared();
        if len_sq > 1e-20 {
            let inv_len = 1.0 / len_sq.sqrt();
            Vec3::new(self.x * inv_len, self.y * inv_len, self.z * inv_len)
        } else {
            Vec3::zero()
        }
    }

    #[inline]
    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }
}

// Implement operators for Vec3
impl std::ops::Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl std::ops::AddAssign for Vec3 {
    #[inline]
    fn add_assign(&mut self, other: Vec3) {
        *self = *self + other;
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl std::ops::Mul<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, scalar: f32) -> Vec3 {
        Vec3::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl std::ops::Div<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn div(self, scalar: f32) -> Vec3 {
        let inv = 1.0 / scalar;
        Vec3::new(self.x * inv, self.y * inv, self.z * inv)
    }
}

impl std::ops::Neg for Vec3 {
    type Output = Vec3;
    #[inline]
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl From<[f32; 3]> for Vec3 {
    #[inline]
    fn from(arr: [f32; 3]) -> Self {
        Vec3::new(arr[0], arr[1], arr[2])
    }
}

impl From<Vec3> for [f32; 3] {
    #[inline]
    fn from(v: Vec3) -> [f32; 3] {
        [v.x, v.y, v.z]
    }
}

// ============================================================================
// ORIENTATION
// ============================================================================

/// Unit quaternion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Quat = Quat { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// Yaw about +Y first, then pitch about the local X axis.
    pub fn from_yaw_pitch(yaw: f32, pitch: f32) -> Quat {
        let (sy, cy) = (yaw * 0.5).sin_cos();
        let (sp, cp) = (pitch * 0.5).sin_cos();
        // q_yaw * q_pitch
        Quat {
            x: cy * sp,
            y: sy * cp,
            z: -sy * sp,
            w: cy * cp,
        }
    }

    /// Rotate a vector by this quaternion
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let u = Vec3::new(self.x, self.y, self.z);
        let t = u.cross(v) * 2.0;
        v + t * self.w + u.cross(t)
    }
}

impl Default for Quat {
    fn default() -> Self {
        Quat::IDENTITY
    }
}

/// Camera forward for a yaw/pitch pair. Yaw 0 looks down -Z.
#[inline]
pub fn forward_from_yaw_pitch(yaw: f32, pitch: f32) -> Vec3 {
    let (sy, cy) = yaw.sin_cos();
    let (sp, cp) = pitch.sin_cos();
    Vec3::new(-sy * cp, sp, -cy * cp)
}

/// Inverse of `forward_from_yaw_pitch` for a non-zero direction.
pub fn yaw_pitch_from_direction(direction: Vec3) -> (f32, f32) {
    let d = direction.normalize();
    if d == Vec3::zero() {
        return (0.0, 0.0);
    }
    let yaw = (-d.x).atan2(-d.z);
    let pitch = d.y.clamp(-1.0, 1.0).asin();
    (yaw, pitch)
}

// ============================================================================
// UTILITY FUNCTIONS
// ============================================================================

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Frame-rate independent smoothing weight: `1 - base^dt`.
///
/// `base` is the fraction of the remaining distance left after one second.
#[inline]
pub fn smoothing_factor(base: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return 0.0;
    }
    (1.0 - base.powf(dt)).clamp(0.0, 1.0)
}
