// camera.rs - Render camera surface written by the camera routines
use bytemuck::{Pod, Zeroable};
use serde::Serialize;

use crate::animation::{Quat, Vec3};

/// How the camera is oriented this frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Orientation {
    /// Autoplay: orient toward a world-space point
    LookAt(Vec3),
    /// Free-look: rotation derived from yaw/pitch
    Rotation(Quat),
}

/// Full pose handed to the render camera every frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub orientation: Orientation,
}

impl CameraPose {
    pub fn look_at(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            orientation: Orientation::LookAt(target),
        }
    }

    /// Unit view direction
    pub fn direction(&self) -> Vec3 {
        match self.orientation {
            Orientation::LookAt(target) => {
                let d = (target - self.position).normalize();
                if d == Vec3::zero() {
                    Vec3::new(0.0, 0.0, -1.0)
                } else {
                    d
                }
            }
            Orientation::Rotation(q) => q.rotate(Vec3::new(0.0, 0.0, -1.0)).normalize(),
        }
    }

    /// Up vector orthogonal to the view direction
    pub fn up(&self) -> Vec3 {
        let direction = self.direction();
        let right = direction.cross(Vec3::UP).normalize();
        if right == Vec3::zero() {
            // Looking straight up or down
            return Vec3::new(0.0, 0.0, -1.0);
        }
        right.cross(direction).normalize()
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        CameraPose::look_at(Vec3::new(0.0, 3.0, 10.0), Vec3::zero())
    }
}

/// 64B std140-like uniform layout for GPU upload
#[repr(C, align(16))]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct CameraUniform {
    // 0..16
    pub camera_position: [f32; 3],
    pub _pad0: f32,
    // 16..32
    pub camera_direction: [f32; 3],
    pub _pad1: f32,
    // 32..48
    pub camera_up: [f32; 3],
    pub _pad2: f32,
    // 48..64
    pub camera_fov: f32,
    pub aspect_ratio: f32,
    pub _pad3: [f32; 2],
}

static_assertions::const_assert_eq!(std::mem::size_of::<CameraUniform>(), 64);

/// Host camera that keeps the last pose and exposes it as a uniform
#[derive(Debug, Clone)]
pub struct SceneCamera {
    pose: CameraPose,
    fov: f32,
    aspect_ratio: f32,
    frames_written: u64,
}

impl SceneCamera {
    pub fn new(fov_degrees: f32, aspect_ratio: f32) -> Self {
        Self {
            pose: CameraPose::default(),
            fov: fov_degrees.to_radians(),
            aspect_ratio,
            frames_written: 0,
        }
    }

    pub fn apply(&mut self, pose: &CameraPose) {
        self.pose = *pose;
        self.frames_written += 1;
    }

    pub fn pose(&self) -> &CameraPose {
        &self.pose
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            camera_position: self.pose.position.into(),
            _pad0: 0.0,
            camera_direction: self.pose.direction().into(),
            _pad1: 0.0,
            camera_up: self.pose.up().into(),
            _pad2: 0.0,
            camera_fov: self.fov,
            aspect_ratio: self.aspect_ratio,
            _pad3: [0.0; 2],
        }
    }
}

impl Default for SceneCamera {
    fn default() -> Self {
        Self::new(45.0, 16.0 / 9.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_look_at_direction_and_up() {
        let pose = CameraPose::look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::zero());
        assert!((pose.direction() - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
        assert!((pose.up() - Vec3::UP).length() < 1e-5);
    }

    #[test]
    fn test_rotation_orientation() {
        let pose = CameraPose {
            position: Vec3::zero(),
            orientation: Orientation::Rotation(Quat::from_yaw_pitch(std::f32::consts::FRAC_PI_2, 0.0)),
        };
        // Quarter turn left of -Z faces -X
        assert!((pose.direction() - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_uniform_bytes() {
        let mut camera = SceneCamera::default();
        camera.apply(&CameraPose::look_at(Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, 2.0, -3.0)));
        let uniform = camera.uniform();
        assert_eq!(uniform.camera_position, [1.0, 2.0, 3.0]);
        assert_eq!(bytemuck::bytes_of(&uniform).len(), 64);
        assert_eq!(camera.frames_written(), 1);
    }

    #[test]
    fn test_degenerate_look_at_has_fallback_direction() {
        let pose = CameraPose::look_at(Vec3::zero(), Vec3::zero());
        assert_eq!(pose.direction(), Vec3::new(0.0, 0.0, -1.0));
    }
}
