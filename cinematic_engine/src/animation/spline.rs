// animation/spline.rs - Catmull-Rom path sampler for authored camera paths
//
// Maps a normalized timeline position to a camera position and look-at target.
// Pure functions only; the autoplay driver owns all state.

use serde::{Deserialize, Serialize};

use super::Vec3;
use crate::zones::Waypoint;

/// Default Catmull-Rom tension (0.5 = classic uniform Catmull-Rom)
pub const DEFAULT_TENSION: f32 = 0.5;

/// Interpolated camera pose on the authored path
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PathSample {
    pub position: Vec3,
    pub target: Vec3,
}

/// Cardinal (Catmull-Rom) interpolation between `p1` and `p2`.
/// Passes through `p1` at `t = 0` and `p2` at `t = 1`.
#[inline]
pub fn catmull_rom(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32, tension: f32) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;
    let s = tension;

    let a = (p2 - p0) * s;
    let b = p0 * (2.0 * s) + p1 * (s - 3.0) + p2 * (3.0 - 2.0 * s) - p3 * s;
    let c = p0 * (-s) + p1 * (2.0 - s) + p2 * (s - 2.0) + p3 * s;

    p1 + a * t + b * t2 + c * t3
}

/// Segment index `i` such that `waypoints[i].time <= t < waypoints[i + 1].time`,
/// clamped to the first and last segments.
fn locate_segment(waypoints: &[Waypoint], t: f32) -> usize {
    let passed = waypoints.partition_point(|wp| wp.time <= t);
    passed.saturating_sub(1).min(waypoints.len() - 2)
}

/// Sample an authored path at `normalized_time`.
///
/// Each segment's local parameter is eased with the easing of the waypoint that
/// opens the segment, then fed through Catmull-Rom using the four surrounding
/// waypoints (first/last repeated at the ends). Position and target are
/// interpolated independently.
pub fn sample(waypoints: &[Waypoint], normalized_time: f32, tension: f32) -> PathSample {
    match waypoints.len() {
        0 => return PathSample::default(),
        1 => {
            return PathSample {
                position: waypoints[0].position,
                target: waypoints[0].target,
            }
        }
        _ => {}
    }

    let t = if normalized_time.is_finite() { normalized_time } else { 0.0 };
    let i = locate_segment(waypoints, t);
    let start = &waypoints[i];
    let end = &waypoints[i + 1];

    let span = end.time - start.time;
    let local_t = if span.abs() <= f32::EPSILON {
        0.0
    } else {
        ((t - start.time) / span).clamp(0.0, 1.0)
    };
    let eased = start.easing.apply(local_t);

    let before = &waypoints[i.saturating_sub(1)];
    let after = &waypoints[(i + 2).min(waypoints.len() - 1)];

    PathSample {
        position: catmull_rom(
            before.position,
            start.position,
            end.position,
            after.position,
            eased,
            tension,
        ),
        target: catmull_rom(
            before.target,
            start.target,
            end.target,
            after.target,
            eased,
            tension,
        ),
    }
}

/// A theme's camera path bundled with its tension
#[derive(Debug, Clone)]
pub struct SplinePath<'a> {
    waypoints: &'a [Waypoint],
    tension: f32,
}

impl<'a> SplinePath<'a> {
    pub fn new(waypoints: &'a [Waypoint], tension: f32) -> Self {
        Self { waypoints, tension }
    }

    #[inline]
    pub fn sample(&self, normalized_time: f32) -> PathSample {
        sample(self.waypoints, normalized_time, self.tension)
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        self.waypoints
    }
}
