// animation/autoplay.rs - Cinematic camera driven along the authored path
//
// Per frame, in this order: advance time, sample the spline, smooth the actual
// pose toward the sample, detect the nearest zone.

use super::{smoothing_factor, PathSample, SplinePath, Vec3};
use crate::camera::{CameraPose, Orientation};
use crate::config::EngineConfig;
use crate::timeline::TimelineStore;
use crate::types::ZoneId;
use crate::zones::{DistanceMetric, ThemeDirectory};

/// Result of one autoplay frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoplayFrame {
    pub pose: CameraPose,
    pub sample: PathSample,
    pub zone: ZoneId,
    pub zone_changed: bool,
}

/// Autoplay camera driver
pub struct AutoplayDriver {
    // Actual (smoothed) camera state
    position: Vec3,
    look_target: Vec3,

    // Cut generation the pose was last snapped for; None before the first frame
    synced_cut: Option<u64>,

    // Animation parameters
    smoothing_base: f32,
    tension: f32,
    detection_radius: f32,
}

impl AutoplayDriver {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            position: Vec3::zero(),
            look_target: Vec3::zero(),
            synced_cut: None,
            smoothing_base: config.smoothing_base,
            tension: config.spline_tension,
            detection_radius: config.detection_radius,
        }
    }

    /// Forget the current pose; the next frame snaps onto the path.
    pub fn reset(&mut self) {
        self.synced_cut = None;
    }

    /// Continue from wherever the camera is now, smoothing back onto the path
    /// instead of snapping. `cut` is the store's current cut generation.
    pub fn seed_from_pose(&mut self, pose: &CameraPose, cut: u64) {
        let reach = (self.look_target - self.position).length().max(1.0);
        self.position = pose.position;
        self.look_target = match pose.orientation {
            Orientation::LookAt(target) => target,
            Orientation::Rotation(_) => pose.position + pose.direction() * reach,
        };
        self.synced_cut = Some(cut);
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose::look_at(self.position, self.look_target)
    }

    /// Run one frame against the store and the active theme's table.
    pub fn update(&mut self, dt: f32, store: &TimelineStore, table: &ThemeDirectory) -> AutoplayFrame {
        let (playing, current_time, total, speed, cut) = store.select(|s| {
            (
                s.is_playing(),
                s.current_time(),
                s.total_duration(),
                s.playback_speed,
                s.cut_generation,
            )
        });

        // 1. Advance time; hold at the end without looping or pausing
        let mut time = current_time;
        if playing && dt > 0.0 {
            time = (current_time + dt * speed.multiplier()).min(total);
            store.advance_time(time);
        }

        // 2. Sample the authored path
        let spline = SplinePath::new(table.waypoints(), self.tension);
        let sample = spline.sample(time / total);

        // 3. Smooth toward the sample, or snap after a cut
        if self.synced_cut != Some(cut) {
            self.position = sample.position;
            self.look_target = sample.target;
            self.synced_cut = Some(cut);
        } else {
            let k = smoothing_factor(self.smoothing_base, dt);
            self.position += (sample.position - self.position) * k;
            self.look_target += (sample.target - self.look_target) * k;
        }

        // 4. Pose for the render camera
        let pose = self.pose();

        // 5. Nearest zone by full 3D distance
        let (zone, distance) = table.nearest_zone(self.position, DistanceMetric::Spatial);
        let zone_changed = store.enter_zone(zone, distance < self.detection_radius);

        AutoplayFrame {
            pose,
            sample,
            zone,
            zone_changed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PlaybackSpeed, Theme};
    use crate::zones::ZoneDirectory;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn setup() -> (AutoplayDriver, TimelineStore, ThemeDirectory) {
        let config = EngineConfig::default();
        let store = TimelineStore::new(config.total_duration);
        store.select_experience(Theme::Cyberpunk);
        let table = ZoneDirectory::builtin().theme(Theme::Cyberpunk).clone();
        (AutoplayDriver::new(&config), store, table)
    }

    #[test]
    fn test_first_frame_snaps_to_path() {
        let (mut driver, store, table) = setup();
        store.pause();
        let frame = driver.update(DT, &store, &table);
        assert!((frame.pose.position - table.waypoints()[0].position).length() < 1e-4);
        assert_eq!(frame.zone, ZoneId::Landing);
    }

    #[test]
    fn test_time_advances_by_speed() {
        let (mut driver, store, table) = setup();
        driver.update(0.5, &store, &table);
        assert!((store.select(|s| s.current_time()) - 0.5).abs() < 1e-5);

        store.set_playback_speed(PlaybackSpeed::X2);
        driver.update(0.5, &store, &table);
        assert!((store.select(|s| s.current_time()) - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_paused_time_is_frozen() {
        let (mut driver, store, table) = setup();
        driver.update(1.0, &store, &table);
        store.pause();
        for _ in 0..30 {
            driver.update(DT, &store, &table);
        }
        assert!((store.select(|s| s.current_time()) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_clamps_at_end_and_keeps_playing() {
        let (mut driver, store, table) = setup();
        store.set_current_time(59.5);
        driver.update(2.0, &store, &table);
        let s = store.snapshot();
        assert_eq!(s.current_time(), 60.0);
        assert_eq!(s.progress(), 100.0);
        assert!(s.is_playing());
        driver.update(2.0, &store, &table);
        assert_eq!(store.select(|s| s.current_time()), 60.0);
    }

    #[test]
    fn test_smoothing_lags_then_converges() {
        let (mut driver, store, table) = setup();
        driver.update(DT, &store, &table);
        store.pause();
        // Nudge the path under the camera without a cut
        store.advance_time(5.0);
        let first = driver.update(DT, &store, &table);
        assert!((first.pose.position - first.sample.position).length() > 1e-3);
        for _ in 0..600 {
            driver.update(DT, &store, &table);
        }
        let settled = driver.update(DT, &store, &table);
        assert!((settled.pose.position - settled.sample.position).length() < 1e-3);
    }

    #[test]
    fn test_jump_is_a_hard_cut() {
        let (mut driver, store, table) = setup();
        driver.update(DT, &store, &table);
        store.pause();
        store.jump_to_zone(4);
        let frame = driver.update(DT, &store, &table);
        assert!((frame.pose.position - table.waypoints()[4].position).length() < 0.05);
        assert_eq!(frame.zone, ZoneId::Experience);
        assert_eq!(store.select(|s| s.current_zone_index), 4);
    }

    #[test]
    fn test_seeded_pose_smooths_back_to_path() {
        let (mut driver, store, table) = setup();
        store.pause();
        driver.update(DT, &store, &table);
        let on_path = driver.pose().position;

        let away = on_path + Vec3::new(40.0, 0.0, 0.0);
        let cut = store.select(|s| s.cut_generation);
        driver.seed_from_pose(&CameraPose::look_at(away, away + Vec3::new(0.0, 0.0, -10.0)), cut);
        let frame = driver.update(DT, &store, &table);

        let step = (frame.pose.position - away).length();
        assert!(step > 0.0);
        assert!(step < 0.25 * 40.0, "moved {step} in one frame");
    }

    #[test]
    fn test_cut_after_seed_still_snaps() {
        let (mut driver, store, table) = setup();
        store.pause();
        let away = Vec3::new(500.0, 3.0, 0.0);
        driver.seed_from_pose(&CameraPose::look_at(away, Vec3::zero()), store.select(|s| s.cut_generation));
        store.jump_to_zone(2);
        let frame = driver.update(DT, &store, &table);
        assert!((frame.pose.position - frame.sample.position).length() < 1e-4);
    }

    proptest! {
        #[test]
        fn prop_speed_scales_time_advance(speed in 1u8..=3, steps in 1usize..120) {
            let (mut driver, store, table) = setup();
            store.set_playback_speed(PlaybackSpeed::try_from(speed).unwrap());
            for _ in 0..steps {
                driver.update(DT, &store, &table);
            }
            let expected = (steps as f32 * DT * speed as f32).min(60.0);
            prop_assert!((store.select(|s| s.current_time()) - expected).abs() < 1e-3);
        }
    }
}
