// timeline.rs - Timeline state store
//
// The single shared mutable state of the engine. State lives inside a
// `tokio::sync::watch` channel: consumers subscribe or read through selectors,
// and only the named actions below can change it. Every action publishes one
// consistent snapshot, so `current_time` and `progress` are never observed out
// of step.

use serde::Serialize;
use std::collections::BTreeSet;
use tokio::sync::watch;

use crate::performance::{DeviceTier, QualityLevel};
use crate::types::{CameraMode, Hint, PlaybackSpeed, Theme, ZoneId, ZONE_COUNT};

/// Playback lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Unselected,
    Selecting,
    Playing,
    Paused,
}

/// Snapshot of everything the HUD, audio and zone content may read
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineState {
    pub phase: Phase,
    pub experience: Option<Theme>,
    pub playback_speed: PlaybackSpeed,
    current_time: f32,
    progress: f32,
    total_duration: f32,
    pub current_zone: ZoneId,
    pub current_zone_index: usize,
    pub visited_zones: BTreeSet<ZoneId>,
    pub is_muted: bool,
    pub volume: f32,
    pub quality_level: QualityLevel,
    pub device_tier: DeviceTier,
    pub fps: f64,
    pub show_controls: bool,
    pub show_zone_menu: bool,
    pub is_fullscreen: bool,
    pub is_transitioning: bool,
    pub is_loading: bool,
    pub camera_mode: CameraMode,
    pub pointer_locked: bool,
    /// Bumped on every hard cut (jump or scrub) so camera drivers can snap
    pub cut_generation: u64,
}

impl TimelineState {
    fn new(total_duration: f32) -> Self {
        Self {
            phase: Phase::Unselected,
            experience: None,
            playback_speed: PlaybackSpeed::X1,
            current_time: 0.0,
            progress: 0.0,
            total_duration,
            current_zone: ZoneId::Landing,
            current_zone_index: 0,
            visited_zones: BTreeSet::new(),
            is_muted: false,
            volume: 0.7,
            quality_level: QualityLevel::Medium,
            device_tier: DeviceTier::Mid,
            fps: 0.0,
            show_controls: true,
            show_zone_menu: false,
            is_fullscreen: false,
            is_transitioning: false,
            is_loading: false,
            camera_mode: CameraMode::Autoplay,
            pointer_locked: false,
            cut_generation: 0,
        }
    }

    #[inline]
    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    /// Percent of the timeline elapsed, always `100 * current_time / total_duration`
    #[inline]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    #[inline]
    pub fn total_duration(&self) -> f32 {
        self.total_duration
    }

    #[inline]
    pub fn normalized_time(&self) -> f32 {
        self.current_time / self.total_duration
    }

    pub fn is_experience_selected(&self) -> bool {
        self.experience.is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.phase == Phase::Paused
    }

    pub fn is_zone_active(&self, zone: ZoneId) -> bool {
        self.is_experience_selected() && self.current_zone == zone
    }

    /// Seconds of timeline allotted to each zone
    pub fn zone_span(&self) -> f32 {
        self.total_duration / ZONE_COUNT as f32
    }

    pub fn hint(&self) -> Hint {
        if self.is_loading {
            Hint::Loading
        } else if self.is_experience_selected()
            && self.camera_mode == CameraMode::Explore
            && !self.pointer_locked
        {
            Hint::ClickToExplore
        } else {
            Hint::None
        }
    }

    /// The one writer of time: clamps and recomputes progress together.
    fn write_time(&mut self, seconds: f32) {
        let t = if seconds.is_finite() { seconds } else { 0.0 };
        self.current_time = t.clamp(0.0, self.total_duration);
        self.progress = 100.0 * self.current_time / self.total_duration;
    }

    fn write_zone(&mut self, zone: ZoneId) {
        self.current_zone = zone;
        self.current_zone_index = zone.index();
    }

    /// Back to the pristine pre-selection state, keeping session-wide settings.
    fn clear_experience(&mut self) {
        let fresh = TimelineState::new(self.total_duration);
        *self = TimelineState {
            is_muted: self.is_muted,
            volume: self.volume,
            quality_level: self.quality_level,
            device_tier: self.device_tier,
            fps: self.fps,
            is_fullscreen: self.is_fullscreen,
            cut_generation: self.cut_generation + 1,
            visited_zones: BTreeSet::from([ZoneId::Landing]),
            ..fresh
        };
    }
}

/// Owner of the timeline state; all mutation goes through its actions
pub struct TimelineStore {
    tx: watch::Sender<TimelineState>,
}

impl TimelineStore {
    pub fn new(total_duration: f32) -> Self {
        let (tx, _rx) = watch::channel(TimelineState::new(total_duration));
        Self { tx }
    }

    // ------------------------------------------------------------------
    // Reading
    // ------------------------------------------------------------------

    /// New subscriber; sees the current snapshot and every later change.
    pub fn subscribe(&self) -> watch::Receiver<TimelineState> {
        self.tx.subscribe()
    }

    /// Read a projection of the current state.
    pub fn select<R>(&self, selector: impl FnOnce(&TimelineState) -> R) -> R {
        selector(&self.tx.borrow())
    }

    pub fn snapshot(&self) -> TimelineState {
        self.tx.borrow().clone()
    }

    fn update(&self, action: impl FnOnce(&mut TimelineState) -> bool) -> bool {
        self.tx.send_if_modified(action)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Open the experience chooser.
    pub fn begin_selection(&self) {
        self.update(|s| {
            if s.phase != Phase::Unselected {
                return false;
            }
            s.phase = Phase::Selecting;
            true
        });
    }

    /// Choose a theme: landing zone, time zero, playing.
    pub fn select_experience(&self, theme: Theme) {
        self.update(|s| {
            s.experience = Some(theme);
            s.phase = Phase::Playing;
            s.playback_speed = PlaybackSpeed::X1;
            s.write_time(0.0);
            s.write_zone(ZoneId::Landing);
            s.visited_zones = BTreeSet::from([ZoneId::Landing]);
            s.camera_mode = CameraMode::Autoplay;
            s.show_zone_menu = false;
            s.cut_generation += 1;
            true
        });
        log::info!("Experience selected: {}", theme);
    }

    /// Discard everything and return to the chooser-less start.
    pub fn reset_experience(&self) {
        self.update(|s| {
            s.clear_experience();
            true
        });
        log::info!("Experience reset");
    }

    // ------------------------------------------------------------------
    // Playback
    // ------------------------------------------------------------------

    pub fn play(&self) {
        self.update(|s| {
            if !s.is_experience_selected() || s.phase == Phase::Playing {
                return false;
            }
            s.phase = Phase::Playing;
            true
        });
    }

    pub fn pause(&self) {
        self.update(|s| {
            if !s.is_experience_selected() || s.phase == Phase::Paused {
                return false;
            }
            s.phase = Phase::Paused;
            true
        });
    }

    pub fn toggle_play_pause(&self) {
        self.update(|s| match s.phase {
            Phase::Playing => {
                s.phase = Phase::Paused;
                true
            }
            Phase::Paused => {
                s.phase = Phase::Playing;
                true
            }
            Phase::Unselected | Phase::Selecting => false,
        });
    }

    /// Takes effect on the next autoplay frame; no time jump.
    pub fn set_playback_speed(&self, speed: PlaybackSpeed) {
        self.update(|s| {
            if s.playback_speed == speed {
                return false;
            }
            s.playback_speed = speed;
            true
        });
    }

    // ------------------------------------------------------------------
    // Time and zones
    // ------------------------------------------------------------------

    /// Scrub to `seconds` (clamped). A hard cut.
    pub fn set_current_time(&self, seconds: f32) {
        self.update(|s| {
            if !s.is_experience_selected() {
                return false;
            }
            s.write_time(seconds);
            s.cut_generation += 1;
            true
        });
    }

    /// Scrub to `percent` of the timeline (clamped to [0, 100]). A hard cut.
    pub fn set_progress(&self, percent: f32) {
        let percent = if percent.is_finite() { percent.clamp(0.0, 100.0) } else { 0.0 };
        self.update(|s| {
            if !s.is_experience_selected() {
                return false;
            }
            s.write_time(percent / 100.0 * s.total_duration);
            s.cut_generation += 1;
            true
        });
    }

    /// Advance playback time without a cut; used by the autoplay driver.
    pub(crate) fn advance_time(&self, seconds: f32) {
        self.update(|s| {
            if s.current_time == seconds {
                return false;
            }
            s.write_time(seconds);
            true
        });
    }

    /// Hard cut to the start of zone `index`'s slice of the timeline.
    /// Out-of-range indices fall back to the landing zone.
    pub fn jump_to_zone(&self, index: usize) {
        let index = if index < ZONE_COUNT {
            index
        } else {
            log::warn!("Zone index {} out of range, jumping to landing", index);
            0
        };
        self.update(|s| {
            if !s.is_experience_selected() {
                return false;
            }
            let zone = ZoneId::from_index(index);
            s.write_time(index as f32 * s.zone_span());
            s.write_zone(zone);
            s.visited_zones.insert(zone);
            s.cut_generation += 1;
            true
        });
    }

    /// Jump relative to the current zone, clamped to the first and last zones.
    pub fn step_zone(&self, delta: i32) {
        let current = self.select(|s| s.current_zone_index) as i64;
        let target = (current + delta as i64).clamp(0, ZONE_COUNT as i64 - 1) as usize;
        self.jump_to_zone(target);
    }

    /// Record the zone a camera routine is nearest to. Returns true when the
    /// active zone changed.
    ///
    /// `current_zone` always follows the nearest zone, but the zone only joins
    /// `visited_zones` once the camera is within the detection radius. Between
    /// zones the current zone can therefore be missing from the visited set.
    /// Jumps and selection mark their zone visited directly.
    pub(crate) fn enter_zone(&self, zone: ZoneId, within_radius: bool) -> bool {
        let mut changed = false;
        self.update(|s| {
            if !s.is_experience_selected() {
                return false;
            }
            let mut modified = false;
            if s.current_zone != zone {
                s.write_zone(zone);
                changed = true;
                modified = true;
            }
            if within_radius {
                modified |= s.visited_zones.insert(zone);
            }
            modified
        });
        if changed {
            log::debug!("Entered zone {}", zone);
        }
        changed
    }

    // ------------------------------------------------------------------
    // Audio settings
    // ------------------------------------------------------------------

    pub fn toggle_mute(&self) {
        self.update(|s| {
            s.is_muted = !s.is_muted;
            true
        });
    }

    pub fn set_muted(&self, muted: bool) {
        self.update(|s| {
            if s.is_muted == muted {
                return false;
            }
            s.is_muted = muted;
            true
        });
    }

    pub fn set_volume(&self, volume: f32) {
        let volume = if volume.is_finite() { volume.clamp(0.0, 1.0) } else { 0.0 };
        self.update(|s| {
            if s.volume == volume {
                return false;
            }
            s.volume = volume;
            true
        });
    }

    // ------------------------------------------------------------------
    // Overlay flags
    // ------------------------------------------------------------------

    pub fn toggle_zone_menu(&self) {
        self.update(|s| {
            s.show_zone_menu = !s.show_zone_menu;
            true
        });
    }

    pub fn set_zone_menu(&self, open: bool) {
        self.update(|s| {
            if s.show_zone_menu == open {
                return false;
            }
            s.show_zone_menu = open;
            true
        });
    }

    pub fn toggle_controls(&self) {
        self.update(|s| {
            s.show_controls = !s.show_controls;
            true
        });
    }

    pub fn set_controls(&self, visible: bool) {
        self.update(|s| {
            if s.show_controls == visible {
                return false;
            }
            s.show_controls = visible;
            true
        });
    }

    pub fn set_fullscreen(&self, fullscreen: bool) {
        self.update(|s| {
            if s.is_fullscreen == fullscreen {
                return false;
            }
            s.is_fullscreen = fullscreen;
            true
        });
    }

    /// Cosmetic cross-fade flag; never blocks other actions.
    pub fn set_transitioning(&self, transitioning: bool) {
        self.update(|s| {
            if s.is_transitioning == transitioning {
                return false;
            }
            s.is_transitioning = transitioning;
            true
        });
    }

    pub fn set_loading(&self, loading: bool) {
        self.update(|s| {
            if s.is_loading == loading {
                return false;
            }
            s.is_loading = loading;
            true
        });
    }

    // ------------------------------------------------------------------
    // Camera mode
    // ------------------------------------------------------------------

    pub fn set_camera_mode(&self, mode: CameraMode) {
        self.update(|s| {
            if s.camera_mode == mode {
                return false;
            }
            s.camera_mode = mode;
            if mode == CameraMode::Autoplay {
                s.pointer_locked = false;
            }
            true
        });
    }

    pub fn set_pointer_locked(&self, locked: bool) {
        self.update(|s| {
            if s.pointer_locked == locked {
                return false;
            }
            s.pointer_locked = locked;
            true
        });
    }

    // ------------------------------------------------------------------
    // Quality
    // ------------------------------------------------------------------

    pub fn set_quality_level(&self, level: QualityLevel) {
        self.update(|s| {
            if s.quality_level == level {
                return false;
            }
            s.quality_level = level;
            true
        });
    }

    pub fn set_device_tier(&self, tier: DeviceTier) {
        self.update(|s| {
            if s.device_tier == tier {
                return false;
            }
            s.device_tier = tier;
            true
        });
    }

    pub fn record_fps(&self, fps: f64) {
        self.update(|s| {
            if s.fps == fps {
                return false;
            }
            s.fps = fps;
            true
        });
    }
}
