// animation/orchestrator.rs - Frame orchestration layer
//
// One `tick(dt)` per host frame: drain queued input, apply the resulting
// commands to the store, run exactly one camera routine, then hand the camera
// pose and audio mix to the host.

use std::sync::Arc;
use std::time::Duration;

use super::{AudioMix, AudioMixer, AutoplayDriver, FreeLookController, SplinePath};
use crate::camera::{CameraPose, SceneCamera};
use crate::config::EngineConfig;
use crate::error_handling::Result;
use crate::input::{map_key_down, map_key_up, Command, GestureRecognizer, InputContext, InputEvent, IntentQueue, IntentSender};
use crate::performance::{DeviceProfile, DeviceTier, QualityGovernor, QualityLevel};
use crate::timeline::TimelineStore;
use crate::types::CameraMode;
use crate::zones::ZoneDirectory;

/// Everything the engine needs from the embedding application.
///
/// Pointer lock and audio start are fire-and-forget: the lock outcome comes
/// back later as `InputEvent::PointerLockChanged`, and a rejected audio start
/// only mutes the session.
pub trait EngineHost {
    fn apply_camera(&mut self, pose: &CameraPose);

    fn request_pointer_lock(&mut self) {}

    fn release_pointer_lock(&mut self) {}

    fn set_fullscreen(&mut self, _fullscreen: bool) {}

    fn start_audio(&mut self) -> Result<()> {
        Ok(())
    }

    fn apply_audio(&mut self, _mix: &AudioMix) {}
}

impl EngineHost for SceneCamera {
    fn apply_camera(&mut self, pose: &CameraPose) {
        self.apply(pose);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AudioStart {
    Idle,
    Running,
    /// Rejected by the host; retried only on an explicit unmute
    Blocked,
}

/// Main orchestrator - owns the store and both camera routines
pub struct ExperienceOrchestrator {
    store: Arc<TimelineStore>,
    directory: ZoneDirectory,
    config: EngineConfig,

    // Input
    queue: IntentQueue,
    gestures: GestureRecognizer,

    // Camera routines (mode-exclusive)
    autoplay: AutoplayDriver,
    free_look: FreeLookController,

    // Audio and frame pacing
    audio: AudioMixer,
    audio_start: AudioStart,
    governor: QualityGovernor,

    // Engine clock in seconds, advanced by tick
    clock: f64,
    transition_until: Option<f64>,
    last_pose: Option<CameraPose>,
    lock_requested: bool,
    is_shut_down: bool,
}

impl ExperienceOrchestrator {
    pub fn new(config: EngineConfig, directory: ZoneDirectory) -> Self {
        let store = Arc::new(TimelineStore::new(config.total_duration));
        Self {
            store,
            queue: IntentQueue::new(),
            gestures: GestureRecognizer::new(&config),
            autoplay: AutoplayDriver::new(&config),
            free_look: FreeLookController::new(&config),
            audio: AudioMixer::new(config.crossfade_duration),
            audio_start: AudioStart::Idle,
            governor: QualityGovernor::new(config.fps_window, config.low_fps_threshold),
            clock: 0.0,
            transition_until: None,
            last_pose: None,
            lock_requested: false,
            is_shut_down: false,
            directory,
            config,
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    /// Shared store handle for HUD and audio consumers
    pub fn store(&self) -> &Arc<TimelineStore> {
        &self.store
    }

    /// New handle for pushing input into the next tick
    pub fn sender(&self) -> IntentSender {
        self.queue.sender()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn directory(&self) -> &ZoneDirectory {
        &self.directory
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn last_pose(&self) -> Option<CameraPose> {
        self.last_pose
    }

    pub fn free_look(&self) -> &FreeLookController {
        &self.free_look
    }

    /// A pointer-lock request is waiting on the host's answer.
    pub fn is_lock_requested(&self) -> bool {
        self.lock_requested
    }

    pub fn is_shut_down(&self) -> bool {
        self.is_shut_down
    }

    // ========================================================================
    // FRAME
    // ========================================================================

    /// Advance the engine by `dt` seconds. Returns the pose written to the
    /// host, or None before an experience is selected.
    pub fn tick<H: EngineHost + ?Sized>(&mut self, dt: f32, host: &mut H) -> Option<CameraPose> {
        if self.is_shut_down {
            return None;
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.clock += dt as f64;

        for event in self.queue.drain() {
            self.handle_event(event, host);
        }
        if let Some(command) = self.gestures.poll(self.clock) {
            self.apply(command, host);
        }

        self.track_frame_rate(dt);

        let pose = self.step_camera(dt);
        if let Some(pose) = pose.as_ref() {
            host.apply_camera(pose);
            self.last_pose = Some(*pose);
        }

        if let Some(until) = self.transition_until {
            if self.clock >= until {
                self.transition_until = None;
                self.store.set_transitioning(false);
            }
        }

        let clock = self.clock;
        let audio = &mut self.audio;
        let mix = self.store.select(|s| audio.update(clock, s));
        host.apply_audio(&mix);

        pose
    }

    /// Run whichever camera routine owns the camera this frame.
    fn step_camera(&mut self, dt: f32) -> Option<CameraPose> {
        let (theme, mode, locked, playing) = self
            .store
            .select(|s| (s.experience, s.camera_mode, s.pointer_locked, s.is_playing()));
        let theme = theme?;
        let table = self.directory.theme(theme);

        let (pose, zone_changed) = match mode {
            CameraMode::Autoplay => {
                let frame = self.autoplay.update(dt, &self.store, table);
                (frame.pose, frame.zone_changed)
            }
            CameraMode::Explore if locked && playing => {
                let frame = self.free_look.update(dt, table);
                let changed = self
                    .store
                    .enter_zone(frame.zone, frame.distance < self.config.detection_radius);
                (frame.pose, changed)
            }
            // Waiting for pointer lock, or paused by Escape
            CameraMode::Explore => (self.free_look.pose(), false),
        };

        if zone_changed {
            self.begin_transition();
        }
        Some(pose)
    }

    fn track_frame_rate(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let current = self.store.select(|s| s.quality_level);
        if let Some(lower) = self.governor.record(Duration::from_secs_f32(dt), current) {
            self.store.set_quality_level(lower);
        }
        self.store.record_fps(self.governor.average_fps());
    }

    fn begin_transition(&mut self) {
        self.transition_until = Some(self.clock + self.config.crossfade_duration as f64);
        self.store.set_transitioning(true);
    }

    // ========================================================================
    // INPUT
    // ========================================================================

    fn handle_event<H: EngineHost + ?Sized>(&mut self, event: InputEvent, host: &mut H) {
        let ctx = self.store.select(InputContext::from_state);
        let command = match event {
            InputEvent::KeyDown(key) => map_key_down(key, &ctx),
            InputEvent::KeyUp(key) => map_key_up(key),
            InputEvent::PointerMove { dx, dy } => {
                ctx.free_look_active.then_some(Command::Look { dx, dy })
            }
            InputEvent::PointerClick => Some(Command::RequestPointerLock),
            InputEvent::PointerLockChanged(locked) => {
                self.pointer_lock_changed(locked, host);
                None
            }
            InputEvent::TouchStart { x, y } => {
                self.gestures.touch_start(x, y, self.clock);
                None
            }
            InputEvent::TouchEnd { x, y } => self.gestures.touch_end(x, y, self.clock, &ctx),
            InputEvent::Command(command) => Some(command),
        };
        if let Some(command) = command {
            self.apply(command, host);
        }
    }

    fn pointer_lock_changed<H: EngineHost + ?Sized>(&mut self, locked: bool, host: &mut H) {
        let (mode, was_locked) = self.store.select(|s| (s.camera_mode, s.pointer_locked));
        let requested = std::mem::take(&mut self.lock_requested);
        if locked {
            if mode != CameraMode::Explore {
                // Stale grant after leaving explore mode
                host.release_pointer_lock();
                return;
            }
            log::info!("Pointer lock acquired, exploring");
            self.store.set_pointer_locked(true);
            self.store.play();
        } else if was_locked {
            log::info!("Pointer lock lost, pausing");
            self.free_look.release_keys();
            self.store.set_pointer_locked(false);
            self.store.pause();
        } else if requested {
            log::info!("Pointer lock denied; waiting for another click");
        } else {
            log::debug!("Pointer lock release confirmed by host");
        }
    }

    /// Apply one command. Commands that need an experience are ignored by the
    /// store until one is selected.
    pub fn apply<H: EngineHost + ?Sized>(&mut self, command: Command, host: &mut H) {
        log::trace!("Command {:?}", command);
        match command {
            Command::SelectExperience(theme) => {
                self.release_lock(host);
                self.store.select_experience(theme);
                self.autoplay.reset();
                self.gestures.reset();
                self.ensure_audio(host);
            }
            Command::Reset => {
                self.release_lock(host);
                self.store.reset_experience();
                self.autoplay.reset();
                self.gestures.reset();
                self.transition_until = None;
            }

            Command::Play => {
                self.store.play();
                self.ensure_audio(host);
            }
            Command::Pause => self.store.pause(),
            Command::TogglePlayPause => {
                self.store.toggle_play_pause();
                self.ensure_audio(host);
            }
            Command::SetSpeed(speed) => self.store.set_playback_speed(speed),
            Command::Seek(percent) => {
                self.store.set_progress(percent);
                self.follow_cut();
            }

            Command::JumpZone(index) => {
                self.store.jump_to_zone(index);
                self.follow_cut();
            }
            Command::StepZone(delta) => {
                self.store.step_zone(delta);
                self.follow_cut();
            }

            Command::ToggleMute => {
                self.store.toggle_mute();
                self.retry_audio(host);
            }
            Command::SetVolume(volume) => self.store.set_volume(volume),

            Command::ToggleZoneMenu => self.store.toggle_zone_menu(),
            Command::SetZoneMenu(open) => self.store.set_zone_menu(open),
            Command::ToggleControls => self.store.toggle_controls(),
            Command::SetControls(visible) => self.store.set_controls(visible),
            Command::ToggleFullscreen => {
                let fullscreen = !self.store.select(|s| s.is_fullscreen);
                self.store.set_fullscreen(fullscreen);
                host.set_fullscreen(fullscreen);
            }

            Command::SetCameraMode(mode) => self.set_camera_mode(mode, host),
            Command::RequestPointerLock => {
                let wants_lock = self.store.select(|s| {
                    s.is_experience_selected() && s.camera_mode == CameraMode::Explore && !s.pointer_locked
                });
                if wants_lock {
                    log::debug!("Requesting pointer lock");
                    self.lock_requested = true;
                    host.request_pointer_lock();
                }
            }
            Command::ReleasePointerLock => {
                if self.release_lock(host) {
                    self.store.pause();
                }
            }
            Command::Move { axis, held } => {
                let active = self.store.select(|s| s.camera_mode == CameraMode::Explore && s.pointer_locked);
                if active || !held {
                    self.free_look.set_key(axis, held);
                }
            }
            Command::Look { dx, dy } => {
                let active = self.store.select(|s| s.camera_mode == CameraMode::Explore && s.pointer_locked);
                if active {
                    self.free_look.look(dx, dy);
                }
            }
        }
    }

    fn set_camera_mode<H: EngineHost + ?Sized>(&mut self, mode: CameraMode, host: &mut H) {
        let (selected, current) = self.store.select(|s| (s.is_experience_selected(), s.camera_mode));
        if !selected || current == mode {
            return;
        }
        match mode {
            CameraMode::Explore => {
                let pose = self.last_pose.unwrap_or_else(|| self.autoplay.pose());
                self.free_look.seed_from_pose(&pose);
            }
            CameraMode::Autoplay => {
                self.release_lock(host);
                if let Some(pose) = self.last_pose {
                    let cut = self.store.select(|s| s.cut_generation);
                    self.autoplay.seed_from_pose(&pose, cut);
                }
            }
        }
        log::info!("Camera mode: {:?}", mode);
        self.store.set_camera_mode(mode);
    }

    /// Drop pointer lock if held. Returns true when a lock was released.
    fn release_lock<H: EngineHost + ?Sized>(&mut self, host: &mut H) -> bool {
        self.free_look.release_keys();
        if !self.store.select(|s| s.pointer_locked) {
            return false;
        }
        host.release_pointer_lock();
        self.store.set_pointer_locked(false);
        true
    }

    /// After a jump or scrub: raise the transition flag and, in explore mode,
    /// move the free-look camera onto the path at the new time.
    fn follow_cut(&mut self) {
        let (theme, mode, t) = self
            .store
            .select(|s| (s.experience, s.camera_mode, s.normalized_time()));
        let Some(theme) = theme else {
            return;
        };
        self.begin_transition();
        if mode == CameraMode::Explore {
            let path = SplinePath::new(self.directory.theme(theme).waypoints(), self.config.spline_tension);
            let sample = path.sample(t);
            self.free_look
                .seed_from_pose(&CameraPose::look_at(sample.position, sample.target));
        }
    }

    // ========================================================================
    // AUDIO START
    // ========================================================================

    fn ensure_audio<H: EngineHost + ?Sized>(&mut self, host: &mut H) {
        if self.audio_start != AudioStart::Idle || !self.store.select(|s| s.is_playing()) {
            return;
        }
        self.try_start_audio(host);
    }

    fn retry_audio<H: EngineHost + ?Sized>(&mut self, host: &mut H) {
        if self.audio_start == AudioStart::Blocked && !self.store.select(|s| s.is_muted) {
            self.try_start_audio(host);
        }
    }

    fn try_start_audio<H: EngineHost + ?Sized>(&mut self, host: &mut H) {
        match host.start_audio() {
            Ok(()) => {
                log::debug!("Audio started");
                self.audio_start = AudioStart::Running;
            }
            Err(e) => {
                log::warn!("Audio start rejected ({}), continuing muted", e);
                self.audio_start = AudioStart::Blocked;
                self.store.set_muted(true);
            }
        }
    }

    // ========================================================================
    // TEARDOWN
    // ========================================================================

    /// Stop accepting input and release host resources. Later ticks are no-ops.
    pub fn shutdown<H: EngineHost + ?Sized>(&mut self, host: &mut H) {
        if self.is_shut_down {
            return;
        }
        self.queue.close();
        self.release_lock(host);
        host.apply_audio(&AudioMix::silent());
        self.transition_until = None;
        self.is_shut_down = true;
        log::info!("Orchestrator shut down");
    }
}

/// Builder pattern for orchestrator configuration
pub struct OrchestratorBuilder {
    config: EngineConfig,
    directory: ZoneDirectory,
    device: Option<DeviceProfile>,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            directory: ZoneDirectory::builtin(),
            device: None,
        }
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn directory(mut self, directory: ZoneDirectory) -> Self {
        self.directory = directory;
        self
    }

    /// Classify the device and pick the starting quality level from it.
    pub fn device_profile(mut self, profile: DeviceProfile) -> Self {
        self.device = Some(profile);
        self
    }

    pub fn build(self) -> Result<ExperienceOrchestrator> {
        self.directory.validate()?;
        let orchestrator = ExperienceOrchestrator::new(self.config.sanitized(), self.directory);

        if let Some(profile) = self.device {
            let tier = DeviceTier::classify(&profile);
            let quality = QualityLevel::for_tier(tier);
            log::info!("Device tier {:?} ({} cores), starting at {:?} quality", tier, profile.cores, quality);
            orchestrator.store.set_device_tier(tier);
            orchestrator.store.set_quality_level(quality);
        }

        Ok(orchestrator)
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::MoveAxis;
    use crate::error_handling::EngineError;
    use crate::input::Key;
    use crate::timeline::Phase;
    use crate::types::{Hint, Theme, ZoneId};

    const DT: f32 = 1.0 / 60.0;

    #[derive(Default)]
    struct TestHost {
        poses: Vec<CameraPose>,
        lock_requests: usize,
        lock_releases: usize,
        fullscreen: Option<bool>,
        reject_audio: bool,
        audio_starts: usize,
        last_mix: Option<AudioMix>,
    }

    impl EngineHost for TestHost {
        fn apply_camera(&mut self, pose: &CameraPose) {
            self.poses.push(*pose);
        }

        fn request_pointer_lock(&mut self) {
            self.lock_requests += 1;
        }

        fn release_pointer_lock(&mut self) {
            self.lock_releases += 1;
        }

        fn set_fullscreen(&mut self, fullscreen: bool) {
            self.fullscreen = Some(fullscreen);
        }

        fn start_audio(&mut self) -> Result<()> {
            self.audio_starts += 1;
            if self.reject_audio {
                Err(EngineError::AudioRejected("autoplay policy".to_string()))
            } else {
                Ok(())
            }
        }

        fn apply_audio(&mut self, mix: &AudioMix) {
            self.last_mix = Some(*mix);
        }
    }

    fn engine() -> (ExperienceOrchestrator, TestHost) {
        let orchestrator = OrchestratorBuilder::new().build().unwrap();
        (orchestrator, TestHost::default())
    }

    fn send(engine: &ExperienceOrchestrator, event: InputEvent) {
        engine.sender().send(event).unwrap();
    }

    fn command(engine: &ExperienceOrchestrator, command: Command) {
        send(engine, InputEvent::Command(command));
    }

    fn enter_explore(engine: &mut ExperienceOrchestrator, host: &mut TestHost) {
        command(engine, Command::SelectExperience(Theme::Cyberpunk));
        engine.tick(DT, host);
        command(engine, Command::SetCameraMode(CameraMode::Explore));
        send(engine, InputEvent::PointerClick);
        engine.tick(DT, host);
        send(engine, InputEvent::PointerLockChanged(true));
        engine.tick(DT, host);
    }

    #[test]
    fn test_idle_before_selection() {
        let (mut engine, mut host) = engine();
        assert_eq!(engine.tick(DT, &mut host), None);
        assert!(host.poses.is_empty());
        assert_eq!(host.last_mix, Some(AudioMix::silent()));
    }

    #[test]
    fn test_selection_through_queue() {
        let (mut engine, mut host) = engine();
        command(&engine, Command::SelectExperience(Theme::Nature));
        let pose = engine.tick(DT, &mut host);
        assert!(pose.is_some());
        let state = engine.store().snapshot();
        assert_eq!(state.experience, Some(Theme::Nature));
        assert_eq!(state.current_zone, ZoneId::Landing);
        assert!(state.is_playing());
        assert_eq!(host.audio_starts, 1);
    }

    #[test]
    fn test_keyboard_drives_store() {
        let (mut engine, mut host) = engine();
        command(&engine, Command::SelectExperience(Theme::Cyberpunk));
        send(&engine, InputEvent::KeyDown(Key::Space));
        send(&engine, InputEvent::KeyDown(Key::Digit3));
        send(&engine, InputEvent::KeyDown(Key::ArrowRight));
        send(&engine, InputEvent::KeyDown(Key::KeyS));
        engine.tick(DT, &mut host);

        let state = engine.store().snapshot();
        assert_eq!(state.phase, Phase::Paused);
        assert_eq!(state.playback_speed, crate::types::PlaybackSpeed::X3);
        assert_eq!(state.current_zone_index, 1);
        assert!(state.is_muted);
        assert!(state.is_transitioning);
    }

    #[test]
    fn test_transition_flag_clears_after_crossfade() {
        let (mut engine, mut host) = engine();
        command(&engine, Command::SelectExperience(Theme::Cyberpunk));
        engine.tick(DT, &mut host);
        command(&engine, Command::JumpZone(3));
        engine.tick(DT, &mut host);
        assert!(engine.store().select(|s| s.is_transitioning));
        for _ in 0..120 {
            engine.tick(DT, &mut host);
        }
        assert!(!engine.store().select(|s| s.is_transitioning));
    }

    #[test]
    fn test_escape_resets_when_nothing_else_is_open() {
        let (mut engine, mut host) = engine();
        command(&engine, Command::SelectExperience(Theme::Cyberpunk));
        command(&engine, Command::ToggleZoneMenu);
        send(&engine, InputEvent::KeyDown(Key::Escape));
        engine.tick(DT, &mut host);
        assert!(!engine.store().select(|s| s.show_zone_menu));
        assert!(engine.store().select(|s| s.is_experience_selected()));

        send(&engine, InputEvent::KeyDown(Key::Escape));
        engine.tick(DT, &mut host);
        assert!(!engine.store().select(|s| s.is_experience_selected()));
    }

    #[test]
    fn test_explore_flow() {
        let (mut engine, mut host) = engine();
        enter_explore(&mut engine, &mut host);
        assert_eq!(host.lock_requests, 1);
        let state = engine.store().snapshot();
        assert_eq!(state.camera_mode, CameraMode::Explore);
        assert!(state.pointer_locked);
        assert!(state.is_playing());

        // Free-look continues from the autoplay pose
        let start = engine.free_look().position();
        send(&engine, InputEvent::KeyDown(Key::KeyW));
        for _ in 0..60 {
            engine.tick(DT, &mut host);
        }
        assert!(engine.free_look().position().z < start.z);
        // Timeline time does not advance while exploring
        let t = engine.store().select(|s| s.current_time());
        engine.tick(DT, &mut host);
        assert_eq!(engine.store().select(|s| s.current_time()), t);

        // Escape releases the lock and pauses
        send(&engine, InputEvent::KeyDown(Key::Escape));
        engine.tick(DT, &mut host);
        let state = engine.store().snapshot();
        assert!(!state.pointer_locked);
        assert!(state.is_paused());
        assert_eq!(state.hint(), Hint::ClickToExplore);
        assert_eq!(host.lock_releases, 1);
    }

    #[test]
    fn test_leaving_explore_glides_back_to_path() {
        let (mut engine, mut host) = engine();
        enter_explore(&mut engine, &mut host);
        send(&engine, InputEvent::KeyDown(Key::KeyD));
        for _ in 0..180 {
            engine.tick(DT, &mut host);
        }
        send(&engine, InputEvent::KeyUp(Key::KeyD));
        send(&engine, InputEvent::KeyDown(Key::Escape));
        engine.tick(DT, &mut host);
        let explored = engine.last_pose().unwrap().position;

        command(&engine, Command::SetCameraMode(CameraMode::Autoplay));
        let first = engine.tick(DT, &mut host).unwrap().position;
        for _ in 0..600 {
            engine.tick(DT, &mut host);
        }
        let on_path = engine.last_pose().unwrap().position;

        let gap = (on_path - explored).length();
        let step = (first - explored).length();
        assert!(gap > 5.0, "free-look only moved {gap}");
        assert!(step > 0.0);
        assert!(step < 0.25 * gap, "camera jumped {step} of {gap} in one frame");
        assert_eq!(engine.store().select(|s| s.camera_mode), CameraMode::Autoplay);
    }

    #[test]
    fn test_release_echo_is_not_a_denial() {
        let (mut engine, mut host) = engine();
        enter_explore(&mut engine, &mut host);
        assert!(!engine.is_lock_requested());

        send(&engine, InputEvent::KeyDown(Key::Escape));
        send(&engine, InputEvent::PointerLockChanged(false));
        engine.tick(DT, &mut host);
        assert!(!engine.is_lock_requested());
        assert_eq!(host.lock_requests, 1);

        send(&engine, InputEvent::PointerClick);
        engine.tick(DT, &mut host);
        assert!(engine.is_lock_requested());
        send(&engine, InputEvent::PointerLockChanged(false));
        engine.tick(DT, &mut host);
        assert!(!engine.is_lock_requested());
        assert!(!engine.store().select(|s| s.pointer_locked));
    }

    #[test]
    fn test_pointer_lock_denied_stays_inert() {
        let (mut engine, mut host) = engine();
        command(&engine, Command::SelectExperience(Theme::Cyberpunk));
        command(&engine, Command::SetCameraMode(CameraMode::Explore));
        send(&engine, InputEvent::PointerClick);
        engine.tick(DT, &mut host);
        let before = engine.free_look().pose();

        send(&engine, InputEvent::PointerLockChanged(false));
        send(&engine, InputEvent::PointerMove { dx: 300.0, dy: 0.0 });
        send(&engine, InputEvent::KeyDown(Key::KeyW));
        for _ in 0..30 {
            engine.tick(DT, &mut host);
        }
        assert_eq!(engine.free_look().pose(), before);
        assert_eq!(engine.store().select(|s| s.hint()), Hint::ClickToExplore);

        // Clicking again retries
        send(&engine, InputEvent::PointerClick);
        engine.tick(DT, &mut host);
        assert_eq!(host.lock_requests, 2);
    }

    #[test]
    fn test_pointer_look_only_while_locked() {
        let (mut engine, mut host) = engine();
        enter_explore(&mut engine, &mut host);
        let yaw = engine.free_look().yaw();
        send(&engine, InputEvent::PointerMove { dx: 100.0, dy: 0.0 });
        engine.tick(DT, &mut host);
        assert!(engine.free_look().yaw() < yaw);
    }

    #[test]
    fn test_key_release_after_lock_loss() {
        let (mut engine, mut host) = engine();
        enter_explore(&mut engine, &mut host);
        engine.apply(Command::Move { axis: MoveAxis::Forward, held: true }, &mut host);
        send(&engine, InputEvent::PointerLockChanged(false));
        engine.tick(DT, &mut host);
        assert!(engine.store().select(|s| s.is_paused()));

        send(&engine, InputEvent::PointerLockChanged(true));
        engine.tick(DT, &mut host);
        let before = engine.free_look().position();
        for _ in 0..120 {
            engine.tick(DT, &mut host);
        }
        // No key is stuck from before the lock loss
        assert!((engine.free_look().position() - before).length() < 1e-3);
    }

    #[test]
    fn test_rejected_audio_mutes_until_unmute() {
        let (mut engine, mut host) = engine();
        host.reject_audio = true;
        command(&engine, Command::SelectExperience(Theme::Cyberpunk));
        engine.tick(DT, &mut host);
        assert!(engine.store().select(|s| s.is_muted && s.is_playing()));
        assert_eq!(host.audio_starts, 1);

        // No retry loop
        for _ in 0..10 {
            engine.tick(DT, &mut host);
        }
        command(&engine, Command::Play);
        engine.tick(DT, &mut host);
        assert_eq!(host.audio_starts, 1);

        // Explicit unmute gesture retries
        host.reject_audio = false;
        command(&engine, Command::ToggleMute);
        engine.tick(DT, &mut host);
        assert_eq!(host.audio_starts, 2);
        assert!(!engine.store().select(|s| s.is_muted));
    }

    #[test]
    fn test_fullscreen_reaches_host() {
        let (mut engine, mut host) = engine();
        send(&engine, InputEvent::KeyDown(Key::KeyF));
        engine.tick(DT, &mut host);
        assert_eq!(host.fullscreen, Some(true));
        assert!(engine.store().select(|s| s.is_fullscreen));
    }

    #[test]
    fn test_touch_gestures_use_engine_clock() {
        let (mut engine, mut host) = engine();
        command(&engine, Command::SelectExperience(Theme::Cyberpunk));
        engine.tick(DT, &mut host);

        send(&engine, InputEvent::TouchStart { x: 300.0, y: 200.0 });
        engine.tick(DT, &mut host);
        send(&engine, InputEvent::TouchEnd { x: 100.0, y: 210.0 });
        engine.tick(DT, &mut host);
        assert_eq!(engine.store().select(|s| s.current_zone_index), 1);

        // Double tap
        send(&engine, InputEvent::TouchStart { x: 50.0, y: 50.0 });
        send(&engine, InputEvent::TouchEnd { x: 50.0, y: 50.0 });
        engine.tick(DT, &mut host);
        send(&engine, InputEvent::TouchStart { x: 50.0, y: 50.0 });
        send(&engine, InputEvent::TouchEnd { x: 50.0, y: 50.0 });
        engine.tick(DT, &mut host);
        assert!(engine.store().select(|s| s.is_paused()));

        // Single tap resolves after the window
        send(&engine, InputEvent::TouchStart { x: 50.0, y: 50.0 });
        send(&engine, InputEvent::TouchEnd { x: 50.0, y: 50.0 });
        engine.tick(DT, &mut host);
        assert!(engine.store().select(|s| s.show_controls));
        for _ in 0..30 {
            engine.tick(DT, &mut host);
        }
        assert!(!engine.store().select(|s| s.show_controls));
    }

    #[test]
    fn test_builder_applies_device_tier() {
        let engine = OrchestratorBuilder::new()
            .device_profile(DeviceProfile { cores: 2, memory_gb: 2.0, is_mobile: true })
            .build()
            .unwrap();
        let state = engine.store().snapshot();
        assert_eq!(state.device_tier, DeviceTier::Low);
        assert_eq!(state.quality_level, QualityLevel::Low);
    }

    #[test]
    fn test_slow_frames_lower_quality() {
        let config = EngineConfig {
            fps_window: 10,
            ..EngineConfig::default()
        };
        let mut engine = OrchestratorBuilder::new().config(config).build().unwrap();
        let mut host = TestHost::default();
        engine.store().set_quality_level(QualityLevel::High);
        for _ in 0..10 {
            engine.tick(0.05, &mut host);
        }
        assert_eq!(engine.store().select(|s| s.quality_level), QualityLevel::Medium);

        // A fresh window starts filling after the downgrade
        for _ in 0..5 {
            engine.tick(0.05, &mut host);
        }
        let state = engine.store().snapshot();
        assert_eq!(state.quality_level, QualityLevel::Medium);
        assert!((state.fps - 20.0).abs() < 0.5);
    }

    #[test]
    fn test_shutdown_closes_queue() {
        let (mut engine, mut host) = engine();
        let sender = engine.sender();
        engine.shutdown(&mut host);
        assert!(matches!(
            sender.send(InputEvent::PointerClick),
            Err(EngineError::QueueClosed)
        ));
        assert_eq!(engine.tick(DT, &mut host), None);
        assert!(engine.is_shut_down());
    }
}
