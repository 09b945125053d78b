// animation/audio_mix.rs - Zone ambience levels as a pure function of time
//
// Fades are described by (from, to, start, duration) and evaluated against the
// engine clock. Nothing ticks on its own, so pausing, muting or switching zones
// mid-fade cannot leave a stale fade running.

use serde::Serialize;

use super::lerp;
use crate::timeline::TimelineState;
use crate::types::ZoneId;

/// Fade duration for mute, unmute, pause and resume
pub const MASTER_FADE_SECONDS: f64 = 0.5;

/// A linear level ramp evaluated lazily
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelFade {
    pub from: f32,
    pub to: f32,
    pub started_at: f64,
    pub duration: f64,
}

impl LevelFade {
    pub fn settled(level: f32) -> Self {
        Self {
            from: level,
            to: level,
            started_at: 0.0,
            duration: 0.0,
        }
    }

    /// Fraction of the fade completed at `now`, in [0, 1]
    pub fn progress(&self, now: f64) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.started_at) / self.duration).clamp(0.0, 1.0) as f32
    }

    pub fn level_at(&self, now: f64) -> f32 {
        lerp(self.from, self.to, self.progress(now))
    }

    pub fn is_finished(&self, now: f64) -> bool {
        self.progress(now) >= 1.0
    }

    /// Start a new ramp toward `to` from wherever this one is right now.
    pub fn retarget(&self, to: f32, now: f64, duration: f64) -> Self {
        Self {
            from: self.level_at(now),
            to,
            started_at: now,
            duration,
        }
    }
}

/// Gains the host should apply this frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AudioMix {
    /// Zone whose ambience is fading in (or fully in)
    pub zone: Option<ZoneId>,
    pub gain: f32,
    /// Zone fading out, with its gain
    pub previous: Option<(ZoneId, f32)>,
}

impl AudioMix {
    pub fn silent() -> Self {
        Self {
            zone: None,
            gain: 0.0,
            previous: None,
        }
    }
}

/// Cross-fades zone ambience and applies the master level.
pub struct AudioMixer {
    crossfade_duration: f64,
    current: Option<ZoneId>,
    previous: Option<ZoneId>,
    zone_fade: LevelFade,
    master: LevelFade,
}

impl AudioMixer {
    pub fn new(crossfade_duration: f32) -> Self {
        Self {
            crossfade_duration: crossfade_duration.max(0.0) as f64,
            current: None,
            previous: None,
            zone_fade: LevelFade::settled(1.0),
            master: LevelFade::settled(0.0),
        }
    }

    /// Silence everything immediately.
    pub fn reset(&mut self) {
        self.current = None;
        self.previous = None;
        self.zone_fade = LevelFade::settled(1.0);
        self.master = LevelFade::settled(0.0);
    }

    fn target_master(state: &TimelineState) -> f32 {
        if state.is_experience_selected() && state.is_playing() && !state.is_muted {
            state.volume
        } else {
            0.0
        }
    }

    /// Evaluate the mix for `state` at engine time `now`.
    pub fn update(&mut self, now: f64, state: &TimelineState) -> AudioMix {
        if !state.is_experience_selected() {
            self.reset();
            return AudioMix::silent();
        }

        let target = Self::target_master(state);
        if self.master.to != target {
            self.master = self.master.retarget(target, now, MASTER_FADE_SECONDS);
        }

        let zone = state.current_zone;
        match self.current {
            None => {
                // First zone after selection fades in on its own
                self.current = Some(zone);
                self.previous = None;
                self.zone_fade = LevelFade {
                    from: 0.0,
                    to: 1.0,
                    started_at: now,
                    duration: self.crossfade_duration,
                };
            }
            Some(current) if current != zone => {
                log::debug!("Audio crossfade {} -> {}", current, zone);
                self.previous = Some(current);
                self.current = Some(zone);
                self.zone_fade = LevelFade {
                    from: 0.0,
                    to: 1.0,
                    started_at: now,
                    duration: self.crossfade_duration,
                };
            }
            Some(_) => {}
        }

        let master = self.master.level_at(now);
        let weight = self.zone_fade.level_at(now);
        if self.zone_fade.is_finished(now) {
            self.previous = None;
        }

        AudioMix {
            zone: self.current,
            gain: master * weight,
            previous: self.previous.map(|z| (z, master * (1.0 - weight))),
        }
    }
}
