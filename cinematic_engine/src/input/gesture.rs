// input/gesture.rs - Touch swipe and tap recognition
//
// Times are engine-clock seconds. A single tap is only reported once the
// double-tap window has passed without a second tap, so `poll` must be called
// every tick.

use super::{Command, InputContext};
use crate::config::EngineConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
struct TouchStart {
    x: f32,
    y: f32,
    at: f64,
}

/// Turns touch start/end pairs into commands
pub struct GestureRecognizer {
    swipe_distance: f32,
    swipe_max_duration: f64,
    tap_slop: f32,
    tap_max_duration: f64,
    double_tap_window: f64,

    start: Option<TouchStart>,
    pending_tap: Option<f64>,
}

impl GestureRecognizer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            swipe_distance: config.swipe_distance,
            swipe_max_duration: config.swipe_max_duration as f64,
            tap_slop: config.tap_slop,
            tap_max_duration: config.tap_max_duration as f64,
            double_tap_window: config.double_tap_window as f64,
            start: None,
            pending_tap: None,
        }
    }

    pub fn touch_start(&mut self, x: f32, y: f32, now: f64) {
        self.start = Some(TouchStart { x, y, at: now });
    }

    pub fn touch_end(&mut self, x: f32, y: f32, now: f64, ctx: &InputContext) -> Option<Command> {
        let start = self.start.take()?;
        let dx = x - start.x;
        let dy = y - start.y;
        let elapsed = now - start.at;

        // Taps
        if dx.hypot(dy) < self.tap_slop {
            if elapsed > self.tap_max_duration {
                return None;
            }
            return match self.pending_tap.take() {
                Some(first) if now - first <= self.double_tap_window => Some(Command::TogglePlayPause),
                _ => {
                    self.pending_tap = Some(now);
                    None
                }
            };
        }

        // Swipes
        if elapsed > self.swipe_max_duration {
            return None;
        }
        if dx.abs() >= dy.abs() {
            if dx.abs() < self.swipe_distance {
                return None;
            }
            // Finger moves left to bring the next zone in
            Some(Command::StepZone(if dx < 0.0 { 1 } else { -1 }))
        } else {
            if dy.abs() < self.swipe_distance {
                return None;
            }
            if dy < 0.0 {
                Some(Command::SetZoneMenu(true))
            } else if ctx.zone_menu_open {
                Some(Command::SetZoneMenu(false))
            } else {
                Some(Command::ToggleControls)
            }
        }
    }

    /// Resolve a lone tap once no second tap can follow.
    pub fn poll(&mut self, now: f64) -> Option<Command> {
        match self.pending_tap {
            Some(at) if now - at > self.double_tap_window => {
                self.pending_tap = None;
                Some(Command::ToggleControls)
            }
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.start = None;
        self.pending_tap = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recognizer() -> GestureRecognizer {
        GestureRecognizer::new(&EngineConfig::default())
    }

    fn swipe(g: &mut GestureRecognizer, dx: f32, dy: f32, ctx: &InputContext) -> Option<Command> {
        g.touch_start(200.0, 200.0, 1.0);
        g.touch_end(200.0 + dx, 200.0 + dy, 1.2, ctx)
    }

    #[test]
    fn test_horizontal_swipes_step_zones() {
        let mut g = recognizer();
        let ctx = InputContext::default();
        assert_eq!(swipe(&mut g, -120.0, 10.0, &ctx), Some(Command::StepZone(1)));
        assert_eq!(swipe(&mut g, 120.0, -10.0, &ctx), Some(Command::StepZone(-1)));
    }

    #[test]
    fn test_vertical_swipes_menu_and_controls() {
        let mut g = recognizer();
        let closed = InputContext::default();
        let open = InputContext {
            zone_menu_open: true,
            ..Default::default()
        };
        assert_eq!(swipe(&mut g, 0.0, -80.0, &closed), Some(Command::SetZoneMenu(true)));
        assert_eq!(swipe(&mut g, 0.0, 80.0, &open), Some(Command::SetZoneMenu(false)));
        assert_eq!(swipe(&mut g, 0.0, 80.0, &closed), Some(Command::ToggleControls));
    }

    #[test]
    fn test_short_or_slow_swipes_are_ignored() {
        let mut g = recognizer();
        let ctx = InputContext::default();
        assert_eq!(swipe(&mut g, -30.0, 0.0, &ctx), None);

        g.touch_start(0.0, 0.0, 0.0);
        assert_eq!(g.touch_end(-200.0, 0.0, 2.0, &ctx), None);
    }

    #[test]
    fn test_single_tap_waits_for_window() {
        let mut g = recognizer();
        let ctx = InputContext::default();
        g.touch_start(10.0, 10.0, 0.0);
        assert_eq!(g.touch_end(12.0, 11.0, 0.1, &ctx), None);
        assert_eq!(g.poll(0.2), None);
        assert_eq!(g.poll(0.5), Some(Command::ToggleControls));
        assert_eq!(g.poll(0.6), None);
    }

    #[test]
    fn test_double_tap_toggles_playback() {
        let mut g = recognizer();
        let ctx = InputContext::default();
        g.touch_start(10.0, 10.0, 0.0);
        g.touch_end(10.0, 10.0, 0.05, &ctx);
        g.touch_start(10.0, 10.0, 0.15);
        assert_eq!(g.touch_end(10.0, 10.0, 0.2, &ctx), Some(Command::TogglePlayPause));
        // The first tap is consumed by the double tap
        assert_eq!(g.poll(1.0), None);
    }

    #[test]
    fn test_end_without_start() {
        let mut g = recognizer();
        assert_eq!(g.touch_end(0.0, 0.0, 0.0, &InputContext::default()), None);
    }
}
