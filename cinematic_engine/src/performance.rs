// performance.rs - Frame timing, device classification and quality tiers

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Frame timing statistics with sliding window
pub struct FrameStats {
    frame_times: VecDeque<Duration>,
    window_size: usize,
}

impl FrameStats {
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            frame_times: VecDeque::with_capacity(window_size),
            window_size,
        }
    }

    pub fn record_frame(&mut self, frame_time: Duration) {
        // Maintain sliding window
        if self.frame_times.len() >= self.window_size {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(frame_time);
    }

    pub fn is_full(&self) -> bool {
        self.frame_times.len() >= self.window_size
    }

    pub fn clear(&mut self) {
        self.frame_times.clear();
    }

    pub fn average_fps(&self) -> f64 {
        if self.frame_times.is_empty() {
            return 0.0;
        }

        let avg_frame_time: Duration =
            self.frame_times.iter().sum::<Duration>() / self.frame_times.len() as u32;
        if avg_frame_time.as_secs_f64() > 0.0 {
            1.0 / avg_frame_time.as_secs_f64()
        } else {
            0.0
        }
    }

    pub fn percentile(&self, p: f64) -> Duration {
        if self.frame_times.is_empty() {
            return Duration::ZERO;
        }

        let mut sorted: Vec<_> = self.frame_times.iter().copied().collect();
        sorted.sort();

        let index = ((sorted.len() as f64 - 1.0) * p).round() as usize;
        sorted[index.min(sorted.len() - 1)]
    }

    pub fn report(&self) -> String {
        if self.frame_times.is_empty() {
            return "No frame data".to_string();
        }

        let avg_frame: Duration =
            self.frame_times.iter().sum::<Duration>() / self.frame_times.len() as u32;
        let p99 = self.percentile(0.99);

        format!(
            "FPS: {:.1} | Frame: {:.2}ms (p99: {:.2}ms)",
            self.average_fps(),
            avg_frame.as_secs_f64() * 1000.0,
            p99.as_secs_f64() * 1000.0,
        )
    }
}

// ============================================================================
// DEVICE TIERS
// ============================================================================

/// Hardware hints reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub cores: usize,
    pub memory_gb: f32,
    pub is_mobile: bool,
}

impl DeviceProfile {
    /// Best-effort profile of the machine running the engine
    #[cfg(not(target_arch = "wasm32"))]
    pub fn detect() -> Self {
        Self {
            cores: num_cpus::get(),
            // No portable memory query; assume a mid-range desktop
            memory_gb: 8.0,
            is_mobile: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceTier {
    Low,
    #[default]
    Mid,
    High,
}

impl DeviceTier {
    pub fn classify(profile: &DeviceProfile) -> DeviceTier {
        if profile.is_mobile || profile.cores <= 2 || profile.memory_gb < 4.0 {
            DeviceTier::Low
        } else if profile.cores >= 8 && profile.memory_gb >= 8.0 {
            DeviceTier::High
        } else {
            DeviceTier::Mid
        }
    }
}

/// Effect density used by the scene renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityLevel {
    pub fn for_tier(tier: DeviceTier) -> QualityLevel {
        match tier {
            DeviceTier::Low => QualityLevel::Low,
            DeviceTier::Mid => QualityLevel::Medium,
            DeviceTier::High => QualityLevel::High,
        }
    }

    pub fn step_down(self) -> Option<QualityLevel> {
        match self {
            QualityLevel::High => Some(QualityLevel::Medium),
            QualityLevel::Medium => Some(QualityLevel::Low),
            QualityLevel::Low => None,
        }
    }

    /// Particle budget multiplier for scene content
    pub fn particle_scale(self) -> f32 {
        match self {
            QualityLevel::Low => 0.25,
            QualityLevel::Medium => 0.6,
            QualityLevel::High => 1.0,
        }
    }
}

/// Steps quality down once per full window of slow frames; never steps up.
pub struct QualityGovernor {
    stats: FrameStats,
    low_fps_threshold: f64,
}

impl QualityGovernor {
    pub fn new(window_size: usize, low_fps_threshold: f64) -> Self {
        Self {
            stats: FrameStats::new(window_size),
            low_fps_threshold,
        }
    }

    /// Record a frame; returns the lower level when a downgrade is due.
    pub fn record(&mut self, frame_time: Duration, current: QualityLevel) -> Option<QualityLevel> {
        self.stats.record_frame(frame_time);

        if !self.stats.is_full() || self.stats.average_fps() >= self.low_fps_threshold {
            return None;
        }

        let lower = current.step_down()?;
        log::warn!(
            "Sustained low frame rate ({}), lowering quality to {:?}",
            self.stats.report(),
            lower
        );
        // A fresh window must fill before the next decision
        self.stats.clear();
        Some(lower)
    }

    pub fn average_fps(&self) -> f64 {
        self.stats.average_fps()
    }
}
