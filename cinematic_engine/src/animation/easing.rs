// animation/easing.rs - Waypoint easing curves

use serde::{Deserialize, Serialize};

// ============================================================================
// EASING FUNCTIONS
// ============================================================================

/// Easing applied to the local parameter of a path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    /// Apply easing function to normalized time value
    #[inline]
    pub fn apply(self, mut t: f32) -> f32 {
        t = t.clamp(0.0, 1.0);

        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv
            }
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u * u / 2.0
                }
            }
        }
    }

    /// Keyword lookup. Anything unrecognized eases linearly.
    pub fn from_keyword(keyword: &str) -> Easing {
        let normalized: String = keyword
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "linear" => Easing::Linear,
            "easein" => Easing::EaseIn,
            "easeout" => Easing::EaseOut,
            "easeinout" => Easing::EaseInOut,
            _ => {
                log::debug!("Unknown easing '{}', using linear", keyword);
                Easing::Linear
            }
        }
    }

    pub fn as_keyword(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::EaseIn => "easeIn",
            Easing::EaseOut => "easeOut",
            Easing::EaseInOut => "easeInOut",
        }
    }
}

impl From<String> for Easing {
    fn from(s: String) -> Self {
        Easing::from_keyword(&s)
    }
}

impl From<Easing> for String {
    fn from(e: Easing) -> String {
        e.as_keyword().to_string()
    }
}

// ============================================================================
// TESTS
// ============================================================================
