// error_handling.rs - Engine error taxonomy
//
// Only construction, loading and validating setters return these. Everything
// that happens inside a frame is recovered locally and at most logged.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Playback speed {0} is not one of 1, 2 or 3")]
    InvalidSpeed(u8),

    #[error("Zone index {index} out of range for {count} zones")]
    ZoneOutOfRange { index: usize, count: usize },

    #[error("Invalid zone directory for theme {theme}: {reason}")]
    InvalidDirectory { theme: String, reason: String },

    #[error("Intent queue closed")]
    QueueClosed,

    #[error("Audio start rejected: {0}")]
    AudioRejected(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    pub(crate) fn directory(theme: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        EngineError::InvalidDirectory {
            theme: theme.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            EngineError::InvalidSpeed(4).to_string(),
            "Playback speed 4 is not one of 1, 2 or 3"
        );
        assert_eq!(
            EngineError::ZoneOutOfRange { index: 7, count: 6 }.to_string(),
            "Zone index 7 out of range for 6 zones"
        );
        let err = EngineError::directory("cyberpunk", "empty path");
        assert!(err.to_string().contains("cyberpunk"));
        assert!(err.to_string().contains("empty path"));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse: std::result::Result<u32, _> = serde_json::from_str("not json");
        let err: EngineError = parse.unwrap_err().into();
        assert!(matches!(err, EngineError::SerializationError(_)));
    }
}
