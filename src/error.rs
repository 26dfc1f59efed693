//! Error types for configuration and backend collaborators
//!
//! The simulation itself never fails; only start-up validation and the
//! network-facing collaborators can.

use thiserror::Error;

/// Invalid or unreadable game balance configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("viewport must be positive, got {width}x{height}")]
    Viewport { width: f32, height: f32 },
    #[error("{what} ({size}) does not fit a viewport {viewport} wide")]
    TooWide {
        what: &'static str,
        size: f32,
        viewport: f32,
    },
    #[error("invalid range for {name}: min {min} > max {max}")]
    Range { name: &'static str, min: f32, max: f32 },
    #[error("{name} must be in [0, 1], got {value}")]
    Probability { name: &'static str, value: f32 },
    #[error("jump impulse must be negative (upward), got {0}")]
    JumpImpulse(f32),
    #[error("{name} must be a finite number, got {value}")]
    NotFinite { name: &'static str, value: f32 },
    #[error("{name} must be greater than zero, got {value}")]
    NotPositive { name: &'static str, value: f32 },
    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f32 },
    #[error("malformed tuning JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure reported by a stats/leaderboard/store collaborator
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("unknown player {0}")]
    UnknownPlayer(i64),
    #[error("unknown skin '{0}'")]
    UnknownSkin(String),
    #[error("not enough beans: need {price}, have {available}")]
    InsufficientBeans { price: u32, available: u32 },
    #[error("no player identity; running outside Telegram")]
    Anonymous,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = BackendError::InsufficientBeans {
            price: 250,
            available: 40,
        };
        assert_eq!(err.to_string(), "not enough beans: need 250, have 40");

        let err = ConfigError::Range {
            name: "platform gap",
            min: 130.0,
            max: 80.0,
        };
        assert!(err.to_string().contains("platform gap"));
    }

    #[test]
    fn test_json_errors_convert() {
        let parse: Result<u32, _> = serde_json::from_str("{");
        let err: ConfigError = parse.unwrap_err().into();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
