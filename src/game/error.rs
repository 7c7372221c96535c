use thiserror::Error;

/// Errors raised when a game session cannot be constructed.
///
/// Gameplay conditions (collisions, a full grid) are never errors; they are
/// reported through [`StepResult`](super::StepResult).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    /// Grid dimensions must be positive and fit in the coordinate space.
    #[error("invalid grid size {width}x{height}: both dimensions must be between 1 and {max}", max = i32::MAX)]
    InvalidGridSize { width: usize, height: usize },

    /// Speed bounds must satisfy `1 <= min <= max`.
    #[error("invalid speed range [{min}, {max}]")]
    InvalidSpeedRange { min: u32, max: u32 },

    /// The starting speed must lie inside the configured bounds.
    #[error("initial speed {speed} is outside [{min}, {max}]")]
    InitialSpeedOutOfRange { speed: u32, min: u32, max: u32 },

    #[error("bonus food probability {0} is not within [0, 1]")]
    InvalidBonusProbability(f64),

    #[error("tick interval must be non-zero at every speed")]
    InvalidTickRate,
}
