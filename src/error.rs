// THEORY:
// Every failure the lighting engine can report lives in one enum. Filters are pure
// and deterministic, so errors are raised at the call that detects them and never
// retried. Out-of-range coordinates are deliberately NOT an error: reading outside
// a buffer yields an absent cell, and that is how image borders are handled.

use std::fmt;

pub type Dimensions = (u32, u32);

#[derive(Debug, Clone, PartialEq)]
pub enum LightingError {
    /// Normal-map strength was zero, negative, NaN or infinite.
    InvalidStrength { strength: f64 },
    /// `relight` was given a normal map whose size differs from the source.
    DimensionMismatch { expected: Dimensions, got: Dimensions },
    /// A raw BGRA byte sequence does not hold exactly `width * height` pixels.
    BufferSizeMismatch { expected: usize, got: usize },
    /// A pipeline configuration value was rejected.
    InvalidConfig(String),
    /// A mean was requested over a neighborhood with no present pixels.
    EmptyNeighborhood { x: u32, y: u32 },
    /// The filter thread pool could not be created.
    ThreadPool(String),
    /// The preview worker has shut down and can no longer answer requests.
    WorkerUnavailable,
}

impl LightingError {
    /// True for the errors caused by a bad argument from the caller.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::InvalidStrength { .. }
                | Self::DimensionMismatch { .. }
                | Self::BufferSizeMismatch { .. }
                | Self::InvalidConfig(_)
        )
    }
}

impl fmt::Display for LightingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStrength { strength } => {
                write!(f, "invalid argument: strength must be a finite value > 0, got {strength}")
            }
            Self::DimensionMismatch { expected, got } => write!(
                f,
                "invalid argument: expected a {}x{} buffer, got {}x{}",
                expected.0, expected.1, got.0, got.1
            ),
            Self::BufferSizeMismatch { expected, got } => {
                write!(f, "invalid argument: expected {expected} bytes, got {got}")
            }
            Self::InvalidConfig(reason) => write!(f, "invalid argument: {reason}"),
            Self::EmptyNeighborhood { x, y } => {
                write!(f, "empty neighborhood around ({x}, {y}): no pixels to average")
            }
            Self::ThreadPool(reason) => write!(f, "failed to build filter thread pool: {reason}"),
            Self::WorkerUnavailable => f.write_str("preview worker is no longer running"),
        }
    }
}

impl std::error::Error for LightingError {}

pub type Result<T> = std::result::Result<T, LightingError>;
