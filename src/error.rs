//! Error types for the calibration library

use alloc::string::String;

/// Result type alias
pub type Result<T> = core::result::Result<T, Error>;

/// Failures reported by the linear-algebra engine and the calibration pipeline.
///
/// Nothing in this crate recovers from these locally; they are returned to
/// the caller, who decides whether to retry with different input or fall
/// back to uncorrected readings.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Operand shapes are incompatible
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension required by the operation
        expected: usize,
        /// Dimension actually supplied
        actual: usize,
    },

    /// Element access beyond bounds
    #[error("Index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Length of the indexed axis
        len: usize,
    },

    /// Inversion requested on a non-square matrix
    #[error("Cannot invert a non-square {rows}x{cols} matrix")]
    NotSquare {
        /// Row count
        rows: usize,
        /// Column count
        cols: usize,
    },

    /// A pivot failed the singularity test during inversion
    #[error("Matrix is singular")]
    SingularMatrix,

    /// Normalisation attempted on a zero-length vector
    #[error("Cannot normalize a zero vector")]
    DegenerateVector,

    /// Too few pose samples to determine the affine map
    #[error("Insufficient calibration data: {provided} poses, at least {required} required")]
    InsufficientPoses {
        /// Minimum number of poses
        required: usize,
        /// Number of poses supplied
        provided: usize,
    },

    /// The raw-reading source stopped delivering while a pose was recorded
    #[error("Raw source unavailable after {collected} of {requested} readings")]
    SourceUnavailable {
        /// Readings accumulated before the failure
        collected: u32,
        /// Readings requested for the pose
        requested: u32,
    },

    /// Persisted calibration did not hold the expected number of values
    #[error("Expected {expected} calibration coefficients, found {found}")]
    InvalidCoefficientCount {
        /// Required coefficient count
        expected: usize,
        /// Coefficients found
        found: usize,
    },

    /// Persisted calibration contained a value that is not a decimal number
    #[error("Invalid calibration coefficient {token:?} at position {position}")]
    InvalidCoefficient {
        /// Zero-based position of the value
        position: usize,
        /// Offending text
        token: String,
    },

    /// I/O error while loading or saving a calibration file
    #[cfg(feature = "std")]
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the failure means the pose set cannot determine a calibration.
    ///
    /// The calibration tool reports these to the operator as insufficient or
    /// degenerate data and asks for the procedure to be repeated.
    pub fn is_degenerate_calibration(&self) -> bool {
        matches!(self, Error::SingularMatrix | Error::InsufficientPoses { .. })
    }
}
