//! Settings for matrix inversion and calibration runs

/// Default relative pivot tolerance used by [`PivotTolerance::default`]
pub const DEFAULT_RELATIVE_PIVOT_TOLERANCE: f32 = 1e-6;

/// Default number of raw readings averaged for each calibration pose
pub const DEFAULT_SAMPLES_PER_POSE: u32 = 200;

/// Pivot test applied during Gauss-Jordan elimination
///
/// Decides when a pivot is too small for the matrix to be treated as
/// invertible.
///
/// # Variants
/// - **Exact**: only a pivot of exactly zero is singular. Near-singular
///   matrices invert "successfully" into numerically meaningless results.
/// - **Relative**: a pivot is singular when its magnitude is at or below
///   `epsilon`, measured after every row has been scaled so its largest
///   absolute entry is one.
///
/// # Example
/// ```
/// use affine_calibration::{Matrix, PivotTolerance};
///
/// let m = Matrix::from_rows(&[&[1.0, 1.0], &[1.0, 1.0 + 1e-7]]).unwrap();
/// assert!(m.inverse_with(PivotTolerance::Relative(1e-6)).is_err());
/// assert!(m.inverse_with(PivotTolerance::Exact).is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PivotTolerance {
    /// Fail only when the pivot is exactly zero
    Exact,
    /// Fail when `|pivot| <= epsilon` on the row-scaled matrix
    Relative(f32),
}

impl PivotTolerance {
    /// Threshold a pivot magnitude must exceed on a row-scaled matrix
    pub(crate) fn threshold(&self) -> f32 {
        match *self {
            PivotTolerance::Exact => 0.0,
            PivotTolerance::Relative(epsilon) => epsilon,
        }
    }
}

impl Default for PivotTolerance {
    fn default() -> Self {
        PivotTolerance::Relative(DEFAULT_RELATIVE_PIVOT_TOLERANCE)
    }
}

/// Calibration run settings
///
/// Configuration for a [`CalibrationSession`](crate::CalibrationSession) and
/// the solver it drives.
///
/// # Example
/// ```
/// use affine_calibration::{CalibrationSettings, PivotTolerance};
///
/// let settings = CalibrationSettings {
///     samples_per_pose: 50,                  // Shorter hold per orientation
///     pivot_tolerance: PivotTolerance::Exact, // Literal zero-pivot test
/// };
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationSettings {
    /// Raw readings averaged per pose (typically 200)
    ///
    /// More readings reduce sensor noise in the averaged measurement but
    /// require the device to be held still for longer.
    pub samples_per_pose: u32,
    /// Pivot test used when inverting the normal-equations matrix
    pub pivot_tolerance: PivotTolerance,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            samples_per_pose: DEFAULT_SAMPLES_PER_POSE,
            pivot_tolerance: PivotTolerance::default(),
        }
    }
}
