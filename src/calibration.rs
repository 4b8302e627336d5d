//! Affine sensor calibration model applied to live readings

use core::fmt;

use nalgebra::{ComplexField, Matrix3, Vector3};

use crate::error::Result;
use crate::solver::PoseSample;
use crate::vector::Vector;

/// Applies an affine calibration to a raw reading
///
/// Computes `linear_map * uncalibrated + offset`.
///
/// # Arguments
/// * `uncalibrated` - Raw sensor reading
/// * `linear_map` - 3x3 scale, cross-axis and misalignment correction
/// * `offset` - Offset added after the linear map
///
/// # Returns
/// Calibrated sensor reading
///
/// # Example
/// ```
/// use nalgebra::{Matrix3, Vector3};
/// use affine_calibration::calibration::calibrate_affine;
///
/// let raw = Vector3::new(1.0, 2.0, 3.0);
/// let linear_map = Matrix3::identity() * 2.0;
/// let offset = Vector3::new(0.1, 0.2, 0.3);
///
/// let calibrated = calibrate_affine(raw, linear_map, offset);
/// assert!((calibrated - Vector3::new(2.1, 4.2, 6.3)).magnitude() < 1e-6);
/// ```
pub fn calibrate_affine(
    uncalibrated: Vector3<f32>,
    linear_map: Matrix3<f32>,
    offset: Vector3<f32>,
) -> Vector3<f32> {
    linear_map * uncalibrated + offset
}

/// Solved (or loaded) affine correction `true ≈ M·raw + b`
///
/// `M` and `b` cannot change once the model is built. The `enabled` flag can
/// be cleared to pass raw readings through untouched, which is how
/// uncorrected samples are collected while recalibrating.
///
/// The model is a plain `Copy` value, so one solved model can be handed to
/// any number of sensor adapters or threads.
///
/// # Example
/// ```
/// use nalgebra::{Matrix3, Vector3};
/// use affine_calibration::CalibrationModel;
///
/// let mut model = CalibrationModel::new(Matrix3::identity() * 0.5, Vector3::new(0.0, 0.0, 1.0));
/// let raw = Vector3::new(2.0, 2.0, 2.0);
///
/// assert_eq!(model.apply_vector3(raw), Vector3::new(1.0, 1.0, 2.0));
///
/// model.set_enabled(false);
/// assert_eq!(model.apply_vector3(raw), raw);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationModel {
    /// Linear part `M`
    linear_map: Matrix3<f32>,
    /// Offset `b`
    offset: Vector3<f32>,
    /// Whether `apply` corrects or passes through
    enabled: bool,
}

impl CalibrationModel {
    /// Create an enabled model from a linear map and an offset
    pub fn new(linear_map: Matrix3<f32>, offset: Vector3<f32>) -> Self {
        Self {
            linear_map,
            offset,
            enabled: true,
        }
    }

    /// Model that leaves every reading unchanged (`M = I`, `b = 0`)
    pub fn identity() -> Self {
        Self::new(Matrix3::identity(), Vector3::zeros())
    }

    /// Linear part `M`
    pub fn linear_map(&self) -> Matrix3<f32> {
        self.linear_map
    }

    /// Offset `b`
    pub fn offset(&self) -> Vector3<f32> {
        self.offset
    }

    /// Whether the correction is applied
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the correction without discarding `M` and `b`
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Correct a raw reading, or return it unchanged when disabled
    #[inline]
    pub fn apply_vector3(&self, raw: Vector3<f32>) -> Vector3<f32> {
        if self.enabled {
            calibrate_affine(raw, self.linear_map, self.offset)
        } else {
            raw
        }
    }

    /// Correct a dynamic-length raw reading
    ///
    /// # Errors
    /// [`Error::DimensionMismatch`](crate::Error::DimensionMismatch) when
    /// `raw` does not have exactly 3 components
    pub fn apply(&self, raw: &Vector) -> Result<Vector> {
        let raw = Vector3::try_from(raw)?;
        Ok(self.apply_vector3(raw).into())
    }

    /// Root-mean-square distance between corrected measurements and the
    /// expected directions of `poses`
    ///
    /// The correction is always applied here, regardless of the enabled
    /// flag. Returns zero for an empty pose set.
    pub fn rms_residual(&self, poses: &[PoseSample]) -> f32 {
        if poses.is_empty() {
            return 0.0;
        }
        let sum_squared: f32 = poses
            .iter()
            .map(|pose| {
                let corrected = calibrate_affine(pose.measured, self.linear_map, self.offset);
                (corrected - pose.expected).norm_squared()
            })
            .sum();
        ComplexField::sqrt(sum_squared / poses.len() as f32)
    }
}

impl Default for CalibrationModel {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Display for CalibrationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.enabled { "enabled" } else { "disabled" };
        writeln!(f, "Calibration ({state})")?;
        for row in 0..3 {
            writeln!(
                f,
                "  [{:9.6} {:9.6} {:9.6}]   [{:9.6}]",
                self.linear_map[(row, 0)],
                self.linear_map[(row, 1)],
                self.linear_map[(row, 2)],
                self.offset[row]
            )?;
        }
        Ok(())
    }
}
