//! Least-squares solver turning pose samples into a calibration model

use nalgebra::{Matrix3, Vector3};

use crate::calibration::CalibrationModel;
use crate::error::{Error, Result};
use crate::matrix::Matrix;
use crate::pseudo_inverse::pseudo_inverse_with;
use crate::types::PivotTolerance;
use crate::vector::Vector;

/// Minimum number of poses needed to determine the 12 unknowns of `M` and `b`
pub const MIN_POSES: usize = 4;

/// One calibration data point
///
/// Pairs the direction a perfect sensor would report in a known orientation
/// with the averaged raw reading taken while the device was held there.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoseSample {
    /// Ground-truth direction for the orientation
    pub expected: Vector3<f32>,
    /// Mean of the raw readings taken in that orientation
    pub measured: Vector3<f32>,
}

impl PoseSample {
    /// Create a pose sample
    pub fn new(expected: Vector3<f32>, measured: Vector3<f32>) -> Self {
        Self { expected, measured }
    }

    /// Create a pose sample from dynamic-length vectors
    ///
    /// # Errors
    /// [`Error::DimensionMismatch`] when either vector is not 3 long
    pub fn from_vectors(expected: &Vector, measured: &Vector) -> Result<Self> {
        Ok(Self {
            expected: Vector3::try_from(expected)?,
            measured: Vector3::try_from(measured)?,
        })
    }
}

/// Expected directions of the six face-down poses, in recording order
///
/// Flat, upside down, rolled -90°, rolled 90°, pitched 90°, pitched -90°.
/// Axes follow the airframe convention: X towards the nose, Y to the left,
/// Z up.
pub fn six_face_directions() -> [Vector3<f32>; 6] {
    [
        Vector3::new(0.0, 0.0, 1.0),
        Vector3::new(0.0, 0.0, -1.0),
        Vector3::new(0.0, 1.0, 0.0),
        Vector3::new(0.0, -1.0, 0.0),
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(-1.0, 0.0, 0.0),
    ]
}

/// Solves `Expected ≈ [M | b] · [Raw; 1]` in the least-squares sense
///
/// With `N` poses, `Expected` is 3×N (expected directions as columns) and the
/// augmented raw matrix is 4×N (averaged readings as columns, a constant 1 in
/// the last row so the offset is solved jointly). The 3×4 result is
/// `Expected · pinv(RawAugmented)`; its first three columns are `M` and the
/// last is `b`.
///
/// Raw readings are centred on their mean and divided by their largest
/// deviation before the fit, and `M`, `b` are mapped back afterwards. Readings
/// in g and readings in raw counts therefore condition the normal equations
/// the same way.
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use affine_calibration::{CalibrationSolver, PoseSample, six_face_directions};
///
/// // A sensor that reads half scale with a constant bias
/// let bias = Vector3::new(0.1, -0.05, 0.02);
/// let poses: Vec<PoseSample> = six_face_directions()
///     .iter()
///     .map(|&expected| PoseSample::new(expected, expected * 0.5 + bias))
///     .collect();
///
/// let model = CalibrationSolver::new().solve(&poses).unwrap();
/// let corrected = model.apply_vector3(Vector3::new(0.0, 0.0, 0.5) + bias);
/// assert!((corrected - Vector3::new(0.0, 0.0, 1.0)).magnitude() < 1e-3);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CalibrationSolver {
    tolerance: PivotTolerance,
}

impl CalibrationSolver {
    /// Solver using the default [`PivotTolerance`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Solver using the given pivot test for the normal equations
    pub fn with_tolerance(tolerance: PivotTolerance) -> Self {
        Self { tolerance }
    }

    /// Pivot test in use
    pub fn tolerance(&self) -> PivotTolerance {
        self.tolerance
    }

    /// Solve for the affine correction
    ///
    /// The result is a pure function of `poses`: solving the same samples
    /// twice yields identical models.
    ///
    /// # Errors
    /// - [`Error::InsufficientPoses`] for fewer than [`MIN_POSES`] samples
    /// - [`Error::SingularMatrix`] when the poses are degenerate (too few
    ///   independent directions, duplicates)
    pub fn solve(&self, poses: &[PoseSample]) -> Result<CalibrationModel> {
        if poses.len() < MIN_POSES {
            log::warn!(
                "Insufficient calibration data: {} poses, at least {} required",
                poses.len(),
                MIN_POSES
            );
            return Err(Error::InsufficientPoses {
                required: MIN_POSES,
                provided: poses.len(),
            });
        }
        log::debug!("Solving affine calibration from {} poses", poses.len());

        let n = poses.len();
        let centroid = poses
            .iter()
            .fold(Vector3::<f32>::zeros(), |acc, pose| acc + pose.measured)
            / n as f32;
        let spread = poses
            .iter()
            .map(|pose| (pose.measured - centroid).amax())
            .fold(0.0f32, f32::max);
        if spread == 0.0 {
            // Every pose read the same raw vector
            return Err(degenerate());
        }

        let mut expected = Matrix::zeros(3, n);
        let mut raw_augmented = Matrix::zeros(4, n);
        for (col, pose) in poses.iter().enumerate() {
            let normalized = (pose.measured - centroid) / spread;
            for row in 0..3 {
                expected.set(row, col, pose.expected[row])?;
                raw_augmented.set(row, col, normalized[row])?;
            }
            raw_augmented.set(3, col, 1.0)?;
        }

        let pinv = pseudo_inverse_with(&raw_augmented, self.tolerance).map_err(|e| match e {
            Error::SingularMatrix => degenerate(),
            other => other,
        })?;
        let solution = expected.multiply(&pinv)?;

        // expected ≈ S·(raw - c)/s + t, so M = S/s and b = t - M·c
        let mut linear_map = Matrix3::<f32>::zeros();
        let mut shifted_offset = Vector3::<f32>::zeros();
        for row in 0..3 {
            for col in 0..3 {
                linear_map[(row, col)] = solution.get(row, col)? / spread;
            }
            shifted_offset[row] = solution.get(row, 3)?;
        }
        let offset = shifted_offset - linear_map * centroid;

        let model = CalibrationModel::new(linear_map, offset);
        log::info!(
            "Calibration solved from {} poses, rms residual {:.5}",
            n,
            model.rms_residual(poses)
        );
        Ok(model)
    }
}

fn degenerate() -> Error {
    log::warn!("Calibration data is insufficient or degenerate, repeat the procedure");
    Error::SingularMatrix
}
