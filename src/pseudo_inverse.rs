//! Moore-Penrose pseudo-inverse by the normal-equations method
//!
//! The pseudo-inverse is formed from the Gram matrix of the input rather than
//! from a singular value decomposition:
//!
//! - tall or square `M` (rows ≥ cols): `(MᵀM)⁻¹ Mᵀ`, a left inverse
//! - wide `M` (rows < cols): `Mᵀ (MMᵀ)⁻¹`, a right inverse
//!
//! Forming the Gram matrix squares the condition number, so ill-conditioned
//! inputs lose roughly twice as many digits as an SVD would. Calibration
//! matrices are small and well-conditioned by construction of the poses.
//!
//! # Example
//! ```
//! use affine_calibration::{Matrix, pseudo_inverse};
//!
//! // 3x2 tall matrix with full column rank
//! let m = Matrix::from_rows(&[&[1.0, 0.0], &[0.0, 1.0], &[1.0, 1.0]]).unwrap();
//! let pinv = pseudo_inverse(&m).unwrap();
//!
//! let identity = pinv.multiply(&m).unwrap();
//! assert!(identity.max_abs_diff(&Matrix::identity(2)).unwrap() < 1e-5);
//! ```

use crate::error::Result;
use crate::matrix::Matrix;
use crate::types::PivotTolerance;

/// Pseudo-inverse of `m` using the default [`PivotTolerance`]
///
/// # Errors
/// [`Error::SingularMatrix`](crate::Error::SingularMatrix) when the Gram
/// matrix is singular, i.e. `m` does not have full rank.
pub fn pseudo_inverse(m: &Matrix) -> Result<Matrix> {
    pseudo_inverse_with(m, PivotTolerance::default())
}

/// Pseudo-inverse of `m`, inverting the Gram matrix with `tolerance`
///
/// The result has shape `cols × rows`.
pub fn pseudo_inverse_with(m: &Matrix, tolerance: PivotTolerance) -> Result<Matrix> {
    let mt = m.transpose();
    if m.rows() >= m.cols() {
        let mut gram = mt.multiply(m)?;
        gram.invert_with(tolerance)?;
        gram.multiply(&mt)
    } else {
        let mut gram = m.multiply(&mt)?;
        gram.invert_with(tolerance)?;
        mt.multiply(&gram)
    }
}

impl Matrix {
    /// Moore-Penrose pseudo-inverse, see [`pseudo_inverse`]
    pub fn pseudo_inverse(&self) -> Result<Matrix> {
        pseudo_inverse(self)
    }
}
