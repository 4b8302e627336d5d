//! Dynamic-size row-major matrix with Gauss-Jordan inversion

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use nalgebra::ComplexField;

use crate::error::{Error, Result};
use crate::types::PivotTolerance;
use crate::vector::Vector;

/// Rows × cols grid of real numbers stored in one contiguous row-major buffer
///
/// The shape is fixed at construction. Element `(row, col)` lives at
/// `row * cols + col`.
///
/// # Example
/// ```
/// use affine_calibration::{Matrix, Vector};
///
/// let m = Matrix::from_rows(&[&[2.0, 0.0], &[0.0, 2.0]]).unwrap();
/// let v = Vector::from_slice(&[3.0, 4.0]);
///
/// assert_eq!(m.multiply_vector(&v).unwrap().as_slice(), &[6.0, 8.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Matrix {
    /// Create a zero-filled `rows × cols` matrix
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Create the `n × n` identity matrix
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        m
    }

    /// Create a matrix from a row-major buffer
    ///
    /// # Errors
    /// [`Error::DimensionMismatch`] when `data.len() != rows * cols`
    pub fn from_row_slice(rows: usize, cols: usize, data: &[f32]) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::DimensionMismatch {
                expected: rows * cols,
                actual: data.len(),
            });
        }
        Ok(Self {
            rows,
            cols,
            data: data.to_vec(),
        })
    }

    /// Create a matrix from a list of rows
    ///
    /// # Errors
    /// [`Error::DimensionMismatch`] when the rows are not all the same length
    pub fn from_rows(rows: &[&[f32]]) -> Result<Self> {
        let cols = rows.first().map_or(0, |r| r.len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            if row.len() != cols {
                return Err(Error::DimensionMismatch {
                    expected: cols,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// True when `rows == cols`
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Borrow the row-major buffer
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Read element `(row, col)`
    ///
    /// # Errors
    /// [`Error::IndexOutOfRange`] when either index is beyond the shape
    pub fn get(&self, row: usize, col: usize) -> Result<f32> {
        let index = self.index_of(row, col)?;
        Ok(self.data[index])
    }

    /// Overwrite element `(row, col)`
    ///
    /// # Errors
    /// [`Error::IndexOutOfRange`] when either index is beyond the shape
    pub fn set(&mut self, row: usize, col: usize, value: f32) -> Result<()> {
        let index = self.index_of(row, col)?;
        self.data[index] = value;
        Ok(())
    }

    /// Borrow one row
    ///
    /// # Errors
    /// [`Error::IndexOutOfRange`] when `row >= rows()`
    pub fn row(&self, row: usize) -> Result<&[f32]> {
        if row >= self.rows {
            return Err(Error::IndexOutOfRange {
                index: row,
                len: self.rows,
            });
        }
        Ok(&self.data[row * self.cols..(row + 1) * self.cols])
    }

    /// Copy one column into a vector
    ///
    /// # Errors
    /// [`Error::IndexOutOfRange`] when `col >= cols()`
    pub fn column(&self, col: usize) -> Result<Vector> {
        if col >= self.cols {
            return Err(Error::IndexOutOfRange {
                index: col,
                len: self.cols,
            });
        }
        let values: Vec<f32> = (0..self.rows).map(|r| self.data[r * self.cols + col]).collect();
        Ok(Vector::from_slice(&values))
    }

    /// Overwrite one column
    ///
    /// # Errors
    /// - [`Error::IndexOutOfRange`] when `col >= cols()`
    /// - [`Error::DimensionMismatch`] when `values.len() != rows()`
    pub fn set_column(&mut self, col: usize, values: &Vector) -> Result<()> {
        if col >= self.cols {
            return Err(Error::IndexOutOfRange {
                index: col,
                len: self.cols,
            });
        }
        if values.len() != self.rows {
            return Err(Error::DimensionMismatch {
                expected: self.rows,
                actual: values.len(),
            });
        }
        for (r, &value) in values.as_slice().iter().enumerate() {
            self.data[r * self.cols + col] = value;
        }
        Ok(())
    }

    /// Transposed copy, shape `cols × rows`
    pub fn transpose(&self) -> Matrix {
        let mut result = Matrix::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                result.data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        result
    }

    /// Matrix × column vector
    ///
    /// # Errors
    /// [`Error::DimensionMismatch`] when `cols() != vector.len()`
    pub fn multiply_vector(&self, vector: &Vector) -> Result<Vector> {
        if self.cols != vector.len() {
            return Err(Error::DimensionMismatch {
                expected: self.cols,
                actual: vector.len(),
            });
        }
        let v = vector.as_slice();
        let mut result = Vector::zeros(self.rows);
        for i in 0..self.rows {
            let row = &self.data[i * self.cols..(i + 1) * self.cols];
            result.set(i, row.iter().zip(v).map(|(a, b)| a * b).sum())?;
        }
        Ok(result)
    }

    /// Matrix × matrix
    ///
    /// # Errors
    /// [`Error::DimensionMismatch`] when `self.cols() != other.rows()`
    pub fn multiply(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.rows {
            return Err(Error::DimensionMismatch {
                expected: self.cols,
                actual: other.rows,
            });
        }
        let mut result = Matrix::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for j in 0..other.cols {
                let mut sum = 0.0;
                for k in 0..self.cols {
                    sum += self.data[i * self.cols + k] * other.data[k * other.cols + j];
                }
                result.data[i * other.cols + j] = sum;
            }
        }
        Ok(result)
    }

    /// Invert in place using the default [`PivotTolerance`]
    ///
    /// See [`Matrix::invert_with`].
    pub fn invert(&mut self) -> Result<()> {
        self.invert_with(PivotTolerance::default())
    }

    /// Invert in place by Gauss-Jordan elimination with partial pivoting
    ///
    /// For each diagonal position the row with the largest magnitude in that
    /// column is swapped up as pivot, the pivot row is scaled so the pivot
    /// becomes one, and the column is eliminated from every other row. The
    /// inverse is built in the same storage, so the recorded row swaps are
    /// finally undone as column swaps in reverse order.
    ///
    /// Every row is first divided by its largest absolute entry, so the pivot
    /// test sees each row on a unit scale and rows of very different
    /// magnitude (raw sensor counts next to a constant 1) do not mask each
    /// other. The row scales are folded back into the columns of the result.
    ///
    /// # Errors
    /// - [`Error::NotSquare`] when `rows() != cols()`
    /// - [`Error::SingularMatrix`] when a row is all zero or a pivot fails
    ///   `tolerance`. The matrix contents are unspecified afterwards.
    ///
    /// # Example
    /// ```
    /// use affine_calibration::{Matrix, PivotTolerance};
    ///
    /// let mut m = Matrix::from_rows(&[&[0.0, 1.0], &[1.0, 0.0]]).unwrap();
    /// m.invert_with(PivotTolerance::Exact).unwrap();
    /// assert_eq!(m.as_slice(), &[0.0, 1.0, 1.0, 0.0]);
    /// ```
    pub fn invert_with(&mut self, tolerance: PivotTolerance) -> Result<()> {
        if !self.is_square() {
            return Err(Error::NotSquare {
                rows: self.rows,
                cols: self.cols,
            });
        }
        let n = self.rows;
        let mut row_scales = vec![0.0f32; n];
        for (i, row) in self.data.chunks_mut(n.max(1)).enumerate() {
            let scale = row.iter().fold(0.0f32, |acc, v| acc.max(ComplexField::abs(*v)));
            if scale == 0.0 {
                return Err(Error::SingularMatrix);
            }
            for value in row.iter_mut() {
                *value /= scale;
            }
            row_scales[i] = scale;
        }
        let threshold = tolerance.threshold();
        let mut pivot_rows = vec![0usize; n];

        for k in 0..n {
            // Largest magnitude in column k; ties go to the last candidate
            let mut pivot_row = k;
            let mut largest = 0.0;
            for i in k..n {
                let candidate = ComplexField::abs(self.data[i * n + k]);
                if candidate >= largest {
                    largest = candidate;
                    pivot_row = i;
                }
            }

            if largest <= threshold {
                return Err(Error::SingularMatrix);
            }

            if pivot_row != k {
                self.swap_rows(k, pivot_row);
            }
            pivot_rows[k] = pivot_row;

            let inverse_pivot = 1.0 / self.data[k * n + k];
            self.data[k * n + k] = 1.0;
            for j in 0..n {
                self.data[k * n + j] *= inverse_pivot;
            }

            for i in (0..n).filter(|&i| i != k) {
                let factor = self.data[i * n + k];
                self.data[i * n + k] = 0.0;
                for j in 0..n {
                    self.data[i * n + j] -= self.data[k * n + j] * factor;
                }
            }
        }

        for (k, &pivot_row) in pivot_rows.iter().enumerate().rev() {
            if pivot_row != k {
                self.swap_columns(k, pivot_row);
            }
        }

        // inv(A) = inv(D·A)·D with D = diag(1 / row_scales)
        for row in self.data.chunks_mut(n.max(1)) {
            for (value, scale) in row.iter_mut().zip(row_scales.iter()) {
                *value /= scale;
            }
        }

        Ok(())
    }

    /// Inverted copy using the default [`PivotTolerance`]
    pub fn inverse(&self) -> Result<Matrix> {
        self.inverse_with(PivotTolerance::default())
    }

    /// Inverted copy; `self` is left untouched even on failure
    pub fn inverse_with(&self, tolerance: PivotTolerance) -> Result<Matrix> {
        let mut result = self.clone();
        result.invert_with(tolerance)?;
        Ok(result)
    }

    /// Largest absolute elementwise difference to `other`
    ///
    /// # Errors
    /// [`Error::DimensionMismatch`] when the shapes differ
    pub fn max_abs_diff(&self, other: &Matrix) -> Result<f32> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(Error::DimensionMismatch {
                expected: self.data.len(),
                actual: other.data.len(),
            });
        }
        Ok(self
            .data
            .iter()
            .zip(other.data.iter())
            .fold(0.0f32, |acc, (a, b)| acc.max(ComplexField::abs(a - b))))
    }

    fn index_of(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows {
            return Err(Error::IndexOutOfRange {
                index: row,
                len: self.rows,
            });
        }
        if col >= self.cols {
            return Err(Error::IndexOutOfRange {
                index: col,
                len: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        for j in 0..self.cols {
            self.data.swap(a * self.cols + j, b * self.cols + j);
        }
    }

    fn swap_columns(&mut self, a: usize, b: usize) {
        for i in 0..self.rows {
            self.data.swap(i * self.cols + a, i * self.cols + b);
        }
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.data.chunks(self.cols.max(1)) {
            write!(f, "[")?;
            for (j, value) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{value:.6}")?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn assert_matrix_eq(actual: &Matrix, expected: &Matrix, tolerance: f32) {
        let diff = actual.max_abs_diff(expected).unwrap();
        assert!(
            diff < tolerance,
            "Matrices differ by {}:\n{}\nvs\n{}",
            diff,
            actual,
            expected
        );
    }

    #[test]
    fn test_construction_and_access() {
        let mut m = Matrix::zeros(2, 3);
        assert_eq!((m.rows(), m.cols()), (2, 3));
        m.set(1, 2, 5.0).unwrap();
        assert_eq!(m.get(1, 2).unwrap(), 5.0);
        assert_eq!(m.as_slice(), &[0.0, 0.0, 0.0, 0.0, 0.0, 5.0]);

        assert!(matches!(
            m.get(2, 0),
            Err(Error::IndexOutOfRange { index: 2, len: 2 })
        ));
        assert!(matches!(
            m.set(0, 3, 1.0),
            Err(Error::IndexOutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_deep_copy() {
        let original = Matrix::identity(2);
        let mut copy = original.clone();
        copy.set(0, 1, 9.0).unwrap();
        assert_eq!(original.get(0, 1).unwrap(), 0.0);
    }

    #[test]
    fn test_from_rows_rejects_ragged_input() {
        assert!(matches!(
            Matrix::from_rows(&[&[1.0, 2.0], &[3.0]]),
            Err(Error::DimensionMismatch { expected: 2, actual: 1 })
        ));
        assert!(Matrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn test_rows_and_columns() {
        let mut m = Matrix::from_rows(&[&[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0]]).unwrap();
        assert_eq!(m.row(1).unwrap(), &[3.0, 4.0]);
        assert_eq!(m.column(1).unwrap().as_slice(), &[2.0, 4.0, 6.0]);

        m.set_column(0, &Vector::from_xyz(7.0, 8.0, 9.0)).unwrap();
        assert_eq!(m.column(0).unwrap().as_slice(), &[7.0, 8.0, 9.0]);

        assert!(m.row(3).is_err());
        assert!(m.column(2).is_err());
        assert!(m.set_column(0, &Vector::zeros(2)).is_err());
    }

    #[test]
    fn test_transpose() {
        let m = Matrix::from_rows(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]]).unwrap();
        let t = m.transpose();
        assert_eq!((t.rows(), t.cols()), (3, 2));
        assert_eq!(t.as_slice(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        assert_eq!(t.transpose(), m);
    }

    #[test]
    fn test_multiply_vector() {
        let m = Matrix::from_rows(&[&[1.0, 2.0, 3.0], &[0.0, -1.0, 1.0]]).unwrap();
        let v = Vector::from_xyz(1.0, 1.0, 2.0);
        assert_eq!(m.multiply_vector(&v).unwrap().as_slice(), &[9.0, 1.0]);

        assert!(matches!(
            m.multiply_vector(&Vector::zeros(2)),
            Err(Error::DimensionMismatch { expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_multiply_matrix() {
        let a = Matrix::from_rows(&[&[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0]]).unwrap();
        let b = Matrix::from_rows(&[&[1.0, 0.0, 2.0], &[0.0, 1.0, -1.0]]).unwrap();
        let c = a.multiply(&b).unwrap();
        assert_eq!((c.rows(), c.cols()), (3, 3));
        assert_eq!(
            c.as_slice(),
            &[1.0, 2.0, 0.0, 3.0, 4.0, 2.0, 5.0, 6.0, 4.0]
        );

        assert!(matches!(
            a.multiply(&a),
            Err(Error::DimensionMismatch { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn test_invert_diagonal() {
        let mut m = Matrix::from_rows(&[&[1.0, 0.0], &[0.0, 2.0]]).unwrap();
        m.invert().unwrap();
        assert_eq!(m.as_slice(), &[1.0, 0.0, 0.0, 0.5]);
    }

    #[test]
    fn test_invert_requires_row_swap() {
        // Column undo step is needed to restore the correct layout
        let mut m = Matrix::from_rows(&[&[0.0, 1.0], &[1.0, 0.0]]).unwrap();
        m.invert().unwrap();
        assert_eq!(m.as_slice(), &[0.0, 1.0, 1.0, 0.0]);

        let m = Matrix::from_rows(&[&[0.0, 2.0, 1.0], &[1.0, 0.0, 0.0], &[3.0, 1.0, 4.0]])
            .unwrap();
        let inv = m.inverse().unwrap();
        assert_matrix_eq(&m.multiply(&inv).unwrap(), &Matrix::identity(3), EPSILON);
        assert_matrix_eq(&inv.multiply(&m).unwrap(), &Matrix::identity(3), EPSILON);
    }

    #[test]
    fn test_invert_general() {
        let m = Matrix::from_rows(&[
            &[4.0, 7.0, 2.0, 0.5],
            &[3.0, 6.0, 1.0, -1.0],
            &[2.0, 5.0, 3.0, 2.0],
            &[1.0, -2.0, 0.0, 3.0],
        ])
        .unwrap();
        let inv = m.inverse().unwrap();
        assert_matrix_eq(&m.multiply(&inv).unwrap(), &Matrix::identity(4), EPSILON);
    }

    #[test]
    fn test_invert_not_square() {
        let mut m = Matrix::zeros(2, 3);
        assert!(matches!(
            m.invert(),
            Err(Error::NotSquare { rows: 2, cols: 3 })
        ));
    }

    #[test]
    fn test_invert_singular() {
        let mut m = Matrix::from_rows(&[&[0.0, 0.0], &[0.0, 1.0]]).unwrap();
        assert!(matches!(
            m.invert_with(PivotTolerance::Exact),
            Err(Error::SingularMatrix)
        ));

        let m = Matrix::from_rows(&[&[1.0, 2.0], &[2.0, 4.0]]).unwrap();
        assert!(matches!(m.inverse(), Err(Error::SingularMatrix)));
        assert!(matches!(
            Matrix::zeros(3, 3).inverse(),
            Err(Error::SingularMatrix)
        ));
    }

    #[test]
    fn test_inverse_leaves_original_intact() {
        let m = Matrix::from_rows(&[&[2.0, 1.0], &[1.0, 1.0]]).unwrap();
        let inv = m.inverse().unwrap();
        assert_eq!(m.as_slice(), &[2.0, 1.0, 1.0, 1.0]);
        assert_matrix_eq(
            &inv,
            &Matrix::from_rows(&[&[1.0, -1.0], &[-1.0, 2.0]]).unwrap(),
            EPSILON,
        );
    }

    #[test]
    fn test_relative_tolerance_rejects_near_singular() {
        let m = Matrix::from_rows(&[&[1000.0, 1000.0], &[1000.0, 1000.0005]]).unwrap();
        assert!(matches!(
            m.inverse_with(PivotTolerance::Relative(1e-6)),
            Err(Error::SingularMatrix)
        ));
        // The literal zero test lets it through
        assert!(m.inverse_with(PivotTolerance::Exact).is_ok());
    }

    #[test]
    fn test_rows_of_very_different_magnitude() {
        let m = Matrix::from_rows(&[&[1e7, 0.0], &[0.0, 1.0]]).unwrap();
        let inv = m.inverse().unwrap();
        assert!((inv.get(0, 0).unwrap() - 1e-7).abs() < 1e-12);
        assert_eq!(inv.get(1, 1).unwrap(), 1.0);
        assert_eq!(inv.get(0, 1).unwrap(), 0.0);

        let m = Matrix::from_rows(&[&[2e6, 1e6], &[1.0, 3.0]]).unwrap();
        let inv = m.inverse().unwrap();
        assert_matrix_eq(&m.multiply(&inv).unwrap(), &Matrix::identity(2), EPSILON);
        assert_matrix_eq(&inv.multiply(&m).unwrap(), &Matrix::identity(2), EPSILON);
    }

    #[test]
    fn test_relative_tolerance_is_scale_invariant() {
        let small = Matrix::from_rows(&[&[1e-4, 0.0], &[0.0, 2e-4]]).unwrap();
        let inv = small.inverse().unwrap();
        assert_matrix_eq(
            &inv,
            &Matrix::from_rows(&[&[1e4, 0.0], &[0.0, 5e3]]).unwrap(),
            1e-1,
        );
    }
}
