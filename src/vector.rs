//! Dynamic-length vector with checked elementwise arithmetic

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use nalgebra::{ComplexField, Vector3};

use crate::error::{Error, Result};

/// Ordered sequence of real numbers whose length is fixed at construction
///
/// Arithmetic never mutates an operand: `add`, `subtract`, `scale` and
/// `normalize` all return a new vector. The only mutating operation is
/// [`Vector::set`].
///
/// # Example
/// ```
/// use affine_calibration::Vector;
///
/// let a = Vector::from_xyz(1.0, 2.0, 3.0);
/// let b = Vector::from_xyz(4.0, 5.0, 6.0);
///
/// let sum = a.add(&b).unwrap();
/// assert_eq!(sum.as_slice(), &[5.0, 7.0, 9.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector {
    data: Vec<f32>,
}

impl Vector {
    /// Create a zero-filled vector of the given length
    pub fn zeros(len: usize) -> Self {
        Self { data: vec![0.0; len] }
    }

    /// Create a 3-component vector
    pub fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self {
            data: vec![x, y, z],
        }
    }

    /// Create a vector holding a copy of `values`
    pub fn from_slice(values: &[f32]) -> Self {
        Self {
            data: values.to_vec(),
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True for a zero-length vector
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow the elements
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Read the element at `index`
    ///
    /// # Errors
    /// [`Error::IndexOutOfRange`] when `index >= len()`
    pub fn get(&self, index: usize) -> Result<f32> {
        self.data.get(index).copied().ok_or(Error::IndexOutOfRange {
            index,
            len: self.data.len(),
        })
    }

    /// Overwrite the element at `index`
    ///
    /// # Errors
    /// [`Error::IndexOutOfRange`] when `index >= len()`
    pub fn set(&mut self, index: usize, value: f32) -> Result<()> {
        let len = self.data.len();
        let slot = self
            .data
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })?;
        *slot = value;
        Ok(())
    }

    /// Elementwise sum
    ///
    /// # Errors
    /// [`Error::DimensionMismatch`] when the lengths differ
    #[allow(clippy::should_implement_trait)]
    pub fn add(&self, other: &Vector) -> Result<Vector> {
        self.zip_with(other, |a, b| a + b)
    }

    /// Elementwise difference `self - other`
    ///
    /// # Errors
    /// [`Error::DimensionMismatch`] when the lengths differ
    pub fn subtract(&self, other: &Vector) -> Result<Vector> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Multiply every element by `factor`
    pub fn scale(&self, factor: f32) -> Vector {
        Self {
            data: self.data.iter().map(|v| v * factor).collect(),
        }
    }

    /// Euclidean norm
    ///
    /// Components are divided by the largest magnitude before squaring, so
    /// the sum neither overflows nor flushes to zero.
    pub fn norm(&self) -> f32 {
        let largest = self.max_abs();
        if largest == 0.0 {
            return 0.0;
        }
        largest * self.scaled_norm(largest)
    }

    /// Unit vector pointing in the same direction
    ///
    /// # Errors
    /// [`Error::DegenerateVector`] when every component is zero or any
    /// component is infinite
    ///
    /// # Example
    /// ```
    /// use affine_calibration::{Error, Vector};
    ///
    /// let unit = Vector::from_xyz(3.0, 4.0, 0.0).normalize().unwrap();
    /// assert!((unit.norm() - 1.0).abs() < 1e-6);
    ///
    /// assert!(matches!(Vector::zeros(3).normalize(), Err(Error::DegenerateVector)));
    /// ```
    pub fn normalize(&self) -> Result<Vector> {
        let largest = self.max_abs();
        if largest == 0.0 || !largest.is_finite() {
            return Err(Error::DegenerateVector);
        }
        let norm = self.scaled_norm(largest);
        Ok(Self {
            data: self.data.iter().map(|v| v / largest / norm).collect(),
        })
    }

    fn max_abs(&self) -> f32 {
        self.data
            .iter()
            .fold(0.0f32, |acc, v| acc.max(ComplexField::abs(*v)))
    }

    /// Norm of `self / largest`, which lies in `[1, sqrt(len)]`
    fn scaled_norm(&self, largest: f32) -> f32 {
        ComplexField::sqrt(
            self.data
                .iter()
                .map(|v| {
                    let scaled = v / largest;
                    scaled * scaled
                })
                .sum::<f32>(),
        )
    }

    /// Dot product with `other`, see [`inner_product`]
    pub fn dot(&self, other: &Vector) -> Result<f32> {
        inner_product(self, other)
    }

    fn zip_with(&self, other: &Vector, op: impl Fn(f32, f32) -> f32) -> Result<Vector> {
        self.check_len(other)?;
        Ok(Self {
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(&a, &b)| op(a, b))
                .collect(),
        })
    }

    fn check_len(&self, other: &Vector) -> Result<()> {
        if self.data.len() != other.data.len() {
            return Err(Error::DimensionMismatch {
                expected: self.data.len(),
                actual: other.data.len(),
            });
        }
        Ok(())
    }
}

/// Inner (dot) product of two vectors of equal length
///
/// # Errors
/// [`Error::DimensionMismatch`] when the lengths differ
///
/// # Example
/// ```
/// use affine_calibration::{inner_product, Vector};
///
/// let a = Vector::from_xyz(1.0, 2.0, 3.0);
/// let b = Vector::from_xyz(4.0, -5.0, 6.0);
/// assert_eq!(inner_product(&a, &b).unwrap(), 12.0);
/// ```
pub fn inner_product(a: &Vector, b: &Vector) -> Result<f32> {
    a.check_len(b)?;
    Ok(a.data.iter().zip(b.data.iter()).map(|(x, y)| x * y).sum())
}

impl From<Vector3<f32>> for Vector {
    fn from(v: Vector3<f32>) -> Self {
        Self::from_xyz(v.x, v.y, v.z)
    }
}

impl TryFrom<&Vector> for Vector3<f32> {
    type Error = Error;

    fn try_from(v: &Vector) -> Result<Self> {
        match v.data.as_slice() {
            &[x, y, z] => Ok(Vector3::new(x, y, z)),
            other => Err(Error::DimensionMismatch {
                expected: 3,
                actual: other.len(),
            }),
        }
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value:.6}")?;
        }
        write!(f, "]")
    }
}
