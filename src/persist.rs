//! Plain-text persistence of calibration models
//!
//! A calibration file holds exactly 12 decimal values separated by
//! whitespace (one per line when written by this crate): the 9 entries of
//! `M` in row-major order followed by the 3 entries of `b`.
//!
//! ```text
//! 1.02
//! 0
//! 0
//! ...
//! 0.05
//! ```

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::Write as _;
use core::str::FromStr;

use nalgebra::{Matrix3, Vector3};

use crate::calibration::CalibrationModel;
use crate::error::{Error, Result};

/// Number of values in a persisted calibration
pub const COEFFICIENT_COUNT: usize = 12;

impl CalibrationModel {
    /// Build a model from `M` (row-major) followed by `b`
    ///
    /// # Errors
    /// [`Error::InvalidCoefficientCount`] unless exactly 12 values are given
    ///
    /// # Example
    /// ```
    /// use nalgebra::Vector3;
    /// use affine_calibration::CalibrationModel;
    ///
    /// let model = CalibrationModel::from_coefficients(&[
    ///     1.0, 0.0, 0.0, //
    ///     0.0, 1.0, 0.0, //
    ///     0.0, 0.0, 1.0, //
    ///     0.1, 0.2, 0.3,
    /// ])
    /// .unwrap();
    /// assert_eq!(model.offset(), Vector3::new(0.1, 0.2, 0.3));
    /// ```
    pub fn from_coefficients(values: &[f32]) -> Result<Self> {
        if values.len() != COEFFICIENT_COUNT {
            return Err(Error::InvalidCoefficientCount {
                expected: COEFFICIENT_COUNT,
                found: values.len(),
            });
        }
        let linear_map = Matrix3::from_row_slice(&values[..9]);
        let offset = Vector3::from_row_slice(&values[9..]);
        Ok(Self::new(linear_map, offset))
    }

    /// `M` in row-major order followed by `b`
    pub fn to_coefficients(&self) -> [f32; COEFFICIENT_COUNT] {
        let m = self.linear_map();
        let b = self.offset();
        let mut values = [0.0; COEFFICIENT_COUNT];
        for row in 0..3 {
            for col in 0..3 {
                values[row * 3 + col] = m[(row, col)];
            }
            values[9 + row] = b[row];
        }
        values
    }

    /// Parse the persisted text form
    ///
    /// # Errors
    /// - [`Error::InvalidCoefficient`] for a token that is not a finite
    ///   decimal number
    /// - [`Error::InvalidCoefficientCount`] unless exactly 12 values are found
    pub fn parse(text: &str) -> Result<Self> {
        let values = text
            .split_whitespace()
            .enumerate()
            .map(|(position, token)| match token.parse::<f32>() {
                Ok(value) if value.is_finite() => Ok(value),
                _ => Err(Error::InvalidCoefficient {
                    position,
                    token: token.to_string(),
                }),
            })
            .collect::<Result<Vec<f32>>>()?;
        Self::from_coefficients(&values)
    }

    /// Persisted text form, one value per line
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for value in self.to_coefficients() {
            // Writing into a String cannot fail
            let _ = writeln!(text, "{value}");
        }
        text
    }

    /// Load a model from a calibration file
    ///
    /// # Errors
    /// [`Error::Io`] when the file cannot be read, otherwise as
    /// [`CalibrationModel::parse`]
    #[cfg(feature = "std")]
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let model = Self::parse(&text)?;
        log::debug!("Loaded calibration from {}", path.display());
        Ok(model)
    }

    /// Write the model to a calibration file, replacing any existing one
    ///
    /// # Errors
    /// [`Error::Io`] when the file cannot be written
    #[cfg(feature = "std")]
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_text())?;
        log::debug!("Saved calibration to {}", path.display());
        Ok(())
    }
}

impl FromStr for CalibrationModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_model() -> CalibrationModel {
        CalibrationModel::new(
            Matrix3::new(
                1.0, 2.0, 3.0, //
                4.0, 5.0, 6.0, //
                7.0, 8.0, 9.0,
            ),
            Vector3::new(10.0, 11.0, 12.0),
        )
    }

    #[test]
    fn test_coefficient_order() {
        let values = sample_model().to_coefficients();
        let expected: [f32; 12] = core::array::from_fn(|i| (i + 1) as f32);
        assert_eq!(values, expected);

        let model = CalibrationModel::from_coefficients(&expected).unwrap();
        assert_eq!(model.linear_map()[(0, 1)], 2.0);
        assert_eq!(model.linear_map()[(1, 0)], 4.0);
        assert_eq!(model.offset(), Vector3::new(10.0, 11.0, 12.0));
        assert!(model.is_enabled());
    }

    #[test]
    fn test_coefficient_count() {
        assert!(matches!(
            CalibrationModel::from_coefficients(&[0.0; 11]),
            Err(Error::InvalidCoefficientCount { expected: 12, found: 11 })
        ));
        assert!(matches!(
            CalibrationModel::from_coefficients(&[0.0; 13]),
            Err(Error::InvalidCoefficientCount { expected: 12, found: 13 })
        ));
    }

    #[test]
    fn test_text_form() {
        let text = sample_model().to_text();
        assert_eq!(text, "1\n2\n3\n4\n5\n6\n7\n8\n9\n10\n11\n12\n");
        assert_eq!(CalibrationModel::parse(&text).unwrap(), sample_model());
    }

    #[test]
    fn test_parse_any_whitespace() {
        let text = "1.02 0 0\n0 0.97 0\n0 0 1.05\n\t0.03 -0.02 5e-2\n";
        let model: CalibrationModel = text.parse().unwrap();
        assert_eq!(model.linear_map()[(1, 1)], 0.97);
        assert_eq!(model.offset()[2], 0.05);
    }

    #[test]
    fn test_parse_rejects_bad_tokens() {
        let text = "1 0 0 0 1 0 0 0 one 0 0 0";
        match CalibrationModel::parse(text) {
            Err(Error::InvalidCoefficient { position, token }) => {
                assert_eq!(position, 8);
                assert_eq!(token, "one");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        assert!(matches!(
            CalibrationModel::parse("1 0 0 0 1 0 0 0 NaN 0 0 0"),
            Err(Error::InvalidCoefficient { position: 8, .. })
        ));
        assert!(matches!(
            CalibrationModel::parse(""),
            Err(Error::InvalidCoefficientCount { found: 0, .. })
        ));
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!(
            "affine_calibration_{}.txt",
            std::process::id()
        ));
        let model = sample_model();
        model.save(&path).unwrap();
        let loaded = CalibrationModel::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, model);

        assert!(matches!(
            CalibrationModel::load(&path),
            Err(Error::Io(_))
        ));
    }
}
