//! Raw-reading sources and the runtime calibrated-sensor adapter
//!
//! A [`RawSource`] is whatever delivers 3-axis readings: a bus driver, a
//! replayed log, a closure in a test. The adapter never retries a failed
//! read; unavailability is reported to the caller as `None`.
//!
//! # Example
//! ```
//! use nalgebra::{Matrix3, Vector3};
//! use affine_calibration::{CalibratedSensor, CalibrationModel, RawSource};
//!
//! let model = CalibrationModel::new(Matrix3::identity() * 2.0, Vector3::zeros());
//! let mut sensor = CalibratedSensor::new(|| Some(Vector3::new(0.0, 0.0, 0.5)), model);
//!
//! assert_eq!(sensor.read_raw(), Some(Vector3::new(0.0, 0.0, 1.0)));
//!
//! // Raw passthrough while recalibrating
//! sensor.set_calibration_enabled(false);
//! assert_eq!(sensor.read_raw(), Some(Vector3::new(0.0, 0.0, 0.5)));
//! ```

use nalgebra::Vector3;

use crate::calibration::CalibrationModel;

/// Supplier of raw 3-axis sensor readings
pub trait RawSource {
    /// Take one reading, or `None` when the sensor is unavailable
    fn read_raw(&mut self) -> Option<Vector3<f32>>;
}

impl<F> RawSource for F
where
    F: FnMut() -> Option<Vector3<f32>>,
{
    fn read_raw(&mut self) -> Option<Vector3<f32>> {
        self()
    }
}

/// Sensor adapter that owns a raw source and the calibration applied to it
///
/// Itself a [`RawSource`], so it can feed a
/// [`CalibrationSession`](crate::CalibrationSession) directly once the
/// calibration is disabled.
#[derive(Debug, Clone)]
pub struct CalibratedSensor<S> {
    source: S,
    model: CalibrationModel,
}

impl<S: RawSource> CalibratedSensor<S> {
    /// Wrap `source` with `model`
    pub fn new(source: S, model: CalibrationModel) -> Self {
        Self { source, model }
    }

    /// Wrap `source` with the identity model
    pub fn uncalibrated(source: S) -> Self {
        Self::new(source, CalibrationModel::identity())
    }

    /// Calibration currently applied
    pub fn model(&self) -> &CalibrationModel {
        &self.model
    }

    /// Replace the calibration, e.g. after a fresh solve
    pub fn set_model(&mut self, model: CalibrationModel) {
        self.model = model;
    }

    /// Toggle correction without discarding the model
    pub fn set_calibration_enabled(&mut self, enabled: bool) {
        self.model.set_enabled(enabled);
    }

    /// Borrow the underlying source
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Release the underlying source
    pub fn into_inner(self) -> S {
        self.source
    }
}

impl<S: RawSource> RawSource for CalibratedSensor<S> {
    fn read_raw(&mut self) -> Option<Vector3<f32>> {
        let raw = self.source.read_raw()?;
        Some(self.model.apply_vector3(raw))
    }
}
