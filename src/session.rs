//! Calibration run context: pose list, reading accumulator and solver
//!
//! A [`CalibrationSession`] is threaded explicitly through the calibration
//! procedure. For each orientation the operator holds the device still while
//! the session averages a fixed number of raw readings into a
//! [`PoseSample`]; once enough poses are recorded the session solves for a
//! [`CalibrationModel`].
//!
//! # Example
//! ```
//! use nalgebra::Vector3;
//! use affine_calibration::{CalibrationSession, CalibrationSettings, six_face_directions};
//!
//! let settings = CalibrationSettings {
//!     samples_per_pose: 10,
//!     ..Default::default()
//! };
//! let mut session = CalibrationSession::new(settings);
//!
//! for expected in six_face_directions() {
//!     // Stand-in for a sensor held in the requested orientation
//!     let mut sensor = || Some(expected * 0.98 + Vector3::new(0.01, 0.0, -0.02));
//!     session.record_pose(expected, &mut sensor).unwrap();
//! }
//!
//! let model = session.solve().unwrap();
//! assert!(model.rms_residual(session.poses()) < 1e-3);
//! ```

use alloc::vec::Vec;

use nalgebra::Vector3;

use crate::calibration::CalibrationModel;
use crate::error::{Error, Result};
use crate::sensor::RawSource;
use crate::solver::{CalibrationSolver, PoseSample};
use crate::types::CalibrationSettings;

/// Running mean of raw 3-axis readings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseAccumulator {
    sum: Vector3<f32>,
    count: u32,
}

impl PoseAccumulator {
    /// Empty accumulator
    pub fn new() -> Self {
        Self {
            sum: Vector3::zeros(),
            count: 0,
        }
    }

    /// Add one reading
    pub fn add(&mut self, reading: Vector3<f32>) {
        self.sum += reading;
        self.count += 1;
    }

    /// Number of readings added since the last reset
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Mean of the readings, `None` when empty
    pub fn mean(&self) -> Option<Vector3<f32>> {
        (self.count > 0).then(|| self.sum / self.count as f32)
    }

    /// Discard all readings
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for PoseAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

/// State of one calibration run
#[derive(Debug, Clone, Default)]
pub struct CalibrationSession {
    settings: CalibrationSettings,
    poses: Vec<PoseSample>,
    accumulator: PoseAccumulator,
}

impl CalibrationSession {
    /// Start a run with the given settings
    pub fn new(settings: CalibrationSettings) -> Self {
        Self {
            settings,
            poses: Vec::new(),
            accumulator: PoseAccumulator::new(),
        }
    }

    /// Settings of this run
    pub fn settings(&self) -> CalibrationSettings {
        self.settings
    }

    /// Poses recorded so far, in recording order
    pub fn poses(&self) -> &[PoseSample] {
        &self.poses
    }

    /// Average `samples_per_pose` readings from `source` into a pose for
    /// `expected` and record it
    ///
    /// The source must deliver uncorrected readings; disable the calibration
    /// of a [`CalibratedSensor`](crate::CalibratedSensor) before passing it in.
    ///
    /// # Errors
    /// [`Error::SourceUnavailable`] when the source fails before enough
    /// readings are collected. Nothing is recorded in that case.
    pub fn record_pose<S>(&mut self, expected: Vector3<f32>, source: &mut S) -> Result<PoseSample>
    where
        S: RawSource + ?Sized,
    {
        let requested = self.settings.samples_per_pose.max(1);
        self.accumulator.reset();

        while self.accumulator.count() < requested {
            let Some(reading) = source.read_raw() else {
                log::warn!(
                    "Raw source unavailable after {} of {} readings",
                    self.accumulator.count(),
                    requested
                );
                return Err(Error::SourceUnavailable {
                    collected: self.accumulator.count(),
                    requested,
                });
            };
            self.accumulator.add(reading);
        }

        let measured = self.accumulator.mean().ok_or(Error::SourceUnavailable {
            collected: 0,
            requested,
        })?;
        let pose = PoseSample::new(expected, measured);
        log::info!(
            "Recorded pose {}: expected ({:.2}, {:.2}, {:.2}), measured ({:.4}, {:.4}, {:.4})",
            self.poses.len() + 1,
            expected.x,
            expected.y,
            expected.z,
            measured.x,
            measured.y,
            measured.z
        );
        self.poses.push(pose);
        Ok(pose)
    }

    /// Record an already averaged pose
    pub fn add_pose(&mut self, pose: PoseSample) {
        self.poses.push(pose);
    }

    /// Drop all recorded poses so the procedure can be repeated
    pub fn clear(&mut self) {
        self.poses.clear();
        self.accumulator.reset();
    }

    /// Solve for the calibration from the recorded poses
    ///
    /// # Errors
    /// See [`CalibrationSolver::solve`].
    pub fn solve(&self) -> Result<CalibrationModel> {
        CalibrationSolver::with_tolerance(self.settings.pivot_tolerance).solve(&self.poses)
    }
}
