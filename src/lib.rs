#![cfg_attr(not(feature = "std"), no_std)]

//! Affine calibration - least-squares accelerometer calibration for small flight computers
//!
//! This crate provides a small dynamic-size linear-algebra engine and the
//! calibration pipeline built on it. A device is held still in a handful of
//! known orientations; the averaged raw readings are fitted against the
//! expected directions to find an affine correction `true ≈ M·raw + b`,
//! which is then applied to every raw measurement at runtime.
//!
//! # Features
//!
//! - [`Vector`] and [`Matrix`] with bounds-checked access and checked shapes
//! - Gauss-Jordan inversion with partial pivoting and a configurable pivot test
//! - Moore-Penrose pseudo-inverse by the normal-equations method
//! - Least-squares affine calibration from four or more poses
//! - Runtime correction with an on/off switch that keeps the model
//! - 12-value plain-text calibration files
//! - `no_std` + `alloc` compatible (disable the default `std` feature)
//!
//! # Quick Start
//!
//! ```rust
//! use nalgebra::Vector3;
//! use affine_calibration::{CalibrationSolver, PoseSample, six_face_directions};
//!
//! // Averaged raw readings for the six face-down poses
//! let poses: Vec<PoseSample> = six_face_directions()
//!     .iter()
//!     .map(|&expected| PoseSample::new(expected, expected * 1.03 + Vector3::new(0.02, -0.01, 0.04)))
//!     .collect();
//!
//! // Solve for the correction
//! let model = CalibrationSolver::new().solve(&poses)?;
//!
//! // Apply it to a live reading
//! let corrected = model.apply_vector3(Vector3::new(0.02, -0.01, 1.07));
//! assert!((corrected - Vector3::new(0.0, 0.0, 1.0)).magnitude() < 1e-3);
//!
//! // Persist as 12 values: M row-major, then b
//! let text = model.to_text();
//! assert_eq!(text.lines().count(), 12);
//! # Ok::<(), affine_calibration::Error>(())
//! ```

extern crate alloc;

pub mod calibration;
mod error;
mod matrix;
mod persist;
mod pseudo_inverse;
pub mod sensor;
pub mod session;
mod solver;
mod types;
mod vector;

// Re-export all public types and functions
pub use calibration::{CalibrationModel, calibrate_affine};
pub use error::{Error, Result};
pub use matrix::Matrix;
pub use persist::COEFFICIENT_COUNT;
pub use pseudo_inverse::{pseudo_inverse, pseudo_inverse_with};
pub use sensor::{CalibratedSensor, RawSource};
pub use session::{CalibrationSession, PoseAccumulator};
pub use solver::{CalibrationSolver, MIN_POSES, PoseSample, six_face_directions};
pub use types::*;
pub use vector::{Vector, inner_product};
