//! Accelerometer calibration from recorded poses
//!
//! Loads averaged readings from ten static orientations, solves for the
//! affine correction, stores it as a calibration file, and plots how far
//! each pose sits from its expected direction before and after correction.
//!
//! Run with: `cargo run --example advanced`

use affine_calibration::{CalibrationModel, CalibrationSolver, PoseSample};
use nalgebra::Vector3;
use plotters::prelude::*;
use serde::Deserialize;
use std::error::Error;

#[derive(Debug, Deserialize)]
struct PoseRecord {
    #[serde(rename = "Expected X (g)")]
    expected_x: f32,
    #[serde(rename = "Expected Y (g)")]
    expected_y: f32,
    #[serde(rename = "Expected Z (g)")]
    expected_z: f32,
    #[serde(rename = "Raw X (g)")]
    raw_x: f32,
    #[serde(rename = "Raw Y (g)")]
    raw_y: f32,
    #[serde(rename = "Raw Z (g)")]
    raw_z: f32,
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("Advanced calibration example - least-squares fit of recorded poses");

    let mut reader = csv::Reader::from_path("testdata/calibration_poses.csv")?;
    let mut poses = Vec::new();

    for result in reader.deserialize() {
        let record: PoseRecord = result?;
        poses.push(PoseSample::new(
            Vector3::new(record.expected_x, record.expected_y, record.expected_z),
            Vector3::new(record.raw_x, record.raw_y, record.raw_z),
        ));
    }

    println!("Loaded {} poses", poses.len());

    let model = CalibrationSolver::new().solve(&poses)?;
    println!("{}", model);

    let uncorrected = CalibrationModel::identity();
    println!(
        "RMS residual: {:.5} g uncorrected, {:.5} g corrected",
        uncorrected.rms_residual(&poses),
        model.rms_residual(&poses)
    );

    // Round trip through the calibration file format
    let path = std::env::temp_dir().join("calibration_accel.txt");
    model.save(&path)?;
    let reloaded = CalibrationModel::load(&path)?;
    println!("Saved calibration to {}", path.display());
    assert_eq!(reloaded.to_coefficients(), model.to_coefficients());

    let before: Vec<f32> = poses
        .iter()
        .map(|p| (uncorrected.apply_vector3(p.measured) - p.expected).norm())
        .collect();
    let after: Vec<f32> = poses
        .iter()
        .map(|p| (model.apply_vector3(p.measured) - p.expected).norm())
        .collect();

    for (i, (b, a)) in before.iter().zip(after.iter()).enumerate() {
        println!("Pose {:2}: {:.5} g -> {:.5} g", i + 1, b, a);
    }

    create_residual_plots(&before, &after)?;
    println!("Plot saved as 'calibration_residuals.png'");

    Ok(())
}

/// Per-pose error magnitude before (top) and after (bottom) correction
///
/// The two scales differ by more than an order of magnitude, so each gets its
/// own chart.
fn create_residual_plots(before: &[f32], after: &[f32]) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new("calibration_residuals.png", (1000, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let charts = root.split_evenly((2, 1));
    let pose_range = 0f32..(before.len() as f32 + 1.0);

    create_error_plot(
        &charts[0],
        before,
        "Uncorrected error per pose",
        pose_range.clone(),
        &RED,
    )?;
    create_error_plot(
        &charts[1],
        after,
        "Corrected error per pose",
        pose_range,
        &BLUE,
    )?;

    root.present()?;
    Ok(())
}

fn create_error_plot(
    area: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
    errors: &[f32],
    label: &str,
    pose_range: std::ops::Range<f32>,
    color: &RGBColor,
) -> Result<(), Box<dyn Error>> {
    let color = *color;
    let max_error = errors.iter().copied().fold(0.0f32, f32::max) * 1.2;

    let mut chart = ChartBuilder::on(area)
        .caption(label, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(pose_range, 0f32..max_error.max(1e-4))?;

    chart
        .configure_mesh()
        .x_desc("Pose")
        .y_desc("Error (g)")
        .draw()?;

    chart
        .draw_series(errors.iter().enumerate().map(|(i, &e)| {
            let x = i as f32 + 1.0;
            Rectangle::new([(x - 0.3, 0.0), (x + 0.3, e)], color.filled())
        }))?
        .label(label)
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));

    chart.configure_series_labels().draw()?;
    Ok(())
}
