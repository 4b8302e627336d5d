use affine_calibration::{CalibrationSession, CalibrationSettings, six_face_directions};
use nalgebra::Vector3;

const POSE_NAMES: [&str; 6] = [
    "flat",
    "upside down",
    "rolled -90",
    "rolled 90",
    "pitched 90",
    "pitched -90",
];

fn main() {
    let mut session = CalibrationSession::new(CalibrationSettings::default());

    for (name, expected) in POSE_NAMES.iter().zip(six_face_directions()) {
        // replace this with a driver read while the device is held in the pose
        let mut sensor = || Some(expected * 1.04 + Vector3::new(0.03, -0.01, 0.05));

        match session.record_pose(expected, &mut sensor) {
            Ok(pose) => println!(
                "{:<12} measured ({:.3}, {:.3}, {:.3})",
                name, pose.measured.x, pose.measured.y, pose.measured.z
            ),
            Err(e) => {
                eprintln!("{}: {}", name, e);
                return;
            }
        }
    }

    match session.solve() {
        Ok(model) => {
            println!("{}", model);
            println!("{}", model.to_text());
        }
        Err(e) => eprintln!("Calibration failed: {}", e),
    }
}
