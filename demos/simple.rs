use imu_motion::{Mahony, MahonySettings};
use nalgebra::Vector3;

const SAMPLE_RATE: f64 = 256.0; // Hz

fn main() {
    let mut ahrs = Mahony::with_settings(MahonySettings {
        sample_rate: SAMPLE_RATE,
        ..Default::default()
    })
    .expect("default gains at 256 Hz are valid");

    for _ in 0..10 {
        // this loop should repeat each time new gyroscope data is available
        let gyroscope = Vector3::new(0.0, 0.0, 0.0); // replace this with actual gyroscope data in rad/s
        let accelerometer = Vector3::new(0.0, 0.0, 1.0); // replace this with actual accelerometer data in g

        let orientation = ahrs
            .update_imu(gyroscope, accelerometer)
            .expect("finite sensor data");

        let (roll, pitch, yaw) = orientation.euler_angles();

        println!(
            "Roll: {:.2}, Pitch: {:.2}, Yaw: {:.2}",
            roll.to_degrees(),
            pitch.to_degrees(),
            yaw.to_degrees()
        );
    }
}
