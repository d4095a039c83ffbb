//! Full motion-tracking demonstration
//!
//! Loads a logged IMU session from CSV, runs the complete pipeline
//! (orientation estimation, gravity removal, drift-corrected double
//! integration), and plots the recovered position.
//!
//! Run with: `cargo run --example track -- path/to/log.csv`
//!
//! The CSV is expected to carry per-sample gyroscope readings in deg/s and
//! accelerometer readings in g, one row per sample at a fixed rate.

use imu_motion::{DEG_TO_RAD, MotionTracker, Sample, TrackerSettings};
use nalgebra::Vector3;
use plotters::prelude::*;
use serde::Deserialize;
use std::error::Error;

#[derive(Debug, Deserialize)]
struct SensorRecord {
    #[serde(rename = "Time (s)")]
    time: f64,
    #[serde(rename = "Gyroscope X (deg/s)")]
    gyro_x: f64,
    #[serde(rename = "Gyroscope Y (deg/s)")]
    gyro_y: f64,
    #[serde(rename = "Gyroscope Z (deg/s)")]
    gyro_z: f64,
    #[serde(rename = "Accelerometer X (g)")]
    accel_x: f64,
    #[serde(rename = "Accelerometer Y (g)")]
    accel_y: f64,
    #[serde(rename = "Accelerometer Z (g)")]
    accel_z: f64,
}

const SAMPLE_RATE: f64 = 256.0; // Hz

fn main() -> Result<(), Box<dyn Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "testdata/motion_log.csv".to_string());

    println!("Loading sensor log from {path}...");

    let mut reader = csv::Reader::from_path(&path)?;
    let mut times = Vec::new();
    let mut samples = Vec::new();

    for result in reader.deserialize() {
        let record: SensorRecord = result?;
        times.push(record.time);
        samples.push(Sample::Imu {
            // gyroscope units must be radians
            gyroscope: Vector3::new(record.gyro_x, record.gyro_y, record.gyro_z) * DEG_TO_RAD,
            accelerometer: Vector3::new(record.accel_x, record.accel_y, record.accel_z),
        });
    }

    println!("Processing {} samples at {SAMPLE_RATE} Hz...", samples.len());

    let settings = TrackerSettings {
        sample_rate: SAMPLE_RATE,
        proportional_gain: 1.0,
        integral_gain: 0.0,
        cutoff_hz: 0.1,
        filter_order: 1,
    };
    let mut tracker = MotionTracker::new(settings)?;
    let track = tracker.process(&samples)?;

    let final_position = track.position.last().copied().unwrap_or_default();
    println!(
        "Final position: ({:.3}, {:.3}, {:.3}) m",
        final_position.x, final_position.y, final_position.z
    );

    plot_position(&times, &track.position)?;
    println!("Position plot saved to position.png");

    Ok(())
}

/// Plot the recovered position, one line per axis.
fn plot_position(times: &[f64], positions: &[Vector3<f64>]) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new("position.png", (1000, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let time_range = *times.first().unwrap_or(&0.0)..*times.last().unwrap_or(&1.0);
    let extent = positions
        .iter()
        .fold(0.0f64, |acc, p| acc.max(p.x.abs()).max(p.y.abs()).max(p.z.abs()))
        .max(1e-3);

    let mut chart = ChartBuilder::on(&root)
        .caption("High-pass filtered linear position", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(time_range, -extent..extent)?;

    chart
        .configure_mesh()
        .x_desc("time (s)")
        .y_desc("position (m)")
        .draw()?;

    let axes: [(&str, fn(&Vector3<f64>) -> f64, &RGBColor); 3] = [
        ("x", |p| p.x, &RED),
        ("y", |p| p.y, &GREEN),
        ("z", |p| p.z, &BLUE),
    ];

    for (label, component, color) in axes {
        chart
            .draw_series(LineSeries::new(
                times
                    .iter()
                    .zip(positions)
                    .map(|(&t, p)| (t, component(p))),
                color,
            ))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], color));
    }

    chart.configure_series_labels().draw()?;
    root.present()?;

    Ok(())
}
