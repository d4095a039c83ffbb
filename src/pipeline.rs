//! Batch orchestration: sensor samples in, orientation and position out

use log::{debug, warn};
use nalgebra::{Matrix3, UnitQuaternion, Vector3};

use crate::ahrs::Mahony;
use crate::error::Error;
use crate::motion::MotionIntegrator;
use crate::types::{Sample, TrackerSettings};

/// Trajectory data for one processed sample sequence.
///
/// Every sequence is index-aligned with the input samples. The buffers are
/// plain owned values; rerunning the pipeline recomputes them from scratch.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionTrack {
    /// Orientation estimate per sample
    pub orientations: Vec<UnitQuaternion<f64>>,
    /// Body-to-reference rotation matrix per sample
    pub rotations: Vec<Matrix3<f64>>,
    /// Gravity-free reference-frame acceleration, m/s²
    pub linear_acceleration: Vec<Vector3<f64>>,
    /// Drift-corrected velocity, m/s
    pub velocity: Vec<Vector3<f64>>,
    /// Drift-corrected position, m
    pub position: Vec<Vector3<f64>>,
}

impl MotionTrack {
    /// Number of samples in the track
    pub fn len(&self) -> usize {
        self.position.len()
    }

    /// Whether the track holds no samples
    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    /// Rotation matrices as a flat array shaped `[3, 3, N]`
    ///
    /// Axis-major, time-last: element `(row, col, t)` lives at index
    /// `(row * 3 + col) * N + t`. This is the layout downstream consumers
    /// of the persisted rotation stack expect.
    pub fn rotations_flat(&self) -> Vec<f64> {
        let n = self.rotations.len();
        let mut flat = vec![0.0; 9 * n];
        for (t, rotation) in self.rotations.iter().enumerate() {
            for row in 0..3 {
                for col in 0..3 {
                    flat[(row * 3 + col) * n + t] = rotation[(row, col)];
                }
            }
        }
        flat
    }

    /// Positions as a flat array shaped `[N, 3]`
    ///
    /// Row-major: sample `t`, axis `i` lives at index `t * 3 + i`.
    pub fn positions_flat(&self) -> Vec<f64> {
        let mut flat = Vec::with_capacity(3 * self.position.len());
        for position in &self.position {
            flat.extend_from_slice(&[position.x, position.y, position.z]);
        }
        flat
    }
}

/// End-to-end motion tracking pipeline
///
/// Runs the Mahony filter over a sample sequence in strict temporal order,
/// then hands the complete rotation and acceleration series to the
/// [`MotionIntegrator`] for the second pass. There is no feedback from the
/// integration stages into the attitude filter.
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use imu_motion::{MotionTracker, Sample, TrackerSettings};
///
/// let settings = TrackerSettings {
///     sample_rate: 256.0,
///     ..Default::default()
/// };
/// let mut tracker = MotionTracker::new(settings).unwrap();
///
/// let samples = vec![
///     Sample::Imu {
///         gyroscope: Vector3::zeros(),
///         accelerometer: Vector3::new(0.0, 0.0, 1.0),
///     };
///     100
/// ];
///
/// let track = tracker.process(&samples).unwrap();
/// assert_eq!(track.len(), 100);
/// ```
pub struct MotionTracker {
    ahrs: Mahony,
    integrator: MotionIntegrator,
}

impl MotionTracker {
    /// Create a tracker, validating the whole configuration up front
    pub fn new(settings: TrackerSettings) -> Result<Self, Error> {
        Ok(MotionTracker {
            ahrs: Mahony::with_settings(settings.mahony())?,
            integrator: MotionIntegrator::new(settings.integrator())?,
        })
    }

    /// Process a complete sample sequence into a [`MotionTrack`]
    ///
    /// The attitude filter is reset first, so each call estimates an
    /// independent run from the identity orientation. Degenerate samples
    /// (zero-length accelerometer or magnetometer vectors) keep the
    /// previous orientation and are counted, not fatal.
    ///
    /// # Errors
    /// [`Error::NumericalDivergence`] if the filter state is corrupted by
    /// non-finite input, and any integrator stage error (for example a
    /// sequence shorter than the drift filter's edge padding).
    pub fn process(&mut self, samples: &[Sample]) -> Result<MotionTrack, Error> {
        self.ahrs.reset();

        let mut orientations = Vec::with_capacity(samples.len());
        let mut rotations = Vec::with_capacity(samples.len());
        let mut accelerations = Vec::with_capacity(samples.len());
        let mut skipped = 0usize;

        for &sample in samples {
            if is_degenerate(&sample) {
                skipped += 1;
            }
            let orientation = self.ahrs.update(sample)?;
            orientations.push(orientation);
            rotations.push(self.ahrs.rotation_matrix());
            accelerations.push(sample.accelerometer());
        }

        if skipped > 0 {
            warn!("skipped {skipped} degenerate samples (zero-length sensor vectors)");
        }
        debug!("estimated orientation for {} samples", samples.len());

        let motion = self.integrator.track(&rotations, &accelerations)?;

        Ok(MotionTrack {
            orientations,
            rotations,
            linear_acceleration: motion.linear_acceleration,
            velocity: motion.velocity,
            position: motion.position,
        })
    }
}

fn is_degenerate(sample: &Sample) -> bool {
    match sample {
        Sample::Imu { accelerometer, .. } => accelerometer.norm() == 0.0,
        Sample::Marg {
            accelerometer,
            magnetometer,
            ..
        } => accelerometer.norm() == 0.0 || magnetometer.norm() == 0.0,
    }
}
