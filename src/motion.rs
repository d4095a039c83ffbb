//! Drift-corrected recovery of linear motion from orientation and
//! acceleration series

use log::debug;
use nalgebra::{Matrix3, Vector3};

use crate::dsp;
use crate::error::Error;
use crate::types::IntegratorSettings;

/// Standard gravitational acceleration, m/s² per g.
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Linear motion series derived from one pass through the integrator.
///
/// All sequences are index-aligned with the input acceleration series.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearMotion {
    /// Gravity-free acceleration in the reference frame, m/s²
    pub linear_acceleration: Vec<Vector3<f64>>,
    /// Drift-corrected velocity, m/s
    pub velocity: Vec<Vector3<f64>>,
    /// Drift-corrected position, m
    pub position: Vec<Vector3<f64>>,
}

/// Double-integration pipeline from rotated acceleration to position
///
/// Transforms a rotation sequence and a raw acceleration sequence into
/// drift-corrected linear position. The stage order is fixed: rotate into
/// the reference frame, remove gravity, integrate to velocity, high-pass
/// filter, integrate to position, high-pass filter again. Forward-Euler
/// integration of noisy acceleration accumulates near-DC drift, and each
/// integration stage needs its own zero-phase high-pass pass; correcting
/// velocity alone leaves residual drift in position.
pub struct MotionIntegrator {
    settings: IntegratorSettings,
    sample_period: f64,
    /// Drift-removal filter coefficients, designed once at construction
    numerator: Vec<f64>,
    denominator: Vec<f64>,
}

impl MotionIntegrator {
    /// Create an integrator, designing the drift-removal filter up front
    ///
    /// # Errors
    /// Rejects a non-positive sample rate, a cutoff outside `(0, Nyquist)`,
    /// and a filter order below 1 — before any samples are processed.
    pub fn new(settings: IntegratorSettings) -> Result<Self, Error> {
        let (numerator, denominator) = dsp::butter_highpass(
            settings.filter_order,
            settings.cutoff_hz,
            settings.sample_rate,
        )?;

        Ok(MotionIntegrator {
            settings,
            sample_period: 1.0 / settings.sample_rate,
            numerator,
            denominator,
        })
    }

    /// Integrator settings
    pub fn settings(&self) -> IntegratorSettings {
        self.settings
    }

    /// Rotate each body-frame acceleration into the reference frame
    ///
    /// Index-aligned and independent across samples: the i-th rotation is
    /// applied to the i-th acceleration, producing tilt-compensated
    /// acceleration.
    ///
    /// # Errors
    /// [`Error::LengthMismatch`] when the sequences differ in length,
    /// checked before any work is done.
    pub fn rotate_to_reference_frame(
        &self,
        rotations: &[Matrix3<f64>],
        accelerations: &[Vector3<f64>],
    ) -> Result<Vec<Vector3<f64>>, Error> {
        if rotations.len() != accelerations.len() {
            return Err(Error::LengthMismatch {
                rotations: rotations.len(),
                accelerations: accelerations.len(),
            });
        }

        Ok(rotations
            .iter()
            .zip(accelerations)
            .map(|(rotation, acceleration)| rotation * acceleration)
            .collect())
    }

    /// Subtract gravity and convert from g to m/s²
    ///
    /// Assumes the attitude filter has done its job: after rotation,
    /// gravity is exactly 1 g along the vertical axis.
    pub fn remove_gravity(&self, tilt_compensated: &[Vector3<f64>]) -> Vec<Vector3<f64>> {
        let gravity = Vector3::new(0.0, 0.0, 1.0);
        tilt_compensated
            .iter()
            .map(|acceleration| (acceleration - gravity) * STANDARD_GRAVITY)
            .collect()
    }

    /// Forward-Euler cumulative integration
    ///
    /// The first output sample is zero; each subsequent sample adds the
    /// current input scaled by the sample period.
    pub fn integrate(&self, series: &[Vector3<f64>]) -> Vec<Vector3<f64>> {
        let mut integrated = Vec::with_capacity(series.len());
        let mut accumulator = Vector3::zeros();

        for (i, sample) in series.iter().enumerate() {
            if i > 0 {
                accumulator += sample * self.sample_period;
            }
            integrated.push(accumulator);
        }

        integrated
    }

    /// Remove integration drift with a zero-phase high-pass filter
    ///
    /// Each axis is filtered independently, forward and backward, using the
    /// Butterworth design fixed at construction.
    pub fn high_pass_drift_correct(
        &self,
        series: &[Vector3<f64>],
    ) -> Result<Vec<Vector3<f64>>, Error> {
        let mut axes = Vec::with_capacity(3);
        for axis in 0..3 {
            let channel: Vec<f64> = series.iter().map(|sample| sample[axis]).collect();
            axes.push(dsp::filtfilt(
                &self.numerator,
                &self.denominator,
                &channel,
            )?);
        }

        Ok((0..series.len())
            .map(|i| Vector3::new(axes[0][i], axes[1][i], axes[2][i]))
            .collect())
    }

    /// Run the full pipeline: rotate, remove gravity, integrate to
    /// velocity, filter, integrate to position, filter
    pub fn track(
        &self,
        rotations: &[Matrix3<f64>],
        accelerations: &[Vector3<f64>],
    ) -> Result<LinearMotion, Error> {
        let tilt_compensated = self.rotate_to_reference_frame(rotations, accelerations)?;
        let linear_acceleration = self.remove_gravity(&tilt_compensated);

        let velocity = self.high_pass_drift_correct(&self.integrate(&linear_acceleration))?;
        let position = self.high_pass_drift_correct(&self.integrate(&velocity))?;

        debug!(
            "integrated {} samples to position at {} Hz",
            accelerations.len(),
            self.settings.sample_rate
        );

        Ok(LinearMotion {
            linear_acceleration,
            velocity,
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn integrator(sample_rate: f64) -> MotionIntegrator {
        MotionIntegrator::new(IntegratorSettings {
            sample_rate,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_integrate_constant_input_is_exact() {
        let steps = 50;
        let dt = 1.0 / 100.0;
        let unit = Vector3::new(1.0, 1.0, 1.0);

        let series = vec![unit; steps];
        let integrated = integrator(100.0).integrate(&series);

        assert_eq!(integrated.len(), steps);
        assert_eq!(integrated[0], Vector3::zeros());

        let expected = unit * (steps as f64 - 1.0) * dt;
        assert!((integrated[steps - 1] - expected).norm() < 1e-12);
    }

    #[test]
    fn test_rotation_is_applied_per_index() {
        let quarter_turn =
            Matrix3::new(0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0);
        let rotations = vec![Matrix3::identity(), quarter_turn];
        let accelerations = vec![Vector3::new(1.0, 0.0, 0.0); 2];

        let rotated = integrator(100.0)
            .rotate_to_reference_frame(&rotations, &accelerations)
            .unwrap();

        assert!((rotated[0] - Vector3::new(1.0, 0.0, 0.0)).norm() < 1e-12);
        assert!((rotated[1] - Vector3::new(0.0, 1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_length_mismatch_rejected_up_front() {
        let rotations = vec![Matrix3::identity(); 3];
        let accelerations = vec![Vector3::zeros(); 2];

        let result = integrator(100.0).rotate_to_reference_frame(&rotations, &accelerations);
        assert_eq!(
            result,
            Err(Error::LengthMismatch {
                rotations: 3,
                accelerations: 2
            })
        );
    }

    #[test]
    fn test_remove_gravity_rescales_to_metric_units() {
        let samples = vec![Vector3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 0.0, 2.0)];
        let linear = integrator(100.0).remove_gravity(&samples);

        assert!(linear[0].norm() < 1e-12);
        assert!((linear[1] - Vector3::new(0.0, 0.0, STANDARD_GRAVITY)).norm() < 1e-12);
    }

    #[test]
    fn test_misconfiguration_rejected_at_construction() {
        let above_nyquist = IntegratorSettings {
            sample_rate: 100.0,
            cutoff_hz: 60.0,
            filter_order: 1,
        };
        assert!(matches!(
            MotionIntegrator::new(above_nyquist),
            Err(Error::InvalidCutoff { .. })
        ));

        let zero_order = IntegratorSettings {
            filter_order: 0,
            ..Default::default()
        };
        assert!(matches!(
            MotionIntegrator::new(zero_order),
            Err(Error::InvalidFilterOrder(0))
        ));
    }
}
