//! Core types and configuration for the imu-motion library

use nalgebra::Vector3;

/// One sensor reading, logically paired at a single timestamp.
///
/// The two variants dispatch into a single update routine in
/// [`Mahony`](crate::Mahony): the magnetometer contributes one extra error
/// term, nothing else changes.
///
/// Units: angular rate in rad/s, specific force in g (gravity-normalized),
/// magnetic field in arbitrary units (only its direction is used).
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use imu_motion::Sample;
///
/// let imu = Sample::Imu {
///     gyroscope: Vector3::new(0.0, 0.0, 0.01),
///     accelerometer: Vector3::new(0.0, 0.0, 1.0),
/// };
///
/// let marg = Sample::Marg {
///     gyroscope: Vector3::new(0.0, 0.0, 0.01),
///     accelerometer: Vector3::new(0.0, 0.0, 1.0),
///     magnetometer: Vector3::new(0.4, 0.0, -0.3),
/// };
/// # let _ = (imu, marg);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    /// 6-axis reading: gyroscope + accelerometer
    Imu {
        /// Angular rate in rad/s
        gyroscope: Vector3<f64>,
        /// Specific force in g
        accelerometer: Vector3<f64>,
    },
    /// 9-axis reading: gyroscope + accelerometer + magnetometer
    Marg {
        /// Angular rate in rad/s
        gyroscope: Vector3<f64>,
        /// Specific force in g
        accelerometer: Vector3<f64>,
        /// Magnetic field, direction only
        magnetometer: Vector3<f64>,
    },
}

impl Sample {
    /// The accelerometer reading regardless of variant.
    pub fn accelerometer(&self) -> Vector3<f64> {
        match *self {
            Sample::Imu { accelerometer, .. } | Sample::Marg { accelerometer, .. } => accelerometer,
        }
    }

    /// The gyroscope reading regardless of variant.
    pub fn gyroscope(&self) -> Vector3<f64> {
        match *self {
            Sample::Imu { gyroscope, .. } | Sample::Marg { gyroscope, .. } => gyroscope,
        }
    }
}

/// Mahony filter settings
///
/// `proportional_gain` (kp) corrects the orientation error a little each
/// step; `integral_gain` (ki) accumulates a bias estimate over time and is
/// disabled when zero.
///
/// # Example
/// ```
/// use imu_motion::MahonySettings;
///
/// let settings = MahonySettings {
///     sample_rate: 256.0,
///     proportional_gain: 1.0,
///     integral_gain: 0.0,
/// };
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MahonySettings {
    /// Sample frequency in Hz; the filter integrates with period 1/rate
    pub sample_rate: f64,
    /// Proportional feedback gain (kp)
    ///
    /// Higher values pull the estimate toward the accelerometer/magnetometer
    /// reference faster at the cost of more noise sensitivity.
    pub proportional_gain: f64,
    /// Integral feedback gain (ki)
    ///
    /// Accumulates persistent orientation error into a bias-cancelling term.
    /// Zero disables the integrator entirely.
    pub integral_gain: f64,
}

impl Default for MahonySettings {
    fn default() -> Self {
        Self {
            sample_rate: 100.0,
            proportional_gain: 1.0,
            integral_gain: 0.0,
        }
    }
}

/// Motion integrator settings
///
/// The high-pass corner frequency and order control how aggressively the
/// near-DC drift accumulated by forward-Euler integration is removed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegratorSettings {
    /// Sample frequency of the acceleration series in Hz
    pub sample_rate: f64,
    /// Drift-removal corner frequency in Hz (must lie below Nyquist)
    pub cutoff_hz: f64,
    /// Butterworth high-pass order (>= 1); sets steepness and phase behavior
    pub filter_order: usize,
}

impl Default for IntegratorSettings {
    fn default() -> Self {
        Self {
            sample_rate: 100.0,
            cutoff_hz: 0.1,
            filter_order: 1,
        }
    }
}

/// Combined settings for the batch [`MotionTracker`](crate::MotionTracker)
/// pipeline. The sample rate is shared between the attitude filter and the
/// integrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerSettings {
    /// Sample frequency shared by the whole sequence, in Hz
    pub sample_rate: f64,
    /// Mahony proportional gain (kp)
    pub proportional_gain: f64,
    /// Mahony integral gain (ki)
    pub integral_gain: f64,
    /// Drift-removal corner frequency in Hz
    pub cutoff_hz: f64,
    /// Drift-removal Butterworth order
    pub filter_order: usize,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            sample_rate: 100.0,
            proportional_gain: 1.0,
            integral_gain: 0.0,
            cutoff_hz: 0.1,
            filter_order: 1,
        }
    }
}

impl TrackerSettings {
    pub(crate) fn mahony(&self) -> MahonySettings {
        MahonySettings {
            sample_rate: self.sample_rate,
            proportional_gain: self.proportional_gain,
            integral_gain: self.integral_gain,
        }
    }

    pub(crate) fn integrator(&self) -> IntegratorSettings {
        IntegratorSettings {
            sample_rate: self.sample_rate,
            cutoff_hz: self.cutoff_hz,
            filter_order: self.filter_order,
        }
    }
}
