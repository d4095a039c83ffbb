//! Mahony attitude filter implementation for the imu-motion library

use nalgebra::{Matrix3, Quaternion, UnitQuaternion, Vector3};

use crate::error::Error;
use crate::math::Vector3Ext;
use crate::types::{MahonySettings, Sample};

/// Quaternion norms below this are treated as numerical corruption.
const MIN_QUATERNION_NORM: f64 = 1e-12;

/// Mahony attitude and heading reference filter
///
/// An explicit nonlinear complementary observer that tracks orientation as a
/// unit quaternion. Gyroscope rates drive the quaternion forward; the
/// accelerometer (and optionally magnetometer) supply a reference direction
/// whose mismatch with the estimate feeds back through proportional and
/// integral gains.
///
/// The filter is a continuous-valued recursive estimator with no discrete
/// modes: it starts at the identity orientation with zero integral error and
/// runs for the lifetime of the input stream. Samples must be supplied in
/// timestamp order since each update depends on the previous state.
pub struct Mahony {
    /// Fixed configuration (gains, sample rate)
    settings: MahonySettings,
    /// 1 / sample_rate, in seconds
    sample_period: f64,
    /// Current orientation estimate (WXYZ)
    quaternion: UnitQuaternion<f64>,
    /// Accumulated integral of the orientation error
    integral_error: Vector3<f64>,
}

impl Mahony {
    /// Create a filter with default settings (100 Hz, kp = 1.0, ki = 0.0)
    pub fn new() -> Self {
        Self::from_valid(MahonySettings::default())
    }

    /// Create a filter with the given settings
    ///
    /// Misconfiguration is rejected here, before any samples are processed:
    /// the sample rate must be positive and finite, both gains non-negative
    /// and finite.
    pub fn with_settings(settings: MahonySettings) -> Result<Self, Error> {
        if !settings.sample_rate.is_finite() || settings.sample_rate <= 0.0 {
            return Err(Error::InvalidSampleRate(settings.sample_rate));
        }
        if !settings.proportional_gain.is_finite() || settings.proportional_gain < 0.0 {
            return Err(Error::InvalidGain {
                name: "proportional",
                value: settings.proportional_gain,
            });
        }
        if !settings.integral_gain.is_finite() || settings.integral_gain < 0.0 {
            return Err(Error::InvalidGain {
                name: "integral",
                value: settings.integral_gain,
            });
        }

        Ok(Self::from_valid(settings))
    }

    fn from_valid(settings: MahonySettings) -> Self {
        Mahony {
            settings,
            sample_period: 1.0 / settings.sample_rate,
            quaternion: UnitQuaternion::identity(),
            integral_error: Vector3::zeros(),
        }
    }

    /// Return the filter to its initial state: identity orientation, zero
    /// integral error. Settings are kept.
    pub fn reset(&mut self) {
        self.quaternion = UnitQuaternion::identity();
        self.integral_error = Vector3::zeros();
    }

    /// Current orientation estimate
    pub fn quaternion(&self) -> UnitQuaternion<f64> {
        self.quaternion
    }

    /// Accumulated integral error (the bias estimate when ki > 0)
    pub fn integral_error(&self) -> Vector3<f64> {
        self.integral_error
    }

    /// Filter settings
    pub fn settings(&self) -> MahonySettings {
        self.settings
    }

    /// Direction-cosine matrix of the current orientation
    ///
    /// Pure function of the current state; rotates body-frame vectors into
    /// the reference frame.
    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        *self.quaternion.to_rotation_matrix().matrix()
    }

    /// Advance the filter by one sample and return the updated orientation
    ///
    /// A zero-length accelerometer vector (or magnetometer vector, for
    /// [`Sample::Marg`]) marks a sensor dropout: the update is skipped and
    /// the previous orientation returned unchanged. This is silent by
    /// design; dropouts are expected in real streams.
    ///
    /// # Errors
    /// [`Error::NumericalDivergence`] if the quaternion norm is driven to
    /// zero or a non-finite value (NaN/Inf contamination of the state).
    pub fn update(&mut self, sample: Sample) -> Result<UnitQuaternion<f64>, Error> {
        let (gyroscope, accelerometer, magnetometer) = match sample {
            Sample::Imu {
                gyroscope,
                accelerometer,
            } => (gyroscope, accelerometer, None),
            Sample::Marg {
                gyroscope,
                accelerometer,
                magnetometer,
            } => (gyroscope, accelerometer, Some(magnetometer)),
        };

        // Degenerate sample: skip the update, keep the previous state.
        if accelerometer.norm() == 0.0 {
            return Ok(self.quaternion);
        }
        if let Some(magnetometer) = magnetometer {
            if magnetometer.norm() == 0.0 {
                return Ok(self.quaternion);
            }
        }

        // Each measurement is normalized by its own norm.
        let accelerometer = accelerometer.safe_normalize();

        let mut error = accelerometer.cross(&self.gravity_direction());

        if let Some(magnetometer) = magnetometer {
            let magnetometer = magnetometer.safe_normalize();
            error += magnetometer.cross(&self.magnetic_direction(magnetometer));
        }

        if self.settings.integral_gain > 0.0 {
            self.integral_error += error * self.sample_period;
        }

        let corrected_rate = gyroscope
            + error * self.settings.proportional_gain
            + self.integral_error * self.settings.integral_gain;

        self.integrate_quaternion(corrected_rate)
    }

    /// 6-axis update: gyroscope (rad/s) and accelerometer (g)
    pub fn update_imu(
        &mut self,
        gyroscope: Vector3<f64>,
        accelerometer: Vector3<f64>,
    ) -> Result<UnitQuaternion<f64>, Error> {
        self.update(Sample::Imu {
            gyroscope,
            accelerometer,
        })
    }

    /// 9-axis update: gyroscope (rad/s), accelerometer (g), magnetometer
    pub fn update_marg(
        &mut self,
        gyroscope: Vector3<f64>,
        accelerometer: Vector3<f64>,
        magnetometer: Vector3<f64>,
    ) -> Result<UnitQuaternion<f64>, Error> {
        self.update(Sample::Marg {
            gyroscope,
            accelerometer,
            magnetometer,
        })
    }

    /// Estimated gravity direction in the body frame
    ///
    /// Third row of the body-to-reference rotation, written out in
    /// quaternion components.
    fn gravity_direction(&self) -> Vector3<f64> {
        let q = self.quaternion.as_ref();
        Vector3::new(
            2.0 * (q.i * q.k - q.w * q.j),
            2.0 * (q.w * q.i + q.j * q.k),
            q.w * q.w - q.i * q.i - q.j * q.j + q.k * q.k,
        )
    }

    /// Estimated magnetic field direction in the body frame
    ///
    /// The measured field is rotated into the reference frame, collapsed to
    /// its horizontal magnitude plus vertical component (immune to a wrong
    /// inclination estimate), and projected back through the current
    /// orientation.
    fn magnetic_direction(&self, magnetometer: Vector3<f64>) -> Vector3<f64> {
        let q = self.quaternion.as_ref();

        // Reference direction of the field, horizontal + vertical only.
        let h = self.quaternion * magnetometer;
        let b1 = (h.x * h.x + h.y * h.y).sqrt();
        let b3 = h.z;

        Vector3::new(
            2.0 * b1 * (0.5 - q.j * q.j - q.k * q.k) + 2.0 * b3 * (q.i * q.k - q.w * q.j),
            2.0 * b1 * (q.i * q.j - q.w * q.k) + 2.0 * b3 * (q.w * q.i + q.j * q.k),
            2.0 * b1 * (q.w * q.j + q.i * q.k) + 2.0 * b3 * (0.5 - q.i * q.i - q.j * q.j),
        )
    }

    /// First-order Euler step of the quaternion kinematics
    fn integrate_quaternion(&mut self, rate: Vector3<f64>) -> Result<UnitQuaternion<f64>, Error> {
        // dq/dt = 0.5 * q * omega
        let rate_quaternion = Quaternion::from_parts(0.0, rate);
        let derivative = (self.quaternion.as_ref() * rate_quaternion) * 0.5;

        let integrated = self.quaternion.as_ref() + derivative * self.sample_period;

        // The norm drifts away from 1 under Euler integration; renormalize
        // every step. A zero or non-finite norm cannot arise from a unit
        // starting point and finite inputs, so it is a fatal invariant
        // violation rather than something to paper over.
        let norm = integrated.norm();
        if !norm.is_finite() || norm < MIN_QUATERNION_NORM {
            return Err(Error::NumericalDivergence);
        }

        self.quaternion = UnitQuaternion::from_quaternion(integrated);
        Ok(self.quaternion)
    }
}

impl Default for Mahony {
    fn default() -> Self {
        Self::new()
    }
}
