//! imu-motion - orientation and position tracking from inertial sensor streams
//!
//! This library estimates the 3-D orientation of a rigid body from gyroscope,
//! accelerometer, and optionally magnetometer samples using the Mahony
//! complementary filter, then recovers linear position from the orientation
//! sequence by double integration with zero-phase high-pass drift removal.
//!
//! # Features
//!
//! - Explicit nonlinear complementary (Mahony) filter on a unit quaternion
//! - 6-axis (IMU) and 9-axis (MARG) updates through one `Sample` dispatch
//! - Proportional/integral feedback with configurable `kp` / `ki` gains
//! - Drift-corrected double integration: gravity removal, forward-Euler
//!   integration, zero-phase Butterworth high-pass after each stage
//! - Batch `MotionTracker` orchestration producing index-aligned
//!   orientation, velocity, and position series
//!
//! # Quick Start
//!
//! ```rust
//! use nalgebra::Vector3;
//! use imu_motion::{Mahony, MahonySettings, Sample};
//!
//! let settings = MahonySettings {
//!     sample_rate: 256.0, // Hz
//!     ..Default::default()
//! };
//! let mut ahrs = Mahony::with_settings(settings).unwrap();
//!
//! // Sensor readings
//! let gyroscope = Vector3::new(0.0, 0.0, 0.01);    // rad/s
//! let accelerometer = Vector3::new(0.0, 0.0, 1.0); // g
//!
//! let orientation = ahrs
//!     .update(Sample::Imu { gyroscope, accelerometer })
//!     .unwrap();
//!
//! let (roll, pitch, yaw) = orientation.euler_angles();
//! let rotation = ahrs.rotation_matrix();
//! # let _ = (roll, pitch, yaw, rotation);
//! ```
//!
//! For the full sensor-stream-to-position pipeline, see
//! [`MotionTracker`](crate::MotionTracker).

mod ahrs;
pub mod dsp;
mod error;
mod math;
mod motion;
mod pipeline;
mod types;

// Re-export all public types and functions
pub use ahrs::Mahony;
pub use error::Error;
pub use math::{DEG_TO_RAD, RAD_TO_DEG, Vector3Ext};
pub use motion::{LinearMotion, MotionIntegrator, STANDARD_GRAVITY};
pub use pipeline::{MotionTrack, MotionTracker};
pub use types::*;
