use imu_motion::{Error, Mahony, MahonySettings, Sample, Vector3Ext};
use nalgebra::{Matrix3, Rotation3, UnitQuaternion, Vector3};

const EPSILON: f64 = 1e-9;

/// Angle between the measured gravity direction and the filter's estimate.
fn gravity_error(ahrs: &Mahony, accelerometer: Vector3<f64>) -> f64 {
    let measured = accelerometer.safe_normalize();
    let estimated = ahrs.quaternion().inverse() * Vector3::new(0.0, 0.0, 1.0);
    measured.dot(&estimated).clamp(-1.0, 1.0).acos()
}

/// The quaternion norm stays at 1 after every update, for IMU and MARG
/// samples alike.
#[test]
fn test_unit_norm_invariant() {
    let mut ahrs = Mahony::with_settings(MahonySettings {
        sample_rate: 256.0,
        proportional_gain: 2.0,
        integral_gain: 0.05,
    })
    .unwrap();

    for i in 0..2000 {
        let phase = i as f64 * 0.01;
        let gyroscope = Vector3::new(phase.sin(), (1.3 * phase).cos(), 0.4 * phase.sin());
        let accelerometer = Vector3::new(0.1 * phase.cos(), -0.05, 1.0);
        let magnetometer = Vector3::new(0.4, 0.1 * phase.sin(), -0.3);

        let sample = if i % 2 == 0 {
            Sample::Imu {
                gyroscope,
                accelerometer,
            }
        } else {
            Sample::Marg {
                gyroscope,
                accelerometer,
                magnetometer,
            }
        };

        let orientation = ahrs.update(sample).unwrap();
        assert!(
            (orientation.as_ref().norm() - 1.0).abs() < EPSILON,
            "norm drifted at sample {i}"
        );
    }
}

/// Zero angular rate with gravity already aligned is a fixed point.
#[test]
fn test_steady_state_fixed_point() {
    let mut ahrs = Mahony::new();

    for _ in 0..5000 {
        ahrs.update_imu(Vector3::zeros(), Vector3::new(0.0, 0.0, 1.0))
            .unwrap();
    }

    let identity: UnitQuaternion<f64> = UnitQuaternion::identity();
    let q = ahrs.quaternion();
    assert!((q.w - identity.w).abs() < EPSILON);
    assert!(q.i.abs() < EPSILON);
    assert!(q.j.abs() < EPSILON);
    assert!(q.k.abs() < EPSILON);
}

/// A near-inverted device converges toward the measured gravity direction.
#[test]
fn test_inverted_orientation_converges() {
    let mut ahrs = Mahony::with_settings(MahonySettings {
        sample_rate: 100.0,
        proportional_gain: 10.0,
        integral_gain: 0.0,
    })
    .unwrap();

    // Almost upside down; the small x component breaks the antipodal
    // stalemate the exact inversion would sit in.
    let accelerometer = Vector3::new(0.05, 0.0, -1.0);

    let initial_error = gravity_error(&ahrs, accelerometer);
    assert!(initial_error > 3.0, "expected to start near 180 degrees");

    for _ in 0..5000 {
        ahrs.update_imu(Vector3::zeros(), accelerometer).unwrap();
    }

    assert!(
        gravity_error(&ahrs, accelerometer) < 0.01,
        "filter did not converge to the measured gravity direction"
    );
}

/// The correction shrinks the error monotonically for small gains.
#[test]
fn test_error_decreases_monotonically_for_small_gain() {
    let mut ahrs = Mahony::with_settings(MahonySettings {
        sample_rate: 100.0,
        proportional_gain: 0.5,
        integral_gain: 0.0,
    })
    .unwrap();

    let accelerometer = Vector3::new(1.0, 0.0, 1.0);
    let mut previous = gravity_error(&ahrs, accelerometer);

    for step in 0..1000 {
        ahrs.update_imu(Vector3::zeros(), accelerometer).unwrap();
        let current = gravity_error(&ahrs, accelerometer);
        assert!(
            current <= previous + EPSILON,
            "error grew at step {step}: {previous} -> {current}"
        );
        previous = current;
    }

    assert!(previous < 0.05, "error did not shrink: {previous}");
}

/// Larger proportional gain converges faster.
#[test]
fn test_larger_gain_converges_faster() {
    let accelerometer = Vector3::new(1.0, 0.0, 1.0);

    let error_after = |gain: f64| {
        let mut ahrs = Mahony::with_settings(MahonySettings {
            sample_rate: 100.0,
            proportional_gain: gain,
            integral_gain: 0.0,
        })
        .unwrap();
        for _ in 0..200 {
            ahrs.update_imu(Vector3::zeros(), accelerometer).unwrap();
        }
        gravity_error(&ahrs, accelerometer)
    };

    assert!(error_after(2.0) < error_after(0.5));
}

/// A dropped accelerometer sample leaves the state bit-identical.
#[test]
fn test_degenerate_sample_preserves_state_exactly() {
    let mut ahrs = Mahony::new();
    for _ in 0..25 {
        ahrs.update_imu(Vector3::new(0.2, -0.1, 0.4), Vector3::new(0.05, 0.0, 1.0))
            .unwrap();
    }

    let before = ahrs.quaternion();
    let returned = ahrs
        .update_imu(Vector3::new(0.2, -0.1, 0.4), Vector3::zeros())
        .unwrap();

    assert_eq!(before, returned);
    assert_eq!(before, ahrs.quaternion());
}

/// Identity orientation produces the identity rotation matrix.
#[test]
fn test_identity_rotation_matrix() {
    let ahrs = Mahony::new();
    assert!((ahrs.rotation_matrix() - Matrix3::identity()).norm() < EPSILON);
}

/// Quaternion -> rotation matrix -> quaternion reproduces the original up
/// to sign (the double cover of rotation space).
#[test]
fn test_rotation_matrix_round_trip() {
    let cases: [(f64, f64, f64); 4] = [
        (0.3, -0.2, 0.9),
        (1.2, 0.4, -2.0),
        (-2.9, 1.4, 3.0),
        (0.0, 0.0, 0.0),
    ];

    for (roll, pitch, yaw) in cases {
        let original = UnitQuaternion::from_euler_angles(roll, pitch, yaw);
        let matrix = *original.to_rotation_matrix().matrix();

        let recovered =
            UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(matrix));

        let alignment = original.coords.dot(&recovered.coords).abs();
        assert!(
            (alignment - 1.0).abs() < 1e-9,
            "round trip drifted for ({roll}, {pitch}, {yaw})"
        );
    }
}

/// Numerical corruption is a distinguishable fatal error, not NaN output.
#[test]
fn test_divergence_is_surfaced() {
    let mut ahrs = Mahony::new();

    let result = ahrs.update_imu(
        Vector3::new(f64::INFINITY, 0.0, 0.0),
        Vector3::new(0.0, 0.0, 1.0),
    );
    assert_eq!(result, Err(Error::NumericalDivergence));
}

/// Constructor validation fires before any samples are processed.
#[test]
fn test_construction_rejects_misconfiguration() {
    assert!(matches!(
        Mahony::with_settings(MahonySettings {
            sample_rate: -10.0,
            ..Default::default()
        }),
        Err(Error::InvalidSampleRate(_))
    ));

    assert!(matches!(
        Mahony::with_settings(MahonySettings {
            integral_gain: f64::NAN,
            ..Default::default()
        }),
        Err(Error::InvalidGain {
            name: "integral",
            ..
        })
    ));
}
