//! Mathematical utilities and nalgebra extensions for the imu-motion library

use nalgebra::Vector3;

/// Mathematical constants
pub const DEG_TO_RAD: f64 = core::f64::consts::PI / 180.0;
pub const RAD_TO_DEG: f64 = 180.0 / core::f64::consts::PI;

/// Extension trait for Vector3 operations
pub trait Vector3Ext {
    /// Normalize the vector, returning the zero vector if its norm is zero
    fn safe_normalize(&self) -> Vector3<f64>;

    /// Convert degrees to radians
    fn deg_to_rad(&self) -> Vector3<f64>;

    /// Convert radians to degrees
    fn rad_to_deg(&self) -> Vector3<f64>;
}

impl Vector3Ext for Vector3<f64> {
    fn safe_normalize(&self) -> Vector3<f64> {
        let norm = self.norm();
        if norm > 0.0 { *self / norm } else { Vector3::zeros() }
    }

    fn deg_to_rad(&self) -> Vector3<f64> {
        *self * DEG_TO_RAD
    }

    fn rad_to_deg(&self) -> Vector3<f64> {
        *self * RAD_TO_DEG
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_normalize() {
        let v = Vector3::new(3.0f64, 4.0, 0.0);
        let normalized = v.safe_normalize();
        assert!((normalized.norm() - 1.0).abs() < 1e-12);
        assert!((normalized.x - 0.6).abs() < 1e-12);

        assert_eq!(Vector3::zeros().safe_normalize(), Vector3::zeros());
    }

    #[test]
    fn test_angle_conversions() {
        let degrees = Vector3::new(180.0, 90.0, -90.0);
        let radians = degrees.deg_to_rad();

        assert!((radians.x - core::f64::consts::PI).abs() < 1e-12);
        assert!((radians.y - core::f64::consts::FRAC_PI_2).abs() < 1e-12);

        let recovered = radians.rad_to_deg();
        assert!((degrees - recovered).norm() < 1e-9);
    }
}
