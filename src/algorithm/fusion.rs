#[cfg(not(any(test, feature = "std")))]
use micromath::F32Ext;
use nalgebra::{UnitQuaternion, Vector3};

use crate::types::measurement::{Attitude, DEGREE_PER_DAG};

/// Yaw from the quaternion, pitch and roll from the gravity vector.
/// Yaw drifts since nothing corrects it against a magnetic reference.
pub fn fusion(q: &UnitQuaternion<f32>, gravity: &Vector3<f32>) -> Attitude {
    let (w, x, y, z) = (q.w, q.i, q.j, q.k);
    let yaw = (2.0 * x * y - 2.0 * w * z).atan2(2.0 * w * w + 2.0 * x * x - 1.0);
    let (gx, gy, gz) = (gravity.x, gravity.y, gravity.z);
    let pitch = gx.atan2((gy * gy + gz * gz).sqrt());
    let roll = gy.atan2(gz);
    Attitude {
        yaw: Some(yaw * DEGREE_PER_DAG),
        pitch: pitch * DEGREE_PER_DAG,
        roll: roll * DEGREE_PER_DAG,
    }
}

#[cfg(test)]
mod test {
    use nalgebra::{UnitQuaternion, Vector3};

    use crate::types::measurement::Attitude;
    use crate::types::sensor::gravity;

    fn estimate(q: UnitQuaternion<f32>) -> Attitude {
        super::fusion(&q, &gravity(&q))
    }

    fn assert_near(actual: f32, expected: f32) {
        assert!((actual - expected).abs() < 0.01, "{} != {}", actual, expected);
    }

    #[test]
    fn test_identity() {
        let attitude = estimate(UnitQuaternion::identity());
        assert_near(attitude.yaw.unwrap_or(f32::NAN), 0.0);
        assert_near(attitude.pitch, 0.0);
        assert_near(attitude.roll, 0.0);
    }

    #[test]
    fn test_roll() {
        let q = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 30f32.to_radians());
        let attitude = estimate(q);
        assert_near(attitude.roll, 30.0);
        assert_near(attitude.pitch, 0.0);
    }

    #[test]
    fn test_pitch() {
        let q = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 30f32.to_radians());
        let attitude = estimate(q);
        assert_near(attitude.pitch, -30.0);
        assert_near(attitude.roll, 0.0);
    }

    #[test]
    fn test_yaw() {
        let q = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 90f32.to_radians());
        let attitude = estimate(q);
        assert_near(attitude.yaw.unwrap_or(f32::NAN), -90.0);
        assert_near(attitude.pitch, 0.0);
        assert_near(attitude.roll, 0.0);
    }
}
