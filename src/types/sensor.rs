use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Raw accelerometer readout in sensor LSB, not SI units.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Axes {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl Axes {
    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }
}

/// Gravity direction in the sensor frame implied by an attitude quaternion.
pub fn gravity(q: &UnitQuaternion<f32>) -> Vector3<f32> {
    let (w, x, y, z) = (q.w, q.i, q.j, q.k);
    Vector3::new(2.0 * (x * z - w * y), 2.0 * (w * x + y * z), w * w - x * x - y * y + z * z)
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RawFrame {
    Acceleration(Axes),
    Fusion { quaternion: UnitQuaternion<f32>, gravity: Vector3<f32> },
}

impl RawFrame {
    pub fn fusion(quaternion: UnitQuaternion<f32>) -> Self {
        Self::Fusion { quaternion, gravity: gravity(&quaternion) }
    }
}

mod test {
    #[test]
    fn test_gravity_of_level_attitude() {
        use nalgebra::{UnitQuaternion, Vector3};

        use super::gravity;

        assert_eq!(gravity(&UnitQuaternion::identity()), Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_gravity_when_upside_down() {
        use nalgebra::{Quaternion, UnitQuaternion};

        use super::gravity;

        // 180 degree roll
        let q = UnitQuaternion::new_normalize(Quaternion::new(0.0, 1.0, 0.0, 0.0));
        let g = gravity(&q);
        assert!(g.x.abs() < 1e-6 && g.y.abs() < 1e-6);
        assert!((g.z + 1.0).abs() < 1e-6);
    }
}
