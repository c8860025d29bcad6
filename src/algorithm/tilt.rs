#[cfg(not(any(test, feature = "std")))]
use micromath::F32Ext;

use crate::types::measurement::{Attitude, DEGREE_PER_DAG};
use crate::types::sensor::Axes;

/// Pitch and roll from the direction of the measured acceleration.
///
/// Only valid while quasi-static: any sustained linear acceleration is indistinguishable
/// from gravity and shows up as tilt. Yaw is unobservable and left unset.
pub fn tilt(axes: Axes) -> Attitude {
    let (x, y, z) = (axes.x as f32, axes.y as f32, axes.z as f32);
    let pitch = x.atan2((y * y + z * z).sqrt());
    let roll = y.atan2((x * x + z * z).sqrt());
    Attitude { yaw: None, pitch: pitch * DEGREE_PER_DAG, roll: roll * DEGREE_PER_DAG }
}

mod test {
    #[test]
    fn test_level() {
        use super::tilt;
        use crate::types::sensor::Axes;

        let attitude = tilt(Axes::new(0, 0, 16384));
        assert_eq!(attitude.yaw, None);
        assert_eq!(attitude.pitch, 0.0);
        assert_eq!(attitude.roll, 0.0);
    }

    #[test]
    fn test_45_degree() {
        use super::tilt;
        use crate::types::sensor::Axes;

        let attitude = tilt(Axes::new(11585, 0, 11585));
        assert!((attitude.pitch - 45.0).abs() < 0.01);
        assert_eq!(attitude.roll, 0.0);

        let attitude = tilt(Axes::new(0, -11585, 11585));
        assert!((attitude.roll + 45.0).abs() < 0.01);
    }

    #[test]
    fn test_bounded_while_upright() {
        use super::tilt;
        use crate::types::sensor::Axes;

        let values = [i16::MIN, -16384, -1000, -1, 0, 1, 1000, 16384, i16::MAX];
        for &x in values.iter() {
            for &y in values.iter() {
                for &z in [1, 100, 16384, i16::MAX].iter() {
                    let attitude = tilt(Axes::new(x, y, z));
                    assert!(attitude.pitch > -90.0 && attitude.pitch < 90.0, "{} {} {}", x, y, z);
                    assert!(attitude.roll > -90.0 && attitude.roll < 90.0, "{} {} {}", x, y, z);
                }
            }
        }
    }
}
