pub mod fusion;
pub mod tilt;

use crate::config::imu::Mode;
use crate::types::measurement::Attitude;
use crate::types::sensor::RawFrame;

/// Orientation estimator, chosen once at start-up.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Estimator {
    Tilt,
    Fusion,
}

impl From<Mode> for Estimator {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Tilt => Self::Tilt,
            Mode::Fusion => Self::Fusion,
        }
    }
}

impl Estimator {
    /// Uncorrected orientation, `None` if the frame doesn't belong to this estimator.
    pub fn estimate(&self, frame: &RawFrame) -> Option<Attitude> {
        match (self, frame) {
            (Self::Tilt, RawFrame::Acceleration(axes)) => Some(tilt::tilt(*axes)),
            (Self::Fusion, RawFrame::Fusion { quaternion, gravity }) => {
                Some(fusion::fusion(quaternion, gravity))
            }
            _ => None,
        }
    }

    pub fn observes_yaw(&self) -> bool {
        *self == Self::Fusion
    }
}

mod test {
    #[test]
    fn test_mismatched_frame() {
        use nalgebra::UnitQuaternion;

        use super::Estimator;
        use crate::types::sensor::{Axes, RawFrame};

        let acceleration = RawFrame::Acceleration(Axes::new(0, 0, 16384));
        let fusion = RawFrame::fusion(UnitQuaternion::identity());
        assert!(Estimator::Tilt.estimate(&acceleration).is_some());
        assert_eq!(Estimator::Tilt.estimate(&fusion), None);
        assert_eq!(Estimator::Fusion.estimate(&acceleration), None);
        assert!(Estimator::Fusion.estimate(&fusion).unwrap().yaw.is_some());
        assert!(Estimator::Fusion.observes_yaw());
        assert!(!Estimator::Tilt.observes_yaw());
    }
}
