use serde::ser::SerializeStruct;

use super::calibration::State;
use crate::types::measurement::{Attitude, Euler};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IMU {
    pub attitude: Option<Attitude>,
    pub offset: Euler,
    pub calibration: State,
    pub sensor_available: bool,
}

impl serde::Serialize for IMU {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut struct_ = serializer.serialize_struct("IMU", 4)?;
        struct_.serialize_field("attitude", &self.attitude)?;
        let offset: [f32; 3] = [self.offset.yaw, self.offset.pitch, self.offset.roll];
        struct_.serialize_field("offset", &offset[..])?;
        struct_.serialize_field("calibration", &self.calibration)?;
        struct_.serialize_field("sensor-available", &self.sensor_available)?;
        struct_.end()
    }
}

mod test {
    #[test]
    fn test_serialize() {
        use serde_json::json;

        use super::IMU;
        use crate::imu::calibration::State;
        use crate::types::measurement::{Attitude, Euler};

        let imu = IMU {
            attitude: Some(Attitude { yaw: None, pitch: 1.5, roll: -2.0 }),
            offset: Euler::new(0.0, 0.5, 0.25),
            calibration: State::Sampling { count: 3 },
            sensor_available: true,
        };
        let expected = json!({
            "attitude": {"pitch": 1.5, "roll": -2.0},
            "offset": [0.0, 0.5, 0.25],
            "calibration": {"sampling": {"count": 3}},
            "sensor-available": true
        });
        assert_eq!(expected, serde_json::to_value(&imu).unwrap());

        let idle = IMU { attitude: None, calibration: State::Idle, ..imu };
        assert_eq!(serde_json::to_value(&idle).unwrap()["attitude"], json!(null));
        assert_eq!(serde_json::to_value(&idle).unwrap()["calibration"], json!("idle"));
    }
}
