use serde::Serialize;

use crate::config::imu::Mode;
use crate::config::pwm::NUM_CHANNELS;
use crate::imu::out::IMU;

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Telemetry {
    pub mode: Mode,
    pub imu: IMU,
    pub duties: [u8; NUM_CHANNELS],
    pub failsafe: bool,
}

mod test {
    #[test]
    fn test_serialize() {
        use serde_json::json;

        use super::Telemetry;
        use crate::config::imu::Mode;
        use crate::imu::calibration::State;
        use crate::imu::out::IMU;
        use crate::types::measurement::{Attitude, Euler};

        let imu = IMU {
            attitude: Some(Attitude { yaw: Some(-90.0), pitch: 0.0, roll: 0.25 }),
            offset: Euler::default(),
            calibration: State::Idle,
            sensor_available: true,
        };
        let telemetry = Telemetry { mode: Mode::Fusion, imu, duties: [0, 128, 255, 3], failsafe: false };
        let expected = json!({
            "mode": "fusion",
            "imu": {
                "attitude": {"yaw": -90.0, "pitch": 0.0, "roll": 0.25},
                "offset": [0.0, 0.0, 0.0],
                "calibration": "idle",
                "sensor-available": true
            },
            "duties": [0, 128, 255, 3],
            "failsafe": false
        });
        assert_eq!(expected, serde_json::to_value(&telemetry).unwrap());
    }
}
