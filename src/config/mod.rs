pub mod fcs;
pub mod imu;
pub mod pwm;
pub mod setting;

use fugit::NanosDurationU64 as Duration;
use serde::{Deserialize, Serialize};

pub use fcs::Failsafe;
pub use imu::{Calibration, Mode, IMU};
pub use pwm::{Binding, PWM};
use setting::{Configure, Error, Setting};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub imu: IMU,
    pub calibration: Calibration,
    pub pwm: PWM,
    pub failsafe: Failsafe,
    pub tick_ms: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            imu: IMU::default(),
            calibration: Calibration::default(),
            pwm: PWM::default(),
            failsafe: Failsafe::default(),
            tick_ms: 10,
        }
    }
}

impl Config {
    pub fn tick(&self) -> Duration {
        Duration::millis(self.tick_ms.max(1) as u64)
    }

    /// Applies a `--set` style override, e.g. `set("pwm.bindings.2.pin", "13")`.
    pub fn set(&mut self, path: &str, value: &str) -> Result<(), Error> {
        self.configure(Setting::new(path, value))
    }
}

impl Configure for Config {
    fn configure(&mut self, mut setting: Setting) -> Result<(), Error> {
        match setting.key()? {
            "imu" => self.imu.configure(setting),
            "calibration" => self.calibration.configure(setting),
            "pwm" => self.pwm.configure(setting),
            "failsafe" => self.failsafe.configure(setting),
            "tick-ms" => {
                self.tick_ms = setting.value()?;
                Ok(())
            }
            _ => Err(Error::UnknownKey),
        }
    }
}

mod test {
    #[test]
    fn test_set_path() {
        use super::setting::Error;
        use super::{Config, Mode};

        let mut config = Config::default();
        config.set("imu.mode", "fusion").unwrap();
        assert_eq!(config.imu.mode, Mode::Fusion);
        config.set("calibration.samples", "10").unwrap();
        assert_eq!(config.calibration.samples, 10);
        config.set("pwm.bindings.2.pin", "13").unwrap();
        assert_eq!(config.pwm.bindings[2].pin, 13);
        config.set("failsafe.timeout-ms", "500").unwrap();
        assert_eq!(config.failsafe.timeout_ms, 500);

        assert_eq!(config.set("calibration.samples", "0"), Err(Error::OutOfRange));
        assert_eq!(config.set("pwm.resolution", "17"), Err(Error::OutOfRange));
        assert_eq!(config.set("imu.mode", "magnetic"), Err(Error::InvalidValue));
        assert_eq!(config.set("imu.mode.extra", "tilt"), Err(Error::UnknownKey));
        assert_eq!(config.set("pwm.bindings.4.pin", "1"), Err(Error::UnknownKey));
        assert_eq!(config.set("pwm.bindings", "1"), Err(Error::UnknownKey));
        assert_eq!(config.set("osd.fov", "120"), Err(Error::UnknownKey));
        assert_eq!(config.imu.mode, Mode::Fusion);
    }

    #[test]
    fn test_json_round_trip() {
        use serde_json::json;

        use super::Config;

        let config = Config::default();
        let expected = json!({
            "imu": {"mode": "tilt"},
            "calibration": {"samples": 20, "interval-ms": 50, "max-attempts": 200},
            "pwm": {
                "frequency": 5000,
                "resolution": 8,
                "bindings": [
                    {"pin": 23, "channel": 0},
                    {"pin": 17, "channel": 1},
                    {"pin": 12, "channel": 2},
                    {"pin": 25, "channel": 3}
                ]
            },
            "failsafe": {"timeout-ms": 0},
            "tick-ms": 10
        });
        assert_eq!(serde_json::to_value(&config).unwrap(), expected);

        let partial: Config = serde_json::from_value(json!({"imu": {"mode": "fusion"}})).unwrap();
        assert_eq!(partial.imu.mode, super::Mode::Fusion);
        assert_eq!(partial.pwm, Config::default().pwm);
    }
}
