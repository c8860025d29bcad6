use core::str::FromStr;

use fugit::NanosDurationU64 as Duration;
use serde::{Deserialize, Serialize};

use super::setting::{Configure, Error, Setting};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Raw accelerometer, tilt angles only
    Tilt,
    /// On-sensor quaternion output
    Fusion,
}

impl Default for Mode {
    fn default() -> Self {
        Self::Tilt
    }
}

impl FromStr for Mode {
    type Err = ();

    fn from_str(string: &str) -> Result<Self, ()> {
        match string {
            "tilt" => Ok(Self::Tilt),
            "fusion" => Ok(Self::Fusion),
            _ => Err(()),
        }
    }
}

impl core::fmt::Display for Mode {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::Tilt => write!(f, "tilt"),
            Self::Fusion => write!(f, "fusion"),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IMU {
    pub mode: Mode,
}

impl Configure for IMU {
    fn configure(&mut self, mut setting: Setting) -> Result<(), Error> {
        match setting.key()? {
            "mode" => self.mode = setting.value()?,
            _ => return Err(Error::UnknownKey),
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Calibration {
    pub samples: u16,
    pub interval_ms: u16,
    /// Unready reads tolerated before giving up
    pub max_attempts: u16,
}

impl Default for Calibration {
    fn default() -> Self {
        Self { samples: 20, interval_ms: 50, max_attempts: 200 }
    }
}

impl Calibration {
    pub fn interval(&self) -> Duration {
        Duration::millis(self.interval_ms as u64)
    }
}

impl Configure for Calibration {
    fn configure(&mut self, mut setting: Setting) -> Result<(), Error> {
        match setting.key()? {
            "samples" => self.samples = setting.value_in(1..=u16::MAX)?,
            "interval-ms" => self.interval_ms = setting.value()?,
            "max-attempts" => self.max_attempts = setting.value()?,
            _ => return Err(Error::UnknownKey),
        }
        Ok(())
    }
}
