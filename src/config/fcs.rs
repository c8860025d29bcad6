use fugit::NanosDurationU64 as Duration;
use serde::{Deserialize, Serialize};

use super::setting::{Configure, Error, Setting};

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Failsafe {
    /// Zero disables the failsafe
    pub timeout_ms: u32,
}

impl Failsafe {
    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_ms {
            0 => None,
            ms => Some(Duration::millis(ms as u64)),
        }
    }
}

impl Configure for Failsafe {
    fn configure(&mut self, mut setting: Setting) -> Result<(), Error> {
        match setting.key()? {
            "timeout-ms" => self.timeout_ms = setting.value()?,
            _ => return Err(Error::UnknownKey),
        }
        Ok(())
    }
}
