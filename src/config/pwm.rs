use serde::{Deserialize, Serialize};

use super::setting::{Configure, Error, Setting};

pub const NUM_CHANNELS: usize = 4;

/// Physical pin and logical PWM channel driving one motor.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub pin: u8,
    pub channel: u8,
}

impl Configure for Binding {
    fn configure(&mut self, mut setting: Setting) -> Result<(), Error> {
        match setting.key()? {
            "pin" => self.pin = setting.value()?,
            "channel" => self.channel = setting.value()?,
            _ => return Err(Error::UnknownKey),
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PWM {
    /// Hz
    pub frequency: u32,
    /// Bits
    pub resolution: u8,
    pub bindings: [Binding; NUM_CHANNELS],
}

impl Default for PWM {
    fn default() -> Self {
        Self {
            frequency: 5000,
            resolution: 8,
            bindings: [
                Binding { pin: 23, channel: 0 },
                Binding { pin: 17, channel: 1 },
                Binding { pin: 12, channel: 2 },
                Binding { pin: 25, channel: 3 },
            ],
        }
    }
}

impl PWM {
    pub fn max_duty(&self) -> u16 {
        ((1u32 << self.resolution.min(16)) - 1) as u16
    }
}

impl Configure for PWM {
    fn configure(&mut self, mut setting: Setting) -> Result<(), Error> {
        match setting.key()? {
            "frequency" => self.frequency = setting.value()?,
            "resolution" => self.resolution = setting.value_in(1..=16)?,
            "bindings" => {
                let index = setting.index(NUM_CHANNELS)?;
                return self.bindings[index].configure(setting);
            }
            _ => return Err(Error::UnknownKey),
        }
        Ok(())
    }
}

mod test {
    #[test]
    fn test_max_duty() {
        use super::PWM;

        let mut pwm = PWM::default();
        assert_eq!(pwm.max_duty(), 255);
        pwm.resolution = 10;
        assert_eq!(pwm.max_duty(), 1023);
        pwm.resolution = 16;
        assert_eq!(pwm.max_duty(), u16::MAX);
    }
}
