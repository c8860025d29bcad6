use embedded_hal::PwmPin;

use crate::config::pwm::NUM_CHANNELS;

pub const MAX_DUTY: u8 = u8::MAX;

fn to_pwm_duty(max_duty: u16, duty: u8) -> u16 {
    (max_duty as u32 * duty as u32 / MAX_DUTY as u32) as u16
}

/// Four open-loop motor channels, duty values in `[0, 255]`.
pub struct Motors<P> {
    pins: [P; NUM_CHANNELS],
    duties: [u8; NUM_CHANNELS],
}

impl<P: PwmPin<Duty = u16>> Motors<P> {
    /// Enables every pin with motors off.
    pub fn new(mut pins: [P; NUM_CHANNELS]) -> Self {
        for pin in pins.iter_mut() {
            pin.set_duty(0);
            pin.enable();
        }
        Self { pins, duties: [0; NUM_CHANNELS] }
    }

    /// Out of range values are clamped, never rejected.
    pub fn set_duty(&mut self, channel: usize, value: i32) {
        let duty = match self.duties.get_mut(channel) {
            Some(duty) => duty,
            None => {
                warn!("Motor channel {} not exists", channel);
                return;
            }
        };
        let clamped = value.clamp(0, MAX_DUTY as i32);
        if clamped != value {
            debug!("Motor {} duty {} clamped to {}", channel + 1, value, clamped);
        }
        *duty = clamped as u8;
    }

    pub fn duty(&self, channel: usize) -> Option<u8> {
        self.duties.get(channel).copied()
    }

    pub fn duties(&self) -> [u8; NUM_CHANNELS] {
        self.duties
    }

    pub fn stop(&mut self) {
        self.duties = [0; NUM_CHANNELS];
    }

    /// Writes every stored duty to hardware, changed or not.
    pub fn apply_all(&mut self) {
        for (pin, &duty) in self.pins.iter_mut().zip(self.duties.iter()) {
            let max_duty = pin.get_max_duty();
            pin.set_duty(to_pwm_duty(max_duty, duty));
        }
    }

    pub fn pins(&self) -> &[P; NUM_CHANNELS] {
        &self.pins
    }
}
