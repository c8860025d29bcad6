use embedded_hal::PwmPin;
use tilt_copter::config::pwm::NUM_CHANNELS;
use tilt_copter::config::{Binding, PWM};

/// LEDC-like PWM channel, keeps the last written duty.
pub struct SimulatedPwm {
    binding: Binding,
    frequency: u32,
    max_duty: u16,
    duty: u16,
    enabled: bool,
}

impl SimulatedPwm {
    pub fn new(binding: Binding, config: &PWM) -> Self {
        let max_duty = config.max_duty();
        Self { binding, frequency: config.frequency, max_duty, duty: 0, enabled: false }
    }

    pub fn channels(config: &PWM) -> [Self; NUM_CHANNELS] {
        config.bindings.map(|binding| Self::new(binding, config))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl PwmPin for SimulatedPwm {
    type Duty = u16;

    fn disable(&mut self) {
        self.enabled = false;
    }

    fn enable(&mut self) {
        let Binding { pin, channel } = self.binding;
        info!("PWM channel {} on pin {} enabled at {}Hz", channel, pin, self.frequency);
        self.enabled = true;
    }

    fn get_duty(&self) -> u16 {
        self.duty
    }

    fn get_max_duty(&self) -> u16 {
        self.max_duty
    }

    fn set_duty(&mut self, duty: u16) {
        if duty != self.duty {
            debug!("PWM channel {} duty {}/{}", self.binding.channel, duty, self.max_duty);
        }
        self.duty = duty;
    }
}
