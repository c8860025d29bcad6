use fugit::NanosDurationU64 as Duration;
use serde::Serialize;

use crate::config;
use crate::types::measurement::Euler;

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum State {
    Idle,
    Sampling { count: u16 },
    Committing,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Outcome {
    Completed(Euler),
    TimedOut,
}

/// Zero reference from the average of a burst of uncorrected samples.
pub struct Calibration {
    samples: u16,
    interval: Duration,
    max_attempts: u16,
    state: State,
    sum: Euler,
    failures: u16,
    next_sample: Duration,
}

impl Calibration {
    pub fn new(config: &config::Calibration) -> Self {
        Self {
            samples: config.samples.max(1),
            interval: config.interval(),
            max_attempts: config.max_attempts,
            state: State::Idle,
            sum: Euler::default(),
            failures: 0,
            next_sample: Duration::millis(0),
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == State::Idle
    }

    /// Time left until the next sample is due, zero when nothing is being sampled.
    pub fn wait(&self, now: Duration) -> Duration {
        match self.state {
            State::Sampling { .. } if self.next_sample > now => self.next_sample - now,
            _ => Duration::millis(0),
        }
    }

    /// Returns false if a calibration is already running.
    pub fn start(&mut self, now: Duration) -> bool {
        if !self.is_idle() {
            return false;
        }
        info!("Calibrating with {} samples", self.samples);
        self.state = State::Sampling { count: 0 };
        self.sum = Euler::default();
        self.failures = 0;
        self.next_sample = now;
        true
    }

    /// Feeds one tick, `sample` is `None` when the sensor had nothing to offer.
    pub fn step(&mut self, now: Duration, sample: Option<Euler>) -> Option<Outcome> {
        let count = match self.state {
            State::Idle => return None,
            State::Committing => {
                self.state = State::Idle;
                let offset = self.sum / self.samples as f32;
                info!(
                    "Calibration finished, offset yaw {:.2} pitch {:.2} roll {:.2}",
                    offset.yaw, offset.pitch, offset.roll
                );
                return Some(Outcome::Completed(offset));
            }
            State::Sampling { count } => count,
        };
        if now < self.next_sample {
            return None;
        }

        let euler = match sample {
            Some(euler) => euler,
            None => {
                self.failures += 1;
                if self.failures < self.max_attempts {
                    trace!("Calibration sample not ready, attempt {}", self.failures);
                    return None;
                }
                warn!("Calibration timed out after {} attempts", self.failures);
                self.state = State::Idle;
                return Some(Outcome::TimedOut);
            }
        };

        self.sum += euler;
        self.next_sample = now + self.interval;
        let count = count + 1;
        self.state = if count < self.samples { State::Sampling { count } } else { State::Committing };
        None
    }
}

#[cfg(test)]
mod test {
    use fugit::NanosDurationU64 as Duration;

    use super::{Calibration, Outcome, State};
    use crate::config;
    use crate::types::measurement::Euler;

    fn calibration() -> Calibration {
        Calibration::new(&config::Calibration::default())
    }

    #[test]
    fn test_identical_samples() {
        let mut calibration = calibration();
        let sample = Euler::new(0.0, 3.5, -1.25);
        assert!(calibration.start(Duration::millis(0)));
        for i in 0..20 {
            let now = Duration::millis(i * 50);
            assert_eq!(calibration.step(now, Some(sample)), None);
        }
        assert_eq!(calibration.state(), State::Committing);
        let outcome = calibration.step(Duration::millis(1000), None);
        assert_eq!(outcome, Some(Outcome::Completed(sample)));
        assert!(calibration.is_idle());
    }

    #[test]
    fn test_samples_are_spaced() {
        let mut calibration = calibration();
        calibration.start(Duration::millis(0));
        calibration.step(Duration::millis(0), Some(Euler::default()));
        for ms in [10, 20, 49] {
            calibration.step(Duration::millis(ms), Some(Euler::new(100.0, 100.0, 100.0)));
        }
        assert_eq!(calibration.state(), State::Sampling { count: 1 });
        assert_eq!(calibration.wait(Duration::millis(20)), Duration::millis(30));
        calibration.step(Duration::millis(50), Some(Euler::default()));
        assert_eq!(calibration.state(), State::Sampling { count: 2 });
    }

    #[test]
    fn test_not_ready_is_not_counted() {
        let mut calibration = calibration();
        calibration.start(Duration::millis(0));
        let mut now = 0;
        for _ in 0..5 {
            assert_eq!(calibration.step(Duration::millis(now), None), None);
            now += 10;
        }
        assert_eq!(calibration.state(), State::Sampling { count: 0 });
        for _ in 0..20 {
            calibration.step(Duration::millis(now), Some(Euler::new(0.0, 2.0, 4.0)));
            now += 50;
        }
        let outcome = calibration.step(Duration::millis(now), None);
        assert_eq!(outcome, Some(Outcome::Completed(Euler::new(0.0, 2.0, 4.0))));
    }

    #[test]
    fn test_timeout() {
        let mut calibration = calibration();
        calibration.start(Duration::millis(0));
        for i in 0..199 {
            assert_eq!(calibration.step(Duration::millis(i), None), None);
        }
        assert_eq!(calibration.step(Duration::millis(199), None), Some(Outcome::TimedOut));
        assert!(calibration.is_idle());
        assert_eq!(calibration.step(Duration::millis(200), None), None);
    }

    #[test]
    fn test_start_while_running() {
        let mut calibration = calibration();
        assert!(calibration.start(Duration::millis(0)));
        assert!(!calibration.start(Duration::millis(10)));
    }
}
