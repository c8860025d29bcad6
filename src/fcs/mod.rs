pub mod failsafe;
pub mod out;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::PwmPin;
use fugit::NanosDurationU64 as Duration;

use crate::algorithm::Estimator;
use crate::config::{self, pwm::NUM_CHANNELS, Config};
use crate::hal::sensor::Sensor;
use crate::imu::calibration::Outcome;
use crate::imu::{CalibrationError, IMU};
use crate::motor::Motors;
use crate::protocol::{Reply, Request};
use crate::types::measurement::Euler;
use failsafe::Failsafe;

/// Attitude estimation and motor output, advanced one tick at a time.
pub struct FCS<S, P> {
    mode: config::Mode,
    imu: IMU<S>,
    motors: Motors<P>,
    failsafe: Failsafe,
}

impl<S: Sensor, P: PwmPin<Duty = u16>> FCS<S, P> {
    pub fn new(sensor: S, pins: [P; NUM_CHANNELS], config: &Config) -> Self {
        let mode = config.imu.mode;
        info!("Estimating attitude in {} mode", mode);
        Self {
            mode,
            imu: IMU::new(sensor, Estimator::from(mode), &config.calibration),
            motors: Motors::new(pins),
            failsafe: Failsafe::new(&config.failsafe),
        }
    }

    pub fn imu(&mut self) -> &mut IMU<S> {
        &mut self.imu
    }

    pub fn motors(&self) -> &Motors<P> {
        &self.motors
    }

    /// Blocking calibration, only meant for start-up before ticking begins.
    pub fn calibrate(&mut self, delay: &mut impl DelayMs<u16>) -> Result<Euler, CalibrationError> {
        self.imu.calibrate(delay)
    }

    pub fn handle(&mut self, now: Duration, request: Request) -> Reply {
        match request {
            Request::Orientation => match self.imu.attitude() {
                Some(attitude) => Reply::Orientation(attitude),
                None => Reply::NoSample,
            },
            Request::Recalibrate => {
                if !self.imu.start_calibration(now) {
                    debug!("Calibration in progress, joining");
                }
                Reply::Deferred
            }
            Request::SetDuty(duties) => {
                for (channel, duty) in duties.iter().enumerate() {
                    if let Some(value) = duty {
                        self.motors.set_duty(channel, *value);
                    }
                }
                self.failsafe.feed(now);
                Reply::Ack
            }
            Request::Telemetry => Reply::Telemetry(self.output()),
        }
    }

    /// Refreshes the attitude then drives the motors, yields a finished calibration.
    pub fn tick(&mut self, now: Duration) -> Option<Outcome> {
        let outcome = self.imu.update(now);
        if self.failsafe.check(now) {
            self.motors.stop();
        }
        self.motors.apply_all();
        outcome
    }

    pub fn output(&self) -> out::Telemetry {
        out::Telemetry {
            mode: self.mode,
            imu: self.imu.output(),
            duties: self.motors.duties(),
            failsafe: self.failsafe.is_tripped(),
        }
    }
}

#[cfg(test)]
mod test {
    use embedded_hal::PwmPin;
    use fugit::NanosDurationU64 as Duration;

    use super::FCS;
    use crate::config::Config;
    use crate::hal::sensor::{Error, Sensor};
    use crate::imu::calibration::Outcome;
    use crate::protocol::{command, Reply, Request};
    use crate::types::sensor::{Axes, RawFrame};

    struct FakeSensor {
        frame: Option<RawFrame>,
    }

    impl Sensor for FakeSensor {
        fn read_raw(&mut self) -> nb::Result<RawFrame, Error> {
            self.frame.ok_or(nb::Error::WouldBlock)
        }
    }

    #[derive(Default)]
    struct FakePin(u16);

    impl PwmPin for FakePin {
        type Duty = u16;

        fn disable(&mut self) {}
        fn enable(&mut self) {}

        fn get_duty(&self) -> u16 {
            self.0
        }

        fn get_max_duty(&self) -> u16 {
            255
        }

        fn set_duty(&mut self, duty: u16) {
            self.0 = duty
        }
    }

    fn fcs(config: &Config) -> FCS<FakeSensor, FakePin> {
        let sensor = FakeSensor { frame: Some(RawFrame::Acceleration(Axes::new(400, 0, 16384))) };
        FCS::new(sensor, Default::default(), config)
    }

    fn ms(ms: u64) -> Duration {
        Duration::millis(ms)
    }

    #[test]
    fn test_orientation_before_first_sample() {
        let mut fcs = fcs(&Config::default());
        assert_eq!(fcs.handle(ms(0), Request::Orientation), Reply::NoSample);
        fcs.tick(ms(0));
        match fcs.handle(ms(1), Request::Orientation) {
            Reply::Orientation(attitude) => assert!(attitude.pitch > 1.0),
            reply => panic!("unexpected reply {:?}", reply),
        }
    }

    #[test]
    fn test_stale_sample_reused() {
        let mut fcs = fcs(&Config::default());
        fcs.tick(ms(0));
        let before = fcs.handle(ms(0), Request::Orientation);
        fcs.imu().sensor().frame = None;
        fcs.tick(ms(10));
        assert_eq!(fcs.handle(ms(10), Request::Orientation), before);
    }

    #[test]
    fn test_set_duty() {
        let mut fcs = fcs(&Config::default());
        let request = Request::SetDuty(command::set_duty("m1=300&m3=-4&m4=77"));
        assert_eq!(fcs.handle(ms(0), request), Reply::Ack);
        fcs.tick(ms(0));
        assert_eq!(fcs.motors().duties(), [255, 0, 0, 77]);
        assert_eq!(fcs.motors().pins()[0].0, 255);
        assert_eq!(fcs.motors().pins()[3].0, 77);

        fcs.handle(ms(5), Request::SetDuty(command::set_duty("m2=12")));
        fcs.tick(ms(10));
        assert_eq!(fcs.motors().duties(), [255, 12, 0, 77]);
        assert_eq!(fcs.handle(ms(10), Request::SetDuty([None; 4])), Reply::Ack);
    }

    #[test]
    fn test_recalibrate() {
        let mut fcs = fcs(&Config::default());
        assert_eq!(fcs.handle(ms(0), Request::Recalibrate), Reply::Deferred);
        let mut now = 0;
        let mut outcome = None;
        while outcome.is_none() {
            outcome = fcs.tick(ms(now));
            if now == 100 {
                // joins the running calibration
                assert_eq!(fcs.handle(ms(now), Request::Recalibrate), Reply::Deferred);
            }
            now += 10;
        }
        assert!(now < 1100);
        assert_eq!(Reply::from(outcome.unwrap()), Reply::Ack);
        match fcs.handle(ms(now), Request::Orientation) {
            Reply::Orientation(attitude) => assert!(attitude.pitch.abs() <= 0.5),
            reply => panic!("unexpected reply {:?}", reply),
        }
    }

    #[test]
    fn test_recalibrate_timeout() {
        let mut fcs = fcs(&Config::default());
        fcs.imu().sensor().frame = None;
        fcs.handle(ms(0), Request::Recalibrate);
        let outcome = (0..200).filter_map(|i| fcs.tick(ms(i * 10))).next();
        assert_eq!(outcome, Some(Outcome::TimedOut));
        assert_eq!(Reply::from(Outcome::TimedOut), Reply::CalibrationTimedOut);
    }

    #[test]
    fn test_failsafe() {
        let mut config = Config::default();
        config.failsafe.timeout_ms = 500;
        let mut fcs = fcs(&config);
        fcs.handle(ms(0), Request::SetDuty([Some(100); 4]));
        fcs.tick(ms(499));
        assert_eq!(fcs.motors().duties(), [100; 4]);
        fcs.tick(ms(500));
        assert_eq!(fcs.motors().duties(), [0; 4]);
        assert_eq!(fcs.motors().pins()[2].0, 0);
        assert!(fcs.output().failsafe);

        fcs.handle(ms(600), Request::SetDuty([Some(50), None, None, None]));
        fcs.tick(ms(610));
        assert_eq!(fcs.motors().duties(), [50, 0, 0, 0]);
    }

    #[test]
    fn test_failsafe_waits_for_first_command() {
        let mut config = Config::default();
        config.failsafe.timeout_ms = 500;
        let mut fcs = fcs(&config);
        fcs.tick(ms(0));
        fcs.tick(ms(10_000));
        assert!(!fcs.output().failsafe);
        assert_eq!(fcs.motors().duties(), [0; 4]);
    }

    #[test]
    fn test_no_failsafe_by_default() {
        let mut fcs = fcs(&Config::default());
        fcs.handle(ms(0), Request::SetDuty([Some(100); 4]));
        fcs.tick(ms(3_600_000));
        assert_eq!(fcs.motors().duties(), [100; 4]);
    }

    #[test]
    fn test_telemetry() {
        let mut fcs = fcs(&Config::default());
        fcs.tick(ms(0));
        match fcs.handle(ms(0), Request::Telemetry) {
            Reply::Telemetry(telemetry) => {
                assert_eq!(telemetry.duties, [0; 4]);
                assert!(telemetry.imu.attitude.is_some());
            }
            reply => panic!("unexpected reply {:?}", reply),
        }
    }
}
