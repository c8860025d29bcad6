pub mod calibration;
pub mod out;

use embedded_hal::blocking::delay::DelayMs;
use fugit::NanosDurationU64 as Duration;

use crate::algorithm::Estimator;
use crate::config;
use crate::hal::sensor::Sensor;
use crate::types::measurement::{Attitude, Euler};
use calibration::{Calibration, Outcome};

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CalibrationError {
    Busy,
    TimedOut,
}

impl core::fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let err_string = match self {
            Self::Busy => "Calibration already in progress",
            Self::TimedOut => "Sensor never became ready during calibration",
        };
        write!(f, "{}", err_string)
    }
}

pub struct IMU<S> {
    sensor: S,
    estimator: Estimator,
    offset: Euler,
    calibration: Calibration,
    attitude: Option<Attitude>,
    sensor_available: bool,
}

impl<S: Sensor> IMU<S> {
    pub fn new(sensor: S, estimator: Estimator, config: &config::Calibration) -> Self {
        Self {
            sensor,
            estimator,
            offset: Euler::default(),
            calibration: Calibration::new(config),
            attitude: None,
            sensor_available: true,
        }
    }

    /// Latest corrected orientation, stale if the sensor stopped delivering.
    pub fn attitude(&self) -> Option<Attitude> {
        self.attitude
    }

    pub fn offset(&self) -> Euler {
        self.offset
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn sensor(&mut self) -> &mut S {
        &mut self.sensor
    }

    fn sample(&mut self) -> Option<Attitude> {
        let frame = match self.sensor.read_raw() {
            Ok(frame) => frame,
            Err(nb::Error::WouldBlock) => {
                trace!("Sensor not ready");
                return None;
            }
            Err(nb::Error::Other(e)) => {
                if self.sensor_available {
                    warn!("Sensor unavailable: {}", e);
                    self.sensor_available = false;
                }
                return None;
            }
        };
        if !self.sensor_available {
            info!("Sensor available again");
            self.sensor_available = true;
        }
        let attitude = self.estimator.estimate(&frame);
        if attitude.is_none() {
            debug!("Frame {:?} not applicable to {:?} estimator", frame, self.estimator);
        }
        attitude
    }

    /// Returns false when joining a calibration already in progress.
    pub fn start_calibration(&mut self, now: Duration) -> bool {
        self.calibration.start(now)
    }

    pub fn update(&mut self, now: Duration) -> Option<Outcome> {
        let sample = self.sample();
        let outcome = self.calibration.step(now, sample.map(Euler::from));
        if let Some(Outcome::Completed(offset)) = outcome {
            self.offset = offset;
        }
        if let Some(raw) = sample {
            self.attitude = Some(raw.corrected(&self.offset));
        }
        outcome
    }

    /// Runs a whole calibration in place, blocking the caller until it ends.
    pub fn calibrate(&mut self, delay: &mut impl DelayMs<u16>) -> Result<Euler, CalibrationError> {
        let mut now = Duration::millis(0);
        if !self.calibration.start(now) {
            return Err(CalibrationError::Busy);
        }
        loop {
            match self.update(now) {
                Some(Outcome::Completed(offset)) => return Ok(offset),
                Some(Outcome::TimedOut) => return Err(CalibrationError::TimedOut),
                None => (),
            }
            if self.calibration.state() == calibration::State::Committing {
                continue;
            }
            let wait = self.calibration.wait(now).to_millis().max(1);
            let wait = wait.min(u16::MAX as u64);
            delay.delay_ms(wait as u16);
            now = now + Duration::millis(wait);
        }
    }

    pub fn output(&self) -> out::IMU {
        out::IMU {
            attitude: self.attitude,
            offset: self.offset,
            calibration: self.calibration.state(),
            sensor_available: self.sensor_available,
        }
    }
}

#[cfg(test)]
mod test {
    use fugit::NanosDurationU64 as Duration;
    use nalgebra::UnitQuaternion;

    use super::calibration::Outcome;
    use super::{CalibrationError, IMU};
    use crate::algorithm::Estimator;
    use crate::config;
    use crate::hal::sensor::{Error, Sensor};
    use crate::types::sensor::{Axes, RawFrame};

    struct FakeSensor {
        frame: RawFrame,
        not_ready: usize,
        reads: usize,
    }

    impl FakeSensor {
        fn new(frame: RawFrame) -> Self {
            Self { frame, not_ready: 0, reads: 0 }
        }
    }

    impl Sensor for FakeSensor {
        fn read_raw(&mut self) -> nb::Result<RawFrame, Error> {
            self.reads += 1;
            if self.not_ready > 0 {
                self.not_ready -= 1;
                return Err(nb::Error::WouldBlock);
            }
            Ok(self.frame)
        }
    }

    struct FakeDelay(u64);

    impl embedded_hal::blocking::delay::DelayMs<u16> for FakeDelay {
        fn delay_ms(&mut self, ms: u16) {
            self.0 += ms as u64;
        }
    }

    fn tilted() -> RawFrame {
        RawFrame::Acceleration(Axes::new(1200, -800, 16300))
    }

    #[test]
    fn test_calibrate_round_trip() {
        let sensor = FakeSensor::new(tilted());
        let mut imu = IMU::new(sensor, Estimator::Tilt, &config::Calibration::default());
        imu.update(Duration::millis(0));
        let raw = imu.attitude().unwrap();
        assert!(raw.pitch.abs() > 1.0);

        let mut delay = FakeDelay(0);
        let offset = imu.calibrate(&mut delay).unwrap();
        assert!((offset.pitch - raw.pitch).abs() < 1e-4);
        assert!((offset.roll - raw.roll).abs() < 1e-4);
        assert_eq!(delay.0, 19 * 50);

        imu.update(Duration::millis(2000));
        let attitude = imu.attitude().unwrap();
        assert!(attitude.pitch.abs() <= 0.5);
        assert!(attitude.roll.abs() <= 0.5);
        assert_eq!(attitude.yaw, None);
    }

    #[test]
    fn test_calibrate_skips_not_ready() {
        let mut sensor = FakeSensor::new(RawFrame::fusion(UnitQuaternion::identity()));
        sensor.not_ready = 5;
        let mut imu = IMU::new(sensor, Estimator::Fusion, &config::Calibration::default());
        let mut delay = FakeDelay(0);
        assert!(imu.calibrate(&mut delay).is_ok());
        // one extra read on the committing tick
        assert_eq!(imu.sensor().reads, 5 + 20 + 1);
    }

    #[test]
    fn test_calibration_timeout_keeps_offset() {
        let sensor = FakeSensor::new(tilted());
        let mut imu = IMU::new(sensor, Estimator::Tilt, &config::Calibration::default());
        let mut delay = FakeDelay(0);
        let offset = imu.calibrate(&mut delay).unwrap();

        imu.sensor().not_ready = usize::MAX;
        assert_eq!(imu.calibrate(&mut delay), Err(CalibrationError::TimedOut));
        assert_eq!(imu.offset(), offset);
        assert!(imu.calibration().is_idle());
    }

    #[test]
    fn test_tick_driven_calibration() {
        let sensor = FakeSensor::new(tilted());
        let mut imu = IMU::new(sensor, Estimator::Tilt, &config::Calibration::default());
        assert!(imu.start_calibration(Duration::millis(0)));
        assert!(!imu.start_calibration(Duration::millis(5)));
        let mut outcome = None;
        let mut ms = 0;
        while outcome.is_none() {
            outcome = imu.update(Duration::millis(ms));
            ms += 10;
        }
        match outcome {
            Some(Outcome::Completed(_)) => (),
            _ => panic!("unexpected outcome {:?}", outcome),
        }
        let attitude = imu.attitude().unwrap();
        assert!(attitude.pitch.abs() <= 0.5);
    }

    #[test]
    fn test_wrong_frame_is_not_ready() {
        let sensor = FakeSensor::new(tilted());
        let mut imu = IMU::new(sensor, Estimator::Fusion, &config::Calibration::default());
        assert_eq!(imu.update(Duration::millis(0)), None);
        assert_eq!(imu.attitude(), None);
    }
}
