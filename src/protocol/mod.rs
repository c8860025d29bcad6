pub mod command;

use crate::config::pwm::NUM_CHANNELS;
use crate::fcs::out::Telemetry;
use crate::imu::calibration::Outcome;
use crate::types::measurement::Attitude;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Request {
    Orientation,
    Recalibrate,
    SetDuty([Option<i32>; NUM_CHANNELS]),
    Telemetry,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Reply {
    Orientation(Attitude),
    /// No orientation has been estimated yet
    NoSample,
    Ack,
    /// Answered later with the calibration outcome
    Deferred,
    CalibrationTimedOut,
    Telemetry(Telemetry),
}

impl From<Outcome> for Reply {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Completed(_) => Self::Ack,
            Outcome::TimedOut => Self::CalibrationTimedOut,
        }
    }
}
