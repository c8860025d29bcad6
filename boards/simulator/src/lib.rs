#[macro_use]
extern crate log;
extern crate tilt_copter;

pub mod bench;
pub mod pwm;
pub mod simulator;

pub use bench::Bench;
pub use simulator::{Message, Simulator};
