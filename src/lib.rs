#![no_std]

#[cfg(any(test, feature = "std"))]
extern crate std;

#[macro_use]
extern crate log;

pub mod algorithm;
pub mod config;
pub mod fcs;
pub mod hal;
pub mod imu;
pub mod motor;
pub mod protocol;
pub mod types;

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;
