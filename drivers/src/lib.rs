#![no_std]

#[cfg(test)]
extern crate std;

#[macro_use]
extern crate log;
extern crate tilt_copter;

pub mod mpu6050;
