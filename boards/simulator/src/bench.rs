use std::sync::{Arc, Mutex, MutexGuard};

use nalgebra::UnitQuaternion;
use tilt_copter::config::Mode;
use tilt_copter::hal::sensor::{self, Accelerometer, Direct, Fusion, MotionProcessor, Sensor};
use tilt_copter::types::sensor::{Axes, RawFrame};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Poisoned;

struct State {
    acceleration: Axes,
    quaternion: UnitQuaternion<f32>,
}

/// Test bench the simulated sensor sits on, frames are injected over HTTP.
#[derive(Clone)]
pub struct Bench(Arc<Mutex<State>>);

impl Default for Bench {
    fn default() -> Self {
        let acceleration = Axes::new(0, 0, 16384);
        let state = State { acceleration, quaternion: UnitQuaternion::identity() };
        Self(Arc::new(Mutex::new(state)))
    }
}

impl Bench {
    fn state(&self) -> Result<MutexGuard<State>, Poisoned> {
        self.0.lock().map_err(|_| Poisoned)
    }

    pub fn inject_acceleration(&self, axes: Axes) {
        if let Ok(mut state) = self.state() {
            trace!("Inject acceleration {:?}", axes);
            state.acceleration = axes;
        }
    }

    pub fn inject_quaternion(&self, quaternion: UnitQuaternion<f32>) {
        if let Ok(mut state) = self.state() {
            trace!("Inject quaternion {:?}", quaternion);
            state.quaternion = quaternion;
        }
    }
}

pub struct SimulatedAccelerometer(Bench);

impl Accelerometer for SimulatedAccelerometer {
    type Error = Poisoned;

    fn init(&mut self) -> Result<(), Poisoned> {
        Ok(())
    }

    fn read_acceleration(&mut self) -> nb::Result<Axes, Poisoned> {
        Ok(self.0.state()?.acceleration)
    }
}

pub struct SimulatedProcessor(Bench);

impl MotionProcessor for SimulatedProcessor {
    type Error = Poisoned;

    fn init(&mut self) -> Result<(), Poisoned> {
        Ok(())
    }

    fn read_quaternion(&mut self) -> nb::Result<UnitQuaternion<f32>, Poisoned> {
        Ok(self.0.state()?.quaternion)
    }
}

pub enum Variant {
    Direct(Direct<SimulatedAccelerometer>),
    Fusion(Fusion<SimulatedProcessor>),
}

impl Variant {
    pub fn new(mode: Mode, bench: Bench) -> Self {
        match mode {
            Mode::Tilt => Self::Direct(Direct::new(SimulatedAccelerometer(bench))),
            Mode::Fusion => Self::Fusion(Fusion::new(SimulatedProcessor(bench))),
        }
    }
}

impl Sensor for Variant {
    fn read_raw(&mut self) -> nb::Result<RawFrame, sensor::Error> {
        match self {
            Self::Direct(direct) => direct.read_raw(),
            Self::Fusion(fusion) => fusion.read_raw(),
        }
    }
}
