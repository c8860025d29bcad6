use core::f32::consts::PI;
use core::ops;

use serde::{Deserialize, Serialize};

pub const DEGREE_PER_DAG: f32 = 180.0 / PI;

/// Yaw, pitch and roll in degrees.
#[derive(Default, Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Euler {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl Euler {
    pub const fn new(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self { yaw, pitch, roll }
    }
}

impl ops::Add for Euler {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self { yaw: self.yaw + other.yaw, pitch: self.pitch + other.pitch, roll: self.roll + other.roll }
    }
}

impl ops::AddAssign for Euler {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl ops::Div<f32> for Euler {
    type Output = Self;

    fn div(self, d: f32) -> Euler {
        Euler { yaw: self.yaw / d, pitch: self.pitch / d, roll: self.roll / d }
    }
}
