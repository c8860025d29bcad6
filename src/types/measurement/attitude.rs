use core::fmt::Write;

#[cfg(not(any(test, feature = "std")))]
use micromath::F32Ext;
use serde::ser::SerializeStruct;

use super::euler::Euler;

/// Orientation in degrees. Yaw is `None` when the estimator can't observe it.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Attitude {
    pub yaw: Option<f32>,
    pub pitch: f32,
    pub roll: f32,
}

fn round2(value: f32) -> f32 {
    let rounded = (value * 100.0).round() / 100.0;
    // no "-0.00" on the wire
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Into (-180, 180]
fn wrap_degrees(value: f32) -> f32 {
    let value = value % 360.0;
    if value > 180.0 {
        value - 360.0
    } else if value <= -180.0 {
        value + 360.0
    } else {
        value
    }
}

impl Attitude {
    pub fn corrected(self, offset: &Euler) -> Self {
        Self {
            yaw: self.yaw.map(|yaw| wrap_degrees(yaw - offset.yaw)),
            pitch: self.pitch - offset.pitch,
            roll: self.roll - offset.roll,
        }
    }

    /// JSON object with two decimal places, e.g. `{"pitch":1.25,"roll":-0.50}`.
    pub fn to_json(&self) -> heapless::String<96> {
        let mut string = heapless::String::new();
        let (pitch, roll) = (round2(self.pitch), round2(self.roll));
        let result = match self.yaw {
            Some(yaw) => write!(
                string,
                "{{\"yaw\":{:.2},\"pitch\":{:.2},\"roll\":{:.2}}}",
                round2(yaw),
                pitch,
                roll
            ),
            None => write!(string, "{{\"pitch\":{:.2},\"roll\":{:.2}}}", pitch, roll),
        };
        result.ok();
        string
    }
}

impl From<Attitude> for Euler {
    fn from(attitude: Attitude) -> Self {
        Euler::new(attitude.yaw.unwrap_or(0.0), attitude.pitch, attitude.roll)
    }
}

impl serde::Serialize for Attitude {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.yaw.is_some() { 3 } else { 2 };
        let mut struct_ = serializer.serialize_struct("Attitude", len)?;
        if let Some(yaw) = self.yaw {
            struct_.serialize_field("yaw", &round2(yaw))?;
        }
        struct_.serialize_field("pitch", &round2(self.pitch))?;
        struct_.serialize_field("roll", &round2(self.roll))?;
        struct_.end()
    }
}

mod test {
    #[test]
    fn test_to_json_without_yaw() {
        use super::Attitude;

        let attitude = Attitude { yaw: None, pitch: 1.234, roll: -0.5 };
        assert_eq!(attitude.to_json().as_str(), r#"{"pitch":1.23,"roll":-0.50}"#);
    }

    #[test]
    fn test_to_json_with_yaw() {
        use super::Attitude;

        let attitude = Attitude { yaw: Some(90.0), pitch: -0.001, roll: 45.678 };
        assert_eq!(attitude.to_json().as_str(), r#"{"yaw":90.00,"pitch":0.00,"roll":45.68}"#);
    }

    #[test]
    fn test_serialize() {
        use serde_json::json;

        use super::Attitude;

        let tilt = Attitude { yaw: None, pitch: 10.0, roll: -2.5 };
        assert_eq!(json!({"pitch": 10.0, "roll": -2.5}), serde_json::to_value(&tilt).unwrap());

        let fusion = Attitude { yaw: Some(180.0), pitch: 0.0, roll: 0.0 };
        let expected = json!({"yaw": 180.0, "pitch": 0.0, "roll": 0.0});
        assert_eq!(expected, serde_json::to_value(&fusion).unwrap());
    }

    #[test]
    fn test_corrected() {
        use super::{Attitude, Euler};

        let offset = Euler::new(5.0, 1.0, -1.0);
        let tilt = Attitude { yaw: None, pitch: 3.0, roll: 3.0 }.corrected(&offset);
        assert_eq!(tilt, Attitude { yaw: None, pitch: 2.0, roll: 4.0 });
        let fusion = Attitude { yaw: Some(10.0), pitch: 1.0, roll: -1.0 }.corrected(&offset);
        assert_eq!(fusion, Attitude { yaw: Some(5.0), pitch: 0.0, roll: 0.0 });
    }

    #[test]
    fn test_corrected_yaw_wraps() {
        use super::{Attitude, Euler};

        let yaw = |yaw: f32, offset: f32| {
            let attitude = Attitude { yaw: Some(yaw), pitch: 0.0, roll: 0.0 };
            attitude.corrected(&Euler::new(offset, 0.0, 0.0)).yaw
        };
        assert_eq!(yaw(170.0, -170.0), Some(-20.0));
        assert_eq!(yaw(-175.0, 10.0), Some(175.0));
        assert_eq!(yaw(180.0, 0.0), Some(180.0));
        assert_eq!(yaw(-90.0, 90.0), Some(180.0));
        assert_eq!(yaw(30.0, 10.0), Some(20.0));
    }
}
