use core::fmt::Debug;

use nalgebra::UnitQuaternion;

use crate::types::sensor::{Axes, RawFrame};

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Error {
    Unavailable,
    Bus,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let err_string = match self {
            Self::Unavailable => "Sensor not initialized",
            Self::Bus => "Sensor bus transfer failed",
        };
        write!(f, "{}", err_string)
    }
}

/// `WouldBlock` means no new sample is ready yet.
pub trait Sensor {
    fn read_raw(&mut self) -> nb::Result<RawFrame, Error>;
}

pub trait Accelerometer {
    type Error: Debug;

    fn init(&mut self) -> Result<(), Self::Error>;
    fn read_acceleration(&mut self) -> nb::Result<Axes, Self::Error>;
}

/// On-sensor motion processing pipeline producing attitude quaternions.
pub trait MotionProcessor {
    type Error: Debug;

    fn init(&mut self) -> Result<(), Self::Error>;
    fn read_quaternion(&mut self) -> nb::Result<UnitQuaternion<f32>, Self::Error>;
}

pub struct Direct<A> {
    accelerometer: A,
    ready: bool,
}

impl<A: Accelerometer> Direct<A> {
    pub fn new(mut accelerometer: A) -> Self {
        let ready = match accelerometer.init() {
            Ok(()) => {
                info!("Accelerometer connected");
                true
            }
            Err(e) => {
                error!("Accelerometer connection failed: {:?}", e);
                false
            }
        };
        Self { accelerometer, ready }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }
}

impl<A: Accelerometer> Sensor for Direct<A> {
    fn read_raw(&mut self) -> nb::Result<RawFrame, Error> {
        if !self.ready {
            return Err(nb::Error::Other(Error::Unavailable));
        }
        match self.accelerometer.read_acceleration() {
            Ok(axes) => Ok(RawFrame::Acceleration(axes)),
            Err(nb::Error::WouldBlock) => Err(nb::Error::WouldBlock),
            Err(nb::Error::Other(e)) => {
                debug!("Read acceleration failed: {:?}", e);
                Err(nb::Error::Other(Error::Bus))
            }
        }
    }
}

pub struct Fusion<P> {
    processor: P,
    ready: bool,
}

impl<P: MotionProcessor> Fusion<P> {
    pub fn new(mut processor: P) -> Self {
        let ready = match processor.init() {
            Ok(()) => {
                info!("Motion processor ready");
                true
            }
            Err(e) => {
                error!("Motion processor initialization failed: {:?}", e);
                false
            }
        };
        Self { processor, ready }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }
}

impl<P: MotionProcessor> Sensor for Fusion<P> {
    /// Never yields a frame if initialization failed, the pipeline output can't be trusted.
    fn read_raw(&mut self) -> nb::Result<RawFrame, Error> {
        if !self.ready {
            return Err(nb::Error::WouldBlock);
        }
        match self.processor.read_quaternion() {
            Ok(quaternion) => Ok(RawFrame::fusion(quaternion)),
            Err(nb::Error::WouldBlock) => Err(nb::Error::WouldBlock),
            Err(nb::Error::Other(e)) => {
                debug!("Read motion packet failed: {:?}", e);
                Err(nb::Error::Other(Error::Bus))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use nalgebra::UnitQuaternion;

    use crate::types::sensor::Axes;

    struct FakeAccelerometer {
        connected: bool,
        samples: usize,
    }

    impl super::Accelerometer for FakeAccelerometer {
        type Error = ();

        fn init(&mut self) -> Result<(), ()> {
            if self.connected {
                Ok(())
            } else {
                Err(())
            }
        }

        fn read_acceleration(&mut self) -> nb::Result<Axes, ()> {
            self.samples += 1;
            Ok(Axes::new(0, 0, 16384))
        }
    }

    struct FakeProcessor {
        init_ok: bool,
        pending: usize,
    }

    impl super::MotionProcessor for FakeProcessor {
        type Error = ();

        fn init(&mut self) -> Result<(), ()> {
            if self.init_ok {
                Ok(())
            } else {
                Err(())
            }
        }

        fn read_quaternion(&mut self) -> nb::Result<UnitQuaternion<f32>, ()> {
            if self.pending > 0 {
                self.pending -= 1;
                return Err(nb::Error::WouldBlock);
            }
            Ok(UnitQuaternion::identity())
        }
    }

    #[test]
    fn test_direct_reads_acceleration() {
        use super::{Direct, Sensor};
        use crate::types::sensor::RawFrame;

        let mut sensor = Direct::new(FakeAccelerometer { connected: true, samples: 0 });
        assert!(sensor.is_ready());
        assert_eq!(sensor.read_raw(), Ok(RawFrame::Acceleration(Axes::new(0, 0, 16384))));
    }

    #[test]
    fn test_direct_unavailable_without_connection() {
        use super::{Direct, Error, Sensor};

        let mut sensor = Direct::new(FakeAccelerometer { connected: false, samples: 0 });
        assert_eq!(sensor.read_raw(), Err(nb::Error::Other(Error::Unavailable)));
        assert_eq!(sensor.accelerometer.samples, 0);
    }

    #[test]
    fn test_fusion_waits_for_packet() {
        use super::{Fusion, Sensor};
        use crate::types::sensor::RawFrame;

        let mut sensor = Fusion::new(FakeProcessor { init_ok: true, pending: 2 });
        assert_eq!(sensor.read_raw(), Err(nb::Error::WouldBlock));
        assert_eq!(sensor.read_raw(), Err(nb::Error::WouldBlock));
        let expected = RawFrame::fusion(UnitQuaternion::identity());
        assert_eq!(sensor.read_raw(), Ok(expected));
    }

    #[test]
    fn test_fusion_never_ready_after_failed_init() {
        use super::{Fusion, Sensor};

        let mut sensor = Fusion::new(FakeProcessor { init_ok: false, pending: 0 });
        assert!(!sensor.is_ready());
        for _ in 0..10 {
            assert_eq!(sensor.read_raw(), Err(nb::Error::WouldBlock));
        }
    }
}
