use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::i2c::{Write, WriteRead};
pub use ::mpu6050::Mpu6050;
use ::mpu6050::Mpu6050Error;
use mpu6050_dmp::address::Address;
use nalgebra::{Quaternion, UnitQuaternion};
use tilt_copter::hal::sensor::{Accelerometer, MotionProcessor};
use tilt_copter::types::sensor::Axes;

/// LSB per g at the ±2g range `Mpu6050::init` selects
pub const ACCELEROMETER_SENSITIVE: f32 = 16384.0;
/// Quaternion followed by gyro and accelerometer words
pub const DMP_PACKET_SIZE: usize = 28;
const FIFO_SIZE: usize = 1024;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Error<E> {
    Bus(E),
    UnknownDevice(u8),
    MotionProcessor,
}

impl<E> From<Mpu6050Error<E>> for Error<E> {
    fn from(error: Mpu6050Error<E>) -> Self {
        match error {
            Mpu6050Error::I2c(e) => Self::Bus(e),
            Mpu6050Error::InvalidChipId(id) => Self::UnknownDevice(id),
        }
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "I2C transfer failed: {:?}", e),
            Self::UnknownDevice(id) => write!(f, "Unexpected device id 0x{:x}", id),
            Self::MotionProcessor => write!(f, "Motion processor transfer failed"),
        }
    }
}

pub fn convert_acceleration(x: f32, y: f32, z: f32) -> Axes {
    let lsb = |g: f32| (g * ACCELEROMETER_SENSITIVE) as i16;
    Axes::new(lsb(x), lsb(y), lsb(z))
}

/// Raw accelerometer readout through the `mpu6050` crate.
pub struct MPU6050<I2C, D> {
    mpu6050: Mpu6050<I2C>,
    delay: D,
}

impl<E, I2C, D> MPU6050<I2C, D>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
    D: DelayMs<u8>,
{
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self { mpu6050: Mpu6050::new(i2c), delay }
    }
}

impl<E, I2C, D> Accelerometer for MPU6050<I2C, D>
where
    E: core::fmt::Debug,
    I2C: Write<Error = E> + WriteRead<Error = E>,
    D: DelayMs<u8>,
{
    type Error = Error<E>;

    fn init(&mut self) -> Result<(), Error<E>> {
        self.mpu6050.init(&mut self.delay)?;
        debug!("MPU6050 accelerometer configured");
        Ok(())
    }

    fn read_acceleration(&mut self) -> nb::Result<Axes, Error<E>> {
        let acceleration = self.mpu6050.get_acc().map_err(Error::from)?;
        Ok(convert_acceleration(acceleration.x, acceleration.y, acceleration.z))
    }
}

/// Packet queue filled by the motion processor.
pub trait Fifo {
    type Error;

    fn count(&mut self) -> Result<usize, Self::Error>;
    fn read(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error>;
    fn reset(&mut self) -> Result<(), Self::Error>;
}

/// Drains every complete packet, `packet` ends up holding the newest.
pub fn read_latest<F: Fifo>(
    fifo: &mut F,
    packet: &mut [u8; DMP_PACKET_SIZE],
) -> nb::Result<(), F::Error> {
    let count = fifo.count()?;
    if count >= FIFO_SIZE {
        warn!("DMP FIFO overflow, resetting");
        fifo.reset()?;
        return Err(nb::Error::WouldBlock);
    }
    let packets = count / DMP_PACKET_SIZE;
    if packets == 0 {
        return Err(nb::Error::WouldBlock);
    }
    if packets > 1 {
        trace!("Skipped {} stale DMP packets", packets - 1);
    }
    for _ in 0..packets {
        fifo.read(&mut packet[..])?;
    }
    Ok(())
}

/// Q30 big-endian w, x, y, z
pub fn decode_quaternion(bytes: &[u8]) -> UnitQuaternion<f32> {
    let mut values = [0f32; 4];
    for (value, word) in values.iter_mut().zip(bytes.chunks_exact(4)) {
        let q30 = i32::from_be_bytes([word[0], word[1], word[2], word[3]]);
        *value = q30 as f32 / (1u32 << 30) as f32;
    }
    let [w, x, y, z] = values;
    UnitQuaternion::new_normalize(Quaternion::new(w, x, y, z))
}

struct Queue<'a, I2C>(&'a mut mpu6050_dmp::sensor::Mpu6050<I2C>);

impl<'a, E, I2C> Fifo for Queue<'a, I2C>
where
    E: core::fmt::Debug,
    I2C: Write<Error = E> + WriteRead<Error = E>,
{
    type Error = Error<E>;

    fn count(&mut self) -> Result<usize, Error<E>> {
        self.0.get_fifo_count().map_err(|_| Error::MotionProcessor)
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<(), Error<E>> {
        self.0.read_fifo(buffer).map(|_| ()).map_err(|_| Error::MotionProcessor)
    }

    fn reset(&mut self) -> Result<(), Error<E>> {
        self.0.reset_fifo().map_err(|_| Error::MotionProcessor)
    }
}

/// On-chip motion processor, firmware upload and FIFO setup are done by `mpu6050-dmp`.
pub struct DMP<I2C, D> {
    sensor: mpu6050_dmp::sensor::Mpu6050<I2C>,
    delay: D,
}

impl<E, I2C, D> DMP<I2C, D>
where
    E: core::fmt::Debug,
    I2C: Write<Error = E> + WriteRead<Error = E>,
    D: DelayMs<u32>,
{
    pub fn new(i2c: I2C, delay: D) -> Result<Self, Error<E>> {
        let sensor = mpu6050_dmp::sensor::Mpu6050::new(i2c, Address::default())
            .map_err(|_| Error::MotionProcessor)?;
        Ok(Self { sensor, delay })
    }
}

impl<E, I2C, D> MotionProcessor for DMP<I2C, D>
where
    E: core::fmt::Debug,
    I2C: Write<Error = E> + WriteRead<Error = E>,
    D: DelayMs<u32>,
{
    type Error = Error<E>;

    fn init(&mut self) -> Result<(), Error<E>> {
        self.sensor.initialize_dmp(&mut self.delay).map_err(|_| Error::MotionProcessor)?;
        debug!("MPU6050 motion processor running");
        Ok(())
    }

    fn read_quaternion(&mut self) -> nb::Result<UnitQuaternion<f32>, Error<E>> {
        let mut packet = [0u8; DMP_PACKET_SIZE];
        read_latest(&mut Queue(&mut self.sensor), &mut packet)?;
        Ok(decode_quaternion(&packet[..16]))
    }
}
