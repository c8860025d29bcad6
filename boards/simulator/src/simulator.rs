use std::time::Instant;

use async_std::channel::{Receiver, Sender, TryRecvError};
use embedded_hal::blocking::delay::DelayMs;
use fugit::NanosDurationU64 as Duration;
use tilt_copter::config::Config;
use tilt_copter::fcs::FCS;
use tilt_copter::protocol::{Reply, Request};

use crate::bench::{Bench, Variant};
use crate::pwm::SimulatedPwm;

pub struct Message {
    pub request: Request,
    pub reply: Sender<Reply>,
}

pub struct StdDelay;

impl DelayMs<u16> for StdDelay {
    fn delay_ms(&mut self, ms: u16) {
        std::thread::sleep(std::time::Duration::from_millis(ms as u64));
    }
}

/// Owns the control state, every request is served from the loop thread.
pub struct Simulator {
    fcs: FCS<Variant, SimulatedPwm>,
    receiver: Receiver<Message>,
    calibration_waiters: Vec<Sender<Reply>>,
    tick: Duration,
}

impl Simulator {
    pub fn new(config: &Config, bench: Bench, receiver: Receiver<Message>) -> Self {
        let sensor = Variant::new(config.imu.mode, bench);
        let fcs = FCS::new(sensor, SimulatedPwm::channels(&config.pwm), config);
        Self { fcs, receiver, calibration_waiters: Vec::new(), tick: config.tick() }
    }

    pub fn calibrate(&mut self) {
        match self.fcs.calibrate(&mut StdDelay) {
            Ok(offset) => debug!("Boot calibration offset {:?}", offset),
            Err(e) => warn!("Boot calibration failed: {}", e),
        }
    }

    fn reply(sender: &Sender<Reply>, reply: Reply) {
        if sender.try_send(reply).is_err() {
            debug!("Requester gone, reply {:?} dropped", reply);
        }
    }

    /// Returns false once every requester hung up.
    pub fn step(&mut self, now: Duration) -> bool {
        loop {
            let message = match self.receiver.try_recv() {
                Ok(message) => message,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Closed) => return false,
            };
            match self.fcs.handle(now, message.request) {
                Reply::Deferred => self.calibration_waiters.push(message.reply),
                reply => Self::reply(&message.reply, reply),
            }
        }
        if let Some(outcome) = self.fcs.tick(now) {
            for waiter in self.calibration_waiters.drain(..) {
                Self::reply(&waiter, Reply::from(outcome));
            }
        }
        true
    }

    pub fn run(mut self) {
        let start = Instant::now();
        let tick = std::time::Duration::from_nanos(self.tick.ticks());
        info!("Control loop running every {}ms", self.tick.to_millis());
        loop {
            let now = Duration::from_ticks(start.elapsed().as_nanos() as u64);
            if !self.step(now) {
                info!("Command channel closed, control loop exits");
                return;
            }
            std::thread::sleep(tick);
        }
    }
}
