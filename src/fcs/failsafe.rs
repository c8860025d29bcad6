use fugit::NanosDurationU64 as Duration;

use crate::config;

/// Zeroes the motors once when duty commands stop arriving.
pub struct Failsafe {
    timeout: Option<Duration>,
    /// None until the first duty command, an idle boot never trips
    last_command: Option<Duration>,
    tripped: bool,
}

impl Failsafe {
    pub fn new(config: &config::Failsafe) -> Self {
        Self { timeout: config.timeout(), last_command: None, tripped: false }
    }

    pub fn feed(&mut self, now: Duration) {
        self.last_command = Some(now);
        if self.tripped {
            info!("Duty command received, failsafe released");
            self.tripped = false;
        }
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped
    }

    /// True on the tick the timeout expires, not after.
    pub fn check(&mut self, now: Duration) -> bool {
        let (timeout, last_command) = match (self.timeout, self.last_command) {
            (Some(timeout), Some(last_command)) => (timeout, last_command),
            _ => return false,
        };
        if self.tripped || now < last_command + timeout {
            return false;
        }
        warn!("No duty command within {}ms, stopping motors", timeout.to_millis());
        self.tripped = true;
        true
    }
}

mod test {
    #[test]
    fn test_disabled() {
        use fugit::NanosDurationU64 as Duration;

        use super::Failsafe;
        use crate::config;

        let mut failsafe = Failsafe::new(&config::Failsafe { timeout_ms: 0 });
        assert!(!failsafe.check(Duration::secs(3600)));
    }

    #[test]
    fn test_idle_boot_never_trips() {
        use fugit::NanosDurationU64 as Duration;

        use super::Failsafe;
        use crate::config;

        let mut failsafe = Failsafe::new(&config::Failsafe { timeout_ms: 500 });
        assert!(!failsafe.check(Duration::millis(500)));
        assert!(!failsafe.check(Duration::secs(3600)));
        assert!(!failsafe.is_tripped());

        failsafe.feed(Duration::secs(3600));
        assert!(failsafe.check(Duration::millis(3600_500)));
    }

    #[test]
    fn test_trips_once() {
        use fugit::NanosDurationU64 as Duration;

        use super::Failsafe;
        use crate::config;

        let mut failsafe = Failsafe::new(&config::Failsafe { timeout_ms: 500 });
        failsafe.feed(Duration::millis(100));
        assert!(!failsafe.check(Duration::millis(599)));
        assert!(failsafe.check(Duration::millis(600)));
        assert!(!failsafe.check(Duration::millis(700)));
        assert!(failsafe.is_tripped());

        failsafe.feed(Duration::millis(800));
        assert!(!failsafe.is_tripped());
        assert!(failsafe.check(Duration::millis(1300)));
    }
}
