use std::thread;
use std::time::Duration;

/// Logical access time. Larger means more recent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    pub fn ticks(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Issues strictly increasing timestamps for one run
#[derive(Debug, Default)]
pub struct Clock {
    now: u64,
}

impl Clock {
    pub fn new() -> Self {
        Clock { now: 0 }
    }

    #[inline]
    pub fn tick(&mut self) -> Timestamp {
        self.now += 1;
        Timestamp(self.now)
    }

    pub fn now(&self) -> Timestamp {
        Timestamp(self.now)
    }

    pub fn reset(&mut self) {
        self.now = 0;
    }
}

/// Block for a simulated delay. Zero returns immediately.
pub fn simulate_delay(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}
