//! Mock watchdog implementation for testing

use crate::platform::traits::WatchdogInterface;

/// Kick-counting watchdog
///
/// Lets tests assert that long-running store loops actually feed the
/// supervisor.
#[derive(Debug, Default)]
pub struct MockWatchdog {
    kicks: u32,
}

impl MockWatchdog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times the store reloaded the counter.
    pub fn kicks(&self) -> u32 {
        self.kicks
    }
}

impl WatchdogInterface for MockWatchdog {
    fn update(&mut self) {
        self.kicks += 1;
    }
}
