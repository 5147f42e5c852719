//! Watchdog interface trait
//!
//! Long-running store operations (log replay, compaction, the debug dump)
//! must periodically feed the hardware supervisor so it does not reset the
//! part mid-operation.

/// Watchdog interface
pub trait WatchdogInterface {
    /// Reload the watchdog counter.
    fn update(&mut self);
}

/// No-op watchdog for hosts without a hardware supervisor.
pub struct IdleWatchdog;

impl WatchdogInterface for IdleWatchdog {
    fn update(&mut self) {}
}
