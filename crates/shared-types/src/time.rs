//! # Time Sources
//!
//! Block timestamps and key lifecycle instants come from an injected
//! `TimeSource` so tests can drive time deterministically.

use crate::entities::Timestamp;
use std::sync::atomic::{AtomicU64, Ordering};

/// Abstract interface for time operations (for testability).
pub trait TimeSource: Send + Sync {
    /// Current time in milliseconds since the Unix epoch.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time source.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Manually driven clock.
///
/// Every call to `now()` returns the current value and then advances it by
/// `step` milliseconds, so consecutive operations observe distinct instants.
#[derive(Debug)]
pub struct ManualTimeSource {
    current: AtomicU64,
    step: u64,
}

impl ManualTimeSource {
    /// Clock starting at `start`, advancing 1ms per reading.
    pub fn new(start: Timestamp) -> Self {
        Self::with_step(start, 1)
    }

    /// Clock starting at `start`, advancing `step` ms per reading.
    pub fn with_step(start: Timestamp, step: u64) -> Self {
        Self {
            current: AtomicU64::new(start),
            step,
        }
    }

    /// Jump the clock forward.
    pub fn advance(&self, millis: u64) {
        self.current.fetch_add(millis, Ordering::SeqCst);
    }

    /// Set the clock to an absolute instant.
    pub fn set(&self, value: Timestamp) {
        self.current.store(value, Ordering::SeqCst);
    }

    /// Current value without advancing.
    pub fn peek(&self) -> Timestamp {
        self.current.load(Ordering::SeqCst)
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Timestamp {
        self.current.fetch_add(self.step, Ordering::SeqCst)
    }
}

impl<T: TimeSource + ?Sized> TimeSource for std::sync::Arc<T> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}
