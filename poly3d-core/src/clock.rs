/// Millisecond time sources for driving updates
use std::cell::Cell;
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns non-decreasing timestamps in milliseconds
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Wall clock, milliseconds since the Unix epoch
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn advance(&self, delta_ms: f64) {
        self.now.set(self.now.get() + delta_ms.max(0.0));
    }

    pub fn set(&self, now_ms: f64) {
        self.now.set(now_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}
