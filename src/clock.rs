// Time source for task timestamps

use chrono::{DateTime, Duration, Utc};
use std::cell::Cell;

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
///
/// With a non-zero `step`, every call to `now()` advances it by that amount
/// after returning the current value.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Cell<DateTime<Utc>>,
    step: Duration,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Cell::new(start),
            step: Duration::zero(),
        }
    }

    pub fn with_step(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            current: Cell::new(start),
            step,
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.current.set(at);
    }

    pub fn advance(&self, by: Duration) {
        self.current.set(self.current.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let now = self.current.get();
        self.current.set(now + self.step);
        now
    }
}
