//! Core trait definitions for bank loading and time.
//!
//! `BankLoader` is implemented by the `analogy-bank` crate; `Clock` is how the
//! session reads time, so response latencies can be driven by tests.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::BankError;
use crate::model::Bank;

// ---------------------------------------------------------------------------
// Bank loader trait
// ---------------------------------------------------------------------------

/// Something that can produce the item bank once, at startup.
#[async_trait]
pub trait BankLoader: Send + Sync {
    /// Human-readable source (a path or URL).
    fn describe(&self) -> String;

    /// Load and parse the bank. Implementations never retry.
    async fn load(&self) -> Result<Bank, BankError>;
}

// ---------------------------------------------------------------------------
// Clock trait
// ---------------------------------------------------------------------------

/// Source of monotonic and wall-clock time.
pub trait Clock: Send + Sync {
    /// Monotonic reading, used for response latencies.
    fn monotonic(&self) -> Duration;

    /// Wall-clock time, used for timestamps.
    fn now_utc(&self) -> DateTime<Utc>;
}

/// The real clock.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn monotonic(&self) -> Duration {
        self.origin.elapsed()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    state: Mutex<(Duration, DateTime<Utc>)>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            state: Mutex::new((Duration::ZERO, start)),
        }
    }

    /// Move both readings forward.
    pub fn advance(&self, by: Duration) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.0 += by;
        state.1 += chrono::Duration::from_std(by).unwrap_or(chrono::Duration::zero());
    }
}

impl Clock for ManualClock {
    fn monotonic(&self) -> Duration {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).0
    }

    fn now_utc(&self) -> DateTime<Utc> {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn manual_clock_advances_both_readings() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.monotonic(), Duration::ZERO);

        clock.advance(Duration::from_millis(1500));
        assert_eq!(clock.monotonic(), Duration::from_millis(1500));
        assert_eq!(clock.now_utc(), start + chrono::Duration::milliseconds(1500));
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.monotonic();
        let b = clock.monotonic();
        assert!(b >= a);
    }
}
