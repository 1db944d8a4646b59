//! Clock implementations.

use chrono::{Duration, FixedOffset, NaiveDateTime, Utc};
use parking_lot::Mutex;

use crate::config::EngineConfig;
use crate::error::{AttendanceError, EngineResult};

use super::ports::Clock;

/// Wall clock in a fixed civil timezone.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    /// Creates a clock for the given UTC offset.
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Creates a clock for the configured UTC offset.
    pub fn from_config(config: &EngineConfig) -> EngineResult<Self> {
        config
            .utc_offset()
            .map(Self::new)
            .ok_or_else(|| AttendanceError::ConfigParseError {
                path: "utc_offset_minutes".to_string(),
                message: format!("offset out of range: {}", config.utc_offset_minutes),
            })
    }

    /// Returns the offset this clock reports in.
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.offset).naive_local()
    }
}

/// Manually controlled clock.
///
/// # Example
///
/// ```
/// use attendance_engine::attendance::{Clock, FixedClock};
/// use chrono::{Duration, NaiveDate};
///
/// let start = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap().and_hms_opt(7, 35, 0).unwrap();
/// let clock = FixedClock::new(start);
/// clock.advance(Duration::minutes(25));
/// assert_eq!(clock.now(), start + Duration::minutes(25));
/// ```
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    /// Creates a clock frozen at `now`.
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock() = now;
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock()
    }
}
