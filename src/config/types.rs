//! Configuration types for the attendance engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files. Every field has a
//! default, so a partial file only overrides what it names.

use chrono::{FixedOffset, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::calculation::{
    DEFAULT_SHORT_SHIFT_BUFFER_MINUTES, DEFAULT_SHORT_SHIFT_THRESHOLD_MINUTES,
    DEFAULT_STANDARD_BUFFER_MINUTES, ResolutionPolicy,
};

/// Default civil timezone offset: Asia/Jakarta, UTC+07:00.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 7 * 60;

/// Default cap on closed shifts per employee per day.
pub const DEFAULT_MAX_SHIFTS_PER_DAY: u32 = 3;

/// Default minimum gap between a check-out and the next check-in.
pub const DEFAULT_MIN_SHIFT_GAP_MINUTES: i64 = 60;

/// Default age after which an open session counts as abandoned.
pub const DEFAULT_STALE_SESSION_HOURS: i64 = 24;

/// Default length credited to an auto-closed session.
pub const DEFAULT_AUTO_CLOSE_HOURS: i64 = 8;

/// Default time-to-live for cached roster and location lookups.
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 60;

/// Default maximum number of cached lookups.
pub const DEFAULT_CACHE_MAX_CAPACITY: u64 = 10_000;

/// Identifies the deployment profile a configuration belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileMetadata {
    /// Short profile code (e.g. "jakarta").
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// IANA name of the civil timezone the offset represents.
    pub timezone: String,
}

impl Default for ProfileMetadata {
    fn default() -> Self {
        Self {
            code: "default".to_string(),
            name: "Default profile".to_string(),
            timezone: "Asia/Jakarta".to_string(),
        }
    }
}

/// A standard break at fixed times of day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakSlot {
    /// Time of day the break starts.
    pub start: NaiveTime,
    /// Time of day the break ends.
    pub end: NaiveTime,
    /// Optional label.
    #[serde(default)]
    pub label: Option<String>,
}

/// Standard break configuration (`breaks.yaml`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakConfig {
    /// Break slots keyed by shift name.
    pub standard: BTreeMap<String, Vec<BreakSlot>>,
    /// Length of the midpoint break for shifts without slots; zero disables it.
    pub midpoint_break_minutes: i64,
    /// Minimum shift length for the midpoint break to apply.
    pub midpoint_min_shift_minutes: i64,
}

/// Engine configuration (`engine.yaml`, with `breaks.yaml` merged in).
///
/// # Example
///
/// ```
/// use attendance_engine::config::EngineConfig;
///
/// let config: EngineConfig = serde_yaml::from_str("max_shifts_per_day: 2").unwrap();
/// assert_eq!(config.max_shifts_per_day, 2);
/// assert_eq!(config.min_shift_gap_minutes, 60); // default
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Profile metadata.
    pub profile: ProfileMetadata,
    /// Offset of the civil timezone from UTC, in minutes.
    pub utc_offset_minutes: i32,
    /// Cap on closed shifts per employee per day.
    pub max_shifts_per_day: u32,
    /// Minimum gap between a check-out and the next check-in.
    pub min_shift_gap_minutes: i64,
    /// Age after which an open session counts as abandoned.
    pub stale_session_hours: i64,
    /// Length credited to an auto-closed session.
    pub auto_close_hours: i64,
    /// Shifts at or under this duration use the short-shift buffer.
    pub short_shift_threshold_minutes: i64,
    /// Resolution buffer for short shifts.
    pub short_shift_buffer_minutes: i64,
    /// Resolution buffer for other shifts.
    pub standard_buffer_minutes: i64,
    /// Time-to-live for cached lookups.
    pub cache_ttl_seconds: u64,
    /// Maximum number of cached lookups.
    pub cache_max_capacity: u64,
    /// Standard break configuration.
    pub breaks: BreakConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            profile: ProfileMetadata::default(),
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            max_shifts_per_day: DEFAULT_MAX_SHIFTS_PER_DAY,
            min_shift_gap_minutes: DEFAULT_MIN_SHIFT_GAP_MINUTES,
            stale_session_hours: DEFAULT_STALE_SESSION_HOURS,
            auto_close_hours: DEFAULT_AUTO_CLOSE_HOURS,
            short_shift_threshold_minutes: DEFAULT_SHORT_SHIFT_THRESHOLD_MINUTES,
            short_shift_buffer_minutes: DEFAULT_SHORT_SHIFT_BUFFER_MINUTES,
            standard_buffer_minutes: DEFAULT_STANDARD_BUFFER_MINUTES,
            cache_ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
            cache_max_capacity: DEFAULT_CACHE_MAX_CAPACITY,
            breaks: BreakConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Returns the civil timezone offset, or `None` if it is out of range.
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
    }

    /// Returns the shift resolution buffers.
    pub fn resolution_policy(&self) -> ResolutionPolicy {
        ResolutionPolicy {
            short_shift_threshold_minutes: self.short_shift_threshold_minutes,
            short_shift_buffer_minutes: self.short_shift_buffer_minutes,
            standard_buffer_minutes: self.standard_buffer_minutes,
        }
    }
}
