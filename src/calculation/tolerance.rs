//! Tolerance window resolution.
//!
//! This module resolves the effective early/late grace periods for a work
//! location. Each field is taken from the location's discrete minute column
//! when present, then from its JSON tolerance settings, and finally from a
//! hard default.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{TimeWindow, WorkLocation};

/// Default minutes before shift start a check-in is accepted.
pub const DEFAULT_CHECKIN_BEFORE_MINUTES: i64 = 30;

/// Default minutes after shift start a check-in is still accepted.
pub const DEFAULT_LATE_TOLERANCE_MINUTES: i64 = 15;

/// Default minutes after shift end a check-out is still considered on time.
pub const DEFAULT_CHECKOUT_AFTER_MINUTES: i64 = 60;

/// Default minutes before shift end a check-out is already accepted.
pub const DEFAULT_EARLY_DEPARTURE_TOLERANCE_MINUTES: i64 = 0;

/// Upper bound for any tolerance; larger configured values are clamped.
pub const MAX_TOLERANCE_MINUTES: i64 = 24 * 60;

const CHECKIN_BEFORE_KEY: &str = "checkin_before_shift_minutes";
const LATE_TOLERANCE_KEY: &str = "late_tolerance_minutes";
const CHECKOUT_AFTER_KEY: &str = "checkout_after_shift_minutes";
const EARLY_DEPARTURE_KEY: &str = "early_departure_tolerance_minutes";

/// The effective tolerance windows for a work location, in minutes.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::ToleranceWindows;
///
/// let defaults = ToleranceWindows::default();
/// assert_eq!(defaults.checkin_before_minutes, 30);
/// assert_eq!(defaults.late_tolerance_minutes, 15);
/// assert_eq!(defaults.checkout_after_minutes, 60);
/// assert_eq!(defaults.early_departure_tolerance_minutes, 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToleranceWindows {
    /// Minutes before shift start a check-in is accepted.
    pub checkin_before_minutes: i64,
    /// Minutes after shift start a check-in is still accepted.
    pub late_tolerance_minutes: i64,
    /// Minutes after shift end a check-out is still considered on time.
    pub checkout_after_minutes: i64,
    /// Minutes before shift end a check-out is already accepted.
    pub early_departure_tolerance_minutes: i64,
}

impl Default for ToleranceWindows {
    fn default() -> Self {
        Self {
            checkin_before_minutes: DEFAULT_CHECKIN_BEFORE_MINUTES,
            late_tolerance_minutes: DEFAULT_LATE_TOLERANCE_MINUTES,
            checkout_after_minutes: DEFAULT_CHECKOUT_AFTER_MINUTES,
            early_departure_tolerance_minutes: DEFAULT_EARLY_DEPARTURE_TOLERANCE_MINUTES,
        }
    }
}

impl ToleranceWindows {
    /// Returns the interval in which a check-in for `shift` is accepted:
    /// `[start - checkin_before, start + late_tolerance]`.
    pub fn check_in_window(&self, shift: &TimeWindow) -> TimeWindow {
        TimeWindow {
            start: shift.start - span(self.checkin_before_minutes),
            end: shift.start + span(self.late_tolerance_minutes),
        }
    }

    /// Returns the first instant a check-out for `shift` is accepted.
    pub fn earliest_check_out(&self, shift: &TimeWindow) -> NaiveDateTime {
        shift.end - span(self.early_departure_tolerance_minutes)
    }

    /// Returns the last instant a check-out for `shift` is considered on time.
    pub fn latest_check_out(&self, shift: &TimeWindow) -> NaiveDateTime {
        shift.end + span(self.checkout_after_minutes)
    }
}

fn span(minutes: i64) -> Duration {
    Duration::minutes(minutes.clamp(-MAX_TOLERANCE_MINUTES, MAX_TOLERANCE_MINUTES))
}

/// Resolves the tolerance windows for a work location.
///
/// Resolution order per field: discrete column, then JSON settings key, then
/// the hard default. No location yields all defaults. This function never
/// fails; absent, malformed or negative values fall through to the next
/// source, and values above [`MAX_TOLERANCE_MINUTES`] are clamped to it.
///
/// # Examples
///
/// ```
/// use attendance_engine::calculation::resolve_tolerance;
/// use attendance_engine::models::WorkLocation;
///
/// let location = WorkLocation {
///     id: "loc_001".to_string(),
///     name: "Klinik Utama".to_string(),
///     latitude: -6.2,
///     longitude: 106.8,
///     radius_meters: 100.0,
///     checkin_before_shift_minutes: Some(45),
///     late_tolerance_minutes: None,
///     checkout_after_shift_minutes: None,
///     early_departure_tolerance_minutes: None,
///     tolerance_settings: Some(serde_json::json!({"late_tolerance_minutes": 10})),
///     is_active: true,
/// };
///
/// let windows = resolve_tolerance(Some(&location));
/// assert_eq!(windows.checkin_before_minutes, 45); // column
/// assert_eq!(windows.late_tolerance_minutes, 10); // JSON
/// assert_eq!(windows.checkout_after_minutes, 60); // default
/// ```
pub fn resolve_tolerance(location: Option<&WorkLocation>) -> ToleranceWindows {
    let Some(location) = location else {
        return ToleranceWindows::default();
    };

    let settings = settings_object(location.tolerance_settings.as_ref());
    let pick = |column: Option<i64>, key: &str, default: i64| {
        column
            .filter(|minutes| *minutes >= 0)
            .or_else(|| settings.as_ref().and_then(|s| json_minutes(s, key)))
            .unwrap_or(default)
            .min(MAX_TOLERANCE_MINUTES)
    };

    ToleranceWindows {
        checkin_before_minutes: pick(
            location.checkin_before_shift_minutes,
            CHECKIN_BEFORE_KEY,
            DEFAULT_CHECKIN_BEFORE_MINUTES,
        ),
        late_tolerance_minutes: pick(
            location.late_tolerance_minutes,
            LATE_TOLERANCE_KEY,
            DEFAULT_LATE_TOLERANCE_MINUTES,
        ),
        checkout_after_minutes: pick(
            location.checkout_after_shift_minutes,
            CHECKOUT_AFTER_KEY,
            DEFAULT_CHECKOUT_AFTER_MINUTES,
        ),
        early_departure_tolerance_minutes: pick(
            location.early_departure_tolerance_minutes,
            EARLY_DEPARTURE_KEY,
            DEFAULT_EARLY_DEPARTURE_TOLERANCE_MINUTES,
        ),
    }
}

/// Extracts the settings object, accepting a JSON string that holds one.
fn settings_object(value: Option<&Value>) -> Option<Map<String, Value>> {
    match value? {
        Value::Object(map) => Some(map.clone()),
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        },
        _ => None,
    }
}

/// Reads a non-negative minute count from a number or numeric string.
fn json_minutes(settings: &Map<String, Value>, key: &str) -> Option<i64> {
    let minutes = match settings.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }?;
    (minutes >= 0).then_some(minutes)
}
