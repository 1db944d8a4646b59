//! Shift models and related types.
//!
//! This module defines the [`ShiftTemplate`] reference data, the
//! [`ScheduledShift`] roster entry that assigns a template to an employee on
//! a date, and the [`TimeWindow`] interval used for all boundary arithmetic.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A closed interval of civil (local) time.
///
/// Windows built with [`TimeWindow::new`] are normalized: an end earlier
/// than the start is moved to the following day, which is how overnight
/// shifts such as 22:00–06:00 are represented.
///
/// # Example
///
/// ```
/// use attendance_engine::models::TimeWindow;
/// use chrono::{NaiveDate, NaiveTime};
///
/// let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
/// let window = TimeWindow::on_date(
///     date,
///     NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
///     NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
/// );
/// assert_eq!(window.end.date(), date.succ_opt().unwrap());
/// assert_eq!(window.duration_minutes(), 480);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: NaiveDateTime,
    /// End of the window (inclusive).
    pub end: NaiveDateTime,
}

impl TimeWindow {
    /// Creates a window, moving `end` to the next day when it precedes `start`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        let end = if end < start {
            end + Duration::days(1)
        } else {
            end
        };
        Self { start, end }
    }

    /// Creates a window anchored on `date` from two times of day.
    pub fn on_date(date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self::new(date.and_time(start_time), date.and_time(end_time))
    }

    /// Returns the length of the window in whole minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Returns true if `instant` lies within the window, bounds included.
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// Returns a copy widened by `before` at the start and `after` at the end.
    pub fn expand(&self, before: Duration, after: Duration) -> Self {
        Self {
            start: self.start - before,
            end: self.end + after,
        }
    }

    /// Returns the overlap with `other` in whole minutes (zero when disjoint).
    pub fn overlap_minutes(&self, other: &TimeWindow) -> i64 {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if end <= start {
            0
        } else {
            (end - start).num_minutes()
        }
    }
}

/// A reusable definition of a named shift.
///
/// An `end_time` earlier than `start_time` denotes an overnight shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftTemplate {
    /// Unique identifier for the template.
    pub id: String,
    /// Display name, also the key for standard break lookup (e.g. "Pagi").
    pub name: String,
    /// Time of day the shift starts.
    pub start_time: NaiveTime,
    /// Time of day the shift ends.
    pub end_time: NaiveTime,
    /// Nominal duration in hours.
    pub duration_hours: Decimal,
}

impl ShiftTemplate {
    /// Returns true if the shift crosses midnight.
    pub fn is_overnight(&self) -> bool {
        self.end_time < self.start_time
    }

    /// Returns the concrete window of this template on `date`.
    ///
    /// # Examples
    ///
    /// ```
    /// use attendance_engine::models::ShiftTemplate;
    /// use chrono::{NaiveDate, NaiveTime};
    /// use rust_decimal::Decimal;
    ///
    /// let night = ShiftTemplate {
    ///     id: "tpl_malam".to_string(),
    ///     name: "Malam".to_string(),
    ///     start_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
    ///     end_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
    ///     duration_hours: Decimal::new(8, 0),
    /// };
    /// let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
    /// let window = night.window_on(date);
    /// assert!(night.is_overnight());
    /// assert_eq!(window.end.date(), NaiveDate::from_ymd_opt(2026, 1, 16).unwrap());
    /// ```
    pub fn window_on(&self, date: NaiveDate) -> TimeWindow {
        TimeWindow::on_date(date, self.start_time, self.end_time)
    }
}

/// Lifecycle status of a roster entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    /// The assignment is in force.
    #[default]
    Active,
    /// The assignment was withdrawn by scheduling staff.
    Cancelled,
}

/// A roster entry assigning an employee to a shift template on a date.
///
/// Roster entries are read-only to the attendance engine. An entry without
/// a template cannot be checked into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledShift {
    /// Unique identifier for the roster entry.
    pub id: String,
    /// The employee assigned to the shift.
    pub employee_id: String,
    /// The roster date; the shift's start is anchored on this day.
    pub date: NaiveDate,
    /// The joined shift template, if any.
    #[serde(default)]
    pub template: Option<ShiftTemplate>,
    /// Role performed during the shift (e.g. "dokter jaga").
    #[serde(default)]
    pub role: Option<String>,
    /// Unit or ward the shift belongs to.
    #[serde(default)]
    pub unit: Option<String>,
    /// Lifecycle status.
    #[serde(default)]
    pub status: ScheduleStatus,
}

impl ScheduledShift {
    /// Returns true if the roster entry is in force.
    pub fn is_active(&self) -> bool {
        self.status == ScheduleStatus::Active
    }

    /// Returns the concrete shift window, or `None` when no template is joined.
    pub fn window(&self) -> Option<TimeWindow> {
        self.template.as_ref().map(|t| t.window_on(self.date))
    }

    /// Returns true if the joined template crosses midnight.
    pub fn is_overnight(&self) -> bool {
        self.template.as_ref().is_some_and(ShiftTemplate::is_overnight)
    }
}

/// Fallback shift name shown when a roster entry has no template.
pub const FALLBACK_SHIFT_NAME: &str = "Shift";

/// Presentation view of a roster entry's shift.
///
/// This is the only place the 08:00–16:00 / 8 hour fallback is applied;
/// duration math never sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftDisplay {
    /// Shift name.
    pub name: String,
    /// Start time of day.
    pub start_time: NaiveTime,
    /// End time of day.
    pub end_time: NaiveTime,
    /// Nominal duration in hours.
    pub duration_hours: Decimal,
    /// True when the values come from the fallback rather than a template.
    pub is_fallback: bool,
}

impl ShiftDisplay {
    /// Builds the display view for an optional template.
    pub fn from_template(template: Option<&ShiftTemplate>) -> Self {
        match template {
            Some(t) => Self {
                name: t.name.clone(),
                start_time: t.start_time,
                end_time: t.end_time,
                duration_hours: t.duration_hours,
                is_fallback: false,
            },
            None => Self {
                name: FALLBACK_SHIFT_NAME.to_string(),
                start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
                end_time: NaiveTime::from_hms_opt(16, 0, 0).unwrap_or_default(),
                duration_hours: Decimal::new(8, 0),
                is_fallback: true,
            },
        }
    }

    /// Formats the time range as `HH:MM - HH:MM`.
    pub fn time_range(&self) -> String {
        format!(
            "{} - {}",
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn make_datetime(date_str: &str, time_str: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date_str, time_str), "%Y-%m-%d %H:%M:%S")
            .unwrap()
    }

    fn make_time(time_str: &str) -> NaiveTime {
        NaiveTime::parse_from_str(time_str, "%H:%M:%S").unwrap()
    }

    fn template(start: &str, end: &str) -> ShiftTemplate {
        ShiftTemplate {
            id: "tpl_001".to_string(),
            name: "Pagi".to_string(),
            start_time: make_time(start),
            end_time: make_time(end),
            duration_hours: Decimal::new(8, 0),
        }
    }

    /// TW-001: day shift stays on its date
    #[test]
    fn test_day_shift_window() {
        let window = template("08:00:00", "16:00:00").window_on(make_date("2026-01-15"));

        assert_eq!(window.start, make_datetime("2026-01-15", "08:00:00"));
        assert_eq!(window.end, make_datetime("2026-01-15", "16:00:00"));
        assert_eq!(window.duration_minutes(), 480);
    }

    /// TW-002: overnight shift end moves to the next day
    #[test]
    fn test_overnight_shift_window() {
        let tpl = template("22:00:00", "06:00:00");
        let window = tpl.window_on(make_date("2026-01-15"));

        assert!(tpl.is_overnight());
        assert_eq!(window.end, make_datetime("2026-01-16", "06:00:00"));
        assert!(window.contains(make_datetime("2026-01-16", "02:00:00")));
    }

    /// TW-003: containment is inclusive on both bounds
    #[test]
    fn test_contains_is_inclusive() {
        let window = TimeWindow::new(
            make_datetime("2026-01-15", "08:00:00"),
            make_datetime("2026-01-15", "16:00:00"),
        );

        assert!(window.contains(window.start));
        assert!(window.contains(window.end));
        assert!(!window.contains(make_datetime("2026-01-15", "16:00:01")));
    }

    #[test]
    fn test_expand_widens_both_ends() {
        let window = TimeWindow::new(
            make_datetime("2026-01-15", "08:00:00"),
            make_datetime("2026-01-15", "16:00:00"),
        );
        let buffered = window.expand(Duration::minutes(30), Duration::minutes(15));

        assert_eq!(buffered.start, make_datetime("2026-01-15", "07:30:00"));
        assert_eq!(buffered.end, make_datetime("2026-01-15", "16:15:00"));
    }

    #[test]
    fn test_overlap_minutes() {
        let shift = TimeWindow::new(
            make_datetime("2026-01-15", "08:00:00"),
            make_datetime("2026-01-15", "16:00:00"),
        );
        let lunch = TimeWindow::new(
            make_datetime("2026-01-15", "12:00:00"),
            make_datetime("2026-01-15", "13:00:00"),
        );
        let evening = TimeWindow::new(
            make_datetime("2026-01-15", "18:00:00"),
            make_datetime("2026-01-15", "19:00:00"),
        );

        assert_eq!(shift.overlap_minutes(&lunch), 60);
        assert_eq!(shift.overlap_minutes(&evening), 0);
    }

    #[test]
    fn test_scheduled_shift_without_template_has_no_window() {
        let shift = ScheduledShift {
            id: "roster_001".to_string(),
            employee_id: "emp_001".to_string(),
            date: make_date("2026-01-15"),
            template: None,
            role: None,
            unit: None,
            status: ScheduleStatus::Active,
        };

        assert!(shift.window().is_none());
        assert!(!shift.is_overnight());
    }

    #[test]
    fn test_display_fallback_only_without_template() {
        let fallback = ShiftDisplay::from_template(None);
        assert!(fallback.is_fallback);
        assert_eq!(fallback.time_range(), "08:00 - 16:00");

        let tpl = template("14:00:00", "22:00:00");
        let display = ShiftDisplay::from_template(Some(&tpl));
        assert!(!display.is_fallback);
        assert_eq!(display.time_range(), "14:00 - 22:00");
    }

    #[test]
    fn test_scheduled_shift_deserialization_defaults() {
        let json = r#"{
            "id": "roster_001",
            "employee_id": "emp_001",
            "date": "2026-01-15",
            "template": {
                "id": "tpl_pagi",
                "name": "Pagi",
                "start_time": "08:00:00",
                "end_time": "16:00:00",
                "duration_hours": "8"
            }
        }"#;

        let shift: ScheduledShift = serde_json::from_str(json).unwrap();
        assert!(shift.is_active());
        assert_eq!(shift.role, None);
        assert_eq!(shift.template.unwrap().name, "Pagi");
    }
}
