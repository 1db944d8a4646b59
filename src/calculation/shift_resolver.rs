//! Shift resolution for check-in events.
//!
//! Given the roster entries for a day and the current instant, this module
//! selects the single shift an attendance event applies to. Selection runs
//! through an ordered table of rules:
//!
//! 1. **Current** - `now` lies inside the shift's buffered window; among
//!    several, the one whose start is closest to `now` wins.
//! 2. **Upcoming** - the shift has not started yet; the earliest start wins.
//! 3. **Past** - the shift has already started; the latest start wins.
//!
//! Remaining ties go to roster order. The first rule that yields a shift
//! decides. The caller re-validates the selection against strict tolerance
//! windows, so resolution always returns *some* shift when one exists.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{AttendanceError, EngineResult};
use crate::models::{ScheduledShift, TimeWindow};

/// Shifts at or under this many minutes get the short-shift buffer.
pub const DEFAULT_SHORT_SHIFT_THRESHOLD_MINUTES: i64 = 30;

/// Buffer applied to both ends of a short shift.
pub const DEFAULT_SHORT_SHIFT_BUFFER_MINUTES: i64 = 60;

/// Buffer applied to both ends of any other shift.
pub const DEFAULT_STANDARD_BUFFER_MINUTES: i64 = 30;

/// Buffer sizes used when matching `now` against shift windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionPolicy {
    /// Shifts at or under this duration use `short_shift_buffer_minutes`.
    pub short_shift_threshold_minutes: i64,
    /// Buffer for short shifts.
    pub short_shift_buffer_minutes: i64,
    /// Buffer for all other shifts.
    pub standard_buffer_minutes: i64,
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        Self {
            short_shift_threshold_minutes: DEFAULT_SHORT_SHIFT_THRESHOLD_MINUTES,
            short_shift_buffer_minutes: DEFAULT_SHORT_SHIFT_BUFFER_MINUTES,
            standard_buffer_minutes: DEFAULT_STANDARD_BUFFER_MINUTES,
        }
    }
}

impl ResolutionPolicy {
    /// Returns the symmetric buffer for a shift window.
    ///
    /// # Examples
    ///
    /// ```
    /// use attendance_engine::calculation::ResolutionPolicy;
    /// use attendance_engine::models::TimeWindow;
    /// use chrono::{Duration, NaiveDate};
    ///
    /// let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
    /// let policy = ResolutionPolicy::default();
    ///
    /// let briefing = TimeWindow::new(
    ///     date.and_hms_opt(7, 0, 0).unwrap(),
    ///     date.and_hms_opt(7, 30, 0).unwrap(),
    /// );
    /// assert_eq!(policy.buffer_for(&briefing), Duration::minutes(60));
    ///
    /// let day = TimeWindow::new(
    ///     date.and_hms_opt(8, 0, 0).unwrap(),
    ///     date.and_hms_opt(16, 0, 0).unwrap(),
    /// );
    /// assert_eq!(policy.buffer_for(&day), Duration::minutes(30));
    /// ```
    pub fn buffer_for(&self, window: &TimeWindow) -> Duration {
        if window.duration_minutes() <= self.short_shift_threshold_minutes {
            Duration::minutes(self.short_shift_buffer_minutes)
        } else {
            Duration::minutes(self.standard_buffer_minutes)
        }
    }
}

/// Which selection rule matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// `now` is inside the buffered window.
    Current,
    /// The shift starts after `now`.
    Upcoming,
    /// The shift started before `now`.
    Past,
}

/// The shift an attendance event was resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedShift {
    /// The selected roster entry.
    pub shift: ScheduledShift,
    /// The unbuffered shift window.
    pub window: TimeWindow,
    /// The window widened by the resolution buffer.
    pub buffered_window: TimeWindow,
    /// The rule that selected the shift.
    pub match_kind: MatchKind,
}

/// A roster entry with its computed windows.
#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    shift: &'a ScheduledShift,
    window: TimeWindow,
    buffered: TimeWindow,
}

/// One row of the selection table: which candidates qualify, and how they rank.
/// Lower rank wins; equal ranks keep roster order.
struct SelectionRule {
    kind: MatchKind,
    qualifies: fn(&Candidate<'_>, NaiveDateTime) -> bool,
    rank: fn(&Candidate<'_>, NaiveDateTime) -> i64,
}

const SELECTION_RULES: [SelectionRule; 3] = [
    SelectionRule {
        kind: MatchKind::Current,
        qualifies: is_current,
        rank: distance_from_start,
    },
    SelectionRule {
        kind: MatchKind::Upcoming,
        qualifies: is_upcoming,
        rank: start_ascending,
    },
    SelectionRule {
        kind: MatchKind::Past,
        qualifies: is_past,
        rank: start_descending,
    },
];

fn is_current(candidate: &Candidate<'_>, now: NaiveDateTime) -> bool {
    candidate.buffered.contains(now)
}

fn is_upcoming(candidate: &Candidate<'_>, now: NaiveDateTime) -> bool {
    candidate.window.start > now
}

fn is_past(candidate: &Candidate<'_>, now: NaiveDateTime) -> bool {
    candidate.window.start <= now
}

fn distance_from_start(candidate: &Candidate<'_>, now: NaiveDateTime) -> i64 {
    (now - candidate.window.start).num_seconds().abs()
}

fn start_ascending(candidate: &Candidate<'_>, _now: NaiveDateTime) -> i64 {
    candidate.window.start.and_utc().timestamp()
}

fn start_descending(candidate: &Candidate<'_>, _now: NaiveDateTime) -> i64 {
    -candidate.window.start.and_utc().timestamp()
}

/// Selects the shift an attendance event at `now` applies to.
///
/// Each roster entry's window is anchored on its own roster date, with an
/// overnight end moved to the following day. Cancelled entries are ignored.
///
/// # Errors
///
/// - [`AttendanceError::NoScheduleToday`] when no active entries are given
/// - [`AttendanceError::NoValidShiftToday`] when no active entry has a template
///
/// # Examples
///
/// ```
/// use attendance_engine::calculation::{resolve_shift, MatchKind, ResolutionPolicy};
/// use attendance_engine::models::{ScheduleStatus, ScheduledShift, ShiftTemplate};
/// use chrono::{NaiveDate, NaiveTime};
/// use rust_decimal::Decimal;
///
/// let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
/// let night = ScheduledShift {
///     id: "roster_001".to_string(),
///     employee_id: "emp_001".to_string(),
///     date,
///     template: Some(ShiftTemplate {
///         id: "tpl_malam".to_string(),
///         name: "Malam".to_string(),
///         start_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
///         end_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
///         duration_hours: Decimal::new(8, 0),
///     }),
///     role: None,
///     unit: None,
///     status: ScheduleStatus::Active,
/// };
///
/// // 02:00 the next morning is still inside the overnight shift.
/// let now = date.succ_opt().unwrap().and_hms_opt(2, 0, 0).unwrap();
/// let selected = resolve_shift(&[night], now, &ResolutionPolicy::default()).unwrap();
/// assert_eq!(selected.match_kind, MatchKind::Current);
/// ```
pub fn resolve_shift(
    shifts: &[ScheduledShift],
    now: NaiveDateTime,
    policy: &ResolutionPolicy,
) -> EngineResult<SelectedShift> {
    let active: Vec<&ScheduledShift> = shifts.iter().filter(|s| s.is_active()).collect();
    if active.is_empty() {
        return Err(AttendanceError::NoScheduleToday { date: now.date() });
    }

    let candidates: Vec<Candidate<'_>> = active
        .into_iter()
        .filter_map(|shift| {
            let window = shift.window()?;
            let buffer = policy.buffer_for(&window);
            Some(Candidate {
                shift,
                window,
                buffered: window.expand(buffer, buffer),
            })
        })
        .collect();
    if candidates.is_empty() {
        return Err(AttendanceError::NoValidShiftToday { date: now.date() });
    }

    SELECTION_RULES
        .iter()
        .find_map(|rule| {
            candidates
                .iter()
                .filter(|c| (rule.qualifies)(c, now))
                .min_by_key(|c| (rule.rank)(c, now))
                .map(|c| SelectedShift {
                    shift: c.shift.clone(),
                    window: c.window,
                    buffered_window: c.buffered,
                    match_kind: rule.kind,
                })
        })
        .ok_or(AttendanceError::NoValidShiftToday { date: now.date() })
}
