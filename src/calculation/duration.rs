//! Effective worked duration calculation.
//!
//! This module computes how long an employee effectively worked during a
//! shift: the raw check-in to check-out span, minus the part of it that
//! overlaps standard breaks, compared against the shift's target duration.
//! It also provides the check-out capping rule applied before storage.

use chrono::{Duration, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::TimeWindow;

use super::breaks::BreakInterval;
use super::scoring::{PerformanceScore, classify_performance};

/// Minute-level breakdown of a worked session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationBreakdown {
    /// Break minutes overlapping the worked span (deducted from worked time).
    pub break_minutes: i64,
    /// Break minutes overlapping the shift window.
    pub scheduled_break_minutes: i64,
    /// Minutes between shift start and a later check-in.
    pub late_arrival_minutes: i64,
    /// Minutes between an earlier check-out and shift end.
    pub early_departure_minutes: i64,
    /// Minutes worked past shift end.
    pub overtime_minutes: i64,
}

/// The result of a duration calculation.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::calculate_duration;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
/// let at = |h, m| date.and_hms_opt(h, m, 0).unwrap();
///
/// let result = calculate_duration(at(8, 10), at(16, 0), at(8, 0), at(16, 0), &[]);
/// assert_eq!(result.final_duration_minutes, 470);
/// assert_eq!(result.shortage_minutes, 10);
/// assert_eq!(result.attendance_percentage, Decimal::new(9792, 2)); // 97.92%
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationResult {
    /// Raw minutes between check-in and check-out, never negative.
    pub worked_minutes: i64,
    /// Worked minutes after break deduction.
    pub final_duration_minutes: i64,
    /// Minutes the shift expects to be worked.
    pub target_minutes: i64,
    /// Target minus final duration, never negative.
    pub shortage_minutes: i64,
    /// Final duration as a percentage of target, capped at 100.
    pub attendance_percentage: Decimal,
    /// Detailed breakdown.
    pub breakdown: DurationBreakdown,
}

impl DurationResult {
    /// Classifies this result into a performance score.
    pub fn score(&self) -> PerformanceScore {
        classify_performance(self.final_duration_minutes, self.shortage_minutes)
    }
}

/// Calculates the effective worked duration of a session.
///
/// # Arguments
///
/// * `check_in` - The check-in instant
/// * `check_out` - The (capped) check-out instant
/// * `shift_start` - Start of the resolved shift
/// * `shift_end` - End of the resolved shift; an end before the start is
///   treated as the following day
/// * `breaks` - Standard break intervals for the shift
///
/// # Behavior
///
/// - Raw worked minutes are `check_out - check_in`, clamped to zero
/// - Each break's overlap with `[check_in, check_out]` is deducted
/// - The target is the full shift duration; breaks inside the shift are
///   reported in the breakdown but never reduce the target
/// - The percentage is rounded to two decimals, capped at 100, and zero
///   when the target is zero
///
/// # Examples
///
/// ```
/// use attendance_engine::calculation::{calculate_duration, BreakInterval};
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
/// let at = |h, m| date.and_hms_opt(h, m, 0).unwrap();
/// let lunch = BreakInterval { start: at(12, 0), end: at(13, 0), label: None };
///
/// // Left at 12:30, half-way through lunch.
/// let result = calculate_duration(at(8, 0), at(12, 30), at(8, 0), at(16, 0), &[lunch]);
/// assert_eq!(result.worked_minutes, 270);
/// assert_eq!(result.breakdown.break_minutes, 30);
/// assert_eq!(result.final_duration_minutes, 240);
/// assert_eq!(result.target_minutes, 480);
/// assert_eq!(result.shortage_minutes, 240);
/// ```
pub fn calculate_duration(
    check_in: NaiveDateTime,
    check_out: NaiveDateTime,
    shift_start: NaiveDateTime,
    shift_end: NaiveDateTime,
    breaks: &[BreakInterval],
) -> DurationResult {
    let shift = TimeWindow::new(shift_start, shift_end);
    let worked_minutes = (check_out - check_in).num_minutes().max(0);

    let worked = TimeWindow {
        start: check_in,
        end: check_out.max(check_in),
    };
    let break_minutes: i64 = breaks
        .iter()
        .map(|b| worked.overlap_minutes(&b.window()))
        .sum();
    let scheduled_break_minutes: i64 = breaks
        .iter()
        .map(|b| shift.overlap_minutes(&b.window()))
        .sum();

    let final_duration_minutes = (worked_minutes - break_minutes).max(0);
    let target_minutes = shift.duration_minutes().max(0);
    let shortage_minutes = (target_minutes - final_duration_minutes).max(0);

    let attendance_percentage = if target_minutes == 0 {
        Decimal::ZERO
    } else {
        let pct = Decimal::from(final_duration_minutes) * Decimal::ONE_HUNDRED
            / Decimal::from(target_minutes);
        pct.min(Decimal::ONE_HUNDRED).round_dp(2)
    };

    let breakdown = DurationBreakdown {
        break_minutes,
        scheduled_break_minutes,
        late_arrival_minutes: minutes_between(shift.start, check_in),
        early_departure_minutes: minutes_between(check_out, shift.end),
        overtime_minutes: minutes_between(shift.end, check_out),
    };

    DurationResult {
        worked_minutes,
        final_duration_minutes,
        target_minutes,
        shortage_minutes,
        attendance_percentage,
        breakdown,
    }
}

/// Caps a requested check-out at the shift end.
///
/// The capped value is what gets stored; the raw instant is only used to
/// validate the request. Employees are not credited for unsanctioned time
/// past the shift end.
///
/// # Examples
///
/// ```
/// use attendance_engine::calculation::cap_check_out;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
/// let shift_end = date.and_hms_opt(16, 0, 0).unwrap();
///
/// assert_eq!(cap_check_out(date.and_hms_opt(16, 5, 0).unwrap(), shift_end), shift_end);
/// assert_eq!(
///     cap_check_out(date.and_hms_opt(15, 55, 0).unwrap(), shift_end),
///     date.and_hms_opt(15, 55, 0).unwrap()
/// );
/// ```
pub fn cap_check_out(requested: NaiveDateTime, shift_end: NaiveDateTime) -> NaiveDateTime {
    requested.min(shift_end)
}

/// Whole minutes from `from` to `to`, zero if `to` is not later.
fn minutes_between(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    (to - from).max(Duration::zero()).num_minutes()
}
