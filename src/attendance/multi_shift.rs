//! Multi-shift availability.
//!
//! Answers "can this employee check in or out right now, and for which
//! shift" by combining the day's roster, the employee's records, the
//! tolerance windows, the daily shift cap and the minimum gap between
//! shifts. [`evaluate_status`] is the pure core; [`AttendanceEngine::status`]
//! gathers its inputs from the engine's collaborators.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::calculation::{ToleranceWindows, resolve_tolerance};
use crate::error::EngineResult;
use crate::models::{AttendanceRecord, ScheduledShift, ShiftDisplay, TimeWindow};

use super::engine::AttendanceEngine;

/// A shift the employee could check in to, with its check-in window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShiftAvailability {
    /// The roster entry.
    pub shift_id: String,
    /// The roster date.
    pub date: NaiveDate,
    /// Presentation view of the shift.
    pub display: ShiftDisplay,
    /// The unbuffered shift window.
    pub window: TimeWindow,
    /// First instant a check-in is accepted.
    pub check_in_opens_at: NaiveDateTime,
    /// Last instant a check-in is accepted.
    pub check_in_closes_at: NaiveDateTime,
}

impl ShiftAvailability {
    /// Builds the availability of a roster entry; `None` without a template.
    pub fn for_shift(shift: &ScheduledShift, tolerance: &ToleranceWindows) -> Option<Self> {
        let window = shift.window()?;
        let check_in = tolerance.check_in_window(&window);
        Some(Self {
            shift_id: shift.id.clone(),
            date: shift.date,
            display: ShiftDisplay::from_template(shift.template.as_ref()),
            window,
            check_in_opens_at: check_in.start,
            check_in_closes_at: check_in.end,
        })
    }

    fn accepts_check_in(&self, now: NaiveDateTime) -> bool {
        self.check_in_opens_at <= now && now <= self.check_in_closes_at
    }
}

/// What the employee can do right now.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiShiftStatus {
    /// A check-in would currently be accepted.
    pub can_check_in: bool,
    /// There is an open record to check out from.
    pub can_check_out: bool,
    /// The shift being worked, or the one open for check-in.
    pub current_shift: Option<ShiftAvailability>,
    /// The next shift that will open for check-in.
    pub next_shift: Option<ShiftAvailability>,
    /// Records dated today, plus any open record from an earlier day.
    pub today_records: Vec<AttendanceRecord>,
    /// Closed records dated today.
    pub completed_shifts: u32,
    /// The daily shift cap has been reached.
    pub max_shifts_reached: bool,
    /// Human-readable summary (Bahasa Indonesia).
    pub message: String,
}

/// Inputs to [`evaluate_status`].
#[derive(Debug, Clone, Copy)]
pub struct StatusContext<'a> {
    /// The instant being evaluated.
    pub now: NaiveDateTime,
    /// Active roster entries for today plus the previous day's overnight ones.
    pub roster: &'a [ScheduledShift],
    /// The employee's records dated yesterday and today.
    pub records: &'a [AttendanceRecord],
    /// The employee's open, non-stale record.
    pub open_record: Option<&'a AttendanceRecord>,
    /// The roster entry of the open record.
    pub open_shift: Option<&'a ScheduledShift>,
    /// Tolerance windows in force.
    pub tolerance: ToleranceWindows,
    /// Cap on closed shifts per day.
    pub max_shifts_per_day: u32,
    /// Minimum gap between a check-out and the next check-in.
    pub min_shift_gap_minutes: i64,
}

/// Evaluates check-in/check-out availability.
///
/// - An open record allows check-out only.
/// - Reaching the daily cap blocks everything.
/// - While the gap since the last check-out runs, the pending shift is
///   reported as `next_shift` with the instant check-in opens.
/// - Otherwise the remaining shift whose check-in window contains `now`
///   is current, and the earliest one opening later is next.
pub fn evaluate_status(context: &StatusContext<'_>) -> MultiShiftStatus {
    let now = context.now;
    let today = now.date();

    let mut today_records: Vec<AttendanceRecord> = context
        .records
        .iter()
        .filter(|r| r.date == today)
        .cloned()
        .collect();
    if let Some(open) = context.open_record {
        if !today_records.iter().any(|r| r.id == open.id) {
            today_records.push(open.clone());
            today_records.sort_by_key(|r| r.check_in);
        }
    }

    let completed_shifts = closed_count_on(context.records, today);
    let max_shifts_reached = completed_shifts >= context.max_shifts_per_day;

    let mut status = MultiShiftStatus {
        can_check_in: false,
        can_check_out: false,
        current_shift: None,
        next_shift: None,
        today_records,
        completed_shifts,
        max_shifts_reached,
        message: String::new(),
    };

    if context.open_record.is_some() {
        status.can_check_out = true;
        status.current_shift = context
            .open_shift
            .and_then(|s| ShiftAvailability::for_shift(s, &context.tolerance));
        status.message = match &status.current_shift {
            Some(shift) => format!(
                "Anda sedang bertugas pada shift {} ({}).",
                shift.display.name,
                shift.display.time_range()
            ),
            None => "Anda sedang bertugas.".to_string(),
        };
        return status;
    }

    if max_shifts_reached {
        status.message = format!(
            "Batas maksimal {} shift per hari sudah tercapai.",
            context.max_shifts_per_day
        );
        return status;
    }

    if context.roster.is_empty() {
        status.message = "Anda tidak memiliki jadwal jaga hari ini.".to_string();
        return status;
    }

    let completed = completed_shift_ids(context.records);
    let remaining: Vec<ShiftAvailability> = context
        .roster
        .iter()
        .filter(|s| !completed.contains(s.id.as_str()))
        .filter_map(|s| ShiftAvailability::for_shift(s, &context.tolerance))
        .collect();

    if remaining.is_empty() {
        status.message = if context.roster.iter().all(|s| s.template.is_none()) {
            "Jadwal jaga hari ini tidak memiliki shift yang valid.".to_string()
        } else {
            "Semua shift hari ini sudah selesai.".to_string()
        };
        return status;
    }

    let gap_opens_at = last_check_out(context.records)
        .map(|last| last + Duration::minutes(context.min_shift_gap_minutes))
        .filter(|opens_at| *opens_at > now);

    if let Some(gap_opens_at) = gap_opens_at {
        status.next_shift = remaining
            .into_iter()
            .filter(|s| s.check_in_closes_at >= gap_opens_at)
            .min_by_key(|s| s.window.start)
            .map(|mut s| {
                s.check_in_opens_at = s.check_in_opens_at.max(gap_opens_at);
                s
            });
        status.message = match &status.next_shift {
            Some(next) => format!(
                "Check-in shift berikutnya dibuka pukul {}.",
                next.check_in_opens_at.format("%H:%M")
            ),
            None => "Tidak ada shift lagi yang dapat diikuti hari ini.".to_string(),
        };
        return status;
    }

    status.current_shift = remaining
        .iter()
        .filter(|s| s.accepts_check_in(now))
        .min_by_key(|s| (now - s.window.start).num_seconds().abs())
        .cloned();
    status.next_shift = remaining
        .iter()
        .filter(|s| s.check_in_opens_at > now)
        .min_by_key(|s| s.window.start)
        .cloned();
    status.can_check_in = status.current_shift.is_some();

    status.message = match (&status.current_shift, &status.next_shift) {
        (Some(current), _) => format!(
            "Silakan check-in untuk shift {} ({}).",
            current.display.name,
            current.display.time_range()
        ),
        (None, Some(next)) => format!(
            "Check-in shift {} dibuka pukul {}.",
            next.display.name,
            next.check_in_opens_at.format("%H:%M")
        ),
        (None, None) => "Tidak ada shift yang tersedia untuk check-in saat ini.".to_string(),
    };
    status
}

impl AttendanceEngine {
    /// Reports check-in/check-out availability at the current instant.
    pub fn status(&self, employee_id: &str) -> EngineResult<MultiShiftStatus> {
        self.status_at(employee_id, self.now())
    }

    /// Reports check-in/check-out availability at `now`.
    ///
    /// Read-only: stale open records are ignored here and only closed by
    /// the next check-in or [`AttendanceEngine::repair_stale_sessions`].
    pub fn status_at(&self, employee_id: &str, now: NaiveDateTime) -> EngineResult<MultiShiftStatus> {
        let today = now.date();
        let location = self.work_location(employee_id, today)?;
        let tolerance = resolve_tolerance(location.as_ref());
        let roster = self.roster_at(employee_id, now, &tolerance)?;
        let records = self.records_around(employee_id, today)?;

        let mut open = None;
        for record in self.open_records(employee_id)? {
            let shift = self.shift_for_record(&record)?;
            if !self.is_stale(&record, shift.as_ref(), now, &tolerance) {
                open = Some((record, shift));
            }
        }

        Ok(evaluate_status(&StatusContext {
            now,
            roster: &roster,
            records: &records,
            open_record: open.as_ref().map(|(record, _)| record),
            open_shift: open.as_ref().and_then(|(_, shift)| shift.as_ref()),
            tolerance,
            max_shifts_per_day: self.config().max_shifts_per_day,
            min_shift_gap_minutes: self.config().min_shift_gap_minutes,
        }))
    }
}

/// Latest stored check-out, ignoring auto-closed records.
pub(crate) fn last_check_out(records: &[AttendanceRecord]) -> Option<NaiveDateTime> {
    records
        .iter()
        .filter(|r| !r.auto_closed)
        .filter_map(|r| r.check_out)
        .max()
}

/// Number of closed records dated `day`.
pub(crate) fn closed_count_on(records: &[AttendanceRecord], day: NaiveDate) -> u32 {
    let count = records
        .iter()
        .filter(|r| r.date == day && r.is_closed())
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Roster entries that already have a closed record.
pub(crate) fn completed_shift_ids(records: &[AttendanceRecord]) -> HashSet<&str> {
    records
        .iter()
        .filter(|r| r.is_closed())
        .filter_map(|r| r.scheduled_shift_id.as_deref())
        .collect()
}
