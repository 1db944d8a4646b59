//! Attendance record model.
//!
//! An [`AttendanceRecord`] is created at check-in and mutated only at
//! check-out. One employee may hold several records per calendar day (one
//! per shift worked), but at most one of them is open at any time.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::{DurationResult, PerformanceScore, PerformanceStatus};

/// Session state of a record, derived from its check-in/check-out instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No check-in yet.
    NoSession,
    /// Checked in, not checked out.
    Open,
    /// Checked in and out.
    Closed,
}

/// One replacement of a stored check-out by a later check-out call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutAmendment {
    /// The check-out that was replaced.
    pub previous_check_out: NaiveDateTime,
    /// The check-out that replaced it (after capping).
    pub new_check_out: NaiveDateTime,
    /// The raw instant of the amending call.
    pub requested_at: NaiveDateTime,
}

/// An employee's attendance for one shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Unique identifier for the record.
    pub id: Uuid,
    /// The employee the record belongs to.
    pub employee_id: String,
    /// The roster date of the shift worked.
    pub date: NaiveDate,
    /// The scheduled shift the record was matched to.
    #[serde(default)]
    pub scheduled_shift_id: Option<String>,
    /// Check-in instant.
    #[serde(default)]
    pub check_in: Option<NaiveDateTime>,
    /// Stored (possibly capped) check-out instant.
    #[serde(default)]
    pub check_out: Option<NaiveDateTime>,
    /// True when the record was closed by stale-session repair.
    #[serde(default)]
    pub auto_closed: bool,
    /// Every replacement of the stored check-out, oldest first.
    #[serde(default)]
    pub checkout_history: Vec<CheckoutAmendment>,
    /// Duration metrics computed at check-out.
    #[serde(default)]
    pub duration: Option<DurationResult>,
    /// Performance score computed at check-out.
    #[serde(default)]
    pub score: Option<PerformanceScore>,
}

impl AttendanceRecord {
    /// Creates an open record checked in at `check_in`.
    ///
    /// # Examples
    ///
    /// ```
    /// use attendance_engine::models::{AttendanceRecord, SessionState};
    /// use chrono::NaiveDate;
    ///
    /// let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
    /// let record = AttendanceRecord::open(
    ///     "emp_001",
    ///     date,
    ///     Some("roster_001".to_string()),
    ///     date.and_hms_opt(7, 35, 0).unwrap(),
    /// );
    /// assert_eq!(record.state(), SessionState::Open);
    /// ```
    pub fn open(
        employee_id: impl Into<String>,
        date: NaiveDate,
        scheduled_shift_id: Option<String>,
        check_in: NaiveDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id: employee_id.into(),
            date,
            scheduled_shift_id,
            check_in: Some(check_in),
            check_out: None,
            auto_closed: false,
            checkout_history: Vec::new(),
            duration: None,
            score: None,
        }
    }

    /// Returns the session state.
    pub fn state(&self) -> SessionState {
        match (self.check_in, self.check_out) {
            (None, _) => SessionState::NoSession,
            (Some(_), None) => SessionState::Open,
            (Some(_), Some(_)) => SessionState::Closed,
        }
    }

    /// Returns true if the record is checked in but not out.
    pub fn is_open(&self) -> bool {
        self.state() == SessionState::Open
    }

    /// Returns true if the record is checked in and out.
    pub fn is_closed(&self) -> bool {
        self.state() == SessionState::Closed
    }

    /// Returns how long the record has been open at `now`.
    pub fn open_for(&self, now: NaiveDateTime) -> Option<Duration> {
        match (self.check_in, self.check_out) {
            (Some(check_in), None) => Some(now - check_in),
            _ => None,
        }
    }

    /// Returns true if the record references `shift_id`.
    pub fn is_for_shift(&self, shift_id: &str) -> bool {
        self.scheduled_shift_id.as_deref() == Some(shift_id)
    }

    /// Returns the performance status, `Absent` until a score is computed.
    pub fn performance_status(&self) -> PerformanceStatus {
        self.score
            .as_ref()
            .map_or(PerformanceStatus::Absent, |s| s.status)
    }
}
