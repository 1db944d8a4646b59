//! Error types for the Attendance Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while matching shifts and
//! recording check-in/check-out events.
//!
//! Every error belongs to an [`ErrorKind`], carries a stable machine code
//! and a localized (Bahasa Indonesia) message for the end user. Only
//! [`ErrorKind::System`] errors are infrastructure failures; everything else
//! is a recoverable, user-facing condition.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// The category an [`AttendanceError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No schedule, or no usable shift, for the day.
    Scheduling,
    /// The requested transition is invalid for the current session state.
    State,
    /// The event falls outside a tolerance window.
    Timing,
    /// The request itself is malformed (coordinates, location gate).
    Input,
    /// Infrastructure failure (storage, configuration).
    System,
}

/// The main error type for the Attendance Engine.
///
/// # Example
///
/// ```
/// use attendance_engine::error::{AttendanceError, ErrorKind};
/// use chrono::NaiveDate;
///
/// let error = AttendanceError::NoScheduleToday {
///     date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
/// };
/// assert_eq!(error.kind(), ErrorKind::Scheduling);
/// assert_eq!(error.code(), "NO_SCHEDULE_TODAY");
/// assert_eq!(error.to_string(), "No schedule found on 2026-01-15");
/// ```
#[derive(Debug, Error)]
pub enum AttendanceError {
    /// The day has zero scheduled entries.
    #[error("No schedule found on {date}")]
    NoScheduleToday {
        /// The calendar day that was looked up.
        date: NaiveDate,
    },

    /// The day has scheduled entries, but none of them references a shift template.
    #[error("No valid shift scheduled on {date}")]
    NoValidShiftToday {
        /// The calendar day that was looked up.
        date: NaiveDate,
    },

    /// The employee already has an open session that blocks a new check-in.
    #[error("Employee '{employee_id}' already has an open attendance session ({record_id})")]
    AlreadyOpenSession {
        /// The employee attempting to check in.
        employee_id: String,
        /// The open record blocking the check-in.
        record_id: Uuid,
    },

    /// There is no open or amendable record to check out from.
    #[error("Employee '{employee_id}' has not checked in")]
    NotCheckedIn {
        /// The employee attempting to check out.
        employee_id: String,
    },

    /// The employee already has an open session for the resolved shift.
    #[error("Employee '{employee_id}' already has an open session for shift '{shift_id}'")]
    DuplicateShiftSession {
        /// The employee attempting to check in.
        employee_id: String,
        /// The scheduled shift that already has an open session.
        shift_id: String,
    },

    /// The daily shift cap has been reached.
    #[error("Employee '{employee_id}' has reached the maximum of {max_shifts} shifts on {date}")]
    MaxShiftsReached {
        /// The employee attempting to check in.
        employee_id: String,
        /// The calendar day.
        date: NaiveDate,
        /// The configured daily cap.
        max_shifts: u32,
    },

    /// Every scheduled shift of the day already has a closed record.
    #[error("All scheduled shifts for employee '{employee_id}' on {date} are completed")]
    AllShiftsCompleted {
        /// The employee attempting to check in.
        employee_id: String,
        /// The calendar day.
        date: NaiveDate,
    },

    /// The check-in window for the resolved shift has not opened yet.
    #[error("Check-in for shift '{shift_id}' opens at {opens_at}")]
    CheckInTooEarly {
        /// The resolved scheduled shift.
        shift_id: String,
        /// The first instant a check-in is accepted.
        opens_at: NaiveDateTime,
    },

    /// The check-in window for the resolved shift has already closed.
    #[error("Check-in for shift '{shift_id}' closed at {closed_at}")]
    CheckInTooLate {
        /// The resolved scheduled shift.
        shift_id: String,
        /// The last instant a check-in was accepted.
        closed_at: NaiveDateTime,
    },

    /// The check-out happened before the early-departure tolerance allows.
    #[error("Check-out for shift '{shift_id}' is allowed from {allowed_from}")]
    CheckoutTooEarly {
        /// The shift of the record being closed.
        shift_id: String,
        /// The first instant a check-out is accepted.
        allowed_from: NaiveDateTime,
    },

    /// The minimum gap since the previous check-out has not elapsed.
    #[error("Next check-in for employee '{employee_id}' opens at {opens_at}")]
    ShiftGapNotElapsed {
        /// The employee attempting to check in.
        employee_id: String,
        /// The instant the next check-in becomes possible.
        opens_at: NaiveDateTime,
    },

    /// Coordinates were missing, non-finite or out of range.
    #[error("Invalid coordinates: {}", describe_coordinates(.latitude, .longitude))]
    InvalidCoordinates {
        /// The supplied latitude, `None` when no coordinates were sent.
        latitude: Option<f64>,
        /// The supplied longitude, `None` when no coordinates were sent.
        longitude: Option<f64>,
    },

    /// The geolocation gate rejected the request.
    #[error("Outside work location: {message}")]
    OutsideWorkLocation {
        /// The human-readable message supplied by the geolocation validator.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// The attendance store or another collaborator failed.
    #[error("Storage error: {message}")]
    Storage {
        /// A description of the failure.
        message: String,
    },
}

impl AttendanceError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoScheduleToday { .. } | Self::NoValidShiftToday { .. } => ErrorKind::Scheduling,
            Self::AlreadyOpenSession { .. }
            | Self::NotCheckedIn { .. }
            | Self::DuplicateShiftSession { .. }
            | Self::MaxShiftsReached { .. }
            | Self::AllShiftsCompleted { .. } => ErrorKind::State,
            Self::CheckInTooEarly { .. }
            | Self::CheckInTooLate { .. }
            | Self::CheckoutTooEarly { .. }
            | Self::ShiftGapNotElapsed { .. } => ErrorKind::Timing,
            Self::InvalidCoordinates { .. } | Self::OutsideWorkLocation { .. } => ErrorKind::Input,
            Self::ConfigNotFound { .. } | Self::ConfigParseError { .. } | Self::Storage { .. } => {
                ErrorKind::System
            }
        }
    }

    /// Returns the stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoScheduleToday { .. } => "NO_SCHEDULE_TODAY",
            Self::NoValidShiftToday { .. } => "NO_VALID_SHIFT_TODAY",
            Self::AlreadyOpenSession { .. } => "ALREADY_OPEN_SESSION",
            Self::NotCheckedIn { .. } => "NOT_CHECKED_IN",
            Self::DuplicateShiftSession { .. } => "DUPLICATE_SHIFT_SESSION",
            Self::MaxShiftsReached { .. } => "MAX_SHIFTS_REACHED",
            Self::AllShiftsCompleted { .. } => "ALL_SHIFTS_COMPLETED",
            Self::CheckInTooEarly { .. } => "CHECK_IN_TOO_EARLY",
            Self::CheckInTooLate { .. } => "CHECK_IN_TOO_LATE",
            Self::CheckoutTooEarly { .. } => "CHECKOUT_TOO_EARLY",
            Self::ShiftGapNotElapsed { .. } => "SHIFT_GAP_NOT_ELAPSED",
            Self::InvalidCoordinates { .. } => "INVALID_COORDINATES",
            Self::OutsideWorkLocation { .. } => "OUTSIDE_WORK_LOCATION",
            Self::ConfigNotFound { .. } => "CONFIG_NOT_FOUND",
            Self::ConfigParseError { .. } => "CONFIG_PARSE_ERROR",
            Self::Storage { .. } => "SYSTEM_ERROR",
        }
    }

    /// Returns true for every user-facing condition, false for system failures.
    pub fn is_recoverable(&self) -> bool {
        self.kind() != ErrorKind::System
    }

    /// Returns the message shown to the end user (Bahasa Indonesia).
    pub fn localized_message(&self) -> String {
        match self {
            Self::NoScheduleToday { .. } => "Anda tidak memiliki jadwal jaga hari ini.".to_string(),
            Self::NoValidShiftToday { .. } => {
                "Jadwal jaga hari ini tidak memiliki shift yang valid.".to_string()
            }
            Self::AlreadyOpenSession { .. } => {
                "Anda sudah check-in dan belum melakukan check-out.".to_string()
            }
            Self::NotCheckedIn { .. } => "Anda belum melakukan check-in.".to_string(),
            Self::DuplicateShiftSession { .. } => {
                "Anda sudah check-in untuk shift ini.".to_string()
            }
            Self::MaxShiftsReached { max_shifts, .. } => {
                format!("Batas maksimal {max_shifts} shift per hari sudah tercapai.")
            }
            Self::AllShiftsCompleted { .. } => "Semua shift hari ini sudah selesai.".to_string(),
            Self::CheckInTooEarly { opens_at, .. } => format!(
                "Check-in baru dapat dilakukan mulai pukul {}.",
                opens_at.format("%H:%M")
            ),
            Self::CheckInTooLate { closed_at, .. } => format!(
                "Batas waktu check-in sudah lewat (pukul {}).",
                closed_at.format("%H:%M")
            ),
            Self::CheckoutTooEarly { allowed_from, .. } => format!(
                "Check-out baru dapat dilakukan mulai pukul {}.",
                allowed_from.format("%H:%M")
            ),
            Self::ShiftGapNotElapsed { opens_at, .. } => format!(
                "Check-in shift berikutnya dibuka pukul {}.",
                opens_at.format("%H:%M")
            ),
            Self::InvalidCoordinates { .. } => "Koordinat lokasi tidak valid.".to_string(),
            Self::OutsideWorkLocation { message } => message.clone(),
            Self::ConfigNotFound { .. } | Self::ConfigParseError { .. } | Self::Storage { .. } => {
                "Terjadi gangguan sistem. Silakan coba beberapa saat lagi.".to_string()
            }
        }
    }
}

/// A type alias for Results that return AttendanceError.
pub type EngineResult<T> = Result<T, AttendanceError>;

fn describe_coordinates(latitude: &Option<f64>, longitude: &Option<f64>) -> String {
    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => {
            format!("latitude {latitude}, longitude {longitude}")
        }
        _ => "coordinates missing".to_string(),
    }
}
