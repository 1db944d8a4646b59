//! Core data models for the Attendance Engine.
//!
//! This module contains the roster, work location and attendance record
//! types shared by the calculation and attendance layers.

mod attendance;
mod shift;
mod work_location;

pub use attendance::{AttendanceRecord, CheckoutAmendment, SessionState};
pub use shift::{
    FALLBACK_SHIFT_NAME, ScheduleStatus, ScheduledShift, ShiftDisplay, ShiftTemplate, TimeWindow,
};
pub use work_location::WorkLocation;
