//! Calculation logic for the Attendance Engine.
//!
//! This module contains the pure, side-effect-free parts of the engine:
//! tolerance window resolution, shift resolution for check-in events,
//! standard break lookup, effective worked duration calculation, check-out
//! capping and performance scoring.

mod breaks;
mod duration;
mod scoring;
mod shift_resolver;
mod tolerance;

pub use breaks::{BreakInterval, BreakSchedule};
pub use duration::{DurationBreakdown, DurationResult, calculate_duration, cap_check_out};
pub use scoring::{
    GOOD_SHORTAGE_LIMIT_MINUTES, LATE_SHORTAGE_LIMIT_MINUTES, PerformanceScore, PerformanceStatus,
    SHORT_SESSION_MINUTES, classify_performance,
};
pub use shift_resolver::{
    DEFAULT_SHORT_SHIFT_BUFFER_MINUTES, DEFAULT_SHORT_SHIFT_THRESHOLD_MINUTES,
    DEFAULT_STANDARD_BUFFER_MINUTES, MatchKind, ResolutionPolicy, SelectedShift, resolve_shift,
};
pub use tolerance::{
    DEFAULT_CHECKIN_BEFORE_MINUTES, DEFAULT_CHECKOUT_AFTER_MINUTES,
    DEFAULT_EARLY_DEPARTURE_TOLERANCE_MINUTES, DEFAULT_LATE_TOLERANCE_MINUTES,
    MAX_TOLERANCE_MINUTES, ToleranceWindows, resolve_tolerance,
};
