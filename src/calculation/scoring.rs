//! Attendance performance scoring.
//!
//! Classifies an effective worked duration into a performance status with
//! a fixed point value and badge label. The table is a gamification
//! contract shared with the presentation layer:
//!
//! | Status       | Condition                        | Points |
//! |--------------|----------------------------------|--------|
//! | `Short`      | under 30 minutes worked          | 10     |
//! | `Perfect`    | no shortage                      | 150    |
//! | `Good`       | shortage up to 15 minutes        | 120    |
//! | `Late`       | shortage up to 60 minutes        | 80     |
//! | `Incomplete` | shortage over 60 minutes         | 50     |
//! | `Absent`     | no check-out recorded            | 0      |

use serde::{Deserialize, Serialize};

/// Worked durations under this many minutes are classified as `Short`.
pub const SHORT_SESSION_MINUTES: i64 = 30;

/// Largest shortage still classified as `Good`.
pub const GOOD_SHORTAGE_LIMIT_MINUTES: i64 = 15;

/// Largest shortage still classified as `Late`.
pub const LATE_SHORTAGE_LIMIT_MINUTES: i64 = 60;

/// Performance classification of one attendance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceStatus {
    /// Full target duration worked.
    Perfect,
    /// Shortage of at most 15 minutes.
    Good,
    /// Shortage of at most 60 minutes.
    Late,
    /// Shortage of more than 60 minutes.
    Incomplete,
    /// Less than 30 minutes worked.
    Short,
    /// No check-out recorded.
    Absent,
}

impl PerformanceStatus {
    /// Returns the point value awarded for this status.
    pub fn points(self) -> u32 {
        match self {
            Self::Perfect => 150,
            Self::Good => 120,
            Self::Late => 80,
            Self::Incomplete => 50,
            Self::Short => 10,
            Self::Absent => 0,
        }
    }

    /// Returns the badge label shown for this status.
    pub fn badge(self) -> &'static str {
        match self {
            Self::Perfect => "Perfect Timing",
            Self::Good => "On Track",
            Self::Late => "Late Arrival",
            Self::Incomplete => "Incomplete Shift",
            Self::Short => "Too Short",
            Self::Absent => "Absent",
        }
    }
}

impl std::fmt::Display for PerformanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Perfect => write!(f, "perfect"),
            Self::Good => write!(f, "good"),
            Self::Late => write!(f, "late"),
            Self::Incomplete => write!(f, "incomplete"),
            Self::Short => write!(f, "short"),
            Self::Absent => write!(f, "absent"),
        }
    }
}

/// A status together with its points and badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceScore {
    /// The classification.
    pub status: PerformanceStatus,
    /// Points awarded.
    pub points: u32,
    /// Badge label.
    pub badge: String,
}

impl From<PerformanceStatus> for PerformanceScore {
    fn from(status: PerformanceStatus) -> Self {
        Self {
            status,
            points: status.points(),
            badge: status.badge().to_string(),
        }
    }
}

/// Classifies a worked duration and its shortage.
///
/// # Examples
///
/// ```
/// use attendance_engine::calculation::{classify_performance, PerformanceStatus};
///
/// let score = classify_performance(470, 10);
/// assert_eq!(score.status, PerformanceStatus::Good);
/// assert_eq!(score.points, 120);
/// ```
pub fn classify_performance(final_duration_minutes: i64, shortage_minutes: i64) -> PerformanceScore {
    let status = if final_duration_minutes < SHORT_SESSION_MINUTES {
        PerformanceStatus::Short
    } else if shortage_minutes <= 0 {
        PerformanceStatus::Perfect
    } else if shortage_minutes <= GOOD_SHORTAGE_LIMIT_MINUTES {
        PerformanceStatus::Good
    } else if shortage_minutes <= LATE_SHORTAGE_LIMIT_MINUTES {
        PerformanceStatus::Late
    } else {
        PerformanceStatus::Incomplete
    };
    status.into()
}
