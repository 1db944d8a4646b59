//! Standard break lookup.
//!
//! Breaks are configured per shift name as fixed time-of-day slots (for
//! example a 12:00–13:00 lunch for the morning shift). Shifts without
//! configured slots may get a single break centred on the shift midpoint.

use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::config::{BreakConfig, BreakSlot};
use crate::models::TimeWindow;

/// A concrete break interval on the timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakInterval {
    /// Start of the break.
    pub start: NaiveDateTime,
    /// End of the break.
    pub end: NaiveDateTime,
    /// Optional label (e.g. "Istirahat siang").
    #[serde(default)]
    pub label: Option<String>,
}

impl BreakInterval {
    /// Returns the interval as a [`TimeWindow`].
    pub fn window(&self) -> TimeWindow {
        TimeWindow {
            start: self.start,
            end: self.end,
        }
    }
}

/// Standard break times keyed by shift name (case-insensitive).
#[derive(Debug, Clone, Default)]
pub struct BreakSchedule {
    slots: HashMap<String, Vec<BreakSlot>>,
    midpoint_break_minutes: i64,
    midpoint_min_shift_minutes: i64,
}

impl BreakSchedule {
    /// Builds the schedule from configuration.
    pub fn from_config(config: &BreakConfig) -> Self {
        let slots = config
            .standard
            .iter()
            .map(|(name, slots)| (name.trim().to_lowercase(), slots.clone()))
            .collect();
        Self {
            slots,
            midpoint_break_minutes: config.midpoint_break_minutes,
            midpoint_min_shift_minutes: config.midpoint_min_shift_minutes,
        }
    }

    /// Returns the break intervals for a shift named `shift_name` spanning `window`.
    ///
    /// Configured slots are placed on the shift's timeline: a slot whose
    /// start falls before the shift start belongs to the following day,
    /// which is how breaks after midnight in overnight shifts are placed.
    ///
    /// # Examples
    ///
    /// ```
    /// use attendance_engine::calculation::BreakSchedule;
    /// use attendance_engine::config::{BreakConfig, BreakSlot};
    /// use attendance_engine::models::TimeWindow;
    /// use chrono::{NaiveDate, NaiveTime};
    /// use std::collections::BTreeMap;
    ///
    /// let mut standard = BTreeMap::new();
    /// standard.insert(
    ///     "Malam".to_string(),
    ///     vec![BreakSlot {
    ///         start: NaiveTime::from_hms_opt(2, 0, 0).unwrap(),
    ///         end: NaiveTime::from_hms_opt(2, 30, 0).unwrap(),
    ///         label: None,
    ///     }],
    /// );
    /// let schedule = BreakSchedule::from_config(&BreakConfig {
    ///     standard,
    ///     ..BreakConfig::default()
    /// });
    ///
    /// let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
    /// let shift = TimeWindow::on_date(
    ///     date,
    ///     NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
    ///     NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
    /// );
    /// let breaks = schedule.breaks_for("malam", &shift);
    /// assert_eq!(breaks.len(), 1);
    /// assert_eq!(breaks[0].start.date(), date.succ_opt().unwrap());
    /// ```
    pub fn breaks_for(&self, shift_name: &str, window: &TimeWindow) -> Vec<BreakInterval> {
        match self.slots.get(&shift_name.trim().to_lowercase()) {
            Some(slots) if !slots.is_empty() => slots
                .iter()
                .map(|slot| place_slot(slot, window))
                .filter(|b| window.overlap_minutes(&b.window()) > 0)
                .collect(),
            _ => self.midpoint_break(window).into_iter().collect(),
        }
    }

    fn midpoint_break(&self, window: &TimeWindow) -> Option<BreakInterval> {
        if self.midpoint_break_minutes <= 0
            || window.duration_minutes() < self.midpoint_min_shift_minutes
        {
            return None;
        }
        let midpoint = window.start + Duration::minutes(window.duration_minutes() / 2);
        let start = midpoint - Duration::minutes(self.midpoint_break_minutes / 2);
        Some(BreakInterval {
            start,
            end: start + Duration::minutes(self.midpoint_break_minutes),
            label: None,
        })
    }
}

fn place_slot(slot: &BreakSlot, window: &TimeWindow) -> BreakInterval {
    let mut start = window.start.date().and_time(slot.start);
    if start < window.start {
        start += Duration::days(1);
    }
    let placed = TimeWindow::new(start, start.date().and_time(slot.end));
    BreakInterval {
        start: placed.start,
        end: placed.end,
        label: slot.label.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use std::collections::BTreeMap;

    fn make_time(time_str: &str) -> NaiveTime {
        NaiveTime::parse_from_str(time_str, "%H:%M:%S").unwrap()
    }

    fn make_datetime(date_str: &str, time_str: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date_str, time_str), "%Y-%m-%d %H:%M:%S")
            .unwrap()
    }

    fn slot(start: &str, end: &str) -> BreakSlot {
        BreakSlot {
            start: make_time(start),
            end: make_time(end),
            label: Some("Istirahat".to_string()),
        }
    }

    fn schedule(midpoint_break_minutes: i64) -> BreakSchedule {
        let mut standard = BTreeMap::new();
        standard.insert("Pagi".to_string(), vec![slot("12:00:00", "13:00:00")]);
        standard.insert("Malam".to_string(), vec![slot("01:00:00", "01:30:00")]);
        standard.insert("Kosong".to_string(), vec![]);
        BreakSchedule::from_config(&BreakConfig {
            standard,
            midpoint_break_minutes,
            midpoint_min_shift_minutes: 360,
        })
    }

    fn window(date: &str, start: &str, end: &str) -> TimeWindow {
        TimeWindow::on_date(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            make_time(start),
            make_time(end),
        )
    }

    /// BRK-001: slots are looked up case-insensitively
    #[test]
    fn test_brk_001_lookup_by_name() {
        let breaks = schedule(0).breaks_for("PAGI", &window("2026-01-15", "08:00:00", "16:00:00"));

        assert_eq!(breaks.len(), 1);
        assert_eq!(breaks[0].start, make_datetime("2026-01-15", "12:00:00"));
        assert_eq!(breaks[0].end, make_datetime("2026-01-15", "13:00:00"));
        assert_eq!(breaks[0].label.as_deref(), Some("Istirahat"));
    }

    /// BRK-002: overnight slots land after midnight
    #[test]
    fn test_brk_002_overnight_slot() {
        let breaks = schedule(0).breaks_for("Malam", &window("2026-01-15", "22:00:00", "06:00:00"));

        assert_eq!(breaks[0].start, make_datetime("2026-01-16", "01:00:00"));
        assert_eq!(breaks[0].end, make_datetime("2026-01-16", "01:30:00"));
    }

    /// BRK-003: slots outside the shift are dropped
    #[test]
    fn test_brk_003_slot_outside_shift_dropped() {
        let breaks = schedule(0).breaks_for("Pagi", &window("2026-01-15", "14:00:00", "16:00:00"));
        assert!(breaks.is_empty());
    }

    /// BRK-004: midpoint break for unconfigured long shifts
    #[test]
    fn test_brk_004_midpoint_break() {
        let breaks = schedule(60).breaks_for("Siang", &window("2026-01-15", "14:00:00", "22:00:00"));

        assert_eq!(breaks.len(), 1);
        assert_eq!(breaks[0].start, make_datetime("2026-01-15", "17:30:00"));
        assert_eq!(breaks[0].end, make_datetime("2026-01-15", "18:30:00"));
    }

    #[test]
    fn test_midpoint_break_skipped_for_short_shifts_or_when_disabled() {
        let short = window("2026-01-15", "14:00:00", "18:00:00");
        assert!(schedule(60).breaks_for("Siang", &short).is_empty());

        let long = window("2026-01-15", "14:00:00", "22:00:00");
        assert!(schedule(0).breaks_for("Siang", &long).is_empty());
    }

    #[test]
    fn test_empty_slot_list_uses_midpoint_rule() {
        let breaks = schedule(30).breaks_for("Kosong", &window("2026-01-15", "08:00:00", "16:00:00"));
        assert_eq!(breaks.len(), 1);
        assert_eq!(breaks[0].start, make_datetime("2026-01-15", "11:45:00"));
    }
}
