//! Property tests for shift resolution, duration and session rules.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use proptest::prelude::*;
use rust_decimal::Decimal;

use attendance_engine::attendance::{
    AttendanceEngine, AttendanceRequest, AttendanceStore, FixedClock, InMemoryAttendanceStore,
    InMemoryRoster, InMemoryWorkLocations,
};
use attendance_engine::calculation::{
    BreakInterval, MatchKind, ResolutionPolicy, calculate_duration, resolve_shift,
};
use attendance_engine::config::EngineConfig;
use attendance_engine::models::{ScheduleStatus, ScheduledShift, ShiftTemplate};

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
}

fn time_of_day(minute_of_day: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(minute_of_day / 60, minute_of_day % 60, 0).unwrap()
}

fn make_shift(id: &str, date: NaiveDate, start_minute: u32, length_minutes: u32) -> ScheduledShift {
    let end_minute = (start_minute + length_minutes) % (24 * 60);
    ScheduledShift {
        id: id.to_string(),
        employee_id: "emp_001".to_string(),
        date,
        template: Some(ShiftTemplate {
            id: format!("tpl_{}", id),
            name: id.to_string(),
            start_time: time_of_day(start_minute),
            end_time: time_of_day(end_minute),
            duration_hours: Decimal::from(length_minutes) / Decimal::from(60),
        }),
        role: None,
        unit: None,
        status: ScheduleStatus::Active,
    }
}

proptest! {
    /// An instant inside a shift's buffered window always resolves to a current shift
    #[test]
    fn buffered_instant_resolves_current(
        start in 0u32..1440u32,
        length in 60u32..720u32,
        offset in -30i64..30i64,
        position in 0u32..=100u32,
    ) {
        let shift = make_shift("s1", base_date(), start, length);
        let window = shift.window().unwrap();
        let inside = i64::from(length) * i64::from(position) / 100;
        let now = window.start + Duration::minutes(inside + offset);

        let selected = resolve_shift(&[shift], now, &ResolutionPolicy::default()).unwrap();
        prop_assert_eq!(selected.match_kind, MatchKind::Current);
        prop_assert!(selected.buffered_window.contains(now));
    }

    /// With two shifts, a current match wins whenever either buffered window holds `now`
    #[test]
    fn current_match_preferred(
        first_start in 0u32..1440u32,
        second_start in 0u32..1440u32,
        length in 60u32..600u32,
        minute in 0i64..(2 * 24 * 60),
    ) {
        let roster = vec![
            make_shift("a", base_date(), first_start, length),
            make_shift("b", base_date(), second_start, length),
        ];
        let policy = ResolutionPolicy::default();
        let now = base_date().and_time(NaiveTime::MIN) + Duration::minutes(minute);

        let any_current = roster.iter().any(|s| {
            let window = s.window().unwrap();
            let buffer = policy.buffer_for(&window);
            window.expand(buffer, buffer).contains(now)
        });
        let selected = resolve_shift(&roster, now, &policy).unwrap();
        prop_assert_eq!(selected.match_kind == MatchKind::Current, any_current);
    }

    /// Duration figures stay within their bounds for any check-in/check-out pair
    #[test]
    fn duration_bounds(
        check_in_offset in -120i64..600i64,
        worked in 0i64..900i64,
        break_start in 0i64..480i64,
        break_length in 0i64..90i64,
    ) {
        let shift_start = base_date().and_hms_opt(8, 0, 0).unwrap();
        let shift_end = shift_start + Duration::hours(8);
        let check_in = shift_start + Duration::minutes(check_in_offset);
        let check_out = check_in + Duration::minutes(worked);
        let breaks = [BreakInterval {
            start: shift_start + Duration::minutes(break_start),
            end: shift_start + Duration::minutes(break_start + break_length),
            label: None,
        }];

        let result = calculate_duration(check_in, check_out, shift_start, shift_end, &breaks);
        prop_assert!(result.shortage_minutes >= 0);
        prop_assert!(result.final_duration_minutes >= 0);
        prop_assert!(result.final_duration_minutes <= result.worked_minutes);
        prop_assert!(result.attendance_percentage >= Decimal::ZERO);
        prop_assert!(result.attendance_percentage <= Decimal::ONE_HUNDRED);
        prop_assert_eq!(
            result.shortage_minutes,
            (result.target_minutes - result.final_duration_minutes).max(0)
        );
    }
}

// =============================================================================
// Session Invariants
// =============================================================================

#[derive(Debug, Clone, Copy)]
enum Action {
    CheckIn,
    CheckOut,
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![Just(Action::CheckIn), Just(Action::CheckOut)]
}

fn roster_for_week() -> Vec<ScheduledShift> {
    (0..7)
        .flat_map(|day| {
            let date = base_date() + Duration::days(day);
            vec![
                make_shift(&format!("pagi_{}", day), date, 7 * 60, 8 * 60),
                make_shift(&format!("malam_{}", day), date, 21 * 60, 9 * 60),
            ]
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any sequence of check-ins and check-outs keeps at most one open
    /// record, never records a shift twice and never closes before check-in
    #[test]
    fn session_invariants_hold(
        steps in prop::collection::vec((action(), 0i64..720i64, any::<bool>()), 1..40),
    ) {
        let start: NaiveDateTime = base_date().and_hms_opt(6, 0, 0).unwrap();
        let clock = Arc::new(FixedClock::new(start));
        let store = Arc::new(InMemoryAttendanceStore::new());
        let engine = AttendanceEngine::new(
            EngineConfig::default(),
            clock.clone(),
            Arc::new(InMemoryRoster::with_shifts(roster_for_week())),
            Arc::new(InMemoryWorkLocations::new()),
            store.clone(),
        );

        for (action, advance, bypass) in steps {
            clock.advance(Duration::minutes(advance));
            let mut request = AttendanceRequest::new("emp_001");
            if bypass {
                request = request.with_tolerance_bypass();
            }
            let _ = match action {
                Action::CheckIn => engine.check_in(&request).map(|_| ()),
                Action::CheckOut => engine.check_out(&request).map(|_| ()),
            };

            prop_assert!(store.open_records("emp_001").unwrap().len() <= 1);
        }

        let records = store.snapshot();
        let mut seen = HashSet::new();
        for record in &records {
            if let Some(shift_id) = record.scheduled_shift_id.as_deref() {
                prop_assert!(seen.insert(shift_id.to_string()), "shift {} recorded twice", shift_id);
            }
            if let (Some(check_in), Some(check_out)) = (record.check_in, record.check_out) {
                prop_assert!(check_out >= check_in);
            }
        }
    }
}
