//! Performance benchmarks for the Attendance Engine.
//!
//! Targets:
//! - Shift resolution over a day's roster: < 10μs mean
//! - Duration calculation with breaks: < 5μs mean
//! - Full check-in/check-out cycle against in-memory adapters: < 100μs mean
//! - Status query with 1 to 8 roster entries
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;

use attendance_engine::attendance::{
    AttendanceEngine, AttendanceRequest, FixedClock, InMemoryAttendanceStore, InMemoryRoster,
    InMemoryWorkLocations,
};
use attendance_engine::calculation::{
    BreakSchedule, ResolutionPolicy, calculate_duration, resolve_shift,
};
use attendance_engine::config::ConfigLoader;
use attendance_engine::models::{ScheduleStatus, ScheduledShift, ShiftTemplate};

fn bench_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
}

fn at(hour: u32, minute: u32) -> NaiveDateTime {
    bench_date().and_hms_opt(hour, minute, 0).unwrap()
}

/// Creates a roster entry on the bench date.
fn create_shift(id: usize, name: &str, start_hour: u32, length_hours: u32) -> ScheduledShift {
    ScheduledShift {
        id: format!("roster_{:03}", id),
        employee_id: "emp_bench_001".to_string(),
        date: bench_date(),
        template: Some(ShiftTemplate {
            id: format!("tpl_{:03}", id),
            name: name.to_string(),
            start_time: NaiveTime::from_hms_opt(start_hour % 24, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt((start_hour + length_hours) % 24, 0, 0).unwrap(),
            duration_hours: Decimal::from(length_hours),
        }),
        role: Some("perawat".to_string()),
        unit: None,
        status: ScheduleStatus::Active,
    }
}

/// Creates a roster of `count` two-hour shifts spread across the day.
fn create_roster(count: usize) -> Vec<ScheduledShift> {
    (0..count)
        .map(|i| create_shift(i, "Pagi", (6 + i as u32 * 3) % 24, 2))
        .collect()
}

/// Creates an engine over in-memory adapters with the Jakarta profile.
fn create_engine(
    shifts: Vec<ScheduledShift>,
    now: NaiveDateTime,
) -> (AttendanceEngine, Arc<FixedClock>) {
    let config = ConfigLoader::load("./config/jakarta")
        .expect("Failed to load config")
        .into_config();
    let clock = Arc::new(FixedClock::new(now));
    let engine = AttendanceEngine::new(
        config,
        clock.clone(),
        Arc::new(InMemoryRoster::with_shifts(shifts)),
        Arc::new(InMemoryWorkLocations::new()),
        Arc::new(InMemoryAttendanceStore::new()),
    );
    (engine, clock)
}

fn bench_resolve_shift(c: &mut Criterion) {
    let roster = vec![
        create_shift(1, "Pagi", 8, 8),
        create_shift(2, "Siang", 14, 8),
        create_shift(3, "Malam", 22, 8),
    ];
    let policy = ResolutionPolicy::default();

    c.bench_function("resolve_shift_three_entries", |b| {
        b.iter(|| resolve_shift(black_box(&roster), black_box(at(13, 45)), &policy))
    });
}

fn bench_calculate_duration(c: &mut Criterion) {
    let config = ConfigLoader::load("./config/jakarta")
        .expect("Failed to load config")
        .into_config();
    let schedule = BreakSchedule::from_config(&config.breaks);
    let shift = create_shift(1, "Pagi", 8, 8);
    let window = shift.window().unwrap();
    let breaks = schedule.breaks_for("Pagi", &window);

    c.bench_function("calculate_duration_with_break", |b| {
        b.iter(|| {
            calculate_duration(
                black_box(at(7, 55)),
                black_box(at(16, 0)),
                window.start,
                window.end,
                &breaks,
            )
        })
    });
}

fn bench_check_in_out_cycle(c: &mut Criterion) {
    c.bench_function("check_in_check_out_cycle", |b| {
        b.iter_batched(
            || create_engine(vec![create_shift(1, "Pagi", 8, 8)], at(7, 55)),
            |(engine, clock)| {
                let request = AttendanceRequest::new("emp_bench_001");
                let check_in = engine.check_in(&request).unwrap();
                clock.advance(Duration::minutes(8 * 60 + 10));
                let check_out = engine.check_out(&request).unwrap();
                black_box((check_in, check_out))
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_status_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("status_scaling");

    for count in [1, 2, 4, 8] {
        let (engine, _clock) = create_engine(create_roster(count), at(5, 45));
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("roster_entries", count), &count, |b, _| {
            b.iter(|| black_box(engine.status("emp_bench_001").unwrap()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_resolve_shift,
    bench_calculate_duration,
    bench_check_in_out_cycle,
    bench_status_scaling,
);
criterion_main!(benches);
