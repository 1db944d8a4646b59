//! The attendance state machine.
//!
//! [`AttendanceEngine`] validates and records check-in and check-out
//! transitions. Each employee's records move through
//! `NoSession -> Open -> Closed`, with these rules:
//!
//! - at most one open record per employee at any time
//! - an abandoned open record is auto-closed before a new check-in
//! - a shift that already has a closed record is not offered again
//! - the daily shift cap and the minimum gap between shifts are enforced
//! - check-in must fall inside the shift's tolerance window unless bypassed
//! - a repeated check-out amends the stored value and keeps a history
//!
//! All read-then-write sequences for one employee run under that
//! employee's lock, and the store refuses a second open record.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::calculation::{
    BreakSchedule, DurationResult, PerformanceScore, ResolutionPolicy, SelectedShift,
    ToleranceWindows, calculate_duration, cap_check_out, resolve_shift, resolve_tolerance,
};
use crate::config::EngineConfig;
use crate::error::{AttendanceError, EngineResult};
use crate::models::{AttendanceRecord, CheckoutAmendment, ScheduledShift, TimeWindow, WorkLocation};

use super::cache::NoopCache;
use super::geo::Coordinates;
use super::locks::EmployeeLocks;
use super::multi_shift::{closed_count_on, completed_shift_ids, last_check_out};
use super::ports::{
    AttendanceStore, CacheKey, CachePurpose, CachedValue, Clock, EngineCache, GeoValidator,
    RosterSource, WorkLocationSource,
};

/// An inbound check-in or check-out request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AttendanceRequest {
    /// The employee making the request.
    pub employee_id: String,
    /// Reported GPS position, if any.
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    /// Skip tolerance window validation (degraded-GPS fallback flows).
    #[serde(default)]
    pub bypass_tolerance: bool,
    /// Skip the geolocation gate.
    #[serde(default)]
    pub bypass_geolocation: bool,
}

impl AttendanceRequest {
    /// Creates a request for `employee_id` without coordinates or bypasses.
    pub fn new(employee_id: impl Into<String>) -> Self {
        Self {
            employee_id: employee_id.into(),
            ..Self::default()
        }
    }

    /// Attaches a reported GPS position.
    pub fn at(mut self, latitude: f64, longitude: f64) -> Self {
        self.coordinates = Some(Coordinates::new(latitude, longitude));
        self
    }

    /// Skips tolerance window validation.
    pub fn with_tolerance_bypass(mut self) -> Self {
        self.bypass_tolerance = true;
        self
    }

    /// Skips the geolocation gate.
    pub fn with_geolocation_bypass(mut self) -> Self {
        self.bypass_geolocation = true;
        self
    }
}

/// The result of an accepted check-in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckInOutcome {
    /// The newly opened record.
    pub record: AttendanceRecord,
    /// The shift the check-in was matched to.
    pub selected: SelectedShift,
    /// The tolerance windows in force.
    pub tolerance: ToleranceWindows,
    /// Stale sessions that were auto-closed before the check-in.
    pub auto_closed: Vec<AttendanceRecord>,
}

/// The result of an accepted check-out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckOutOutcome {
    /// The closed record as stored.
    pub record: AttendanceRecord,
    /// The raw instant of the request.
    pub requested_at: NaiveDateTime,
    /// True when the stored check-out differs from the requested instant.
    pub capped: bool,
    /// True when a previously stored check-out was replaced.
    pub amended: bool,
    /// True when the request came after the check-out tolerance window.
    pub late: bool,
}

impl CheckOutOutcome {
    /// Returns the duration metrics stored on the record.
    pub fn duration(&self) -> Option<&DurationResult> {
        self.record.duration.as_ref()
    }

    /// Returns the performance score stored on the record.
    pub fn score(&self) -> Option<&PerformanceScore> {
        self.record.score.as_ref()
    }
}

/// Validates and records attendance transitions.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use attendance_engine::attendance::{
///     AttendanceEngine, AttendanceRequest, FixedClock, InMemoryAttendanceStore, InMemoryRoster,
///     InMemoryWorkLocations,
/// };
/// use attendance_engine::config::EngineConfig;
/// use attendance_engine::models::{ScheduleStatus, ScheduledShift, ShiftTemplate};
/// use chrono::{NaiveDate, NaiveTime};
/// use rust_decimal::Decimal;
///
/// let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
/// let roster = InMemoryRoster::with_shifts(vec![ScheduledShift {
///     id: "roster_001".to_string(),
///     employee_id: "emp_001".to_string(),
///     date,
///     template: Some(ShiftTemplate {
///         id: "tpl_pagi".to_string(),
///         name: "Pagi".to_string(),
///         start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
///         end_time: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
///         duration_hours: Decimal::new(8, 0),
///     }),
///     role: None,
///     unit: None,
///     status: ScheduleStatus::Active,
/// }]);
/// let clock = Arc::new(FixedClock::new(date.and_hms_opt(7, 35, 0).unwrap()));
///
/// let engine = AttendanceEngine::new(
///     EngineConfig::default(),
///     clock.clone(),
///     Arc::new(roster),
///     Arc::new(InMemoryWorkLocations::new()),
///     Arc::new(InMemoryAttendanceStore::new()),
/// );
///
/// let checked_in = engine.check_in(&AttendanceRequest::new("emp_001")).unwrap();
/// assert!(checked_in.record.is_open());
///
/// clock.set(date.and_hms_opt(16, 5, 0).unwrap());
/// let checked_out = engine.check_out(&AttendanceRequest::new("emp_001")).unwrap();
/// assert_eq!(checked_out.record.check_out, Some(date.and_hms_opt(16, 0, 0).unwrap()));
/// assert!(checked_out.capped);
/// ```
pub struct AttendanceEngine {
    config: EngineConfig,
    policy: ResolutionPolicy,
    breaks: BreakSchedule,
    clock: Arc<dyn Clock>,
    roster: Arc<dyn RosterSource>,
    locations: Arc<dyn WorkLocationSource>,
    store: Arc<dyn AttendanceStore>,
    cache: Arc<dyn EngineCache>,
    geo: Option<Arc<dyn GeoValidator>>,
    locks: EmployeeLocks,
}

impl AttendanceEngine {
    /// Creates an engine without a lookup cache or geolocation gate.
    pub fn new(
        config: EngineConfig,
        clock: Arc<dyn Clock>,
        roster: Arc<dyn RosterSource>,
        locations: Arc<dyn WorkLocationSource>,
        store: Arc<dyn AttendanceStore>,
    ) -> Self {
        let policy = config.resolution_policy();
        let breaks = BreakSchedule::from_config(&config.breaks);
        Self {
            config,
            policy,
            breaks,
            clock,
            roster,
            locations,
            store,
            cache: Arc::new(NoopCache),
            geo: None,
            locks: EmployeeLocks::default(),
        }
    }

    /// Caches roster and location lookups in `cache`.
    pub fn with_cache(mut self, cache: Arc<dyn EngineCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Requires requests to pass `validator` unless they bypass geolocation.
    pub fn with_geo_validator(mut self, validator: Arc<dyn GeoValidator>) -> Self {
        self.geo = Some(validator);
        self
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the current instant according to the engine's clock.
    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// Checks the employee in to the shift resolved for the current instant.
    ///
    /// # Errors
    ///
    /// - [`AttendanceError::InvalidCoordinates`] / [`AttendanceError::OutsideWorkLocation`]
    ///   when the location gate fails
    /// - [`AttendanceError::AlreadyOpenSession`] when a non-stale open record exists
    /// - [`AttendanceError::DuplicateShiftSession`] when that open record is for the
    ///   shift that would be resolved now
    /// - [`AttendanceError::NoScheduleToday`] / [`AttendanceError::NoValidShiftToday`]
    /// - [`AttendanceError::MaxShiftsReached`], [`AttendanceError::ShiftGapNotElapsed`],
    ///   [`AttendanceError::AllShiftsCompleted`]
    /// - [`AttendanceError::CheckInTooEarly`] / [`AttendanceError::CheckInTooLate`]
    ///   unless tolerance is bypassed
    /// - [`AttendanceError::Storage`] when a collaborator fails
    pub fn check_in(&self, request: &AttendanceRequest) -> EngineResult<CheckInOutcome> {
        let now = self.clock.now();
        self.try_check_in(request, now).inspect_err(|error| {
            warn!(
                employee_id = %request.employee_id,
                code = error.code(),
                error = %error,
                "Check-in rejected"
            );
        })
    }

    /// Checks the employee out of their open record, or amends today's
    /// most recent closed record.
    ///
    /// The stored check-out is capped at the shift end and never precedes
    /// the check-in.
    ///
    /// # Errors
    ///
    /// - [`AttendanceError::InvalidCoordinates`] / [`AttendanceError::OutsideWorkLocation`]
    ///   when the location gate fails
    /// - [`AttendanceError::NotCheckedIn`] when there is nothing to close or amend
    /// - [`AttendanceError::CheckoutTooEarly`] unless tolerance is bypassed
    /// - [`AttendanceError::Storage`] when a collaborator fails
    pub fn check_out(&self, request: &AttendanceRequest) -> EngineResult<CheckOutOutcome> {
        let now = self.clock.now();
        self.try_check_out(request, now).inspect_err(|error| {
            warn!(
                employee_id = %request.employee_id,
                code = error.code(),
                error = %error,
                "Check-out rejected"
            );
        })
    }

    /// Auto-closes the employee's abandoned open records.
    ///
    /// A record is abandoned when it is dated before today or has been open
    /// longer than `stale_session_hours`, unless its shift (plus check-out
    /// tolerance) is still running. Returns the records that were closed.
    pub fn repair_stale_sessions(&self, employee_id: &str) -> EngineResult<Vec<AttendanceRecord>> {
        let now = self.clock.now();
        let location = self.work_location(employee_id, now.date())?;
        let tolerance = resolve_tolerance(location.as_ref());

        let handle = self.locks.handle(employee_id);
        let _guard = handle.lock();
        self.close_stale_sessions(employee_id, now, &tolerance)
    }

    /// Drops every cached lookup for the employee.
    pub fn invalidate_cache(&self, employee_id: &str) {
        self.cache.invalidate_employee(employee_id);
        info!(employee_id, "Attendance lookups invalidated");
    }

    fn try_check_in(
        &self,
        request: &AttendanceRequest,
        now: NaiveDateTime,
    ) -> EngineResult<CheckInOutcome> {
        let employee_id = request.employee_id.as_str();
        let today = now.date();

        let location = self.work_location(employee_id, today)?;
        self.enforce_location(request, location.as_ref())?;
        let tolerance = resolve_tolerance(location.as_ref());

        let handle = self.locks.handle(employee_id);
        let _guard = handle.lock();

        let roster = self.roster_at(employee_id, now, &tolerance)?;
        let auto_closed = self.close_stale_sessions(employee_id, now, &tolerance)?;

        if let Some(open) = self.store.open_records(employee_id)?.pop() {
            return Err(self.open_session_conflict(&open, &roster, now));
        }
        if roster.is_empty() {
            return Err(AttendanceError::NoScheduleToday { date: today });
        }

        let records = self.records_around(employee_id, today)?;
        if closed_count_on(&records, today) >= self.config.max_shifts_per_day {
            return Err(AttendanceError::MaxShiftsReached {
                employee_id: employee_id.to_string(),
                date: today,
                max_shifts: self.config.max_shifts_per_day,
            });
        }
        if let Some(last) = last_check_out(&records) {
            let opens_at = last + Duration::minutes(self.config.min_shift_gap_minutes);
            if now < opens_at {
                return Err(AttendanceError::ShiftGapNotElapsed {
                    employee_id: employee_id.to_string(),
                    opens_at,
                });
            }
        }

        let completed = completed_shift_ids(&records);
        let candidates: Vec<ScheduledShift> = roster
            .iter()
            .filter(|s| !completed.contains(s.id.as_str()))
            .cloned()
            .collect();
        if candidates.is_empty() {
            return Err(AttendanceError::AllShiftsCompleted {
                employee_id: employee_id.to_string(),
                date: today,
            });
        }

        let selected = resolve_shift(&candidates, now, &self.policy)?;
        if request.bypass_tolerance {
            info!(
                employee_id,
                shift_id = %selected.shift.id,
                "Check-in tolerance bypassed"
            );
        } else {
            validate_check_in_time(&selected, &tolerance, now)?;
        }

        let record = AttendanceRecord::open(
            employee_id,
            selected.shift.date,
            Some(selected.shift.id.clone()),
            now,
        );
        self.store.insert(record.clone())?;

        info!(
            employee_id,
            shift_id = %selected.shift.id,
            record_id = %record.id,
            match_kind = ?selected.match_kind,
            check_in = %now,
            "Check-in recorded"
        );

        Ok(CheckInOutcome {
            record,
            selected,
            tolerance,
            auto_closed,
        })
    }

    fn try_check_out(
        &self,
        request: &AttendanceRequest,
        now: NaiveDateTime,
    ) -> EngineResult<CheckOutOutcome> {
        let employee_id = request.employee_id.as_str();
        let today = now.date();

        let location = self.work_location(employee_id, today)?;
        self.enforce_location(request, location.as_ref())?;
        let tolerance = resolve_tolerance(location.as_ref());

        let handle = self.locks.handle(employee_id);
        let _guard = handle.lock();

        let records = self.records_around(employee_id, today)?;
        let not_checked_in = || AttendanceError::NotCheckedIn {
            employee_id: employee_id.to_string(),
        };
        let mut record = checkout_target(&records, today).ok_or_else(not_checked_in)?;
        let check_in = record.check_in.ok_or_else(not_checked_in)?;

        let shift = self.shift_for_record(&record)?;
        let window = shift.as_ref().and_then(ScheduledShift::window);

        let stored = match window {
            Some(window) => {
                if !request.bypass_tolerance {
                    let allowed_from = tolerance.earliest_check_out(&window);
                    if now < allowed_from {
                        return Err(AttendanceError::CheckoutTooEarly {
                            shift_id: record.scheduled_shift_id.clone().unwrap_or_default(),
                            allowed_from,
                        });
                    }
                }
                cap_check_out(now, window.end).max(check_in)
            }
            None => {
                warn!(
                    employee_id,
                    record_id = %record.id,
                    "Checking out a record whose shift cannot be resolved"
                );
                now.max(check_in)
            }
        };
        let capped = stored != now;
        let late = window.is_some_and(|w| now > tolerance.latest_check_out(&w));

        let amended = match record.check_out {
            Some(previous) if previous == stored => {
                debug!(
                    employee_id,
                    record_id = %record.id,
                    "Repeated check-out left the record unchanged"
                );
                return Ok(CheckOutOutcome {
                    record,
                    requested_at: now,
                    capped,
                    amended: false,
                    late,
                });
            }
            Some(previous) => {
                record.checkout_history.push(CheckoutAmendment {
                    previous_check_out: previous,
                    new_check_out: stored,
                    requested_at: now,
                });
                true
            }
            None => false,
        };

        record.check_out = Some(stored);
        record.auto_closed = false;
        if let (Some(shift), Some(window)) = (shift.as_ref(), window) {
            let duration = self.measure(shift, &window, check_in, stored);
            record.score = Some(duration.score());
            record.duration = Some(duration);
        }
        self.store.update(&record)?;

        info!(
            employee_id,
            record_id = %record.id,
            check_out = %stored,
            capped,
            amended,
            status = %record.performance_status(),
            "Check-out recorded"
        );

        Ok(CheckOutOutcome {
            record,
            requested_at: now,
            capped,
            amended,
            late,
        })
    }

    /// Validates coordinates and runs the geolocation gate, if configured.
    fn enforce_location(
        &self,
        request: &AttendanceRequest,
        location: Option<&WorkLocation>,
    ) -> EngineResult<()> {
        if let Some(coordinates) = request.coordinates {
            coordinates.validate()?;
        }
        let Some(validator) = &self.geo else {
            return Ok(());
        };
        if request.bypass_geolocation {
            debug!(employee_id = %request.employee_id, "Geolocation gate bypassed");
            return Ok(());
        }

        let coordinates = request
            .coordinates
            .ok_or(AttendanceError::InvalidCoordinates {
                latitude: None,
                longitude: None,
            })?;
        let check = validator.validate(coordinates, location);
        if check.passed {
            Ok(())
        } else {
            Err(AttendanceError::OutsideWorkLocation {
                message: check.message,
            })
        }
    }

    /// Picks the error for a check-in blocked by an open record.
    fn open_session_conflict(
        &self,
        open: &AttendanceRecord,
        roster: &[ScheduledShift],
        now: NaiveDateTime,
    ) -> AttendanceError {
        match resolve_shift(roster, now, &self.policy) {
            Ok(selected) if open.is_for_shift(&selected.shift.id) => {
                AttendanceError::DuplicateShiftSession {
                    employee_id: open.employee_id.clone(),
                    shift_id: selected.shift.id,
                }
            }
            _ => AttendanceError::AlreadyOpenSession {
                employee_id: open.employee_id.clone(),
                record_id: open.id,
            },
        }
    }

    pub(super) fn close_stale_sessions(
        &self,
        employee_id: &str,
        now: NaiveDateTime,
        tolerance: &ToleranceWindows,
    ) -> EngineResult<Vec<AttendanceRecord>> {
        let mut closed = Vec::new();
        for record in self.store.open_records(employee_id)? {
            let shift = self.shift_for_record(&record)?;
            if self.is_stale(&record, shift.as_ref(), now, tolerance) {
                closed.push(self.auto_close(record, shift.as_ref())?);
            }
        }
        Ok(closed)
    }

    /// True when an open record is abandoned and should be auto-closed.
    pub(super) fn is_stale(
        &self,
        record: &AttendanceRecord,
        shift: Option<&ScheduledShift>,
        now: NaiveDateTime,
        tolerance: &ToleranceWindows,
    ) -> bool {
        let Some(open_for) = record.open_for(now) else {
            return false;
        };
        let expired = record.date < now.date()
            || open_for > Duration::hours(self.config.stale_session_hours);
        if !expired {
            return false;
        }
        let still_running = shift
            .and_then(ScheduledShift::window)
            .is_some_and(|w| now <= tolerance.latest_check_out(&w));
        !still_running
    }

    fn auto_close(
        &self,
        mut record: AttendanceRecord,
        shift: Option<&ScheduledShift>,
    ) -> EngineResult<AttendanceRecord> {
        let Some(check_in) = record.check_in else {
            return Ok(record);
        };
        let window = shift.and_then(ScheduledShift::window);

        let mut close_at = auto_close_time(check_in, self.config.auto_close_hours);
        if let Some(window) = window {
            close_at = cap_check_out(close_at, window.end).max(check_in);
        }

        record.check_out = Some(close_at);
        record.auto_closed = true;
        if let (Some(shift), Some(window)) = (shift, window) {
            let duration = self.measure(shift, &window, check_in, close_at);
            record.score = Some(duration.score());
            record.duration = Some(duration);
        }
        self.store.update(&record)?;

        warn!(
            employee_id = %record.employee_id,
            record_id = %record.id,
            check_in = %check_in,
            check_out = %close_at,
            "Auto-closed stale attendance session"
        );
        Ok(record)
    }

    fn measure(
        &self,
        shift: &ScheduledShift,
        window: &TimeWindow,
        check_in: NaiveDateTime,
        check_out: NaiveDateTime,
    ) -> DurationResult {
        let name = shift.template.as_ref().map_or("", |t| t.name.as_str());
        let breaks = self.breaks.breaks_for(name, window);
        calculate_duration(check_in, check_out, window.start, window.end, &breaks)
    }

    /// The employee's records dated the day before `day` and `day`.
    pub(super) fn records_around(
        &self,
        employee_id: &str,
        day: NaiveDate,
    ) -> EngineResult<Vec<AttendanceRecord>> {
        self.store
            .records_between(employee_id, previous_day(day), day)
    }

    pub(super) fn open_records(&self, employee_id: &str) -> EngineResult<Vec<AttendanceRecord>> {
        self.store.open_records(employee_id)
    }

    /// Returns the roster entry a record was matched to, if still active.
    pub(super) fn shift_for_record(
        &self,
        record: &AttendanceRecord,
    ) -> EngineResult<Option<ScheduledShift>> {
        let Some(shift_id) = record.scheduled_shift_id.as_deref() else {
            return Ok(None);
        };
        Ok(self
            .roster_for(&record.employee_id, record.date)?
            .into_iter()
            .find(|s| s.id == shift_id))
    }

    /// Active roster entries relevant to `day`: those dated `day` plus the
    /// previous day's overnight entries, in roster order.
    pub(super) fn roster_for(
        &self,
        employee_id: &str,
        day: NaiveDate,
    ) -> EngineResult<Vec<ScheduledShift>> {
        let key = CacheKey::new(employee_id, day, CachePurpose::Roster);
        if let Some(CachedValue::Roster(shifts)) = self.cache.get(&key) {
            return Ok(shifts);
        }

        let previous = previous_day(day);
        let shifts: Vec<ScheduledShift> = self
            .roster
            .scheduled_shifts(employee_id, previous, day)?
            .into_iter()
            .filter(|s| s.is_active())
            .filter(|s| s.date == day || (s.date == previous && s.is_overnight()))
            .collect();

        self.cache.put(key, CachedValue::Roster(shifts.clone()));
        Ok(shifts)
    }

    /// Roster entries that can still take an attendance event at `now`:
    /// every entry dated today, plus previous-day overnight entries whose
    /// check-out window has not yet closed.
    pub(super) fn roster_at(
        &self,
        employee_id: &str,
        now: NaiveDateTime,
        tolerance: &ToleranceWindows,
    ) -> EngineResult<Vec<ScheduledShift>> {
        let today = now.date();
        Ok(self
            .roster_for(employee_id, today)?
            .into_iter()
            .filter(|s| {
                s.date == today
                    || s.window()
                        .is_some_and(|w| now <= tolerance.latest_check_out(&w))
            })
            .collect())
    }

    /// The employee's work location, falling back to the default location.
    pub(super) fn work_location(
        &self,
        employee_id: &str,
        day: NaiveDate,
    ) -> EngineResult<Option<WorkLocation>> {
        let key = CacheKey::new(employee_id, day, CachePurpose::WorkLocation);
        if let Some(CachedValue::WorkLocation(location)) = self.cache.get(&key) {
            return Ok(location);
        }

        let location = match self.locations.location_for_employee(employee_id)? {
            Some(location) => Some(location),
            None => self.locations.default_location()?,
        };

        self.cache
            .put(key, CachedValue::WorkLocation(location.clone()));
        Ok(location)
    }
}

/// Returns the check-out assigned to an auto-closed session: `auto_close_hours`
/// after check-in, but no later than the end of the check-in day.
///
/// # Examples
///
/// ```
/// use attendance_engine::attendance::auto_close_time;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
///
/// let morning = date.and_hms_opt(7, 55, 0).unwrap();
/// assert_eq!(auto_close_time(morning, 8), date.and_hms_opt(15, 55, 0).unwrap());
///
/// let evening = date.and_hms_opt(21, 45, 0).unwrap();
/// assert_eq!(auto_close_time(evening, 8), date.and_hms_opt(23, 59, 59).unwrap());
/// ```
pub fn auto_close_time(check_in: NaiveDateTime, auto_close_hours: i64) -> NaiveDateTime {
    let end_of_day =
        check_in.date().and_time(NaiveTime::MIN) + Duration::days(1) - Duration::seconds(1);
    (check_in + Duration::hours(auto_close_hours)).min(end_of_day)
}

fn previous_day(day: NaiveDate) -> NaiveDate {
    day.pred_opt().unwrap_or(day)
}

fn validate_check_in_time(
    selected: &SelectedShift,
    tolerance: &ToleranceWindows,
    now: NaiveDateTime,
) -> EngineResult<()> {
    let window = tolerance.check_in_window(&selected.window);
    if now < window.start {
        Err(AttendanceError::CheckInTooEarly {
            shift_id: selected.shift.id.clone(),
            opens_at: window.start,
        })
    } else if now > window.end {
        Err(AttendanceError::CheckInTooLate {
            shift_id: selected.shift.id.clone(),
            closed_at: window.end,
        })
    } else {
        Ok(())
    }
}

/// The most recent open record, else today's most recent closed record.
fn checkout_target(records: &[AttendanceRecord], today: NaiveDate) -> Option<AttendanceRecord> {
    records
        .iter()
        .filter(|r| r.is_open())
        .max_by_key(|r| r.check_in)
        .or_else(|| {
            records
                .iter()
                .filter(|r| {
                    r.is_closed()
                        && (r.date == today || r.check_out.is_some_and(|c| c.date() == today))
                })
                .max_by_key(|r| r.check_in)
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::memory::{InMemoryAttendanceStore, InMemoryRoster, InMemoryWorkLocations};
    use crate::attendance::FixedClock;
    use crate::models::ShiftTemplate;
    use rust_decimal::Decimal;

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn make_datetime(date_str: &str, time_str: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date_str, time_str), "%Y-%m-%d %H:%M:%S")
            .unwrap()
    }

    fn make_shift(id: &str, date: &str, start: &str, end: &str) -> ScheduledShift {
        ScheduledShift {
            id: id.to_string(),
            employee_id: "emp_001".to_string(),
            date: make_date(date),
            template: Some(ShiftTemplate {
                id: format!("tpl_{}", id),
                name: id.to_string(),
                start_time: NaiveTime::parse_from_str(start, "%H:%M:%S").unwrap(),
                end_time: NaiveTime::parse_from_str(end, "%H:%M:%S").unwrap(),
                duration_hours: Decimal::new(8, 0),
            }),
            role: None,
            unit: None,
            status: Default::default(),
        }
    }

    fn engine(shifts: Vec<ScheduledShift>, now: NaiveDateTime) -> (AttendanceEngine, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(now));
        let engine = AttendanceEngine::new(
            EngineConfig::default(),
            clock.clone(),
            Arc::new(InMemoryRoster::with_shifts(shifts)),
            Arc::new(InMemoryWorkLocations::new()),
            Arc::new(InMemoryAttendanceStore::new()),
        );
        (engine, clock)
    }

    /// SM-001: auto-close time is capped at the end of the check-in day
    #[test]
    fn test_sm_001_auto_close_time() {
        assert_eq!(
            auto_close_time(make_datetime("2026-01-15", "10:00:00"), 8),
            make_datetime("2026-01-15", "18:00:00")
        );
        assert_eq!(
            auto_close_time(make_datetime("2026-01-15", "20:00:00"), 8),
            make_datetime("2026-01-15", "23:59:59")
        );
    }

    /// SM-002: checkout target prefers an open record over closed ones
    #[test]
    fn test_sm_002_checkout_target_prefers_open() {
        let today = make_date("2026-01-15");
        let mut closed = AttendanceRecord::open(
            "emp_001",
            today,
            Some("pagi".to_string()),
            make_datetime("2026-01-15", "08:00:00"),
        );
        closed.check_out = Some(make_datetime("2026-01-15", "12:00:00"));
        let open = AttendanceRecord::open(
            "emp_001",
            today,
            Some("siang".to_string()),
            make_datetime("2026-01-15", "13:00:00"),
        );

        let target = checkout_target(&[closed.clone(), open.clone()], today).unwrap();
        assert_eq!(target.id, open.id);

        let target = checkout_target(&[closed.clone()], today).unwrap();
        assert_eq!(target.id, closed.id);

        assert!(checkout_target(&[closed], make_date("2026-01-16")).is_none());
    }

    /// SM-003: an overnight record closed after midnight can still be amended
    #[test]
    fn test_sm_003_checkout_target_overnight_closed_today() {
        let mut overnight = AttendanceRecord::open(
            "emp_001",
            make_date("2026-01-15"),
            Some("malam".to_string()),
            make_datetime("2026-01-15", "22:00:00"),
        );
        overnight.check_out = Some(make_datetime("2026-01-16", "06:00:00"));

        assert!(checkout_target(&[overnight], make_date("2026-01-16")).is_some());
    }

    /// SM-004: prior-day open record is stale unless its shift is still running
    #[test]
    fn test_sm_004_staleness() {
        let malam = make_shift("malam", "2026-01-15", "22:00:00", "06:00:00");
        let (engine, _) = engine(vec![malam.clone()], make_datetime("2026-01-16", "02:00:00"));
        let tolerance = ToleranceWindows::default();
        let record = AttendanceRecord::open(
            "emp_001",
            make_date("2026-01-15"),
            Some("malam".to_string()),
            make_datetime("2026-01-15", "21:45:00"),
        );

        let running = make_datetime("2026-01-16", "02:00:00");
        assert!(!engine.is_stale(&record, Some(&malam), running, &tolerance));

        let after_checkout_window = make_datetime("2026-01-16", "07:01:00");
        assert!(engine.is_stale(&record, Some(&malam), after_checkout_window, &tolerance));

        assert!(engine.is_stale(&record, None, running, &tolerance));
    }

    /// SM-005: same-day record becomes stale only after the stale threshold
    #[test]
    fn test_sm_005_same_day_threshold() {
        let (engine, _) = engine(vec![], make_datetime("2026-01-15", "08:00:00"));
        let tolerance = ToleranceWindows::default();
        let record = AttendanceRecord::open(
            "emp_001",
            make_date("2026-01-15"),
            None,
            make_datetime("2026-01-15", "00:10:00"),
        );

        assert!(!engine.is_stale(&record, None, make_datetime("2026-01-15", "23:00:00"), &tolerance));
    }

    /// SM-006: roster lookup includes the previous day's overnight entries only
    #[test]
    fn test_sm_006_roster_includes_previous_overnight() {
        let shifts = vec![
            make_shift("pagi_kemarin", "2026-01-14", "08:00:00", "16:00:00"),
            make_shift("malam_kemarin", "2026-01-14", "22:00:00", "06:00:00"),
            make_shift("pagi", "2026-01-15", "08:00:00", "16:00:00"),
        ];
        let (engine, _) = engine(shifts, make_datetime("2026-01-15", "08:00:00"));

        let roster = engine.roster_for("emp_001", make_date("2026-01-15")).unwrap();
        let ids: Vec<&str> = roster.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["malam_kemarin", "pagi"]);
    }

    /// SM-007: a finished overnight entry from yesterday is not today's schedule
    #[test]
    fn test_sm_007_roster_at_drops_finished_overnight() {
        let shifts = vec![make_shift("malam_kemarin", "2026-01-14", "22:00:00", "06:00:00")];
        let (engine, _) = engine(shifts, make_datetime("2026-01-15", "10:00:00"));
        let tolerance = ToleranceWindows::default();

        let running = engine
            .roster_at("emp_001", make_datetime("2026-01-15", "05:30:00"), &tolerance)
            .unwrap();
        assert_eq!(running.len(), 1);

        let in_checkout_window = engine
            .roster_at("emp_001", make_datetime("2026-01-15", "07:00:00"), &tolerance)
            .unwrap();
        assert_eq!(in_checkout_window.len(), 1);

        let finished = engine
            .roster_at("emp_001", make_datetime("2026-01-15", "07:01:00"), &tolerance)
            .unwrap();
        assert!(finished.is_empty());
    }

    #[test]
    fn test_request_builders() {
        let request = AttendanceRequest::new("emp_001")
            .at(-6.2, 106.8)
            .with_tolerance_bypass()
            .with_geolocation_bypass();
        assert_eq!(request.coordinates, Some(Coordinates::new(-6.2, 106.8)));
        assert!(request.bypass_tolerance);
        assert!(request.bypass_geolocation);
    }
}
