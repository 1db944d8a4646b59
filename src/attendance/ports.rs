//! Port interfaces for the attendance engine.
//!
//! These traits define the boundaries between the engine and the
//! collaborators it relies on: the clock, the roster, work locations,
//! attendance storage, the optional geolocation gate and the lookup cache.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::{AttendanceRecord, ScheduledShift, WorkLocation};

use super::geo::Coordinates;

/// Supplies the current instant in the engine's civil timezone.
pub trait Clock: Send + Sync {
    /// Returns the current local date and time.
    fn now(&self) -> NaiveDateTime;
}

/// Source of scheduled shifts (roster entries).
pub trait RosterSource: Send + Sync {
    /// Returns the employee's roster entries dated within `[from, to]`,
    /// each joined to its shift template where one exists.
    fn scheduled_shifts(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<ScheduledShift>>;
}

/// Source of work locations.
pub trait WorkLocationSource: Send + Sync {
    /// Returns the location assigned to the employee, if any.
    fn location_for_employee(&self, employee_id: &str) -> EngineResult<Option<WorkLocation>>;

    /// Returns the default (first active) location, if any.
    fn default_location(&self) -> EngineResult<Option<WorkLocation>>;
}

/// Persistence for attendance records.
///
/// Implementations must enforce the open-session uniqueness constraint in
/// [`AttendanceStore::insert`]: inserting an open record for an employee
/// who already has one fails with
/// [`AttendanceError::AlreadyOpenSession`](crate::error::AttendanceError::AlreadyOpenSession)
/// and leaves the store unchanged.
pub trait AttendanceStore: Send + Sync {
    /// Returns the employee's records dated within `[from, to]`, ordered by check-in.
    fn records_between(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<AttendanceRecord>>;

    /// Returns every open record of the employee, ordered by check-in.
    fn open_records(&self, employee_id: &str) -> EngineResult<Vec<AttendanceRecord>>;

    /// Inserts a new record.
    fn insert(&self, record: AttendanceRecord) -> EngineResult<()>;

    /// Replaces an existing record with the same id.
    fn update(&self, record: &AttendanceRecord) -> EngineResult<()>;
}

/// Outcome of a geolocation check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoCheck {
    /// Whether the check passed.
    pub passed: bool,
    /// Human-readable explanation.
    pub message: String,
}

/// External pass/fail gate for GPS and radius checks.
pub trait GeoValidator: Send + Sync {
    /// Checks `coordinates` against the employee's work location.
    fn validate(&self, coordinates: Coordinates, location: Option<&WorkLocation>) -> GeoCheck;
}

/// What a cached lookup was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePurpose {
    /// Roster entries relevant to the day (the day and its previous day).
    Roster,
    /// The employee's work location.
    WorkLocation,
}

/// Key of a cached lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// The employee the lookup was for.
    pub employee_id: String,
    /// The calendar day the lookup was for.
    pub date: NaiveDate,
    /// What the lookup was for.
    pub purpose: CachePurpose,
}

impl CacheKey {
    /// Creates a cache key.
    pub fn new(employee_id: impl Into<String>, date: NaiveDate, purpose: CachePurpose) -> Self {
        Self {
            employee_id: employee_id.into(),
            date,
            purpose,
        }
    }
}

/// A cached lookup result.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    /// Roster entries.
    Roster(Vec<ScheduledShift>),
    /// A work location lookup, including "none assigned".
    WorkLocation(Option<WorkLocation>),
}

/// Short-lived cache for roster and location lookups.
///
/// Attendance records are never cached. Invalidation is controlled by the
/// caller, typically after a roster or location change.
pub trait EngineCache: Send + Sync {
    /// Returns the cached value for `key`, if present and fresh.
    fn get(&self, key: &CacheKey) -> Option<CachedValue>;

    /// Stores `value` under `key`.
    fn put(&self, key: CacheKey, value: CachedValue);

    /// Removes the entry for `key`.
    fn invalidate(&self, key: &CacheKey);

    /// Removes every entry for the employee.
    fn invalidate_employee(&self, employee_id: &str);
}
