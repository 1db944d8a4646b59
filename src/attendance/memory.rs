//! In-memory adapters for the engine ports.
//!
//! Used by the test suites and by hosts embedding the engine without a
//! database. [`InMemoryAttendanceStore`] enforces the same open-session
//! uniqueness constraint a relational store would enforce with a partial
//! unique index.

use std::collections::HashMap;

use chrono::NaiveDate;
use parking_lot::RwLock;

use crate::error::{AttendanceError, EngineResult};
use crate::models::{AttendanceRecord, ScheduledShift, WorkLocation};

use super::ports::{AttendanceStore, RosterSource, WorkLocationSource};

/// Attendance records held in memory.
#[derive(Debug, Default)]
pub struct InMemoryAttendanceStore {
    records: RwLock<Vec<AttendanceRecord>>,
}

impl InMemoryAttendanceStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every stored record, in insertion order.
    pub fn snapshot(&self) -> Vec<AttendanceRecord> {
        self.records.read().clone()
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns true if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl AttendanceStore for InMemoryAttendanceStore {
    fn records_between(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<AttendanceRecord>> {
        let mut records: Vec<AttendanceRecord> = self
            .records
            .read()
            .iter()
            .filter(|r| r.employee_id == employee_id && r.date >= from && r.date <= to)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.check_in);
        Ok(records)
    }

    fn open_records(&self, employee_id: &str) -> EngineResult<Vec<AttendanceRecord>> {
        let mut records: Vec<AttendanceRecord> = self
            .records
            .read()
            .iter()
            .filter(|r| r.employee_id == employee_id && r.is_open())
            .cloned()
            .collect();
        records.sort_by_key(|r| r.check_in);
        Ok(records)
    }

    fn insert(&self, record: AttendanceRecord) -> EngineResult<()> {
        let mut records = self.records.write();
        if record.is_open() {
            if let Some(existing) = records
                .iter()
                .find(|r| r.employee_id == record.employee_id && r.is_open())
            {
                return Err(AttendanceError::AlreadyOpenSession {
                    employee_id: record.employee_id.clone(),
                    record_id: existing.id,
                });
            }
        }
        records.push(record);
        Ok(())
    }

    fn update(&self, record: &AttendanceRecord) -> EngineResult<()> {
        let mut records = self.records.write();
        let slot = records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or_else(|| AttendanceError::Storage {
                message: format!("attendance record {} not found", record.id),
            })?;
        *slot = record.clone();
        Ok(())
    }
}

/// Roster entries held in memory, returned in insertion (roster) order.
#[derive(Debug, Default)]
pub struct InMemoryRoster {
    shifts: RwLock<Vec<ScheduledShift>>,
}

impl InMemoryRoster {
    /// Creates an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a roster holding `shifts`.
    pub fn with_shifts(shifts: Vec<ScheduledShift>) -> Self {
        Self {
            shifts: RwLock::new(shifts),
        }
    }

    /// Appends a roster entry.
    pub fn add(&self, shift: ScheduledShift) {
        self.shifts.write().push(shift);
    }

    /// Removes the entry with `shift_id`, returning it if present.
    pub fn remove(&self, shift_id: &str) -> Option<ScheduledShift> {
        let mut shifts = self.shifts.write();
        let index = shifts.iter().position(|s| s.id == shift_id)?;
        Some(shifts.remove(index))
    }
}

impl RosterSource for InMemoryRoster {
    fn scheduled_shifts(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<ScheduledShift>> {
        Ok(self
            .shifts
            .read()
            .iter()
            .filter(|s| s.employee_id == employee_id && s.date >= from && s.date <= to)
            .cloned()
            .collect())
    }
}

/// Work locations and employee assignments held in memory.
#[derive(Debug, Default)]
pub struct InMemoryWorkLocations {
    locations: RwLock<Vec<WorkLocation>>,
    assignments: RwLock<HashMap<String, String>>,
}

impl InMemoryWorkLocations {
    /// Creates an empty location registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a location. The first active one is the default.
    pub fn add_location(&self, location: WorkLocation) {
        self.locations.write().push(location);
    }

    /// Assigns an employee to the location with `location_id`.
    pub fn assign(&self, employee_id: impl Into<String>, location_id: impl Into<String>) {
        self.assignments
            .write()
            .insert(employee_id.into(), location_id.into());
    }
}

impl WorkLocationSource for InMemoryWorkLocations {
    fn location_for_employee(&self, employee_id: &str) -> EngineResult<Option<WorkLocation>> {
        let assignments = self.assignments.read();
        let Some(location_id) = assignments.get(employee_id) else {
            return Ok(None);
        };
        Ok(self
            .locations
            .read()
            .iter()
            .find(|l| &l.id == location_id)
            .cloned())
    }

    fn default_location(&self) -> EngineResult<Option<WorkLocation>> {
        Ok(self.locations.read().iter().find(|l| l.is_active).cloned())
    }
}
