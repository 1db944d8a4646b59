//! Stateful attendance handling.
//!
//! This module holds the attendance state machine ([`AttendanceEngine`]),
//! multi-shift availability ([`MultiShiftStatus`]) and the ports the engine
//! consumes, together with in-memory, clock, cache and geolocation adapters.

mod cache;
mod clock;
mod engine;
mod geo;
mod locks;
mod memory;
mod multi_shift;
mod ports;

pub use cache::{MokaEngineCache, NoopCache};
pub use clock::{FixedClock, SystemClock};
pub use engine::{
    AttendanceEngine, AttendanceRequest, CheckInOutcome, CheckOutOutcome, auto_close_time,
};
pub use geo::{Coordinates, EARTH_RADIUS_METERS, RadiusGeoValidator};
pub use memory::{InMemoryAttendanceStore, InMemoryRoster, InMemoryWorkLocations};
pub use multi_shift::{MultiShiftStatus, ShiftAvailability, StatusContext, evaluate_status};
pub use ports::{
    AttendanceStore, CacheKey, CachePurpose, CachedValue, Clock, EngineCache, GeoCheck,
    GeoValidator, RosterSource, WorkLocationSource,
};
