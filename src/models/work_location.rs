//! Work location model.
//!
//! A work location carries the geofence (centre and radius) used by the
//! geolocation gate and the tolerance settings that widen or narrow the
//! check-in/check-out windows for shifts worked there.

use serde::{Deserialize, Serialize};

/// A clinic site an employee checks in at.
///
/// Tolerances may be stored as discrete minute columns or inside the
/// `tolerance_settings` JSON blob; discrete columns take precedence. See
/// [`crate::calculation::resolve_tolerance`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkLocation {
    /// Unique identifier for the location.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Latitude of the geofence centre in degrees.
    pub latitude: f64,
    /// Longitude of the geofence centre in degrees.
    pub longitude: f64,
    /// Geofence radius in meters.
    pub radius_meters: f64,
    /// Minutes before shift start a check-in is accepted.
    #[serde(default)]
    pub checkin_before_shift_minutes: Option<i64>,
    /// Minutes after shift start a check-in is still accepted.
    #[serde(default)]
    pub late_tolerance_minutes: Option<i64>,
    /// Minutes after shift end a check-out is still considered on time.
    #[serde(default)]
    pub checkout_after_shift_minutes: Option<i64>,
    /// Minutes before shift end a check-out is already accepted.
    #[serde(default)]
    pub early_departure_tolerance_minutes: Option<i64>,
    /// Free-form tolerance settings, either a JSON object or a string holding one.
    #[serde(default)]
    pub tolerance_settings: Option<serde_json::Value>,
    /// Whether the location is in use.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}
