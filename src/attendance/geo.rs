//! Coordinates and the radius-based geolocation gate.

use serde::{Deserialize, Serialize};

use crate::error::{AttendanceError, EngineResult};
use crate::models::WorkLocation;

use super::ports::{GeoCheck, GeoValidator};

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A GPS position reported with an attendance event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Coordinates {
    /// Creates coordinates without validating them.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns true if both values are finite and within range.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Returns the coordinates if valid.
    ///
    /// # Errors
    ///
    /// Returns [`AttendanceError::InvalidCoordinates`] when a value is not
    /// finite or out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use attendance_engine::attendance::Coordinates;
    ///
    /// assert!(Coordinates::new(-6.2, 106.8).validate().is_ok());
    /// assert!(Coordinates::new(91.0, 106.8).validate().is_err());
    /// assert!(Coordinates::new(f64::NAN, 106.8).validate().is_err());
    /// ```
    pub fn validate(self) -> EngineResult<Self> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(AttendanceError::InvalidCoordinates {
                latitude: Some(self.latitude),
                longitude: Some(self.longitude),
            })
        }
    }

    /// Great-circle distance to `other` in meters (haversine formula).
    pub fn distance_meters(&self, other: &Coordinates) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_METERS * a.sqrt().asin()
    }
}

impl From<&WorkLocation> for Coordinates {
    fn from(location: &WorkLocation) -> Self {
        Self::new(location.latitude, location.longitude)
    }
}

/// Passes when the reported position lies within the work location's radius.
///
/// Fails closed: a missing or inactive location never passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RadiusGeoValidator;

impl GeoValidator for RadiusGeoValidator {
    fn validate(&self, coordinates: Coordinates, location: Option<&WorkLocation>) -> GeoCheck {
        let Some(location) = location.filter(|l| l.is_active) else {
            return GeoCheck {
                passed: false,
                message: "Lokasi kerja Anda belum ditentukan.".to_string(),
            };
        };

        let distance = coordinates.distance_meters(&Coordinates::from(location));
        if distance <= location.radius_meters {
            GeoCheck {
                passed: true,
                message: format!("Anda berada di area {}.", location.name),
            }
        } else {
            GeoCheck {
                passed: false,
                message: format!(
                    "Anda berada {:.0} m dari {} (maksimal {:.0} m).",
                    distance, location.name, location.radius_meters
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn klinik() -> WorkLocation {
        WorkLocation {
            id: "loc_001".to_string(),
            name: "Klinik Utama".to_string(),
            latitude: -6.2000,
            longitude: 106.8166,
            radius_meters: 100.0,
            checkin_before_shift_minutes: None,
            late_tolerance_minutes: None,
            checkout_after_shift_minutes: None,
            early_departure_tolerance_minutes: None,
            tolerance_settings: None,
            is_active: true,
        }
    }

    #[test]
    fn test_out_of_range_coordinates_are_rejected() {
        assert!(!Coordinates::new(0.0, 180.5).is_valid());
        assert!(!Coordinates::new(-90.1, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, f64::INFINITY).is_valid());
        assert!(Coordinates::new(-90.0, 180.0).is_valid());

        match Coordinates::new(100.0, 0.0).validate() {
            Err(AttendanceError::InvalidCoordinates { latitude, .. }) => {
                assert_eq!(latitude, Some(100.0));
            }
            other => panic!("Expected InvalidCoordinates, got {:?}", other),
        }
    }

    #[test]
    fn test_distance_of_one_degree_latitude() {
        let a = Coordinates::new(0.0, 0.0);
        let b = Coordinates::new(1.0, 0.0);
        let distance = a.distance_meters(&b);
        assert!((distance - 111_195.0).abs() < 10.0, "distance was {distance}");
        assert_eq!(a.distance_meters(&a), 0.0);
    }

    #[test]
    fn test_inside_radius_passes() {
        let location = klinik();
        // Roughly 55 m north of the clinic.
        let check = RadiusGeoValidator.validate(Coordinates::new(-6.1995, 106.8166), Some(&location));
        assert!(check.passed);
        assert_eq!(check.message, "Anda berada di area Klinik Utama.");
    }

    #[test]
    fn test_outside_radius_fails_with_distance() {
        let location = klinik();
        let check = RadiusGeoValidator.validate(Coordinates::new(-6.2100, 106.8166), Some(&location));
        assert!(!check.passed);
        assert!(check.message.contains("Klinik Utama"));
        assert!(check.message.contains("maksimal 100 m"));
    }

    #[test]
    fn test_missing_or_inactive_location_fails() {
        let coordinates = Coordinates::new(-6.2, 106.8166);
        assert!(!RadiusGeoValidator.validate(coordinates, None).passed);

        let mut location = klinik();
        location.is_active = false;
        assert!(!RadiusGeoValidator.validate(coordinates, Some(&location)).passed);
    }
}
