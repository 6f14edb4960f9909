use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Latitude or longitude in degrees. Kept at `f64` for sub-meter resolution.
pub type Coordinate = f64;
/// Distances on the ground.
pub type Meters = f64;
/// Angles used for attitude and headings.
pub type Radians = f32;
/// Angles as configured or commanded to the servos.
pub type Degrees = f32;

/// A geographic position.
///
/// Immutable value type: fixes are replaced wholesale, never patched in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    latitude: Coordinate,
    /// Longitude in degrees, positive east.
    longitude: Coordinate,
    /// Altitude above mean sea level in meters.
    altitude: f32,
}

impl GeoPoint {
    pub const fn new(latitude: Coordinate, longitude: Coordinate, altitude: f32) -> Self {
        Self { latitude, longitude, altitude }
    }

    /// Creates a point on the surface, for waypoints that don't care about altitude.
    pub const fn surface(latitude: Coordinate, longitude: Coordinate) -> Self {
        Self::new(latitude, longitude, 0.0)
    }

    pub const fn latitude(&self) -> Coordinate { self.latitude }
    pub const fn longitude(&self) -> Coordinate { self.longitude }
    pub const fn altitude(&self) -> f32 { self.altitude }

    pub fn latitude_rad(&self) -> f64 { self.latitude.to_radians() }
    pub fn longitude_rad(&self) -> f64 { self.longitude.to_radians() }

    /// Returns a copy moved by the given offsets in degrees.
    pub fn offset_by(&self, d_lat: Coordinate, d_lon: Coordinate) -> Self {
        Self::new(self.latitude + d_lat, self.longitude + d_lon, self.altitude)
    }
}

impl Display for GeoPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:.6}, {:.6}, {:.1}m]", self.latitude, self.longitude, self.altitude)
    }
}
