pub(crate) mod geo_point;
pub(crate) mod geometry;
pub(crate) mod math;

pub use geo_point::{Coordinate, Degrees, GeoPoint, Meters, Radians};
pub use geometry::{BearingFormula, DistanceFormula, Navigator, angle_to};
