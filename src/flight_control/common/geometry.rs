use super::{
    geo_point::{GeoPoint, Meters, Radians},
    math::{wrap_pi, wrap_two_pi},
};
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::f64::consts::FRAC_PI_2;
use strum_macros::{Display, EnumIter};

/// Mean earth radius used by every formula in this module.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance using the haversine formula.
///
/// Reference implementation; the control loop uses the equirectangular
/// approximation, which agrees to well under a meter at glider ranges.
pub fn haversine_distance(a: &GeoPoint, b: &GeoPoint) -> Meters {
    let phi_1 = a.latitude_rad();
    let phi_2 = b.latitude_rad();
    let d_phi = phi_2 - phi_1;
    let d_lambda = b.longitude_rad() - a.longitude_rad();
    let h = (d_phi * 0.5).sin().powi(2) + phi_1.cos() * phi_2.cos() * (d_lambda * 0.5).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Great-circle distance using the spherical law of cosines.
pub fn spherical_law_of_cosines_distance(a: &GeoPoint, b: &GeoPoint) -> Meters {
    let phi_1 = a.latitude_rad();
    let phi_2 = b.latitude_rad();
    let d_lambda = b.longitude_rad() - a.longitude_rad();
    let cos_c = phi_1.sin() * phi_2.sin() + phi_1.cos() * phi_2.cos() * d_lambda.cos();
    // rounding can push identical points just past 1.0
    cos_c.clamp(-1.0, 1.0).acos() * EARTH_RADIUS_M
}

/// Signed north-south distance from `a` to `b`, positive northward.
pub fn north_distance(a: &GeoPoint, b: &GeoPoint) -> Meters {
    (b.latitude_rad() - a.latitude_rad()) * EARTH_RADIUS_M
}

/// Signed east-west distance from `a` to `b`, positive eastward, scaled by the
/// cosine of the mean latitude.
pub fn east_distance(a: &GeoPoint, b: &GeoPoint) -> Meters {
    let mean_phi = (a.latitude_rad() + b.latitude_rad()) * 0.5;
    (b.longitude_rad() - a.longitude_rad()) * mean_phi.cos() * EARTH_RADIUS_M
}

/// Distance between two points using the equirectangular approximation.
pub fn distance(a: &GeoPoint, b: &GeoPoint) -> Meters {
    north_distance(a, b).hypot(east_distance(a, b))
}

/// Compass bearing from `start` to `end`: 0 is true north, increasing
/// clockwise, in `[0, 2π)`.
pub fn bearing(start: &GeoPoint, end: &GeoPoint) -> Radians {
    bearing_from_components(north_distance(start, end), east_distance(start, end))
}

#[allow(clippy::cast_possible_truncation)]
fn bearing_from_components(north: Meters, east: Meters) -> Radians {
    // atan2 runs counter-clockwise from east
    let theta = north.atan2(east);
    wrap_two_pi((FRAC_PI_2 - theta) as Radians)
}

/// Precomputed `cos(mean latitude) * radius`, the expensive part of the
/// equirectangular east-west distance.
///
/// Valid as long as the points it is used with stay near the latitude it was
/// created for, which holds for a glider flying a few kilometers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LongitudeFactor {
    meters_per_radian: f64,
}

impl LongitudeFactor {
    pub fn new(a: &GeoPoint, b: &GeoPoint) -> Self {
        let mean_phi = (a.latitude_rad() + b.latitude_rad()) * 0.5;
        Self { meters_per_radian: mean_phi.cos() * EARTH_RADIUS_M }
    }

    pub fn meters_per_radian(&self) -> f64 { self.meters_per_radian }

    pub fn east_distance(&self, a: &GeoPoint, b: &GeoPoint) -> Meters {
        (b.longitude_rad() - a.longitude_rad()) * self.meters_per_radian
    }

    pub fn distance(&self, a: &GeoPoint, b: &GeoPoint) -> Meters {
        north_distance(a, b).hypot(self.east_distance(a, b))
    }

    pub fn bearing(&self, start: &GeoPoint, end: &GeoPoint) -> Radians {
        bearing_from_components(north_distance(start, end), self.east_distance(start, end))
    }
}

/// Computes the longitude factor for a reference pair of points.
pub fn cached_longitude_factor(a: &GeoPoint, b: &GeoPoint) -> LongitudeFactor {
    LongitudeFactor::new(a, b)
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Display, EnumIter)]
pub enum TurnDirection {
    Left,
    Right,
    Straight,
    UTurn,
}

/// Direction to turn from `current_heading` to point at `end` when at `start`.
///
/// Exact zeros are rare with floating point: headings that point straight at
/// or away from the target usually come back as `Left` or `Right`.
pub fn turn_direction(current_heading: Radians, start: &GeoPoint, end: &GeoPoint) -> TurnDirection {
    let to_east = east_distance(start, end);
    let to_north = north_distance(start, end);
    let heading = f64::from(current_heading);
    let (head_east, head_north) = (heading.sin(), heading.cos());

    let cross = to_east * head_north - to_north * head_east;
    if cross < 0.0 {
        return TurnDirection::Left;
    }
    if cross > 0.0 {
        return TurnDirection::Right;
    }
    let dot = to_east * head_east + to_north * head_north;
    if dot > 0.0 { TurnDirection::Straight } else { TurnDirection::UTurn }
}

/// Signed shortest rotation from `current` to `goal` in `(-π, π]`, positive
/// when `goal` lies clockwise of `current`.
pub fn angle_to(current: Radians, goal: Radians) -> Radians { wrap_pi(goal - current) }

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Display, EnumIter, Serialize, Deserialize)]
pub enum DistanceFormula {
    Haversine,
    SphericalLawOfCosines,
    Equirectangular,
    #[default]
    CachedEquirectangular,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Display, EnumIter, Serialize, Deserialize)]
pub enum BearingFormula {
    Equirectangular,
    #[default]
    CachedEquirectangular,
}

/// Distance and bearing calculator with the formulas chosen in the configuration.
///
/// The first cached call pins the reference latitude for the rest of the flight.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    distance_formula: DistanceFormula,
    bearing_formula: BearingFormula,
    factor: OnceCell<LongitudeFactor>,
}

impl Navigator {
    pub fn new(distance_formula: DistanceFormula, bearing_formula: BearingFormula) -> Self {
        Self { distance_formula, bearing_formula, factor: OnceCell::new() }
    }

    fn factor(&self, a: &GeoPoint, b: &GeoPoint) -> LongitudeFactor {
        *self.factor.get_or_init(|| cached_longitude_factor(a, b))
    }

    pub fn reference_factor(&self) -> Option<LongitudeFactor> { self.factor.get().copied() }

    pub fn distance(&self, a: &GeoPoint, b: &GeoPoint) -> Meters {
        match self.distance_formula {
            DistanceFormula::Haversine => haversine_distance(a, b),
            DistanceFormula::SphericalLawOfCosines => spherical_law_of_cosines_distance(a, b),
            DistanceFormula::Equirectangular => distance(a, b),
            DistanceFormula::CachedEquirectangular => self.factor(a, b).distance(a, b),
        }
    }

    pub fn bearing(&self, start: &GeoPoint, end: &GeoPoint) -> Radians {
        match self.bearing_formula {
            BearingFormula::Equirectangular => bearing(start, end),
            BearingFormula::CachedEquirectangular => self.factor(start, end).bearing(start, end),
        }
    }
}
