use crate::flight_control::{
    common::{GeoPoint, Meters, Navigator},
    configuration::Configuration,
};
use crate::{error, info};
use strum_macros::Display;

/// Distance reported before the first measurement toward a waypoint.
const FAR_AWAY_M: Meters = 1_000_000.0;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum NavigationError {
    WaypointIndexInvalid,
}

impl std::error::Error for NavigationError {}

/// Arrival thresholds of the sequencer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrivalThresholds {
    /// Anything closer counts as arrived immediately.
    pub reached: Meters,
    /// Closest approach is only considered once inside this distance.
    pub in_range: Meters,
    /// In-range samples needed before a closest approach counts.
    pub min_in_range_samples: u32,
}

impl ArrivalThresholds {
    pub fn from_config(config: &Configuration) -> Self {
        Self {
            reached: config.waypoint_reached_distance_m,
            in_range: config.waypoint_in_range_distance_m,
            min_in_range_samples: config.waypoint_in_range_samples,
        }
    }
}

/// Walks a one-shot lead-in list and then cycles through the repeating list.
///
/// Arrival is either being within the reached distance or, once within the
/// in-range distance, the first fix that is further away than the one before.
#[derive(Debug, Clone)]
pub struct WaypointSequencer {
    lead_in: Vec<GeoPoint>,
    repeating: Vec<GeoPoint>,
    fallback: GeoPoint,
    thresholds: ArrivalThresholds,
    navigator: Navigator,
    index: usize,
    in_range: bool,
    in_range_samples: u32,
    previous_distance: Meters,
}

impl WaypointSequencer {
    pub fn new(
        lead_in: Vec<GeoPoint>,
        repeating: Vec<GeoPoint>,
        fallback: GeoPoint,
        thresholds: ArrivalThresholds,
        navigator: Navigator,
    ) -> Self {
        Self {
            lead_in,
            repeating,
            fallback,
            thresholds,
            navigator,
            index: 0,
            in_range: false,
            in_range_samples: 0,
            previous_distance: FAR_AWAY_M,
        }
    }

    pub fn from_config(config: &Configuration) -> Self {
        Self::new(
            config.lead_in_waypoints.clone(),
            config.repeating_waypoints.clone(),
            config.default_waypoint,
            ArrivalThresholds::from_config(config),
            Navigator::new(config.distance_formula, config.bearing_formula),
        )
    }

    pub fn index(&self) -> usize { self.index }

    pub fn is_in_range(&self) -> bool { self.in_range }

    pub fn previous_distance(&self) -> Meters { self.previous_distance }

    pub fn navigator(&self) -> &Navigator { &self.navigator }

    fn total_len(&self) -> usize { self.lead_in.len() + self.repeating.len() }

    /// The active waypoint.
    ///
    /// # Errors
    /// - [`NavigationError::WaypointIndexInvalid`] if there is no waypoint to
    ///   fly to at the active index.
    pub fn try_current(&self) -> Result<GeoPoint, NavigationError> {
        if let Some(point) = self.lead_in.get(self.index) {
            return Ok(*point);
        }
        if self.repeating.is_empty() {
            return Err(NavigationError::WaypointIndexInvalid);
        }
        let offset = (self.index - self.lead_in.len()) % self.repeating.len();
        self.repeating.get(offset).copied().ok_or(NavigationError::WaypointIndexInvalid)
    }

    /// The active waypoint, or the fallback point if the index is unusable.
    pub fn current(&self) -> GeoPoint {
        self.try_current().unwrap_or_else(|e| {
            error!("{e} at index {}, flying to {}", self.index, self.fallback);
            self.fallback
        })
    }

    /// Moves to the next waypoint, wrapping into the repeating list.
    pub fn advance(&mut self) {
        self.index += 1;
        if self.index >= self.total_len() {
            self.index = self.lead_in.len();
        }
        self.in_range = false;
        self.in_range_samples = 0;
        self.previous_distance = FAR_AWAY_M;
    }

    /// Checks whether `position` counts as having arrived at the active waypoint.
    pub fn arrived(&mut self, position: &GeoPoint) -> bool {
        let target = self.current();
        let distance = self.navigator.distance(position, &target);
        if distance < self.thresholds.reached {
            return true;
        }
        if self.in_range
            && self.in_range_samples >= self.thresholds.min_in_range_samples
            && distance > self.previous_distance
        {
            return true;
        }
        self.previous_distance = distance;
        if distance < self.thresholds.in_range {
            self.in_range = true;
            self.in_range_samples = self.in_range_samples.saturating_add(1);
        }
        false
    }

    /// Advances if `position` has arrived, returning whether it did.
    pub fn update(&mut self, position: &GeoPoint) -> bool {
        if !self.arrived(position) {
            return false;
        }
        let reached = self.current();
        self.advance();
        info!("Reached waypoint {reached}, next is #{} {}", self.index, self.current());
        true
    }
}
