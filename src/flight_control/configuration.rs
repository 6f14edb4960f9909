use super::{
    common::{BearingFormula, Degrees, DistanceFormula, GeoPoint, Meters, Navigator},
    orientation::HardIronCalibration,
    steering::{NEUTRAL_ANGLE_D, ServoConfiguration},
};
use crate::warn;
use chrono::TimeDelta;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use strum_macros::Display;

/// Reasons a configuration is refused at startup.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The reached distance must be positive and below the in-range distance.
    WaypointThresholds,
    EmptyWaypointList,
    /// A servo's minimum pulse is not below its maximum.
    ServoPulseRange,
    /// The servo envelope does not contain neutral, or the maximum offset leaves it.
    ServoAngleEnvelope,
    PwmTiming,
    NonFiniteValue,
}

impl std::error::Error for ConfigurationError {}

/// Every tunable of the flight controller.
///
/// `Default` holds the values flown at the Wonderland Lake field. Angles are
/// in degrees and distances in meters; components convert on construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub distance_formula: DistanceFormula,
    pub bearing_formula: BearingFormula,
    pub waypoint_reached_distance_m: Meters,
    pub waypoint_in_range_distance_m: Meters,
    pub waypoint_in_range_samples: u32,
    /// Flown to if the route is unusable.
    pub default_waypoint: GeoPoint,
    pub lead_in_waypoints: Vec<GeoPoint>,
    pub repeating_waypoints: Vec<GeoPoint>,

    pub pitch_offset_d: Degrees,
    pub roll_offset_d: Degrees,
    /// 180 if the sensor board is mounted backwards.
    pub yaw_mount_offset_d: Degrees,
    pub declination_d: Degrees,
    pub hard_iron: HardIronCalibration,

    pub proportional_roll_multiplier: f32,
    pub proportional_pitch_multiplier: f32,
    pub proportional_target_roll_multiplier: f32,
    pub max_target_roll_d: Degrees,
    pub target_pitch_d: Degrees,
    pub max_servo_pitch_adjustment_d: Degrees,
    pub max_servo_angle_offset_d: Degrees,
    pub steering_deadband_d: Degrees,
    pub servo: ServoConfiguration,

    pub iteration_sleep: Duration,
    pub error_sleep: Duration,
    pub launch_glide_duration: Duration,
    pub land_no_move_duration: Duration,
    pub land_roll_threshold_d: Degrees,
    pub land_speed_threshold_mps: f64,

    /// Skip the flight lifecycle and only hold `test_heading_d` (or wings level).
    pub start_in_test_mode: bool,
    pub test_heading_d: Option<Degrees>,

    pub gps_tty: String,
    pub gps_baud_rate: u32,
    pub button_pin: u8,
}

impl Default for Configuration {
    fn default() -> Self {
        let wonderland_lake = vec![
            GeoPoint::surface(40.055_966, -105.290_124),
            GeoPoint::surface(40.055_994, -105.288_681),
            GeoPoint::surface(40.054_785, -105.289_467),
        ];
        Self {
            distance_formula: DistanceFormula::default(),
            bearing_formula: BearingFormula::default(),
            waypoint_reached_distance_m: 20.0,
            waypoint_in_range_distance_m: 100.0,
            waypoint_in_range_samples: 2,
            default_waypoint: wonderland_lake[0],
            lead_in_waypoints: Vec::new(),
            repeating_waypoints: wonderland_lake,
            pitch_offset_d: -5.2,
            roll_offset_d: 2.3,
            yaw_mount_offset_d: 0.0,
            declination_d: 8.1,
            hard_iron: HardIronCalibration::default(),
            proportional_roll_multiplier: 1.0,
            proportional_pitch_multiplier: 1.0,
            proportional_target_roll_multiplier: 0.5,
            max_target_roll_d: 30.0,
            target_pitch_d: -5.0,
            max_servo_pitch_adjustment_d: 10.0,
            max_servo_angle_offset_d: 40.0,
            steering_deadband_d: 4.0,
            servo: ServoConfiguration::default(),
            iteration_sleep: Duration::from_millis(100),
            error_sleep: Duration::from_millis(500),
            launch_glide_duration: Duration::from_secs(3),
            land_no_move_duration: Duration::from_secs(15),
            land_roll_threshold_d: 1.0,
            land_speed_threshold_mps: 0.1,
            start_in_test_mode: false,
            test_heading_d: None,
            gps_tty: String::from("/dev/ttyAMA0"),
            gps_baud_rate: 9600,
            button_pin: 17,
        }
    }
}

impl Configuration {
    pub fn launch_glide(&self) -> TimeDelta { to_time_delta(self.launch_glide_duration) }

    pub fn land_no_move(&self) -> TimeDelta { to_time_delta(self.land_no_move_duration) }

    /// All waypoints in flight order, wrapping once from the last repeating
    /// one back to the first.
    fn route_legs(&self) -> impl Iterator<Item = (&GeoPoint, &GeoPoint)> {
        let wrap = match self.repeating_waypoints.as_slice() {
            [first, .., last] => Some((last, first)),
            _ => None,
        };
        self.lead_in_waypoints.iter().chain(self.repeating_waypoints.iter()).tuple_windows::<(_, _)>().chain(wrap)
    }

    /// Checks the values that would make the controller misbehave.
    ///
    /// # Errors
    /// - The first [`ConfigurationError`] found.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let scalars = [
            self.proportional_roll_multiplier,
            self.proportional_pitch_multiplier,
            self.proportional_target_roll_multiplier,
            self.max_target_roll_d,
            self.target_pitch_d,
            self.max_servo_pitch_adjustment_d,
            self.max_servo_angle_offset_d,
            self.steering_deadband_d,
            self.pitch_offset_d,
            self.roll_offset_d,
            self.yaw_mount_offset_d,
            self.declination_d,
            self.land_roll_threshold_d,
        ];
        if scalars.iter().any(|v| !v.is_finite()) || self.test_heading_d.is_some_and(|h| !h.is_finite()) {
            return Err(ConfigurationError::NonFiniteValue);
        }
        let reached = self.waypoint_reached_distance_m;
        if !(reached > 0.0 && reached < self.waypoint_in_range_distance_m) {
            return Err(ConfigurationError::WaypointThresholds);
        }
        if self.repeating_waypoints.is_empty() {
            return Err(ConfigurationError::EmptyWaypointList);
        }
        let servo = &self.servo;
        if servo.hertz == 0 || servo.duty_multiplier == 0 || servo.hertz > 1_000_000 {
            return Err(ConfigurationError::PwmTiming);
        }
        if [servo.left, servo.right].iter().any(|c| c.min_pulse_us >= c.max_pulse_us) {
            return Err(ConfigurationError::ServoPulseRange);
        }
        let max_offset = self.max_servo_angle_offset_d;
        if max_offset < 0.0
            || !servo.accepts(NEUTRAL_ANGLE_D - max_offset)
            || !servo.accepts(NEUTRAL_ANGLE_D + max_offset)
        {
            return Err(ConfigurationError::ServoAngleEnvelope);
        }

        let navigator = Navigator::new(self.distance_formula, self.bearing_formula);
        for (a, b) in self.route_legs() {
            if navigator.distance(a, b) < reached {
                warn!("Waypoints {a} and {b} are closer than the reached distance of {reached}m");
            }
        }
        Ok(())
    }
}

fn to_time_delta(duration: Duration) -> TimeDelta { TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX) }
