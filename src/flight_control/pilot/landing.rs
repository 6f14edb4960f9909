use crate::flight_control::{
    common::Radians,
    configuration::Configuration,
    orientation::Orientation,
};
use chrono::{DateTime, TimeDelta, Utc};

/// Ground-speed evidence for a landing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    Moving,
    StationarySince(DateTime<Utc>),
}

/// Decides that the glider is on the ground once both its attitude and its
/// ground speed have been still for the configured duration.
#[derive(Debug, Clone)]
pub struct LandingDetector {
    roll_threshold: Radians,
    speed_threshold: f64,
    still_duration: TimeDelta,
    previous_roll: Option<Radians>,
    attitude_still_since: DateTime<Utc>,
    motion: MotionState,
}

impl LandingDetector {
    pub fn new(config: &Configuration, now: DateTime<Utc>) -> Self {
        Self {
            roll_threshold: config.land_roll_threshold_d.to_radians(),
            speed_threshold: config.land_speed_threshold_mps,
            still_duration: config.land_no_move(),
            previous_roll: None,
            attitude_still_since: now,
            motion: MotionState::Moving,
        }
    }

    /// Restarts both idle timers at `now`.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.previous_roll = None;
        self.attitude_still_since = now;
        self.motion = MotionState::Moving;
    }

    pub fn motion(&self) -> MotionState { self.motion }

    /// Feeds one cycle of evidence.
    ///
    /// # Arguments
    /// - `orientation`: This cycle's attitude.
    /// - `ground_speed`: This cycle's GPS ground speed in m/s.
    /// - `now`: Time of the cycle.
    ///
    /// # Returns
    /// - `true` if the glider has landed.
    pub fn update(&mut self, orientation: &Orientation, ground_speed: f64, now: DateTime<Utc>) -> bool {
        if self.previous_roll.is_some_and(|prev| (prev - orientation.roll).abs() > self.roll_threshold) {
            self.attitude_still_since = now;
        }
        self.previous_roll = Some(orientation.roll);
        let attitude_still = now - self.attitude_still_since > self.still_duration;

        self.motion = match self.motion {
            _ if ground_speed > self.speed_threshold => MotionState::Moving,
            MotionState::Moving => MotionState::StationarySince(now),
            still @ MotionState::StationarySince(_) => still,
        };
        let ground_still = matches!(
            self.motion,
            MotionState::StationarySince(since) if now - since > self.still_duration
        );
        attitude_still && ground_still
    }
}
