use super::actuator::{Actuator, ActuatorError, NEUTRAL_ANGLE_D};
use crate::debug;
use crate::flight_control::{
    common::{
        Degrees, GeoPoint, Navigator, Radians, angle_to,
        math::{clamp, clamp_symmetric},
    },
    configuration::Configuration,
    orientation::Orientation,
};
use strum_macros::Display;

/// Gains and limits of the proportional steering law, in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringGains {
    pub roll: f32,
    pub pitch: f32,
    pub target_roll: f32,
    pub max_target_roll: Radians,
    pub max_pitch_adjustment: Radians,
    pub max_offset: Radians,
    pub deadband: Radians,
}

impl SteeringGains {
    pub fn from_config(config: &Configuration) -> Self {
        Self {
            roll: config.proportional_roll_multiplier,
            pitch: config.proportional_pitch_multiplier,
            target_roll: config.proportional_target_roll_multiplier,
            max_target_roll: config.max_target_roll_d.to_radians(),
            max_pitch_adjustment: config.max_servo_pitch_adjustment_d.to_radians(),
            max_offset: config.max_servo_angle_offset_d.to_radians(),
            deadband: config.steering_deadband_d.to_radians(),
        }
    }
}

/// Attitude at the time of the last command that reached the actuators.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControllerMemory {
    pub roll: Radians,
    pub pitch: Radians,
}

/// Surface offsets from neutral produced by one evaluation of the control law.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceOffsets {
    pub left: Radians,
    pub right: Radians,
}

impl SurfaceOffsets {
    /// Absolute servo angles for these offsets.
    pub fn servo_angles(&self) -> (Degrees, Degrees) {
        (NEUTRAL_ANGLE_D + self.left.to_degrees(), NEUTRAL_ANGLE_D + self.right.to_degrees())
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq)]
pub enum SteeringOutcome {
    /// Attitude moved less than the deadband since the last command.
    Held,
    Applied { left_d: Degrees, right_d: Degrees },
}

/// Proportional roll/pitch controller for the two ailerons.
#[derive(Debug, Clone)]
pub struct SteeringController {
    gains: SteeringGains,
    memory: Option<ControllerMemory>,
}

impl SteeringController {
    pub fn new(config: &Configuration) -> Self { Self::with_gains(SteeringGains::from_config(config)) }

    pub fn with_gains(gains: SteeringGains) -> Self { Self { gains, memory: None } }

    pub fn gains(&self) -> &SteeringGains { &self.gains }

    /// Attitude of the last applied command, `None` before the first one.
    pub fn memory(&self) -> Option<ControllerMemory> { self.memory }

    /// Forgets the last command so the next call always reaches the actuators.
    pub fn reset(&mut self) { self.memory = None; }

    /// Evaluates the control law without touching any state.
    ///
    /// # Arguments
    /// - `orientation`: Current attitude estimate.
    /// - `target_roll`: Desired roll, positive to the right.
    /// - `target_pitch`: Desired pitch, positive nose up.
    ///
    /// # Returns
    /// - Left and right offsets from neutral, each within the configured maximum.
    pub fn offsets(&self, orientation: &Orientation, target_roll: Radians, target_pitch: Radians) -> SurfaceOffsets {
        let g = &self.gains;
        let roll_command = (orientation.roll - target_roll) * g.roll;
        let pitch_adjustment =
            clamp_symmetric((target_pitch - orientation.pitch) * g.pitch, g.max_pitch_adjustment);
        SurfaceOffsets {
            left: clamp_symmetric(roll_command - pitch_adjustment, g.max_offset),
            right: clamp_symmetric(roll_command + pitch_adjustment, g.max_offset),
        }
    }

    fn within_deadband(&self, orientation: &Orientation) -> bool {
        self.memory.is_some_and(|m| {
            (m.roll - orientation.roll).abs() + (m.pitch - orientation.pitch).abs() < self.gains.deadband
        })
    }

    /// Commands the actuators toward the targets unless the attitude is still
    /// within the deadband of the last command.
    ///
    /// # Errors
    /// - [`ActuatorError`] if either side rejects its angle. The deadband
    ///   memory is left as it was so the next cycle tries again.
    pub fn steer<A: Actuator + ?Sized>(
        &mut self,
        orientation: &Orientation,
        target_roll: Radians,
        target_pitch: Radians,
        actuator: &mut A,
    ) -> Result<SteeringOutcome, ActuatorError> {
        let offsets = self.offsets(orientation, target_roll, target_pitch);
        debug!(
            "{orientation} target roll {:.1}° pitch {:.1}° offsets {:.1}° {:.1}°",
            target_roll.to_degrees(),
            target_pitch.to_degrees(),
            offsets.left.to_degrees(),
            offsets.right.to_degrees()
        );
        if self.within_deadband(orientation) {
            return Ok(SteeringOutcome::Held);
        }
        let (left_d, right_d) = offsets.servo_angles();
        actuator.set_left(left_d)?;
        actuator.set_right(right_d)?;
        self.memory = Some(ControllerMemory { roll: orientation.roll, pitch: orientation.pitch });
        Ok(SteeringOutcome::Applied { left_d, right_d })
    }

    /// Roll that turns the airframe from `yaw` toward `goal_heading`.
    pub fn target_roll_for_heading(&self, yaw: Radians, goal_heading: Radians) -> Radians {
        let correction = angle_to(yaw, goal_heading) * self.gains.target_roll;
        clamp(correction, -self.gains.max_target_roll, self.gains.max_target_roll)
    }

    /// Roll that turns the airframe from `yaw` toward `waypoint` as seen from `position`.
    pub fn target_roll_toward(
        &self,
        yaw: Radians,
        position: &GeoPoint,
        waypoint: &GeoPoint,
        navigator: &Navigator,
    ) -> Radians {
        self.target_roll_for_heading(yaw, navigator.bearing(position, waypoint))
    }
}
