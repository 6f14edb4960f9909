use crate::flight_control::common::Degrees;
use crate::{debug, error};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Servo angle that leaves both control surfaces level.
pub const NEUTRAL_ANGLE_D: Degrees = 90.0;

/// A rejected actuator command. The previous output stays in effect.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    OutOfRange,
    Hardware,
}

impl std::error::Error for ActuatorError {}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServoSide {
    Left,
    Right,
}

/// Sink for the two control-surface angles, in absolute servo degrees.
pub trait Actuator {
    fn set_left(&mut self, angle_d: Degrees) -> Result<(), ActuatorError>;
    fn set_right(&mut self, angle_d: Degrees) -> Result<(), ActuatorError>;

    /// Moves both surfaces to the neutral position.
    fn center(&mut self) -> Result<(), ActuatorError> {
        self.set_left(NEUTRAL_ANGLE_D)?;
        self.set_right(NEUTRAL_ANGLE_D)
    }
}

impl<A: Actuator + ?Sized> Actuator for Box<A> {
    fn set_left(&mut self, angle_d: Degrees) -> Result<(), ActuatorError> { (**self).set_left(angle_d) }
    fn set_right(&mut self, angle_d: Degrees) -> Result<(), ActuatorError> { (**self).set_right(angle_d) }
}

/// Raw PWM writer, e.g. a GPIO pin driven in mark-space mode.
///
/// The pin is held high for `duty` out of every `cycle_length` units.
pub trait PwmOutput {
    fn write_duty(&mut self, side: ServoSide, duty: u32, cycle_length: u32) -> Result<(), ActuatorError>;
}

/// Pulse widths a single servo needs for the ends of its travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServoCalibration {
    pub min_pulse_us: u32,
    pub max_pulse_us: u32,
}

impl Default for ServoCalibration {
    fn default() -> Self { Self { min_pulse_us: 1000, max_pulse_us: 1800 } }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServoConfiguration {
    pub hertz: u32,
    /// Number of units one PWM cycle is divided into.
    pub duty_multiplier: u32,
    /// Angle reached at `min_pulse_us`.
    pub min_angle_d: Degrees,
    /// Angle reached at `max_pulse_us`.
    pub max_angle_d: Degrees,
    pub left: ServoCalibration,
    pub right: ServoCalibration,
    pub left_pin: u8,
    pub right_pin: u8,
}

impl Default for ServoConfiguration {
    fn default() -> Self {
        Self {
            hertz: 50,
            duty_multiplier: 20_000,
            min_angle_d: 45.0,
            max_angle_d: 135.0,
            left: ServoCalibration::default(),
            right: ServoCalibration::default(),
            left_pin: 12,
            right_pin: 13,
        }
    }
}

impl ServoConfiguration {
    pub fn cycle_length_us(&self) -> u32 { 1_000_000 / self.hertz.max(1) }

    pub fn calibration(&self, side: ServoSide) -> ServoCalibration {
        match side {
            ServoSide::Left => self.left,
            ServoSide::Right => self.right,
        }
    }

    pub fn accepts(&self, angle_d: Degrees) -> bool {
        angle_d.is_finite() && (self.min_angle_d..=self.max_angle_d).contains(&angle_d)
    }
}

/// Converts a pulse width into the duty count for one PWM cycle.
///
/// # Arguments
/// - `pulse_us`: Time the signal is held high, in microseconds.
/// - `hertz`: PWM frequency.
/// - `multiplier`: Number of units one cycle is divided into.
///
/// # Returns
/// - `pulse_us * multiplier / cycle_us` in integer arithmetic.
#[allow(clippy::cast_possible_truncation)]
pub fn duty_cycle_for_us(pulse_us: u32, hertz: u32, multiplier: u32) -> u32 {
    let cycle_us = u64::from(1_000_000 / hertz.max(1)).max(1);
    (u64::from(pulse_us) * u64::from(multiplier) / cycle_us) as u32
}

/// The two aileron servos driven through a [`PwmOutput`].
///
/// Remembers the last accepted angle per side; rejected commands change
/// neither that memory nor the PWM output.
pub struct ServoPair<P: PwmOutput> {
    pwm: P,
    config: ServoConfiguration,
    left_d: Option<Degrees>,
    right_d: Option<Degrees>,
}

impl<P: PwmOutput> ServoPair<P> {
    pub fn new(pwm: P, config: ServoConfiguration) -> Self {
        Self { pwm, config, left_d: None, right_d: None }
    }

    pub fn left_angle(&self) -> Option<Degrees> { self.left_d }

    pub fn right_angle(&self) -> Option<Degrees> { self.right_d }

    pub fn pwm(&self) -> &P { &self.pwm }

    /// Linear pulse width for `angle_d` on the given side.
    ///
    /// # Errors
    /// - [`ActuatorError::OutOfRange`] if the angle is outside the servo envelope.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn pulse_for(&self, side: ServoSide, angle_d: Degrees) -> Result<u32, ActuatorError> {
        if !self.config.accepts(angle_d) {
            return Err(ActuatorError::OutOfRange);
        }
        let cal = self.config.calibration(side);
        let span_d = f64::from(self.config.max_angle_d - self.config.min_angle_d);
        let fraction = f64::from(angle_d - self.config.min_angle_d) / span_d;
        let span_us = f64::from(cal.max_pulse_us) - f64::from(cal.min_pulse_us);
        Ok((f64::from(cal.min_pulse_us) + fraction * span_us).round() as u32)
    }

    fn set(&mut self, side: ServoSide, angle_d: Degrees) -> Result<(), ActuatorError> {
        let pulse_us = self.pulse_for(side, angle_d).inspect_err(|_| {
            error!("Rejected {side} servo angle {angle_d:.1}°");
        })?;
        let duty = duty_cycle_for_us(pulse_us, self.config.hertz, self.config.duty_multiplier);
        self.pwm.write_duty(side, duty, self.config.duty_multiplier)?;
        debug!("{side} servo {angle_d:.1}° -> {pulse_us}us duty {duty}");
        match side {
            ServoSide::Left => self.left_d = Some(angle_d),
            ServoSide::Right => self.right_d = Some(angle_d),
        }
        Ok(())
    }
}

impl<P: PwmOutput> Actuator for ServoPair<P> {
    fn set_left(&mut self, angle_d: Degrees) -> Result<(), ActuatorError> { self.set(ServoSide::Left, angle_d) }

    fn set_right(&mut self, angle_d: Degrees) -> Result<(), ActuatorError> { self.set(ServoSide::Right, angle_d) }
}
