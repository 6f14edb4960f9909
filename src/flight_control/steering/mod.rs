pub(crate) mod actuator;
pub(crate) mod controller;
#[cfg(test)]
mod tests;

pub use actuator::{
    Actuator, ActuatorError, NEUTRAL_ANGLE_D, PwmOutput, ServoConfiguration, ServoPair, ServoSide,
};
pub use controller::{SteeringController, SteeringOutcome};
