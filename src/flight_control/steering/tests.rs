use super::{
    Actuator, ActuatorError, NEUTRAL_ANGLE_D, PwmOutput, ServoConfiguration, ServoPair, ServoSide,
    SteeringController, SteeringOutcome, actuator::duty_cycle_for_us, controller::SteeringGains,
};
use crate::flight_control::{
    common::{GeoPoint, Navigator},
    orientation::Orientation,
};
use itertools::Itertools;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Command {
    Left(f32),
    Right(f32),
}

/// Records every accepted command; optionally rejects one side.
#[derive(Default)]
struct RecordingActuator {
    commands: Arc<Mutex<Vec<Command>>>,
    reject_right: bool,
}

impl RecordingActuator {
    fn calls(&self) -> Vec<Command> { self.commands.lock().unwrap().clone() }
}

impl Actuator for RecordingActuator {
    fn set_left(&mut self, angle_d: f32) -> Result<(), ActuatorError> {
        self.commands.lock().unwrap().push(Command::Left(angle_d));
        Ok(())
    }

    fn set_right(&mut self, angle_d: f32) -> Result<(), ActuatorError> {
        if self.reject_right {
            return Err(ActuatorError::Hardware);
        }
        self.commands.lock().unwrap().push(Command::Right(angle_d));
        Ok(())
    }
}

#[derive(Default)]
struct RecordingPwm {
    writes: Vec<(ServoSide, u32, u32)>,
}

impl PwmOutput for RecordingPwm {
    fn write_duty(&mut self, side: ServoSide, duty: u32, cycle_length: u32) -> Result<(), ActuatorError> {
        self.writes.push((side, duty, cycle_length));
        Ok(())
    }
}

fn gains() -> SteeringGains {
    SteeringGains {
        roll: 1.0,
        pitch: 1.0,
        target_roll: 0.5,
        max_target_roll: 30f32.to_radians(),
        max_pitch_adjustment: 10f32.to_radians(),
        max_offset: 40f32.to_radians(),
        deadband: 4f32.to_radians(),
    }
}

fn attitude(pitch_d: f32, roll_d: f32) -> Orientation {
    Orientation::new(pitch_d.to_radians(), roll_d.to_radians(), 0.0)
}

fn assert_close(actual: f32, expected: f32) {
    assert!((actual - expected).abs() < 1e-3, "{actual} != {expected}");
}

#[test]
fn test_level_flight_centers_surfaces() {
    let controller = SteeringController::with_gains(gains());
    let (left, right) = controller.offsets(&attitude(0.0, 0.0), 0.0, 0.0).servo_angles();
    assert_close(left, NEUTRAL_ANGLE_D);
    assert_close(right, NEUTRAL_ANGLE_D);
}

#[test]
fn test_roll_moves_both_surfaces_together() {
    let controller = SteeringController::with_gains(gains());
    let offsets = controller.offsets(&attitude(0.0, 10.0), 0.0, 0.0);
    assert_close(offsets.left.to_degrees(), 10.0);
    assert_close(offsets.right.to_degrees(), 10.0);
}

#[test]
fn test_pitch_trim_is_differential_and_clamped() {
    let controller = SteeringController::with_gains(gains());
    let offsets = controller.offsets(&attitude(-5.0, 0.0), 0.0, 0.0);
    assert_close(offsets.left.to_degrees(), -5.0);
    assert_close(offsets.right.to_degrees(), 5.0);
    // 25° of pitch error is limited to the 10° adjustment
    let offsets = controller.offsets(&attitude(-25.0, 0.0), 0.0, 0.0);
    assert_close(offsets.left.to_degrees(), -10.0);
    assert_close(offsets.right.to_degrees(), 10.0);
}

#[test]
fn test_offsets_never_exceed_limit() {
    let controller = SteeringController::with_gains(gains());
    let angles = (-180..=180).step_by(15).map(|d| d as f32);
    for (pitch, roll, target) in angles.clone().cartesian_product(angles.clone()).cartesian_product(angles)
        .map(|((p, r), t)| (p, r, t))
    {
        let o = controller.offsets(&attitude(pitch, roll), target.to_radians(), 0.0);
        assert!(o.left.abs() <= 40f32.to_radians() + 1e-6, "{pitch} {roll} {target}");
        assert!(o.right.abs() <= 40f32.to_radians() + 1e-6, "{pitch} {roll} {target}");
    }
}

#[test]
fn test_deadband_suppresses_small_changes() {
    let mut controller = SteeringController::with_gains(gains());
    let mut actuator = RecordingActuator::default();
    let first = controller.steer(&attitude(0.0, 0.0), 0.0, 0.0, &mut actuator);
    assert!(matches!(first, Ok(SteeringOutcome::Applied { .. })));
    assert_eq!(actuator.calls().len(), 2);
    actuator.commands.lock().unwrap().clear();

    let second = controller.steer(&attitude(1.0, 2.0), 0.0, 0.0, &mut actuator);
    assert_eq!(second, Ok(SteeringOutcome::Held));
    assert!(actuator.calls().is_empty());

    let third = controller.steer(&attitude(1.0, 6.0), 0.0, 0.0, &mut actuator);
    assert!(matches!(third, Ok(SteeringOutcome::Applied { .. })));
    let calls = actuator.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(calls[0], Command::Left(_)));
    assert!(matches!(calls[1], Command::Right(_)));
}

#[test]
fn test_deadband_measures_from_last_applied_command() {
    let mut controller = SteeringController::with_gains(gains());
    let mut actuator = RecordingActuator::default();
    assert!(controller.steer(&attitude(0.0, 0.0), 0.0, 0.0, &mut actuator).is_ok());
    // slow drift below the deadband per step still triggers once it adds up
    let outcomes = (1..=5)
        .map(|roll| controller.steer(&attitude(0.0, roll as f32), 0.0, 0.0, &mut actuator))
        .collect_vec();
    assert_eq!(outcomes[..3], [Ok(SteeringOutcome::Held); 3]);
    assert!(matches!(outcomes[3], Ok(SteeringOutcome::Applied { .. })));
    assert_eq!(outcomes[4], Ok(SteeringOutcome::Held));
}

#[test]
fn test_failed_command_keeps_memory() {
    let mut controller = SteeringController::with_gains(gains());
    let mut actuator = RecordingActuator { reject_right: true, ..RecordingActuator::default() };
    let outcome = controller.steer(&attitude(0.0, 10.0), 0.0, 0.0, &mut actuator);
    assert_eq!(outcome, Err(ActuatorError::Hardware));
    assert!(controller.memory().is_none());
}

#[test]
fn test_target_roll_toward_heading() {
    let controller = SteeringController::with_gains(gains());
    // 20° to the right at gain 0.5
    assert_close(controller.target_roll_for_heading(0.0, 20f32.to_radians()).to_degrees(), 10.0);
    // shortest way from 350° to 10° is to the right
    assert_close(
        controller.target_roll_for_heading(350f32.to_radians(), 10f32.to_radians()).to_degrees(),
        10.0,
    );
    // large errors saturate
    assert_close(controller.target_roll_for_heading(0.0, 270f32.to_radians()).to_degrees(), -30.0);
}

#[test]
fn test_target_roll_toward_waypoint() {
    let controller = SteeringController::with_gains(gains());
    let navigator = Navigator::default();
    let position = GeoPoint::surface(40.0, -105.0);
    let due_east = GeoPoint::surface(40.0, -104.99);
    let roll = controller.target_roll_toward(0.0, &position, &due_east, &navigator);
    assert_close(roll.to_degrees(), 30.0);
    let roll = controller.target_roll_toward(90f32.to_radians(), &position, &due_east, &navigator);
    assert!(roll.abs() < 0.5f32.to_radians());
}

#[test]
fn test_duty_cycle_arithmetic() {
    assert_eq!(duty_cycle_for_us(1400, 50, 100_000), 7000);
    assert_eq!(duty_cycle_for_us(1400, 50, 20_000), 1400);
    assert_eq!(duty_cycle_for_us(10, 5000, 200), 10);
    assert_eq!(duty_cycle_for_us(10, 5000, 100), 5);
    assert_eq!(duty_cycle_for_us(7, 38_000, 4), 1);
}

#[test]
fn test_servo_pair_centre_and_ends() {
    let mut servos = ServoPair::new(RecordingPwm::default(), ServoConfiguration::default());
    assert!(servos.center().is_ok());
    assert_eq!(servos.pwm().writes, [(ServoSide::Left, 1400, 20_000), (ServoSide::Right, 1400, 20_000)]);
    assert_eq!(servos.pulse_for(ServoSide::Left, 45.0), Ok(1000));
    assert_eq!(servos.pulse_for(ServoSide::Right, 135.0), Ok(1800));
    assert_eq!(servos.left_angle(), Some(90.0));
}

#[test]
fn test_servo_pair_rejects_out_of_range() {
    let mut servos = ServoPair::new(RecordingPwm::default(), ServoConfiguration::default());
    assert!(servos.set_left(100.0).is_ok());
    assert!(servos.set_right(80.0).is_ok());
    for angle in [200.0, -10.0, 44.9, 135.1, f32::NAN] {
        assert_eq!(servos.set_left(angle), Err(ActuatorError::OutOfRange));
        assert_eq!(servos.set_right(angle), Err(ActuatorError::OutOfRange));
    }
    assert_eq!(servos.left_angle(), Some(100.0));
    assert_eq!(servos.right_angle(), Some(80.0));
    assert_eq!(servos.pwm().writes.len(), 2);
}
