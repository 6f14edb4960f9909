use super::{landing::LandingDetector, pilot_state::PilotState};
use crate::flight_control::{
    common::Radians,
    configuration::{Configuration, ConfigurationError},
    navigation::WaypointSequencer,
    orientation::{Orientation, OrientationEstimator, RawSensor},
    steering::{Actuator, SteeringController, SteeringOutcome},
};
use crate::hardware::{ButtonInput, PilotHardware, Telemetry};
use crate::{debug, error, info, warn};
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use strum_macros::Display;
use tokio_util::sync::CancellationToken;

type BoxedSensor = Box<dyn RawSensor + Send>;

/// Larger differences between the system clock and GPS time are reported.
pub const MAX_CLOCK_SKEW: TimeDelta = TimeDelta::seconds(2);

/// How a single control cycle ended, which decides the pause before the next.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Completed,
    /// A sensor read failed; wait for the error backoff before retrying.
    SensorBackoff,
}

/// The flight state machine.
///
/// Each [`Pilot::step`] drains queued GPS updates, polls the button and runs
/// the handler of the current [`PilotState`]. [`Pilot::run`] repeats that
/// until cancelled and leaves the surfaces centered.
pub struct Pilot {
    config: Arc<Configuration>,
    state: PilotState,
    telemetry: Box<dyn Telemetry + Send>,
    estimator: OrientationEstimator<BoxedSensor, BoxedSensor>,
    actuator: Box<dyn Actuator + Send>,
    button: Box<dyn ButtonInput + Send>,
    waypoints: WaypointSequencer,
    steering: SteeringController,
    landing: LandingDetector,
    button_was_pressed: bool,
    button_press_time: Option<DateTime<Utc>>,
    orientation: Option<Orientation>,
    /// System clock minus GPS time, once a dated fix has been seen.
    clock_skew: Option<TimeDelta>,
}

impl Pilot {
    /// Builds the pilot from a validated configuration.
    ///
    /// # Errors
    /// - [`ConfigurationError`] if `config` does not validate.
    pub fn new(config: Arc<Configuration>, hardware: PilotHardware) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let PilotHardware { telemetry, accelerometer, magnetometer, actuator, button } = hardware;
        let state = if config.start_in_test_mode { PilotState::TestMode } else { PilotState::Initializing };
        Ok(Self {
            estimator: OrientationEstimator::new(accelerometer, magnetometer, &config),
            waypoints: WaypointSequencer::from_config(&config),
            steering: SteeringController::new(&config),
            landing: LandingDetector::new(&config, Utc::now()),
            config,
            state,
            telemetry,
            actuator,
            button,
            button_was_pressed: false,
            button_press_time: None,
            orientation: None,
            clock_skew: None,
        })
    }

    pub fn state(&self) -> PilotState { self.state }

    /// Last successful orientation estimate.
    pub fn orientation(&self) -> Option<Orientation> { self.orientation }

    pub fn waypoints(&self) -> &WaypointSequencer { &self.waypoints }

    pub fn clock_skew(&self) -> Option<TimeDelta> { self.clock_skew }

    fn set_state(&mut self, next: PilotState) {
        if next != self.state {
            info!("Pilot {} -> {next}", self.state);
            self.state = next;
        }
    }

    /// Button edge since the previous poll.
    fn button_pressed_edge(&mut self) -> bool {
        let pressed = self.button.is_pressed();
        let edge = pressed && !self.button_was_pressed;
        self.button_was_pressed = pressed;
        edge
    }

    /// Runs one control cycle at time `now`.
    pub fn step(&mut self, now: DateTime<Utc>) -> CycleOutcome {
        let updates = self.telemetry.poll_queued();
        if updates > 0 {
            debug!("Applied {updates} GPS updates");
        }
        if self.clock_skew.is_none() && self.telemetry.has_gps_lock() {
            self.check_gps_clock(now);
        }
        let pressed = self.button_pressed_edge();
        match self.state {
            PilotState::Initializing => self.run_initializing(),
            PilotState::WaitingForButton => self.run_waiting_for_button(pressed, now),
            PilotState::WaitingForLaunch => self.run_waiting_for_launch(now),
            PilotState::Flying => self.run_flying(now),
            PilotState::Landed => self.run_landed(pressed, now),
            PilotState::TestMode => self.run_test_mode(),
        }
    }

    fn run_initializing(&mut self) -> CycleOutcome {
        if self.telemetry.has_gps_lock() {
            info!("Got GPS lock at {}, waiting for button", self.telemetry.current_position());
            self.set_state(PilotState::WaitingForButton);
        }
        CycleOutcome::Completed
    }

    /// Logs how far the system clock is from GPS time, once.
    fn check_gps_clock(&mut self, now: DateTime<Utc>) {
        match self.telemetry.fix_timestamp().and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)) {
            Some(gps_time) => {
                let skew = now - gps_time;
                self.clock_skew = Some(skew);
                if skew.abs() > MAX_CLOCK_SKEW {
                    warn!("System clock is {}s off GPS time {gps_time}", skew.num_seconds());
                } else {
                    info!("GPS time {gps_time}, system clock in sync");
                }
            }
            None => debug!("GPS lock without a dated fix yet"),
        }
    }

    fn run_waiting_for_button(&mut self, pressed: bool, now: DateTime<Utc>) -> CycleOutcome {
        if pressed {
            self.button_press_time = Some(now);
            self.set_state(PilotState::WaitingForLaunch);
        }
        CycleOutcome::Completed
    }

    fn run_waiting_for_launch(&mut self, now: DateTime<Utc>) -> CycleOutcome {
        let pressed_at = *self.button_press_time.get_or_insert(now);
        if now - pressed_at >= self.config.launch_glide() {
            self.landing.reset(now);
            self.set_state(PilotState::Flying);
            return CycleOutcome::Completed;
        }
        let Some(orientation) = self.read_orientation() else {
            return CycleOutcome::SensorBackoff;
        };
        self.steer(&orientation, 0.0);
        CycleOutcome::Completed
    }

    fn run_flying(&mut self, now: DateTime<Utc>) -> CycleOutcome {
        let position = self.telemetry.current_position();
        self.waypoints.update(&position);
        let waypoint = self.waypoints.current();

        let Some(orientation) = self.read_orientation() else {
            return CycleOutcome::SensorBackoff;
        };
        if self.landing.update(&orientation, self.telemetry.ground_speed(), now) {
            info!("Landed at {position}");
            self.set_state(PilotState::Landed);
            self.center();
            return CycleOutcome::Completed;
        }
        let target_roll =
            self.steering.target_roll_toward(orientation.yaw, &position, &waypoint, self.waypoints.navigator());
        debug!("Flying {position} -> {waypoint}");
        self.steer(&orientation, target_roll);
        CycleOutcome::Completed
    }

    fn run_landed(&mut self, pressed: bool, now: DateTime<Utc>) -> CycleOutcome {
        self.center();
        if pressed {
            self.button_press_time = Some(now);
            self.set_state(PilotState::WaitingForLaunch);
        }
        CycleOutcome::Completed
    }

    fn run_test_mode(&mut self) -> CycleOutcome {
        let Some(orientation) = self.read_orientation() else {
            return CycleOutcome::SensorBackoff;
        };
        let target_roll = self
            .config
            .test_heading_d
            .map_or(0.0, |heading| self.steering.target_roll_for_heading(orientation.yaw, heading.to_radians()));
        self.steer(&orientation, target_roll);
        CycleOutcome::Completed
    }

    fn read_orientation(&mut self) -> Option<Orientation> {
        match self.estimator.estimate() {
            Ok(orientation) => {
                self.orientation = Some(orientation);
                Some(orientation)
            }
            Err(e) => {
                error!("Unable to read orientation in state {}: {e}", self.state);
                None
            }
        }
    }

    fn steer(&mut self, orientation: &Orientation, target_roll: Radians) {
        let target_pitch = self.config.target_pitch_d.to_radians();
        match self.steering.steer(orientation, target_roll, target_pitch, &mut self.actuator) {
            Ok(SteeringOutcome::Applied { left_d, right_d }) => {
                debug!("Servos left {left_d:.1}° right {right_d:.1}°");
            }
            Ok(SteeringOutcome::Held) => {}
            Err(e) => error!("Actuators rejected steering command: {e}"),
        }
    }

    fn center(&mut self) {
        if let Err(e) = self.actuator.center() {
            error!("Unable to center actuators: {e}");
        }
        self.steering.reset();
    }

    /// Runs control cycles until `cancel` fires, then centers the surfaces.
    pub async fn run(&mut self, cancel: CancellationToken) {
        info!("Pilot starting in state {}", self.state);
        while !cancel.is_cancelled() {
            let pause = match self.step(Utc::now()) {
                CycleOutcome::Completed => self.config.iteration_sleep,
                CycleOutcome::SensorBackoff => self.config.error_sleep,
            };
            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(pause) => {}
            }
        }
        self.center();
        info!("Pilot stopped in state {}, surfaces centered", self.state);
    }
}
