//! Collaborators the flight controller talks to: GPS telemetry, the launch
//! button, raw sensors and servos.
pub(crate) mod bench;
mod gps_feed;

use crate::flight_control::{
    common::GeoPoint,
    orientation::RawSensor,
    steering::Actuator,
};

pub use gps_feed::{GpsUpdate, QueuedTelemetry};

/// Latest parsed GPS state.
pub trait Telemetry {
    /// Applies every update that is already queued without waiting for more.
    ///
    /// # Returns
    /// - The number of updates applied.
    fn poll_queued(&mut self) -> usize;
    fn current_position(&self) -> GeoPoint;
    /// Ground speed in meters per second.
    fn ground_speed(&self) -> f64;
    fn has_gps_lock(&self) -> bool;
    /// Unix time of the first fix that carried a date.
    fn fix_timestamp(&self) -> Option<i64>;
}

/// Launch button, already debounced and converted from active-low.
pub trait ButtonInput {
    fn is_pressed(&mut self) -> bool;
}

/// Everything the pilot needs from the airframe.
pub struct PilotHardware {
    pub telemetry: Box<dyn Telemetry + Send>,
    pub accelerometer: Box<dyn RawSensor + Send>,
    pub magnetometer: Box<dyn RawSensor + Send>,
    pub actuator: Box<dyn Actuator + Send>,
    pub button: Box<dyn ButtonInput + Send>,
}
