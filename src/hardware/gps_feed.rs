use super::Telemetry;
use crate::flight_control::common::{Coordinate, GeoPoint};
use crate::{debug, warn};
use tokio::sync::mpsc::{self, Receiver, Sender, error::TryRecvError};

/// Already parsed fields of one NMEA sentence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GpsUpdate {
    /// Horizontal position only; altitude is carried over.
    Position { latitude: Coordinate, longitude: Coordinate },
    /// Full fix including altitude.
    Fix(GeoPoint),
    /// Ground speed in meters per second.
    GroundSpeed(f64),
    Lock(bool),
    /// Unix seconds of a fix with a date.
    Timestamp(i64),
}

/// [`Telemetry`] fed by a channel of parsed GPS updates.
pub struct QueuedTelemetry {
    updates: Receiver<GpsUpdate>,
    position: GeoPoint,
    ground_speed: f64,
    lock: bool,
    timestamp: Option<i64>,
    closed: bool,
}

impl QueuedTelemetry {
    pub fn new(updates: Receiver<GpsUpdate>, initial_position: GeoPoint) -> Self {
        Self {
            updates,
            position: initial_position,
            ground_speed: 0.0,
            lock: false,
            timestamp: None,
            closed: false,
        }
    }

    /// Creates the telemetry together with the sender the GPS reader feeds.
    pub fn channel(initial_position: GeoPoint, capacity: usize) -> (Sender<GpsUpdate>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self::new(rx, initial_position))
    }

    pub fn is_closed(&self) -> bool { self.closed }

    fn apply(&mut self, update: GpsUpdate) {
        match update {
            GpsUpdate::Position { latitude, longitude } => {
                self.position = GeoPoint::new(latitude, longitude, self.position.altitude());
            }
            GpsUpdate::Fix(point) => self.position = point,
            GpsUpdate::GroundSpeed(speed) => self.ground_speed = speed,
            GpsUpdate::Lock(lock) => self.lock = lock,
            GpsUpdate::Timestamp(ts) => {
                // the first dated fix is the one used to set the clock
                self.timestamp.get_or_insert(ts);
            }
        }
    }
}

impl Telemetry for QueuedTelemetry {
    fn poll_queued(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.updates.try_recv() {
                Ok(update) => {
                    debug!("GPS update {update:?}");
                    self.apply(update);
                    applied += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.closed {
                        warn!("GPS feed closed, keeping last known position {}", self.position);
                        self.closed = true;
                    }
                    break;
                }
            }
        }
        applied
    }

    fn current_position(&self) -> GeoPoint { self.position }

    fn ground_speed(&self) -> f64 { self.ground_speed }

    fn has_gps_lock(&self) -> bool { self.lock }

    fn fix_timestamp(&self) -> Option<i64> { self.timestamp }
}
