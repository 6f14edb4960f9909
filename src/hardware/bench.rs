//! Stand-ins that let the pilot run on a workstation without the airframe.
use super::{ButtonInput, GpsUpdate};
use crate::flight_control::{
    common::GeoPoint,
    orientation::{RawSensor, RawTriple, SensorError},
    steering::{ActuatorError, PwmOutput, ServoSide},
};
use crate::{debug, info, warn};
use chrono::Utc;
use std::io::BufRead;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;
use tokio::{sync::mpsc::Sender, task::JoinHandle};
use tokio_util::sync::CancellationToken;

/// Sensor that reports the same sample forever.
#[derive(Debug, Clone, Copy)]
pub struct ConstantSensor(RawTriple);

impl ConstantSensor {
    /// About one g straight down the z axis.
    pub const fn level_accelerometer() -> Self { Self(RawTriple::new(0, 0, 256)) }

    /// Field pointing along the x axis, i.e. nose north.
    pub const fn north_magnetometer() -> Self { Self(RawTriple::new(200, 0, -350)) }
}

impl RawSensor for ConstantSensor {
    fn read_raw(&mut self) -> Result<RawTriple, SensorError> { Ok(self.0) }
}

/// Button pressed by entering an empty line on stdin.
#[derive(Debug, Clone, Default)]
pub struct StdinButton {
    pending: Arc<AtomicUsize>,
    /// The previous poll reported a press, so this one must read released.
    held: bool,
}

impl StdinButton {
    pub fn new() -> Self { Self::default() }

    pub fn press_counter(&self) -> Arc<AtomicUsize> { Arc::clone(&self.pending) }
}

impl ButtonInput for StdinButton {
    /// Reports one queued press as a poll of `true` followed by a poll of
    /// `false`, so back-to-back presses still produce one edge each.
    fn is_pressed(&mut self) -> bool {
        if self.held {
            self.held = false;
            return false;
        }
        self.held = self.pending.fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1)).is_ok();
        self.held
    }
}

/// PWM writer that only logs.
#[derive(Debug, Default)]
pub struct LoggingPwm;

impl PwmOutput for LoggingPwm {
    fn write_duty(&mut self, side: ServoSide, duty: u32, cycle_length: u32) -> Result<(), ActuatorError> {
        debug!("PWM {side}: {duty}/{cycle_length}");
        Ok(())
    }
}

/// Reads stdin on a plain thread: an empty line presses the button, `q` cancels.
///
/// A blocking stdin read cannot be interrupted, so the thread is left to die
/// with the process instead of being joined.
pub fn spawn_stdin_listener(presses: Arc<AtomicUsize>, cancel: CancellationToken) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line.as_deref().map(str::trim) {
                Ok("q") => {
                    info!("Stop requested");
                    cancel.cancel();
                    break;
                }
                Ok(_) => {
                    presses.fetch_add(1, Ordering::AcqRel);
                    info!("Button pressed");
                }
                Err(e) => {
                    warn!("Stdin closed: {e}");
                    break;
                }
            }
        }
    });
}

/// Simulated receiver that gets a lock after a moment and then keeps
/// reporting a stationary fix at `position` once per second.
pub fn spawn_gps_feed(tx: Sender<GpsUpdate>, position: GeoPoint, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        let mut locked = false;
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }
            let mut updates = vec![GpsUpdate::Fix(position), GpsUpdate::GroundSpeed(0.0)];
            if !locked {
                updates.extend([GpsUpdate::Timestamp(Utc::now().timestamp()), GpsUpdate::Lock(true)]);
                locked = true;
            }
            for update in updates {
                if tx.send(update).await.is_err() {
                    return;
                }
            }
        }
    })
}
