#![allow(dead_code, clippy::similar_names)]
#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]
mod flight_control;
mod hardware;
mod logger;

use crate::flight_control::{Configuration, Pilot, steering::ServoPair};
use crate::hardware::{
    PilotHardware, QueuedTelemetry,
    bench::{self, ConstantSensor, LoggingPwm, StdinButton},
};
use std::{env, sync::Arc};
use tokio_util::sync::CancellationToken;

const GPS_QUEUE_CAPACITY: usize = 64;

/// Default configuration with the few overrides taken from the environment.
fn load_configuration() -> Configuration {
    let mut config = Configuration::default();
    if env::var("GLIDER_TEST_MODE").is_ok() {
        config.start_in_test_mode = true;
    }
    if let Ok(heading) = env::var("GLIDER_TEST_HEADING") {
        match heading.trim().parse::<f32>() {
            Ok(degrees) => config.test_heading_d = Some(degrees),
            Err(e) => warn!("Ignoring GLIDER_TEST_HEADING={heading}: {e}"),
        }
    }
    config
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() {
    let config = Arc::new(load_configuration());
    if let Err(e) = config.validate() {
        fatal!("Invalid configuration: {e}");
    }
    log!(
        "Route of {} lead-in and {} repeating waypoints, {} formula",
        config.lead_in_waypoints.len(),
        config.repeating_waypoints.len(),
        config.distance_formula
    );

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, stopping");
            ctrl_c_cancel.cancel();
        }
    });

    let (gps_tx, telemetry) = QueuedTelemetry::channel(config.default_waypoint, GPS_QUEUE_CAPACITY);
    let gps_feed = bench::spawn_gps_feed(gps_tx, config.default_waypoint, cancel.clone());
    let button = StdinButton::new();
    bench::spawn_stdin_listener(button.press_counter(), cancel.clone());
    info!("Press enter to push the button, 'q' to stop");

    let hardware = PilotHardware {
        telemetry: Box::new(telemetry),
        accelerometer: Box::new(ConstantSensor::level_accelerometer()),
        magnetometer: Box::new(ConstantSensor::north_magnetometer()),
        actuator: Box::new(ServoPair::new(LoggingPwm, config.servo)),
        button: Box::new(button),
    };
    let mut pilot = Pilot::new(Arc::clone(&config), hardware)
        .unwrap_or_else(|e| fatal!("Unable to start pilot: {e}"));
    pilot.run(cancel.clone()).await;

    cancel.cancel();
    if let Err(e) = gps_feed.await {
        error!("GPS feed task failed: {e}");
    }
}
