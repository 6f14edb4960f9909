mod estimator;
mod raw_sensor;
mod sensor_filter;

pub use estimator::{HardIronCalibration, Orientation, OrientationEstimator};
pub use raw_sensor::{RawSensor, RawTriple, SensorError};
