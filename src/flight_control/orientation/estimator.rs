use super::{
    raw_sensor::{RawSensor, RawTriple, SensorError},
    sensor_filter::{FilteredSensor, SensorFilterState},
};
use crate::flight_control::{
    common::{
        Radians,
        math::{wrap_pi, wrap_two_pi},
    },
    configuration::Configuration,
};
use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Attitude of the airframe.
///
/// Pitch and roll are body-frame angles in `(-π, π]` with roll-right and
/// pitch-up positive; yaw is the true compass heading in `[0, 2π)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orientation {
    pub pitch: Radians,
    pub roll: Radians,
    pub yaw: Radians,
}

impl Orientation {
    pub const fn new(pitch: Radians, roll: Radians, yaw: Radians) -> Self { Self { pitch, roll, yaw } }

    pub const fn level(yaw: Radians) -> Self { Self::new(0.0, 0.0, yaw) }
}

impl Display for Orientation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "pitch {:.1}° roll {:.1}° yaw {:.1}°",
            self.pitch.to_degrees(),
            self.roll.to_degrees(),
            self.yaw.to_degrees()
        )
    }
}

/// Per-axis magnetometer extremes recorded while turning the sensor through
/// every orientation, in raw counts. The hard-iron bias of an axis is the
/// midpoint of its extremes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HardIronCalibration {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
    pub z_min: f32,
    pub z_max: f32,
}

impl Default for HardIronCalibration {
    fn default() -> Self {
        Self { x_min: -600.0, x_max: 600.0, y_min: -600.0, y_max: 600.0, z_min: -600.0, z_max: 600.0 }
    }
}

impl HardIronCalibration {
    /// Derives the extremes from a calibration sweep.
    ///
    /// # Returns
    /// - `None` if `samples` is empty.
    pub fn from_samples(samples: &[RawTriple]) -> Option<Self> {
        let extremes = |axis: fn(&RawTriple) -> i16| match samples.iter().map(axis).minmax() {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(v) => Some((f32::from(v), f32::from(v))),
            MinMaxResult::MinMax(lo, hi) => Some((f32::from(lo), f32::from(hi))),
        };
        let (x_min, x_max) = extremes(RawTriple::x)?;
        let (y_min, y_max) = extremes(RawTriple::y)?;
        let (z_min, z_max) = extremes(RawTriple::z)?;
        Some(Self { x_min, x_max, y_min, y_max, z_min, z_max })
    }

    pub fn offsets(&self) -> [f32; 3] {
        [
            (self.x_max + self.x_min) * 0.5,
            (self.y_max + self.y_min) * 0.5,
            (self.z_max + self.z_min) * 0.5,
        ]
    }
}

/// Fixed corrections applied after the raw angles are computed.
#[derive(Debug, Clone, Copy, PartialEq)]
struct MountingCorrection {
    pitch_offset: Radians,
    roll_offset: Radians,
    yaw_offset: Radians,
    declination: Radians,
}

/// Turns raw accelerometer and magnetometer samples into an [`Orientation`].
///
/// Each sensor is smoothed by its own moving-average ring. A cycle only feeds
/// the rings once both sensors have been read successfully.
pub struct OrientationEstimator<A: RawSensor, M: RawSensor> {
    accelerometer: FilteredSensor<A>,
    magnetometer: FilteredSensor<M>,
    hard_iron: [f32; 3],
    mounting: MountingCorrection,
}

impl<A: RawSensor, M: RawSensor> OrientationEstimator<A, M> {
    pub fn new(accelerometer: A, magnetometer: M, config: &Configuration) -> Self {
        Self {
            accelerometer: FilteredSensor::new(accelerometer),
            magnetometer: FilteredSensor::new(magnetometer),
            hard_iron: config.hard_iron.offsets(),
            mounting: MountingCorrection {
                pitch_offset: config.pitch_offset_d.to_radians(),
                roll_offset: config.roll_offset_d.to_radians(),
                yaw_offset: config.yaw_mount_offset_d.to_radians(),
                declination: config.declination_d.to_radians(),
            },
        }
    }

    /// Reads both sensors and computes a fresh estimate.
    ///
    /// # Errors
    /// - [`SensorError`] if either read fails. Neither filter is touched in
    ///   that case, so the caller can keep its previous estimate and retry.
    pub fn estimate(&mut self) -> Result<Orientation, SensorError> {
        let accel_raw = self.accelerometer.sample()?;
        let mag_raw = self.magnetometer.sample()?;
        let accel = self.accelerometer.accept(accel_raw);
        let mag = self.magnetometer.accept(mag_raw);
        Ok(self.orientation_from(accel, mag))
    }

    /// Computes the orientation for already filtered samples.
    #[allow(clippy::cast_possible_truncation)]
    pub fn orientation_from(&self, accel: RawTriple, mag: RawTriple) -> Orientation {
        let a_x = f64::from(accel.x());
        let a_y = f64::from(accel.y());
        // z reads about +1g when level, 0 would make roll undefined
        let a_z = if accel.z() == 0 { 1.0 } else { f64::from(accel.z()) };

        let pitch = (-a_x).atan2(a_y.hypot(a_z));
        let roll = a_y.atan2(a_z);

        let m_x = f64::from(mag.x()) - f64::from(self.hard_iron[0]);
        let m_y = f64::from(mag.y()) - f64::from(self.hard_iron[1]);
        let m_z = f64::from(mag.z()) - f64::from(self.hard_iron[2]);

        let (sin_p, cos_p) = pitch.sin_cos();
        let (sin_r, cos_r) = roll.sin_cos();
        let x_h = m_x * cos_p + m_y * sin_r * sin_p - m_z * cos_r * sin_p;
        let y_h = m_y * cos_r + m_z * sin_r;
        let heading = y_h.atan2(x_h) as Radians;

        let m = &self.mounting;
        Orientation {
            pitch: wrap_pi(pitch as Radians - m.pitch_offset),
            roll: wrap_pi(roll as Radians - m.roll_offset),
            yaw: wrap_two_pi(wrap_two_pi(heading) + m.declination + m.yaw_offset),
        }
    }

    pub fn accelerometer_filter(&self) -> &SensorFilterState { self.accelerometer.state() }

    pub fn magnetometer_filter(&self) -> &SensorFilterState { self.magnetometer.state() }
}
