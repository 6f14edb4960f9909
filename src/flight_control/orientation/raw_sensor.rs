use std::fmt::{Display, Formatter};
use strum_macros::Display;

/// A single raw three-axis sample straight from the sensor registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct RawTriple {
    x: i16,
    y: i16,
    z: i16,
}

impl RawTriple {
    pub const fn new(x: i16, y: i16, z: i16) -> Self { Self { x, y, z } }
    pub const fn x(&self) -> i16 { self.x }
    pub const fn y(&self) -> i16 { self.y }
    pub const fn z(&self) -> i16 { self.z }
}

impl From<[i16; 3]> for RawTriple {
    fn from(value: [i16; 3]) -> Self { Self::new(value[0], value[1], value[2]) }
}

impl Display for RawTriple {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Transient failure to read a sample. The cycle is skipped and retried.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    ReadFailed,
}

impl std::error::Error for SensorError {}

/// Anything that yields raw three-axis samples: a device driver, a recording,
/// or a decorator around another sensor.
pub trait RawSensor {
    fn read_raw(&mut self) -> Result<RawTriple, SensorError>;
}

impl<S: RawSensor + ?Sized> RawSensor for Box<S> {
    fn read_raw(&mut self) -> Result<RawTriple, SensorError> { (**self).read_raw() }
}
