use super::raw_sensor::{RawSensor, RawTriple, SensorError};

/// Number of samples the moving average spans.
pub const FILTER_WINDOW: usize = 3;

/// Ring of the most recent samples of one sensor.
///
/// Averages use integer division, which truncates toward zero like the
/// sensor's own fixed-point output.
#[derive(Debug, Clone)]
pub struct SensorFilterState<const N: usize = FILTER_WINDOW> {
    ring: [RawTriple; N],
    next: usize,
    filled: usize,
}

impl<const N: usize> Default for SensorFilterState<N> {
    fn default() -> Self { Self::new() }
}

impl<const N: usize> SensorFilterState<N> {
    pub const fn new() -> Self {
        Self { ring: [RawTriple::new(0, 0, 0); N], next: 0, filled: 0 }
    }

    /// Stores `sample`, dropping the oldest one once the ring is full, and
    /// returns the average over the stored samples.
    pub fn push(&mut self, sample: RawTriple) -> RawTriple {
        if N == 0 {
            return sample;
        }
        self.ring[self.next] = sample;
        self.next = (self.next + 1) % N;
        self.filled = (self.filled + 1).min(N);
        self.average()
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn average(&self) -> RawTriple {
        if self.filled == 0 {
            return RawTriple::default();
        }
        let samples = &self.ring[..self.filled];
        let count = self.filled as i32;
        let sum = |axis: fn(&RawTriple) -> i16| -> i16 {
            // a mean of i16 values always fits back into i16
            (samples.iter().map(|s| i32::from(axis(s))).sum::<i32>() / count) as i16
        };
        RawTriple::new(sum(RawTriple::x), sum(RawTriple::y), sum(RawTriple::z))
    }

    pub fn len(&self) -> usize { self.filled }

    pub fn is_empty(&self) -> bool { self.filled == 0 }
}

/// Decorator that smooths any [`RawSensor`] with a moving average while
/// exposing the same read contract.
#[derive(Debug)]
pub struct FilteredSensor<S, const N: usize = FILTER_WINDOW> {
    inner: S,
    state: SensorFilterState<N>,
}

impl<S: RawSensor, const N: usize> FilteredSensor<S, N> {
    pub fn new(inner: S) -> Self { Self { inner, state: SensorFilterState::new() } }

    /// Reads the wrapped sensor without touching the filter.
    pub fn sample(&mut self) -> Result<RawTriple, SensorError> { self.inner.read_raw() }

    /// Feeds an already-read sample into the filter and returns the average.
    pub fn accept(&mut self, sample: RawTriple) -> RawTriple { self.state.push(sample) }

    pub fn state(&self) -> &SensorFilterState<N> { &self.state }
}

impl<S: RawSensor, const N: usize> RawSensor for FilteredSensor<S, N> {
    fn read_raw(&mut self) -> Result<RawTriple, SensorError> {
        let sample = self.sample()?;
        Ok(self.accept(sample))
    }
}
