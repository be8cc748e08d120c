use crate::record::Latency;
use crate::{Error, Result};
use serde::Serialize;

/// A numeric field that can be summarized.
///
/// `to_f64` fixes the unit that averages and deviations are reported in:
/// milliseconds for [`Latency`], the raw value for plain numbers.
pub trait Measure: Copy + PartialOrd {
    fn to_f64(self) -> f64;
}

impl Measure for Latency {
    fn to_f64(self) -> f64 {
        self.as_millis_f64()
    }
}

impl Measure for u64 {
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Measure for f64 {
    fn to_f64(self) -> f64 {
        self
    }
}

/// Min, max, average and optionally population standard deviation of one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats<T> {
    pub count: usize,
    pub min: T,
    pub max: T,
    pub average: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std_dev: Option<f64>,
}

impl<T: Measure> Stats<T> {
    /// Min, max and average. Fails with [`Error::EmptyInput`] on an empty sequence.
    pub fn compute(values: impl IntoIterator<Item = T>) -> Result<Self> {
        let mut acc = StatsAccumulator::new();
        acc.extend(values);
        acc.finish(false)
    }

    /// Same as [`Stats::compute`], plus the population standard deviation.
    pub fn compute_with_std_dev(values: impl IntoIterator<Item = T>) -> Result<Self> {
        let mut acc = StatsAccumulator::new();
        acc.extend(values);
        acc.finish(true)
    }
}

/// Single-pass running moments (Welford).
#[derive(Debug, Clone)]
pub struct StatsAccumulator<T> {
    count: usize,
    min: Option<T>,
    max: Option<T>,
    mean: f64,
    m2: f64,
}

impl<T: Measure> Default for StatsAccumulator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Measure> StatsAccumulator<T> {
    pub fn new() -> Self {
        Self {
            count: 0,
            min: None,
            max: None,
            mean: 0.0,
            m2: 0.0,
        }
    }

    pub fn push(&mut self, value: T) {
        self.count += 1;

        if self.min.is_none_or(|min| value < min) {
            self.min = Some(value);
        }
        if self.max.is_none_or(|max| value > max) {
            self.max = Some(value);
        }

        let x = value.to_f64();
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    pub fn finish(self, with_std_dev: bool) -> Result<Stats<T>> {
        let (Some(min), Some(max)) = (self.min, self.max) else {
            return Err(Error::EmptyInput);
        };

        let std_dev = with_std_dev.then(|| (self.m2 / self.count as f64).max(0.0).sqrt());

        Ok(Stats {
            count: self.count,
            min,
            max,
            average: self.mean,
            std_dev,
        })
    }
}

impl<T: Measure> Extend<T> for StatsAccumulator<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}
