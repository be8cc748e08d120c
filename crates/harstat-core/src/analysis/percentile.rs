use super::stats::Measure;
use crate::{Error, Result};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Percentile label (`p50`, `p99.9`) to value
pub type PercentileMap<T> = BTreeMap<String, T>;

/// Values of one field sorted ascending, ready for repeated quantile queries.
#[derive(Debug, Clone)]
pub struct SortedSample<T> {
    values: Vec<T>,
}

impl<T: Measure> SortedSample<T> {
    /// Sorts once. Fails with [`Error::EmptyInput`] when `values` is empty.
    pub fn new(mut values: Vec<T>) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::EmptyInput);
        }
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        Ok(Self { values })
    }

    /// Nearest-rank value at quantile `q`: index `ceil(q * n) - 1`, clamped to the sample.
    pub fn quantile(&self, q: f64) -> Result<T> {
        check_quantile(q)?;

        let n = self.values.len();
        let idx = nearest_rank(q, n).saturating_sub(1).min(n - 1);
        Ok(self.values[idx])
    }

    pub fn percentiles(&self, quantiles: &[f64]) -> Result<PercentileMap<T>> {
        check_quantiles(quantiles)?;
        quantiles
            .iter()
            .map(|&q| Ok((percentile_label(q), self.quantile(q)?)))
            .collect()
    }
}

/// Sort `values` and evaluate every quantile against the same ordering.
pub fn percentiles<T: Measure>(values: Vec<T>, quantiles: &[f64]) -> Result<PercentileMap<T>> {
    SortedSample::new(values)?.percentiles(quantiles)
}

pub fn check_quantile(q: f64) -> Result<()> {
    if (0.0..=1.0).contains(&q) {
        Ok(())
    } else {
        Err(Error::InvalidQuantile(q))
    }
}

/// Range-check every quantile of a set and make sure no two distinct values
/// map to the same [`percentile_label`].
pub fn check_quantiles(quantiles: &[f64]) -> Result<()> {
    let mut seen: BTreeMap<String, f64> = BTreeMap::new();
    for &q in quantiles {
        check_quantile(q)?;
        let label = percentile_label(q);
        match seen.get(&label) {
            Some(&first) if first != q => {
                return Err(Error::QuantileLabelCollision {
                    label,
                    first,
                    second: q,
                });
            }
            Some(_) => {}
            None => {
                seen.insert(label, q);
            }
        }
    }
    Ok(())
}

/// `0.9` becomes `p90`, `0.999` becomes `p99.9`.
pub fn percentile_label(q: f64) -> String {
    let pct = (q * 100_000.0).round() / 1_000.0;
    format!("p{}", pct)
}

fn nearest_rank(q: f64, n: usize) -> usize {
    let raw = q * n as f64;
    // Intentional: within 1e-9 of an integer counts as that integer, so
    // 0.07 * 100 = 7.000000000000001 stays rank 7 instead of ceil-ing to 8.
    let rounded = raw.round();
    let rank = if (raw - rounded).abs() < 1e-9 {
        rounded
    } else {
        raw.ceil()
    };
    rank as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::record::Latency;

    #[test]
    fn test_nearest_rank() {
        let sample = SortedSample::new((1..=10u64).rev().collect()).unwrap();
        assert_eq!(sample.quantile(0.25).unwrap(), 3);
        assert_eq!(sample.quantile(0.5).unwrap(), 5);
        assert_eq!(sample.quantile(0.9).unwrap(), 9);
        assert_eq!(sample.quantile(0.91).unwrap(), 10);
    }

    #[test]
    fn test_extremes_are_min_and_max() {
        let sample = SortedSample::new(vec![40u64, 7, 19, 7, 88]).unwrap();
        assert_eq!(sample.quantile(0.0).unwrap(), 7);
        assert_eq!(sample.quantile(1.0).unwrap(), 88);
    }

    #[test]
    fn test_binary_fraction_does_not_shift_rank() {
        let sample = SortedSample::new((1..=100u64).collect()).unwrap();
        assert_eq!(sample.quantile(0.07).unwrap(), 7);
        assert_eq!(sample.quantile(0.29).unwrap(), 29);
    }

    #[test]
    fn test_rank_just_above_an_integer_rounds_up() {
        let sample = SortedSample::new((1..=100u64).collect()).unwrap();
        // 7.00001 is outside the snap window, so nearest-rank takes ceil
        assert_eq!(sample.quantile(0.0700001).unwrap(), 8);
        assert_eq!(sample.quantile(0.0699999).unwrap(), 7);
    }

    #[test]
    fn test_single_value_sample() {
        let sample = SortedSample::new(vec![Latency::from_millis_f64(12.0)]).unwrap();
        for q in [0.0, 0.1, 0.5, 0.99, 1.0] {
            assert_eq!(sample.quantile(q).unwrap(), Latency::from_millis_f64(12.0));
        }
    }

    #[test]
    fn test_percentile_map_labels() {
        let map = percentiles((1..=1000u64).collect(), &[0.1, 0.5, 0.9, 0.99, 0.999]).unwrap();
        assert_eq!(map.get("p10"), Some(&100));
        assert_eq!(map.get("p50"), Some(&500));
        assert_eq!(map.get("p90"), Some(&900));
        assert_eq!(map.get("p99"), Some(&990));
        assert_eq!(map.get("p99.9"), Some(&999));
    }

    #[test]
    fn test_colliding_labels_rejected() {
        let err = percentiles((1..=10_000u64).collect(), &[0.1234501, 0.1234502]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidQuantile);
        assert!(err.to_string().contains("p12.345"));

        // Repeating the same quantile is harmless
        let map = percentiles((1..=10u64).collect(), &[0.5, 0.5]).unwrap();
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_rejects_out_of_range_quantiles() {
        let sample = SortedSample::new(vec![1u64, 2, 3]).unwrap();
        assert_eq!(sample.quantile(1.5).unwrap_err().kind(), ErrorKind::InvalidQuantile);
        assert_eq!(sample.quantile(-0.1).unwrap_err().kind(), ErrorKind::InvalidQuantile);
        assert!(sample.quantile(f64::NAN).is_err());
    }

    #[test]
    fn test_empty_input() {
        let err = SortedSample::<u64>::new(Vec::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyInput);
        assert!(percentiles::<u64>(Vec::new(), &[0.5]).is_err());
    }
}
