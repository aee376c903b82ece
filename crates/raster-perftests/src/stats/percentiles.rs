//! Percentile calculations for latency samples.

/// Calculate a percentile from a slice of latency samples.
///
/// Uses linear interpolation between nearest ranks, which makes the 50th
/// percentile the conventional median (mean of the two middle values for an
/// even number of samples).
///
/// # Arguments
///
/// * `samples` - Slice of samples (sorted internally, the input is untouched)
/// * `p` - Percentile to calculate (0.0 to 100.0)
///
/// # Returns
///
/// * `Some(value)` - The percentile value
/// * `None` - If samples is empty or p is invalid
///
/// # Examples
///
/// ```
/// use raster_perftests::stats::percentile;
///
/// let data = vec![0.4, 0.1, 0.3, 0.2];
/// assert_eq!(percentile(&data, 0.0), Some(0.1));
/// assert_eq!(percentile(&data, 100.0), Some(0.4));
/// ```
pub fn percentile(samples: &[f64], p: f64) -> Option<f64> {
    if samples.is_empty() || !(0.0..=100.0).contains(&p) {
        return None;
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    if sorted.len() == 1 {
        return Some(sorted[0]);
    }

    let rank = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower_index = rank.floor() as usize;
    let upper_index = rank.ceil() as usize;

    if lower_index == upper_index {
        Some(sorted[lower_index])
    } else {
        let lower_value = sorted[lower_index];
        let upper_value = sorted[upper_index];
        let fraction = rank - lower_index as f64;
        Some(lower_value + fraction * (upper_value - lower_value))
    }
}

/// Median of the samples, `None` when there are none.
pub fn median(samples: &[f64]) -> Option<f64> {
    percentile(samples, 50.0)
}
