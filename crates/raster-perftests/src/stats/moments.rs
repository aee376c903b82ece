//! Sample moments with a configurable degrees-of-freedom correction.

/// Arithmetic mean, `NaN` for an empty slice.
pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return f64::NAN;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Sample variance with `ddof` subtracted from the sample count.
///
/// `ddof = 1` is Bessel's correction (the unbiased estimator), `ddof = 0`
/// is the population variance.
///
/// Returns `NaN` when `samples.len() <= ddof`: there are no degrees of
/// freedom left and any finite value would be made up.
///
/// # Examples
///
/// ```
/// use raster_perftests::stats::variance;
///
/// let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
/// assert_eq!(variance(&data, 0), 4.0);
/// assert!(variance(&[1.0], 1).is_nan());
/// ```
pub fn variance(samples: &[f64], ddof: usize) -> f64 {
    let n = samples.len();
    if n <= ddof {
        return f64::NAN;
    }

    let mean = mean(samples);
    let squared_diffs: f64 = samples.iter().map(|&x| (x - mean).powi(2)).sum();
    squared_diffs / (n - ddof) as f64
}
