//! Student's-t confidence intervals of the mean.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::{Error, Result};

/// Default confidence level in percent.
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 95.0;

/// Two-sided confidence interval around a sample mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    /// Lower boundary
    pub lower: f64,
    /// Sample mean
    pub mean: f64,
    /// Upper boundary
    pub upper: f64,
}

impl ConfidenceInterval {
    /// Build the interval `mean +/- t * stdev / sqrt(n)`.
    ///
    /// `level` is given in percent and converted to the two-tailed quantile
    /// `1 - (1 - level / 100) / 2`. The t value is taken from a Student's-t
    /// distribution with `n - ddof` degrees of freedom.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidConfidenceLevel`] unless `0 < level < 100`
    /// * [`Error::DegenerateSample`] if `n <= ddof`
    pub fn from_moments(mean: f64, stdev: f64, n: usize, ddof: usize, level: f64) -> Result<Self> {
        if !(level > 0.0 && level < 100.0) {
            return Err(Error::InvalidConfidenceLevel(level));
        }
        if n <= ddof {
            return Err(Error::DegenerateSample { n, ddof });
        }

        let quantile = 1.0 - (1.0 - level / 100.0) / 2.0;
        let t_val = t_quantile(quantile, n - ddof).ok_or(Error::DegenerateSample { n, ddof })?;
        let std_err = stdev / (n as f64).sqrt();

        Ok(Self {
            lower: mean - t_val * std_err,
            mean,
            upper: mean + t_val * std_err,
        })
    }

    /// Half the width of the interval.
    pub fn margin(&self) -> f64 {
        (self.upper - self.lower) / 2.0
    }

    /// True if the two intervals share at least one point.
    pub fn overlaps(&self, other: &ConfidenceInterval) -> bool {
        !(self.upper < other.lower || self.lower > other.upper)
    }
}

/// Quantile function of the standard Student's-t distribution, `None` without
/// degrees of freedom.
fn t_quantile(probability: f64, degrees_of_freedom: usize) -> Option<f64> {
    let dist = StudentsT::new(0.0, 1.0, degrees_of_freedom as f64).ok()?;
    Some(dist.inverse_cdf(probability))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-5;

    #[test]
    fn test_t_quantile_matches_reference_table() {
        // Two-tailed 95% critical values
        let table = [
            (1, 12.706_204_736),
            (3, 3.182_446_305),
            (4, 2.776_445_105),
            (7, 2.364_624_252),
            (10, 2.228_138_852),
            (30, 2.042_272_456),
        ];
        for (df, expected) in table {
            let t = t_quantile(0.975, df).unwrap();
            assert!((t - expected).abs() < TOLERANCE, "df={}: {} != {}", df, t, expected);
        }
    }

    #[test]
    fn test_t_quantile_other_levels() {
        // 90% and 99% two-tailed, 7 degrees of freedom
        assert!((t_quantile(0.95, 7).unwrap() - 1.894_578_605).abs() < TOLERANCE);
        assert!((t_quantile(0.995, 7).unwrap() - 3.499_483_297).abs() < TOLERANCE);
    }

    #[test]
    fn test_interval_from_moments() {
        let stdev = 0.826_351_706_513_118_3;
        let ci = ConfidenceInterval::from_moments(5.45, stdev, 8, 1, 95.0).unwrap();

        assert_eq!(ci.mean, 5.45);
        assert!((ci.lower - 4.759_152_684_730_618).abs() < TOLERANCE);
        assert!((ci.upper - 6.140_847_315_269_382).abs() < TOLERANCE);
        assert!((ci.margin() - (ci.upper - ci.mean)).abs() < 1e-12);
    }

    #[test]
    fn test_higher_level_widens_interval() {
        let ci90 = ConfidenceInterval::from_moments(1.0, 0.2, 10, 1, 90.0).unwrap();
        let ci99 = ConfidenceInterval::from_moments(1.0, 0.2, 10, 1, 99.0).unwrap();
        assert!(ci99.lower < ci90.lower);
        assert!(ci99.upper > ci90.upper);
    }

    #[test]
    fn test_invalid_levels() {
        for level in [0.0, 100.0, -5.0, 150.0, f64::NAN] {
            assert!(matches!(
                ConfidenceInterval::from_moments(1.0, 0.1, 10, 1, level),
                Err(Error::InvalidConfidenceLevel(_))
            ));
        }
    }

    #[test]
    fn test_no_degrees_of_freedom() {
        let err = ConfidenceInterval::from_moments(1.0, f64::NAN, 1, 1, 95.0).unwrap_err();
        assert!(matches!(err, Error::DegenerateSample { n: 1, ddof: 1 }));

        let err = ConfidenceInterval::from_moments(1.0, f64::NAN, 2, 3, 95.0).unwrap_err();
        assert!(matches!(err, Error::DegenerateSample { n: 2, ddof: 3 }));
    }

    #[test]
    fn test_t_quantile_zero_degrees_of_freedom() {
        assert_eq!(t_quantile(0.975, 0), None);
    }

    #[test]
    fn test_overlaps() {
        let a = ConfidenceInterval { lower: 1.0, mean: 1.5, upper: 2.0 };
        let b = ConfidenceInterval { lower: 1.9, mean: 2.5, upper: 3.0 };
        let c = ConfidenceInterval { lower: 2.1, mean: 2.5, upper: 3.0 };
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }
}
