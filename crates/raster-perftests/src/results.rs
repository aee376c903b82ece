//! Test results: latency samples reduced to summary statistics
//!
//! A [`TestResults`] holds the raw latencies of one experiment together with
//! its name, and computes median, mean, variance, standard deviation and
//! total once at construction. Results can be saved to and loaded from
//! netCDF files, and two results can be compared by confidence-interval
//! separation.
//!
//! # Comparison
//!
//! `a < b` holds only when the upper boundary of `a`'s 95% confidence interval
//! lies below the lower boundary of `b`'s; `a > b` is the mirror image. When the
//! intervals overlap neither holds, so the relation is a partial order meaning
//! "statistically distinguishable at 95% confidence".
//!
//! # Example
//!
//! ```
//! use raster_perftests::TestResults;
//!
//! let fast = TestResults::new(vec![5.8, 6.3, 6.2, 5.2, 4.3, 6.1, 4.2, 5.5], "list1").unwrap();
//! let slow = TestResults::new(vec![6.7, 8.3, 9.4, 7.3, 8.5], "list2").unwrap();
//!
//! assert!(fast < slow);
//! assert!(slow > fast);
//! println!("{}", fast);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::path::Path;

use serde::{Serialize, Serializer};
use tracing::debug;

use crate::error::{Error, Result};
use crate::netcdf::ResultsFile;
use crate::stats::{self, ConfidenceInterval, DEFAULT_CONFIDENCE_LEVEL};

/// Default delta degrees of freedom (Bessel's correction).
pub const DEFAULT_DDOF: usize = 1;

/// Latency samples of one experiment and their summary statistics.
///
/// Samples are in seconds and keep measurement order. When `n <= ddof` the
/// variance and standard deviation are `NaN` and every confidence-interval
/// query returns [`Error::DegenerateSample`].
#[derive(Debug, Clone)]
pub struct TestResults {
    name: String,
    samples: Vec<f64>,
    ddof: usize,
    n: usize,
    median: f64,
    mean: f64,
    variance: f64,
    stdev: f64,
    total: f64,
}

impl TestResults {
    /// Create results from raw samples with the default ddof of 1.
    ///
    /// # Errors
    ///
    /// * [`Error::MissingName`] if `name` is empty
    /// * [`Error::EmptySamples`] if there are no samples
    pub fn new(samples: Vec<f64>, name: impl Into<String>) -> Result<Self> {
        Self::with_ddof(samples, name, DEFAULT_DDOF)
    }

    /// Create results from raw samples.
    ///
    /// `ddof` is subtracted from the sample count when estimating the
    /// variance.
    pub fn with_ddof(samples: Vec<f64>, name: impl Into<String>, ddof: usize) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::MissingName);
        }
        Self::from_parts(name, samples, ddof)
    }

    /// Load results saved with [`save`](Self::save), using the default ddof.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with_ddof(path, DEFAULT_DDOF)
    }

    /// Load results saved with [`save`](Self::save).
    ///
    /// The file stores only the name and the samples; statistics are
    /// recomputed with `ddof`.
    pub fn load_with_ddof<P: AsRef<Path>>(path: P, ddof: usize) -> Result<Self> {
        let path = path.as_ref();
        let file = ResultsFile::read(path)?;
        debug!(
            "loaded {} measurements of '{}' from {}",
            file.measurements.len(),
            file.name,
            path.display()
        );
        Self::from_parts(file.name, file.measurements, ddof)
    }

    /// Save name and samples as a netCDF file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        ResultsFile::new(self.name.clone(), self.samples.clone()).write(path)?;
        debug!("saved '{}' to {}", self.name, path.display());
        Ok(())
    }

    fn from_parts(name: String, samples: Vec<f64>, ddof: usize) -> Result<Self> {
        let median = stats::median(&samples).ok_or(Error::EmptySamples)?;
        let variance = stats::variance(&samples, ddof);

        Ok(Self {
            n: samples.len(),
            median,
            mean: stats::mean(&samples),
            stdev: variance.sqrt(),
            variance,
            total: samples.iter().sum(),
            name,
            samples,
            ddof,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw samples in measurement order.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn ddof(&self) -> usize {
        self.ddof
    }

    /// Number of samples.
    pub fn n(&self) -> usize {
        self.n
    }

    pub fn median(&self) -> f64 {
        self.median
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample variance with the ddof correction, `NaN` if `n <= ddof`.
    pub fn variance(&self) -> f64 {
        self.variance
    }

    /// Standard deviation, `NaN` if `n <= ddof`.
    pub fn stdev(&self) -> f64 {
        self.stdev
    }

    /// Sum of all samples.
    pub fn total(&self) -> f64 {
        self.total
    }

    /// True if there are no degrees of freedom left for a variance estimate.
    pub fn is_degenerate(&self) -> bool {
        self.n <= self.ddof
    }

    /// Confidence interval of the mean at `level` percent.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidConfidenceLevel`] unless `0 < level < 100`
    /// * [`Error::DegenerateSample`] if `n <= ddof`
    pub fn confidence_interval(&self, level: f64) -> Result<ConfidenceInterval> {
        ConfidenceInterval::from_moments(self.mean, self.stdev, self.n, self.ddof, level)
    }

    /// Compare by confidence-interval separation at `level` percent.
    ///
    /// Returns `Some(Less)` if this interval lies entirely below the other,
    /// `Some(Greater)` if entirely above, `Some(Equal)` for identical results
    /// and `None` when the intervals overlap or cannot be computed.
    pub fn compare_at(&self, other: &TestResults, level: f64) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        let ours = self.confidence_interval(level).ok()?;
        let theirs = other.confidence_interval(level).ok()?;

        if ours.overlaps(&theirs) {
            None
        } else if ours.upper < theirs.lower {
            Some(Ordering::Less)
        } else {
            Some(Ordering::Greater)
        }
    }
}

impl PartialEq for TestResults {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.ddof == other.ddof && self.samples == other.samples
    }
}

impl PartialOrd for TestResults {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare_at(other, DEFAULT_CONFIDENCE_LEVEL)
    }
}

impl fmt::Display for TestResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Results {}", self.name)?;
        writeln!(f, "{} runs", self.n)?;
        writeln!(
            f,
            "median {:.4} mean {:.4} stdev {:.4}",
            self.median, self.mean, self.stdev
        )?;
        writeln!(f, "sum {:.4}", self.total)?;
        match self.confidence_interval(DEFAULT_CONFIDENCE_LEVEL) {
            Ok(ci) => {
                writeln!(f, "95% confidence interval of the mean")?;
                writeln!(f, "upper {:.4}", ci.upper)?;
                writeln!(f, "       |")?;
                writeln!(f, "mean  {:.4}", ci.mean)?;
                writeln!(f, "       |")?;
                write!(f, "lower {:.4}", ci.lower)
            }
            Err(e) => write!(f, "95% confidence interval undefined: {}", e),
        }
    }
}

/// Serialized form used by the reporters.
#[derive(Serialize)]
struct ResultsSummary<'a> {
    name: &'a str,
    n: usize,
    ddof: usize,
    median: f64,
    mean: f64,
    variance: Option<f64>,
    stdev: Option<f64>,
    total: f64,
    confidence_interval_95: Option<ConfidenceInterval>,
    samples: &'a [f64],
}

impl Serialize for TestResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        // NaN has no JSON representation, degenerate statistics become null
        let finite = |v: f64| v.is_finite().then_some(v);
        ResultsSummary {
            name: &self.name,
            n: self.n,
            ddof: self.ddof,
            median: self.median,
            mean: self.mean,
            variance: finite(self.variance),
            stdev: finite(self.stdev),
            total: self.total,
            confidence_interval_95: self.confidence_interval(DEFAULT_CONFIDENCE_LEVEL).ok(),
            samples: &self.samples,
        }
        .serialize(serializer)
    }
}
