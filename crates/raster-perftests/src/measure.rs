//! Timed-run executor
//!
//! Runs an operation a fixed number of times, sequentially, and packages the
//! wall-clock duration of every run into [`TestResults`].
//!
//! # Example
//!
//! ```
//! use raster_perftests::measure::Measure;
//!
//! # fn example() -> Result<(), raster_perftests::Error> {
//! let results = Measure::new("sum-1k").runs(5).run(|| {
//!     let _sum: u64 = (0..1_000).sum();
//!     Ok::<_, raster_perftests::Error>(())
//! })?;
//! assert_eq!(results.n(), 5);
//! # Ok(())
//! # }
//! ```

use std::time::Instant;

use tracing::debug;

use crate::error::Error;
use crate::results::{TestResults, DEFAULT_DDOF};

/// Default number of runs per measurement.
pub const DEFAULT_RUNS: usize = 5;

/// Measurement settings: experiment name, run count and ddof.
#[derive(Debug, Clone)]
pub struct Measure {
    name: String,
    runs: usize,
    ddof: usize,
}

impl Measure {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            runs: DEFAULT_RUNS,
            ddof: DEFAULT_DDOF,
        }
    }

    /// Number of times the operation is run.
    pub fn runs(mut self, runs: usize) -> Self {
        self.runs = runs;
        self
    }

    /// Degrees-of-freedom correction of the resulting statistics.
    pub fn ddof(mut self, ddof: usize) -> Self {
        self.ddof = ddof;
        self
    }

    /// Run `operation` and collect one duration per run.
    ///
    /// Runs are strictly sequential, so the total of the results equals the
    /// summed duration of all runs. The first error returned by `operation`
    /// ends the measurement and is passed through unchanged; the partial
    /// batch is discarded. Panics unwind through the executor.
    ///
    /// # Errors
    ///
    /// The operation's error, or [`Error::EmptySamples`] /
    /// [`Error::MissingName`] converted into `E` for zero runs or an empty name.
    pub fn run<F, T, E>(&self, mut operation: F) -> Result<TestResults, E>
    where
        F: FnMut() -> Result<T, E>,
        E: From<Error>,
    {
        debug!("measuring '{}' over {} runs", self.name, self.runs);

        let mut durations = Vec::with_capacity(self.runs);
        for run in 0..self.runs {
            let start = Instant::now();
            operation()?;
            let duration = start.elapsed().as_secs_f64();
            debug!("run {} of '{}' took {:.6}s", run + 1, self.name, duration);
            durations.push(duration);
        }

        Ok(TestResults::with_ddof(durations, self.name.clone(), self.ddof)?)
    }
}

/// Run `operation` `runs` times and reduce the durations into [`TestResults`].
///
/// Shorthand for `Measure::new(name).runs(runs).ddof(ddof).run(operation)`.
pub fn measure<F, T, E>(
    name: &str,
    runs: usize,
    ddof: usize,
    operation: F,
) -> Result<TestResults, E>
where
    F: FnMut() -> Result<T, E>,
    E: From<Error>,
{
    Measure::new(name).runs(runs).ddof(ddof).run(operation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Debug)]
    enum TestError {
        Harness(Error),
        Failed(usize),
    }

    impl From<Error> for TestError {
        fn from(e: Error) -> Self {
            TestError::Harness(e)
        }
    }

    #[test]
    fn test_measure_output_format() {
        let results = measure("test_output_format", 3, 1, || {
            std::thread::sleep(Duration::from_millis(5));
            Ok::<_, Error>(())
        })
        .unwrap();

        assert_eq!(results.n(), 3);
        assert_eq!(results.name(), "test_output_format");
        assert!(results.samples().iter().all(|&d| d >= 0.005));
        assert!(results.confidence_interval(95.0).is_ok());
    }

    #[test]
    fn test_runs_exactly_n_times() {
        let mut calls = 0;
        let results = Measure::new("count")
            .runs(7)
            .run(|| {
                calls += 1;
                Ok::<_, Error>(calls)
            })
            .unwrap();

        assert_eq!(calls, 7);
        assert_eq!(results.n(), 7);
    }

    #[test]
    fn test_total_is_sum_of_runs() {
        let results = Measure::new("additive").runs(4).run(|| Ok::<_, Error>(())).unwrap();
        let sum: f64 = results.samples().iter().sum();
        assert_eq!(results.total(), sum);
    }

    #[test]
    fn test_ddof_is_forwarded() {
        let results = Measure::new("ddof").runs(2).ddof(0).run(|| Ok::<_, Error>(())).unwrap();
        assert_eq!(results.ddof(), 0);
    }

    #[test]
    fn test_failure_propagates_unchanged() {
        let mut calls = 0;
        let err = Measure::new("failing")
            .runs(5)
            .run(|| {
                calls += 1;
                if calls == 3 {
                    Err(TestError::Failed(calls))
                } else {
                    Ok(())
                }
            })
            .unwrap_err();

        assert!(matches!(err, TestError::Failed(3)));
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_zero_runs() {
        let err = Measure::new("none").runs(0).run(|| Ok::<_, TestError>(())).unwrap_err();
        assert!(matches!(err, TestError::Harness(Error::EmptySamples)));
    }

    #[test]
    fn test_anyhow_operation() {
        let results = measure("anyhow", 2, 1, || -> anyhow::Result<()> { Ok(()) }).unwrap();
        assert_eq!(results.n(), 2);

        let err = measure("anyhow", 2, 1, || -> anyhow::Result<()> { anyhow::bail!("read failed") })
            .unwrap_err();
        assert_eq!(err.to_string(), "read failed");
    }
}
