//! Performance test harness for geospatial raster datasets
//!
//! This crate measures how fast a raster/time-series reader answers random
//! read workloads and turns the measured durations into statistics that can
//! be stored, reloaded and compared.
//!
//! # Features
//!
//! - **Statistics**: Median, mean, variance with configurable ddof and
//!   Student's-t confidence intervals of the mean
//! - **Comparison**: Results are partially ordered by confidence-interval
//!   separation
//! - **Persistence**: Lossless netCDF result files
//! - **Self-timing wrapper**: Time every read call of an existing reader
//! - **Workloads**: Random sampling of grid points, dates, date windows and
//!   cells with an optional runtime budget
//! - **Reporting**: Console and JSON output
//!
//! # Example
//!
//! ```no_run
//! use raster_perftests::{measure, Reporter, OutputFormat, TestResults};
//!
//! # fn example() -> anyhow::Result<()> {
//! let results = measure("sum-1m", 10, 1, || {
//!     let _s: u64 = (0..1_000_000).sum();
//!     Ok::<_, raster_perftests::Error>(())
//! })?;
//! results.save("sum-1m.nc")?;
//!
//! let baseline = TestResults::load("baseline.nc")?;
//! if results < baseline {
//!     println!("faster than baseline");
//! }
//!
//! Reporter::new(OutputFormat::Console).report(&[baseline, results])?;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! Suites are configured using TOML files:
//!
//! ```toml
//! [suite]
//! name = "ESACCI-2Images"
//! save_dir = "results"
//! repeats = 5
//! gpi_read_perc = 1.0
//! date_read_perc = 1.0
//! max_runtime_ms = 60000
//!
//! [dates]
//! start = "1980-01-01T00:00:00"
//! end = "2013-12-31T00:00:00"
//! count = 500
//! max_spread_days = 365
//! ```

pub mod analyze;
pub mod config;
pub mod dataset;
pub mod dates;
pub mod error;
pub mod measure;
pub mod netcdf;
pub mod reporter;
pub mod results;
pub mod self_timing;
pub mod stats;
pub mod suite;
pub mod workload;

// Re-export main types for convenience
pub use config::SuiteConfig;
pub use dataset::{Dataset, DatasetOp, DateRange};
pub use error::{Error, Result};
pub use measure::{measure, Measure};
pub use reporter::{OutputFormat, Reporter};
pub use results::TestResults;
pub use self_timing::SelfTimingDataset;
pub use suite::{run_performance_tests, SuiteRunner};
pub use workload::ReadWorkload;
