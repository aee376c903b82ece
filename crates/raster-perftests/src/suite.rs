//! Standard performance test suite
//!
//! Runs the random-read workloads against a dataset, measures each one with
//! [`Measure`] and writes one result file per test into the configured
//! directory.
//!
//! | Test | Runs when | Driver |
//! |------|-----------|--------|
//! | `{name}_test-rand-gpi` | a grid point list is given | [`read_rand_ts_by_gpi_list`] |
//! | `{name}_test-rand-daily-img` | date windows are given | [`read_rand_img_by_date_list`] on window starts |
//! | `{name}_test-rand-avg-img` | date windows are given | [`read_rand_img_by_date_range`] |
//! | `{name}_test-rand-cells` | date windows and cell ids are given | [`read_rand_cells_by_cell_list`] |
//!
//! # Example
//!
//! ```no_run
//! use rand::thread_rng;
//! use raster_perftests::config::SuiteConfig;
//! use raster_perftests::dataset::Dataset;
//! use raster_perftests::suite::{SuiteInputs, SuiteRunner};
//!
//! # fn example<D>(dataset: &mut D) -> anyhow::Result<()>
//! # where D: Dataset, D::Error: Into<anyhow::Error> {
//! let config = SuiteConfig::from_file("suite.toml")?;
//! let gpis: Vec<u64> = (0..10_000).collect();
//!
//! let runner = SuiteRunner::new(config.suite);
//! let saved = runner.run(dataset, &SuiteInputs::new().gpis(&gpis), &mut thread_rng())?;
//! for s in &saved {
//!     println!("{} -> {}", s.results.name(), s.path.display());
//! }
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rand::Rng;
use std::fs;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

use crate::config::{SuiteConfig, SuiteSettings};
use crate::dataset::{CellId, Dataset, DateRange, Gpi};
use crate::measure::Measure;
use crate::results::TestResults;
use crate::workload::{
    read_rand_cells_by_cell_list, read_rand_img_by_date_list, read_rand_img_by_date_range,
    read_rand_ts_by_gpi_list,
};

/// Candidate pools the suite samples from.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuiteInputs<'a> {
    pub gpis: Option<&'a [Gpi]>,
    pub date_ranges: Option<&'a [DateRange]>,
    pub cell_ids: Option<&'a [CellId]>,
}

impl<'a> SuiteInputs<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gpis(mut self, gpis: &'a [Gpi]) -> Self {
        self.gpis = Some(gpis);
        self
    }

    pub fn date_ranges(mut self, date_ranges: &'a [DateRange]) -> Self {
        self.date_ranges = Some(date_ranges);
        self
    }

    pub fn cell_ids(mut self, cell_ids: &'a [CellId]) -> Self {
        self.cell_ids = Some(cell_ids);
        self
    }
}

/// A measured test and the file it was written to.
#[derive(Debug, Clone)]
pub struct SavedResults {
    pub results: TestResults,
    pub path: PathBuf,
}

/// Runs the standard suite for one set of settings.
#[derive(Debug, Clone)]
pub struct SuiteRunner {
    settings: SuiteSettings,
}

impl SuiteRunner {
    pub fn new(settings: SuiteSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SuiteSettings {
        &self.settings
    }

    /// Run every test the inputs allow, in table order.
    ///
    /// Nothing is measured when no pool is given; a warning is logged and an
    /// empty list returned. The first failing read aborts the suite.
    #[instrument(skip_all, fields(suite = %self.settings.name))]
    pub fn run<D, R>(
        &self,
        dataset: &mut D,
        inputs: &SuiteInputs<'_>,
        rng: &mut R,
    ) -> Result<Vec<SavedResults>>
    where
        D: Dataset + ?Sized,
        D::Error: Into<anyhow::Error>,
        R: Rng + ?Sized,
    {
        let name = &self.settings.name;
        fs::create_dir_all(&self.settings.save_dir).with_context(|| {
            format!(
                "Failed to create results directory: {}",
                self.settings.save_dir.display()
            )
        })?;

        let mut saved = Vec::new();

        if let Some(gpis) = inputs.gpis {
            let workload = self.settings.gpi_workload();
            let results = self.measure(&format!("{}_test-rand-gpi", name), || {
                read_rand_ts_by_gpi_list(&mut *dataset, gpis, &workload, &mut *rng)
                    .map_err(Into::into)
            })?;
            saved.push(self.save(results)?);
        }

        if let Some(ranges) = inputs.date_ranges {
            let workload = self.settings.date_workload();
            let starts: Vec<NaiveDateTime> = ranges.iter().map(|r| r.start).collect();

            let results = self.measure(&format!("{}_test-rand-daily-img", name), || {
                read_rand_img_by_date_list(&mut *dataset, &starts, &workload, &mut *rng)
                    .map_err(Into::into)
            })?;
            saved.push(self.save(results)?);

            let results = self.measure(&format!("{}_test-rand-avg-img", name), || {
                read_rand_img_by_date_range(&mut *dataset, ranges, &workload, &mut *rng)
                    .map_err(Into::into)
            })?;
            saved.push(self.save(results)?);

            if let Some(cells) = inputs.cell_ids {
                let results = self.measure(&format!("{}_test-rand-cells", name), || {
                    read_rand_cells_by_cell_list(&mut *dataset, ranges, cells, &workload, &mut *rng)
                        .map_err(Into::into)
                })?;
                saved.push(self.save(results)?);
            }
        } else if inputs.cell_ids.is_some() {
            warn!("cell ids given without date windows, skipping cell test");
        }

        if saved.is_empty() {
            warn!("suite '{}' had no inputs, nothing was measured", name);
        } else {
            info!("suite '{}' finished {} tests", name, saved.len());
        }

        Ok(saved)
    }

    fn measure<F>(&self, test_name: &str, operation: F) -> Result<TestResults>
    where
        F: FnMut() -> Result<usize>,
    {
        info!("running {}", test_name);
        let results = Measure::new(test_name)
            .runs(self.settings.repeats)
            .ddof(self.settings.ddof)
            .run(operation)
            .with_context(|| format!("Test '{}' failed", test_name))?;
        info!(
            "{}: mean {:.6}s over {} runs",
            test_name,
            results.mean(),
            results.n()
        );
        Ok(results)
    }

    fn save(&self, results: TestResults) -> Result<SavedResults> {
        let path = self.settings.save_dir.join(format!("{}.nc", results.name()));
        results
            .save(&path)
            .with_context(|| format!("Failed to write results: {}", path.display()))?;
        info!("saved {}", path.display());
        Ok(SavedResults { results, path })
    }
}

/// Run the suite described by `config`.
///
/// Explicit `date_ranges` take precedence; otherwise windows are generated from
/// the `[dates]` table when present.
pub fn run_performance_tests<D, R>(
    config: &SuiteConfig,
    dataset: &mut D,
    gpis: Option<&[Gpi]>,
    date_ranges: Option<&[DateRange]>,
    rng: &mut R,
) -> Result<Vec<SavedResults>>
where
    D: Dataset + ?Sized,
    D::Error: Into<anyhow::Error>,
    R: Rng + ?Sized,
{
    let generated = match (date_ranges, &config.dates) {
        (None, Some(dates)) => Some(
            dates
                .generate(rng)
                .context("Failed to generate date windows")?,
        ),
        _ => None,
    };

    let inputs = SuiteInputs {
        gpis,
        date_ranges: date_ranges.or(generated.as_deref()),
        cell_ids: None,
    };

    SuiteRunner::new(config.suite.clone()).run(dataset, &inputs, rng)
}
