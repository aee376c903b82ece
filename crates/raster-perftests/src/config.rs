//! Configuration parsing for performance test suites
//!
//! This module provides TOML-based configuration for a suite run: where to
//! store results, how many repeats to measure, how much of each candidate
//! pool to read, and optionally how to generate random date windows.

use anyhow::Context;
use chrono::NaiveDateTime;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::dataset::DateRange;
use crate::dates::{generate_date_list, DEFAULT_COUNT, DEFAULT_MAX_SPREAD_DAYS};
use crate::measure::DEFAULT_RUNS;
use crate::results::DEFAULT_DDOF;
use crate::workload::{ReadWorkload, DEFAULT_READ_PERCENTAGE};

/// Main configuration structure loaded from TOML files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Suite settings
    pub suite: SuiteSettings,
    /// Random date window generation, used when no explicit list is given
    #[serde(default)]
    pub dates: Option<DateGeneration>,
}

impl SuiteConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML is malformed
    /// - Required fields are missing
    ///
    /// # Example
    ///
    /// ```no_run
    /// use raster_perftests::config::SuiteConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = SuiteConfig::from_file("suite.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Example
    ///
    /// ```
    /// use raster_perftests::config::SuiteConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let toml = r#"
    ///     [suite]
    ///     name = "ESACCI-2Images"
    /// "#;
    /// let config = SuiteConfig::from_str(toml)?;
    /// assert_eq!(config.suite.repeats, 5);
    /// # Ok(())
    /// # }
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.suite.name.is_empty() {
            anyhow::bail!("suite.name must not be empty");
        }
        if self.suite.repeats == 0 {
            anyhow::bail!("suite.repeats must be at least 1");
        }
        for (key, pct) in [
            ("suite.gpi_read_perc", self.suite.gpi_read_perc),
            ("suite.date_read_perc", self.suite.date_read_perc),
        ] {
            if !(0.0..=100.0).contains(&pct) {
                anyhow::bail!("{} must be a percentage between 0 and 100, got {}", key, pct);
            }
        }
        Ok(())
    }
}

/// Core suite parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteSettings {
    /// Name of the test run, used as prefix of every result file
    pub name: String,
    /// Directory the result files are written to (default: ".")
    #[serde(default = "default_save_dir")]
    pub save_dir: PathBuf,
    /// Number of measured repeats per test (default: 5)
    #[serde(default = "default_repeats")]
    pub repeats: usize,
    /// Degrees-of-freedom correction for the statistics (default: 1)
    #[serde(default = "default_ddof")]
    pub ddof: usize,
    /// Percentage of grid points read per repeat (default: 1.0)
    #[serde(default = "default_read_perc")]
    pub gpi_read_perc: f64,
    /// Percentage of dates read per repeat (default: 1.0)
    #[serde(default = "default_read_perc")]
    pub date_read_perc: f64,
    /// Advisory runtime budget per repeat in milliseconds
    #[serde(default, rename = "max_runtime_ms", with = "duration_ms")]
    pub max_runtime: Option<Duration>,
}

impl SuiteSettings {
    /// Settings with defaults for everything but the name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            save_dir: default_save_dir(),
            repeats: default_repeats(),
            ddof: default_ddof(),
            gpi_read_perc: default_read_perc(),
            date_read_perc: default_read_perc(),
            max_runtime: None,
        }
    }

    /// Workload for the grid point test.
    pub fn gpi_workload(&self) -> ReadWorkload {
        ReadWorkload {
            read_percentage: self.gpi_read_perc,
            max_runtime: self.max_runtime,
        }
    }

    /// Workload for the image and cell tests.
    pub fn date_workload(&self) -> ReadWorkload {
        ReadWorkload {
            read_percentage: self.date_read_perc,
            max_runtime: self.max_runtime,
        }
    }
}

fn default_save_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_repeats() -> usize {
    DEFAULT_RUNS
}

fn default_ddof() -> usize {
    DEFAULT_DDOF
}

fn default_read_perc() -> f64 {
    DEFAULT_READ_PERCENTAGE
}

/// Parameters for random date window generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateGeneration {
    /// Earliest window start
    pub start: NaiveDateTime,
    /// Latest window end
    pub end: NaiveDateTime,
    /// Number of windows (default: 500)
    #[serde(default = "default_count")]
    pub count: usize,
    /// Longest window in days (default: 365)
    #[serde(default = "default_max_spread")]
    pub max_spread_days: i64,
    /// Shortest window in days (default: 0)
    #[serde(default)]
    pub min_spread_days: i64,
}

impl DateGeneration {
    /// Generate the configured number of random windows.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> crate::Result<Vec<DateRange>> {
        generate_date_list(
            self.start,
            self.end,
            self.count,
            self.min_spread_days,
            self.max_spread_days,
            rng,
        )
    }
}

fn default_count() -> usize {
    DEFAULT_COUNT
}

fn default_max_spread() -> i64 {
    DEFAULT_MAX_SPREAD_DAYS
}

/// Serde module for an optional Duration stored as milliseconds
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_u64(d.as_millis() as u64),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = Option::<u64>::deserialize(deserializer)?;
        Ok(ms.map(Duration::from_millis))
    }
}
