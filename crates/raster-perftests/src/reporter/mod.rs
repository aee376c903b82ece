//! Result reporting
//!
//! This module formats a set of [`TestResults`] for people or for other tools.
//!
//! # Output Formats
//!
//! - **Console**: Human-readable table with confidence intervals
//! - **JSON**: Machine-readable format, compact or pretty-printed
//!
//! # Example
//!
//! ```no_run
//! use raster_perftests::reporter::{OutputFormat, Reporter};
//! use raster_perftests::TestResults;
//!
//! # fn example(results: Vec<TestResults>) -> anyhow::Result<()> {
//! let reporter = Reporter::new(OutputFormat::Console);
//! reporter.report(&results)?;
//!
//! // Or write to a file
//! Reporter::new(OutputFormat::JsonPretty)
//!     .write_to_file(&results, "results.json")?;
//! # Ok(())
//! # }
//! ```

mod console;
mod json;

use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;

use crate::results::TestResults;

pub use console::ConsoleReporter;
pub use json::JsonReporter;

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Console table
    #[default]
    Console,
    /// JSON format for machine parsing
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "console" => Ok(OutputFormat::Console),
            "json" => Ok(OutputFormat::Json),
            "json-pretty" => Ok(OutputFormat::JsonPretty),
            other => anyhow::bail!("unknown output format '{}'", other),
        }
    }
}

/// Reporter for test results
#[derive(Debug, Default)]
pub struct Reporter {
    format: OutputFormat,
}

impl Reporter {
    /// Create a new reporter with the specified output format
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Report results to stdout
    pub fn report(&self, results: &[TestResults]) -> Result<()> {
        let output = self.format_results(results)?;
        print!("{}", output);
        io::stdout().flush()?;
        Ok(())
    }

    /// Write results to a file
    pub fn write_to_file<P: AsRef<Path>>(&self, results: &[TestResults], path: P) -> Result<()> {
        let path = path.as_ref();
        let output = self.format_results(results)?;
        fs::write(path, output)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        Ok(())
    }

    /// Format results as a string
    pub fn format_results(&self, results: &[TestResults]) -> Result<String> {
        match self.format {
            OutputFormat::Console => ConsoleReporter::format(results),
            OutputFormat::Json => JsonReporter::format(results, false),
            OutputFormat::JsonPretty => JsonReporter::format(results, true),
        }
    }
}
