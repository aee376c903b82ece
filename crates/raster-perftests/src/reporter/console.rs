//! Console reporter for test results
//!
//! Provides human-readable output with an ASCII table of durations in seconds.

use anyhow::Result;
use std::fmt::Write;

use crate::results::TestResults;
use crate::stats::DEFAULT_CONFIDENCE_LEVEL;

/// Console format reporter
pub struct ConsoleReporter;

impl ConsoleReporter {
    /// Format results for console output
    pub fn format(results: &[TestResults]) -> Result<String> {
        let mut output = String::new();

        // Header
        writeln!(output)?;
        writeln!(output, "╔══════════════════════════════════════════════════════════════╗")?;
        writeln!(output, "║                  PERFORMANCE TEST RESULTS                    ║")?;
        writeln!(output, "╚══════════════════════════════════════════════════════════════╝")?;
        writeln!(output)?;

        if results.is_empty() {
            writeln!(output, "No results.")?;
            writeln!(output)?;
            return Ok(output);
        }

        for r in results {
            Self::format_test(&mut output, r)?;
        }

        writeln!(output, "────────────────────────────────────────────────────────────────")?;
        let total: f64 = results.iter().map(TestResults::total).sum();
        writeln!(output, "Tests: {}, total measured time: {:.3}s", results.len(), total)?;
        writeln!(output)?;
        Ok(output)
    }

    fn format_test(output: &mut String, results: &TestResults) -> Result<()> {
        writeln!(output, "────────────────────────────────────────────────────────────────")?;
        writeln!(output, "Test: {}", results.name())?;
        writeln!(output, "────────────────────────────────────────────────────────────────")?;
        writeln!(output)?;
        writeln!(output, "  Runs: {} (ddof {})", results.n(), results.ddof())?;
        writeln!(output)?;

        writeln!(output, "  ┌──────────┬──────────┬──────────┬──────────┬──────────┐")?;
        writeln!(output, "  │  Median  │   Mean   │  StdDev  │   Min    │   Max    │")?;
        writeln!(output, "  ├──────────┼──────────┼──────────┼──────────┼──────────┤")?;
        let min = results.samples().iter().copied().fold(f64::INFINITY, f64::min);
        let max = results.samples().iter().copied().fold(f64::NEG_INFINITY, f64::max);
        writeln!(
            output,
            "  │ {:>8} │ {:>8} │ {:>8} │ {:>8} │ {:>8} │",
            format_seconds(results.median()),
            format_seconds(results.mean()),
            format_seconds(results.stdev()),
            format_seconds(min),
            format_seconds(max)
        )?;
        writeln!(output, "  └──────────┴──────────┴──────────┴──────────┴──────────┘")?;
        writeln!(output)?;

        match results.confidence_interval(DEFAULT_CONFIDENCE_LEVEL) {
            Ok(ci) => writeln!(
                output,
                "  {}% CI of the mean: [{}, {}] (±{})",
                DEFAULT_CONFIDENCE_LEVEL,
                format_seconds(ci.lower),
                format_seconds(ci.upper),
                format_seconds(ci.margin())
            )?,
            Err(e) => writeln!(
                output,
                "  {}% CI of the mean: undefined ({})",
                DEFAULT_CONFIDENCE_LEVEL, e
            )?,
        }
        writeln!(output, "  Total: {}", format_seconds(results.total()))?;
        writeln!(output)?;
        Ok(())
    }
}

fn format_seconds(v: f64) -> String {
    if v.is_nan() {
        "-".to_string()
    } else if v < 1.0 {
        format!("{:.4}s", v)
    } else {
        format!("{:.2}s", v)
    }
}
