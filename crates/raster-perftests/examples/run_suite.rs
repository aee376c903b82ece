//! Run the standard suite against an in-memory raster stack
//!
//! Usage: cargo run -p raster-perftests --example run_suite -- <suite.toml>

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rand::thread_rng;
use raster_perftests::dataset::{CellId, Dataset, Gpi};
use raster_perftests::reporter::{OutputFormat, Reporter};
use raster_perftests::{run_performance_tests, SuiteConfig};
use std::env;

/// A dense grid of `days` images with `gpis` points each.
struct MemoryStack {
    origin: NaiveDateTime,
    gpis: usize,
    values: Vec<f32>,
}

impl MemoryStack {
    fn new(origin: NaiveDateTime, gpis: usize, days: usize) -> Self {
        let values = (0..gpis * days).map(|i| (i % 251) as f32).collect();
        Self { origin, gpis, values }
    }

    fn day_index(&self, date: NaiveDateTime) -> usize {
        let days = self.values.len() / self.gpis;
        ((date - self.origin).num_days().max(0) as usize).min(days - 1)
    }
}

impl Dataset for MemoryStack {
    type TimeSeries = Vec<f32>;
    type Image = Vec<f32>;
    type Data = f32;
    type Error = anyhow::Error;

    fn get_timeseries(
        &mut self,
        gpi: Gpi,
        _date_start: Option<NaiveDateTime>,
        _date_end: Option<NaiveDateTime>,
    ) -> Result<Vec<f32>> {
        let gpi = gpi as usize % self.gpis;
        Ok(self.values.iter().skip(gpi).step_by(self.gpis).copied().collect())
    }

    fn get_avg_image(
        &mut self,
        date_start: NaiveDateTime,
        date_end: Option<NaiveDateTime>,
        _cell_id: Option<CellId>,
    ) -> Result<Vec<f32>> {
        let first = self.day_index(date_start);
        let last = date_end.map_or(first, |d| self.day_index(d)).max(first);
        let mut avg = vec![0.0; self.gpis];
        for day in first..=last {
            let image = &self.values[day * self.gpis..(day + 1) * self.gpis];
            for (a, v) in avg.iter_mut().zip(image) {
                *a += v;
            }
        }
        let n = (last - first + 1) as f32;
        avg.iter_mut().for_each(|a| *a /= n);
        Ok(avg)
    }

    fn get_data(
        &mut self,
        date_start: NaiveDateTime,
        date_end: NaiveDateTime,
        cell_ids: &[CellId],
    ) -> Result<f32> {
        let image = self.get_avg_image(date_start, Some(date_end), None)?;
        Ok(cell_ids.iter().map(|&c| image[c as usize % self.gpis]).sum())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config_path = env::args()
        .nth(1)
        .context("Usage: run_suite <suite.toml>")?;
    let config = SuiteConfig::from_file(&config_path)?;

    println!("Starting suite: {}", config.suite.name);
    println!("  Repeats: {}", config.suite.repeats);
    println!("  Saving to: {}", config.suite.save_dir.display());
    println!();

    let origin = config
        .dates
        .as_ref()
        .map(|d| d.start)
        .unwrap_or_default();
    let mut stack = MemoryStack::new(origin, 10_000, 365);
    let gpis: Vec<Gpi> = (0..10_000).collect();

    let saved = run_performance_tests(&config, &mut stack, Some(&gpis), None, &mut thread_rng())?;
    let results: Vec<_> = saved.into_iter().map(|s| s.results).collect();

    Reporter::new(OutputFormat::Console).report(&results)?;
    Ok(())
}
