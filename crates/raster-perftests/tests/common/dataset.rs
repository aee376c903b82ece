//! In-memory dataset used by the integration tests

use anyhow::{bail, Result};
use chrono::NaiveDateTime;
use raster_perftests::dataset::{CellId, Dataset, Gpi};
use std::time::Duration;

/// Synthetic reader that sleeps for a fixed delay per call and remembers
/// what it was asked for.
#[derive(Debug, Default)]
pub struct SyntheticDataset {
    pub delay: Duration,
    pub gpis: Vec<Gpi>,
    pub image_dates: Vec<(NaiveDateTime, Option<NaiveDateTime>)>,
    pub cell_reads: Vec<Vec<CellId>>,
    /// Reads fail once this many calls have been made.
    pub fail_after: Option<usize>,
}

impl SyntheticDataset {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.gpis.len() + self.image_dates.len() + self.cell_reads.len()
    }

    fn read(&self) -> Result<()> {
        if let Some(limit) = self.fail_after {
            if self.calls() >= limit {
                bail!("synthetic read failure after {} calls", limit);
            }
        }
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        Ok(())
    }
}

impl Dataset for SyntheticDataset {
    type TimeSeries = Vec<f32>;
    type Image = Vec<f32>;
    type Data = usize;
    type Error = anyhow::Error;

    fn get_timeseries(
        &mut self,
        gpi: Gpi,
        _date_start: Option<NaiveDateTime>,
        _date_end: Option<NaiveDateTime>,
    ) -> Result<Vec<f32>> {
        self.read()?;
        self.gpis.push(gpi);
        Ok(vec![gpi as f32; 4])
    }

    fn get_avg_image(
        &mut self,
        date_start: NaiveDateTime,
        date_end: Option<NaiveDateTime>,
        _cell_id: Option<CellId>,
    ) -> Result<Vec<f32>> {
        self.read()?;
        self.image_dates.push((date_start, date_end));
        Ok(vec![0.0; 16])
    }

    fn get_data(
        &mut self,
        _date_start: NaiveDateTime,
        _date_end: NaiveDateTime,
        cell_ids: &[CellId],
    ) -> Result<usize> {
        self.read()?;
        self.cell_reads.push(cell_ids.to_vec());
        Ok(cell_ids.len())
    }
}
