//! Random-sampling workload drivers
//!
//! Each driver draws a random subset of a candidate pool (grid points, dates,
//! date windows or cells) without replacement and issues one dataset read per
//! selected item. The subset size is `ceil(pool_size * read_percentage / 100)`.
//!
//! With a `max_runtime` the driver checks the elapsed time after every read
//! and stops once the budget is exceeded. The check happens between reads
//! only, so a slow read is never interrupted and the number of completed
//! reads depends on timing.
//!
//! Drivers never catch read failures: the first error aborts the driver and
//! is returned as is.
//!
//! # Example
//!
//! ```no_run
//! use rand::thread_rng;
//! use raster_perftests::measure::Measure;
//! use raster_perftests::workload::{read_rand_ts_by_gpi_list, ReadWorkload};
//! use raster_perftests::dataset::Dataset;
//!
//! # fn example<D: Dataset>(dataset: &mut D, gpis: &[u64]) -> Result<(), D::Error> {
//! let workload = ReadWorkload::new(1.0);
//! let results = Measure::new("rand-gpi").runs(5).run(|| {
//!     read_rand_ts_by_gpi_list(&mut *dataset, gpis, &workload, &mut thread_rng())
//! })?;
//! println!("{}", results);
//! # Ok(())
//! # }
//! ```

use std::time::{Duration, Instant};

use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dataset::{CellId, Dataset, DateRange, Gpi};
use crate::error::{Error, Result};

/// Default percentage of the candidate pool read per driver call.
pub const DEFAULT_READ_PERCENTAGE: f64 = 1.0;

/// How much of a candidate pool to read, and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadWorkload {
    /// Percentage (0 to 100) of the pool to read
    pub read_percentage: f64,
    /// Advisory wall-clock budget, checked after each read
    pub max_runtime: Option<Duration>,
}

impl Default for ReadWorkload {
    fn default() -> Self {
        Self {
            read_percentage: DEFAULT_READ_PERCENTAGE,
            max_runtime: None,
        }
    }
}

impl ReadWorkload {
    pub fn new(read_percentage: f64) -> Self {
        Self {
            read_percentage,
            max_runtime: None,
        }
    }

    pub fn with_max_runtime(mut self, max_runtime: Duration) -> Self {
        self.max_runtime = Some(max_runtime);
        self
    }

    /// Number of items read from a pool of `pool_size` candidates.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidReadPercentage`] unless the percentage is within `[0, 100]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use raster_perftests::workload::ReadWorkload;
    ///
    /// assert_eq!(ReadWorkload::new(1.0).sample_size(10_000).unwrap(), 100);
    /// assert_eq!(ReadWorkload::new(1.0).sample_size(365).unwrap(), 4);
    /// ```
    pub fn sample_size(&self, pool_size: usize) -> Result<usize> {
        if !(0.0..=100.0).contains(&self.read_percentage) {
            return Err(Error::InvalidReadPercentage(self.read_percentage));
        }
        let size = (pool_size as f64 * self.read_percentage / 100.0).ceil() as usize;
        Ok(size.min(pool_size))
    }

    /// Pick the pool indices to read, in random order.
    fn select<R: Rng + ?Sized>(&self, rng: &mut R, pool_size: usize) -> Result<Vec<usize>> {
        let amount = self.sample_size(pool_size)?;
        Ok(index::sample(rng, pool_size, amount).into_vec())
    }

    fn budget(&self) -> Budget {
        Budget {
            start: Instant::now(),
            max_runtime: self.max_runtime,
        }
    }
}

struct Budget {
    start: Instant,
    max_runtime: Option<Duration>,
}

impl Budget {
    fn exceeded(&self) -> bool {
        match self.max_runtime {
            Some(max) if self.start.elapsed() > max => {
                debug!("runtime budget of {:?} exceeded", max);
                true
            }
            _ => false,
        }
    }
}

/// Read time series at random grid points.
///
/// Returns the number of completed reads.
pub fn read_rand_ts_by_gpi_list<D, R>(
    dataset: &mut D,
    gpi_list: &[Gpi],
    workload: &ReadWorkload,
    rng: &mut R,
) -> std::result::Result<usize, D::Error>
where
    D: Dataset + ?Sized,
    R: Rng + ?Sized,
{
    let selected = workload.select(rng, gpi_list.len())?;
    info!("reading {} out of {} time series", selected.len(), gpi_list.len());

    let budget = workload.budget();
    let mut completed = 0;
    for i in selected {
        dataset.get_timeseries(gpi_list[i], None, None)?;
        completed += 1;
        if budget.exceeded() {
            break;
        }
    }
    Ok(completed)
}

/// Read single images at random dates.
///
/// Returns the number of completed reads.
pub fn read_rand_img_by_date_list<D, R>(
    dataset: &mut D,
    date_list: &[chrono::NaiveDateTime],
    workload: &ReadWorkload,
    rng: &mut R,
) -> std::result::Result<usize, D::Error>
where
    D: Dataset + ?Sized,
    R: Rng + ?Sized,
{
    let selected = workload.select(rng, date_list.len())?;
    info!("reading {} out of {} dates", selected.len(), date_list.len());

    let budget = workload.budget();
    let mut completed = 0;
    for i in selected {
        dataset.get_avg_image(date_list[i], None, None)?;
        completed += 1;
        if budget.exceeded() {
            break;
        }
    }
    Ok(completed)
}

/// Read images averaged over random date windows.
///
/// Returns the number of completed reads.
pub fn read_rand_img_by_date_range<D, R>(
    dataset: &mut D,
    date_ranges: &[DateRange],
    workload: &ReadWorkload,
    rng: &mut R,
) -> std::result::Result<usize, D::Error>
where
    D: Dataset + ?Sized,
    R: Rng + ?Sized,
{
    let selected = workload.select(rng, date_ranges.len())?;
    info!("reading {} out of {} date ranges", selected.len(), date_ranges.len());

    let budget = workload.budget();
    let mut completed = 0;
    for i in selected {
        let range = date_ranges[i];
        dataset.get_avg_image(range.start, Some(range.end), None)?;
        completed += 1;
        if budget.exceeded() {
            break;
        }
    }
    Ok(completed)
}

/// Read whole cells over random date windows.
///
/// Cells and windows are sampled independently at the same percentage and
/// paired up; each pair is one `get_data` call.
///
/// Returns the number of completed reads.
pub fn read_rand_cells_by_cell_list<D, R>(
    dataset: &mut D,
    cell_date_list: &[DateRange],
    cell_ids: &[CellId],
    workload: &ReadWorkload,
    rng: &mut R,
) -> std::result::Result<usize, D::Error>
where
    D: Dataset + ?Sized,
    R: Rng + ?Sized,
{
    let cells = workload.select(rng, cell_ids.len())?;
    let windows = workload.select(rng, cell_date_list.len())?;
    info!("reading {} out of {} cells", cells.len(), cell_ids.len());

    let budget = workload.budget();
    let mut completed = 0;
    for (c, w) in cells.into_iter().zip(windows) {
        let range = cell_date_list[w];
        dataset.get_data(range.start, range.end, &cell_ids[c..=c])?;
        completed += 1;
        if budget.exceeded() {
            break;
        }
    }
    Ok(completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[derive(Debug)]
    enum FakeError {
        Harness(Error),
        Broken,
    }

    impl From<Error> for FakeError {
        fn from(e: Error) -> Self {
            FakeError::Harness(e)
        }
    }

    #[derive(Default)]
    struct RecordingDataset {
        gpis: Vec<Gpi>,
        images: Vec<(NaiveDateTime, Option<NaiveDateTime>)>,
        cells: Vec<(DateRange, Vec<CellId>)>,
        sleep: Option<Duration>,
        fail_after: Option<usize>,
    }

    impl RecordingDataset {
        fn reads(&self) -> usize {
            self.gpis.len() + self.images.len() + self.cells.len()
        }

        fn tick(&self) -> std::result::Result<(), FakeError> {
            if let Some(sleep) = self.sleep {
                std::thread::sleep(sleep);
            }
            match self.fail_after {
                Some(limit) if self.reads() >= limit => Err(FakeError::Broken),
                _ => Ok(()),
            }
        }
    }

    impl Dataset for RecordingDataset {
        type TimeSeries = ();
        type Image = ();
        type Data = ();
        type Error = FakeError;

        fn get_timeseries(
            &mut self,
            gpi: Gpi,
            _date_start: Option<NaiveDateTime>,
            _date_end: Option<NaiveDateTime>,
        ) -> std::result::Result<(), FakeError> {
            self.tick()?;
            self.gpis.push(gpi);
            Ok(())
        }

        fn get_avg_image(
            &mut self,
            date_start: NaiveDateTime,
            date_end: Option<NaiveDateTime>,
            _cell_id: Option<CellId>,
        ) -> std::result::Result<(), FakeError> {
            self.tick()?;
            self.images.push((date_start, date_end));
            Ok(())
        }

        fn get_data(
            &mut self,
            date_start: NaiveDateTime,
            date_end: NaiveDateTime,
            cell_ids: &[CellId],
        ) -> std::result::Result<(), FakeError> {
            self.tick()?;
            self.cells.push((DateRange { start: date_start, end: date_end }, cell_ids.to_vec()));
            Ok(())
        }
    }

    fn dates(n: i64) -> Vec<NaiveDateTime> {
        let first = NaiveDate::from_ymd_opt(2007, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        (0..n).map(|d| first + chrono::Duration::days(d)).collect()
    }

    #[test]
    fn test_sample_size() {
        assert_eq!(ReadWorkload::new(1.0).sample_size(10_000).unwrap(), 100);
        assert_eq!(ReadWorkload::new(1.0).sample_size(365).unwrap(), 4);
        assert_eq!(ReadWorkload::new(0.1).sample_size(10).unwrap(), 1);
        assert_eq!(ReadWorkload::new(0.0).sample_size(10).unwrap(), 0);
        assert_eq!(ReadWorkload::new(100.0).sample_size(37).unwrap(), 37);
        assert_eq!(ReadWorkload::new(50.0).sample_size(0).unwrap(), 0);
    }

    #[test]
    fn test_invalid_percentage() {
        for pct in [-1.0, 100.5, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                ReadWorkload::new(pct).sample_size(10),
                Err(Error::InvalidReadPercentage(_))
            ));
        }
    }

    #[test]
    fn test_gpi_driver_reads_distinct_sample() {
        let mut ds = RecordingDataset::default();
        let gpi_list: Vec<Gpi> = (0..10_000).collect();
        let mut rng = StdRng::seed_from_u64(7);

        let workload = ReadWorkload::default();
        let completed = read_rand_ts_by_gpi_list(&mut ds, &gpi_list, &workload, &mut rng).unwrap();

        assert_eq!(completed, 100);
        assert_eq!(ds.gpis.len(), 100);
        let unique: HashSet<_> = ds.gpis.iter().collect();
        assert_eq!(unique.len(), 100);
    }

    #[test]
    fn test_date_driver() {
        let mut ds = RecordingDataset::default();
        let date_list = dates(365);
        let mut rng = StdRng::seed_from_u64(1);

        let workload = ReadWorkload::default();
        let completed =
            read_rand_img_by_date_list(&mut ds, &date_list, &workload, &mut rng).unwrap();

        assert_eq!(completed, 4);
        assert!(ds.images.iter().all(|(start, end)| date_list.contains(start) && end.is_none()));
    }

    #[test]
    fn test_date_range_driver_passes_both_ends() {
        let mut ds = RecordingDataset::default();
        let ranges: Vec<DateRange> = dates(200)
            .into_iter()
            .map(|d| DateRange::new(d, d + chrono::Duration::days(5)).unwrap())
            .collect();
        let mut rng = StdRng::seed_from_u64(2);

        let workload = ReadWorkload::new(5.0);
        let completed = read_rand_img_by_date_range(&mut ds, &ranges, &workload, &mut rng).unwrap();

        assert_eq!(completed, 10);
        for (start, end) in &ds.images {
            assert_eq!(*end, Some(*start + chrono::Duration::days(5)));
        }
    }

    #[test]
    fn test_cell_driver_pairs_cells_with_windows() {
        let mut ds = RecordingDataset::default();
        let cell_ids: Vec<CellId> = (0..500).collect();
        let windows: Vec<DateRange> = dates(500)
            .into_iter()
            .map(|d| DateRange::new(d, d + chrono::Duration::days(5)).unwrap())
            .collect();
        let mut rng = StdRng::seed_from_u64(3);

        let workload = ReadWorkload::default();
        let completed =
            read_rand_cells_by_cell_list(&mut ds, &windows, &cell_ids, &workload, &mut rng)
                .unwrap();

        assert_eq!(completed, 5);
        assert!(ds.cells.iter().all(|(range, cells)| cells.len() == 1 && range.days() == 5));
    }

    #[test]
    fn test_single_cell() {
        let mut ds = RecordingDataset::default();
        let windows = vec![DateRange::new(dates(1)[0], dates(2)[1]).unwrap()];
        let mut rng = StdRng::seed_from_u64(4);

        let workload = ReadWorkload::default();
        let completed =
            read_rand_cells_by_cell_list(&mut ds, &windows, &[42], &workload, &mut rng).unwrap();

        assert_eq!(completed, 1);
        assert_eq!(ds.cells[0].1, vec![42]);
    }

    #[test]
    fn test_budget_stops_early() {
        let mut ds = RecordingDataset {
            sleep: Some(Duration::from_millis(10)),
            ..Default::default()
        };
        let gpi_list: Vec<Gpi> = (0..10_000).collect();
        let workload = ReadWorkload::default().with_max_runtime(Duration::from_millis(50));
        let mut rng = StdRng::seed_from_u64(5);

        let completed = read_rand_ts_by_gpi_list(&mut ds, &gpi_list, &workload, &mut rng).unwrap();

        // At least one read always completes before the first check
        assert!(completed >= 1);
        assert!(completed < 100);
        assert_eq!(ds.gpis.len(), completed);
    }

    #[test]
    fn test_failure_aborts_driver() {
        let mut ds = RecordingDataset {
            fail_after: Some(3),
            ..Default::default()
        };
        let gpi_list: Vec<Gpi> = (0..1_000).collect();
        let mut rng = StdRng::seed_from_u64(6);

        let workload = ReadWorkload::new(10.0);
        let err = read_rand_ts_by_gpi_list(&mut ds, &gpi_list, &workload, &mut rng).unwrap_err();

        assert!(matches!(err, FakeError::Broken));
        assert_eq!(ds.gpis.len(), 3);
    }

    #[test]
    fn test_invalid_percentage_reaches_dataset_error() {
        let mut ds = RecordingDataset::default();
        let mut rng = StdRng::seed_from_u64(8);

        let workload = ReadWorkload::new(120.0);
        let err = read_rand_ts_by_gpi_list(&mut ds, &[1, 2, 3], &workload, &mut rng).unwrap_err();

        assert!(matches!(err, FakeError::Harness(Error::InvalidReadPercentage(_))));
        assert_eq!(ds.reads(), 0);
    }
}
