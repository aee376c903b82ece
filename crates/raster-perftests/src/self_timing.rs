//! Self-timing dataset wrapper
//!
//! [`SelfTimingDataset`] wraps any [`Dataset`] and records the wall-clock
//! duration of every call to selected read operations, without changing the
//! wrapped reader. Calls are forwarded with identical arguments and their
//! return values are handed back untouched. Everything else the reader
//! offers stays reachable through `Deref`.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDateTime;
//! use raster_perftests::dataset::{CellId, Dataset, DatasetOp, Gpi};
//! use raster_perftests::SelfTimingDataset;
//!
//! struct Noop;
//!
//! impl Dataset for Noop {
//!     type TimeSeries = Gpi;
//!     type Image = ();
//!     type Data = ();
//!     type Error = raster_perftests::Error;
//!
//!     fn get_timeseries(&mut self, gpi: Gpi, _: Option<NaiveDateTime>, _: Option<NaiveDateTime>)
//!         -> Result<Gpi, Self::Error> { Ok(gpi) }
//!     fn get_avg_image(&mut self, _: NaiveDateTime, _: Option<NaiveDateTime>, _: Option<CellId>)
//!         -> Result<(), Self::Error> { Ok(()) }
//!     fn get_data(&mut self, _: NaiveDateTime, _: NaiveDateTime, _: &[CellId])
//!         -> Result<(), Self::Error> { Ok(()) }
//! }
//!
//! let mut timed = SelfTimingDataset::new(Noop);
//! assert_eq!(timed.get_timeseries(12, None, None).unwrap(), 12);
//! assert_eq!(timed.durations(DatasetOp::Timeseries).len(), 1);
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::ops::{Deref, DerefMut};
use std::time::Instant;

use chrono::NaiveDateTime;

use crate::dataset::{CellId, Dataset, DatasetOp, Gpi};
use crate::error::Result;
use crate::results::TestResults;

/// A [`Dataset`] that times selected operations of the dataset it wraps.
///
/// The wrapped value may be owned or a `&mut` borrow. Duration lists only
/// grow; they are never reset for the lifetime of the wrapper.
#[derive(Debug)]
pub struct SelfTimingDataset<D> {
    inner: D,
    timed: BTreeSet<DatasetOp>,
    durations: BTreeMap<DatasetOp, Vec<f64>>,
}

impl<D: Dataset> SelfTimingDataset<D> {
    /// Time all three read operations.
    pub fn new(inner: D) -> Self {
        Self::with_ops(inner, DatasetOp::ALL)
    }

    /// Time only the given operations; the others are forwarded untimed.
    pub fn with_ops(inner: D, ops: impl IntoIterator<Item = DatasetOp>) -> Self {
        let timed: BTreeSet<DatasetOp> = ops.into_iter().collect();
        let durations = timed.iter().map(|&op| (op, Vec::new())).collect();
        Self {
            inner,
            timed,
            durations,
        }
    }

    /// Operations being timed.
    pub fn timed_ops(&self) -> impl Iterator<Item = DatasetOp> + '_ {
        self.timed.iter().copied()
    }

    pub fn is_timed(&self, op: DatasetOp) -> bool {
        self.timed.contains(&op)
    }

    /// Recorded durations in seconds, in call order. Empty for untimed ops.
    pub fn durations(&self, op: DatasetOp) -> &[f64] {
        self.durations.get(&op).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Recorded durations looked up by method name, e.g. `"get_timeseries"`.
    pub fn durations_by_name(&self, name: &str) -> Option<&[f64]> {
        let op = name.parse::<DatasetOp>().ok()?;
        self.durations.get(&op).map(Vec::as_slice)
    }

    /// All duration lists keyed by operation.
    pub fn all_durations(&self) -> &BTreeMap<DatasetOp, Vec<f64>> {
        &self.durations
    }

    /// Reduce the durations of one operation into [`TestResults`].
    ///
    /// # Errors
    ///
    /// [`Error::EmptySamples`](crate::Error::EmptySamples) if the operation was
    /// never called (or is not timed), [`Error::MissingName`](crate::Error::MissingName)
    /// for an empty name.
    pub fn results(
        &self,
        op: DatasetOp,
        name: impl Into<String>,
        ddof: usize,
    ) -> Result<TestResults> {
        TestResults::with_ddof(self.durations(op).to_vec(), name, ddof)
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut D {
        &mut self.inner
    }

    pub fn into_inner(self) -> D {
        self.inner
    }

    /// Dispatch one call, timing it if `op` is selected.
    ///
    /// Only successful calls are recorded.
    fn timed_call<T, E>(
        &mut self,
        op: DatasetOp,
        f: impl FnOnce(&mut D) -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E> {
        let Some(durations) = self.durations.get_mut(&op) else {
            return f(&mut self.inner);
        };

        let start = Instant::now();
        let value = f(&mut self.inner)?;
        durations.push(start.elapsed().as_secs_f64());
        Ok(value)
    }
}

impl<D: Dataset> Dataset for SelfTimingDataset<D> {
    type TimeSeries = D::TimeSeries;
    type Image = D::Image;
    type Data = D::Data;
    type Error = D::Error;

    fn get_timeseries(
        &mut self,
        gpi: Gpi,
        date_start: Option<NaiveDateTime>,
        date_end: Option<NaiveDateTime>,
    ) -> std::result::Result<Self::TimeSeries, Self::Error> {
        self.timed_call(DatasetOp::Timeseries, |ds| ds.get_timeseries(gpi, date_start, date_end))
    }

    fn get_avg_image(
        &mut self,
        date_start: NaiveDateTime,
        date_end: Option<NaiveDateTime>,
        cell_id: Option<CellId>,
    ) -> std::result::Result<Self::Image, Self::Error> {
        self.timed_call(DatasetOp::AvgImage, |ds| ds.get_avg_image(date_start, date_end, cell_id))
    }

    fn get_data(
        &mut self,
        date_start: NaiveDateTime,
        date_end: NaiveDateTime,
        cell_ids: &[CellId],
    ) -> std::result::Result<Self::Data, Self::Error> {
        self.timed_call(DatasetOp::Data, |ds| ds.get_data(date_start, date_end, cell_ids))
    }
}

impl<D> Deref for SelfTimingDataset<D> {
    type Target = D;

    fn deref(&self) -> &D {
        &self.inner
    }
}

impl<D> DerefMut for SelfTimingDataset<D> {
    fn deref_mut(&mut self) -> &mut D {
        &mut self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use chrono::NaiveDate;

    #[derive(Debug, PartialEq)]
    enum FakeError {
        Harness(String),
        Unreadable(Gpi),
    }

    impl From<Error> for FakeError {
        fn from(e: Error) -> Self {
            FakeError::Harness(e.to_string())
        }
    }

    #[derive(Default)]
    struct FakeDataset {
        ts_read: usize,
        img_read: usize,
        cells_read: usize,
    }

    impl FakeDataset {
        fn total_reads(&self) -> usize {
            self.ts_read + self.img_read + self.cells_read
        }
    }

    impl Dataset for FakeDataset {
        type TimeSeries = Vec<f64>;
        type Image = (NaiveDateTime, Option<NaiveDateTime>, Option<CellId>);
        type Data = usize;
        type Error = FakeError;

        fn get_timeseries(
            &mut self,
            gpi: Gpi,
            _date_start: Option<NaiveDateTime>,
            _date_end: Option<NaiveDateTime>,
        ) -> std::result::Result<Vec<f64>, FakeError> {
            if gpi == 666 {
                return Err(FakeError::Unreadable(gpi));
            }
            self.ts_read += 1;
            Ok(vec![gpi as f64; 3])
        }

        fn get_avg_image(
            &mut self,
            date_start: NaiveDateTime,
            date_end: Option<NaiveDateTime>,
            cell_id: Option<CellId>,
        ) -> std::result::Result<Self::Image, FakeError> {
            self.img_read += 1;
            Ok((date_start, date_end, cell_id))
        }

        fn get_data(
            &mut self,
            _date_start: NaiveDateTime,
            _date_end: NaiveDateTime,
            cell_ids: &[CellId],
        ) -> std::result::Result<usize, FakeError> {
            self.cells_read += 1;
            Ok(cell_ids.len())
        }
    }

    fn date() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2007, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn test_records_one_duration_per_call() {
        let mut std_ds = SelfTimingDataset::new(FakeDataset::default());
        for k in 0..5 {
            let value = std_ds.get_timeseries(k, None, None).unwrap();
            assert_eq!(value, vec![k as f64; 3]);
        }

        assert_eq!(std_ds.durations(DatasetOp::Timeseries).len(), 5);
        assert_eq!(std_ds.durations_by_name("get_timeseries").unwrap().len(), 5);
        assert!(std_ds.durations(DatasetOp::AvgImage).is_empty());
        assert_eq!(std_ds.ts_read, 5);
    }

    #[test]
    fn test_passes_arguments_and_return_values_through() {
        let mut std_ds = SelfTimingDataset::new(FakeDataset::default());
        let end = date() + chrono::Duration::days(3);

        assert_eq!(
            std_ds.get_avg_image(date(), Some(end), Some(7)).unwrap(),
            (date(), Some(end), Some(7))
        );
        assert_eq!(std_ds.get_data(date(), end, &[1, 2, 3]).unwrap(), 3);
        assert_eq!(std_ds.durations(DatasetOp::AvgImage).len(), 1);
        assert_eq!(std_ds.durations(DatasetOp::Data).len(), 1);
    }

    #[test]
    fn test_untimed_operations_are_forwarded() {
        let mut std_ds = SelfTimingDataset::with_ops(FakeDataset::default(), [DatasetOp::Data]);
        assert!(!std_ds.is_timed(DatasetOp::Timeseries));

        std_ds.get_timeseries(1, None, None).unwrap();
        std_ds.get_data(date(), date(), &[4]).unwrap();

        assert_eq!(std_ds.ts_read, 1);
        assert!(std_ds.durations(DatasetOp::Timeseries).is_empty());
        assert_eq!(std_ds.durations_by_name("get_timeseries"), None);
        assert_eq!(std_ds.durations(DatasetOp::Data).len(), 1);
        assert_eq!(std_ds.timed_ops().collect::<Vec<_>>(), vec![DatasetOp::Data]);
    }

    #[test]
    fn test_failure_propagates_without_recording() {
        let mut std_ds = SelfTimingDataset::new(FakeDataset::default());
        std_ds.get_timeseries(1, None, None).unwrap();

        let err = std_ds.get_timeseries(666, None, None).unwrap_err();
        assert_eq!(err, FakeError::Unreadable(666));
        assert_eq!(std_ds.durations(DatasetOp::Timeseries).len(), 1);
    }

    #[test]
    fn test_delegates_other_access() {
        let mut std_ds = SelfTimingDataset::new(FakeDataset::default());
        std_ds.get_data(date(), date(), &[]).unwrap();

        // Fields and inherent methods of the wrapped dataset
        assert_eq!(std_ds.cells_read, 1);
        assert_eq!(std_ds.total_reads(), 1);
        std_ds.img_read = 10;
        assert_eq!(std_ds.inner().img_read, 10);
        assert_eq!(std_ds.into_inner().total_reads(), 11);
    }

    #[test]
    fn test_wraps_borrowed_dataset() {
        let mut fd = FakeDataset::default();
        {
            let mut std_ds = SelfTimingDataset::new(&mut fd);
            std_ds.get_timeseries(3, None, None).unwrap();
            std_ds.get_timeseries(4, None, None).unwrap();
            assert_eq!(std_ds.durations(DatasetOp::Timeseries).len(), 2);
        }
        assert_eq!(fd.ts_read, 2);
    }

    #[test]
    fn test_reduce_to_results() {
        let mut std_ds = SelfTimingDataset::new(FakeDataset::default());
        for k in 0..4 {
            std_ds.get_timeseries(k, None, None).unwrap();
        }

        let results = std_ds.results(DatasetOp::Timeseries, "ts", 1).unwrap();
        assert_eq!(results.n(), 4);
        assert_eq!(results.samples(), std_ds.durations(DatasetOp::Timeseries));

        assert!(matches!(std_ds.results(DatasetOp::Data, "data", 1), Err(Error::EmptySamples)));
    }
}
