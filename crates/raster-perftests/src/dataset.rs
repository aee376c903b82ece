//! The dataset capability consumed by the workload drivers
//!
//! Readers for concrete data stores (netCDF stacks, image archives, array
//! databases) live outside this crate. They only need to implement
//! [`Dataset`]; return values are opaque to the harness and are never
//! inspected, only timed.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Grid point index, a location identifier.
pub type Gpi = u64;

/// Spatial cell identifier grouping several grid points.
pub type CellId = u32;

/// Read access to a geospatial raster/time-series dataset.
///
/// Implementations are called sequentially from a single thread and may keep
/// open file handles between calls.
pub trait Dataset {
    type TimeSeries;
    type Image;
    type Data;
    /// Error raised by a read. Harness errors must convert into it so that
    /// drivers can report bad arguments through the same channel.
    type Error: From<Error>;

    /// Read the time series at one grid point, optionally limited to a window.
    fn get_timeseries(
        &mut self,
        gpi: Gpi,
        date_start: Option<NaiveDateTime>,
        date_end: Option<NaiveDateTime>,
    ) -> Result<Self::TimeSeries, Self::Error>;

    /// Read the image at `date_start`, averaged up to `date_end` if given.
    fn get_avg_image(
        &mut self,
        date_start: NaiveDateTime,
        date_end: Option<NaiveDateTime>,
        cell_id: Option<CellId>,
    ) -> Result<Self::Image, Self::Error>;

    /// Read all data of the given cells between two dates.
    fn get_data(
        &mut self,
        date_start: NaiveDateTime,
        date_end: NaiveDateTime,
        cell_ids: &[CellId],
    ) -> Result<Self::Data, Self::Error>;
}

impl<D: Dataset + ?Sized> Dataset for &mut D {
    type TimeSeries = D::TimeSeries;
    type Image = D::Image;
    type Data = D::Data;
    type Error = D::Error;

    fn get_timeseries(
        &mut self,
        gpi: Gpi,
        date_start: Option<NaiveDateTime>,
        date_end: Option<NaiveDateTime>,
    ) -> Result<Self::TimeSeries, Self::Error> {
        (**self).get_timeseries(gpi, date_start, date_end)
    }

    fn get_avg_image(
        &mut self,
        date_start: NaiveDateTime,
        date_end: Option<NaiveDateTime>,
        cell_id: Option<CellId>,
    ) -> Result<Self::Image, Self::Error> {
        (**self).get_avg_image(date_start, date_end, cell_id)
    }

    fn get_data(
        &mut self,
        date_start: NaiveDateTime,
        date_end: NaiveDateTime,
        cell_ids: &[CellId],
    ) -> Result<Self::Data, Self::Error> {
        (**self).get_data(date_start, date_end, cell_ids)
    }
}

/// The read operations of [`Dataset`], used as keys for timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DatasetOp {
    #[serde(rename = "get_timeseries")]
    Timeseries,
    #[serde(rename = "get_avg_image")]
    AvgImage,
    #[serde(rename = "get_data")]
    Data,
}

impl DatasetOp {
    pub const ALL: [DatasetOp; 3] = [DatasetOp::Timeseries, DatasetOp::AvgImage, DatasetOp::Data];

    /// Method name of the operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetOp::Timeseries => "get_timeseries",
            DatasetOp::AvgImage => "get_avg_image",
            DatasetOp::Data => "get_data",
        }
    }
}

impl fmt::Display for DatasetOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DatasetOp::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| format!("unknown dataset operation: {}", s))
    }
}

/// A closed date window `[start, end]`.
///
/// Deserialization goes through [`DateRange::new`], so a reversed window in a
/// config or results file is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = Error;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        DateRange::new(raw.start, raw.end)
    }
}

impl DateRange {
    /// Create a window; fails if `end` is before `start`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> crate::error::Result<Self> {
        if end < start {
            return Err(Error::InvalidDateRange(format!("{} is after {}", start, end)));
        }
        Ok(Self { start, end })
    }

    /// Number of whole days covered.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}
