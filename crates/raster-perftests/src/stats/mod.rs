//! Statistical reduction of latency samples
//!
//! This module provides the summary statistics used by
//! [`TestResults`](crate::results::TestResults): median, mean, variance with a
//! degrees-of-freedom correction, and Student's-t confidence intervals.
//!
//! # Examples
//!
//! ```
//! use raster_perftests::stats::{mean, median, variance, ConfidenceInterval};
//!
//! let samples = vec![0.12, 0.10, 0.11, 0.13, 0.12];
//! let mean = mean(&samples);
//! let stdev = variance(&samples, 1).sqrt();
//!
//! let ci = ConfidenceInterval::from_moments(mean, stdev, samples.len(), 1, 95.0).unwrap();
//! assert!(ci.lower < ci.mean && ci.mean < ci.upper);
//! println!("median {:?}", median(&samples));
//! ```

pub mod confidence;
pub mod moments;
pub mod percentiles;

pub use confidence::{ConfidenceInterval, DEFAULT_CONFIDENCE_LEVEL};
pub use moments::{mean, variance};
pub use percentiles::{median, percentile};
