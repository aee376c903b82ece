use thiserror::Error;

/// Errors produced by the result engine, the persistence layer and the
/// workload drivers.
///
/// Failures of the measured dataset are never wrapped in this type; they keep
/// the dataset's own error type and propagate unchanged.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Name must be given for new results")]
    MissingName,

    #[error("Results need at least one sample")]
    EmptySamples,

    #[error("{n} samples with ddof {ddof} leave no degrees of freedom")]
    DegenerateSample { n: usize, ddof: usize },

    #[error("Invalid confidence level: {0} (expected a percentage between 0 and 100)")]
    InvalidConfidenceLevel(f64),

    #[error("Invalid read percentage: {0} (expected a percentage between 0 and 100)")]
    InvalidReadPercentage(f64),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Malformed results file: {0}")]
    Format(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
