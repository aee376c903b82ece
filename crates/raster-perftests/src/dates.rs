//! Random date-window generation for image and cell workloads.

use chrono::{Duration, NaiveDateTime};
use rand::Rng;

use crate::dataset::DateRange;
use crate::error::{Error, Result};

/// Default number of generated windows.
pub const DEFAULT_COUNT: usize = 500;
/// Default maximum window length in days.
pub const DEFAULT_MAX_SPREAD_DAYS: i64 = 365;

/// Generate `n` random date windows between `minimum` and `maximum`.
///
/// Each window starts on a whole-day offset drawn uniformly from
/// `[minimum, maximum)` and spans between `min_spread` and `max_spread` days
/// (inclusive). Windows running past `maximum` are cut off there.
///
/// When `minimum == maximum` every window is `[minimum, minimum]`.
///
/// # Errors
///
/// [`Error::InvalidDateRange`] if `maximum < minimum`, a spread is negative, or
/// `min_spread > max_spread`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use rand::thread_rng;
/// use raster_perftests::dates::generate_date_list;
///
/// let min = NaiveDate::from_ymd_opt(2007, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let max = NaiveDate::from_ymd_opt(2012, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
///
/// let windows = generate_date_list(min, max, 10, 0, 30, &mut thread_rng()).unwrap();
/// assert_eq!(windows.len(), 10);
/// assert!(windows.iter().all(|w| w.days() <= 30 && w.end <= max));
/// ```
pub fn generate_date_list<R: Rng + ?Sized>(
    minimum: NaiveDateTime,
    maximum: NaiveDateTime,
    n: usize,
    min_spread: i64,
    max_spread: i64,
    rng: &mut R,
) -> Result<Vec<DateRange>> {
    if maximum < minimum {
        return Err(Error::InvalidDateRange(format!(
            "minimum {} is after maximum {}",
            minimum, maximum
        )));
    }
    if min_spread < 0 || max_spread < min_spread {
        return Err(Error::InvalidDateRange(format!(
            "spread must satisfy 0 <= {} <= {}",
            min_spread, max_spread
        )));
    }

    let delta_days = (maximum - minimum).num_days();

    let windows = (0..n)
        .map(|_| {
            let start = if delta_days > 0 {
                minimum + Duration::days(rng.gen_range(0..delta_days))
            } else {
                minimum
            };
            let end = (start + Duration::days(rng.gen_range(min_spread..=max_spread))).min(maximum);
            DateRange { start, end }
        })
        .collect();

    Ok(windows)
}
