//! Post-run analysis of stored results
//!
//! Loads result files written by a suite, groups their means into a table
//! keyed by caller-defined labels, and compares every pair of results by
//! confidence-interval separation.

use anyhow::{Context, Result};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::results::TestResults;

/// Load every result file in `paths`, in order.
pub fn load_results<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<TestResults>> {
    paths
        .iter()
        .map(|p| {
            let path = p.as_ref();
            debug!("loading {}", path.display());
            TestResults::load(path)
                .with_context(|| format!("Failed to load results: {}", path.display()))
        })
        .collect()
}

/// Mean durations arranged by group and label.
///
/// `labels` keeps first-seen order; each group maps a label to its mean. A
/// label missing from a group has no entry there.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MeanTable {
    pub labels: Vec<String>,
    pub groups: BTreeMap<String, BTreeMap<String, f64>>,
}

impl MeanTable {
    pub fn get(&self, group: &str, label: &str) -> Option<f64> {
        self.groups.get(group)?.get(label).copied()
    }
}

/// Build a [`MeanTable`] from result names.
///
/// `label` maps a result name to its column label (e.g. the chunking scheme)
/// and `group` maps it to the row it belongs to (e.g. the read type). When two
/// results map to the same cell the later one wins.
///
/// # Example
///
/// ```
/// use raster_perftests::analyze::group_means;
/// use raster_perftests::TestResults;
///
/// # fn example() -> raster_perftests::Result<()> {
/// let results = vec![
///     TestResults::new(vec![1.0, 2.0, 3.0], "chunk-a_test-rand-gpi")?,
///     TestResults::new(vec![4.0, 5.0, 6.0], "chunk-b_test-rand-gpi")?,
/// ];
/// let table = group_means(
///     &results,
///     |name| name.split('_').next().unwrap_or(name).to_string(),
///     |name| name.rsplit('_').next().unwrap_or(name).to_string(),
/// );
/// assert_eq!(table.labels, ["chunk-a", "chunk-b"]);
/// assert_eq!(table.get("test-rand-gpi", "chunk-b"), Some(5.0));
/// # Ok(())
/// # }
/// ```
pub fn group_means<L, G>(results: &[TestResults], label: L, group: G) -> MeanTable
where
    L: Fn(&str) -> String,
    G: Fn(&str) -> String,
{
    let mut table = MeanTable::default();
    for r in results {
        let l = label(r.name());
        if !table.labels.contains(&l) {
            table.labels.push(l.clone());
        }
        table
            .groups
            .entry(group(r.name()))
            .or_default()
            .insert(l, r.mean());
    }
    table
}

/// Pairwise comparison of results at one confidence level.
#[derive(Debug, Clone)]
pub struct ComparisonMatrix {
    pub level: f64,
    pub names: Vec<String>,
    /// `cells[i][j]` is the ordering of result `i` relative to result `j`,
    /// `None` where the intervals overlap or are undefined.
    pub cells: Vec<Vec<Option<Ordering>>>,
}

impl ComparisonMatrix {
    /// Indices of results that are clearly faster than every other result.
    pub fn fastest(&self) -> Vec<usize> {
        (0..self.names.len())
            .filter(|&i| {
                self.cells[i]
                    .iter()
                    .enumerate()
                    .all(|(j, c)| i == j || *c == Some(Ordering::Less))
            })
            .collect()
    }
}

/// Compare every result with every other at the 95% level.
pub fn compare_all(results: &[TestResults]) -> ComparisonMatrix {
    compare_all_at(results, crate::stats::DEFAULT_CONFIDENCE_LEVEL)
}

/// Compare every result with every other at `level` percent.
pub fn compare_all_at(results: &[TestResults], level: f64) -> ComparisonMatrix {
    let cells = results
        .iter()
        .map(|a| results.iter().map(|b| a.compare_at(b, level)).collect())
        .collect();

    ComparisonMatrix {
        level,
        names: results.iter().map(|r| r.name().to_string()).collect(),
        cells,
    }
}
