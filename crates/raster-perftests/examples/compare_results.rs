//! Compare stored result files
//!
//! Usage: cargo run -p raster-perftests --example compare_results -- <a.nc> <b.nc> [...]

use anyhow::Result;
use raster_perftests::analyze::{compare_all, load_results};
use raster_perftests::reporter::{OutputFormat, Reporter};
use std::cmp::Ordering;
use std::env;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let paths: Vec<String> = env::args().skip(1).collect();
    if paths.len() < 2 {
        anyhow::bail!("Usage: compare_results <a.nc> <b.nc> [...]");
    }

    let results = load_results(&paths)?;
    Reporter::new(OutputFormat::Console).report(&results)?;

    let matrix = compare_all(&results);
    for (i, row) in matrix.cells.iter().enumerate() {
        for (j, cell) in row.iter().enumerate().skip(i + 1) {
            let verdict = match cell {
                Some(Ordering::Less) => "faster than",
                Some(Ordering::Greater) => "slower than",
                Some(Ordering::Equal) => "identical to",
                None => "not distinguishable from",
            };
            println!("{} is {} {}", matrix.names[i], verdict, matrix.names[j]);
        }
    }

    Ok(())
}
