//! Parse a batch of exports, either one at a time or on a worker pool.

use super::{Error, HeaderFormat, Result, Series};
use rayon::prelude::*;
use std::path::Path;
use std::time::Instant;

/// Number of workers used when none is requested.
pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Parses the files one at a time, in the given order,
/// printing the elapsed time before each file.
/// Stops at the first file that fails.
pub fn parse_sequential<P: AsRef<Path>>(paths: &[P], format: &HeaderFormat) -> Result<Vec<Series>> {
    if paths.is_empty() {
        return Err(Error::NoInput);
    }
    let start = Instant::now();
    let mut series = Vec::with_capacity(paths.len());
    for p in paths {
        println!(
            "[{:.3} s] parsing {}",
            start.elapsed().as_secs_f64(),
            p.as_ref().display()
        );
        series.push(Series::from_archive(p, format)?);
    }
    Ok(series)
}

/// Parses the files on a pool of `jobs` workers (0 lets rayon decide).
/// Results keep the order of `paths` whatever the completion order;
/// any failing file fails the whole batch.
pub fn parse_parallel<P>(paths: &[P], format: &HeaderFormat, jobs: usize) -> Result<Vec<Series>>
where
    P: AsRef<Path> + Sync,
{
    if paths.is_empty() {
        return Err(Error::NoInput);
    }
    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
    log::debug!(
        "parsing {} files on {} workers",
        paths.len(),
        pool.current_num_threads()
    );
    pool.install(|| {
        paths
            .par_iter()
            .map(|p| Series::from_archive(p, format))
            .collect()
    })
}
