use anyhow::Context;
use std::time::Instant;
use tango_archived::chart::{display, plot_series};
use tango_archived::dispatch::parse_parallel;
use tango_archived::plot::{init_logger, parse_cli};
use tango_archived::Series;

fn main() -> anyhow::Result<()> {
    let args = parse_cli("tango_plot_parallel", true);
    init_logger(args.verbose);
    log::info!(
        "read {} file(s) on {} workers and plot to {}",
        args.files.len(),
        args.jobs,
        args.chart.fout.display()
    );

    // nothing is drawn until every file is parsed
    let start = Instant::now();
    let series = parse_parallel(&args.files, &args.format, args.jobs)?;
    let processing_time = start.elapsed().as_secs_f64();
    println!(
        "Time to process {} datasets = {:.3} seconds",
        series.len(),
        processing_time
    );

    let points: usize = series.iter().map(Series::len).sum();
    plot_series(&series, &args.chart)
        .with_context(|| format!("could not plot to {}", args.chart.fout.display()))?;
    println!(
        "Time to plot {} datasets, {} points = {:.3} seconds",
        series.len(),
        points,
        start.elapsed().as_secs_f64() - processing_time
    );

    display(&args.chart.fout, args.viewer.as_deref())?;
    Ok(())
}
