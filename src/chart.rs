//! Overlay the parsed series on a single time-series chart.

use super::{min_and_max, suitable_xfmt, Error, Result, Series};
use chrono::prelude::*;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const DEFAULT_CHART: &str = "archived_data.svg";

/// Output file and size of the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub fout: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl Default for ChartOptions {
    fn default() -> ChartOptions {
        ChartOptions {
            fout: PathBuf::from(DEFAULT_CHART),
            width: 1600,
            height: 800,
        }
    }
}

fn chart_err<E: std::fmt::Display>(e: E) -> Error {
    Error::Chart(e.to_string())
}

/// Common axes over all the series, with margins.
/// NaN and infinite values are left out; errors with NoData if nothing is left.
pub fn bounds(series: &[Series]) -> Result<(Range<DateTime<Utc>>, Range<f64>)> {
    let finite = || {
        series
            .iter()
            .flat_map(|s| s.points())
            .filter(|(_, v)| v.is_finite())
    };
    let (xmindt, xmaxdt) = min_and_max(finite().map(|(t, _)| t)).ok_or(Error::NoData)?;
    let (ymin, ymax) = min_and_max(finite().map(|(_, v)| v)).ok_or(Error::NoData)?;

    let xspan: chrono::Duration = xmaxdt - xmindt;
    let xmargin = if xspan > chrono::Duration::zero() {
        xspan / 20
    } else {
        chrono::Duration::seconds(1)
    };
    let xminutc = Utc.from_utc_datetime(&(xmindt - xmargin));
    let xmaxutc = Utc.from_utc_datetime(&(xmaxdt + xmargin));

    let yspan = if ymax > ymin {
        (ymax - ymin) / 10f64
    } else if ymax != 0. {
        ymax.abs() / 10f64
    } else {
        1.
    };
    Ok((xminutc..xmaxutc, (ymin - yspan)..(ymax + yspan)))
}

/// Index ranges of the runs of finite values, so that gaps are not bridged.
pub fn finite_runs(values: &[f64]) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start = 0;
    for chunk in values.split(|v| !v.is_finite()) {
        if !chunk.is_empty() {
            runs.push(start..start + chunk.len());
        }
        start += chunk.len() + 1;
    }
    runs
}

/// Draws every series as a labeled line and adds the legend.
/// The backend is picked from the extension of the output: png or svg.
pub fn plot_series(series: &[Series], options: &ChartOptions) -> Result<()> {
    let (xrange, yrange) = bounds(series)?;
    let size = (options.width, options.height);
    let ext = options
        .fout
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    match ext.as_deref() {
        Some("png") => {
            let root = BitMapBackend::new(&options.fout, size).into_drawing_area();
            draw(&root, series, xrange, yrange)
        }
        _ => {
            let root = SVGBackend::new(&options.fout, size).into_drawing_area();
            draw(&root, series, xrange, yrange)
        }
    }
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    series: &[Series],
    xrange: Range<DateTime<Utc>>,
    yrange: Range<f64>,
) -> Result<()> {
    let xfmt = suitable_xfmt(xrange.end - xrange.start);
    root.fill(&WHITE).map_err(chart_err)?;
    let mut chart = ChartBuilder::on(root)
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(100)
        .build_cartesian_2d(xrange, yrange)
        .map_err(chart_err)?;
    chart
        .configure_mesh()
        .light_line_style(&TRANSPARENT)
        .bold_line_style(RGBColor(150, 150, 150).stroke_width(2))
        .set_all_tick_mark_size(2)
        .label_style(("sans-serif", 24))
        .y_desc("value")
        .x_labels(14) // max number of labels
        .x_label_formatter(&|x: &DateTime<Utc>| x.format(xfmt).to_string())
        .y_label_formatter(&|y: &f64| format!("{:5}", y))
        .x_desc(format!("datetime [{}]", xfmt.replace("%", "")))
        .draw()
        .map_err(chart_err)?;

    for (i, s) in series.iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();
        let runs = finite_runs(&s.values);
        if runs.is_empty() {
            log::warn!("{} has no finite values, left out of the chart", s.label);
            continue;
        }
        for (j, run) in runs.into_iter().enumerate() {
            let line = LineSeries::new(
                s.time[run.clone()]
                    .iter()
                    .zip(s.values[run].iter())
                    .map(|(t, v)| (Utc.from_utc_datetime(t), *v)),
                color.stroke_width(2),
            );
            let anno = chart.draw_series(line).map_err(chart_err)?;
            if j == 0 {
                anno.label(s.label.as_str()).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
            }
        }
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font(("sans-serif", 20))
        .draw()
        .map_err(chart_err)?;
    root.present().map_err(chart_err)?;
    Ok(())
}

/// Shows the chart: with a viewer, runs it on the chart file and waits
/// until it is closed; without one, only reports where the chart is.
pub fn display(fout: &Path, viewer: Option<&str>) -> Result<()> {
    let cmd = match viewer {
        Some(cmd) => cmd,
        None => {
            println!("chart written to {}", fout.display());
            return Ok(());
        }
    };
    log::info!("opening {} with {}", fout.display(), cmd);
    let status = Command::new(cmd)
        .arg(fout)
        .status()
        .map_err(|source| Error::Viewer {
            viewer: cmd.to_string(),
            source,
        })?;
    if !status.success() {
        log::warn!("viewer {} exited with {}", cmd, status);
    }
    Ok(())
}
