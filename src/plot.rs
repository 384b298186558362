use super::chart::{ChartOptions, DEFAULT_CHART};
use super::dispatch::default_jobs;
use super::{HeaderFormat, HEADER_TRAILING, TANGO_PREFIX, VERSION};
use clap::{App, AppSettings, Arg, ArgMatches};
use env_logger::Builder;
use log::LevelFilter;
use std::ffi::OsString;
use std::path::PathBuf;

/// Settings shared by the sequential and the parallel plotting apps.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotArgs {
    pub files: Vec<PathBuf>,
    pub format: HeaderFormat,
    pub chart: ChartOptions,
    pub jobs: usize,
    pub viewer: Option<String>,
    pub verbose: bool,
}

fn is_number(v: String) -> Result<(), String> {
    match v.parse::<u32>() {
        Ok(_) => Ok(()),
        Err(_) => Err(format!("{} is not a non-negative integer", v)),
    }
}

fn is_positive(v: String) -> Result<(), String> {
    match v.parse::<u32>() {
        Ok(n) if n > 0 => Ok(()),
        _ => Err(format!("{} is not a positive integer", v)),
    }
}

/// Builds the app; `parallel` adds the worker count option.
pub fn app(name: &str, parallel: bool) -> App<'static, 'static> {
    let arg_files = Arg::with_name("files")
        .help("archiver export files to plot")
        .takes_value(true)
        .multiple(true)
        .required(true);
    let arg_output = Arg::with_name("output")
        .help("chart file, svg or png")
        .short("o")
        .long("output")
        .takes_value(true)
        .default_value(DEFAULT_CHART);
    let arg_prefix = Arg::with_name("prefix")
        .help("header text preceding the series label")
        .long("prefix")
        .takes_value(true)
        .default_value(TANGO_PREFIX);
    let arg_trailing = Arg::with_name("trailing")
        .help("number of characters dropped from the end of the header line")
        .long("trailing")
        .takes_value(true)
        .validator(is_number)
        .default_value("2");
    let arg_viewer = Arg::with_name("viewer")
        .help(
            "command to open the chart with, waits until it is closed; \
            without it the chart is only written and its path printed",
        )
        .long("viewer")
        .takes_value(true);
    let arg_width = Arg::with_name("width")
        .help("chart width in pixels")
        .long("width")
        .takes_value(true)
        .validator(is_positive)
        .default_value("1600");
    let arg_height = Arg::with_name("height")
        .help("chart height in pixels")
        .long("height")
        .takes_value(true)
        .validator(is_positive)
        .default_value("800");
    let arg_verbose = Arg::with_name("verbose")
        .help("print verbose information")
        .short("v")
        .long("verbose")
        .takes_value(false)
        .required(false);
    let mut app = App::new(name.to_string())
        .version(VERSION.unwrap_or("unknown"))
        .author("Luca Peruzzo")
        .about("cli app to plot time series exported from the archiver")
        .setting(AppSettings::ArgRequiredElseHelp)
        .arg(arg_files)
        .arg(arg_output)
        .arg(arg_prefix)
        .arg(arg_trailing)
        .arg(arg_viewer)
        .arg(arg_width)
        .arg(arg_height)
        .arg(arg_verbose);
    if parallel {
        let arg_jobs = Arg::with_name("jobs")
            .help("number of parallel workers, defaults to the available cores")
            .short("j")
            .long("jobs")
            .takes_value(true)
            .validator(is_positive);
        app = app.arg(arg_jobs);
    }
    app
}

/// Takes the CLI arguments that control the parsing and plotting.
/// Exits with a usage error when no file is given.
pub fn parse_cli(name: &str, parallel: bool) -> PlotArgs {
    let cli_args = app(name, parallel).get_matches();
    plot_args(&cli_args)
}

/// Same as `parse_cli` on an explicit argument list, returning clap's error.
pub fn parse_cli_from<I, T>(name: &str, parallel: bool, args: I) -> clap::Result<PlotArgs>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli_args = app(name, parallel).get_matches_from_safe(args)?;
    Ok(plot_args(&cli_args))
}

// values are checked by the validators and defaults above
fn plot_args(cli_args: &ArgMatches) -> PlotArgs {
    let files: Vec<PathBuf> = cli_args
        .values_of("files")
        .map(|v| v.map(PathBuf::from).collect())
        .unwrap_or_default();
    let prefix = cli_args.value_of("prefix").unwrap_or(TANGO_PREFIX);
    let trailing = cli_args
        .value_of("trailing")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(HEADER_TRAILING);
    let defaults = ChartOptions::default();
    let chart = ChartOptions {
        fout: PathBuf::from(cli_args.value_of("output").unwrap_or(DEFAULT_CHART)),
        width: cli_args
            .value_of("width")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.width),
        height: cli_args
            .value_of("height")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.height),
    };
    let jobs = cli_args
        .value_of("jobs")
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(default_jobs);
    PlotArgs {
        files,
        format: HeaderFormat::new(prefix, trailing),
        chart,
        jobs,
        viewer: cli_args.value_of("viewer").map(String::from),
        verbose: cli_args.is_present("verbose"),
    }
}

/// Starts the logger at info, or debug when verbose; RUST_LOG overrides.
pub fn init_logger(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_millis()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args =
            parse_cli_from("tango_plot", false, vec!["tango_plot", "a.csv", "b.csv"]).unwrap();
        assert_eq!(
            args.files,
            vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")]
        );
        assert_eq!(args.format, HeaderFormat::default());
        assert_eq!(args.chart, ChartOptions::default());
        assert_eq!(args.jobs, default_jobs());
        assert_eq!(args.viewer, None);
        assert!(!args.verbose);
    }

    #[test]
    fn test_no_files_is_usage_error() {
        assert!(parse_cli_from("tango_plot", false, vec!["tango_plot"]).is_err());
        assert!(parse_cli_from("tango_plot", false, vec!["tango_plot", "-v"]).is_err());
        assert!(parse_cli_from(
            "tango_plot_parallel",
            true,
            vec!["tango_plot_parallel", "-j", "2"]
        )
        .is_err());
    }

    #[test]
    fn test_parallel_options() {
        let args = parse_cli_from(
            "tango_plot_parallel",
            true,
            vec![
                "tango_plot_parallel",
                "-j",
                "3",
                "-o",
                "out.png",
                "--prefix",
                "tango://host:10000/",
                "--trailing",
                "1",
                "--viewer",
                "feh",
                "--width",
                "800",
                "--height",
                "400",
                "-v",
                "x.csv",
            ],
        )
        .unwrap();
        assert_eq!(args.files, vec![PathBuf::from("x.csv")]);
        assert_eq!(args.jobs, 3);
        assert_eq!(args.format, HeaderFormat::new("tango://host:10000/", 1));
        assert_eq!(args.chart.fout, PathBuf::from("out.png"));
        assert_eq!((args.chart.width, args.chart.height), (800, 400));
        assert_eq!(args.viewer.as_deref(), Some("feh"));
        assert!(args.verbose);
    }

    #[test]
    fn test_invalid_values() {
        assert!(parse_cli_from("p", true, vec!["p", "-j", "0", "x.csv"]).is_err());
        assert!(parse_cli_from("p", false, vec!["p", "--trailing", "two", "x.csv"]).is_err());
        assert!(parse_cli_from("p", false, vec!["p", "--width", "-5", "x.csv"]).is_err());
    }

    #[test]
    fn test_trailing_accepts_zero() {
        let args = parse_cli_from("p", false, vec!["p", "--trailing", "0", "x.csv"]).unwrap();
        assert_eq!(args.format.trailing, 0);
        let err = is_number("-1".to_string()).unwrap_err();
        assert_eq!(err, "-1 is not a non-negative integer");
    }

    #[test]
    fn test_jobs_only_for_parallel() {
        assert!(parse_cli_from("p", false, vec!["p", "-j", "2", "x.csv"]).is_err());
    }
}
