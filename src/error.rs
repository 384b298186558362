//! Errors raised while parsing archiver exports and drawing the chart.

use std::path::PathBuf;
use thiserror::Error;

/// Every failure is fatal to the whole invocation; there is no per-file
/// or per-row recovery.
#[derive(Debug, Error)]
pub enum Error {
    /// No input files were given.
    #[error("no files provided to parse")]
    NoInput,

    /// The file could not be opened or read.
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The header line does not carry the expected resource prefix.
    #[error("header of {} does not contain the prefix {prefix:?}", .path.display())]
    MissingPrefix { path: PathBuf, prefix: String },

    /// The file ends before the header and the ignored second line.
    #[error("{} ends before the data section", .path.display())]
    Truncated { path: PathBuf },

    /// A data row does not split into exactly two fields.
    #[error("{}:{line}: expected 2 comma-separated fields, found {found}", .path.display())]
    FieldCount {
        path: PathBuf,
        line: usize,
        found: usize,
    },

    /// The value column is not a float.
    #[error("{}:{line}: invalid value {value:?}: {source}", .path.display())]
    Value {
        path: PathBuf,
        line: usize,
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    /// The timestamp column is not a date and time.
    #[error("{}:{line}: invalid timestamp {value:?}: {source}", .path.display())]
    Timestamp {
        path: PathBuf,
        line: usize,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// None of the series has a point to draw.
    #[error("no data points to plot")]
    NoData,

    /// The plotting backend failed.
    #[error("could not draw the chart: {0}")]
    Chart(String),

    /// The worker pool could not be started.
    #[error("could not start the worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    /// The chart viewer could not be launched.
    #[error("could not launch viewer {viewer:?}: {source}")]
    Viewer {
        viewer: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
