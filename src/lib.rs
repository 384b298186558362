use chrono::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
pub mod chart;
pub mod dispatch;
pub mod error;
pub mod plot;

pub use error::{Error, Result};

pub const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");

/// Timestamp layout of the archiver exports, `_` between date and time.
pub const DT_FORMAT: &str = "%Y-%m-%d_%H:%M:%S%.9f";

/// Resource prefix preceding the attribute name in the export header.
pub const TANGO_PREFIX: &str = "tango://g-v-csdb-0.maxiv.lu.se:10000/";

/// Characters after the label on the header line: closing quote and newline.
pub const HEADER_TRAILING: usize = 2;

/// Where to find the label on the header line of an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderFormat {
    pub prefix: String,
    pub trailing: usize,
}

impl HeaderFormat {
    pub fn new(prefix: &str, trailing: usize) -> HeaderFormat {
        HeaderFormat {
            prefix: prefix.to_string(),
            trailing,
        }
    }

    /// Extracts the label from the raw header line, terminator included.
    /// `\r\n` and `\n` both count as one trailing character.
    /// Returns None when the prefix is absent.
    pub fn label(&self, header: &str) -> Option<String> {
        let start = header.find(&self.prefix)? + self.prefix.len();
        let rest = &header[start..];
        let (rest, terminator) = match rest
            .strip_suffix("\r\n")
            .or_else(|| rest.strip_suffix('\n'))
        {
            Some(body) => (body, 1),
            None => (rest, 0),
        };
        let drop = self.trailing.saturating_sub(terminator);
        let keep = rest.chars().count().saturating_sub(drop);
        Some(rest.chars().take(keep).collect())
    }
}

impl Default for HeaderFormat {
    fn default() -> HeaderFormat {
        HeaderFormat::new(TANGO_PREFIX, HEADER_TRAILING)
    }
}

/// One parsed export: the label and the index-aligned time and value columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub time: Vec<NaiveDateTime>,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(label: &str, capacity: usize) -> Series {
        let time: Vec<NaiveDateTime> = Vec::with_capacity(capacity);
        let values: Vec<f64> = Vec::with_capacity(capacity);
        Series {
            label: label.to_string(),
            time,
            values,
        }
    }

    /// Init a Series from an archiver export.
    /// The first line carries the label, the second line is skipped,
    /// the rest are `timestamp,value` rows.
    /// Any bad row fails the whole file; blank lines are ignored.
    pub fn from_archive<P: AsRef<Path>>(fin: P, format: &HeaderFormat) -> Result<Series> {
        let path = fin.as_ref();
        let io_err = |source: std::io::Error| Error::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(io_err)?;
        let mut buf = BufReader::new(file);

        let mut header = String::new();
        if buf.read_line(&mut header).map_err(io_err)? == 0 {
            return Err(Error::Truncated {
                path: path.to_path_buf(),
            });
        }
        let label = format.label(&header).ok_or_else(|| Error::MissingPrefix {
            path: path.to_path_buf(),
            prefix: format.prefix.clone(),
        })?;

        let mut skipped = String::new();
        if buf.read_line(&mut skipped).map_err(io_err)? == 0 {
            return Err(Error::Truncated {
                path: path.to_path_buf(),
            });
        }

        let mut series = Series::new(&label, 10000);
        for (i, l) in buf.lines().enumerate() {
            let l = l.map_err(io_err)?;
            if l.trim().is_empty() {
                continue;
            }
            let (t, v) = parse_record(&l, path, i + 3)?;
            series.time.push(t);
            series.values.push(v);
        }
        log::debug!(
            "parsed {} points for {} from {}",
            series.len(),
            series.label,
            path.display()
        );
        Ok(series)
    }

    /// Same as `from_archive` with the Tango header layout.
    pub fn from_archive_default<P: AsRef<Path>>(fin: P) -> Result<Series> {
        Series::from_archive(fin, &HeaderFormat::default())
    }

    /// writes the series in the archiver export layout at the given path,
    /// with the header prefix of `format`
    pub fn to_archive<P: AsRef<Path>>(&self, fout: P, format: &HeaderFormat) -> Result<()> {
        let path = fout.as_ref();
        let io_err = |source: std::io::Error| Error::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(io_err)?;
        let mut buf = BufWriter::new(file);
        writeln!(buf, "\"# DATASET= {}{}\"", format.prefix, self.label).map_err(io_err)?;
        writeln!(buf, "\"# SNAPSHOT_TIME= \"").map_err(io_err)?;
        for (t, v) in self.points() {
            writeln!(buf, "{},{}", format_timestamp(&t), v).map_err(io_err)?;
        }
        buf.flush().map_err(io_err)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (NaiveDateTime, f64)> + '_ {
        self.time.iter().copied().zip(self.values.iter().copied())
    }
}

impl std::fmt::Display for Series {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.label)?;
        writeln!(f, "datetime,value")?;
        for (t, v) in self.points() {
            writeln!(f, "{},{}", format_timestamp(&t), v)?
        }
        Ok(())
    }
}

fn parse_record(l: &str, path: &Path, line: usize) -> Result<(NaiveDateTime, f64)> {
    let fields: Vec<&str> = l.split(',').collect();
    if fields.len() != 2 {
        return Err(Error::FieldCount {
            path: path.to_path_buf(),
            line,
            found: fields.len(),
        });
    }
    let t = parse_timestamp(fields[0]).map_err(|source| Error::Timestamp {
        path: path.to_path_buf(),
        line,
        value: fields[0].to_string(),
        source,
    })?;
    let v = fields[1]
        .trim()
        .parse::<f64>()
        .map_err(|source| Error::Value {
            path: path.to_path_buf(),
            line,
            value: fields[1].to_string(),
            source,
        })?;
    Ok((t, v))
}

/// Parses `2023-01-01_12:00:00.000000000`; the fraction is optional.
pub fn parse_timestamp(s: &str) -> std::result::Result<NaiveDateTime, chrono::ParseError> {
    s.trim().replace('_', "T").parse::<NaiveDateTime>()
}

/// Formats a timestamp back to the export layout with nanoseconds.
pub fn format_timestamp(t: &NaiveDateTime) -> String {
    t.format(DT_FORMAT).to_string()
}

pub fn min_and_max<T: std::cmp::PartialOrd + Copy, I: IntoIterator<Item = T>>(
    s: I,
) -> Option<(T, T)> {
    let mut self_iter = s.into_iter();
    let (mut min, mut max) = match self_iter.next() {
        Some(v) => (v, v),
        None => return None,
    };
    for es in self_iter {
        if es > max {
            max = es
        }
        if es < min {
            min = es
        }
    }
    Some((min, max))
}

pub fn suitable_xfmt(d: chrono::Duration) -> &'static str {
    let xfmt = if d > chrono::Duration::weeks(1) {
        "%y-%m-%d"
    } else if d > chrono::Duration::days(1) {
        "%m-%d %H"
    } else if d > chrono::Duration::hours(1) {
        "%d %H:%M"
    } else {
        "%H:%M:%S"
    };
    xfmt
}
