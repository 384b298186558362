use chrono::NaiveDateTime;
use std::path::PathBuf;
use std::process::Command;
use tango_archived::dispatch::{parse_parallel, parse_sequential};
use tango_archived::{HeaderFormat, Series};
use tempfile::TempDir;

fn write_batch(dir: &TempDir, n: usize) -> (Vec<PathBuf>, Vec<Series>) {
    let t0: NaiveDateTime = "2023-06-01T08:00:00".parse().unwrap();
    let mut paths = Vec::with_capacity(n);
    let mut expected = Vec::with_capacity(n);
    for k in 0..n {
        let mut s = Series::new(&format!("R3-319S2/DIA/DCCT-01/CURRENT-{}", k), 200);
        for i in 0..(200 + k * 37) {
            s.time
                .push(t0 + chrono::Duration::microseconds(i as i64 * 250_001));
            s.values.push((i as f64 * 0.01 + k as f64).sin() * 1e-3);
        }
        let path = dir.path().join(format!("dcct-{:04}.csv", k + 1));
        s.to_archive(&path, &HeaderFormat::default()).unwrap();
        paths.push(path);
        expected.push(s);
    }
    (paths, expected)
}

#[test]
fn test_sequential_and_parallel_agree() {
    let dir = TempDir::new().unwrap();
    let (paths, expected) = write_batch(&dir, 8);
    let format = HeaderFormat::default();
    let seq = parse_sequential(&paths, &format).unwrap();
    let par = parse_parallel(&paths, &format, 4).unwrap();
    assert_eq!(seq, expected);
    assert_eq!(par, expected);
}

#[test]
fn test_series_are_index_aligned() {
    let dir = TempDir::new().unwrap();
    let (paths, _) = write_batch(&dir, 3);
    for s in parse_parallel(&paths, &HeaderFormat::default(), 1).unwrap() {
        assert_eq!(s.time.len(), s.values.len());
        assert!(s.time.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn test_missing_file_fails_batch() {
    let dir = TempDir::new().unwrap();
    let (mut paths, _) = write_batch(&dir, 2);
    paths.insert(1, dir.path().join("missing.csv"));
    let format = HeaderFormat::default();
    assert!(parse_sequential(&paths, &format).is_err());
    assert!(parse_parallel(&paths, &format, 2).is_err());
}

#[test]
fn test_cli_without_files_is_usage_error() {
    let dir = TempDir::new().unwrap();
    for bin in [
        env!("CARGO_BIN_EXE_tango_plot"),
        env!("CARGO_BIN_EXE_tango_plot_parallel"),
    ]
    .iter()
    {
        let status = Command::new(bin)
            .current_dir(dir.path())
            .output()
            .unwrap()
            .status;
        assert!(!status.success());
        assert!(!dir.path().join("archived_data.svg").exists());
    }
}
