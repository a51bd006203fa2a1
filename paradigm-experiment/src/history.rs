use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use paradigm_core::{ParadigmError, RatingEvent, Result};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryWrite {
    Written { rows: usize },
    /// Only the sentinel was recorded.
    Skipped,
}

/// Writes `Rating,Time` rows for every event after the sentinel at index 0.
pub fn write_history(path: &Path, history: &[RatingEvent]) -> Result<HistoryWrite> {
    let events = history.get(1..).unwrap_or_default();
    if events.is_empty() {
        warn!(path = %path.display(), "rating history is empty, nothing written");
        return Ok(HistoryWrite::Skipped);
    }

    let body = format_history(events);
    let io_err = |source| ParadigmError::History {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, body).map_err(io_err)?;

    info!(path = %path.display(), rows = events.len(), "wrote rating history");
    Ok(HistoryWrite::Written { rows: events.len() })
}

fn format_history(events: &[RatingEvent]) -> String {
    let mut out = String::from("Rating,Time\n");
    for event in events {
        let rating = event.rating.map(|r| r.to_string()).unwrap_or_default();
        let _ = writeln!(out, "{},{}", rating, format_time(event.elapsed));
    }
    out
}

/// Seconds rounded to 8 decimals, always with a decimal point (`2.0`, `1.2`).
fn format_time(secs: f64) -> String {
    let rounded = round8(secs);
    if rounded.fract() == 0.0 {
        format!("{rounded:.1}")
    } else {
        rounded.to_string()
    }
}

fn round8(value: f64) -> f64 {
    (value * 1e8).round() / 1e8
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn drops_sentinel_and_formats_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ratings.csv");
        let history = [
            RatingEvent::SENTINEL,
            RatingEvent::new(3.0, 1.2),
            RatingEvent::new(5.0, 2.9),
        ];

        let outcome = write_history(&path, &history).unwrap();

        assert_eq!(outcome, HistoryWrite::Written { rows: 2 });
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Rating,Time\n3,1.2\n5,2.9\n"
        );
    }

    #[test]
    fn sentinel_only_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ratings.csv");
        assert_eq!(
            write_history(&path, &[RatingEvent::SENTINEL]).unwrap(),
            HistoryWrite::Skipped
        );
        assert_eq!(write_history(&path, &[]).unwrap(), HistoryWrite::Skipped);
        assert!(!path.exists());
    }

    #[test]
    fn rounds_time_to_eight_decimals() {
        let rows = format_history(&[RatingEvent::new(7.0, 2.123456789123)]);
        assert_eq!(rows, "Rating,Time\n7,2.12345679\n");
    }

    #[test]
    fn whole_second_times_keep_a_decimal_point() {
        let rows = format_history(&[
            RatingEvent::new(4.0, 2.0),
            RatingEvent::new(3.0, 0.0),
            RatingEvent::new(2.0, 2.999999999),
        ]);
        assert_eq!(rows, "Rating,Time\n4,2.0\n3,0.0\n2,3.0\n");
    }

    #[test]
    fn creates_missing_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sub").join("ratings.csv");
        write_history(&path, &[RatingEvent::SENTINEL, RatingEvent::new(1.0, 0.5)]).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn reports_unwritable_destination() {
        let dir = tempdir().unwrap();
        let err = write_history(dir.path(), &[RatingEvent::SENTINEL, RatingEvent::new(1.0, 0.5)])
            .unwrap_err();
        assert!(matches!(err, ParadigmError::History { .. }));
    }
}
