use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

/// Everything that can go wrong between the dataset file and the aggregates.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("dataset '{file_name}' not found (looked in: {})", join_paths(.attempted))]
    DataNotFound {
        file_name: String,
        attempted: Vec<PathBuf>,
    },

    #[error("row {row}: {year}-{month}-{day} is not a valid calendar date")]
    MalformedDate {
        row: usize,
        year: i32,
        month: u32,
        day: u32,
    },

    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("station '{0}' has no entry in the coordinate table")]
    UnknownStation(String),

    #[error("'{}' is missing required column '{column}'", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("row {row}: column '{column}' holds an unreadable value")]
    InvalidValue { row: usize, column: &'static str },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("failed to read '{}'", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse CSV '{}'", .0.display())]
    Csv(PathBuf, #[source] csv::Error),

    #[error("failed to parse JSON '{}'", .0.display())]
    Json(PathBuf, #[source] serde_json::Error),

    #[error("failed to read parquet '{}'", .0.display())]
    Parquet(PathBuf, #[source] parquet::errors::ParquetError),

    #[error("failed to decode arrow record batch")]
    Arrow(#[from] arrow::error::ArrowError),
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p: &PathBuf| display_path(p))
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_path(path: &Path) -> String {
    format!("'{}'", path.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_lists_every_attempted_path() {
        let err = DataError::DataNotFound {
            file_name: "all_data.csv".into(),
            attempted: vec![
                PathBuf::from("/opt/dash/all_data.csv"),
                PathBuf::from("all_data.csv"),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("'/opt/dash/all_data.csv'"));
        assert!(msg.contains(", 'all_data.csv'"));
    }

    #[test]
    fn invalid_range_message_names_both_bounds() {
        let err = DataError::InvalidRange {
            start: NaiveDate::from_ymd_opt(2015, 6, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2014, 1, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "invalid date range: start 2015-06-01 is after end 2014-01-01"
        );
    }
}
