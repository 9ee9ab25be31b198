use std::path::{Path, PathBuf};

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use super::error::DataError;
use super::model::{AirQualityDataset, Observation};

/// Columns every input file must provide, in the order they are checked.
pub const REQUIRED_COLUMNS: [&str; 6] = ["station", "year", "month", "day", "PM2.5", "PM10"];

/// Text markers read as a missing measurement, the same set pandas treats as NaN.
const NA_TOKENS: [&str; 14] = [
    "NA", "N/A", "n/a", "#N/A", "<NA>", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None",
    "#NA", "NA/NaN",
];

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// Candidate locations for `file_name`: next to the executable first, then
/// relative to the working directory.
pub fn candidate_paths(file_name: &str) -> Vec<PathBuf> {
    let mut candidates = Vec::with_capacity(2);
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(dir.join(file_name));
    }
    candidates.push(PathBuf::from(file_name));
    candidates
}

/// Return the first candidate that exists, or `DataNotFound` naming all of them.
pub fn locate_dataset(file_name: &str, candidates: &[PathBuf]) -> Result<PathBuf, DataError> {
    candidates
        .iter()
        .find(|p| p.is_file())
        .cloned()
        .ok_or_else(|| DataError::DataNotFound {
            file_name: file_name.to_string(),
            attempted: candidates.to_vec(),
        })
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an air-quality dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, at least the [`REQUIRED_COLUMNS`] (recommended)
/// * `.json`    – `[{ "station": "...", "year": 2013, ..., "PM2.5": 4.0 }, ...]`
/// * `.parquet` – the same columns as an Arrow schema
pub fn load_file(path: &Path) -> Result<AirQualityDataset, DataError> {
    if !path.is_file() {
        return Err(DataError::DataNotFound {
            file_name: path.display().to_string(),
            attempted: vec![path.to_path_buf()],
        });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let observations = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(DataError::UnsupportedFormat(other.to_string())),
    };

    Ok(AirQualityDataset::from_observations(observations))
}

/// One source row before the calendar date is derived.
#[derive(Debug, Deserialize)]
struct RawRecord {
    station: String,
    year: i32,
    month: u32,
    day: u32,
    #[serde(rename = "PM2.5", default, deserialize_with = "measurement")]
    pm25: Option<f64>,
    #[serde(rename = "PM10", default, deserialize_with = "measurement")]
    pm10: Option<f64>,
}

/// A pollutant cell: a number, empty, or one of the [`NA_TOKENS`].
fn measurement<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Cell {
        Number(f64),
        Text(String),
    }

    match Option::<Cell>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Cell::Number(v)) => Ok(Some(v)),
        Some(Cell::Text(text)) => {
            let t = text.trim();
            if t.is_empty() || NA_TOKENS.contains(&t) {
                return Ok(None);
            }
            t.parse::<f64>().map(Some).map_err(|_| {
                D::Error::custom(format!("'{text}' is neither a number nor an NA marker"))
            })
        }
    }
}

impl RawRecord {
    fn into_observation(self, row: usize) -> Result<Observation, DataError> {
        Observation::new(
            row,
            self.station,
            self.year,
            self.month,
            self.day,
            self.pm25,
            self.pm10,
        )
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names; columns beyond
/// [`REQUIRED_COLUMNS`] are ignored. Empty or NA pollutant cells are missing
/// values. Header names are trimmed before matching.
fn load_csv(path: &Path) -> Result<Vec<Observation>, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|e| DataError::Csv(path.to_path_buf(), e))?;

    let headers = reader
        .headers()
        .map_err(|e| DataError::Csv(path.to_path_buf(), e))?
        .clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(DataError::MissingColumn {
                path: path.to_path_buf(),
                column,
            });
        }
    }

    let mut observations = Vec::new();
    for (row, result) in reader.deserialize::<RawRecord>().enumerate() {
        let record = result.map_err(|e| DataError::Csv(path.to_path_buf(), e))?;
        observations.push(record.into_observation(row)?);
    }
    Ok(observations)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
fn load_json(path: &Path) -> Result<Vec<Observation>, DataError> {
    let text = std::fs::read_to_string(path).map_err(|e| DataError::Io(path.to_path_buf(), e))?;
    let records: Vec<RawRecord> =
        serde_json::from_str(&text).map_err(|e| DataError::Json(path.to_path_buf(), e))?;

    records
        .into_iter()
        .enumerate()
        .map(|(row, rec)| rec.into_observation(row))
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with the [`REQUIRED_COLUMNS`].
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`): integer columns may be Int32 or Int64,
/// pollutant columns Float32 or Float64 and nullable.
fn load_parquet(path: &Path) -> Result<Vec<Observation>, DataError> {
    let file = std::fs::File::open(path).map_err(|e| DataError::Io(path.to_path_buf(), e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| DataError::Parquet(path.to_path_buf(), e))?;

    // Checked on the file schema so a file without row groups is still validated.
    let mut indices = Vec::with_capacity(REQUIRED_COLUMNS.len());
    for column in REQUIRED_COLUMNS {
        let idx = builder
            .schema()
            .index_of(column)
            .map_err(|_| DataError::MissingColumn {
                path: path.to_path_buf(),
                column,
            })?;
        indices.push(idx);
    }

    let reader = builder
        .build()
        .map_err(|e| DataError::Parquet(path.to_path_buf(), e))?;

    let mut observations = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;
        let columns: Vec<&ArrayRef> = indices.iter().map(|&idx| batch.column(idx)).collect();

        for i in 0..batch.num_rows() {
            let row = observations.len();
            let station = string_at(columns[0], i).ok_or(DataError::InvalidValue {
                row,
                column: "station",
            })?;
            let year = int_at(columns[1], i).ok_or(DataError::InvalidValue {
                row,
                column: "year",
            })?;
            let month = int_at(columns[2], i).ok_or(DataError::InvalidValue {
                row,
                column: "month",
            })?;
            let day = int_at(columns[3], i).ok_or(DataError::InvalidValue { row, column: "day" })?;

            let observation = Observation::new(
                row,
                station,
                i32::try_from(year).map_err(|_| DataError::InvalidValue { row, column: "year" })?,
                u32::try_from(month).map_err(|_| DataError::InvalidValue {
                    row,
                    column: "month",
                })?,
                u32::try_from(day).map_err(|_| DataError::InvalidValue { row, column: "day" })?,
                float_at(columns[4], i),
                float_at(columns[5], i),
            )?;
            observations.push(observation);
        }
    }

    Ok(observations)
}

// -- Arrow helpers --

fn string_at(col: &ArrayRef, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => Some(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Some(col.as_string::<i64>().value(row).to_string()),
        DataType::Utf8View => Some(col.as_string_view().value(row).to_string()),
        _ => None,
    }
}

fn int_at(col: &ArrayRef, row: usize) -> Option<i64> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Int32 => Some(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => Some(col.as_primitive::<Int64Type>().value(row)),
        _ => None,
    }
}

/// Nulls and unsupported types both read as a missing measurement.
fn float_at(col: &ArrayRef, row: usize) -> Option<f64> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Float64 => Some(col.as_primitive::<Float64Type>().value(row)),
        DataType::Float32 => Some(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Int64 => Some(col.as_primitive::<Int64Type>().value(row) as f64),
        DataType::Int32 => Some(col.as_primitive::<Int32Type>().value(row) as f64),
        _ => None,
    }
}
