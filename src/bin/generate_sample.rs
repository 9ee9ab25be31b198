//! Writes a synthetic `all_data.csv` (or `.parquet`) for the twelve Beijing
//! stations: one row per station per day, 2013-03-01 through 2017-02-28.
//!
//! Usage: `generate_sample [OUTPUT]`

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// Station name and its mean PM2.5 multiplier relative to the city average.
const STATIONS: [(&str, f64); 12] = [
    ("Aotizhongxin", 1.04),
    ("Changping", 0.86),
    ("Dingling", 0.78),
    ("Dongsi", 1.10),
    ("Guanyuan", 1.05),
    ("Gucheng", 1.02),
    ("Huairou", 0.82),
    ("Nongzhanguan", 1.06),
    ("Shunyi", 0.92),
    ("Tiantan", 1.00),
    ("Wanliu", 1.01),
    ("Wanshouxigong", 1.12),
];

const MISSING_RATE: f64 = 0.02;

#[derive(Debug, Serialize)]
struct Row {
    station: &'static str,
    year: i32,
    month: u32,
    day: u32,
    #[serde(rename = "PM2.5")]
    pm25: Option<f64>,
    #[serde(rename = "PM10")]
    pm10: Option<f64>,
}

/// Seeded SplitMix64 stream, so repeated runs write identical files.
struct SampleRng {
    state: u64,
    spare: Option<f64>,
}

impl SampleRng {
    fn seeded(seed: u64) -> Self {
        SampleRng { state: seed, spare: None }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn uniform(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * f64::EPSILON / 2.0
    }

    /// Normal sample via the Marsaglia polar method. Each accepted pair
    /// yields two values; the second is kept for the next call.
    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        if let Some(z) = self.spare.take() {
            return mean + std_dev * z;
        }
        loop {
            let u = 2.0 * self.uniform() - 1.0;
            let v = 2.0 * self.uniform() - 1.0;
            let s = u * u + v * v;
            if s > 0.0 && s < 1.0 {
                let scale = (-2.0 * s.ln() / s).sqrt();
                self.spare = Some(v * scale);
                return mean + std_dev * u * scale;
            }
        }
    }

    /// `None` with probability [`MISSING_RATE`].
    fn maybe(&mut self, value: f64) -> Option<f64> {
        (self.uniform() >= MISSING_RATE).then_some(value)
    }
}

/// City-wide PM2.5 baseline in µg/m³: peaks in January, bottoms out in July,
/// with a slow improvement year over year.
fn seasonal_baseline(date: NaiveDate) -> f64 {
    let phase = (date.ordinal0() as f64 / 365.25) * 2.0 * std::f64::consts::PI;
    let yearly_decline = 1.0 - 0.06 * (date.year() - 2013) as f64;
    (80.0 + 35.0 * phase.cos()) * yearly_decline
}

fn generate_rows(rng: &mut SampleRng) -> Result<Vec<Row>> {
    let start = NaiveDate::from_ymd_opt(2013, 3, 1).context("start date")?;
    let end = NaiveDate::from_ymd_opt(2017, 2, 28).context("end date")?;

    let mut rows = Vec::new();
    for date in start.iter_days().take_while(|d| *d <= end) {
        let baseline = seasonal_baseline(date);
        for &(station, bias) in &STATIONS {
            let pm25 = rng.normal(baseline * bias, baseline * 0.35).max(3.0);
            let pm10 = (pm25 * rng.normal(1.35, 0.12)).max(pm25);
            rows.push(Row {
                station,
                year: date.year(),
                month: date.month(),
                day: date.day(),
                pm25: rng.maybe((pm25 * 10.0).round() / 10.0),
                pm10: rng.maybe((pm10 * 10.0).round() / 10.0),
            });
        }
    }
    Ok(rows)
}

fn write_csv(rows: &[Row], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating output file")?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(rows: &[Row], path: &Path) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("station", DataType::Utf8, false),
        Field::new("year", DataType::Int64, false),
        Field::new("month", DataType::Int64, false),
        Field::new("day", DataType::Int64, false),
        Field::new("PM2.5", DataType::Float64, true),
        Field::new("PM10", DataType::Float64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.station))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.year as i64))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.month as i64))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.day as i64))),
            Arc::new(rows.iter().map(|r| r.pm25).collect::<Float64Array>()),
            Arc::new(rows.iter().map(|r| r.pm10).collect::<Float64Array>()),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let output = std::env::args().nth(1).unwrap_or_else(|| "all_data.csv".to_string());
    let path = Path::new(&output);

    let mut rng = SampleRng::seeded(42);
    let rows = generate_rows(&mut rng)?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("parquet") | Some("pq") => write_parquet(&rows, path)?,
        _ => write_csv(&rows, path)?,
    }

    log::info!("Wrote {} rows for {} stations to {output}", rows.len(), STATIONS.len());
    println!("Wrote {} rows to {output}", rows.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_gives_same_stream() {
        let mut a = SampleRng::seeded(7);
        let mut b = SampleRng::seeded(7);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn uniform_stays_in_unit_interval() {
        let mut rng = SampleRng::seeded(1);
        assert!((0..10_000).map(|_| rng.uniform()).all(|u| (0.0..1.0).contains(&u)));
    }

    #[test]
    fn normal_samples_center_on_the_mean() {
        let mut rng = SampleRng::seeded(3);
        let n = 20_000;
        let mean = (0..n).map(|_| rng.normal(50.0, 5.0)).sum::<f64>() / n as f64;
        assert!((mean - 50.0).abs() < 0.5, "mean {mean}");
    }

    #[test]
    fn one_row_per_station_per_day() {
        let rows = generate_rows(&mut SampleRng::seeded(42)).unwrap();
        // 2013-03-01..=2017-02-28 spans 1461 days
        assert_eq!(rows.len(), 1461 * STATIONS.len());
        assert!(rows.iter().filter_map(|r| r.pm25).all(|v| v >= 3.0));
    }
}
