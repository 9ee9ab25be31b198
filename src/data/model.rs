use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::error::DataError;

// ---------------------------------------------------------------------------
// Observation – one row of the source table
// ---------------------------------------------------------------------------

/// A single measurement row.
///
/// `date` is derived from `(year, month, day)` in [`Observation::new`]. The
/// fields are private and there are no setters, so `year`/`month` and `date`
/// cannot drift apart.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    station: String,
    year: i32,
    month: u32,
    pm25: Option<f64>,
    pm10: Option<f64>,
    date: NaiveDate,
}

impl Observation {
    /// Build an observation, deriving its calendar date.
    ///
    /// `row` is only used for the error message. NaN pollutant values are
    /// stored as missing.
    pub fn new(
        row: usize,
        station: impl Into<String>,
        year: i32,
        month: u32,
        day: u32,
        pm25: Option<f64>,
        pm10: Option<f64>,
    ) -> Result<Self, DataError> {
        let date = calendar_date(row, year, month, day)?;
        Ok(Observation {
            station: station.into(),
            year,
            month,
            pm25: pm25.filter(|v| !v.is_nan()),
            pm10: pm10.filter(|v| !v.is_nan()),
            date,
        })
    }

    pub fn station(&self) -> &str {
        &self.station
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// PM2.5 concentration in µg/m³, `None` when the source cell was empty.
    pub fn pm25(&self) -> Option<f64> {
        self.pm25
    }

    /// PM10 concentration in µg/m³, `None` when the source cell was empty.
    pub fn pm10(&self) -> Option<f64> {
        self.pm10
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

fn calendar_date(row: usize, year: i32, month: u32, day: u32) -> Result<NaiveDate, DataError> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or(DataError::MalformedDate {
        row,
        year,
        month,
        day,
    })
}

// ---------------------------------------------------------------------------
// AirQualityDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed station index and date span.
///
/// Read-only after construction: there is no API to add, remove or mutate
/// rows.
#[derive(Debug, Clone)]
pub struct AirQualityDataset {
    observations: Vec<Observation>,
    stations: BTreeSet<String>,
    date_bounds: Option<(NaiveDate, NaiveDate)>,
}

impl AirQualityDataset {
    /// Build indices from the loaded observations. Row order is kept as-is.
    pub fn from_observations(observations: Vec<Observation>) -> Self {
        let stations: BTreeSet<String> = observations
            .iter()
            .map(|o| o.station.clone())
            .collect();

        let date_bounds = observations.iter().fold(None, |acc, o| match acc {
            None => Some((o.date, o.date)),
            Some((lo, hi)) => Some((lo.min(o.date), hi.max(o.date))),
        });

        AirQualityDataset {
            observations,
            stations,
            date_bounds,
        }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Sorted unique station names.
    pub fn stations(&self) -> &BTreeSet<String> {
        &self.stations
    }

    /// Earliest and latest observation date, `None` for an empty dataset.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.date_bounds
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}
