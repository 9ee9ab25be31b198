//! Grouped means over a [`FilteredView`].
//!
//! Missing pollutant values are skipped, so a group whose values are all
//! missing (or a query over an empty view) yields `NaN` rather than failing.
//! Grouping uses `BTreeMap`, which gives every table a deterministic sort
//! order and makes the worst-station tie-break lexicographic.

use std::collections::BTreeMap;

use super::error::DataError;
use super::filter::FilteredView;
use super::stations::{Coordinate, StationCoordinates};

#[derive(Debug, Clone, Copy, Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn value(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.sum / self.count as f64
        }
    }
}

// ---------------------------------------------------------------------------
// Result shapes handed to the presentation layer
// ---------------------------------------------------------------------------

/// Headline numbers for the metrics row.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalSummary {
    pub observation_count: usize,
    pub mean_pm25: f64,
    pub mean_pm10: f64,
    /// Station with the highest mean PM2.5; `None` when no station has a
    /// valid PM2.5 reading.
    pub worst_station: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearlyTrendRow {
    pub year: i32,
    pub station: String,
    pub mean_pm25: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyRow {
    pub month: u32,
    pub mean_pm25: f64,
    pub mean_pm10: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StationRow {
    pub station: String,
    pub coordinate: Coordinate,
    pub mean_pm25: f64,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

pub fn global_summary(view: &FilteredView<'_>) -> GlobalSummary {
    let mut pm25 = Mean::default();
    let mut pm10 = Mean::default();
    for o in view.iter() {
        pm25.push(o.pm25());
        pm10.push(o.pm10());
    }

    // Strictly-greater keeps the lexicographically first station on ties.
    let mut worst: Option<(&str, f64)> = None;
    for (station, mean) in station_means(view) {
        let value = mean.value();
        if value.is_nan() {
            continue;
        }
        if worst.map_or(true, |(_, best)| value > best) {
            worst = Some((station, value));
        }
    }

    GlobalSummary {
        observation_count: view.len(),
        mean_pm25: pm25.value(),
        mean_pm10: pm10.value(),
        worst_station: worst.map(|(s, _)| s.to_string()),
    }
}

/// Mean PM2.5 per non-empty `(year, station)` pair, sorted by year then station.
pub fn yearly_trend(view: &FilteredView<'_>) -> Vec<YearlyTrendRow> {
    let mut groups: BTreeMap<(i32, &str), Mean> = BTreeMap::new();
    for o in view.iter() {
        groups.entry((o.year(), o.station())).or_default().push(o.pm25());
    }
    groups
        .into_iter()
        .map(|((year, station), mean)| YearlyTrendRow {
            year,
            station: station.to_string(),
            mean_pm25: mean.value(),
        })
        .collect()
}

/// Mean PM2.5 and PM10 per calendar month across all years and stations.
/// Months without rows are absent, not zero-filled.
pub fn monthly_seasonality(view: &FilteredView<'_>) -> Vec<MonthlyRow> {
    let mut groups: BTreeMap<u32, (Mean, Mean)> = BTreeMap::new();
    for o in view.iter() {
        let (pm25, pm10) = groups.entry(o.month()).or_default();
        pm25.push(o.pm25());
        pm10.push(o.pm10());
    }
    groups
        .into_iter()
        .map(|(month, (pm25, pm10))| MonthlyRow {
            month,
            mean_pm25: pm25.value(),
            mean_pm10: pm10.value(),
        })
        .collect()
}

/// Mean PM2.5 per station joined with its coordinate.
///
/// Fails on the first station (in name order) missing from `coordinates`.
pub fn station_summary(
    view: &FilteredView<'_>,
    coordinates: &StationCoordinates,
) -> Result<Vec<StationRow>, DataError> {
    station_means(view)
        .into_iter()
        .map(|(station, mean)| {
            Ok(StationRow {
                station: station.to_string(),
                coordinate: coordinates.lookup(station)?,
                mean_pm25: mean.value(),
            })
        })
        .collect()
}

fn station_means<'a>(view: &FilteredView<'a>) -> BTreeMap<&'a str, Mean> {
    let mut groups: BTreeMap<&'a str, Mean> = BTreeMap::new();
    for o in view.iter() {
        groups.entry(o.station()).or_default().push(o.pm25());
    }
    groups
}

// ---------------------------------------------------------------------------
// DashboardSummary – all four queries for one filter state
// ---------------------------------------------------------------------------

/// Owned snapshot of every aggregate, recomputed from scratch per interaction.
///
/// The station map keeps its own `Result` so a coordinate mismatch only
/// disables the map.
#[derive(Debug)]
pub struct DashboardSummary {
    pub global: GlobalSummary,
    pub yearly: Vec<YearlyTrendRow>,
    pub monthly: Vec<MonthlyRow>,
    pub stations: Result<Vec<StationRow>, DataError>,
}

impl DashboardSummary {
    pub fn compute(view: &FilteredView<'_>, coordinates: &StationCoordinates) -> Self {
        DashboardSummary {
            global: global_summary(view),
            yearly: yearly_trend(view),
            monthly: monthly_seasonality(view),
            stations: station_summary(view, coordinates),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::NaiveDate;

    use super::*;
    use crate::data::filter::{filter, FilterCriteria};
    use crate::data::model::{AirQualityDataset, Observation};

    fn row(station: &str, y: i32, m: u32, pm25: Option<f64>, pm10: Option<f64>) -> Observation {
        Observation::new(0, station, y, m, 1, pm25, pm10).unwrap()
    }

    fn full_view(ds: &AirQualityDataset) -> FilteredView<'_> {
        filter(ds, &FilterCriteria::full(ds).unwrap())
    }

    fn empty_view(ds: &AirQualityDataset) -> FilteredView<'_> {
        let d = NaiveDate::from_ymd_opt(2013, 1, 1).unwrap();
        filter(ds, &FilterCriteria::new(BTreeSet::new(), d, d).unwrap())
    }

    /// "A" averages 80 and "B" averages 40 over 2013-2015.
    fn two_station_fixture() -> AirQualityDataset {
        let mut rows = Vec::new();
        for year in 2013..=2015 {
            rows.push(row("A", year, 1, Some(70.0), Some(100.0)));
            rows.push(row("A", year, 7, Some(90.0), Some(120.0)));
            rows.push(row("B", year, 1, Some(50.0), Some(60.0)));
            rows.push(row("B", year, 7, Some(30.0), Some(40.0)));
        }
        AirQualityDataset::from_observations(rows)
    }

    #[test]
    fn worst_station_has_highest_mean() {
        let ds = two_station_fixture();
        let summary = global_summary(&full_view(&ds));

        assert_eq!(summary.worst_station.as_deref(), Some("A"));
        assert_eq!(summary.observation_count, 12);
        assert!((summary.mean_pm25 - 60.0).abs() < 1e-9);
        assert!((summary.mean_pm10 - 80.0).abs() < 1e-9);
    }

    #[test]
    fn worst_station_tie_goes_to_first_name() {
        let ds = AirQualityDataset::from_observations(vec![
            row("Zeta", 2013, 1, Some(50.0), None),
            row("Alpha", 2013, 1, Some(50.0), None),
        ]);
        assert_eq!(
            global_summary(&full_view(&ds)).worst_station.as_deref(),
            Some("Alpha")
        );
    }

    #[test]
    fn missing_values_are_skipped_by_means() {
        let ds = AirQualityDataset::from_observations(vec![
            row("A", 2013, 1, Some(10.0), None),
            row("A", 2013, 1, None, Some(30.0)),
            row("B", 2013, 1, None, None),
        ]);
        let summary = global_summary(&full_view(&ds));

        assert_eq!(summary.mean_pm25, 10.0);
        assert_eq!(summary.mean_pm10, 30.0);
        assert_eq!(summary.worst_station.as_deref(), Some("A"));
    }

    #[test]
    fn yearly_trend_groups_by_year_and_station() {
        let ds = two_station_fixture();
        let trend = yearly_trend(&full_view(&ds));

        assert_eq!(trend.len(), 6);
        assert_eq!(
            (trend[0].year, trend[0].station.as_str(), trend[0].mean_pm25),
            (2013, "A", 80.0)
        );
        assert_eq!(
            (trend[1].year, trend[1].station.as_str(), trend[1].mean_pm25),
            (2013, "B", 40.0)
        );
        assert_eq!(trend[5].year, 2015);
    }

    #[test]
    fn yearly_trend_omits_empty_pairs() {
        let ds = AirQualityDataset::from_observations(vec![
            row("A", 2013, 1, Some(1.0), None),
            row("B", 2014, 1, Some(2.0), None),
        ]);
        let trend = yearly_trend(&full_view(&ds));
        let keys: Vec<(i32, &str)> = trend.iter().map(|r| (r.year, r.station.as_str())).collect();
        assert_eq!(keys, vec![(2013, "A"), (2014, "B")]);
    }

    #[test]
    fn monthly_table_only_contains_observed_months() {
        let ds = two_station_fixture();
        let monthly = monthly_seasonality(&full_view(&ds));

        assert_eq!(monthly.len(), 2);
        assert_eq!(monthly[0], MonthlyRow { month: 1, mean_pm25: 60.0, mean_pm10: 80.0 });
        assert_eq!(monthly[1], MonthlyRow { month: 7, mean_pm25: 60.0, mean_pm10: 80.0 });
    }

    #[test]
    fn monthly_table_never_exceeds_twelve_valid_months() {
        let mut rows = Vec::new();
        for year in 2013..=2016 {
            for month in 1..=12 {
                rows.push(row("A", year, month, Some(month as f64), Some(1.0)));
            }
        }
        let ds = AirQualityDataset::from_observations(rows);
        let monthly = monthly_seasonality(&full_view(&ds));

        assert_eq!(monthly.len(), 12);
        assert!(monthly.iter().all(|r| (1..=12).contains(&r.month)));
        assert_eq!(monthly[11].mean_pm25, 12.0);
    }

    #[test]
    fn station_summary_joins_coordinates() {
        let ds = AirQualityDataset::from_observations(vec![
            row("Dongsi", 2013, 1, Some(100.0), None),
            row("Huairou", 2013, 1, Some(20.0), None),
            row("Dongsi", 2013, 2, Some(50.0), None),
        ]);
        let rows = station_summary(&full_view(&ds), &StationCoordinates::beijing()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].station, "Dongsi");
        assert_eq!(rows[0].mean_pm25, 75.0);
        assert_eq!(rows[0].coordinate, Coordinate::new(39.93, 116.42));
        assert_eq!(rows[1].station, "Huairou");
    }

    #[test]
    fn station_missing_from_coordinate_table_is_surfaced() {
        let ds = AirQualityDataset::from_observations(vec![
            row("Dongsi", 2013, 1, Some(100.0), None),
            row("Atlantis", 2013, 1, Some(20.0), None),
        ]);
        let err = station_summary(&full_view(&ds), &StationCoordinates::beijing()).unwrap_err();
        assert!(matches!(err, DataError::UnknownStation(s) if s == "Atlantis"));

        let summary = DashboardSummary::compute(&full_view(&ds), &StationCoordinates::beijing());
        assert!(summary.stations.is_err());
        assert_eq!(summary.global.observation_count, 2);
    }

    #[test]
    fn every_query_tolerates_an_empty_view() {
        let ds = two_station_fixture();
        let view = empty_view(&ds);
        assert!(view.is_empty());

        let summary = DashboardSummary::compute(&view, &StationCoordinates::beijing());
        assert_eq!(summary.global.observation_count, 0);
        assert!(summary.global.mean_pm25.is_nan());
        assert!(summary.global.mean_pm10.is_nan());
        assert_eq!(summary.global.worst_station, None);
        assert!(summary.yearly.is_empty());
        assert!(summary.monthly.is_empty());
        assert!(summary.stations.unwrap().is_empty());
    }

    #[test]
    fn all_missing_group_has_nan_mean() {
        let ds = AirQualityDataset::from_observations(vec![row("A", 2013, 1, None, None)]);
        let trend = yearly_trend(&full_view(&ds));
        assert_eq!(trend.len(), 1);
        assert!(trend[0].mean_pm25.is_nan());
    }
}
