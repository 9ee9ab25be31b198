use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::color::StationColors;
use crate::data::aggregate::DashboardSummary;
use crate::data::filter::{filter, FilterCriteria};
use crate::data::model::AirQualityDataset;
use crate::data::stations::StationCoordinates;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded once at startup, read-only afterwards.
    pub dataset: AirQualityDataset,

    /// Static reference table for the map.
    pub coordinates: StationCoordinates,

    /// Raw widget values; turned into a [`FilterCriteria`] on every refresh.
    pub selected_stations: BTreeSet<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    /// Aggregates for the last valid selection, `None` while the date range
    /// is invalid.
    pub summary: Option<DashboardSummary>,

    /// Per-station line colours.
    pub station_colors: StationColors,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Start with [`FilterCriteria::full`]; an empty dataset gets today's date.
    pub fn new(dataset: AirQualityDataset, coordinates: StationCoordinates) -> Self {
        let (selected_stations, start_date, end_date) = initial_selection(&dataset);
        let station_colors = StationColors::new(dataset.stations());

        let mut state = Self {
            selected_stations,
            start_date,
            end_date,
            dataset,
            coordinates,
            summary: None,
            station_colors,
            status_message: None,
        };
        state.refresh();
        state
    }

    /// Rebuild criteria from the widgets and recompute every aggregate.
    pub fn refresh(&mut self) {
        let criteria = match FilterCriteria::new(
            self.selected_stations.clone(),
            self.start_date,
            self.end_date,
        ) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("{e}");
                self.status_message = Some(format!("{e}. Please pick a valid date range."));
                self.summary = None;
                return;
            }
        };

        let view = filter(&self.dataset, &criteria);
        if view.is_empty() {
            log::debug!("selection matches no rows");
        }
        log::debug!(
            "{} of {} rows match {} stations in {}..={}",
            view.len(),
            self.dataset.len(),
            criteria.stations().len(),
            criteria.start(),
            criteria.end()
        );

        let summary = DashboardSummary::compute(&view, &self.coordinates);
        if let Err(e) = &summary.stations {
            log::warn!("station map disabled: {e}");
        }
        self.summary = Some(summary);
        self.status_message = None;
    }

    /// Toggle a single station in the selection.
    pub fn toggle_station(&mut self, station: &str) {
        if !self.selected_stations.remove(station) {
            self.selected_stations.insert(station.to_string());
        }
        self.refresh();
    }

    pub fn select_all(&mut self) {
        self.selected_stations = self.dataset.stations().clone();
        self.refresh();
    }

    pub fn select_none(&mut self) {
        self.selected_stations.clear();
        self.refresh();
    }

    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) {
        self.start_date = start;
        self.end_date = end;
        self.refresh();
    }

    /// Back to every station over the full period.
    pub fn reset(&mut self) {
        (self.selected_stations, self.start_date, self.end_date) = initial_selection(&self.dataset);
        self.refresh();
    }
}

fn initial_selection(dataset: &AirQualityDataset) -> (BTreeSet<String>, NaiveDate, NaiveDate) {
    match FilterCriteria::full(dataset) {
        Some(full) => (full.stations().clone(), full.start(), full.end()),
        None => {
            let today = chrono::Local::now().date_naive();
            (BTreeSet::new(), today, today)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::error::DataError;
    use crate::data::model::Observation;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn state() -> AppState {
        let rows = vec![
            Observation::new(0, "Dongsi", 2013, 3, 1, Some(120.0), Some(150.0)).unwrap(),
            Observation::new(1, "Huairou", 2014, 6, 1, Some(30.0), Some(45.0)).unwrap(),
            Observation::new(2, "Dongsi", 2015, 12, 1, Some(200.0), Some(240.0)).unwrap(),
        ];
        AppState::new(
            AirQualityDataset::from_observations(rows),
            StationCoordinates::beijing(),
        )
    }

    #[test]
    fn starts_with_everything_selected() {
        let s = state();
        assert_eq!(s.selected_stations.len(), 2);
        assert_eq!((s.start_date, s.end_date), (date(2013, 3, 1), date(2015, 12, 1)));

        let summary = s.summary.as_ref().unwrap();
        assert_eq!(summary.global.observation_count, 3);
        assert_eq!(summary.global.worst_station.as_deref(), Some("Dongsi"));
        assert!(s.status_message.is_none());
    }

    #[test]
    fn toggling_a_station_recomputes() {
        let mut s = state();
        s.toggle_station("Dongsi");
        let summary = s.summary.as_ref().unwrap();
        assert_eq!(summary.global.observation_count, 1);
        assert_eq!(summary.global.worst_station.as_deref(), Some("Huairou"));

        s.toggle_station("Dongsi");
        assert_eq!(s.summary.as_ref().unwrap().global.observation_count, 3);
    }

    #[test]
    fn select_none_gives_empty_but_valid_summary() {
        let mut s = state();
        s.select_none();
        let summary = s.summary.as_ref().unwrap();
        assert_eq!(summary.global.observation_count, 0);
        assert!(summary.global.mean_pm25.is_nan());

        s.select_all();
        assert_eq!(s.summary.as_ref().unwrap().global.observation_count, 3);
    }

    #[test]
    fn inverted_range_is_reported_and_recoverable() {
        let mut s = state();
        s.set_date_range(date(2015, 1, 1), date(2014, 1, 1));
        assert!(s.summary.is_none());
        assert!(s.status_message.as_deref().unwrap().contains("invalid date range"));

        s.set_date_range(date(2014, 1, 1), date(2015, 1, 1));
        assert_eq!(s.summary.as_ref().unwrap().global.observation_count, 1);
        assert!(s.status_message.is_none());
    }

    #[test]
    fn reset_restores_the_full_selection() {
        let mut s = state();
        s.select_none();
        s.set_date_range(date(2014, 1, 1), date(2014, 12, 31));
        s.reset();

        let full = FilterCriteria::full(&s.dataset).unwrap();
        assert_eq!(&s.selected_stations, full.stations());
        assert_eq!((s.start_date, s.end_date), (full.start(), full.end()));
        assert_eq!(s.summary.as_ref().unwrap().global.observation_count, 3);
    }

    #[test]
    fn empty_dataset_starts_with_an_empty_valid_selection() {
        let s = AppState::new(
            AirQualityDataset::from_observations(Vec::new()),
            StationCoordinates::beijing(),
        );
        assert!(s.selected_stations.is_empty());
        assert_eq!(s.start_date, s.end_date);
        let summary = s.summary.as_ref().unwrap();
        assert_eq!(summary.global.observation_count, 0);
        assert!(summary.stations.as_ref().unwrap().is_empty());
    }

    #[test]
    fn unknown_station_only_disables_the_map() {
        let rows = vec![
            Observation::new(0, "Dongsi", 2013, 3, 1, Some(1.0), None).unwrap(),
            Observation::new(1, "Xicheng", 2013, 3, 1, Some(2.0), None).unwrap(),
        ];
        let s = AppState::new(
            AirQualityDataset::from_observations(rows),
            StationCoordinates::beijing(),
        );
        let summary = s.summary.as_ref().unwrap();
        assert!(matches!(&summary.stations, Err(DataError::UnknownStation(name)) if name == "Xicheng"));
        assert_eq!(summary.yearly.len(), 2);
    }
}
