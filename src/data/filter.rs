use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::error::DataError;
use super::model::{AirQualityDataset, Observation};

// ---------------------------------------------------------------------------
// Filter predicate: selected stations plus a closed date interval
// ---------------------------------------------------------------------------

/// User selection, rebuilt from the widgets on every interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    stations: BTreeSet<String>,
    start: NaiveDate,
    end: NaiveDate,
}

impl FilterCriteria {
    /// Fails with `InvalidRange` when `start > end`.
    ///
    /// Stations outside the dataset are allowed; they just match nothing.
    pub fn new(
        stations: BTreeSet<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, DataError> {
        if start > end {
            return Err(DataError::InvalidRange { start, end });
        }
        Ok(FilterCriteria {
            stations,
            start,
            end,
        })
    }

    /// Every station, the dataset's own date span. `None` for an empty dataset.
    pub fn full(dataset: &AirQualityDataset) -> Option<Self> {
        let (start, end) = dataset.date_bounds()?;
        Some(FilterCriteria {
            stations: dataset.stations().clone(),
            start,
            end,
        })
    }

    pub fn stations(&self) -> &BTreeSet<String> {
        &self.stations
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Inclusive on both date bounds.
    pub fn matches(&self, observation: &Observation) -> bool {
        self.stations.contains(observation.station())
            && self.start <= observation.date()
            && observation.date() <= self.end
    }
}

// ---------------------------------------------------------------------------
// FilteredView – the rows passing a FilterCriteria
// ---------------------------------------------------------------------------

/// Indices into a dataset, in dataset order. Never copies or mutates rows.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a AirQualityDataset,
    indices: Vec<usize>,
}

/// Return the view of rows passing `criteria`.
pub fn filter<'a>(dataset: &'a AirQualityDataset, criteria: &FilterCriteria) -> FilteredView<'a> {
    let indices = dataset
        .observations()
        .iter()
        .enumerate()
        .filter(|(_, o)| criteria.matches(o))
        .map(|(i, _)| i)
        .collect();
    FilteredView { dataset, indices }
}

impl<'a> FilteredView<'a> {
    /// Narrow this view further. Applying the same criteria twice is a no-op.
    #[cfg(test)]
    pub fn refine(&self, criteria: &FilterCriteria) -> FilteredView<'a> {
        let dataset = self.dataset;
        let indices = self
            .indices
            .iter()
            .copied()
            .filter(|&i| criteria.matches(&dataset.observations()[i]))
            .collect();
        FilteredView { dataset, indices }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Observation> + '_ {
        let rows = self.dataset.observations();
        self.indices.iter().map(move |&i| &rows[i])
    }

    #[cfg(test)]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

impl PartialEq for FilteredView<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.dataset, other.dataset) && self.indices == other.indices
    }
}
