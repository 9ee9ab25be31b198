use std::collections::BTreeMap;

use super::error::DataError;

/// Geographic position of a monitoring station in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Coordinate {
            latitude,
            longitude,
        }
    }
}

/// The twelve Beijing monitoring sites of the reference dataset.
pub const BEIJING_STATIONS: [(&str, Coordinate); 12] = [
    ("Aotizhongxin", Coordinate::new(40.00, 116.41)),
    ("Changping", Coordinate::new(40.20, 116.23)),
    ("Dingling", Coordinate::new(40.30, 116.22)),
    ("Dongsi", Coordinate::new(39.93, 116.42)),
    ("Guanyuan", Coordinate::new(39.94, 116.36)),
    ("Gucheng", Coordinate::new(39.93, 116.23)),
    ("Huairou", Coordinate::new(40.36, 116.64)),
    ("Nongzhanguan", Coordinate::new(39.97, 116.47)),
    ("Shunyi", Coordinate::new(40.14, 116.72)),
    ("Tiantan", Coordinate::new(39.87, 116.43)),
    ("Wanliu", Coordinate::new(39.99, 116.32)),
    ("Wanshouxigong", Coordinate::new(39.87, 116.37)),
];

/// Partial lookup table from station name to coordinate.
///
/// A miss is an error, never a silent skip: a station that cannot be placed
/// on the map means the data and the reference table disagree.
#[derive(Debug, Clone)]
pub struct StationCoordinates {
    table: BTreeMap<String, Coordinate>,
}

impl StationCoordinates {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Coordinate)>,
        S: Into<String>,
    {
        StationCoordinates {
            table: entries.into_iter().map(|(s, c)| (s.into(), c)).collect(),
        }
    }

    pub fn beijing() -> Self {
        Self::new(BEIJING_STATIONS)
    }

    pub fn lookup(&self, station: &str) -> Result<Coordinate, DataError> {
        self.table
            .get(station)
            .copied()
            .ok_or_else(|| DataError::UnknownStation(station.to_string()))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }
}

impl Default for StationCoordinates {
    fn default() -> Self {
        Self::beijing()
    }
}
