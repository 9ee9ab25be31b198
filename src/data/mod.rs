/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  all_data.csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  locate + parse file → AirQualityDataset
///   └──────────┘
///        │
///        ▼
///   ┌───────────────────┐
///   │ AirQualityDataset  │  Vec<Observation>, station index, date span
///   └───────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  stations ∩ [start, end] → FilteredView (indices)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  global / yearly / monthly / per-station means
///   └───────────┘
/// ```

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod stations;
