use std::env;

const DEFAULT_DATA_FILE: &str = "all_data.csv";
const DEFAULT_WINDOW_WIDTH: f32 = 1400.0;
const DEFAULT_WINDOW_HEIGHT: f32 = 900.0;

/// Runtime settings, read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// File name searched next to the executable, then in the working directory.
    pub data_file: String,
    pub window_width: f32,
    pub window_height: f32,
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        DashboardConfig {
            data_file: lookup("AIR_QUALITY_DATA_FILE")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DATA_FILE.to_string()),
            window_width: lookup("AIR_QUALITY_WINDOW_WIDTH")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_WINDOW_WIDTH),
            window_height: lookup("AIR_QUALITY_WINDOW_HEIGHT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_WINDOW_HEIGHT),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
