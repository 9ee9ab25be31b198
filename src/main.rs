mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use anyhow::{Context, Result};
use app::AirQualityApp;
use config::DashboardConfig;
use data::loader;
use data::model::AirQualityDataset;
use data::stations::StationCoordinates;
use eframe::egui;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let config = DashboardConfig::from_env();
    log::debug!("{config:?}");

    // Fatal: there is no default dataset to fall back to.
    let dataset = load_dataset(&config).inspect_err(|e| log::error!("{e:#}"))?;
    let coordinates = StationCoordinates::beijing();
    log::debug!("{} reference station coordinates", coordinates.len());
    let state = AppState::new(dataset, coordinates);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Air Quality Analysis Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(AirQualityApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("failed to start the dashboard window: {e}"))
}

fn load_dataset(config: &DashboardConfig) -> Result<AirQualityDataset> {
    let candidates = loader::candidate_paths(&config.data_file);
    let path = loader::locate_dataset(&config.data_file, &candidates)?;
    log::info!("Loading dataset from {}", path.display());

    let dataset = loader::load_file(&path)
        .with_context(|| format!("loading dataset '{}'", path.display()))?;

    if dataset.is_empty() {
        log::warn!("Dataset '{}' has no rows", path.display());
    } else if let Some((start, end)) = dataset.date_bounds() {
        log::info!(
            "Loaded {} observations from {} stations, {start} to {end}",
            dataset.len(),
            dataset.stations().len()
        );
    }
    Ok(dataset)
}
