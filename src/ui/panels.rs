use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // Clone what we need so we can mutate state inside the loop.
    let stations: Vec<String> = state.dataset.stations().iter().cloned().collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Station multiselect ----
            let header_text = format!(
                "Stations  ({}/{})",
                state.selected_stations.len(),
                stations.len()
            );
            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .id_salt("stations")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all();
                        }
                        if ui.small_button("None").clicked() {
                            state.select_none();
                        }
                    });

                    for station in &stations {
                        let mut checked = state.selected_stations.contains(station);
                        let text =
                            RichText::new(station).color(state.station_colors.color_for(station));
                        if ui.checkbox(&mut checked, text).changed() {
                            state.toggle_station(station);
                        }
                    }
                });
            ui.separator();

            // ---- Date range ----
            ui.strong("Date range");
            let mut start = state.start_date;
            let mut end = state.end_date;
            egui::Grid::new("date_range")
                .num_columns(2)
                .show(ui, |ui: &mut Ui| {
                    ui.label("From");
                    ui.add(DatePickerButton::new(&mut start).id_salt("start_date"));
                    ui.end_row();

                    ui.label("To");
                    ui.add(DatePickerButton::new(&mut end).id_salt("end_date"));
                    ui.end_row();
                });

            if start != state.start_date || end != state.end_date {
                state.set_date_range(start, end);
            }

            if ui.small_button("Reset filters").clicked() {
                state.reset();
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the title bar with the selected period and row count.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.strong("Air Quality Analysis Dashboard");

        ui.separator();

        ui.label(format!("Period: {} to {}", state.start_date, state.end_date));

        if let Some(summary) = &state.summary {
            ui.separator();
            ui.label(format!(
                "{} of {} observations",
                summary.global.observation_count,
                state.dataset.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}
