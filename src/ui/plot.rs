use std::collections::BTreeMap;

use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoint, PlotPoints, Points, Text};

use crate::color::{pollution_color, StationColors};
use crate::data::aggregate::{
    DashboardSummary, GlobalSummary, MonthlyRow, StationRow, YearlyTrendRow,
};
use crate::state::AppState;

const PM25_COLOR: Color32 = Color32::from_rgb(31, 119, 180);
const PM10_COLOR: Color32 = Color32::from_rgb(255, 127, 14);

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render metrics, both trend charts and the station map.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(summary) = &state.summary else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Pick a valid date range to see the analysis.");
        });
        return;
    };

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Global summary");
            metrics(ui, &summary.global);
            ui.add_space(12.0);

            ui.heading("PM2.5 trend by year");
            yearly_trend_plot(ui, &summary.yearly, &state.station_colors);
            ui.add_space(12.0);

            ui.heading("Monthly seasonality of PM2.5 and PM10");
            monthly_plot(ui, &summary.monthly);
            ui.add_space(12.0);

            ui.heading("PM2.5 by station");
            station_map(ui, summary);
        });
}

fn format_concentration(value: f64) -> String {
    if !value.is_finite() {
        "–".to_string()
    } else {
        format!("{value:.2} µg/m³")
    }
}

// ---------------------------------------------------------------------------
// Metrics row
// ---------------------------------------------------------------------------

fn metrics(ui: &mut Ui, global: &GlobalSummary) {
    ui.columns(3, |cols: &mut [Ui]| {
        metric(&mut cols[0], "Mean PM2.5", &format_concentration(global.mean_pm25));
        metric(&mut cols[1], "Mean PM10", &format_concentration(global.mean_pm10));
        metric(
            &mut cols[2],
            "Worst station (PM2.5)",
            global.worst_station.as_deref().unwrap_or("–"),
        );
    });
}

fn metric(ui: &mut Ui, label: &str, value: &str) {
    ui.group(|ui: &mut Ui| {
        ui.label(label);
        ui.label(RichText::new(value).size(24.0).strong());
    });
}

// ---------------------------------------------------------------------------
// Line charts
// ---------------------------------------------------------------------------

fn yearly_trend_plot(ui: &mut Ui, rows: &[YearlyTrendRow], colors: &StationColors) {
    let mut series: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for row in rows.iter().filter(|r| !r.mean_pm25.is_nan()) {
        series
            .entry(row.station.as_str())
            .or_default()
            .push([row.year as f64, row.mean_pm25]);
    }

    Plot::new("yearly_trend")
        .legend(Legend::default())
        .height(320.0)
        .x_axis_label("Year")
        .y_axis_label("Mean PM2.5 (µg/m³)")
        .show(ui, |plot_ui| {
            for (station, points) in series {
                let color = colors.color_for(station);
                plot_ui.line(
                    Line::new(PlotPoints::from(points.clone()))
                        .name(station)
                        .color(color)
                        .width(2.0),
                );
                plot_ui.points(Points::new(points).name(station).color(color).radius(3.5));
            }
        });
}

fn monthly_plot(ui: &mut Ui, rows: &[MonthlyRow]) {
    let pm25: Vec<[f64; 2]> = rows
        .iter()
        .filter(|r| !r.mean_pm25.is_nan())
        .map(|r| [r.month as f64, r.mean_pm25])
        .collect();
    let pm10: Vec<[f64; 2]> = rows
        .iter()
        .filter(|r| !r.mean_pm10.is_nan())
        .map(|r| [r.month as f64, r.mean_pm10])
        .collect();

    Plot::new("monthly_seasonality")
        .legend(Legend::default())
        .height(280.0)
        .include_x(1.0)
        .include_x(12.0)
        .x_axis_label("Month")
        .y_axis_label("Mean concentration (µg/m³)")
        .show(ui, |plot_ui| {
            let series = [("PM2.5", pm25, PM25_COLOR), ("PM10", pm10, PM10_COLOR)];
            for (name, points, color) in series {
                plot_ui.line(
                    Line::new(PlotPoints::from(points.clone()))
                        .name(name)
                        .color(color)
                        .width(2.0),
                );
                plot_ui.points(Points::new(points).name(name).color(color).radius(3.5));
            }
        });
}

// ---------------------------------------------------------------------------
// Station map
// ---------------------------------------------------------------------------

fn station_map(ui: &mut Ui, summary: &DashboardSummary) {
    let rows: &[StationRow] = match &summary.stations {
        Ok(rows) => rows,
        Err(e) => {
            ui.label(RichText::new(format!("Map unavailable: {e}")).color(Color32::RED));
            return;
        }
    };
    if rows.is_empty() {
        ui.label("No stations selected.");
        return;
    }

    let (min, max) = rows
        .iter()
        .map(|r| r.mean_pm25)
        .filter(|v| !v.is_nan())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    ui.label(format!(
        "Colour scale: white {} → black {}",
        format_concentration(min),
        format_concentration(max)
    ));

    Plot::new("station_map")
        .height(460.0)
        .data_aspect(1.0)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .show(ui, |plot_ui| {
            for row in rows {
                let (lon, lat) = (row.coordinate.longitude, row.coordinate.latitude);
                let fill = pollution_color(row.mean_pm25, min, max);
                // outline so white markers stay visible
                plot_ui.points(
                    Points::new(vec![[lon, lat]])
                        .radius(9.0)
                        .color(Color32::DARK_GRAY),
                );
                plot_ui.points(
                    Points::new(vec![[lon, lat]])
                        .name(&row.station)
                        .radius(8.0)
                        .filled(true)
                        .color(fill),
                );
                plot_ui.text(Text::new(
                    PlotPoint::new(lon, lat + 0.025),
                    format!("{}\n{}", row.station, format_concentration(row.mean_pm25)),
                ));
            }
        });
}
