use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red * 255.0).round() as u8,
        (rgb.green * 255.0).round() as u8,
        (rgb.blue * 255.0).round() as u8,
    )
}

// ---------------------------------------------------------------------------
// Station → line colour
// ---------------------------------------------------------------------------

/// One stable colour per station for the multi-series trend chart.
#[derive(Debug, Clone)]
pub struct StationColors {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl StationColors {
    pub fn new(stations: &BTreeSet<String>) -> Self {
        let palette = generate_palette(stations.len());
        StationColors {
            mapping: stations.iter().cloned().zip(palette).collect(),
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, station: &str) -> Color32 {
        self.mapping
            .get(station)
            .copied()
            .unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Pollution ramp for the station map
// ---------------------------------------------------------------------------

/// White → red → black between `min` and `max`.
///
/// A degenerate range maps to the middle (red); NaN maps to grey.
pub fn pollution_color(value: f64, min: f64, max: f64) -> Color32 {
    if value.is_nan() {
        return Color32::GRAY;
    }
    let span = max - min;
    let t = if span.abs() < f64::EPSILON {
        0.5
    } else {
        ((value - min) / span).clamp(0.0, 1.0) as f32
    };

    let white: LinSrgb = Srgb::new(1.0f32, 1.0, 1.0).into_linear();
    let red: LinSrgb = Srgb::new(1.0f32, 0.0, 0.0).into_linear();
    let black: LinSrgb = Srgb::new(0.0f32, 0.0, 0.0).into_linear();

    let mixed = if t < 0.5 {
        white.mix(red, t * 2.0)
    } else {
        red.mix(black, (t - 0.5) * 2.0)
    };
    to_color32(Srgb::from_linear(mixed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        assert_eq!(generate_palette(12).len(), 12);
    }

    #[test]
    fn stations_get_distinct_colors() {
        let stations: BTreeSet<String> = ["Dongsi", "Tiantan"].iter().map(|s| s.to_string()).collect();
        let colors = StationColors::new(&stations);
        assert_ne!(colors.color_for("Dongsi"), colors.color_for("Tiantan"));
        assert_eq!(colors.color_for("Elsewhere"), Color32::GRAY);
    }

    #[test]
    fn ramp_endpoints() {
        assert_eq!(pollution_color(10.0, 10.0, 90.0), Color32::from_rgb(255, 255, 255));
        assert_eq!(pollution_color(50.0, 10.0, 90.0), Color32::from_rgb(255, 0, 0));
        assert_eq!(pollution_color(90.0, 10.0, 90.0), Color32::from_rgb(0, 0, 0));
        assert_eq!(pollution_color(500.0, 10.0, 90.0), Color32::from_rgb(0, 0, 0));
    }

    #[test]
    fn degenerate_range_and_nan() {
        assert_eq!(pollution_color(42.0, 42.0, 42.0), Color32::from_rgb(255, 0, 0));
        assert_eq!(pollution_color(f64::NAN, 0.0, 1.0), Color32::GRAY);
    }
}
