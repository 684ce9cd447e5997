use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Sequential colour ramp for the price choropleth
// ---------------------------------------------------------------------------

/// Yellow → orange → red, five stops (ColorBrewer YlOrRd).
const YL_OR_RD: [[u8; 3]; 5] = [
    [255, 255, 178],
    [254, 204, 92],
    [253, 141, 60],
    [240, 59, 32],
    [189, 0, 38],
];

/// Maps a value in `[min, max]` onto the YlOrRd ramp.
/// Stops are blended in linear RGB.
#[derive(Debug, Clone)]
pub struct ColorRamp {
    min: f64,
    max: f64,
    stops: Vec<LinSrgb>,
}

impl ColorRamp {
    pub fn new(min: f64, max: f64) -> Self {
        let stops = YL_OR_RD
            .iter()
            .map(|[r, g, b]| Srgb::new(*r, *g, *b).into_format::<f32>().into_linear())
            .collect();
        ColorRamp { min, max, stops }
    }

    /// Position of `value` on the ramp, clamped to `[0, 1]`.
    fn position(&self, value: f64) -> f32 {
        let span = self.max - self.min;
        if !span.is_finite() || span <= 0.0 || !value.is_finite() {
            return if value >= self.max { 1.0 } else { 0.0 };
        }
        ((value - self.min) / span).clamp(0.0, 1.0) as f32
    }

    /// Colour for `value`, with the given alpha.
    pub fn color_for(&self, value: f64, alpha: u8) -> Color32 {
        let t = self.position(value) * (self.stops.len() - 1) as f32;
        let lo = (t.floor() as usize).min(self.stops.len() - 2);
        let mixed = self.stops[lo].mix(self.stops[lo + 1], t - lo as f32);
        let rgb: Srgb<u8> = Srgb::from_linear(mixed);
        Color32::from_rgba_unmultiplied(rgb.red, rgb.green, rgb.blue, alpha)
    }

    /// `(value, colour)` pairs at each stop, for the legend.
    pub fn legend_entries(&self) -> Vec<(f64, Color32)> {
        let n = self.stops.len() - 1;
        (0..=n)
            .map(|i| {
                let value = self.min + (self.max - self.min) * i as f64 / n as f64;
                (value, self.color_for(value, 255))
            })
            .collect()
    }
}
