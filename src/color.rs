use eframe::egui::{self, Color32};
use palette::{Hsl, IntoColor, Srgb};

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
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Theme: the two user-picked colours
// ---------------------------------------------------------------------------

/// Background and font colour chosen in the side panel. Presentation only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub background: Color32,
    pub font: Color32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color32::from_rgb(0x00, 0x00, 0x00),
            font: Color32::from_rgb(0xff, 0xff, 0xff),
        }
    }
}

impl Theme {
    /// Push the colours into egui's visuals for this frame.
    pub fn apply(&self, ctx: &egui::Context) {
        let theme = *self;
        ctx.style_mut(|style| {
            style.visuals.panel_fill = theme.background;
            style.visuals.window_fill = theme.background;
            style.visuals.override_text_color = Some(theme.font);
        });
    }
}
