use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Lab, Mix, Srgb};

/// Fill used for single-series charts (histogram bars, box bodies).
pub const ACCENT: Color32 = Color32::from_rgb(76, 114, 176);

/// Overlay line colour (density curves).
pub const OVERLAY: Color32 = Color32::from_rgb(221, 132, 82);

// Anchor colours of the diverging "coolwarm" map.
const COOL: (u8, u8, u8) = (59, 76, 192);
const NEUTRAL: (u8, u8, u8) = (221, 221, 221);
const WARM: (u8, u8, u8) = (180, 4, 38);

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
            let hsl = Hsl::new(hue, 0.55, 0.5);
            to_color32(hsl.into_color())
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

fn to_lab((r, g, b): (u8, u8, u8)) -> Lab {
    Srgb::new(r, g, b).into_format::<f32>().into_color()
}

// ---------------------------------------------------------------------------
// Diverging map for correlation values
// ---------------------------------------------------------------------------

/// Map a value in `[-1, 1]` onto the coolwarm scale, interpolating in Lab.
/// `NaN` maps to a flat grey.
pub fn coolwarm(value: f64) -> Color32 {
    if value.is_nan() {
        return Color32::from_gray(160);
    }
    let t = value.clamp(-1.0, 1.0) as f32;
    let (from, to, factor) = if t < 0.0 {
        (COOL, NEUTRAL, t + 1.0)
    } else {
        (NEUTRAL, WARM, t)
    };
    let mixed = to_lab(from).mix(to_lab(to), factor);
    to_color32(mixed.into_color())
}

/// Black or white, whichever reads better on `fill`.
pub fn text_on(fill: Color32) -> Color32 {
    let luma = 0.299 * fill.r() as f32 + 0.587 * fill.g() as f32 + 0.114 * fill.b() as f32;
    if luma > 150.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn near(a: Color32, b: (u8, u8, u8)) -> bool {
        let d = |x: u8, y: u8| (x as i16 - y as i16).abs() <= 2;
        d(a.r(), b.0) && d(a.g(), b.1) && d(a.b(), b.2)
    }

    #[test]
    fn coolwarm_hits_its_anchors() {
        assert!(near(coolwarm(-1.0), COOL));
        assert!(near(coolwarm(0.0), NEUTRAL));
        assert!(near(coolwarm(1.0), WARM));
        assert!(near(coolwarm(7.0), WARM));
    }

    #[test]
    fn palette_has_distinct_entries() {
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        assert_ne!(p[0], p[1]);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn text_contrasts_with_fill() {
        assert_eq!(text_on(Color32::WHITE), Color32::BLACK);
        assert_eq!(text_on(coolwarm(1.0)), Color32::WHITE);
    }
}
