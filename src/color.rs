use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Accent used for single-series charts (histogram, KPI boxes).
pub const ACCENT: [u8; 3] = [0x4A, 0x90, 0xD9];

/// Generates `n` visually distinct RGB triples using evenly spaced hues.
pub fn palette_rgb(n: usize) -> Vec<[u8; 3]> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.5);
            let rgb: Srgb = hsl.into_color();
            let rgb: Srgb<u8> = rgb.into_format();
            [rgb.red, rgb.green, rgb.blue]
        })
        .collect()
}

/// Same palette as egui colours for the in-window charts.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    palette_rgb(n)
        .into_iter()
        .map(|[r, g, b]| Color32::from_rgb(r, g, b))
        .collect()
}

/// `RRGGBB` form used by DrawingML `srgbClr` elements.
pub fn hex(rgb: [u8; 3]) -> String {
    format!("{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_len_and_distinct() {
        let colors = palette_rgb(5);
        assert_eq!(colors.len(), 5);
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(palette_rgb(0).is_empty());
        assert_eq!(generate_palette(3).len(), 3);
    }

    #[test]
    fn test_hex() {
        assert_eq!(hex(ACCENT), "4A90D9");
        assert_eq!(hex([0, 15, 255]), "000FFF");
    }
}
