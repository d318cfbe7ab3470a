//! Color interpolation used to shade chart points by relative magnitude

use crate::{middleware::error_handling::ChartError, models::chart::Rgb};

pub const DEFAULT_BASE_COLOR: &str = "#4a90e2";
pub const DEFAULT_LIGHT_COLOR: &str = "#d0e6ff";

/// Linear per-channel interpolation from `from` (factor 0) to `to` (factor 1).
///
/// The factor is not clamped; a factor outside [0, 1] extrapolates and the
/// result saturates at the 0..=255 channel bounds.
pub fn interpolate(from: Rgb, to: Rgb, factor: f64) -> Rgb {
    let channel = |a: u8, b: u8| -> u8 {
        let a = f64::from(a);
        let b = f64::from(b);
        // `as` saturates out-of-range floats and maps NaN to 0
        (a + factor * (b - a)).round() as u8
    };

    Rgb::new(
        channel(from.r, to.r),
        channel(from.g, to.g),
        channel(from.b, to.b),
    )
}

/// Parse `#rrggbb` (the leading `#` is optional).
pub fn hex_to_rgb(hex: &str) -> Result<Rgb, ChartError> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ChartError::InvalidColor(hex.to_string()));
    }

    let pair = |start: usize| {
        u8::from_str_radix(&digits[start..start + 2], 16)
            .map_err(|_| ChartError::InvalidColor(hex.to_string()))
    };

    Ok(Rgb::new(pair(0)?, pair(2)?, pair(4)?))
}

/// The two reference colors a chart's points are shaded between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartPalette {
    pub base: Rgb,
    pub light: Rgb,
}

impl ChartPalette {
    pub fn new(base: Rgb, light: Rgb) -> Self {
        Self { base, light }
    }

    pub fn from_hex(base: &str, light: &str) -> Result<Self, ChartError> {
        Ok(Self::new(hex_to_rgb(base)?, hex_to_rgb(light)?))
    }

    /// Color for a point whose intensity is `intensity`; clamped to [0, 1].
    pub fn color_for(&self, intensity: f64) -> Rgb {
        let factor = if intensity.is_nan() {
            0.0
        } else {
            intensity.clamp(0.0, 1.0)
        };
        interpolate(self.base, self.light, factor)
    }
}

impl Default for ChartPalette {
    fn default() -> Self {
        Self {
            base: Rgb::new(0x4a, 0x90, 0xe2),
            light: Rgb::new(0xd0, 0xe6, 0xff),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAVY: Rgb = Rgb::new(0, 0, 128);
    const WHITE: Rgb = Rgb::new(255, 255, 255);

    #[test]
    fn test_interpolate_same_color_is_identity() {
        let c = Rgb::new(12, 200, 99);
        for factor in [0.0, 0.25, 0.5, 1.0, 3.0] {
            assert_eq!(interpolate(c, c, factor), c);
        }
    }

    #[test]
    fn test_interpolate_endpoints() {
        assert_eq!(interpolate(NAVY, WHITE, 0.0), NAVY);
        assert_eq!(interpolate(NAVY, WHITE, 1.0), WHITE);
    }

    #[test]
    fn test_interpolate_midpoint_rounds() {
        // 0 + 0.5 * 255 = 127.5 -> 128; 128 + 0.5 * 127 = 191.5 -> 192
        assert_eq!(interpolate(NAVY, WHITE, 0.5), Rgb::new(128, 128, 192));
    }

    #[test]
    fn test_interpolate_out_of_range_saturates() {
        assert_eq!(interpolate(NAVY, WHITE, 2.0), Rgb::new(255, 255, 255));
        assert_eq!(interpolate(WHITE, NAVY, 2.0), Rgb::new(0, 0, 1));
    }

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#4a90e2").unwrap(), Rgb::new(74, 144, 226));
        assert_eq!(hex_to_rgb("D0E6FF").unwrap(), Rgb::new(208, 230, 255));
    }

    #[test]
    fn test_hex_to_rgb_rejects_malformed() {
        for bad in ["", "#fff", "#12345g", "#1234567", "blue"] {
            assert_eq!(
                hex_to_rgb(bad),
                Err(ChartError::InvalidColor(bad.to_string())),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_default_palette_matches_hex_constants() {
        let parsed = ChartPalette::from_hex(DEFAULT_BASE_COLOR, DEFAULT_LIGHT_COLOR).unwrap();
        assert_eq!(parsed, ChartPalette::default());
    }

    #[test]
    fn test_palette_clamps_intensity() {
        let palette = ChartPalette::new(NAVY, WHITE);
        assert_eq!(palette.color_for(-0.5), NAVY);
        assert_eq!(palette.color_for(1.5), WHITE);
        assert_eq!(palette.color_for(f64::NAN), NAVY);
    }
}
