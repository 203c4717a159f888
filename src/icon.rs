//! Tray icon rasterizer: the glucose value as large as fits on a small,
//! transparent square.

use std::fs;

use ab_glyph::{Font, FontArc, PxScale, Rect, ScaleFont, point};
use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use log::debug;

use crate::present::Presentation;
use crate::theme::Theme;

/// Icon edge in pixels.
pub const ICON_SIZE: u32 = 32;
/// Share of the canvas the text may cover in each direction.
pub const FILL_RATIO: f32 = 0.97;
/// Longest text drawn on the icon.
pub const MAX_CHARS: usize = 3;

const PLACEHOLDER: &str = "--";

const OUTLINE_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

#[cfg(windows)]
const SYSTEM_FONTS: &[&str] = &[
    r"C:\Windows\Fonts\segoeuib.ttf",
    r"C:\Windows\Fonts\arialbd.ttf",
];

#[cfg(target_os = "macos")]
const SYSTEM_FONTS: &[&str] = &[
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
];

#[cfg(not(any(windows, target_os = "macos")))]
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
];

/// Text drawn for a value: at most three characters.
pub fn icon_text(value: i32) -> String {
    value.to_string().chars().take(MAX_CHARS).collect()
}

/// Starting pixel size by digit count. Fewer digits start bigger.
pub fn tier_size(digits: usize) -> f32 {
    match digits {
        0..=2 => 32.0,
        3 => 26.0,
        _ => 20.0,
    }
}

/// Uniform factor that makes a `width` x `height` box fit in `target`
/// both ways.
pub fn fit_factor(width: f32, height: f32, target: f32) -> f32 {
    if width <= 0.0 || height <= 0.0 {
        return 1.0;
    }
    (target / width).min(target / height)
}

/// Hover text for the tray icon.
pub fn tooltip(p: &Presentation) -> String {
    format!(
        "Glicemia: {} mg/dL {} | Aggiornato: {}",
        p.value, p.glyph, p.local_time
    )
}

pub struct IconRenderer {
    font: FontArc,
}

impl IconRenderer {
    pub fn new(font: FontArc) -> Self {
        Self { font }
    }

    /// Uses a bold system font when one is installed, the bundled monospace
    /// font otherwise.
    pub fn load() -> Result<Self> {
        for path in SYSTEM_FONTS {
            if let Ok(bytes) = fs::read(path) {
                if let Ok(font) = FontArc::try_from_vec(bytes) {
                    debug!("tray font: {path}");
                    return Ok(Self::new(font));
                }
            }
        }
        Ok(Self::new(bundled_font()?))
    }

    pub fn render(&self, value: i32, theme: Theme) -> RgbaImage {
        let digits = value.unsigned_abs().to_string().len();
        self.draw(&icon_text(value), tier_size(digits), theme)
    }

    /// Icon shown before the first reading arrives.
    pub fn render_placeholder(&self, theme: Theme) -> RgbaImage {
        self.draw(PLACEHOLDER, tier_size(PLACEHOLDER.len()), theme)
    }

    fn draw(&self, text: &str, base: f32, theme: Theme) -> RgbaImage {
        let mut canvas = RgbaImage::from_pixel(ICON_SIZE, ICON_SIZE, Rgba([0, 0, 0, 0]));
        let Some(measured) = ink_bounds(&self.font, PxScale::from(base), text) else {
            return canvas;
        };
        let target = ICON_SIZE as f32 * FILL_RATIO - 2.0;
        let scale = PxScale::from(base * fit_factor(measured.width(), measured.height(), target));
        let Some(bounds) = ink_bounds(&self.font, scale, text) else {
            return canvas;
        };

        let size = ICON_SIZE as f32;
        let x = ((size - bounds.width()) / 2.0 - bounds.min.x).round() as i32;
        let y = ((size - bounds.height()) / 2.0 - bounds.min.y).round() as i32;

        for (dx, dy) in OUTLINE_OFFSETS {
            draw_text_mut(&mut canvas, theme.outline(), x + dx, y + dy, scale, &self.font, text);
        }
        draw_text_mut(&mut canvas, theme.foreground(), x, y, scale, &self.font, text);
        canvas
    }
}

pub fn bundled_font() -> Result<FontArc> {
    FontArc::try_from_slice(epaint_default_fonts::HACK_REGULAR).context("Bundled font is unreadable")
}

/// Pixel bounds of the inked part of `text`, laid out on one line with the
/// baseline at the font ascent (the same layout `draw_text_mut` uses).
fn ink_bounds(font: &FontArc, scale: PxScale, text: &str) -> Option<Rect> {
    let scaled = font.as_scaled(scale);
    let mut caret = 0.0;
    let mut bounds: Option<Rect> = None;
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        let glyph = id.with_scale_and_position(scale, point(caret, scaled.ascent()));
        caret += scaled.h_advance(id);
        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bb = outlined.px_bounds();
        bounds = Some(match bounds {
            None => bb,
            Some(acc) => Rect {
                min: point(acc.min.x.min(bb.min.x), acc.min.y.min(bb.min.y)),
                max: point(acc.max.x.max(bb.max.x), acc.max.y.max(bb.max.y)),
            },
        });
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::present::ColorZone;

    fn renderer() -> IconRenderer {
        IconRenderer::new(bundled_font().unwrap())
    }

    /// (min_x, min_y, max_x, max_y) of visible pixels.
    fn ink_box(image: &RgbaImage) -> Option<(u32, u32, u32, u32)> {
        let mut found: Option<(u32, u32, u32, u32)> = None;
        for (x, y, px) in image.enumerate_pixels() {
            if px.0[3] > 0 {
                found = Some(match found {
                    None => (x, y, x, y),
                    Some((a, b, c, d)) => (a.min(x), b.min(y), c.max(x), d.max(y)),
                });
            }
        }
        found
    }

    #[test]
    fn truncates_long_values() {
        assert_eq!(icon_text(12345), "123");
        assert_eq!(icon_text(98), "98");
        assert_eq!(icon_text(5), "5");
    }

    #[test]
    fn size_tiers_shrink_with_digits() {
        assert_eq!(tier_size(1), tier_size(2));
        assert!(tier_size(2) > tier_size(3));
        assert!(tier_size(3) > tier_size(4));
        assert_eq!(tier_size(4), tier_size(6));
    }

    #[test]
    fn fit_uses_smaller_factor() {
        assert_eq!(fit_factor(10.0, 5.0, 31.0), 3.1);
        assert_eq!(fit_factor(5.0, 10.0, 31.0), 3.1);
        assert_eq!(fit_factor(0.0, 10.0, 31.0), 1.0);
    }

    #[test]
    fn value_fills_and_is_centered() {
        let image = renderer().render(120, Theme::Dark);
        assert_eq!(image.dimensions(), (ICON_SIZE, ICON_SIZE));
        let (x0, y0, x1, y1) = ink_box(&image).expect("icon has ink");
        let (w, h) = (x1 - x0 + 1, y1 - y0 + 1);
        assert!(w >= 26 || h >= 26, "ink box {w}x{h} is too small");
        let cx = (x0 + x1) as f32 / 2.0;
        let cy = (y0 + y1) as f32 / 2.0;
        assert!((cx - 15.5).abs() <= 3.0, "horizontal center {cx}");
        assert!((cy - 15.5).abs() <= 3.0, "vertical center {cy}");
    }

    #[test]
    fn single_digit_also_fits() {
        let image = renderer().render(7, Theme::Dark);
        let (_, y0, _, y1) = ink_box(&image).expect("icon has ink");
        assert!(y1 - y0 + 1 >= 26, "ink height {}", y1 - y0 + 1);
    }

    #[test]
    fn colors_follow_theme() {
        let dark = renderer().render(88, Theme::Dark);
        assert!(dark.pixels().any(|p| p.0[3] >= 250 && p.0[0] >= 250 && p.0[1] >= 250));
        assert!(!dark.pixels().any(|p| p.0[3] >= 250 && p.0[0] <= 5));

        let light = renderer().render(88, Theme::Light);
        assert!(light.pixels().any(|p| p.0[3] >= 250 && p.0[0] <= 5 && p.0[1] <= 5));
        assert!(!light.pixels().any(|p| p.0[3] >= 250 && p.0[0] >= 250));
    }

    #[test]
    fn corners_stay_transparent() {
        let image = renderer().render(250, Theme::Dark);
        for (x, y) in [(0, 0), (ICON_SIZE - 1, 0), (0, ICON_SIZE - 1), (ICON_SIZE - 1, ICON_SIZE - 1)] {
            assert_eq!(image.get_pixel(x, y).0[3], 0);
        }
    }

    #[test]
    fn placeholder_has_ink() {
        let image = renderer().render_placeholder(Theme::Light);
        assert!(ink_box(&image).is_some());
    }

    #[test]
    fn tooltip_layout() {
        let p = Presentation {
            value: 132,
            glyph: "↗",
            zone: ColorZone::InRange,
            delta: "+3.0".into(),
            local_time: "14:05".into(),
        };
        assert_eq!(tooltip(&p), "Glicemia: 132 mg/dL ↗ | Aggiornato: 14:05");
    }
}
