//! PNG rendering of the compass strip.

use ab_glyph::{FontVec, PxScale};
use font_kit::{family_name::FamilyName, properties::Properties, source::SystemSource};
use image::{ImageBuffer, Rgb, RgbImage};
use imageproc::{
    drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut},
    rect::Rect,
};
use log::{debug, warn};
use std::path::Path;

use super::memory::MemorySurface;
use crate::{
    catalog::{Row, Tint},
    error::{CompassError, Result},
    geometry::strip_offset_px,
    slots::{ElevationIndicator, SlotPool},
};

/// Layout of the rendered strip in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripStyle {
    pub width: u32,
    pub margin: u32,
    pub row_height: u32,
    pub band_height: u32,
    pub font_size: f32,
}

impl Default for StripStyle {
    fn default() -> Self {
        Self {
            width: 512,
            margin: 8,
            row_height: 48,
            band_height: 28,
            font_size: 12.0,
        }
    }
}

impl StripStyle {
    /// Room for the two rows, the band and one displaced icon below
    pub fn height(&self) -> u32 {
        self.margin * 2 + self.row_height * 3 + self.band_height
    }

    pub fn center_x(&self) -> f32 {
        self.width as f32 / 2.0
    }

    /// Image y of a row's icon center at vertical offset zero
    pub fn row_center_y(&self, row: Row) -> f32 {
        let m = self.margin as f32;
        let r = self.row_height as f32;
        match row {
            Row::Above => m + r / 2.0,
            Row::Below => m + r + self.band_height as f32 + r / 2.0,
        }
    }
}

pub struct Colors;

impl Colors {
    pub const BACKGROUND: Rgb<u8> = Rgb([32, 32, 40]);
    pub const BAND: Rgb<u8> = Rgb([64, 64, 76]);
    pub const TICK: Rgb<u8> = Rgb([160, 160, 170]);
    pub const CARDINAL: Rgb<u8> = Rgb([255, 255, 255]);
    pub const NORTH: Rgb<u8> = Rgb([255, 80, 80]);
    pub const TEXT: Rgb<u8> = Rgb([230, 230, 230]);
    pub const DISPLACED: Rgb<u8> = Rgb([255, 165, 0]);
    pub const ARROW: Rgb<u8> = Rgb([120, 220, 255]);
}

fn tint_rgb(tint: Option<Tint>) -> Rgb<u8> {
    let [r, g, b, _] = tint.unwrap_or_default().0;
    Rgb([r, g, b])
}

pub struct StripRenderer {
    pub image: RgbImage,
    style: StripStyle,
    font: Option<FontVec>,
}

impl StripRenderer {
    /// Renderer with a system font; text is skipped when none is found
    pub fn new(style: StripStyle) -> Result<Self> {
        let font = load_system_font();
        if font.is_none() {
            warn!("No system font found, strip text will not be drawn");
        }
        Self::with_font(style, font)
    }

    pub fn with_font(style: StripStyle, font: Option<FontVec>) -> Result<Self> {
        if style.width == 0 || style.row_height == 0 || style.band_height == 0 {
            return Err(CompassError::Render {
                message: format!("degenerate strip size: {:?}", style),
            });
        }
        let image = ImageBuffer::from_pixel(style.width, style.height(), Colors::BACKGROUND);
        Ok(Self { image, style, font })
    }

    pub fn style(&self) -> &StripStyle {
        &self.style
    }

    fn draw_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb<u8>) {
        if width < 1.0 || height < 1.0 {
            return;
        }
        let rect = Rect::at(x.round() as i32, y.round() as i32)
            .of_size(width.round() as u32, height.round() as u32);
        draw_filled_rect_mut(&mut self.image, rect, color);
    }

    fn draw_rect_outline(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb<u8>) {
        if width < 1.0 || height < 1.0 {
            return;
        }
        let rect = Rect::at(x.round() as i32, y.round() as i32)
            .of_size(width.round() as u32, height.round() as u32);
        draw_hollow_rect_mut(&mut self.image, rect, color);
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str, color: Rgb<u8>) {
        let Some(font) = &self.font else {
            return;
        };
        let scale = PxScale::from(self.style.font_size);
        draw_text_mut(
            &mut self.image,
            color,
            x.round() as i32,
            y.round() as i32,
            scale,
            font,
            text,
        );
    }

    /// Band with a tick every 15 degrees and labels on the cardinals
    pub fn draw_band(&mut self, heading: f32, uv_width_fraction: f32) {
        let style = self.style;
        let top = (style.margin + style.row_height) as f32;
        let band_h = style.band_height as f32;
        self.draw_rect(0.0, top, style.width as f32, band_h, Colors::BAND);

        let cx = style.center_x();
        let half = style.width as f32 / 2.0;
        for step in 0..24 {
            let bearing = step as f32 * 15.0;
            let x = cx + strip_offset_px(bearing, heading, style.width as f32, uv_width_fraction);
            if (x - cx).abs() > half {
                continue;
            }
            let label = match step {
                0 => Some("N"),
                6 => Some("E"),
                12 => Some("S"),
                18 => Some("W"),
                _ => None,
            };
            match label {
                Some(text) => {
                    let color = if step == 0 { Colors::NORTH } else { Colors::CARDINAL };
                    self.draw_rect(x - 1.0, top, 2.0, band_h / 3.0, color);
                    self.draw_text(x - style.font_size / 3.0, top + band_h / 3.0, text, color);
                }
                None => self.draw_rect(x, top, 1.0, band_h / 4.0, Colors::TICK),
            }
        }
        // heading marker
        self.draw_rect(cx - 1.0, top + band_h - 3.0, 2.0, 3.0, Colors::CARDINAL);
    }

    /// Active slots of both rows
    pub fn draw_slots(&mut self, pool: &SlotPool<MemorySurface>) {
        let mut drawn = 0;
        for (id, _) in pool.bound_slots() {
            if !pool.is_active(id) {
                continue;
            }
            let Some(surface) = pool.surface(id) else {
                continue;
            };
            self.draw_icon(id.row, surface);
            drawn += 1;
        }
        debug!("Drew {} icons", drawn);
    }

    fn draw_icon(&mut self, row: Row, surface: &MemorySurface) {
        let style = self.style;
        let hw = surface
            .half_width
            .filter(|w| w.is_finite() && *w > 0.0)
            .unwrap_or(style.row_height as f32 / 4.0);
        let cx = style.center_x() + surface.x;
        // surface y is up-positive, image y grows downward
        let cy = style.row_center_y(row) - surface.y;

        self.draw_rect(cx - hw, cy - hw, hw * 2.0, hw * 2.0, tint_rgb(surface.main_tint));
        if surface.y != 0.0 {
            self.draw_rect_outline(
                cx - hw - 1.0,
                cy - hw - 1.0,
                hw * 2.0 + 2.0,
                hw * 2.0 + 2.0,
                Colors::DISPLACED,
            );
        }

        let pip = (hw / 2.0).max(2.0);
        let active_secondaries = surface.secondaries.iter().filter(|s| s.active);
        for (i, secondary) in active_secondaries.enumerate() {
            let x = cx + hw + 1.0 + i as f32 * (pip + 1.0);
            self.draw_rect(x, cy - hw, pip, pip, tint_rgb(secondary.tint));
        }

        match surface.elevation {
            ElevationIndicator::Up => self.draw_rect(cx - 2.0, cy - hw - 4.0, 4.0, 3.0, Colors::ARROW),
            ElevationIndicator::Down => self.draw_rect(cx - 2.0, cy + hw + 1.0, 4.0, 3.0, Colors::ARROW),
            ElevationIndicator::Hidden => {}
        }

        if !surface.text.is_empty() {
            self.draw_text(cx + hw + 2.0, cy, &surface.text, Colors::TEXT);
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.image.save(path)?;
        Ok(())
    }
}

/// Draw the band and every active slot, then write a PNG
pub fn render_strip<P: AsRef<Path>>(
    path: P,
    style: StripStyle,
    heading: f32,
    uv_width_fraction: f32,
    pool: &SlotPool<MemorySurface>,
) -> Result<()> {
    let mut renderer = StripRenderer::new(style)?;
    renderer.draw_band(heading, uv_width_fraction);
    renderer.draw_slots(pool);
    renderer.save(path)
}

fn load_system_font() -> Option<FontVec> {
    let source = SystemSource::new();
    let families = [
        FamilyName::Title("DejaVu Sans".to_string()),
        FamilyName::Title("Arial".to_string()),
        FamilyName::Title("Helvetica".to_string()),
        FamilyName::SansSerif,
    ];

    for family in families {
        if let Ok(handle) = source.select_best_match(&[family], &Properties::new())
            && let Ok(font) = handle.load()
            && let Some(bytes) = font.copy_font_data()
            && let Ok(font) = FontVec::try_from_vec(bytes.to_vec())
        {
            return Some(font);
        }
    }
    None
}
