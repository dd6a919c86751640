use super::bitmap::Bitmap;
use crate::utils::color;
use anyhow::Error;
use anyhow::Result;
use fontdue::Font;
use fontdue::FontSettings;
use log::info;

/// Tight bounds of laid out text relative to its origin on the baseline, Y pointing down
/// (`top` is negative for glyphs rising above the baseline).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TextBounds {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

/// Text measuring and rasterizing service used by `TextRect`.
pub trait TextRasterizer {
    fn measure(&self, text: &str, size: f32) -> TextBounds;

    /// Renders `text` into a `width` x `height` bitmap with its baseline on the bottom edge.
    fn rasterize(&self, text: &str, size: f32, color: u32, width: u32, height: u32) -> Bitmap;
}

impl TextBounds {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// Rasterizer backed by a single TrueType/OpenType font.
pub struct FontRasterizer {
    font: Font,
}

struct PlacedGlyph {
    character: char,
    x: f32,
}

impl FontRasterizer {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let font = Font::from_bytes(data, FontSettings::default()).map_err(Error::msg)?;
        info!("Font {} loaded ({} glyphs)", font.name().unwrap_or("unnamed"), font.glyph_count());

        Ok(Self { font })
    }

    /// Pen positions of every glyph on a single line starting at x = 0.
    fn layout(&self, text: &str, size: f32) -> Vec<PlacedGlyph> {
        let mut glyphs = Vec::with_capacity(text.len());
        let mut pen = 0.0;
        let mut previous = None;

        for character in text.chars() {
            if let Some(previous) = previous {
                pen += self.font.horizontal_kern(previous, character, size).unwrap_or(0.0);
            }

            glyphs.push(PlacedGlyph { character, x: pen });
            pen += self.font.metrics(character, size).advance_width;
            previous = Some(character);
        }

        glyphs
    }
}

impl TextRasterizer for FontRasterizer {
    fn measure(&self, text: &str, size: f32) -> TextBounds {
        let mut bounds: Option<TextBounds> = None;

        for glyph in self.layout(text, size) {
            let metrics = self.font.metrics(glyph.character, size);
            if metrics.width == 0 || metrics.height == 0 {
                continue;
            }

            let left = glyph.x + metrics.xmin as f32;
            let right = left + metrics.width as f32;
            let top = -(metrics.ymin as f32 + metrics.height as f32);
            let bottom = -(metrics.ymin as f32);

            bounds = Some(match bounds {
                Some(b) => TextBounds { left: b.left.min(left), top: b.top.min(top), right: b.right.max(right), bottom: b.bottom.max(bottom) },
                None => TextBounds { left, top, right, bottom },
            });
        }

        bounds.unwrap_or_default()
    }

    fn rasterize(&self, text: &str, size: f32, color: u32, width: u32, height: u32) -> Bitmap {
        let mut bitmap = Bitmap::new(width, height);
        let (r, g, b, a) = color::unpack(color);
        let baseline = height as i32;

        for glyph in self.layout(text, size) {
            let (metrics, coverage) = self.font.rasterize(glyph.character, size);
            let origin_x = (glyph.x + metrics.xmin as f32).round() as i32;
            let origin_y = baseline - metrics.ymin - metrics.height as i32;

            for row in 0..metrics.height {
                for column in 0..metrics.width {
                    let x = origin_x + column as i32;
                    let y = origin_y + row as i32;
                    if x < 0 || y < 0 {
                        continue;
                    }

                    let alpha = coverage[row * metrics.width + column] as u32 * a as u32 / 255;
                    if alpha == 0 {
                        continue;
                    }

                    let source = color::premultiply([r, g, b, alpha as u8]);
                    if let Some(destination) = bitmap.pixel(x as u32, y as u32) {
                        bitmap.set_pixel(x as u32, y as u32, blend_over(source, destination));
                    }
                }
            }
        }

        bitmap
    }
}

/// Premultiplied "source over destination".
fn blend_over(source: [u8; 4], destination: [u8; 4]) -> [u8; 4] {
    let inverse = 255 - source[3] as u32;
    let mut output = [0; 4];

    for ((channel, s), d) in output.iter_mut().zip(source).zip(destination) {
        *channel = (s as u32 + d as u32 * inverse / 255).min(255) as u8;
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::testing::DEJAVU_SANS;

    fn dejavu() -> FontRasterizer {
        FontRasterizer::from_bytes(DEJAVU_SANS).unwrap()
    }

    fn lit_rows(bitmap: &Bitmap) -> Vec<u32> {
        (0..bitmap.height).filter(|&y| (0..bitmap.width).any(|x| bitmap.pixel(x, y).is_some_and(|p| p[3] > 0))).collect()
    }

    #[test]
    fn bounds_dimensions() {
        let bounds = TextBounds { left: 1.0, top: -12.0, right: 41.0, bottom: 3.0 };

        assert_eq!(bounds.width(), 40.0);
        assert_eq!(bounds.height(), 15.0);
        assert_eq!(TextBounds::default().height(), 0.0);
    }

    #[test]
    fn blending_over_transparent_keeps_source() {
        assert_eq!(blend_over([10, 20, 30, 40], [0, 0, 0, 0]), [10, 20, 30, 40]);
    }

    #[test]
    fn opaque_source_replaces_destination() {
        assert_eq!(blend_over([255, 0, 0, 255], [0, 255, 0, 255]), [255, 0, 0, 255]);
    }

    #[test]
    fn half_transparent_source_mixes() {
        assert_eq!(blend_over([128, 0, 0, 128], [0, 254, 0, 254]), [128, 126, 0, 254]);
    }

    #[test]
    fn garbage_font_is_rejected() {
        assert!(FontRasterizer::from_bytes(&[0, 1, 2, 3, 4, 5]).is_err());
    }

    #[test]
    fn blank_text_has_default_bounds() {
        let font = dejavu();

        assert_eq!(font.measure("", 32.0), TextBounds::default());
        assert_eq!(font.measure(" ", 32.0), TextBounds::default());
    }

    #[test]
    fn text_bounds_grow_with_text_and_size() {
        let font = dejavu();
        let hello = font.measure("Hello", 32.0);

        assert!(hello.right > 0.0);
        assert!(hello.top < 0.0);
        assert!(hello.bottom >= 0.0);
        assert!(font.measure("Hello world", 32.0).right > hello.right);
        assert!(font.measure("Hello", 64.0).height() > hello.height());
    }

    #[test]
    fn rasterized_text_fills_measured_bitmap() {
        let font = dejavu();
        let bounds = font.measure("Hello", 32.0);
        let (width, height) = (bounds.right.ceil() as u32, bounds.height().ceil() as u32);
        let bitmap = font.rasterize("Hello", 32.0, color::WHITE, width, height);

        assert_eq!((bitmap.width, bitmap.height), (width, height));

        let lit = bitmap.data.chunks_exact(4).filter(|p| p[3] > 0).collect::<Vec<_>>();
        assert!(!lit.is_empty());
        assert!(lit.iter().all(|p| p[0] == p[3] && p[1] == p[3] && p[2] == p[3]));
    }

    #[test]
    fn baseline_sits_on_bottom_row() {
        let font = dejavu();
        let bounds = font.measure("H", 32.0);
        let (width, height) = (bounds.right.ceil() as u32, bounds.height().ceil() as u32);

        let tight = font.rasterize("H", 32.0, color::WHITE, width, height);
        assert_eq!(lit_rows(&tight).last(), Some(&(height - 1)));

        let tall = font.rasterize("H", 32.0, color::WHITE, width, height + 10);
        let rows = lit_rows(&tall);
        assert_eq!(rows.last(), Some(&(height + 9)));
        assert!(rows[0] >= 10);
    }

    #[test]
    fn color_alpha_scales_coverage() {
        let font = dejavu();
        let bitmap = font.rasterize("H", 32.0, 0xFF000080, 40, 40);

        assert!(bitmap.data.chunks_exact(4).all(|p| p[3] <= 0x80 && p[1] == 0 && p[2] == 0));
        assert!(bitmap.data.chunks_exact(4).any(|p| p[3] > 0));
    }
}
