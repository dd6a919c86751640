use super::backend::GraphicsBackend;
use super::font::TextRasterizer;
use super::shader::ShaderContext;
use super::shape::Shape;
use crate::utils::settings::DrawableSettings;
use log::debug;
use log::warn;
use std::rc::Rc;

const QUAD_VERTICES: usize = 6;

/// Largest side of a text bitmap, in pixels.
pub const MAX_TEXT_EXTENT: f32 = 4096.0;

const QUAD_TEXTURE_COORDS: [f32; QUAD_VERTICES * 2] = [
    0.0, 0.0, //
    1.0, 1.0, //
    1.0, 0.0, //
    0.0, 1.0, //
    1.0, 1.0, //
    0.0, 0.0, //
];

/// Text rasterized into a texture and shown on a two-triangle rectangle.
///
/// The texture is rebuilt lazily: changing the text, its size or its color only marks the rectangle
/// dirty, and the next `draw` regenerates geometry and bitmap in one go.
pub struct TextRect<B: GraphicsBackend> {
    shape: Shape<B>,
    rasterizer: Rc<dyn TextRasterizer>,

    text: String,
    text_size: f32,
    text_color: u32,

    width: f32,
    height: f32,
    dirty: bool,
}

impl<B: GraphicsBackend> TextRect<B> {
    pub fn new(gl: &Rc<B>, rasterizer: &Rc<dyn TextRasterizer>, text: &str) -> Self {
        Self::with_settings(gl, rasterizer, text, &DrawableSettings { initial_capacity: QUAD_VERTICES * 2, ..Default::default() })
    }

    pub fn with_settings(gl: &Rc<B>, rasterizer: &Rc<dyn TextRasterizer>, text: &str, settings: &DrawableSettings) -> Self {
        Self {
            shape: Shape::with_settings(gl, settings),
            rasterizer: rasterizer.clone(),

            text: text.to_string(),
            text_size: settings.text_size,
            text_color: settings.text_color,

            width: 0.0,
            height: 0.0,
            dirty: true,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: &str) {
        if self.text != text {
            self.text = text.to_string();
            self.dirty = true;
        }
    }

    pub fn text_size(&self) -> f32 {
        self.text_size
    }

    /// Sets the font size in pixels. Non-positive and non-finite sizes are ignored.
    pub fn set_text_size(&mut self, size: f32) {
        if !size.is_finite() || size <= 0.0 {
            warn!("Ignoring invalid text size {} for {:?}", size, self.text);
            return;
        }

        if self.text_size != size {
            self.text_size = size;
            self.dirty = true;
        }
    }

    pub fn text_color(&self) -> u32 {
        self.text_color
    }

    /// Sets the packed `0xRRGGBBAA` fill color of the glyphs.
    pub fn set_text_color(&mut self, packed: u32) {
        if self.text_color != packed {
            self.text_color = packed;
            self.dirty = true;
        }
    }

    /// Width of the rendered text in pixels, between 1 and `MAX_TEXT_EXTENT`.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Height of the rendered text in pixels, between 1 and `MAX_TEXT_EXTENT`.
    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn shape(&self) -> &Shape<B> {
        &self.shape
    }

    pub fn shape_mut(&mut self) -> &mut Shape<B> {
        &mut self.shape
    }

    pub fn draw<S>(&mut self, shader: &S)
    where
        S: ShaderContext<B> + ?Sized,
    {
        if self.dirty {
            self.regenerate();
        }

        self.shape.draw(shader);
    }

    /// Measures and rasterizes the text now, replacing the rectangle and its texture.
    pub fn regenerate(&mut self) {
        let bounds = self.rasterizer.measure(&self.text, self.text_size);

        self.width = bounds.right.max(1.0).min(MAX_TEXT_EXTENT);
        self.height = bounds.height().max(1.0).min(MAX_TEXT_EXTENT);
        if self.width < bounds.right || self.height < bounds.height() {
            warn!("Text {:?} measured {}x{}, bitmap clipped", self.text, bounds.right, bounds.height());
        }

        debug!("Regenerating text rectangle {:?} ({}x{})", self.text, self.width, self.height);

        let (width, height) = (self.width, self.height);
        self.shape.set_vertices(&[
            0.0, 0.0, //
            width, height, //
            width, 0.0, //
            0.0, height, //
            width, height, //
            0.0, 0.0, //
        ]);
        self.shape.set_texture_coords(&QUAD_TEXTURE_COORDS);

        let (bitmap_width, bitmap_height) = (width.ceil() as u32, height.ceil() as u32);
        let bitmap = self.rasterizer.rasterize(&self.text, self.text_size, self.text_color, bitmap_width, bitmap_height);
        self.shape.set_texture(&bitmap);

        self.dirty = false;
    }
}
