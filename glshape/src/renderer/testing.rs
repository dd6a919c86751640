use super::backend::DrawMode;
use super::backend::GraphicsBackend;
use super::bitmap::Bitmap;
use super::font::TextBounds;
use super::font::TextRasterizer;
use super::shader::ShaderContext;
use super::shader::ShaderLocations;
use super::texture::TextureFilter;
use super::texture::TextureWrapMode;
use glam::Mat4;
use glam::Vec4;
use std::cell::Cell;
use std::cell::RefCell;
use std::sync::Once;

pub const COLOR: u32 = 10;
pub const TEXTURE_ENABLED: u32 = 11;
pub const TEXTURE: u32 = 12;
pub const TRANSFORM: u32 = 13;
pub const TEX_COORD: u32 = 1;
pub const VERTEX: u32 = 0;

pub const DEJAVU_SANS: &[u8] = include_bytes!("../../tests/assets/DejaVuSans.ttf");

static LOGGER: Once = Once::new();

/// Routes library logs to stdout so failing tests show what the draw path did.
pub fn init_logger() {
    LOGGER.call_once(|| {
        let _ = simple_logger::init_with_level(log::Level::Trace);
    });
}

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    CreateTexture { texture: u32, width: u32, height: u32, filter: TextureFilter, wrap: TextureWrapMode },
    DeleteTexture { texture: u32 },
    BindTexture { unit: u32, texture: u32 },
    UniformI32 { location: u32, value: i32 },
    UniformVec4 { location: u32, value: Vec4 },
    UniformMat4 { location: u32, value: Mat4 },
    LineWidth { width: f32 },
    VertexAttribute { index: u32, components: usize, data: Vec<f32> },
    DisableVertexAttribute { index: u32 },
    DrawArrays { mode: DrawMode, count: usize },
}

/// Backend that records every call instead of talking to a GPU.
#[derive(Default)]
pub struct RecordingBackend {
    calls: RefCell<Vec<Call>>,
    next_texture: Cell<u32>,
    fail_textures: Cell<bool>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        init_logger();
        Default::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn fail_texture_allocation(&self, fail: bool) {
        self.fail_textures.set(fail);
    }

    pub fn draw_calls(&self) -> Vec<Call> {
        self.calls.borrow().iter().filter(|p| matches!(p, Call::DrawArrays { .. })).cloned().collect()
    }

    pub fn deleted_textures(&self) -> Vec<u32> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|p| match p {
                Call::DeleteTexture { texture } => Some(*texture),
                _ => None,
            })
            .collect()
    }

    pub fn created_textures(&self) -> Vec<(u32, u32, u32)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|p| match p {
                Call::CreateTexture { texture, width, height, .. } => Some((*texture, *width, *height)),
                _ => None,
            })
            .collect()
    }

    pub fn transforms(&self) -> Vec<Mat4> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|p| match p {
                Call::UniformMat4 { value, .. } => Some(*value),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl GraphicsBackend for RecordingBackend {
    type Texture = u32;
    type UniformLocation = u32;

    fn create_texture(&self, bitmap: &Bitmap, filter: TextureFilter, wrap: TextureWrapMode) -> Result<u32, String> {
        if self.fail_textures.get() {
            return Err("Texture name allocation failed".to_string());
        }

        let texture = self.next_texture.get() + 1;
        self.next_texture.set(texture);
        self.record(Call::CreateTexture { texture, width: bitmap.width, height: bitmap.height, filter, wrap });

        Ok(texture)
    }

    fn delete_texture(&self, texture: u32) {
        self.record(Call::DeleteTexture { texture });
    }

    fn bind_texture(&self, unit: u32, texture: u32) {
        self.record(Call::BindTexture { unit, texture });
    }

    fn uniform_i32(&self, location: &u32, value: i32) {
        self.record(Call::UniformI32 { location: *location, value });
    }

    fn uniform_vec4(&self, location: &u32, value: Vec4) {
        self.record(Call::UniformVec4 { location: *location, value });
    }

    fn uniform_mat4(&self, location: &u32, value: &Mat4) {
        self.record(Call::UniformMat4 { location: *location, value: *value });
    }

    fn line_width(&self, width: f32) {
        self.record(Call::LineWidth { width });
    }

    fn vertex_attribute(&self, index: u32, components: usize, data: &[f32]) {
        self.record(Call::VertexAttribute { index, components, data: data.to_vec() });
    }

    fn disable_vertex_attribute(&self, index: u32) {
        self.record(Call::DisableVertexAttribute { index });
    }

    fn draw_arrays(&self, mode: DrawMode, count: usize) {
        self.record(Call::DrawArrays { mode, count });
    }
}

pub struct TestShader {
    pub locations: Option<ShaderLocations<RecordingBackend>>,
}

impl TestShader {
    /// Shader exposing every location of the basic set.
    pub fn full() -> Self {
        Self {
            locations: Some(ShaderLocations {
                color: Some(COLOR),
                texture_enabled: Some(TEXTURE_ENABLED),
                texture: Some(TEXTURE),
                transform: Some(TRANSFORM),
                tex_coord: Some(TEX_COORD),
                vertex: Some(VERTEX),
            }),
        }
    }

    /// Shader that only knows where vertex positions go.
    pub fn positions_only() -> Self {
        Self { locations: Some(ShaderLocations { vertex: Some(VERTEX), ..Default::default() }) }
    }

    /// Shader that is not a basic shader at all.
    pub fn foreign() -> Self {
        Self { locations: None }
    }
}

impl ShaderContext<RecordingBackend> for TestShader {
    fn name(&self) -> &str {
        "test"
    }

    fn locations(&self) -> Option<&ShaderLocations<RecordingBackend>> {
        self.locations.as_ref()
    }
}

/// Rasterizer where every character is a `size / 2` wide box rising `size * 0.75` above the
/// baseline and dropping `size * 0.25` below it.
pub struct BoxRasterizer {
    pub measured: Cell<usize>,
    pub rasterized: Cell<usize>,
    pub last_request: Cell<Option<(f32, u32, u32, u32)>>,
}

impl BoxRasterizer {
    pub fn new() -> Self {
        Self { measured: Cell::new(0), rasterized: Cell::new(0), last_request: Cell::new(None) }
    }
}

impl TextRasterizer for BoxRasterizer {
    fn measure(&self, text: &str, size: f32) -> TextBounds {
        self.measured.set(self.measured.get() + 1);

        let count = text.chars().count() as f32;
        if count == 0.0 {
            return TextBounds::default();
        }

        TextBounds { left: 0.0, top: -size * 0.75, right: count * size / 2.0, bottom: size * 0.25 }
    }

    fn rasterize(&self, _text: &str, size: f32, color: u32, width: u32, height: u32) -> Bitmap {
        self.rasterized.set(self.rasterized.get() + 1);
        self.last_request.set(Some((size, color, width, height)));

        let mut bitmap = Bitmap::new(width, height);
        let (r, g, b, a) = crate::utils::color::unpack(color);
        bitmap.set_pixel(0, height.saturating_sub(1), [r, g, b, a]);
        bitmap
    }
}
