use super::bitmap::Bitmap;
use super::texture::TextureFilter;
use super::texture::TextureWrapMode;
use glam::Mat4;
use glam::Vec4;
use std::fmt::Debug;

/// Primitive topology used by `draw_arrays`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DrawMode {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

/// The subset of a GL-style API that shapes and textures need.
///
/// All methods take `&self`: the backend is shared through `Rc` by every texture and shape created
/// on the same context, the same way a `glow::Context` is.
pub trait GraphicsBackend {
    type Texture: Copy + Debug + PartialEq;
    type UniformLocation: Clone + Debug;

    /// Allocates a texture name, applies the sampling parameters and uploads `bitmap`.
    fn create_texture(&self, bitmap: &Bitmap, filter: TextureFilter, wrap: TextureWrapMode) -> Result<Self::Texture, String>;

    fn delete_texture(&self, texture: Self::Texture);

    /// Makes `unit` the active texture unit and binds `texture` to it.
    fn bind_texture(&self, unit: u32, texture: Self::Texture);

    fn uniform_i32(&self, location: &Self::UniformLocation, value: i32);

    fn uniform_vec4(&self, location: &Self::UniformLocation, value: Vec4);

    fn uniform_mat4(&self, location: &Self::UniformLocation, value: &Mat4);

    fn line_width(&self, width: f32);

    /// Feeds `data` as a tightly packed float attribute with `components` floats per vertex and enables it.
    fn vertex_attribute(&self, index: u32, components: usize, data: &[f32]);

    fn disable_vertex_attribute(&self, index: u32);

    fn draw_arrays(&self, mode: DrawMode, count: usize);
}

impl DrawMode {
    pub fn to_gl(self) -> u32 {
        match self {
            DrawMode::Points => glow::POINTS,
            DrawMode::Lines => glow::LINES,
            DrawMode::LineStrip => glow::LINE_STRIP,
            DrawMode::LineLoop => glow::LINE_LOOP,
            DrawMode::Triangles => glow::TRIANGLES,
            DrawMode::TriangleStrip => glow::TRIANGLE_STRIP,
            DrawMode::TriangleFan => glow::TRIANGLE_FAN,
        }
    }
}
