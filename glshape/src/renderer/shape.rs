use super::backend::DrawMode;
use super::backend::GraphicsBackend;
use super::bitmap::Bitmap;
use super::shader::ShaderContext;
use super::texture::Texture;
use super::texture::TextureFilter;
use super::texture::TextureWrapMode;
use super::COORDS_PER_TEXTURE;
use super::COORDS_PER_VERTEX;
use crate::error_return;
use crate::trace_return;
use crate::utils::color;
use crate::utils::color::Vec4Color;
use crate::utils::settings::DrawableSettings;
use glam::Mat4;
use glam::Vec2;
use glam::Vec3;
use glam::Vec4;
use log::error;
use std::rc::Rc;

/// Drawable made of 2D vertices, an optional texture and a 2D transform.
pub struct Shape<B: GraphicsBackend> {
    pub draw_mode: DrawMode,
    pub line_width: f32,
    pub visible: bool,

    vertices: Vec<f32>,
    vertices_limit: usize,
    vertex_count: usize,

    texture: Option<Texture<B>>,
    texture_coords: Option<Vec<f32>>,

    position: Vec2,
    rotation: f32,
    scale: Vec2,
    transform: Mat4,
    transform_dirty: bool,

    color: u32,
    color_normalized: Vec4,

    gl: Rc<B>,
}

impl<B: GraphicsBackend> Shape<B> {
    pub fn new(gl: &Rc<B>, initial_capacity: usize) -> Self {
        Self {
            draw_mode: DrawMode::Triangles,
            line_width: 0.0,
            visible: true,

            vertices: Vec::with_capacity(initial_capacity),
            vertices_limit: 0,
            vertex_count: 0,

            texture: None,
            texture_coords: None,

            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
            transform: Mat4::IDENTITY,
            transform_dirty: true,

            color: color::WHITE,
            color_normalized: Vec4::ONE,

            gl: gl.clone(),
        }
    }

    pub fn with_settings(gl: &Rc<B>, settings: &DrawableSettings) -> Self {
        let mut shape = Self::new(gl, settings.initial_capacity);
        shape.line_width = settings.line_width;
        shape
    }

    /// Writes `coords` starting at float index `offset`, growing the buffer when needed.
    /// The buffer limit becomes `offset + coords.len()`.
    pub fn append_vertices_at(&mut self, offset: usize, coords: &[f32]) {
        if coords.len() % COORDS_PER_VERTEX != 0 {
            error_return!("Vertex data must contain full coordinate pairs ({} floats given)", coords.len());
        }

        let limit = offset + coords.len();
        if limit > self.vertices.len() {
            self.vertices.resize(limit, 0.0);
        }

        self.vertices[offset..limit].copy_from_slice(coords);
        self.vertices_limit = limit;
        self.vertex_count = limit / COORDS_PER_VERTEX;
    }

    pub fn append_vertices(&mut self, coords: &[f32]) {
        self.append_vertices_at(self.vertices_limit, coords);
    }

    pub fn add_vertex(&mut self, x: f32, y: f32) {
        self.append_vertices(&[x, y]);
    }

    /// Replaces the vertices from the start. Data past `coords.len()` stays allocated but is not drawn.
    pub fn set_vertices(&mut self, coords: &[f32]) {
        self.append_vertices_at(0, coords);
    }

    pub fn reset_vertices(&mut self) {
        self.vertices.clear();
        self.vertices_limit = 0;
        self.vertex_count = 0;
    }

    pub fn vertices(&self) -> &[f32] {
        &self.vertices[..self.vertices_limit]
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn set_texture(&mut self, bitmap: &Bitmap) {
        self.set_texture_with_options(bitmap, TextureFilter::Linear, TextureWrapMode::Clamp);
    }

    /// Releases the current texture and uploads `bitmap` in its place. On allocation failure the
    /// shape is left without a texture.
    pub fn set_texture_with_options(&mut self, bitmap: &Bitmap, filter: TextureFilter, wrap: TextureWrapMode) {
        self.texture = None;

        match Texture::new(&self.gl, bitmap, filter, wrap) {
            Ok(texture) => self.texture = Some(texture),
            Err(err) => error!("Failed to create shape texture ({})", err),
        }
    }

    pub fn clear_texture(&mut self) {
        self.texture = None;
    }

    pub fn texture(&self) -> Option<&Texture<B>> {
        self.texture.as_ref()
    }

    pub fn set_texture_coords(&mut self, uvs: &[f32]) {
        let texture_coords = self.texture_coords.get_or_insert_with(Vec::new);
        texture_coords.clear();
        texture_coords.extend_from_slice(uvs);
    }

    pub fn texture_coords(&self) -> Option<&[f32]> {
        self.texture_coords.as_deref()
    }

    pub fn translate(&mut self, x: f32, y: f32) {
        self.set_position(self.position + Vec2::new(x, y));
    }

    pub fn rotate(&mut self, degrees: f32) {
        self.set_rotation(self.rotation + degrees);
    }

    pub fn scale(&mut self, x: f32, y: f32) {
        self.set_scale(self.scale * Vec2::new(x, y));
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = self.changed(self.position, position);
    }

    pub fn x(&self) -> f32 {
        self.position.x
    }

    pub fn set_x(&mut self, x: f32) {
        self.set_position(Vec2::new(x, self.position.y));
    }

    pub fn y(&self) -> f32 {
        self.position.y
    }

    pub fn set_y(&mut self, y: f32) {
        self.set_position(Vec2::new(self.position.x, y));
    }

    /// Rotation around the Z axis, in degrees.
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        if self.rotation != degrees {
            self.rotation = degrees;
            self.transform_dirty = true;
        }
    }

    pub fn scale_factors(&self) -> Vec2 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = self.changed(self.scale, scale);
    }

    pub fn set_scale_x(&mut self, x: f32) {
        self.set_scale(Vec2::new(x, self.scale.y));
    }

    pub fn set_scale_y(&mut self, y: f32) {
        self.set_scale(Vec2::new(self.scale.x, y));
    }

    /// Returns the model matrix, recomputing it first if any transform field changed.
    pub fn transform(&mut self) -> &Mat4 {
        self.apply_transform();
        &self.transform
    }

    pub fn color(&self) -> u32 {
        self.color
    }

    /// Sets the packed `0xRRGGBBAA` color.
    pub fn set_color(&mut self, packed: u32) {
        if self.color != packed {
            self.color = packed;
            self.color_normalized = Vec4::from_packed(packed);
        }
    }

    pub fn draw<S>(&mut self, shader: &S)
    where
        S: ShaderContext<B> + ?Sized,
    {
        if !self.visible || self.vertex_count == 0 {
            return;
        }

        let locations = match shader.locations() {
            Some(locations) => locations,
            None => trace_return!("Shader {} is not a basic shader, skipping shape", shader.name()),
        };

        let vertex_location = match locations.vertex {
            Some(location) => location,
            None => trace_return!("Shader {} has no vertex attribute, skipping shape", shader.name()),
        };

        if let Some(location) = &locations.color {
            self.gl.uniform_vec4(location, self.color_normalized);
        }

        let mut texture_enabled = false;
        if let (Some(texture_location), Some(tex_coord_location)) = (&locations.texture, locations.tex_coord) {
            if let (Some(texture), Some(texture_coords)) = (&self.texture, &self.texture_coords) {
                if let Some(location) = &locations.texture_enabled {
                    self.gl.uniform_i32(location, 1);
                }

                texture.activate(0);
                self.gl.uniform_i32(texture_location, 0);
                self.gl.vertex_attribute(tex_coord_location, COORDS_PER_TEXTURE, texture_coords);
                texture_enabled = true;
            } else if let Some(location) = &locations.texture_enabled {
                self.gl.uniform_i32(location, 0);
            }
        }

        if self.line_width > 0.0 {
            self.gl.line_width(self.line_width);
        }

        if let Some(location) = &locations.transform {
            self.apply_transform();
            self.gl.uniform_mat4(location, &self.transform);
        }

        self.gl.vertex_attribute(vertex_location, COORDS_PER_VERTEX, &self.vertices[..self.vertices_limit]);
        self.gl.draw_arrays(self.draw_mode, self.vertex_count);

        // Texture coordinates must not leak into the next draw call
        if texture_enabled {
            if let Some(location) = locations.tex_coord {
                self.gl.disable_vertex_attribute(location);
            }
        }
    }

    fn changed(&mut self, current: Vec2, new: Vec2) -> Vec2 {
        if current != new {
            self.transform_dirty = true;
        }

        new
    }

    fn apply_transform(&mut self) {
        if self.transform_dirty {
            let translation = Mat4::from_translation(Vec3::new(self.position.x, self.position.y, 0.0));
            let rotation = Mat4::from_rotation_z(self.rotation.to_radians());
            let scale = Mat4::from_scale(Vec3::new(self.scale.x, self.scale.y, 1.0));

            self.transform = translation * rotation * scale;
            self.transform_dirty = false;
        }
    }
}
