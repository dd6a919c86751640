use super::backend::DrawMode;
use super::backend::GraphicsBackend;
use super::bitmap::Bitmap;
use super::texture::TextureFilter;
use super::texture::TextureWrapMode;
use crate::error_return;
use anyhow::Error;
use anyhow::Result;
use glam::Mat4;
use glam::Vec4;
use glow::Buffer;
use glow::Context;
use glow::HasContext;
use glow::VertexArray;
use log::info;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::mem;
use std::slice;

/// `GraphicsBackend` over a live OpenGL 3.3 / OpenGL ES 3.0 context.
///
/// Attribute data is streamed through one array buffer per attribute index, all recorded in a
/// single vertex array object that stays bound for the lifetime of the backend.
pub struct GlowBackend {
    pub gl: Context,

    vertex_array: VertexArray,
    attribute_buffers: RefCell<FxHashMap<u32, Buffer>>,
}

impl GlowBackend {
    pub fn new(gl: Context) -> Result<Self> {
        unsafe {
            info!("Creating OpenGL backend ({:?})", gl.version());

            let vertex_array = gl.create_vertex_array().map_err(Error::msg)?;
            gl.bind_vertex_array(Some(vertex_array));

            // Bitmaps are uploaded with premultiplied alpha
            gl.enable(glow::BLEND);
            gl.blend_func(glow::ONE, glow::ONE_MINUS_SRC_ALPHA);

            Ok(Self { gl, vertex_array, attribute_buffers: Default::default() })
        }
    }

    fn attribute_buffer(&self, index: u32) -> Result<Buffer, String> {
        let mut buffers = self.attribute_buffers.borrow_mut();
        if let Some(buffer) = buffers.get(&index) {
            return Ok(*buffer);
        }

        let buffer = unsafe { self.gl.create_buffer()? };
        buffers.insert(index, buffer);

        Ok(buffer)
    }
}

impl GraphicsBackend for GlowBackend {
    type Texture = glow::Texture;
    type UniformLocation = glow::UniformLocation;

    fn create_texture(&self, bitmap: &Bitmap, filter: TextureFilter, wrap: TextureWrapMode) -> Result<glow::Texture, String> {
        let filter = match filter {
            TextureFilter::Linear => glow::LINEAR,
            TextureFilter::Nearest => glow::NEAREST,
        } as i32;

        let wrap = match wrap {
            TextureWrapMode::Repeat => glow::REPEAT,
            TextureWrapMode::Clamp => glow::CLAMP_TO_EDGE,
        } as i32;

        unsafe {
            let texture = self.gl.create_texture()?;
            let data = if !bitmap.data.is_empty() { Some(bitmap.data.as_slice()) } else { None };

            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, filter);
            self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, filter);
            self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, wrap);
            self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, wrap);
            self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA8 as i32,
                bitmap.width as i32,
                bitmap.height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                data,
            );

            Ok(texture)
        }
    }

    fn delete_texture(&self, texture: glow::Texture) {
        unsafe {
            self.gl.delete_texture(texture);
        }
    }

    fn bind_texture(&self, unit: u32, texture: glow::Texture) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        }
    }

    fn uniform_i32(&self, location: &glow::UniformLocation, value: i32) {
        unsafe {
            self.gl.uniform_1_i32(Some(location), value);
        }
    }

    fn uniform_vec4(&self, location: &glow::UniformLocation, value: Vec4) {
        unsafe {
            self.gl.uniform_4_f32(Some(location), value.x, value.y, value.z, value.w);
        }
    }

    fn uniform_mat4(&self, location: &glow::UniformLocation, value: &Mat4) {
        unsafe {
            self.gl.uniform_matrix_4_f32_slice(Some(location), false, &value.to_cols_array());
        }
    }

    fn line_width(&self, width: f32) {
        unsafe {
            self.gl.line_width(width);
        }
    }

    fn vertex_attribute(&self, index: u32, components: usize, data: &[f32]) {
        let buffer = match self.attribute_buffer(index) {
            Ok(buffer) => buffer,
            Err(err) => error_return!("Failed to create buffer for attribute {} ({})", index, err),
        };

        unsafe {
            let data_u8 = slice::from_raw_parts(data.as_ptr() as *const u8, mem::size_of_val(data));

            self.gl.bind_vertex_array(Some(self.vertex_array));
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            self.gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, data_u8, glow::STREAM_DRAW);
            self.gl.vertex_attrib_pointer_f32(index, components as i32, glow::FLOAT, false, (components * mem::size_of::<f32>()) as i32, 0);
            self.gl.enable_vertex_attrib_array(index);
        }
    }

    fn disable_vertex_attribute(&self, index: u32) {
        unsafe {
            self.gl.disable_vertex_attrib_array(index);
        }
    }

    fn draw_arrays(&self, mode: DrawMode, count: usize) {
        unsafe {
            self.gl.draw_arrays(mode.to_gl(), 0, count as i32);
        }
    }
}

impl Drop for GlowBackend {
    fn drop(&mut self) {
        unsafe {
            info!("Releasing OpenGL backend");

            for (_, buffer) in self.attribute_buffers.borrow_mut().drain() {
                self.gl.delete_buffer(buffer);
            }

            self.gl.delete_vertex_array(self.vertex_array);
        }
    }
}
