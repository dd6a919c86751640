use super::backend::GraphicsBackend;
use super::bitmap::Bitmap;
use anyhow::Error;
use anyhow::Result;
use glam::Vec2;
use log::info;
use std::rc::Rc;

/// GPU texture owned by exactly one value; the handle is released when it is dropped.
pub struct Texture<B: GraphicsBackend> {
    pub size: Vec2,
    pub filter: TextureFilter,
    pub wrap: TextureWrapMode,
    inner: B::Texture,
    gl: Rc<B>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TextureFilter {
    #[default]
    Linear,
    Nearest,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TextureWrapMode {
    Repeat,
    #[default]
    Clamp,
}

impl<B: GraphicsBackend> Texture<B> {
    pub fn new(gl: &Rc<B>, bitmap: &Bitmap, filter: TextureFilter, wrap: TextureWrapMode) -> Result<Self> {
        info!("Creating texture ({}x{}, {} bytes, {:?}, {:?})", bitmap.width, bitmap.height, bitmap.data.len(), filter, wrap);

        let inner = gl.create_texture(bitmap, filter, wrap).map_err(Error::msg)?;
        let size = Vec2::new(bitmap.width as f32, bitmap.height as f32);

        Ok(Self { size, filter, wrap, inner, gl: gl.clone() })
    }

    pub fn handle(&self) -> B::Texture {
        self.inner
    }

    pub fn activate(&self, unit: u32) {
        self.gl.bind_texture(unit, self.inner);
    }
}

impl<B: GraphicsBackend> Drop for Texture<B> {
    fn drop(&mut self) {
        info!("Releasing texture {:?}", self.inner);
        self.gl.delete_texture(self.inner);
    }
}
