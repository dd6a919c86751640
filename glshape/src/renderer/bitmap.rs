use crate::utils::color;
use anyhow::bail;
use anyhow::Result;
use png::Decoder;
use png::Transformations;
use std::io::Cursor;

/// Owned RGBA8 image, rows stored top to bottom.
#[derive(Clone, Debug, PartialEq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Bitmap {
    /// Fully transparent bitmap.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, data: vec![0; width as usize * height as usize * 4] }
    }

    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            bail!("Bitmap {}x{} needs {} bytes, got {}", width, height, expected, data.len());
        }

        Ok(Self { width, height, data })
    }

    /// Decodes a PNG image and premultiplies its alpha.
    pub fn from_png(data: &[u8]) -> Result<Self> {
        let cursor = Cursor::new(data);
        let mut decoder = Decoder::new(cursor);
        decoder.set_transformations(Transformations::normalize_to_color8() | Transformations::ALPHA);

        let mut reader = decoder.read_info()?;
        let mut data = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut data)?;

        if info.color_type != png::ColorType::Rgba {
            bail!("Unsupported PNG color type {:?}", info.color_type);
        }

        data.truncate(info.buffer_size());
        for pixel in data.chunks_exact_mut(4) {
            let premultiplied = color::premultiply([pixel[0], pixel[1], pixel[2], pixel[3]]);
            pixel.copy_from_slice(&premultiplied);
        }

        Self::from_rgba(info.width, info.height, data)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let index = self.index(x, y)?;
        Some([self.data[index], self.data[index + 1], self.data[index + 2], self.data[index + 3]])
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: [u8; 4]) {
        if let Some(index) = self.index(x, y) {
            self.data[index..index + 4].copy_from_slice(&pixel);
        }
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }

        Some((y as usize * self.width as usize + x as usize) * 4)
    }
}
