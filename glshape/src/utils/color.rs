use colors_transform::Color;
use colors_transform::Rgb;
use glam::Vec4;

/// Opaque white in the `0xRRGGBBAA` layout used by every packed color in this crate.
pub const WHITE: u32 = 0xFFFFFFFF;

pub trait Vec4Color {
    fn new_rgb(r: u8, g: u8, b: u8, a: u8) -> Vec4;
    fn from_packed(packed: u32) -> Vec4;
}

pub trait RgbToPacked {
    fn to_packed(self, alpha: u8) -> u32;
}

impl Vec4Color for Vec4 {
    fn new_rgb(r: u8, g: u8, b: u8, a: u8) -> Vec4 {
        Vec4::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a as f32 / 255.0)
    }

    fn from_packed(packed: u32) -> Vec4 {
        let (r, g, b, a) = unpack(packed);
        Vec4::new_rgb(r, g, b, a)
    }
}

impl RgbToPacked for Rgb {
    fn to_packed(self, alpha: u8) -> u32 {
        let (r, g, b) = self.as_tuple();
        pack(r.round() as u8, g.round() as u8, b.round() as u8, alpha)
    }
}

pub fn pack(r: u8, g: u8, b: u8, a: u8) -> u32 {
    ((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | a as u32
}

pub fn unpack(packed: u32) -> (u8, u8, u8, u8) {
    ((packed >> 24) as u8, (packed >> 16) as u8, (packed >> 8) as u8, packed as u8)
}

/// Scales the color channels of an RGBA8 pixel by its alpha.
pub fn premultiply(pixel: [u8; 4]) -> [u8; 4] {
    let a = pixel[3] as u32;
    [(pixel[0] as u32 * a / 255) as u8, (pixel[1] as u32 * a / 255) as u8, (pixel[2] as u32 * a / 255) as u8, pixel[3]]
}
