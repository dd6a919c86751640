pub mod backend;
pub mod bitmap;
pub mod font;
pub mod opengl;
pub mod shader;
pub mod shape;
pub mod text;
pub mod texture;

#[cfg(test)]
pub(crate) mod testing;

/// Always 2 coordinates per vertex in 2D.
pub const COORDS_PER_VERTEX: usize = 2;

/// Always 2 coordinates per texture lookup.
pub const COORDS_PER_TEXTURE: usize = 2;
