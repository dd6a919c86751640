use super::backend::GraphicsBackend;
use super::opengl::GlowBackend;
use anyhow::bail;
use anyhow::Error;
use anyhow::Result;
use glam::Mat4;
use glow::HasContext;
use glow::Program;
use glow::UniformLocation;
use log::info;
use std::rc::Rc;

pub const BASIC_VERTEX_SHADER: &str = include_str!("./shaders/basic.vert");
pub const BASIC_FRAGMENT_SHADER: &str = include_str!("./shaders/basic.frag");

pub const COLOR_UNIFORM: &str = "uColor";
pub const TEXTURE_ENABLED_UNIFORM: &str = "uTexEnabled";
pub const TEXTURE_UNIFORM: &str = "uTexture";
pub const TRANSFORM_UNIFORM: &str = "uTransform";
pub const PROJECTION_UNIFORM: &str = "uProjection";
pub const TEX_COORD_ATTRIBUTE: &str = "aTexCoord";
pub const VERTEX_ATTRIBUTE: &str = "aPosition";

/// Where a basic shader expects each input. `None` means the shader does not use it.
pub struct ShaderLocations<B: GraphicsBackend> {
    pub color: Option<B::UniformLocation>,
    pub texture_enabled: Option<B::UniformLocation>,
    pub texture: Option<B::UniformLocation>,
    pub transform: Option<B::UniformLocation>,
    pub tex_coord: Option<u32>,
    pub vertex: Option<u32>,
}

/// Anything a shape can be drawn with.
pub trait ShaderContext<B: GraphicsBackend> {
    fn name(&self) -> &str;

    /// Returns `None` when the shader does not implement the basic capability set.
    fn locations(&self) -> Option<&ShaderLocations<B>>;
}

pub struct Shader {
    pub name: String,
    pub program: Program,
    pub locations: ShaderLocations<GlowBackend>,
    pub projection: Option<UniformLocation>,

    gl: Rc<GlowBackend>,
}

impl<B: GraphicsBackend> Default for ShaderLocations<B> {
    fn default() -> Self {
        Self { color: None, texture_enabled: None, texture: None, transform: None, tex_coord: None, vertex: None }
    }
}

impl Shader {
    pub fn new(backend: &Rc<GlowBackend>, name: &str, vertex_shader_source: &str, fragment_shader_source: &str) -> Result<Self> {
        info!("Creating shader {} (VS {} bytes, FS {} bytes)", name, vertex_shader_source.len(), fragment_shader_source.len());

        unsafe {
            let gl = &backend.gl;
            info!("Compiling vertex shader");

            let vertex_shader = gl.create_shader(glow::VERTEX_SHADER).map_err(Error::msg)?;
            gl.shader_source(vertex_shader, preprocess_shader_source(vertex_shader_source).as_str());
            gl.compile_shader(vertex_shader);

            if !gl.get_shader_compile_status(vertex_shader) {
                let log = gl.get_shader_info_log(vertex_shader);
                gl.delete_shader(vertex_shader);
                bail!("Failed to compile vertex shader: {}", log);
            }

            info!("Compiling fragment shader");

            let fragment_shader = gl.create_shader(glow::FRAGMENT_SHADER).map_err(Error::msg)?;
            gl.shader_source(fragment_shader, preprocess_shader_source(fragment_shader_source).as_str());
            gl.compile_shader(fragment_shader);

            if !gl.get_shader_compile_status(fragment_shader) {
                let log = gl.get_shader_info_log(fragment_shader);
                gl.delete_shader(vertex_shader);
                gl.delete_shader(fragment_shader);
                bail!("Failed to compile fragment shader: {}", log);
            }

            info!("Linking program");

            let program = gl.create_program().map_err(Error::msg)?;
            gl.attach_shader(program, vertex_shader);
            gl.attach_shader(program, fragment_shader);
            gl.link_program(program);

            gl.delete_shader(vertex_shader);
            gl.delete_shader(fragment_shader);

            if !gl.get_program_link_status(program) {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                bail!("Failed to link program: {}", log);
            }

            let uniform = |name: &str| {
                let location = gl.get_uniform_location(program, name);
                info!("Uniform {} {}", name, if location.is_some() { "located" } else { "not used" });
                location
            };

            let attribute = |name: &str| {
                let location = gl.get_attrib_location(program, name);
                info!("Attribute {} {}", name, if location.is_some() { "located" } else { "not used" });
                location
            };

            let locations = ShaderLocations {
                color: uniform(COLOR_UNIFORM),
                texture_enabled: uniform(TEXTURE_ENABLED_UNIFORM),
                texture: uniform(TEXTURE_UNIFORM),
                transform: uniform(TRANSFORM_UNIFORM),
                tex_coord: attribute(TEX_COORD_ATTRIBUTE),
                vertex: attribute(VERTEX_ATTRIBUTE),
            };
            let projection = uniform(PROJECTION_UNIFORM);

            Ok(Shader { name: name.to_string(), program, locations, projection, gl: backend.clone() })
        }
    }

    /// Builds the shader matching the basic capability set.
    pub fn basic(backend: &Rc<GlowBackend>) -> Result<Self> {
        Self::new(backend, "basic", BASIC_VERTEX_SHADER, BASIC_FRAGMENT_SHADER)
    }

    pub fn activate(&self) {
        unsafe {
            self.gl.gl.use_program(Some(self.program));
        }
    }

    /// Uploads the projection matrix; the program must be active.
    pub fn set_projection(&self, projection: &Mat4) {
        if let Some(location) = &self.projection {
            self.gl.uniform_mat4(location, projection);
        }
    }
}

impl ShaderContext<GlowBackend> for Shader {
    fn name(&self) -> &str {
        &self.name
    }

    fn locations(&self) -> Option<&ShaderLocations<GlowBackend>> {
        Some(&self.locations)
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        unsafe {
            info!("Releasing shader {}", self.name);
            self.gl.gl.delete_program(self.program);
        }
    }
}

fn preprocess_shader_source(source: &str) -> String {
    #[cfg(not(any(target_arch = "wasm32", target_os = "android", target_os = "ios")))]
    let version = "330 core";

    #[cfg(any(target_arch = "wasm32", target_os = "android", target_os = "ios"))]
    let version = "300 es";

    source.replace("<version>", version)
}
