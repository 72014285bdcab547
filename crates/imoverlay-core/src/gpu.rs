//! Host GPU interface – implement this for the host's rendering API.
//!
//! The renderer only ever talks to the GPU through [`GpuDevice`]. Every call
//! maps to one host call, so a recording implementation sees exactly what
//! the host would.

use crate::draw_list::TextureId;
use crate::shader::ShaderDesc;

/// Alpha-blend mode as reported and accepted by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    #[default]
    None,
    Alpha,
    AlphaPremult,
    Additive,
    Multiply,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FaceCulling {
    #[default]
    None,
    Front,
    Back,
}

/// Integer rectangle in framebuffer pixels, bottom-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width:  i32,
    pub height: i32,
}

impl PixelRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }
}

/// Handle to a compiled shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderId(pub u32);

/// De-interleaved vertex attributes for one draw, matching the
/// `Position`/`UV`/`Color` inputs of the overlay program.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexBatch {
    pub positions: Vec<[f32; 2]>,
    pub uvs:       Vec<[f32; 2]>,
    pub colors:    Vec<[f32; 4]>,
}

impl VertexBatch {
    pub fn len(&self) -> usize { self.positions.len() }
    pub fn is_empty(&self) -> bool { self.positions.is_empty() }
}

/// The host rendering API.
///
/// Errors are the host's own; the renderer passes them through untouched.
pub trait GpuDevice {
    type Error: std::error::Error + Send + Sync + 'static;

    // ── fixed-function state ──────────────────────────────────────────────────

    fn blend(&self) -> BlendMode;
    fn set_blend(&mut self, mode: BlendMode);
    fn set_face_culling(&mut self, mode: FaceCulling);
    fn set_scissor_test(&mut self, enabled: bool);
    fn set_viewport(&mut self, rect: PixelRect);
    fn set_scissor(&mut self, rect: PixelRect);

    // ── programs ──────────────────────────────────────────────────────────────

    fn create_shader(&mut self, desc: &ShaderDesc) -> Result<ShaderId, Self::Error>;
    fn bind_shader(&mut self, shader: ShaderId);
    fn set_uniform_mat4(&mut self, shader: ShaderId, name: &str, value: &[f32; 16]);
    fn set_uniform_sampler(&mut self, shader: ShaderId, name: &str, texture: TextureId) -> Result<(), Self::Error>;

    // ── resource management ───────────────────────────────────────────────────

    /// Upload an RGBA32F image (4 floats per pixel, rows top to bottom).
    fn create_texture(&mut self, width: u32, height: u32, rgba: &[f32]) -> Result<TextureId, Self::Error>;

    /// Release a previously created texture.
    fn destroy_texture(&mut self, id: TextureId);

    // ── drawing ───────────────────────────────────────────────────────────────

    /// Indexed triangle-list draw with the currently bound program.
    fn draw_indexed(&mut self, shader: ShaderId, batch: &VertexBatch, indices: &[u32]) -> Result<(), Self::Error>;
}
