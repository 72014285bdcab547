//! In-memory host, GPU and GUI that record what they are asked to do.
//!
//! Used by the demo binary and by tests to drive the registry without a real
//! host application.

use std::cell::RefCell;
use std::collections::HashSet;
use std::hash::Hash;

use crate::config::DrawPhase;
use crate::draw_list::{DrawData, DrawList, TextureId};
use crate::error::OverlayError;
use crate::gpu::{BlendMode, FaceCulling, GpuDevice, PixelRect, ShaderId, VertexBatch};
use crate::gui::{FontAtlasTexture, GuiContext, GuiLibrary};
use crate::input::InputState;
use crate::registry::{DrawContext, ViewportHost};
use crate::shader::ShaderDesc;
use crate::{Color, Rect, Vec2};

// ─── GPU ─────────────────────────────────────────────────────────────────────

/// One call made on a [`RecordingGpu`].
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCall {
    GetBlend,
    SetBlend(BlendMode),
    SetFaceCulling(FaceCulling),
    SetScissorTest(bool),
    SetViewport(PixelRect),
    SetScissor(PixelRect),
    CreateShader(&'static str),
    BindShader(ShaderId),
    UniformMat4(String),
    UniformSampler(String, TextureId),
    CreateTexture { width: u32, height: u32 },
    DestroyTexture(TextureId),
    Draw { vertex_count: usize, indices: Vec<u32> },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HeadlessError {
    #[error("texture {0:?} does not exist")]
    UnknownTexture(TextureId),
    #[error("texture data holds {got} floats, {width}x{height} RGBA needs {expected}")]
    TextureSize { width: u32, height: u32, expected: usize, got: usize },
    #[error("draw references vertex {index} of {count}")]
    IndexOutOfRange { index: u32, count: usize },
}

/// [`GpuDevice`] that validates and records every call.
#[derive(Debug)]
pub struct RecordingGpu {
    calls:         RefCell<Vec<GpuCall>>,
    blend:         BlendMode,
    live_textures: HashSet<TextureId>,
    next_texture:  usize,
    next_shader:   u32,
}

impl Default for RecordingGpu {
    fn default() -> Self {
        Self {
            calls:         RefCell::new(Vec::new()),
            blend:         BlendMode::None,
            live_textures: HashSet::new(),
            next_texture:  1, // 0 is TextureId::NONE
            next_shader:   1,
        }
    }
}

impl RecordingGpu {
    pub fn calls(&self) -> Vec<GpuCall> { self.calls.borrow().clone() }
    pub fn clear_calls(&mut self) { self.calls.get_mut().clear(); }
    pub fn draw_count(&self) -> usize {
        self.calls.borrow().iter().filter(|c| matches!(c, GpuCall::Draw { .. })).count()
    }
    pub fn is_live(&self, id: TextureId) -> bool { self.live_textures.contains(&id) }
    pub fn live_texture_count(&self) -> usize { self.live_textures.len() }

    fn record(&self, call: GpuCall) {
        log::trace!("gpu: {call:?}");
        self.calls.borrow_mut().push(call);
    }
}

impl GpuDevice for RecordingGpu {
    type Error = HeadlessError;

    fn blend(&self) -> BlendMode {
        self.record(GpuCall::GetBlend);
        self.blend
    }

    fn set_blend(&mut self, mode: BlendMode) {
        self.record(GpuCall::SetBlend(mode));
        self.blend = mode;
    }

    fn set_face_culling(&mut self, mode: FaceCulling) { self.record(GpuCall::SetFaceCulling(mode)); }
    fn set_scissor_test(&mut self, enabled: bool)      { self.record(GpuCall::SetScissorTest(enabled)); }
    fn set_viewport(&mut self, rect: PixelRect)         { self.record(GpuCall::SetViewport(rect)); }
    fn set_scissor(&mut self, rect: PixelRect)          { self.record(GpuCall::SetScissor(rect)); }

    fn create_shader(&mut self, desc: &ShaderDesc) -> Result<ShaderId, HeadlessError> {
        self.record(GpuCall::CreateShader(desc.name));
        let id = ShaderId(self.next_shader);
        self.next_shader += 1;
        Ok(id)
    }

    fn bind_shader(&mut self, shader: ShaderId) { self.record(GpuCall::BindShader(shader)); }

    fn set_uniform_mat4(&mut self, _shader: ShaderId, name: &str, _value: &[f32; 16]) {
        self.record(GpuCall::UniformMat4(name.to_owned()));
    }

    fn set_uniform_sampler(&mut self, _shader: ShaderId, name: &str, texture: TextureId) -> Result<(), HeadlessError> {
        self.record(GpuCall::UniformSampler(name.to_owned(), texture));
        if !self.live_textures.contains(&texture) {
            return Err(HeadlessError::UnknownTexture(texture));
        }
        Ok(())
    }

    fn create_texture(&mut self, width: u32, height: u32, rgba: &[f32]) -> Result<TextureId, HeadlessError> {
        self.record(GpuCall::CreateTexture { width, height });
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(HeadlessError::TextureSize { width, height, expected, got: rgba.len() });
        }
        let id = TextureId(self.next_texture);
        self.next_texture += 1;
        self.live_textures.insert(id);
        Ok(id)
    }

    fn destroy_texture(&mut self, id: TextureId) {
        self.record(GpuCall::DestroyTexture(id));
        self.live_textures.remove(&id);
    }

    fn draw_indexed(&mut self, _shader: ShaderId, batch: &VertexBatch, indices: &[u32]) -> Result<(), HeadlessError> {
        self.record(GpuCall::Draw { vertex_count: batch.len(), indices: indices.to_vec() });
        match indices.iter().find(|&&i| i as usize >= batch.len()) {
            Some(&index) => Err(HeadlessError::IndexOutOfRange { index, count: batch.len() }),
            None => Ok(()),
        }
    }
}

// ─── Host ────────────────────────────────────────────────────────────────────

/// Handle of a hook installed on a [`RecordingHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(pub u32);

/// [`ViewportHost`] keeping a list of installed hooks.
#[derive(Debug)]
pub struct RecordingHost<R> {
    installed:  Vec<(R, HookId, DrawPhase)>,
    removed:    Vec<(R, HookId)>,
    next_hook:  u32,
}

impl<R> Default for RecordingHost<R> {
    fn default() -> Self {
        Self { installed: Vec::new(), removed: Vec::new(), next_hook: 0 }
    }
}

impl<R: Copy + Eq> RecordingHost<R> {
    /// Regions with a hook currently installed, in install order.
    pub fn live_regions(&self) -> Vec<R> {
        self.installed.iter().map(|&(r, _, _)| r).collect()
    }

    pub fn install_count(&self) -> usize { self.installed.len() + self.removed.len() }
    pub fn removed(&self) -> &[(R, HookId)] { &self.removed }

    pub fn phase_of(&self, region: R) -> Option<DrawPhase> {
        self.installed.iter().find(|(r, _, _)| *r == region).map(|&(_, _, p)| p)
    }
}

impl<R> ViewportHost for RecordingHost<R>
where
    R: Copy + Eq + Hash + std::fmt::Debug,
{
    type Region  = R;
    type Hook    = HookId;
    type Context = HeadlessDrawContext;

    fn install_draw_hook(&mut self, region: R, phase: DrawPhase) -> HookId {
        let id = HookId(self.next_hook);
        self.next_hook += 1;
        self.installed.push((region, id, phase));
        id
    }

    fn remove_draw_hook(&mut self, hook: HookId, region: R) {
        self.installed.retain(|&(_, h, _)| h != hook);
        self.removed.push((region, hook));
    }
}

/// Drawing context of a headless region.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessDrawContext {
    pub region_size: Vec2,
    pub ui_scale:    f32,
    pub pixel_scale: Vec2,
}

impl HeadlessDrawContext {
    pub fn new(width: f32, height: f32) -> Self {
        Self { region_size: Vec2::new(width, height), ui_scale: 1.0, pixel_scale: Vec2::ONE }
    }
}

impl DrawContext for HeadlessDrawContext {
    fn region_size(&self) -> Vec2 { self.region_size }
    fn ui_scale(&self) -> f32 { self.ui_scale }
    fn pixel_scale(&self) -> Vec2 { self.pixel_scale }
}

// ─── GUI ─────────────────────────────────────────────────────────────────────

/// Minimal GUI library: overlays draw raw primitives into one command list.
#[derive(Debug)]
pub struct HeadlessGui {
    available:        bool,
    pub created:      usize,
    pub destroyed:    usize,
}

impl Default for HeadlessGui {
    fn default() -> Self { Self { available: true, created: 0, destroyed: 0 } }
}

impl HeadlessGui {
    /// A library that fails to load, as when the dependency is missing.
    pub fn unavailable() -> Self { Self { available: false, ..Self::default() } }

    pub fn live_contexts(&self) -> usize { self.created - self.destroyed }
}

impl GuiLibrary for HeadlessGui {
    type Context = HeadlessContext;

    fn create_context(&mut self) -> Result<HeadlessContext, OverlayError> {
        if !self.available {
            return Err(OverlayError::GuiUnavailable("headless GUI disabled".to_owned()));
        }
        self.created += 1;
        Ok(HeadlessContext::default())
    }

    fn destroy_context(&mut self, ctx: HeadlessContext) {
        self.destroyed += 1;
        drop(ctx);
    }
}

#[derive(Debug, Default)]
pub struct HeadlessContext {
    ui:           HeadlessUi,
    font_texture: TextureId,
    frames:       u64,
}

impl HeadlessContext {
    pub fn font_texture(&self) -> TextureId { self.font_texture }
    pub fn frames(&self) -> u64 { self.frames }
}

impl GuiContext for HeadlessContext {
    type Ui = HeadlessUi;

    fn font_atlas_rgba32(&mut self) -> FontAtlasTexture {
        // 4x2 opaque white: every UV samples white.
        FontAtlasTexture { width: 4, height: 2, data: vec![0xFF; 4 * 2 * 4] }
    }

    fn set_font_texture(&mut self, id: TextureId) { self.font_texture = id; }

    fn sync_input(&mut self, input: &mut InputState) {
        self.ui.text = input.drain_text().collect();
        self.ui.input = input.clone();
    }

    fn new_frame(&mut self) -> &mut HeadlessUi {
        self.ui.draw_list.clear();
        self.ui.font_texture = self.font_texture;
        let size = self.ui.input.display_size;
        self.ui.draw_list.push_clip_rect(Rect::from_min_size(Vec2::ZERO, size));
        self.ui.draw_list.push_texture(self.font_texture);
        &mut self.ui
    }

    fn render(&mut self) -> DrawData {
        self.frames += 1;
        let list = std::mem::take(&mut self.ui.draw_list);
        DrawData {
            cmd_lists:         if list.idx_buf.is_empty() { Vec::new() } else { vec![list] },
            display_pos:       Vec2::ZERO,
            display_size:      self.ui.input.display_size,
            framebuffer_scale: self.ui.input.framebuffer_scale,
        }
    }
}

/// Frame builder of [`HeadlessGui`].
#[derive(Debug, Default)]
pub struct HeadlessUi {
    draw_list:    DrawList,
    input:        InputState,
    text:         String,
    font_texture: TextureId,
}

impl HeadlessUi {
    /// Input as it was when the frame started.
    pub fn input(&self) -> &InputState { &self.input }
    /// Text typed since the previous frame.
    pub fn text(&self) -> &str { &self.text }
    pub fn display_size(&self) -> Vec2 { self.input.display_size }

    pub fn rect(&mut self, rect: Rect, col: Color) { self.draw_list.filled_rect(rect, col); }
    pub fn triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, col: Color) { self.draw_list.triangle_filled(a, b, c, col); }

    pub fn with_clip(&mut self, clip: Rect, f: impl FnOnce(&mut Self)) {
        self.draw_list.push_clip_rect(clip);
        f(self);
        self.draw_list.pop_clip_rect();
    }

    pub fn draw_list_mut(&mut self) -> &mut DrawList { &mut self.draw_list }
    pub fn font_texture(&self) -> TextureId { self.font_texture }
}
