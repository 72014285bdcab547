//! # imoverlay-imgui
//!
//! Dear ImGui behind the [`GuiLibrary`] / [`GuiContext`] seams of
//! `imoverlay-core`.
//!
//! Overlay callbacks receive a real `&mut imgui::Ui`:
//!
//! ```rust,ignore
//! registry.register(|ui: &mut imgui::Ui, _ctx| {
//!     ui.window("Stats").build(|| ui.text("hello from the viewport"));
//! }, Region::View3d)?;
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use imoverlay_core::gui::{FontAtlasTexture, GuiContext, GuiLibrary};
use imoverlay_core::input::{InputState, Key, Modifiers, MouseButton};
use imoverlay_core::{DrawCmd, DrawData, DrawList, DrawVert, OverlayError, TextureId};

/// Re-export so overlay code can name `imgui::Ui` without a direct dependency.
pub use imgui;

// ─── Library ─────────────────────────────────────────────────────────────────

/// Set while an [`ImguiContext`] exists anywhere in the process.
static CONTEXT_LIVE: AtomicBool = AtomicBool::new(false);

/// Creates imgui contexts. imgui-rs allows one live context per process;
/// creating a second one fails with [`OverlayError::GuiUnavailable`]
/// instead of panicking.
#[derive(Debug, Default)]
pub struct ImguiLibrary;

impl GuiLibrary for ImguiLibrary {
    type Context = ImguiContext;

    fn create_context(&mut self) -> Result<ImguiContext, OverlayError> {
        if CONTEXT_LIVE.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
            return Err(OverlayError::GuiUnavailable("an imgui context is already alive".to_owned()));
        }
        let live = LiveToken;
        let mut ctx = imgui::Context::create();
        ctx.set_ini_filename(None::<std::path::PathBuf>);
        ctx.fonts().add_font(&[imgui::FontSource::DefaultFontData { config: None }]);
        log::debug!("imgui {} context created", imgui::dear_imgui_version());
        Ok(ImguiContext { ctx, sent: InputState::default(), _live: live })
    }
}

/// Clears [`CONTEXT_LIVE`] once the imgui context before it has been dropped.
struct LiveToken;

impl Drop for LiveToken {
    fn drop(&mut self) {
        CONTEXT_LIVE.store(false, Ordering::Release);
    }
}

// ─── Context ─────────────────────────────────────────────────────────────────

pub struct ImguiContext {
    ctx:  imgui::Context,
    /// Input as last forwarded; imgui takes events, so only changes are sent.
    sent: InputState,
    // Declared last: dropped after `ctx`.
    _live: LiveToken,
}

impl ImguiContext {
    pub fn imgui(&mut self) -> &mut imgui::Context { &mut self.ctx }
}

impl std::fmt::Debug for ImguiContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImguiContext").finish_non_exhaustive()
    }
}

impl GuiContext for ImguiContext {
    type Ui = imgui::Ui;

    fn font_atlas_rgba32(&mut self) -> FontAtlasTexture {
        let tex = self.ctx.fonts().build_rgba32_texture();
        FontAtlasTexture { width: tex.width, height: tex.height, data: tex.data.to_vec() }
    }

    fn set_font_texture(&mut self, id: TextureId) {
        self.ctx.fonts().tex_id = imgui::TextureId::new(id.0);
    }

    fn sync_input(&mut self, input: &mut InputState) {
        let io = self.ctx.io_mut();
        io.display_size              = input.display_size.into();
        io.display_framebuffer_scale = input.framebuffer_scale.into();
        io.font_global_scale         = input.font_global_scale;

        if input.mouse_pos != self.sent.mouse_pos {
            io.add_mouse_pos_event(input.mouse_pos.into());
        }
        for (btn, im) in MOUSE_BUTTONS {
            if input.mouse_down(btn) != self.sent.mouse_down(btn) {
                io.add_mouse_button_event(im, input.mouse_down(btn));
            }
        }
        if input.mouse_wheel != 0.0 {
            io.add_mouse_wheel_event([0.0, input.mouse_wheel]);
        }

        for (key, im) in KEYS {
            // Modifier keys are read from their own slot, the rest through the key map.
            let slot = input.mapped_slot(key).unwrap_or_else(|| key.slot());
            let down = input.keys_down[slot];
            if down != self.sent.keys_down[slot] {
                io.add_key_event(im, down);
            }
        }
        for (flag, im) in MODIFIERS {
            let down = input.modifiers.contains(flag);
            if down != self.sent.modifiers.contains(flag) {
                io.add_key_event(im, down);
            }
        }

        for ch in input.drain_text() {
            io.add_input_character(ch);
        }
        self.sent = input.clone();
    }

    fn new_frame(&mut self) -> &mut imgui::Ui {
        self.ctx.new_frame()
    }

    fn render(&mut self) -> DrawData {
        convert_draw_data(self.ctx.render())
    }
}

const MOUSE_BUTTONS: [(MouseButton, imgui::MouseButton); 3] = [
    (MouseButton::Left,   imgui::MouseButton::Left),
    (MouseButton::Right,  imgui::MouseButton::Right),
    (MouseButton::Middle, imgui::MouseButton::Middle),
];

const KEYS: [(Key, imgui::Key); 27] = [
    (Key::Tab,        imgui::Key::Tab),
    (Key::LeftArrow,  imgui::Key::LeftArrow),
    (Key::RightArrow, imgui::Key::RightArrow),
    (Key::UpArrow,    imgui::Key::UpArrow),
    (Key::DownArrow,  imgui::Key::DownArrow),
    (Key::PageUp,     imgui::Key::PageUp),
    (Key::PageDown,   imgui::Key::PageDown),
    (Key::Home,       imgui::Key::Home),
    (Key::End,        imgui::Key::End),
    (Key::Insert,     imgui::Key::Insert),
    (Key::Delete,     imgui::Key::Delete),
    (Key::Backspace,  imgui::Key::Backspace),
    (Key::Enter,      imgui::Key::Enter),
    (Key::Escape,     imgui::Key::Escape),
    (Key::A,          imgui::Key::A),
    (Key::C,          imgui::Key::C),
    (Key::V,          imgui::Key::V),
    (Key::X,          imgui::Key::X),
    (Key::Y,          imgui::Key::Y),
    (Key::Z,          imgui::Key::Z),
    (Key::LeftCtrl,   imgui::Key::LeftCtrl),
    (Key::RightCtrl,  imgui::Key::RightCtrl),
    (Key::LeftAlt,    imgui::Key::LeftAlt),
    (Key::RightAlt,   imgui::Key::RightAlt),
    (Key::LeftShift,  imgui::Key::LeftShift),
    (Key::RightShift, imgui::Key::RightShift),
    (Key::OsKey,      imgui::Key::LeftSuper),
];

const MODIFIERS: [(Modifiers, imgui::Key); 4] = [
    (Modifiers::CTRL,  imgui::Key::ModCtrl),
    (Modifiers::SHIFT, imgui::Key::ModShift),
    (Modifiers::ALT,   imgui::Key::ModAlt),
    (Modifiers::SUPER, imgui::Key::ModSuper),
];

// ─── Draw data ───────────────────────────────────────────────────────────────

fn convert_draw_data(src: &imgui::DrawData) -> DrawData {
    let cmd_lists = src.draw_lists().map(convert_list).collect();
    DrawData {
        cmd_lists,
        display_pos:       src.display_pos.into(),
        display_size:      src.display_size.into(),
        framebuffer_scale: src.framebuffer_scale.into(),
    }
}

fn convert_list(src: &imgui::DrawList) -> DrawList {
    let mut list = DrawList::new();
    list.vtx_buf = src
        .vtx_buffer()
        .iter()
        .map(|v| DrawVert { pos: v.pos, uv: v.uv, col: u32::from_le_bytes(v.col) })
        .collect();
    list.idx_buf = src.idx_buffer().to_vec();
    for cmd in src.commands() {
        match cmd {
            imgui::DrawCmd::Elements { count, cmd_params } => list.cmd_buf.push(DrawCmd {
                clip_rect:  cmd_params.clip_rect,
                texture_id: TextureId(cmd_params.texture_id.id()),
                elem_count: count as u32,
                idx_offset: cmd_params.idx_offset as u32,
                vtx_offset: cmd_params.vtx_offset as u32,
            }),
            imgui::DrawCmd::ResetRenderState => {}
            imgui::DrawCmd::RawCallback { .. } => {
                log::warn!("imgui draw callbacks are not supported; skipped");
            }
        }
    }
    list
}
