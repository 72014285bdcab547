//! The immediate-mode GUI library, seen from the outside.
//!
//! Widgets, layout and text shaping all stay inside the library. The overlay
//! only needs to create a context, feed it input, bracket a frame and collect
//! the resulting [`DrawData`].

use crate::draw_list::{DrawData, TextureId};
use crate::error::OverlayError;
use crate::input::InputState;

/// Rasterised font atlas, 4 bytes per pixel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontAtlasTexture {
    pub width:  u32,
    pub height: u32,
    pub data:   Vec<u8>,
}

/// Factory for GUI contexts. At most one context is alive per registry.
pub trait GuiLibrary {
    type Context: GuiContext;

    /// Fails with [`OverlayError::GuiUnavailable`] when the library cannot be
    /// loaded.
    fn create_context(&mut self) -> Result<Self::Context, OverlayError>;

    /// Tear down a context. Dropping is enough for most libraries.
    fn destroy_context(&mut self, ctx: Self::Context) {
        drop(ctx);
    }
}

/// One live GUI context.
pub trait GuiContext {
    /// Per-frame UI builder handed to overlay callbacks.
    type Ui;

    /// Rasterise the font atlas (default font included).
    fn font_atlas_rgba32(&mut self) -> FontAtlasTexture;

    /// Tell the library which texture holds its atlas; may drop the CPU copy.
    fn set_font_texture(&mut self, id: TextureId);

    /// Push `input` into the library. Queued text is consumed.
    fn sync_input(&mut self, input: &mut InputState);

    fn new_frame(&mut self) -> &mut Self::Ui;

    /// End the frame started by [`new_frame`](Self::new_frame) and return what
    /// to draw.
    fn render(&mut self) -> DrawData;
}
