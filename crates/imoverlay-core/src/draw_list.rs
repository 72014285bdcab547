//! Per-frame draw data – what the GUI library hands to the renderer.
//!
//! A [`DrawData`] holds one or more [`DrawList`]s (command lists). Each list
//! owns its vertices and indices; its [`DrawCmd`]s slice the index buffer into
//! contiguous, non-overlapping ranges in submission order.

use crate::{Color, Rect, Vec2};

// ─── Vertex ──────────────────────────────────────────────────────────────────

/// A single render vertex with position, UV, and a packed RGBA colour.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
pub struct DrawVert {
    /// Screen-space position, logical units.
    pub pos: [f32; 2],
    /// Normalised texture coordinates.
    pub uv:  [f32; 2],
    /// 0xAABBGGRR packed colour.
    pub col: u32,
}

// SAFETY: all fields are plain scalar types with no padding surprises.
unsafe impl bytemuck::Pod      for DrawVert {}
unsafe impl bytemuck::Zeroable for DrawVert {}

/// 16-bit index type – matches ImGui default.
pub type DrawIdx = u16;

// ─── TextureId ───────────────────────────────────────────────────────────────

/// Opaque handle to a GPU texture, as understood by the host device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureId(pub usize);

impl TextureId {
    /// Placeholder until the font atlas is uploaded.
    pub const NONE: Self = Self(0);
}

// ─── DrawCmd ─────────────────────────────────────────────────────────────────

/// One clipped, textured, indexed triangle batch.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCmd {
    /// `[x0, y0, x1, y1]`, top-left origin. Logical units until
    /// [`DrawData::scale_clip_rects`] runs, pixels afterwards.
    pub clip_rect:  [f32; 4],
    pub texture_id: TextureId,
    /// Number of indices to draw (always a multiple of 3).
    pub elem_count: u32,
    /// First index of this command in the list's index buffer.
    pub idx_offset: u32,
    /// Value added to each index.
    pub vtx_offset: u32,
}

// ─── DrawList ────────────────────────────────────────────────────────────────

/// A command list: vertices and indices sharing one coordinate space.
#[derive(Debug, Default, Clone)]
pub struct DrawList {
    pub vtx_buf: Vec<DrawVert>,
    pub idx_buf: Vec<DrawIdx>,
    pub cmd_buf: Vec<DrawCmd>,

    // Builder bookkeeping
    clip_stack: Vec<Rect>,
    tex_stack:  Vec<TextureId>,
}

impl DrawList {
    pub fn new() -> Self { Self::default() }

    pub fn clear(&mut self) {
        self.vtx_buf.clear();
        self.idx_buf.clear();
        self.cmd_buf.clear();
        self.clip_stack.clear();
        self.tex_stack.clear();
    }

    /// Indices of `cmd`, or `None` when the command points past the buffer.
    pub fn indices(&self, cmd: &DrawCmd) -> Option<&[DrawIdx]> {
        let start = cmd.idx_offset as usize;
        let end   = start.checked_add(cmd.elem_count as usize)?;
        self.idx_buf.get(start..end)
    }

    // ─── clip stack ──────────────────────────────────────────────────────────

    pub fn push_clip_rect(&mut self, rect: Rect) {
        // Intersect with parent clip
        let clip = match self.clip_stack.last() {
            Some(&parent) => rect.intersect(parent),
            None          => rect,
        };
        self.clip_stack.push(clip);
        self.add_draw_cmd();
    }

    pub fn pop_clip_rect(&mut self) {
        self.clip_stack.pop();
        self.add_draw_cmd();
    }

    pub fn clip_rect(&self) -> Option<Rect> { self.clip_stack.last().copied() }

    // ─── texture stack ───────────────────────────────────────────────────────

    pub fn push_texture(&mut self, id: TextureId) {
        self.tex_stack.push(id);
        self.add_draw_cmd();
    }

    pub fn pop_texture(&mut self) {
        self.tex_stack.pop();
        self.add_draw_cmd();
    }

    // ─── internal command management ─────────────────────────────────────────

    fn current_state(&self) -> ([f32; 4], TextureId) {
        let clip = self.clip_stack.last().copied().unwrap_or(Rect {
            min: Vec2::ZERO,
            max: Vec2::splat(f32::MAX),
        });
        let tex = self.tex_stack.last().copied().unwrap_or(TextureId::NONE);
        (clip.to_array(), tex)
    }

    /// Start a new command at the current end of the index buffer, reusing
    /// the last one if nothing was drawn into it yet.
    fn add_draw_cmd(&mut self) {
        let (clip_rect, texture_id) = self.current_state();
        let idx_offset = self.idx_buf.len() as u32;
        if let Some(last) = self.cmd_buf.last_mut() {
            if last.elem_count == 0 {
                last.clip_rect  = clip_rect;
                last.texture_id = texture_id;
                return;
            }
        }
        self.cmd_buf.push(DrawCmd {
            clip_rect,
            texture_id,
            elem_count: 0,
            idx_offset,
            vtx_offset: 0,
        });
    }

    fn current_cmd_mut(&mut self) -> &mut DrawCmd {
        if self.cmd_buf.is_empty() {
            self.add_draw_cmd();
        }
        let last = self.cmd_buf.len() - 1;
        &mut self.cmd_buf[last]
    }

    // ─── raw primitive helpers ───────────────────────────────────────────────

    fn add_vert(&mut self, pos: Vec2, uv: Vec2, col: u32) {
        self.vtx_buf.push(DrawVert { pos: pos.into(), uv: uv.into(), col });
    }

    fn add_idx(&mut self, base: u32, a: u32, b: u32, c: u32) {
        debug_assert!(
            base + a.max(b).max(c) <= DrawIdx::MAX as u32,
            "draw list exceeds {} vertices", DrawIdx::MAX as u32 + 1,
        );
        let (a, b, c) = (
            (base + a) as DrawIdx,
            (base + b) as DrawIdx,
            (base + c) as DrawIdx,
        );
        self.idx_buf.extend_from_slice(&[a, b, c]);
        self.current_cmd_mut().elem_count += 3;
    }

    // ─── Filled primitives ───────────────────────────────────────────────────

    /// Solid filled rectangle, two triangles.
    pub fn filled_rect(&mut self, rect: Rect, col: Color) {
        if rect.is_empty() { return; }
        let c    = col.to_rgba_u32();
        let base = self.vtx_buf.len() as u32;
        let uv   = Vec2::ZERO; // white pixel UV
        self.add_vert(rect.min,                          uv, c);
        self.add_vert(Vec2::new(rect.max.x, rect.min.y), uv, c);
        self.add_vert(rect.max,                          uv, c);
        self.add_vert(Vec2::new(rect.min.x, rect.max.y), uv, c);
        self.add_idx(base, 0, 1, 2);
        self.add_idx(base, 0, 2, 3);
    }

    pub fn triangle_filled(&mut self, a: Vec2, b: Vec2, c_pt: Vec2, col: Color) {
        let c    = col.to_rgba_u32();
        let uv   = Vec2::ZERO;
        let base = self.vtx_buf.len() as u32;
        self.add_vert(a,    uv, c);
        self.add_vert(b,    uv, c);
        self.add_vert(c_pt, uv, c);
        self.add_idx(base, 0, 1, 2);
    }
}

// ─── DrawData ────────────────────────────────────────────────────────────────

/// Everything the GUI library produced for one frame.
#[derive(Debug, Clone)]
pub struct DrawData {
    pub cmd_lists:         Vec<DrawList>,
    /// Top-left of the displayed area, logical units.
    pub display_pos:       Vec2,
    /// Size of the displayed area, logical units.
    pub display_size:      Vec2,
    /// Pixels per logical unit, per axis.
    pub framebuffer_scale: Vec2,
}

impl Default for DrawData {
    fn default() -> Self {
        Self {
            cmd_lists:         Vec::new(),
            display_pos:       Vec2::ZERO,
            display_size:      Vec2::ZERO,
            framebuffer_scale: Vec2::ONE,
        }
    }
}

impl DrawData {
    /// Framebuffer size in whole pixels (truncated, like the host viewport).
    pub fn framebuffer_size(&self) -> (u32, u32) {
        let px = self.display_size.scale(self.framebuffer_scale);
        (px.x.max(0.0) as u32, px.y.max(0.0) as u32)
    }

    /// Multiply every clip rectangle by `scale`, moving them to pixel units.
    pub fn scale_clip_rects(&mut self, scale: Vec2) {
        for cmd in self.cmd_lists.iter_mut().flat_map(|l| l.cmd_buf.iter_mut()) {
            cmd.clip_rect = [
                cmd.clip_rect[0] * scale.x,
                cmd.clip_rect[1] * scale.y,
                cmd.clip_rect[2] * scale.x,
                cmd.clip_rect[3] * scale.y,
            ];
        }
    }

    pub fn total_vtx_count(&self) -> usize { self.cmd_lists.iter().map(|l| l.vtx_buf.len()).sum() }
    pub fn total_idx_count(&self) -> usize { self.cmd_lists.iter().map(|l| l.idx_buf.len()).sum() }
    pub fn is_empty(&self) -> bool { self.cmd_lists.iter().all(|l| l.cmd_buf.is_empty()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_cover_contiguous_index_ranges() {
        let mut list = DrawList::new();
        list.push_clip_rect(Rect::from_array([0.0, 0.0, 100.0, 100.0]));
        list.filled_rect(Rect::from_array([10.0, 10.0, 20.0, 20.0]), Color::WHITE);
        list.push_texture(TextureId(7));
        list.triangle_filled(Vec2::new(0.0, 0.0), Vec2::new(5.0, 0.0), Vec2::new(0.0, 5.0), Color::BLACK);
        list.pop_texture();
        list.pop_clip_rect();

        let drawn: Vec<_> = list.cmd_buf.iter().filter(|c| c.elem_count > 0).collect();
        assert_eq!(drawn.len(), 2);
        assert_eq!((drawn[0].idx_offset, drawn[0].elem_count), (0, 6));
        assert_eq!((drawn[1].idx_offset, drawn[1].elem_count), (6, 3));
        assert_eq!(drawn[1].texture_id, TextureId(7));
        assert_eq!(list.idx_buf.len(), 9);
        assert_eq!(list.indices(drawn[1]), Some(&[4u16, 5, 6][..]));
    }

    #[test]
    fn nested_clip_rects_intersect_with_parent() {
        let mut list = DrawList::new();
        list.push_clip_rect(Rect::from_array([0.0, 0.0, 50.0, 50.0]));
        list.push_clip_rect(Rect::from_array([25.0, 25.0, 100.0, 100.0]));
        assert_eq!(list.clip_rect().map(Rect::to_array), Some([25.0, 25.0, 50.0, 50.0]));
    }

    #[test]
    fn scale_clip_rects_multiplies_per_axis() {
        let mut list = DrawList::new();
        list.push_clip_rect(Rect::from_array([1.0, 2.0, 3.0, 4.0]));
        list.triangle_filled(Vec2::ZERO, Vec2::ONE, Vec2::new(1.0, 0.0), Color::WHITE);
        let mut data = DrawData { cmd_lists: vec![list], ..DrawData::default() };
        data.scale_clip_rects(Vec2::new(2.0, 3.0));
        assert_eq!(data.cmd_lists[0].cmd_buf[0].clip_rect, [2.0, 6.0, 6.0, 12.0]);
    }

    #[test]
    fn framebuffer_size_truncates_scaled_display() {
        let data = DrawData {
            display_size:      Vec2::new(100.5, 40.0),
            framebuffer_scale: Vec2::new(2.0, 0.5),
            ..DrawData::default()
        };
        assert_eq!(data.framebuffer_size(), (201, 20));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "draw list exceeds")]
    fn index_past_u16_range_is_caught() {
        let mut list = DrawList::new();
        list.vtx_buf = vec![DrawVert::default(); DrawIdx::MAX as usize + 1];
        list.triangle_filled(Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0), Color::WHITE);
    }
}
