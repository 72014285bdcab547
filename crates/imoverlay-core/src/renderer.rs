//! Draw data → host GPU calls.
//!
//! # Call order per frame
//!
//! ```text
//! save blend ─► alpha blend, no culling, scissor on, viewport
//!            ─► bind program, upload ProjMtx
//!            ─► per command: scissor, texture, indexed draw
//!            ─► restore blend, scissor off
//! ```
//!
//! Nothing but the program and the font atlas outlives a frame.

use crate::draw_list::{DrawData, DrawList, TextureId};
use crate::gpu::{BlendMode, FaceCulling, GpuDevice, PixelRect, ShaderId, VertexBatch};
use crate::gui::GuiContext;
use crate::shader::OVERLAY_SHADER;
use crate::{Color, Rect, Vec2};

/// Orthographic projection taking `display_pos .. display_pos + display_size`
/// (top-left origin, Y down) to clip space (Y up). Column-major.
pub fn ortho_projection(display_pos: Vec2, display_size: Vec2) -> [f32; 16] {
    let l = display_pos.x;
    let r = display_pos.x + display_size.x;
    let t = display_pos.y;
    let b = display_pos.y + display_size.y;
    [
        2.0 / (r - l),     0.0,               0.0,  0.0,
        0.0,               2.0 / (t - b),     0.0,  0.0,
        0.0,               0.0,              -1.0,  0.0,
        (r + l) / (l - r), (t + b) / (b - t), 0.0,  1.0,
    ]
}

/// Scissor for a pixel-space clip rect on a `fb_width` × `fb_height` target,
/// flipped to the host's bottom-left origin. `None` when nothing is visible.
pub fn scissor_rect(clip: [f32; 4], fb_width: u32, fb_height: u32) -> Option<PixelRect> {
    let fb   = Rect::from_array([0.0, 0.0, fb_width as f32, fb_height as f32]);
    let clip = Rect::from_array(clip).intersect(fb);
    if clip.is_empty() {
        return None;
    }
    Some(PixelRect::new(
        clip.min.x as i32,
        (fb.max.y - clip.max.y) as i32,
        clip.width() as i32,
        clip.height() as i32,
    ))
}

/// Vertex attributes of a whole command list, colours unpacked to floats.
fn vertex_batch(list: &DrawList) -> VertexBatch {
    let mut batch = VertexBatch {
        positions: Vec::with_capacity(list.vtx_buf.len()),
        uvs:       Vec::with_capacity(list.vtx_buf.len()),
        colors:    Vec::with_capacity(list.vtx_buf.len()),
    };
    for v in &list.vtx_buf {
        batch.positions.push(v.pos);
        batch.uvs.push(v.uv);
        batch.colors.push(Color::from_rgba_u32(v.col).into());
    }
    batch
}

/// Draws GUI frames through a [`GpuDevice`].
#[derive(Debug)]
pub struct OverlayRenderer {
    shader:       ShaderId,
    font_texture: TextureId,
}

impl OverlayRenderer {
    /// Compile the overlay program and upload `gui`'s font atlas.
    pub fn new<D, C>(gpu: &mut D, gui: &mut C) -> Result<Self, D::Error>
    where
        D: GpuDevice,
        C: GuiContext,
    {
        let shader = gpu.create_shader(&OVERLAY_SHADER)?;
        let font_texture = upload_font_atlas(gpu, gui)?;
        Ok(Self { shader, font_texture })
    }

    pub fn shader(&self) -> ShaderId { self.shader }
    pub fn font_texture(&self) -> TextureId { self.font_texture }

    /// Re-rasterise and re-upload the atlas, e.g. after fonts changed.
    pub fn refresh_font_texture<D, C>(&mut self, gpu: &mut D, gui: &mut C) -> Result<(), D::Error>
    where
        D: GpuDevice,
        C: GuiContext,
    {
        let fresh = upload_font_atlas(gpu, gui)?;
        gpu.destroy_texture(self.font_texture);
        self.font_texture = fresh;
        Ok(())
    }

    /// Release GPU resources. Called once, when the GUI context goes away.
    pub fn destroy<D: GpuDevice>(self, gpu: &mut D) {
        log::debug!("OverlayRenderer::destroy font texture {:?}", self.font_texture);
        gpu.destroy_texture(self.font_texture);
    }

    /// Draw one frame. Clip rects in `draw_data` are rescaled to pixels in place.
    ///
    /// A zero-sized framebuffer makes no host call at all. Host errors are
    /// returned after blend and scissor state have been restored.
    pub fn render<D: GpuDevice>(&self, gpu: &mut D, draw_data: &mut DrawData) -> Result<(), D::Error> {
        let (fb_width, fb_height) = draw_data.framebuffer_size();
        if fb_width == 0 || fb_height == 0 {
            log::trace!("OverlayRenderer::render skip (framebuffer {fb_width}x{fb_height})");
            return Ok(());
        }

        draw_data.scale_clip_rects(draw_data.framebuffer_scale);

        let last_blend = gpu.blend();

        gpu.set_blend(BlendMode::Alpha);
        gpu.set_face_culling(FaceCulling::None);
        gpu.set_scissor_test(true);
        gpu.set_viewport(PixelRect::new(0, 0, fb_width as i32, fb_height as i32));

        let result = self.draw_lists(gpu, draw_data, fb_width, fb_height);

        // restore modified gpu state
        gpu.set_blend(last_blend);
        gpu.set_scissor_test(false);

        result
    }

    fn draw_lists<D: GpuDevice>(
        &self,
        gpu: &mut D,
        draw_data: &DrawData,
        fb_width: u32,
        fb_height: u32,
    ) -> Result<(), D::Error> {
        let projection = ortho_projection(draw_data.display_pos, draw_data.display_size);
        gpu.bind_shader(self.shader);
        gpu.set_uniform_mat4(self.shader, "ProjMtx", &projection);

        let clip_off = draw_data.display_pos.scale(draw_data.framebuffer_scale);

        for list in &draw_data.cmd_lists {
            let batch = vertex_batch(list);
            for cmd in list.cmd_buf.iter().filter(|c| c.elem_count > 0) {
                let clip = [
                    cmd.clip_rect[0] - clip_off.x,
                    cmd.clip_rect[1] - clip_off.y,
                    cmd.clip_rect[2] - clip_off.x,
                    cmd.clip_rect[3] - clip_off.y,
                ];
                let Some(scissor) = scissor_rect(clip, fb_width, fb_height) else {
                    continue;
                };
                let Some(indices) = list.indices(cmd) else {
                    log::warn!(
                        "draw command indices {}..+{} past end of index buffer ({})",
                        cmd.idx_offset, cmd.elem_count, list.idx_buf.len(),
                    );
                    continue;
                };
                let indices: Vec<u32> = indices
                    .iter()
                    .map(|&i| u32::from(i) + cmd.vtx_offset)
                    .collect();

                gpu.set_scissor(scissor);
                gpu.set_uniform_sampler(self.shader, "Texture", cmd.texture_id)?;
                gpu.draw_indexed(self.shader, &batch, &indices)?;
            }
        }
        Ok(())
    }
}

fn upload_font_atlas<D, C>(gpu: &mut D, gui: &mut C) -> Result<TextureId, D::Error>
where
    D: GpuDevice,
    C: GuiContext,
{
    let atlas = gui.font_atlas_rgba32();
    let pixels: Vec<f32> = atlas.data.iter().map(|&b| f32::from(b) / 255.0).collect();
    let id = gpu.create_texture(atlas.width, atlas.height, &pixels)?;
    log::debug!("font atlas {}x{} uploaded as {:?}", atlas.width, atlas.height, id);
    gui.set_font_texture(id);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw_list::DrawCmd;
    use crate::headless::{GpuCall, HeadlessGui, RecordingGpu};
    use crate::gui::GuiLibrary;
    use approx::assert_relative_eq;

    fn renderer(gpu: &mut RecordingGpu) -> OverlayRenderer {
        let mut gui = HeadlessGui::default().create_context().unwrap();
        let r = OverlayRenderer::new(gpu, &mut gui).unwrap();
        gpu.clear_calls();
        r
    }

    fn one_triangle(clip: [f32; 4], texture: TextureId) -> DrawData {
        let mut list = DrawList::new();
        list.vtx_buf = vec![Default::default(); 3];
        list.idx_buf = vec![0, 1, 2];
        list.cmd_buf = vec![DrawCmd { clip_rect: clip, texture_id: texture, elem_count: 3, idx_offset: 0, vtx_offset: 0 }];
        DrawData {
            cmd_lists:    vec![list],
            display_size: Vec2::new(200.0, 100.0),
            ..DrawData::default()
        }
    }

    #[test]
    fn projection_maps_display_corners_to_clip_space() {
        let m = ortho_projection(Vec2::ZERO, Vec2::new(200.0, 100.0));
        let project = |x: f32, y: f32| (m[0] * x + m[12], m[5] * y + m[13]);
        let (x0, y0) = project(0.0, 0.0);
        let (x1, y1) = project(200.0, 100.0);
        assert_relative_eq!(x0, -1.0);
        assert_relative_eq!(y0, 1.0);
        assert_relative_eq!(x1, 1.0);
        assert_relative_eq!(y1, -1.0);
    }

    #[test]
    fn single_triangle_issues_one_draw_with_flipped_scissor() {
        let mut gpu = RecordingGpu::default();
        let r = renderer(&mut gpu);
        let mut data = one_triangle([10.0, 20.0, 60.0, 70.0], r.font_texture());
        r.render(&mut gpu, &mut data).unwrap();

        let calls = gpu.calls();
        let draws: Vec<_> = calls.iter().filter_map(|c| match c {
            GpuCall::Draw { indices, .. } => Some(indices.clone()),
            _ => None,
        }).collect();
        assert_eq!(draws, vec![vec![0, 1, 2]]);
        assert!(calls.contains(&GpuCall::SetScissor(PixelRect::new(10, 100 - 70, 50, 50))));
    }

    #[test]
    fn state_is_set_then_restored_in_order() {
        let mut gpu = RecordingGpu::default();
        gpu.set_blend(BlendMode::Multiply);
        let r = renderer(&mut gpu);
        let mut data = one_triangle([0.0, 0.0, 200.0, 100.0], r.font_texture());
        r.render(&mut gpu, &mut data).unwrap();

        let calls = gpu.calls();
        assert_eq!(&calls[..5], &[
            GpuCall::GetBlend,
            GpuCall::SetBlend(BlendMode::Alpha),
            GpuCall::SetFaceCulling(FaceCulling::None),
            GpuCall::SetScissorTest(true),
            GpuCall::SetViewport(PixelRect::new(0, 0, 200, 100)),
        ]);
        assert_eq!(&calls[calls.len() - 2..], &[
            GpuCall::SetBlend(BlendMode::Multiply),
            GpuCall::SetScissorTest(false),
        ]);
    }

    #[test]
    fn zero_sized_framebuffer_makes_no_calls() {
        let mut gpu = RecordingGpu::default();
        let r = renderer(&mut gpu);
        for size in [Vec2::new(0.0, 100.0), Vec2::new(200.0, 0.0), Vec2::new(0.4, 50.0)] {
            let mut data = one_triangle([0.0, 0.0, 10.0, 10.0], r.font_texture());
            data.display_size = size;
            r.render(&mut gpu, &mut data).unwrap();
        }
        assert!(gpu.calls().is_empty());
    }

    #[test]
    fn empty_draw_data_only_touches_state() {
        let mut gpu = RecordingGpu::default();
        let r = renderer(&mut gpu);
        let mut data = DrawData { display_size: Vec2::new(64.0, 64.0), ..DrawData::default() };
        r.render(&mut gpu, &mut data).unwrap();
        assert!(!gpu.calls().iter().any(|c| matches!(c, GpuCall::Draw { .. })));
    }

    #[test]
    fn clip_rects_are_scaled_to_pixels() {
        let mut gpu = RecordingGpu::default();
        let r = renderer(&mut gpu);
        let mut data = one_triangle([10.0, 10.0, 50.0, 40.0], r.font_texture());
        data.framebuffer_scale = Vec2::new(2.0, 2.0);
        r.render(&mut gpu, &mut data).unwrap();

        let calls = gpu.calls();
        assert!(calls.contains(&GpuCall::SetViewport(PixelRect::new(0, 0, 400, 200))));
        assert!(calls.contains(&GpuCall::SetScissor(PixelRect::new(20, 200 - 80, 80, 60))));
    }

    #[test]
    fn offscreen_commands_are_skipped_and_partial_ones_clamped() {
        let mut gpu = RecordingGpu::default();
        let r = renderer(&mut gpu);
        let mut data = one_triangle([300.0, 0.0, 400.0, 50.0], r.font_texture());
        r.render(&mut gpu, &mut data).unwrap();
        assert!(!gpu.calls().iter().any(|c| matches!(c, GpuCall::Draw { .. })));

        gpu.clear_calls();
        let mut data = one_triangle([-20.0, 80.0, 50.0, 150.0], r.font_texture());
        r.render(&mut gpu, &mut data).unwrap();
        assert!(gpu.calls().contains(&GpuCall::SetScissor(PixelRect::new(0, 0, 50, 20))));
    }

    #[test]
    fn indices_are_sliced_per_command_and_offset() {
        let mut gpu = RecordingGpu::default();
        let r = renderer(&mut gpu);
        let tex = r.font_texture();
        let mut data = one_triangle([0.0, 0.0, 200.0, 100.0], tex);
        let list = &mut data.cmd_lists[0];
        list.vtx_buf = vec![Default::default(); 6];
        list.idx_buf = vec![0, 1, 2, 0, 1, 2];
        list.cmd_buf.push(DrawCmd { clip_rect: [0.0, 0.0, 200.0, 100.0], texture_id: tex, elem_count: 3, idx_offset: 3, vtx_offset: 3 });
        r.render(&mut gpu, &mut data).unwrap();

        let draws: Vec<_> = gpu.calls().into_iter().filter_map(|c| match c {
            GpuCall::Draw { indices, vertex_count } => Some((indices, vertex_count)),
            _ => None,
        }).collect();
        assert_eq!(draws, vec![(vec![0, 1, 2], 6), (vec![3, 4, 5], 6)]);
    }

    #[test]
    fn host_error_propagates_after_state_restore() {
        let mut gpu = RecordingGpu::default();
        let r = renderer(&mut gpu);
        let mut data = one_triangle([0.0, 0.0, 200.0, 100.0], TextureId(999));
        assert!(r.render(&mut gpu, &mut data).is_err());
        let calls = gpu.calls();
        assert_eq!(calls.last(), Some(&GpuCall::SetScissorTest(false)));
    }

    #[test]
    fn refresh_swaps_font_texture() {
        let mut gpu = RecordingGpu::default();
        let mut gui = HeadlessGui::default().create_context().unwrap();
        let mut r = OverlayRenderer::new(&mut gpu, &mut gui).unwrap();
        let old = r.font_texture();
        r.refresh_font_texture(&mut gpu, &mut gui).unwrap();
        assert_ne!(r.font_texture(), old);
        assert_eq!(gui.font_texture(), r.font_texture());
        assert!(!gpu.is_live(old));
        r.destroy(&mut gpu);
        assert_eq!(gpu.live_texture_count(), 0);
    }
}
