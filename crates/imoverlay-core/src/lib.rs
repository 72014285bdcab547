//! # imoverlay-core
//!
//! Host-agnostic glue for drawing an immediate-mode GUI inside the viewport
//! regions of a 3D content-creation host.
//!
//! Data flows one way each frame:
//!
//! ```text
//! host event ─► translate ─► InputState ─► GuiContext frame ─► DrawData ─► OverlayRenderer ─► GpuDevice
//! ```
//!
//! The [`OverlayRegistry`] owns the GUI context for as long as at least one
//! overlay is registered and fans each region redraw out to the overlays that
//! asked for that region.

pub mod config;
pub mod draw_list;
pub mod error;
pub mod gpu;
pub mod gui;
pub mod headless;
pub mod input;
pub mod registry;
pub mod renderer;
pub mod shader;
pub mod translate;

// ─── re-exports ──────────────────────────────────────────────────────────────
pub use config::{DrawPhase, HookPolicy, RegistryConfig};
pub use draw_list::{DrawCmd, DrawData, DrawIdx, DrawList, DrawVert, TextureId};
pub use error::OverlayError;
pub use gpu::{BlendMode, FaceCulling, GpuDevice, PixelRect, ShaderId, VertexBatch};
pub use gui::{FontAtlasTexture, GuiContext, GuiLibrary};
pub use input::{InputState, Key, Modifiers, MouseButton};
pub use registry::{ContextGuard, DrawCallback, DrawContext, OverlayHandle, OverlayRegistry, UiOf, ViewportHost};
pub use renderer::OverlayRenderer;
pub use translate::{translate, EventKind, EventValue, HostEvent};

// ─── Prelude ─────────────────────────────────────────────────────────────────
pub mod prelude {
    pub use super::{
        config::{DrawPhase, HookPolicy, RegistryConfig},
        draw_list::{DrawData, TextureId},
        error::OverlayError,
        gpu::GpuDevice,
        gui::{GuiContext, GuiLibrary},
        input::{InputState, Key, Modifiers},
        registry::{DrawContext, OverlayHandle, OverlayRegistry, ViewportHost},
        translate::{EventKind, EventValue, HostEvent},
        Color, Rect, Vec2,
    };
}

// ─── Primitive math types ─────────────────────────────────────────────────── //

/// 2-D floating-point vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    pub const ONE: Self = Self { x: 1.0, y: 1.0 };

    #[inline] pub fn new(x: f32, y: f32) -> Self { Self { x, y } }
    #[inline] pub fn splat(v: f32) -> Self { Self { x: v, y: v } }

    #[inline] pub fn min(self, o: Self) -> Self { Self::new(self.x.min(o.x), self.y.min(o.y)) }
    #[inline] pub fn max(self, o: Self) -> Self { Self::new(self.x.max(o.x), self.y.max(o.y)) }

    /// Component-wise product, used to go from logical units to pixels.
    #[inline] pub fn scale(self, s: Self) -> Self { Self::new(self.x * s.x, self.y * s.y) }
}

impl std::ops::Add for Vec2 { type Output = Self; fn add(self, r: Self) -> Self { Self::new(self.x + r.x, self.y + r.y) } }
impl std::ops::Sub for Vec2 { type Output = Self; fn sub(self, r: Self) -> Self { Self::new(self.x - r.x, self.y - r.y) } }
impl std::ops::Mul<f32> for Vec2 { type Output = Self; fn mul(self, r: f32) -> Self { Self::new(self.x * r, self.y * r) } }

impl From<(f32, f32)> for Vec2 { fn from((x, y): (f32, f32)) -> Self { Self::new(x, y) } }
impl From<[f32; 2]>   for Vec2 { fn from([x, y]: [f32; 2])   -> Self { Self::new(x, y) } }
impl From<Vec2> for [f32; 2]   { fn from(v: Vec2) -> Self { [v.x, v.y] } }

// ─── Color ───────────────────────────────────────────────────────────────────

/// RGBA colour, 0.0 – 1.0 per channel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct Color {
    pub r: f32, pub g: f32, pub b: f32, pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self { r: 1., g: 1., b: 1., a: 1. };
    pub const BLACK: Self = Self { r: 0., g: 0., b: 0., a: 1. };

    #[inline] pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self { Self { r, g, b, a } }
    #[inline] pub fn rgb(r: f32, g: f32, b: f32) -> Self { Self { r, g, b, a: 1.0 } }

    /// Pack to 0xAABBGGRR (little-endian RGBA).
    #[inline]
    pub fn to_rgba_u32(self) -> u32 {
        let r = (self.r.clamp(0., 1.) * 255.).round() as u32;
        let g = (self.g.clamp(0., 1.) * 255.).round() as u32;
        let b = (self.b.clamp(0., 1.) * 255.).round() as u32;
        let a = (self.a.clamp(0., 1.) * 255.).round() as u32;
        (a << 24) | (b << 16) | (g << 8) | r
    }

    #[inline]
    pub fn from_rgba_u32(c: u32) -> Self {
        Self {
            r: (c & 0xFF) as f32 / 255.,
            g: ((c >> 8)  & 0xFF) as f32 / 255.,
            b: ((c >> 16) & 0xFF) as f32 / 255.,
            a: ((c >> 24) & 0xFF) as f32 / 255.,
        }
    }
}

impl From<[f32; 4]> for Color { fn from([r, g, b, a]: [f32; 4]) -> Self { Self::new(r, g, b, a) } }
impl From<Color> for [f32; 4] { fn from(c: Color) -> Self { [c.r, c.g, c.b, c.a] } }

// ─── Rect ────────────────────────────────────────────────────────────────────

/// Axis-aligned rectangle (min inclusive, max exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect { pub min: Vec2, pub max: Vec2 }

impl Rect {
    pub const ZERO: Self = Self { min: Vec2::ZERO, max: Vec2::ZERO };

    #[inline] pub fn new(min: Vec2, max: Vec2) -> Self { Self { min, max } }

    #[inline]
    pub fn from_min_size(min: Vec2, size: Vec2) -> Self {
        Self { min, max: min + size }
    }

    #[inline] pub fn width(self)  -> f32  { self.max.x - self.min.x }
    #[inline] pub fn height(self) -> f32  { self.max.y - self.min.y }
    #[inline] pub fn is_empty(self) -> bool { self.min.x >= self.max.x || self.min.y >= self.max.y }

    #[inline] pub fn intersect(self, o: Self) -> Self { Self { min: self.min.max(o.min), max: self.max.min(o.max) } }

    /// `[x0, y0, x1, y1]`, the clip-rect layout carried by draw commands.
    #[inline] pub fn to_array(self) -> [f32; 4] { [self.min.x, self.min.y, self.max.x, self.max.y] }
    #[inline] pub fn from_array([x0, y0, x1, y1]: [f32; 4]) -> Self { Self::new(Vec2::new(x0, y0), Vec2::new(x1, y1)) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_packing_matches_abgr_layout() {
        let c = Color::new(1.0, 0.0, 0.0, 1.0);
        assert_eq!(c.to_rgba_u32(), 0xFF00_00FF);
        assert_eq!(Color::from_rgba_u32(0xFF00_00FF), c);
    }

    #[test]
    fn rect_intersection_clamps_to_overlap() {
        let a = Rect::from_array([0.0, 0.0, 100.0, 50.0]);
        let b = Rect::from_array([80.0, -10.0, 200.0, 20.0]);
        assert_eq!(a.intersect(b).to_array(), [80.0, 0.0, 100.0, 20.0]);
        assert!(Rect::from_array([10.0, 10.0, 5.0, 20.0]).is_empty());
    }
}
