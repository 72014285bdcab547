//! # imoverlay
//!
//! Immediate-mode GUI overlays drawn inside the viewport regions of a 3D
//! host application. Umbrella crate that re-exports the core and the
//! optional Dear ImGui backend.
//!
//! ## Feature flags
//!
//! | Flag    | Backend                          |
//! |---------|----------------------------------|
//! | `imgui` | Dear ImGui through `imgui-rs`    |
//!
//! ## Minimal example
//!
//! ```rust
//! use imoverlay::headless::{HeadlessDrawContext, HeadlessGui, HeadlessUi, RecordingGpu, RecordingHost};
//! use imoverlay::prelude::*;
//!
//! struct Crosshair;
//!
//! impl Overlay<HeadlessUi, HeadlessDrawContext> for Crosshair {
//!     const ID: &'static str = "crosshair";
//!     fn draw(&mut self, ui: &mut HeadlessUi, _ctx: &HeadlessDrawContext) {
//!         let c = ui.display_size().scale(Vec2::splat(0.5));
//!         ui.rect(Rect::new(c - Vec2::splat(2.0), c + Vec2::splat(2.0)), Color::WHITE);
//!     }
//! }
//!
//! let host: RecordingHost<&str> = RecordingHost::default();
//! let mut registry = OverlayRegistry::new(HeadlessGui::default(), host, RecordingGpu::default(), RegistryConfig::default());
//! let mut names = OverlayNamespace::from_config(registry.config());
//!
//! register_overlay(&mut registry, &mut names, Crosshair, "VIEW_3D").unwrap();
//! registry.dispatch("VIEW_3D", &HeadlessDrawContext::new(1280.0, 720.0)).unwrap();
//! unregister_overlay::<Crosshair, _, _, _>(&mut registry, &mut names);
//! ```

// ─── Core re-exports ─────────────────────────────────────────────────────────

pub use imoverlay_core::*;
pub use imoverlay_core as core;

pub mod addon;
pub mod operator;

pub use addon::{register_overlay, unregister_overlay, Overlay, OverlayNamespace};
pub use operator::OverlayOperator;

// ─── Backends ────────────────────────────────────────────────────────────────

#[cfg(feature = "imgui")]
pub mod imgui {
    //! Dear ImGui backend.
    pub use imoverlay_imgui::*;
}

// ─── Prelude ─────────────────────────────────────────────────────────────────

pub mod prelude {
    pub use imoverlay_core::prelude::*;
    pub use crate::addon::{register_overlay, unregister_overlay, Overlay, OverlayNamespace};
    pub use crate::operator::OverlayOperator;
}
