//! demo_headless – drives overlays through an in-memory host and GPU.
//!
//! Run with `RUST_LOG=trace` to see every host hook and GPU call.

use imoverlay::headless::{HeadlessDrawContext, HeadlessGui, HeadlessUi, RecordingGpu, RecordingHost};
use imoverlay::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Space {
    View3d,
    NodeEditor,
}

// ── Overlays ──────────────────────────────────────────────────────────────────

/// Fills the region corner with a progress bar that follows the mouse.
struct Progress;

impl Overlay<HeadlessUi, HeadlessDrawContext> for Progress {
    const ID: &'static str = "VIEW3D_OT_progress";

    fn draw(&mut self, ui: &mut HeadlessUi, _ctx: &HeadlessDrawContext) {
        let size = ui.display_size();
        let frac = (ui.input().mouse_pos.x / size.x).clamp(0.0, 1.0);
        let bar = Rect::from_min_size(Vec2::new(10.0, 10.0), Vec2::new(200.0, 12.0));
        ui.rect(bar, Color::rgb(0.15, 0.15, 0.15));
        ui.with_clip(bar, |ui| {
            ui.rect(Rect::from_min_size(bar.min, Vec2::new(bar.width() * frac, bar.height())), Color::rgb(0.61, 0.15, 0.69));
        });
    }
}

/// Echoes typed text as one marker per character.
#[derive(Default)]
struct Typist {
    typed: String,
}

impl Overlay<HeadlessUi, HeadlessDrawContext> for Typist {
    const ID: &'static str = "VIEW3D_OT_typist";

    fn draw(&mut self, ui: &mut HeadlessUi, _ctx: &HeadlessDrawContext) {
        self.typed.push_str(ui.text());
        if ui.input().key_down(Key::Backspace) {
            self.typed.pop();
        }
        for i in 0..self.typed.chars().count() {
            let x = 10.0 + i as f32 * 8.0;
            ui.triangle(Vec2::new(x, 40.0), Vec2::new(x + 6.0, 40.0), Vec2::new(x + 3.0, 34.0), Color::WHITE);
        }
    }
}

fn main() {
    env_logger::init();

    let config = RegistryConfig::default().with_hook_policy(HookPolicy::ReleaseWhenRegionEmpty);
    let host: RecordingHost<Space> = RecordingHost::default();
    let mut registry = OverlayRegistry::new(HeadlessGui::default(), host, RecordingGpu::default(), config);
    let mut names = OverlayNamespace::from_config(registry.config());

    if let Err(e) = register_overlay(&mut registry, &mut names, Progress, Space::View3d) {
        log::error!("cannot register {}: {e}", Progress::ID);
        return;
    }
    let mut typist = OverlayOperator::<Typist>::new();
    if let Err(e) = typist.init(&mut registry, Space::View3d, Typist::default()) {
        log::error!("cannot start {}: {e}", Typist::ID);
        return;
    }
    let node_overlay = registry.register(|_ui: &mut HeadlessUi, _ctx: &HeadlessDrawContext| {}, Space::NodeEditor);

    let region = HeadlessDrawContext::new(640.0, 360.0);
    let script = [
        HostEvent::new(EventKind::MouseMove, EventValue::Nothing).at(320.0, 100.0),
        HostEvent::new(EventKind::Other(0), EventValue::Press).at(320.0, 100.0).with_unicode('o'),
        HostEvent::new(EventKind::Other(0), EventValue::Press).at(320.0, 100.0).with_unicode('k'),
        HostEvent::new(EventKind::LeftCtrl, EventValue::Press).at(320.0, 100.0),
        HostEvent::new(EventKind::WheelUpMouse, EventValue::Press).at(600.0, 100.0),
    ];

    for (frame, event) in script.iter().enumerate() {
        typist.modal(&mut registry, event, region.region_size.y);
        registry.gpu_mut().clear_calls();
        if let Err(e) = registry.dispatch(Space::View3d, &region) {
            log::error!("frame {frame}: {e}");
            continue;
        }
        log::info!("frame {frame}: {} draw calls", registry.gpu().draw_count());
    }

    if let Ok(handle) = node_overlay {
        let _ = registry.unregister(handle);
    }
    log::info!("hooked regions after node overlay left: {:?}", registry.hooked_regions().collect::<Vec<_>>());

    typist.shutdown(&mut registry);
    unregister_overlay::<Progress, _, _, _>(&mut registry, &mut names);
    log::info!("active after teardown: {}", registry.is_active());
}
