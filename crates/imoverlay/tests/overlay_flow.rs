//! End-to-end: host events in, GPU calls out.

use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;
use imoverlay::headless::{GpuCall, HeadlessDrawContext, HeadlessGui, HeadlessUi, RecordingGpu, RecordingHost};
use imoverlay::prelude::*;
use imoverlay::{PixelRect, TextureId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Space {
    View3d,
    ImageEditor,
}

type Registry = OverlayRegistry<HeadlessGui, RecordingHost<Space>, RecordingGpu>;

fn registry() -> Registry {
    OverlayRegistry::new(HeadlessGui::default(), RecordingHost::default(), RecordingGpu::default(), RegistryConfig::default())
}

/// Draws a box and records the text typed into it.
struct TextBox {
    typed: Rc<RefCell<String>>,
}

impl Overlay<HeadlessUi, HeadlessDrawContext> for TextBox {
    const ID: &'static str = "VIEW3D_OT_text_box";

    fn draw(&mut self, ui: &mut HeadlessUi, _ctx: &HeadlessDrawContext) {
        self.typed.borrow_mut().push_str(ui.text());
        ui.with_clip(Rect::from_array([10.0, 10.0, 50.0, 30.0]), |ui| {
            ui.rect(Rect::from_array([0.0, 0.0, 200.0, 100.0]), Color::rgb(0.2, 0.2, 0.2));
        });
    }
}

#[test]
fn typed_text_reaches_overlay_and_box_is_scissored() {
    let mut r = registry();
    let mut names = OverlayNamespace::from_config(r.config());
    let typed = Rc::new(RefCell::new(String::new()));
    // Input is fed through an operator that owns no overlay of its own.
    let op = OverlayOperator::<TextBox>::new();

    let handle = register_overlay(&mut r, &mut names, TextBox { typed: Rc::clone(&typed) }, Space::View3d).unwrap();
    assert_eq!(names.get(TextBox::ID), Some(handle));
    assert_eq!(names.keys().collect::<Vec<_>>(), vec!["_imgui_VIEW3D_OT_text_box"]);

    for ch in ['h', 'i'] {
        let ev = HostEvent::new(EventKind::Other(0), EventValue::Press).with_unicode(ch);
        assert!(op.modal(&mut r, &ev, 100.0));
    }

    r.gpu_mut().clear_calls();
    r.dispatch(Space::View3d, &HeadlessDrawContext::new(200.0, 100.0)).unwrap();
    assert_eq!(*typed.borrow(), "hi");

    let calls = r.gpu().calls();
    assert!(calls.contains(&GpuCall::SetViewport(PixelRect::new(0, 0, 200, 100))));
    assert!(calls.contains(&GpuCall::SetScissor(PixelRect::new(10, 70, 40, 20))));
    assert_eq!(r.gpu().draw_count(), 1);

    // The queue was consumed by the first frame.
    r.dispatch(Space::View3d, &HeadlessDrawContext::new(200.0, 100.0)).unwrap();
    assert_eq!(*typed.borrow(), "hi");

    assert!(unregister_overlay::<TextBox, _, _, _>(&mut r, &mut names));
    assert!(!r.is_active());
    assert!(names.is_empty());
    assert!(!op.modal(&mut r, &HostEvent::new(EventKind::MouseMove, EventValue::Nothing), 100.0));
}

#[test]
fn overlays_only_draw_in_their_region() {
    let mut r = registry();
    let hits = Rc::new(RefCell::new(Vec::new()));
    for space in [Space::View3d, Space::ImageEditor] {
        let hits = Rc::clone(&hits);
        r.register(move |_ui: &mut HeadlessUi, _ctx: &HeadlessDrawContext| hits.borrow_mut().push(space), space)
            .unwrap();
    }

    r.dispatch(Space::ImageEditor, &HeadlessDrawContext::new(64.0, 64.0)).unwrap();
    r.dispatch(Space::View3d, &HeadlessDrawContext::new(64.0, 64.0)).unwrap();
    assert_eq!(*hits.borrow(), vec![Space::ImageEditor, Space::View3d]);
    assert_eq!(r.host().live_regions(), vec![Space::View3d, Space::ImageEditor]);
}

#[test]
fn teardown_releases_hooks_textures_and_context() {
    let mut r = registry();
    let a = r.register(|_: &mut HeadlessUi, _: &HeadlessDrawContext| {}, Space::View3d).unwrap();
    let b = r.register(|_: &mut HeadlessUi, _: &HeadlessDrawContext| {}, Space::ImageEditor).unwrap();
    let font = r.gui_mut().map(|gui| gui.font_texture()).unwrap();
    assert_ne!(font, TextureId::NONE);

    r.unregister(a).unwrap();
    assert!(r.is_active());
    r.unregister(b).unwrap();

    assert!(!r.is_active());
    assert_eq!(r.host().live_regions(), Vec::<Space>::new());
    assert_eq!(r.host().removed().len(), 2);
    assert!(!r.gpu().is_live(font));
    assert_eq!(r.library().live_contexts(), 0);
}

#[test]
fn dropping_an_active_registry_tears_down() {
    let mut r = registry();
    r.register(|_: &mut HeadlessUi, _: &HeadlessDrawContext| {}, Space::View3d).unwrap();
    drop(r);
}

#[test]
fn ui_scale_and_pixel_scale_follow_the_region() {
    let mut r = registry();
    let seen = Rc::new(RefCell::new(0.0_f32));
    let sink = Rc::clone(&seen);
    r.register(move |ui: &mut HeadlessUi, _: &HeadlessDrawContext| {
        *sink.borrow_mut() = ui.input().font_global_scale;
        ui.rect(Rect::from_array([0.0, 0.0, 10.0, 10.0]), Color::WHITE);
    }, Space::View3d).unwrap();

    let mut ctx = HeadlessDrawContext::new(100.0, 50.0);
    ctx.ui_scale = 1.25;
    ctx.pixel_scale = Vec2::splat(2.0);
    r.gpu_mut().clear_calls();
    r.dispatch(Space::View3d, &ctx).unwrap();

    assert_relative_eq!(*seen.borrow(), 1.25);
    // Clip rect of the full display, scaled to a 200x100 framebuffer.
    assert!(r.gpu().calls().contains(&GpuCall::SetViewport(PixelRect::new(0, 0, 200, 100))));
    assert!(r.gpu().calls().contains(&GpuCall::SetScissor(PixelRect::new(0, 0, 200, 100))));
}

#[test]
fn registering_needs_the_gui_library() {
    let mut r: Registry = OverlayRegistry::new(
        HeadlessGui::unavailable(),
        RecordingHost::default(),
        RecordingGpu::default(),
        RegistryConfig::default(),
    );
    let mut names = OverlayNamespace::from_config(r.config());
    let typed = Rc::new(RefCell::new(String::new()));
    let err = register_overlay(&mut r, &mut names, TextBox { typed }, Space::View3d).unwrap_err();
    assert!(matches!(err, OverlayError::GuiUnavailable(_)));
    assert!(names.is_empty());
    assert!(!r.is_active());
}
