//! Overlay registry – owns the GUI context and multiplexes overlays across
//! the host's viewport regions.
//!
//! The registry is either *uninitialized* (no context, no hooks, no overlays)
//! or *active* (context alive, at least one overlay). The first
//! [`register`](OverlayRegistry::register) activates it; the
//! [`unregister`](OverlayRegistry::unregister) that removes the last overlay
//! tears everything down again.
//!
//! Construct one registry per process and hand it to whoever needs it:
//!
//! ```rust
//! use imoverlay_core::headless::{HeadlessDrawContext, HeadlessGui, RecordingGpu, RecordingHost};
//! use imoverlay_core::{OverlayRegistry, RegistryConfig};
//!
//! let host: RecordingHost<&str> = RecordingHost::default();
//! let mut registry = OverlayRegistry::new(HeadlessGui::default(), host, RecordingGpu::default(), RegistryConfig::default());
//! let handle = registry.register(|_ui, _ctx| {}, "VIEW_3D").unwrap();
//! registry.dispatch("VIEW_3D", &HeadlessDrawContext::new(640.0, 480.0)).unwrap();
//! registry.unregister(handle).unwrap();
//! assert!(!registry.is_active());
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;

use ahash::RandomState;

use crate::config::{DrawPhase, HookPolicy, RegistryConfig};
use crate::error::OverlayError;
use crate::gpu::GpuDevice;
use crate::gui::{GuiContext, GuiLibrary};
use crate::input::InputState;
use crate::renderer::OverlayRenderer;
use crate::Vec2;

/// A HashMap with a fixed-seed ahash hasher — no TLS, no runtime RNG.
type FxMap<K, V> = HashMap<K, V, RandomState>;

fn new_fxmap<K, V>() -> FxMap<K, V> {
    HashMap::with_hasher(RandomState::with_seeds(0xdeadbeef, 0xcafebabe, 0x12345678, 0xabcdef01))
}

// ─── Host seams ──────────────────────────────────────────────────────────────

/// The host's per-region draw-hook API.
///
/// An installed hook must call [`OverlayRegistry::dispatch`] with its region
/// each time the host redraws that region.
pub trait ViewportHost {
    /// Class of display area, e.g. "3D viewport". Only used as a key.
    type Region: Copy + Eq + Hash + fmt::Debug;
    type Hook;
    /// What the host passes to draw hooks.
    type Context: DrawContext;

    fn install_draw_hook(&mut self, region: Self::Region, phase: DrawPhase) -> Self::Hook;
    fn remove_draw_hook(&mut self, hook: Self::Hook, region: Self::Region);
}

/// The host drawing context of the region being redrawn.
pub trait DrawContext {
    /// Logical size of the region.
    fn region_size(&self) -> Vec2;
    /// User interface scale preference.
    fn ui_scale(&self) -> f32 { 1.0 }
    /// Pixels per logical unit.
    fn pixel_scale(&self) -> Vec2 { Vec2::ONE }
}

// ─── Handles ─────────────────────────────────────────────────────────────────

/// Identifies one registered overlay. Never reused within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayHandle(pub u64);

impl fmt::Display for OverlayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

// ─── ContextGuard ────────────────────────────────────────────────────────────

/// Counts users of a shared resource. The resource should exist exactly
/// while the count is non-zero.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ContextGuard {
    count: usize,
}

impl ContextGuard {
    /// Returns `true` when this acquisition brought the resource to life.
    pub fn acquire(&mut self) -> bool {
        self.count += 1;
        self.count == 1
    }

    /// Returns `true` when this release dropped the last user.
    pub fn release(&mut self) -> bool {
        debug_assert!(self.count > 0, "ContextGuard released more often than acquired");
        self.count = self.count.saturating_sub(1);
        self.count == 0
    }

    pub fn count(&self) -> usize { self.count }
    pub fn is_held(&self) -> bool { self.count > 0 }
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// Per-frame UI builder of library `L`.
pub type UiOf<L> = <<L as GuiLibrary>::Context as GuiContext>::Ui;

/// An overlay's draw procedure.
pub type DrawCallback<U, C> = Box<dyn FnMut(&mut U, &C)>;

struct Registration<U, C, R> {
    callback: DrawCallback<U, C>,
    region:   R,
}

struct RegionHook<K> {
    hook:  K,
    users: ContextGuard,
}

/// Everything that only exists while the registry is active.
struct Live<G> {
    gui:      G,
    renderer: OverlayRenderer,
    input:    InputState,
}

pub struct OverlayRegistry<L: GuiLibrary, H: ViewportHost, D: GpuDevice> {
    config:  RegistryConfig,
    library: L,
    host:    H,
    gpu:     D,

    live:      Option<Live<L::Context>>,
    guard:     ContextGuard,
    hooks:     FxMap<H::Region, RegionHook<H::Hook>>,
    // Handles increase monotonically, so key order is registration order.
    callbacks: BTreeMap<OverlayHandle, Registration<UiOf<L>, H::Context, H::Region>>,
    next_handle: u64,
}

impl<L: GuiLibrary, H: ViewportHost, D: GpuDevice> OverlayRegistry<L, H, D> {
    pub fn new(library: L, host: H, gpu: D, config: RegistryConfig) -> Self {
        Self {
            config,
            library,
            host,
            gpu,
            live:        None,
            guard:       ContextGuard::default(),
            hooks:       new_fxmap(),
            callbacks:   BTreeMap::new(),
            next_handle: 0,
        }
    }

    // ── Configuration / collaborators ─────────────────────────────────────────

    pub fn config(&self) -> &RegistryConfig { &self.config }
    pub fn library(&self) -> &L { &self.library }
    pub fn host(&self) -> &H { &self.host }
    pub fn host_mut(&mut self) -> &mut H { &mut self.host }
    pub fn gpu(&self) -> &D { &self.gpu }
    pub fn gpu_mut(&mut self) -> &mut D { &mut self.gpu }

    // ── State ─────────────────────────────────────────────────────────────────

    /// `true` while a GUI context exists, i.e. while any overlay is registered.
    pub fn is_active(&self) -> bool { self.live.is_some() }
    pub fn len(&self) -> usize { self.callbacks.len() }
    pub fn is_empty(&self) -> bool { self.callbacks.is_empty() }
    pub fn contains(&self, handle: OverlayHandle) -> bool { self.callbacks.contains_key(&handle) }
    pub fn handles(&self) -> impl Iterator<Item = OverlayHandle> + '_ { self.callbacks.keys().copied() }

    /// Regions that currently hold a host draw hook.
    pub fn hooked_regions(&self) -> impl Iterator<Item = H::Region> + '_ { self.hooks.keys().copied() }

    /// Live input state; `None` while uninitialized.
    pub fn input(&self) -> Option<&InputState> { self.live.as_ref().map(|l| &l.input) }
    pub fn input_mut(&mut self) -> Option<&mut InputState> { self.live.as_mut().map(|l| &mut l.input) }

    /// Live GUI context, for styling and font setup.
    pub fn gui_mut(&mut self) -> Option<&mut L::Context> { self.live.as_mut().map(|l| &mut l.gui) }

    /// Re-upload the font atlas after fonts were changed through
    /// [`gui_mut`](Self::gui_mut).
    pub fn refresh_font_texture(&mut self) -> Result<(), OverlayError> {
        match self.live.as_mut() {
            Some(live) => live
                .renderer
                .refresh_font_texture(&mut self.gpu, &mut live.gui)
                .map_err(OverlayError::gpu),
            None => Ok(()),
        }
    }

    // ── Registration ──────────────────────────────────────────────────────────

    /// Add `callback` as an overlay of `region`; it runs on every redraw of
    /// that region with the frame's UI builder and the host context.
    ///
    /// Creates the GUI context on first use and the region's draw hook the
    /// first time the region is seen. Only fails when the context cannot be
    /// created.
    pub fn register<F>(&mut self, callback: F, region: H::Region) -> Result<OverlayHandle, OverlayError>
    where
        F: FnMut(&mut UiOf<L>, &H::Context) + 'static,
    {
        if self.live.is_none() {
            self.live = Some(self.activate()?);
        }
        self.guard.acquire();

        let phase = self.config.draw_phase;
        let host = &mut self.host;
        self.hooks
            .entry(region)
            .or_insert_with(|| {
                log::debug!("installing draw hook for {region:?} ({phase:?})");
                RegionHook { hook: host.install_draw_hook(region, phase), users: ContextGuard::default() }
            })
            .users
            .acquire();

        let handle = OverlayHandle(self.next_handle);
        self.next_handle += 1;
        self.callbacks.insert(handle, Registration { callback: Box::new(callback), region });
        log::debug!("overlay {handle} registered for {region:?}");
        Ok(handle)
    }

    /// Remove an overlay. An unknown handle is logged and changes nothing.
    pub fn unregister(&mut self, handle: OverlayHandle) -> Result<(), OverlayError> {
        let Some(reg) = self.callbacks.remove(&handle) else {
            log::error!("invalid overlay callback handle: {handle}");
            return Err(OverlayError::UnknownHandle(handle));
        };
        log::debug!("overlay {handle} unregistered from {:?}", reg.region);

        let region_empty = match self.hooks.get_mut(&reg.region) {
            Some(entry) => entry.users.release(),
            None => false,
        };
        if region_empty && self.config.hook_policy == HookPolicy::ReleaseWhenRegionEmpty {
            if let Some(entry) = self.hooks.remove(&reg.region) {
                log::debug!("removing draw hook for {:?}", reg.region);
                self.host.remove_draw_hook(entry.hook, reg.region);
            }
        }

        if self.guard.release() {
            self.shutdown();
        }
        Ok(())
    }

    // ── Frame ─────────────────────────────────────────────────────────────────

    /// Run one frame for `region`. Called by the region's draw hook.
    pub fn dispatch(&mut self, region: H::Region, ctx: &H::Context) -> Result<(), OverlayError> {
        let Some(live) = self.live.as_mut() else {
            log::trace!("dispatch for {region:?} while uninitialized");
            return Ok(());
        };

        live.input.display_size      = ctx.region_size();
        live.input.font_global_scale = ctx.ui_scale();
        live.input.framebuffer_scale = ctx.pixel_scale();
        live.gui.sync_input(&mut live.input);

        let ui = live.gui.new_frame();
        for reg in self.callbacks.values_mut().filter(|r| r.region == region) {
            (reg.callback)(ui, ctx);
        }
        let mut draw_data = live.gui.render();
        live.input.new_frame();

        log::trace!(
            "dispatch {region:?}: {} lists, {} vertices, {} indices",
            draw_data.cmd_lists.len(), draw_data.total_vtx_count(), draw_data.total_idx_count(),
        );
        live.renderer
            .render(&mut self.gpu, &mut draw_data)
            .map_err(OverlayError::gpu)
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    fn activate(&mut self) -> Result<Live<L::Context>, OverlayError> {
        let mut gui = self.library.create_context().map_err(|e| {
            log::error!("cannot create GUI context: {e}");
            e
        })?;
        let renderer = match OverlayRenderer::new(&mut self.gpu, &mut gui) {
            Ok(r) => r,
            Err(e) => {
                self.library.destroy_context(gui);
                return Err(OverlayError::gpu(e));
            }
        };
        let mut input = InputState::default();
        input.install_identity_key_map();
        log::info!("GUI context created");
        Ok(Live { gui, renderer, input })
    }

    fn shutdown(&mut self) {
        for (region, entry) in self.hooks.drain() {
            log::debug!("removing draw hook for {region:?}");
            self.host.remove_draw_hook(entry.hook, region);
        }
        if let Some(live) = self.live.take() {
            live.renderer.destroy(&mut self.gpu);
            self.library.destroy_context(live.gui);
        }
        log::info!("GUI context destroyed");
    }
}

impl<L: GuiLibrary, H: ViewportHost, D: GpuDevice> Drop for OverlayRegistry<L, H, D> {
    fn drop(&mut self) {
        if self.live.is_some() {
            self.callbacks.clear();
            self.shutdown();
        }
    }
}

impl<L: GuiLibrary, H: ViewportHost, D: GpuDevice> fmt::Debug for OverlayRegistry<L, H, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayRegistry")
            .field("active", &self.is_active())
            .field("overlays", &self.callbacks.keys().collect::<Vec<_>>())
            .field("regions", &self.hooks.keys().collect::<Vec<_>>())
            .field("next_handle", &self.next_handle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessDrawContext, HeadlessGui, HeadlessUi, RecordingGpu, RecordingHost};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Registry = OverlayRegistry<HeadlessGui, RecordingHost<&'static str>, RecordingGpu>;

    fn registry(policy: HookPolicy) -> Registry {
        OverlayRegistry::new(
            HeadlessGui::default(),
            RecordingHost::default(),
            RecordingGpu::default(),
            RegistryConfig::default().with_hook_policy(policy),
        )
    }

    fn noop(_: &mut HeadlessUi, _: &HeadlessDrawContext) {}

    fn assert_invariant(r: &Registry) {
        assert_eq!(r.is_active(), !r.is_empty());
        assert_eq!(r.library().live_contexts(), usize::from(r.is_active()));
    }

    #[test]
    fn guard_reports_first_acquire_and_last_release() {
        let mut g = ContextGuard::default();
        assert!(g.acquire());
        assert!(!g.acquire());
        assert!(!g.release());
        assert!(g.release());
        assert!(!g.is_held());
    }

    #[test]
    fn context_lives_exactly_while_overlays_exist() {
        let mut r = registry(HookPolicy::RetainUntilTeardown);
        assert_invariant(&r);
        let a = r.register(noop, "VIEW_3D").unwrap();
        assert_invariant(&r);
        let b = r.register(noop, "IMAGE_EDITOR").unwrap();
        let c = r.register(noop, "VIEW_3D").unwrap();
        assert_invariant(&r);
        for h in [b, a, c] {
            r.unregister(h).unwrap();
            assert_invariant(&r);
        }
        assert!(!r.is_active());
        assert_eq!(r.hooked_regions().count(), 0);
        assert_eq!(r.gpu().live_texture_count(), 0);
    }

    #[test]
    fn handles_increase_across_teardown() {
        let mut r = registry(HookPolicy::RetainUntilTeardown);
        let a = r.register(noop, "VIEW_3D").unwrap();
        let b = r.register(noop, "VIEW_3D").unwrap();
        r.unregister(a).unwrap();
        r.unregister(b).unwrap();
        assert!(!r.is_active());
        let c = r.register(noop, "VIEW_3D").unwrap();
        assert_eq!((a, b, c), (OverlayHandle(0), OverlayHandle(1), OverlayHandle(2)));
        assert_eq!(r.library().created, 2);
    }

    #[test]
    fn unknown_handle_changes_nothing() {
        let mut r = registry(HookPolicy::RetainUntilTeardown);
        let a = r.register(noop, "VIEW_3D").unwrap();
        let before = format!("{r:?}");
        let installs = r.host().install_count();

        let err = r.unregister(OverlayHandle(42)).unwrap_err();
        assert!(matches!(err, OverlayError::UnknownHandle(OverlayHandle(42))));
        assert_eq!(format!("{r:?}"), before);
        assert_eq!(r.host().install_count(), installs);

        r.unregister(a).unwrap();
        assert!(r.unregister(a).is_err());
        assert!(!r.is_active());
    }

    #[test]
    fn one_hook_per_region() {
        let mut r = registry(HookPolicy::RetainUntilTeardown);
        r.register(noop, "VIEW_3D").unwrap();
        r.register(noop, "VIEW_3D").unwrap();
        r.register(noop, "NODE_EDITOR").unwrap();
        assert_eq!(r.host().live_regions(), vec!["VIEW_3D", "NODE_EDITOR"]);
        assert_eq!(r.host().phase_of("VIEW_3D"), Some(DrawPhase::PostPixel));
    }

    #[test]
    fn retained_hook_survives_its_last_overlay() {
        let mut r = registry(HookPolicy::RetainUntilTeardown);
        let a = r.register(noop, "VIEW_3D").unwrap();
        let _b = r.register(noop, "NODE_EDITOR").unwrap();
        r.unregister(a).unwrap();
        assert_eq!(r.host().live_regions(), vec!["VIEW_3D", "NODE_EDITOR"]);
        assert!(r.host().removed().is_empty());

        // Re-registering reuses the retained hook.
        r.register(noop, "VIEW_3D").unwrap();
        assert_eq!(r.host().install_count(), 2);
    }

    #[test]
    fn released_hook_goes_with_its_last_overlay() {
        let mut r = registry(HookPolicy::ReleaseWhenRegionEmpty);
        let a = r.register(noop, "VIEW_3D").unwrap();
        let b = r.register(noop, "VIEW_3D").unwrap();
        let _c = r.register(noop, "NODE_EDITOR").unwrap();
        r.unregister(a).unwrap();
        assert_eq!(r.host().live_regions(), vec!["VIEW_3D", "NODE_EDITOR"]);
        r.unregister(b).unwrap();
        assert_eq!(r.host().live_regions(), vec!["NODE_EDITOR"]);
        assert!(r.is_active());
    }

    #[test]
    fn dispatch_runs_matching_callbacks_in_registration_order() {
        let mut r = registry(HookPolicy::RetainUntilTeardown);
        let seen = Rc::new(RefCell::new(Vec::new()));
        for (name, region) in [("first", "VIEW_3D"), ("other", "NODE_EDITOR"), ("second", "VIEW_3D")] {
            let seen = Rc::clone(&seen);
            r.register(move |_ui: &mut HeadlessUi, ctx: &HeadlessDrawContext| {
                seen.borrow_mut().push((name, ctx.region_size));
            }, region).unwrap();
        }

        let ctx = HeadlessDrawContext::new(320.0, 200.0);
        r.dispatch("VIEW_3D", &ctx).unwrap();
        assert_eq!(*seen.borrow(), vec![("first", ctx.region_size), ("second", ctx.region_size)]);
    }

    #[test]
    fn dispatch_feeds_display_size_and_scale() {
        let mut r = registry(HookPolicy::RetainUntilTeardown);
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        r.register(move |ui: &mut HeadlessUi, _: &HeadlessDrawContext| {
            *sink.borrow_mut() = Some((ui.display_size(), ui.input().font_global_scale));
        }, "VIEW_3D").unwrap();

        let mut ctx = HeadlessDrawContext::new(800.0, 600.0);
        ctx.ui_scale = 1.5;
        r.dispatch("VIEW_3D", &ctx).unwrap();
        assert_eq!(*seen.borrow(), Some((Vec2::new(800.0, 600.0), 1.5)));
    }

    #[test]
    fn dispatch_draws_what_callbacks_emit() {
        let mut r = registry(HookPolicy::RetainUntilTeardown);
        r.register(|ui: &mut HeadlessUi, _: &HeadlessDrawContext| {
            ui.triangle(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(0.0, 10.0), crate::Color::WHITE);
        }, "VIEW_3D").unwrap();
        r.gpu_mut().clear_calls();
        r.dispatch("VIEW_3D", &HeadlessDrawContext::new(100.0, 100.0)).unwrap();
        assert_eq!(r.gpu().draw_count(), 1);

        // Nothing registered for this region: no draw.
        r.gpu_mut().clear_calls();
        r.dispatch("NODE_EDITOR", &HeadlessDrawContext::new(100.0, 100.0)).unwrap();
        assert_eq!(r.gpu().draw_count(), 0);
    }

    #[test]
    fn dispatch_while_uninitialized_is_a_no_op() {
        let mut r = registry(HookPolicy::RetainUntilTeardown);
        r.dispatch("VIEW_3D", &HeadlessDrawContext::new(100.0, 100.0)).unwrap();
        assert!(r.gpu().calls().is_empty());
    }

    #[test]
    fn missing_gui_library_fails_register_without_state_change() {
        let mut r: Registry = OverlayRegistry::new(
            HeadlessGui::unavailable(),
            RecordingHost::default(),
            RecordingGpu::default(),
            RegistryConfig::default(),
        );
        assert!(matches!(r.register(noop, "VIEW_3D"), Err(OverlayError::GuiUnavailable(_))));
        assert!(!r.is_active());
        assert_eq!(r.host().install_count(), 0);
    }

    #[test]
    fn key_map_is_installed_on_activation() {
        let mut r = registry(HookPolicy::RetainUntilTeardown);
        assert!(r.input().is_none());
        r.register(noop, "VIEW_3D").unwrap();
        let input = r.input().unwrap();
        assert_eq!(input.mapped_slot(crate::Key::Escape), Some(crate::Key::Escape as usize));
    }
}
