//! Modal operators that own an overlay and feed it the host's input events.

use std::marker::PhantomData;

use imoverlay_core::registry::UiOf;
use imoverlay_core::{
    translate, GpuDevice, GuiLibrary, HostEvent, OverlayError, OverlayHandle, OverlayRegistry, ViewportHost,
};

use crate::addon::Overlay;

/// Glue for a host modal operator: [`init`](Self::init) when the operator
/// starts, [`modal`](Self::modal) for every event it receives and
/// [`shutdown`](Self::shutdown) when it finishes.
#[derive(Debug)]
pub struct OverlayOperator<O> {
    handle: Option<OverlayHandle>,
    _overlay: PhantomData<fn() -> O>,
}

impl<O> Default for OverlayOperator<O> {
    fn default() -> Self { Self { handle: None, _overlay: PhantomData } }
}

impl<O> OverlayOperator<O> {
    pub fn new() -> Self { Self::default() }

    pub fn handle(&self) -> Option<OverlayHandle> { self.handle }
    pub fn is_running(&self) -> bool { self.handle.is_some() }

    /// Register `overlay` for `region`, replacing the overlay of a running
    /// operator.
    pub fn init<L, H, D>(
        &mut self,
        registry: &mut OverlayRegistry<L, H, D>,
        region: H::Region,
        mut overlay: O,
    ) -> Result<OverlayHandle, OverlayError>
    where
        L: GuiLibrary,
        H: ViewportHost,
        D: GpuDevice,
        O: Overlay<UiOf<L>, H::Context>,
    {
        let handle = registry.register(move |ui, ctx| overlay.draw(ui, ctx), region)?;
        self.shutdown(registry);
        self.handle = Some(handle);
        Ok(handle)
    }

    pub fn shutdown<L, H, D>(&mut self, registry: &mut OverlayRegistry<L, H, D>)
    where
        L: GuiLibrary,
        H: ViewportHost,
        D: GpuDevice,
    {
        if let Some(handle) = self.handle.take() {
            // Already gone if the registry was torn down underneath us.
            let _ = registry.unregister(handle);
        }
    }

    /// Forward a host event to the GUI input state. `region_height` is the
    /// height of the region the event happened in.
    ///
    /// Returns `false` when there is no live GUI context to feed.
    pub fn modal<L, H, D>(&self, registry: &mut OverlayRegistry<L, H, D>, event: &HostEvent, region_height: f32) -> bool
    where
        L: GuiLibrary,
        H: ViewportHost,
        D: GpuDevice,
    {
        match registry.input_mut() {
            Some(input) => {
                translate(input, event, region_height);
                true
            }
            None => false,
        }
    }
}
