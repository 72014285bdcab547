//! Addon-level registration: overlays identified by a string ID instead of a
//! handle the caller has to keep around.

use std::collections::BTreeMap;

use imoverlay_core::registry::UiOf;
use imoverlay_core::{
    GpuDevice, GuiLibrary, OverlayError, OverlayHandle, OverlayRegistry, RegistryConfig, ViewportHost,
};

/// A self-contained overlay with a unique identifier.
pub trait Overlay<U, C>: 'static {
    const ID: &'static str;

    fn draw(&mut self, ui: &mut U, ctx: &C);
}

/// Handles of overlays registered through [`register_overlay`], keyed by
/// `prefix + ID`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayNamespace {
    prefix:  String,
    handles: BTreeMap<String, OverlayHandle>,
}

impl OverlayNamespace {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), handles: BTreeMap::new() }
    }

    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::new(config.namespace_prefix.clone())
    }

    pub fn key(&self, id: &str) -> String {
        format!("{}{}", self.prefix, id)
    }

    pub fn get(&self, id: &str) -> Option<OverlayHandle> {
        self.handles.get(&self.key(id)).copied()
    }

    pub fn len(&self) -> usize { self.handles.len() }
    pub fn is_empty(&self) -> bool { self.handles.is_empty() }
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ { self.handles.keys().map(String::as_str) }
}

/// Register `overlay` for `region` and remember its handle under `O::ID`.
///
/// An overlay already registered under the same ID is replaced.
pub fn register_overlay<O, L, H, D>(
    registry: &mut OverlayRegistry<L, H, D>,
    names:    &mut OverlayNamespace,
    mut overlay: O,
    region:   H::Region,
) -> Result<OverlayHandle, OverlayError>
where
    L: GuiLibrary,
    H: ViewportHost,
    D: GpuDevice,
    O: Overlay<UiOf<L>, H::Context>,
{
    let key = names.key(O::ID);
    // The new overlay goes in before the old one leaves so the GUI context
    // survives the swap.
    let handle = registry.register(move |ui, ctx| overlay.draw(ui, ctx), region)?;
    if let Some(old) = names.handles.insert(key, handle) {
        log::debug!("{} registered twice, replacing overlay {old}", names.key(O::ID));
        let _ = registry.unregister(old);
    }
    Ok(handle)
}

/// Unregister the overlay stored under `O::ID`. Returns `false`, and does
/// nothing else, when no such overlay is registered.
pub fn unregister_overlay<O, L, H, D>(registry: &mut OverlayRegistry<L, H, D>, names: &mut OverlayNamespace) -> bool
where
    L: GuiLibrary,
    H: ViewportHost,
    D: GpuDevice,
    O: Overlay<UiOf<L>, H::Context>,
{
    let key = names.key(O::ID);
    match names.handles.remove(&key) {
        Some(handle) => registry.unregister(handle).is_ok(),
        None => {
            log::debug!("{key} is not registered");
            false
        }
    }
}
