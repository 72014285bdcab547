//! Registry configuration.

/// Point in the host's region redraw at which overlay hooks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DrawPhase {
    /// After scene content, in view space.
    PostView,
    /// After everything else, in pixel space.
    #[default]
    PostPixel,
}

/// What happens to a region's draw hook when its last overlay goes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HookPolicy {
    /// Keep it installed until the whole registry empties.
    #[default]
    RetainUntilTeardown,
    /// Remove it as soon as its region has no overlay left.
    ReleaseWhenRegionEmpty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    pub hook_policy:      HookPolicy,
    pub draw_phase:       DrawPhase,
    /// Prefix for keys in an overlay handle namespace.
    pub namespace_prefix: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            hook_policy:      HookPolicy::default(),
            draw_phase:       DrawPhase::default(),
            namespace_prefix: "_imgui_".to_owned(),
        }
    }
}

impl RegistryConfig {
    pub fn with_hook_policy(mut self, policy: HookPolicy) -> Self {
        self.hook_policy = policy;
        self
    }

    pub fn with_draw_phase(mut self, phase: DrawPhase) -> Self {
        self.draw_phase = phase;
        self
    }

    pub fn with_namespace_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.namespace_prefix = prefix.into();
        self
    }
}
