//! Explicit context handed to lifecycle units.

use std::sync::Arc;

use crate::registry::CapabilityRegistry;
use crate::ui::UiDispatcher;

/// Everything a lifecycle unit may reach during start.
///
/// Built once by the application entry point and borrowed by the orchestrator.
#[derive(Debug, Clone)]
pub struct AppContext {
    registry: Arc<CapabilityRegistry>,
    ui: UiDispatcher,
}

impl AppContext {
    /// Creates a context around a registry and the UI hand-off queue.
    #[must_use]
    pub const fn new(registry: Arc<CapabilityRegistry>, ui: UiDispatcher) -> Self {
        Self { registry, ui }
    }

    /// The capability registry.
    #[must_use]
    pub fn registry(&self) -> &CapabilityRegistry { &self.registry }

    /// A shared handle to the capability registry.
    #[must_use]
    pub fn registry_handle(&self) -> Arc<CapabilityRegistry> { Arc::clone(&self.registry) }

    /// The queue feeding the UI-owning thread.
    #[must_use]
    pub const fn ui(&self) -> &UiDispatcher { &self.ui }
}
