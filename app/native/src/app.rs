//! Application bootstrap.
//!
//! [`Application`] wires the registry, the lifecycle units and the UI queue
//! together. The entry point builds it once, starts it, and then turns the
//! calling thread into the UI thread with [`Application::run`].

use std::path::PathBuf;
use std::sync::Arc;

use crate::addons::launcher::{HostLauncher, SystemLauncher};
use crate::addons::{cloud, office, share};
use crate::capture::{CaptureHelper, CaptureService, CommandCapture};
use crate::config::{ConfigProvider, GlintConfig, StaticConfig};
use crate::core::prelude::*;
use crate::platform::ipc::{
    ControlContract, ControlRequest, ControlServer, EndpointIdentity, invoke,
};
use crate::registry::{CAPTURE, CONFIGURATION, LAUNCHER};
use crate::services::{Orchestrator, StartupReport, UnitFailure, UnitState};
use crate::ui::{self, LoopExit, UiLoop};

/// What a launch was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Start, or make sure an instance is running.
    Run,
    /// Load image files as captures.
    OpenFiles(Vec<PathBuf>),
    /// Capture the whole screen.
    Capture { include_cursor: bool },
    /// Stop the running instance.
    Exit,
}

impl Intent {
    /// The control requests that carry out this intent, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<ControlRequest> {
        match self {
            Self::Run => Vec::new(),
            Self::OpenFiles(paths) => {
                paths.iter().map(|path| ControlRequest::OpenFile { path: path.clone() }).collect()
            }
            Self::Capture { include_cursor } => {
                vec![ControlRequest::CaptureScreen { include_cursor: *include_cursor }]
            }
            Self::Exit => vec![ControlRequest::Exit],
        }
    }
}

/// The running application.
pub struct Application {
    identity: EndpointIdentity,
    context: AppContext,
    orchestrator: Orchestrator,
    ui_loop: Option<UiLoop>,
}

impl Application {
    /// Builds the application with the standard providers and units.
    ///
    /// The registry starts out with the configuration, the host launcher and
    /// the capture service. The office, share and cloud exporters run in the
    /// addon tier; the control server follows unless disabled.
    #[must_use]
    pub fn bootstrap(config: GlintConfig, identity: EndpointIdentity) -> Self {
        let registry = Arc::new(CapabilityRegistry::new());

        let capture: Arc<dyn CaptureService> = Arc::new(CommandCapture::from_config(&config));
        let launcher: Arc<dyn HostLauncher> = Arc::new(SystemLauncher::new());
        let server_enabled = config.server.enabled;
        let settings: Arc<dyn ConfigProvider> = Arc::new(StaticConfig::new(config));
        registry.export(CONFIGURATION, settings);
        registry.export(LAUNCHER, launcher);
        registry.export(CAPTURE, capture);

        let mut orchestrator = Orchestrator::new();
        orchestrator
            .register(Box::new(office::exporter()))
            .register(Box::new(share::exporter()))
            .register(Box::new(cloud::exporter()));
        if server_enabled {
            orchestrator.register(Box::new(ControlServer::new(identity.clone())));
        } else {
            tracing::info!("control server disabled in configuration");
        }

        Self::from_parts(registry, orchestrator, identity)
    }

    /// Builds the application around an existing registry and unit list.
    #[must_use]
    pub fn from_parts(
        registry: Arc<CapabilityRegistry>,
        orchestrator: Orchestrator,
        identity: EndpointIdentity,
    ) -> Self {
        let (dispatcher, ui_loop) = ui::channel();
        Self {
            identity,
            context: AppContext::new(registry, dispatcher),
            orchestrator,
            ui_loop: Some(ui_loop),
        }
    }

    /// Starts every unit in order.
    pub fn start(&mut self) -> StartupReport {
        let report = self.orchestrator.run_startup(&self.context);
        tracing::info!(
            started = ?report.started(),
            failures = report.failures().len(),
            capabilities = ?self.context.registry().capabilities(),
            "startup finished"
        );
        report
    }

    /// Queues the work `intent` asks for on this instance's UI thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the UI loop is gone.
    pub fn dispatch(&self, intent: &Intent) -> Result<()> {
        let contract = ControlContract::new(self.context.ui().clone());
        for request in intent.requests() {
            invoke(&contract, &request)?;
        }
        Ok(())
    }

    /// Runs the UI loop on the calling thread until exit, then shuts down.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop was already taken or the capture
    /// subsystem is not registered.
    pub fn run(mut self) -> Result<LoopExit> {
        let ui_loop = self.ui_loop.take().ok_or_else(|| Error::other("UI loop already taken"))?;
        let mut helper = CaptureHelper::from_registry(self.context.registry_handle())?;

        let exit = ui_loop.run(&mut helper);
        self.shutdown();
        Ok(exit)
    }

    /// Shuts down every started unit in reverse start order.
    pub fn shutdown(&mut self) -> Vec<UnitFailure> {
        let failures = self.orchestrator.run_shutdown();
        for failure in &failures {
            tracing::warn!(%failure, "unit did not shut down cleanly");
        }
        failures
    }

    /// Removes the UI loop so the caller can drive it.
    pub fn take_ui_loop(&mut self) -> Option<UiLoop> { self.ui_loop.take() }

    /// The context handed to units.
    #[must_use]
    pub const fn context(&self) -> &AppContext { &self.context }

    /// The capability registry.
    #[must_use]
    pub fn registry(&self) -> &CapabilityRegistry { self.context.registry() }

    /// The control endpoint identity.
    #[must_use]
    pub const fn identity(&self) -> &EndpointIdentity { &self.identity }

    /// Lifecycle state of the unit called `name`.
    #[must_use]
    pub fn state_of(&self, name: &str) -> Option<UnitState> { self.orchestrator.state_of(name) }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("identity", &self.identity)
            .field("orchestrator", &self.orchestrator)
            .finish_non_exhaustive()
    }
}
