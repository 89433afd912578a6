//! Destination addons.
//!
//! Each addon is a [`DestinationExporter`]: a lifecycle unit holding an
//! ordered list of [`DestinationCandidate`]s. At startup the exporter probes
//! every candidate once, constructs the feasible ones, fills their imports,
//! and exports them under the `Destination` capability.
//!
//! A candidate that errors or panics while probing or constructing counts as
//! infeasible and is skipped. A missing dependency while filling imports is a
//! bootstrap defect and fails the exporter without exporting anything.
//!
//! - [`launcher`] - Host application lookup and launching
//! - [`office`] - Word, Excel, Outlook, PowerPoint and OneNote
//! - [`share`] - OS share sheet
//! - [`cloud`] - Upload through a synchronized folder

pub mod cloud;
pub mod launcher;
pub mod office;
pub mod share;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use self::launcher::HostLauncher;
use crate::config::{ConfigProvider, GlintConfig};
use crate::core::constants::startup_order;
use crate::destinations::Destination;
use crate::registry::{
    CONFIGURATION, CapabilityRegistry, DESTINATION, Injectable, LAUNCHER, RegistryResult,
};
use crate::services::guard::catch_panic;
use crate::services::{AppContext, LifecycleUnit, ModuleResult};

/// Errors raised while probing or constructing a candidate.
///
/// Always contained by the exporter; they only make a candidate infeasible.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The host environment lacks something the candidate needs.
    #[error("{0}")]
    Unavailable(String),

    /// IO error while inspecting the environment.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Outcome of a feasibility probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feasibility {
    /// The candidate can be used. `target` is the host executable or folder
    /// the probe found, handed to the constructor.
    Feasible { target: Option<PathBuf> },
    /// The candidate cannot be used, for the given reason.
    Infeasible(String),
}

/// What candidates may inspect while probing.
#[derive(Clone)]
pub struct ProbeContext {
    config: Arc<dyn ConfigProvider>,
    launcher: Arc<dyn HostLauncher>,
}

impl ProbeContext {
    /// Creates a probe context from explicit collaborators.
    #[must_use]
    pub fn new(config: Arc<dyn ConfigProvider>, launcher: Arc<dyn HostLauncher>) -> Self {
        Self { config, launcher }
    }

    /// Resolves the probe dependencies from `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::registry::RegistryError::Unresolved`] naming the
    /// first missing capability.
    pub fn resolve(registry: &CapabilityRegistry) -> RegistryResult<Self> {
        let config = registry.resolve_one(CONFIGURATION)?;
        let launcher = registry.resolve_one(LAUNCHER)?;
        Ok(Self::new(config, launcher))
    }

    /// Typed settings.
    #[must_use]
    pub fn settings(&self) -> &GlintConfig { self.config.settings() }

    /// Host application launcher.
    #[must_use]
    pub fn launcher(&self) -> &dyn HostLauncher { self.launcher.as_ref() }
}

impl fmt::Debug for ProbeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeContext").finish_non_exhaustive()
    }
}

/// A constructed destination whose imports still need filling.
pub trait DestinationProvider: Destination + Injectable {
    /// Converts into the shared form stored in the registry.
    fn into_destination(self: Box<Self>) -> Arc<dyn Destination>;
}

impl<T: Destination + Injectable + 'static> DestinationProvider for T {
    fn into_destination(self: Box<Self>) -> Arc<dyn Destination> {
        Arc::from(self as Box<dyn Destination>)
    }
}

/// A destination an addon may contribute.
pub trait DestinationCandidate: Send {
    /// Designation of the destination this candidate builds.
    fn designation(&self) -> &'static str;

    /// Decides whether the destination can be offered on this machine.
    ///
    /// # Errors
    ///
    /// An error is treated the same as [`Feasibility::Infeasible`].
    fn probe(&self, ctx: &ProbeContext) -> Result<Feasibility, ProbeError>;

    /// Builds the destination. Only called after a feasible probe.
    ///
    /// # Errors
    ///
    /// An error is treated the same as [`Feasibility::Infeasible`].
    fn construct(&self, target: Option<PathBuf>) -> Result<Box<dyn DestinationProvider>, ProbeError>;
}

/// Lifecycle unit that exports the feasible destinations of one addon.
pub struct DestinationExporter {
    name: &'static str,
    order: i32,
    candidates: Vec<Box<dyn DestinationCandidate>>,
    exported: Vec<&'static str>,
}

impl DestinationExporter {
    /// Creates an exporter in the addon startup tier.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self { name, order: startup_order::ADDON, candidates: Vec::new(), exported: Vec::new() }
    }

    /// Overrides the startup tier.
    #[must_use]
    pub const fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Appends a candidate. Candidates are exported in the order added.
    #[must_use]
    pub fn candidate(mut self, candidate: impl DestinationCandidate + 'static) -> Self {
        self.candidates.push(Box::new(candidate));
        self
    }

    /// Designations exported by the last successful start.
    #[must_use]
    pub fn exported(&self) -> &[&'static str] { &self.exported }

    /// Probes and constructs one candidate, containing every failure.
    fn evaluate(
        &self,
        candidate: &dyn DestinationCandidate,
        ctx: &ProbeContext,
    ) -> Option<Box<dyn DestinationProvider>> {
        let designation = candidate.designation();

        let target = match catch_panic(|| candidate.probe(ctx)) {
            Ok(Ok(Feasibility::Feasible { target })) => target,
            Ok(Ok(Feasibility::Infeasible(reason))) => {
                tracing::info!(exporter = self.name, destination = designation, %reason, "destination not available");
                return None;
            }
            Ok(Err(err)) => {
                tracing::info!(exporter = self.name, destination = designation, error = %err, "probe failed; destination disabled");
                return None;
            }
            Err(panic) => {
                tracing::info!(exporter = self.name, destination = designation, %panic, "probe panicked; destination disabled");
                return None;
            }
        };

        match catch_panic(|| candidate.construct(target)) {
            Ok(Ok(provider)) => Some(provider),
            Ok(Err(err)) => {
                tracing::info!(exporter = self.name, destination = designation, error = %err, "construction failed; destination disabled");
                None
            }
            Err(panic) => {
                tracing::info!(exporter = self.name, destination = designation, %panic, "construction panicked; destination disabled");
                None
            }
        }
    }
}

impl fmt::Debug for DestinationExporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let candidates: Vec<_> = self.candidates.iter().map(|candidate| candidate.designation()).collect();
        f.debug_struct("DestinationExporter")
            .field("name", &self.name)
            .field("order", &self.order)
            .field("candidates", &candidates)
            .field("exported", &self.exported)
            .finish()
    }
}

impl LifecycleUnit for DestinationExporter {
    fn name(&self) -> &'static str { self.name }

    fn order(&self) -> i32 { self.order }

    fn start(&mut self, ctx: &AppContext) -> ModuleResult<()> {
        let registry = ctx.registry();
        let probe_ctx = ProbeContext::resolve(registry)?;

        let mut ready: Vec<(&'static str, Box<dyn DestinationProvider>)> = Vec::new();
        for candidate in &self.candidates {
            if let Some(provider) = self.evaluate(candidate.as_ref(), &probe_ctx) {
                ready.push((candidate.designation(), provider));
            }
        }

        // Every provider is wired before any is exported.
        for (_, provider) in &mut ready {
            registry.fill_imports(&mut **provider)?;
        }

        self.exported.clear();
        for (designation, provider) in ready {
            registry.export(DESTINATION, provider.into_destination());
            self.exported.push(designation);
        }

        tracing::info!(exporter = self.name, exported = ?self.exported, "destinations exported");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::testing::{FakeLauncher, context};
    use super::*;
    use crate::capture::CaptureDetails;
    use crate::destinations::{DestinationError, ExportInformation};
    use crate::registry::{Import, RegistryError};
    use crate::services::ModuleError;

    struct Probe {
        designation: &'static str,
        outcome: fn() -> Result<Feasibility, ProbeError>,
        constructed: Arc<AtomicUsize>,
    }

    impl Probe {
        fn new(designation: &'static str, outcome: fn() -> Result<Feasibility, ProbeError>) -> Self {
            Self { designation, outcome, constructed: Arc::new(AtomicUsize::new(0)) }
        }
    }

    struct Plain {
        designation: &'static str,
        launcher: Import<dyn HostLauncher>,
    }

    impl Destination for Plain {
        fn designation(&self) -> &'static str { self.designation }

        fn description(&self) -> String { self.designation.to_string() }

        fn export(&self, _capture: &CaptureDetails) -> Result<ExportInformation, DestinationError> {
            self.launcher.get()?;
            Ok(ExportInformation::handed_off(self.designation))
        }
    }

    impl Injectable for Plain {
        fn inject(&mut self, registry: &CapabilityRegistry) -> RegistryResult<()> {
            let launcher = self.launcher.resolve(registry)?;
            self.launcher.fill(launcher);
            Ok(())
        }
    }

    impl DestinationCandidate for Probe {
        fn designation(&self) -> &'static str { self.designation }

        fn probe(&self, _ctx: &ProbeContext) -> Result<Feasibility, ProbeError> { (self.outcome)() }

        fn construct(&self, _target: Option<PathBuf>) -> Result<Box<dyn DestinationProvider>, ProbeError> {
            self.constructed.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(Plain { designation: self.designation, launcher: Import::new(LAUNCHER) }))
        }
    }

    fn feasible() -> Result<Feasibility, ProbeError> { Ok(Feasibility::Feasible { target: None }) }

    fn infeasible() -> Result<Feasibility, ProbeError> {
        Ok(Feasibility::Infeasible("not installed".to_string()))
    }

    fn failing() -> Result<Feasibility, ProbeError> {
        Err(ProbeError::Unavailable("activation factory missing".to_string()))
    }

    fn panicking() -> Result<Feasibility, ProbeError> { panic!("probe exploded") }

    fn designations(ctx: &AppContext) -> Vec<&'static str> {
        ctx.registry().resolve(DESTINATION).iter().map(|destination| destination.designation()).collect()
    }

    #[test]
    fn test_feasible_candidates_export_in_order() {
        let ctx = context(FakeLauncher::new());
        let mut exporter = DestinationExporter::new("office")
            .candidate(Probe::new("Word", feasible))
            .candidate(Probe::new("Excel", feasible))
            .candidate(Probe::new("Outlook", feasible));

        exporter.start(&ctx).unwrap();
        assert_eq!(designations(&ctx), vec!["Word", "Excel", "Outlook"]);
        assert_eq!(exporter.exported(), &["Word", "Excel", "Outlook"]);
    }

    #[test]
    fn test_infeasible_candidate_is_never_constructed() {
        let ctx = context(FakeLauncher::new());
        let skipped = Probe::new("Share", infeasible);
        let constructed = Arc::clone(&skipped.constructed);

        let mut exporter = DestinationExporter::new("share").candidate(skipped);
        exporter.start(&ctx).unwrap();

        assert_eq!(constructed.load(Ordering::SeqCst), 0);
        assert!(designations(&ctx).is_empty());
    }

    #[test]
    fn test_probe_errors_and_panics_are_contained() {
        let ctx = context(FakeLauncher::new());
        let mut exporter = DestinationExporter::new("mixed")
            .candidate(Probe::new("Failing", failing))
            .candidate(Probe::new("Panicking", panicking))
            .candidate(Probe::new("Working", feasible));

        exporter.start(&ctx).unwrap();
        assert_eq!(designations(&ctx), vec!["Working"]);
    }

    #[test]
    fn test_missing_probe_dependency_propagates() {
        let ctx = context(FakeLauncher::new());
        let bare = AppContext::new(Arc::new(CapabilityRegistry::new()), ctx.ui().clone());
        let mut exporter = DestinationExporter::new("office").candidate(Probe::new("Word", feasible));

        let err = exporter.start(&bare).unwrap_err();
        assert!(matches!(
            err,
            ModuleError::Resolution(RegistryError::Unresolved { capability: "Configuration" })
        ));
    }

    #[test]
    fn test_missing_import_exports_nothing() {
        struct NeedsCapture;

        impl DestinationCandidate for NeedsCapture {
            fn designation(&self) -> &'static str { "Needy" }

            fn probe(&self, _ctx: &ProbeContext) -> Result<Feasibility, ProbeError> { feasible() }

            fn construct(&self, _target: Option<PathBuf>) -> Result<Box<dyn DestinationProvider>, ProbeError> {
                Ok(Box::new(Needy { capture: Import::new(crate::registry::CAPTURE) }))
            }
        }

        struct Needy {
            capture: Import<dyn crate::capture::CaptureService>,
        }

        impl Destination for Needy {
            fn designation(&self) -> &'static str { "Needy" }

            fn description(&self) -> String { String::new() }

            fn export(&self, _capture: &CaptureDetails) -> Result<ExportInformation, DestinationError> {
                self.capture.get()?;
                Ok(ExportInformation::handed_off("Needy"))
            }
        }

        impl Injectable for Needy {
            fn inject(&mut self, registry: &CapabilityRegistry) -> RegistryResult<()> {
                let capture = self.capture.resolve(registry)?;
                self.capture.fill(capture);
                Ok(())
            }
        }

        let ctx = context(FakeLauncher::new());
        let mut exporter = DestinationExporter::new("mixed")
            .candidate(Probe::new("Word", feasible))
            .candidate(NeedsCapture);

        let err = exporter.start(&ctx).unwrap_err();
        assert!(matches!(
            err,
            ModuleError::Resolution(RegistryError::Unresolved { capability: "Capture" })
        ));
        assert!(designations(&ctx).is_empty());
        assert!(exporter.exported().is_empty());
    }

    #[test]
    fn test_exported_provider_is_wired() {
        let ctx = context(FakeLauncher::new());
        let mut exporter = DestinationExporter::new("plain").candidate(Probe::new("Word", feasible));
        exporter.start(&ctx).unwrap();

        let destination = ctx.registry().resolve_one(DESTINATION).unwrap();
        let details = CaptureDetails::from_file(std::path::Path::new("/tmp/x.png"));
        assert!(destination.export(&details).is_ok());
    }
}
