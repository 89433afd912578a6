//! OS share sheet destination.

use std::path::PathBuf;

use super::launcher::HostLauncher;
use super::{
    DestinationCandidate, DestinationExporter, DestinationProvider, Feasibility, ProbeContext,
    ProbeError,
};
use crate::capture::CaptureDetails;
use crate::destinations::{Destination, DestinationError, ExportInformation};
use crate::registry::{CapabilityRegistry, Import, Injectable, LAUNCHER, RegistryResult};

/// Designation of the share destination.
pub const DESIGNATION: &str = "Share";

/// Desktop helper used when none is configured.
const DEFAULT_HELPER: &str = if cfg!(target_os = "macos") { "open" } else { "xdg-open" };

/// Hands captures to the desktop's share/open helper.
#[derive(Debug)]
pub struct ShareDestination {
    helper: PathBuf,
    launcher: Import<dyn HostLauncher>,
}

impl ShareDestination {
    #[must_use]
    pub const fn new(helper: PathBuf) -> Self { Self { helper, launcher: Import::new(LAUNCHER) } }
}

impl Destination for ShareDestination {
    fn designation(&self) -> &'static str { DESIGNATION }

    fn description(&self) -> String { "Share with another application".to_string() }

    fn export(&self, capture: &CaptureDetails) -> Result<ExportInformation, DestinationError> {
        let args = [capture.path.as_os_str().to_owned()];
        self.launcher.get()?.launch(&self.helper, &args).map_err(|source| DestinationError::Launch {
            program: self.helper.display().to_string(),
            source,
        })?;
        Ok(ExportInformation::handed_off(DESIGNATION))
    }
}

impl Injectable for ShareDestination {
    fn inject(&mut self, registry: &CapabilityRegistry) -> RegistryResult<()> {
        let launcher = self.launcher.resolve(registry)?;
        self.launcher.fill(launcher);
        Ok(())
    }
}

struct ShareCandidate;

impl DestinationCandidate for ShareCandidate {
    fn designation(&self) -> &'static str { DESIGNATION }

    fn probe(&self, ctx: &ProbeContext) -> Result<Feasibility, ProbeError> {
        let share = &ctx.settings().share;
        if !share.enabled {
            return Ok(Feasibility::Infeasible("Share disabled".to_string()));
        }

        let helpers =
            if share.helpers.is_empty() { vec![DEFAULT_HELPER.to_string()] } else { share.helpers.clone() };
        let helper = ctx
            .launcher()
            .locate(&helpers)
            .ok_or_else(|| ProbeError::Unavailable(format!("Share disabled: no {helpers:?} found")))?;
        Ok(Feasibility::Feasible { target: Some(helper) })
    }

    fn construct(&self, target: Option<PathBuf>) -> Result<Box<dyn DestinationProvider>, ProbeError> {
        let helper = target.ok_or_else(|| ProbeError::Unavailable("no share helper".to_string()))?;
        Ok(Box::new(ShareDestination::new(helper)))
    }
}

/// Builds the share exporter.
#[must_use]
pub fn exporter() -> DestinationExporter { DestinationExporter::new("share").candidate(ShareCandidate) }
