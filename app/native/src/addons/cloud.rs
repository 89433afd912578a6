//! Cloud upload through a locally synchronized folder.
//!
//! The capture is copied into the folder a sync client watches; the client
//! does the actual upload. When `cloud.publicUrl` is set, the export reports
//! the link the file will be reachable under.

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::{
    DestinationCandidate, DestinationExporter, DestinationProvider, Feasibility, ProbeContext,
    ProbeError,
};
use crate::capture::CaptureDetails;
use crate::config::ConfigProvider;
use crate::destinations::{Destination, DestinationError, ExportInformation};
use crate::registry::{CONFIGURATION, CapabilityRegistry, Import, Injectable, RegistryResult};

/// Designation of the cloud destination.
pub const DESIGNATION: &str = "Cloud";

/// Copies captures into the sync folder.
#[derive(Debug)]
pub struct CloudDestination {
    folder: PathBuf,
    config: Import<dyn ConfigProvider>,
}

impl CloudDestination {
    #[must_use]
    pub const fn new(folder: PathBuf) -> Self { Self { folder, config: Import::new(CONFIGURATION) } }

    /// Picks a file name in the sync folder that does not overwrite an earlier upload.
    fn target_for(&self, source: &Path) -> PathBuf {
        let name = source.file_name().map_or_else(|| "capture.png".into(), |name| name.to_os_string());
        let target = self.folder.join(&name);
        if !target.exists() {
            return target;
        }

        let stem = source.file_stem().map_or_else(|| "capture".into(), |stem| stem.to_string_lossy());
        let extension = source.extension().map_or_else(|| "png".into(), |ext| ext.to_string_lossy());
        self.folder.join(format!("{stem}-{}.{extension}", Uuid::now_v7().simple()))
    }
}

impl Destination for CloudDestination {
    fn designation(&self) -> &'static str { DESIGNATION }

    fn description(&self) -> String { format!("Upload via {}", self.folder.display()) }

    fn export(&self, capture: &CaptureDetails) -> Result<ExportInformation, DestinationError> {
        let public_url = self.config.get()?.settings().cloud.public_url.trim().trim_end_matches('/').to_string();

        let target = self.target_for(&capture.path);
        fs::copy(&capture.path, &target)?;
        tracing::debug!(from = %capture.path.display(), to = %target.display(), "copied capture to sync folder");

        let uri = target
            .file_name()
            .filter(|_| !public_url.is_empty())
            .map(|name| format!("{public_url}/{}", name.to_string_lossy()));

        Ok(ExportInformation { designation: DESIGNATION, location: Some(target), uri })
    }
}

impl Injectable for CloudDestination {
    fn inject(&mut self, registry: &CapabilityRegistry) -> RegistryResult<()> {
        let config = self.config.resolve(registry)?;
        self.config.fill(config);
        Ok(())
    }
}

struct CloudCandidate;

impl DestinationCandidate for CloudCandidate {
    fn designation(&self) -> &'static str { DESIGNATION }

    fn probe(&self, ctx: &ProbeContext) -> Result<Feasibility, ProbeError> {
        let Some(folder) = ctx.settings().cloud.sync_folder_path() else {
            return Ok(Feasibility::Infeasible("no sync folder configured".to_string()));
        };
        if !fs::metadata(&folder)?.is_dir() {
            return Ok(Feasibility::Infeasible(format!("{} is not a directory", folder.display())));
        }
        Ok(Feasibility::Feasible { target: Some(folder) })
    }

    fn construct(&self, target: Option<PathBuf>) -> Result<Box<dyn DestinationProvider>, ProbeError> {
        let folder = target.ok_or_else(|| ProbeError::Unavailable("no sync folder".to_string()))?;
        Ok(Box::new(CloudDestination::new(folder)))
    }
}

/// Builds the cloud exporter.
#[must_use]
pub fn exporter() -> DestinationExporter { DestinationExporter::new("cloud").candidate(CloudCandidate) }
