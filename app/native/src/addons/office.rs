//! Office destinations.
//!
//! Hands captures to a word processor, spreadsheet, mail client, slide deck
//! or notebook application. Each application is offered only when one of its
//! host executables is installed and it is not disabled in the `office`
//! configuration section.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use super::launcher::HostLauncher;
use super::{
    DestinationCandidate, DestinationExporter, DestinationProvider, Feasibility, ProbeContext,
    ProbeError,
};
use crate::capture::CaptureDetails;
use crate::destinations::{Destination, DestinationError, ExportInformation};
use crate::registry::{CapabilityRegistry, Import, Injectable, LAUNCHER, RegistryResult};

/// Office applications a capture can be sent to, in export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfficeApplication {
    Word,
    Excel,
    Outlook,
    PowerPoint,
    OneNote,
}

impl OfficeApplication {
    /// Every application, in export order.
    pub const ALL: [Self; 5] = [Self::Word, Self::Excel, Self::Outlook, Self::PowerPoint, Self::OneNote];

    /// Designation used in configuration.
    #[must_use]
    pub const fn designation(self) -> &'static str {
        match self {
            Self::Word => "Word",
            Self::Excel => "Excel",
            Self::Outlook => "Outlook",
            Self::PowerPoint => "PowerPoint",
            Self::OneNote => "OneNote",
        }
    }

    /// Human-readable description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Word => "Insert into a text document",
            Self::Excel => "Insert into a spreadsheet",
            Self::Outlook => "Attach to a new e-mail",
            Self::PowerPoint => "Insert into a slide deck",
            Self::OneNote => "Add to a notebook",
        }
    }

    /// Host executables looked up when configuration does not override them.
    #[must_use]
    pub const fn default_executables(self) -> &'static [&'static str] {
        match self {
            Self::Word => &["lowriter", "libreoffice", "soffice", "abiword"],
            Self::Excel => &["localc", "libreoffice", "soffice", "gnumeric"],
            Self::Outlook => &["thunderbird", "evolution"],
            Self::PowerPoint => &["loimpress", "libreoffice", "soffice"],
            Self::OneNote => &["xournalpp", "rnote"],
        }
    }

    /// Module flag selecting this application in a generic office suite binary.
    const fn suite_flag(self) -> Option<&'static str> {
        match self {
            Self::Word => Some("--writer"),
            Self::Excel => Some("--calc"),
            Self::PowerPoint => Some("--impress"),
            Self::Outlook | Self::OneNote => None,
        }
    }

    /// Arguments that open `capture` in `host`.
    #[must_use]
    pub fn launch_args(self, host: &Path, capture: &Path) -> Vec<OsString> {
        let program = host.file_name().and_then(OsStr::to_str).unwrap_or_default();

        match (self, program) {
            (Self::Outlook, "thunderbird") => {
                let mut attachment = OsString::from("attachment='");
                attachment.push(capture);
                attachment.push("'");
                vec![OsString::from("-compose"), attachment]
            }
            (Self::Outlook, "evolution") => {
                let mut mailto = OsString::from("mailto:?attach=");
                mailto.push(capture);
                vec![mailto]
            }
            (_, "libreoffice" | "soffice") => {
                let mut args: Vec<OsString> = self.suite_flag().map(OsString::from).into_iter().collect();
                args.push(capture.as_os_str().to_owned());
                args
            }
            _ => vec![capture.as_os_str().to_owned()],
        }
    }
}

/// Sends captures to one office application.
#[derive(Debug)]
pub struct OfficeDestination {
    application: OfficeApplication,
    host: PathBuf,
    launcher: Import<dyn HostLauncher>,
}

impl OfficeDestination {
    /// Creates a destination launching `host`. Imports are not filled yet.
    #[must_use]
    pub const fn new(application: OfficeApplication, host: PathBuf) -> Self {
        Self { application, host, launcher: Import::new(LAUNCHER) }
    }
}

impl Destination for OfficeDestination {
    fn designation(&self) -> &'static str { self.application.designation() }

    fn description(&self) -> String { self.application.description().to_string() }

    fn export(&self, capture: &CaptureDetails) -> Result<ExportInformation, DestinationError> {
        let args = self.application.launch_args(&self.host, &capture.path);
        self.launcher.get()?.launch(&self.host, &args).map_err(|source| DestinationError::Launch {
            program: self.host.display().to_string(),
            source,
        })?;

        Ok(ExportInformation {
            designation: self.designation(),
            location: Some(capture.path.clone()),
            uri: None,
        })
    }
}

impl Injectable for OfficeDestination {
    fn inject(&mut self, registry: &CapabilityRegistry) -> RegistryResult<()> {
        let launcher = self.launcher.resolve(registry)?;
        self.launcher.fill(launcher);
        Ok(())
    }
}

/// Probes for one office application.
#[derive(Debug, Clone, Copy)]
pub struct OfficeCandidate {
    application: OfficeApplication,
}

impl OfficeCandidate {
    #[must_use]
    pub const fn new(application: OfficeApplication) -> Self { Self { application } }
}

impl DestinationCandidate for OfficeCandidate {
    fn designation(&self) -> &'static str { self.application.designation() }

    fn probe(&self, ctx: &ProbeContext) -> Result<Feasibility, ProbeError> {
        let office = &ctx.settings().office;
        let designation = self.application.designation();
        if !office.allows(designation) {
            return Ok(Feasibility::Infeasible("disabled in configuration".to_string()));
        }

        let executables: Vec<String> = office.executables_for(designation).map_or_else(
            || self.application.default_executables().iter().map(ToString::to_string).collect(),
            <[String]>::to_vec,
        );

        Ok(ctx.launcher().locate(&executables).map_or_else(
            || Feasibility::Infeasible(format!("none of {executables:?} is installed")),
            |host| Feasibility::Feasible { target: Some(host) },
        ))
    }

    fn construct(&self, target: Option<PathBuf>) -> Result<Box<dyn DestinationProvider>, ProbeError> {
        let host = target.ok_or_else(|| ProbeError::Unavailable("no host application".to_string()))?;
        Ok(Box::new(OfficeDestination::new(self.application, host)))
    }
}

/// Builds the exporter for every office application.
#[must_use]
pub fn exporter() -> DestinationExporter {
    OfficeApplication::ALL
        .into_iter()
        .fold(DestinationExporter::new("office"), |exporter, application| {
            exporter.candidate(OfficeCandidate::new(application))
        })
}
