//! Test doubles for addon tests.
//!
//! Provides a launcher that knows a fixed set of executables and records
//! launches instead of spawning processes.

use std::collections::HashMap;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use super::ProbeContext;
use super::launcher::HostLauncher;
use crate::config::{ConfigProvider, GlintConfig, StaticConfig};
use crate::registry::{CONFIGURATION, CapabilityRegistry, LAUNCHER};
use crate::services::AppContext;
use crate::ui;

/// A launch recorded by [`FakeLauncher`].
pub type Launch = (PathBuf, Vec<OsString>);

/// Launcher resolving names from a fixed table.
#[derive(Debug, Default)]
pub struct FakeLauncher {
    known: HashMap<String, PathBuf>,
    launches: Mutex<Vec<Launch>>,
    fail_launches: bool,
}

impl FakeLauncher {
    /// A launcher that finds nothing.
    pub fn new() -> Arc<Self> { Arc::new(Self::default()) }

    /// A launcher that finds each of `names` under `/opt/fake/bin`.
    pub fn with(names: &[&str]) -> Arc<Self> {
        Arc::new(Self { known: table(names), ..Self::default() })
    }

    /// A launcher that finds `names` but fails every launch.
    pub fn broken(names: &[&str]) -> Arc<Self> {
        Arc::new(Self { known: table(names), fail_launches: true, ..Self::default() })
    }

    /// Launches recorded so far.
    pub fn launches(&self) -> Vec<Launch> { self.launches.lock().clone() }
}

fn table(names: &[&str]) -> HashMap<String, PathBuf> {
    names
        .iter()
        .map(|name| ((*name).to_string(), Path::new("/opt/fake/bin").join(name)))
        .collect()
}

impl HostLauncher for FakeLauncher {
    fn locate(&self, candidates: &[String]) -> Option<PathBuf> {
        candidates.iter().find_map(|name| self.known.get(name).cloned())
    }

    fn launch(&self, program: &Path, args: &[OsString]) -> io::Result<()> {
        if self.fail_launches {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "launch refused"));
        }
        self.launches.lock().push((program.to_path_buf(), args.to_vec()));
        Ok(())
    }
}

/// Builds a context whose registry holds `config` and `launcher`.
pub fn context_with(config: GlintConfig, launcher: Arc<FakeLauncher>) -> AppContext {
    let registry = Arc::new(CapabilityRegistry::new());
    let config: Arc<dyn ConfigProvider> = Arc::new(StaticConfig::new(config));
    let launcher: Arc<dyn HostLauncher> = launcher;
    registry.export(CONFIGURATION, config);
    registry.export(LAUNCHER, launcher);

    let (dispatcher, _ui_loop) = ui::channel();
    AppContext::new(registry, dispatcher)
}

/// Builds a context with default settings.
pub fn context(launcher: Arc<FakeLauncher>) -> AppContext {
    context_with(GlintConfig::default(), launcher)
}

/// Builds a probe context with the given settings.
pub fn probe_context(config: GlintConfig, launcher: Arc<FakeLauncher>) -> ProbeContext {
    let config: Arc<dyn ConfigProvider> = Arc::new(StaticConfig::new(config));
    ProbeContext::new(config, launcher)
}
