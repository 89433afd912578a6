//! Locating and launching host applications.

use std::ffi::OsString;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::services::thread::spawn_named_thread;

/// Finds executables and starts them detached from the caller.
///
/// Registered under the `HostLauncher` capability. Addons import it both to
/// probe feasibility and to hand captures to host applications.
pub trait HostLauncher: Send + Sync {
    /// Returns the first of `candidates` that resolves to an executable.
    ///
    /// Candidates containing a `/` are checked as paths; others are looked up on `PATH`.
    fn locate(&self, candidates: &[String]) -> Option<PathBuf>;

    /// Starts `program` with `args` and returns without waiting for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the process could not be spawned.
    fn launch(&self, program: &Path, args: &[OsString]) -> io::Result<()>;
}

/// Launcher backed by the process environment.
#[derive(Debug, Clone, Default)]
pub struct SystemLauncher {
    search_path: Option<OsString>,
}

impl SystemLauncher {
    /// Creates a launcher searching the current `PATH`.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Creates a launcher searching `search_path` instead of `PATH`.
    #[must_use]
    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self { search_path: Some(search_path.into()) }
    }

    fn search_dirs(&self) -> Vec<PathBuf> {
        let path = self.search_path.clone().or_else(|| std::env::var_os("PATH"));
        path.map(|path| std::env::split_paths(&path).collect()).unwrap_or_default()
    }
}

fn is_executable(path: &Path) -> bool {
    path.metadata().is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

impl HostLauncher for SystemLauncher {
    fn locate(&self, candidates: &[String]) -> Option<PathBuf> {
        let dirs = self.search_dirs();
        candidates.iter().map(String::as_str).filter(|name| !name.trim().is_empty()).find_map(
            |name| {
                if name.contains('/') {
                    let path = PathBuf::from(shellexpand::tilde(name).into_owned());
                    return is_executable(&path).then_some(path);
                }
                dirs.iter().map(|dir| dir.join(name)).find(|path| is_executable(path))
            },
        )
    }

    fn launch(&self, program: &Path, args: &[OsString]) -> io::Result<()> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        tracing::debug!(program = %program.display(), pid = child.id(), "launched host application");

        // Reap the child so it does not linger as a zombie.
        let label = program.display().to_string();
        let reaped = label.clone();
        let reaper = spawn_named_thread("reaper", move || match child.wait() {
            Ok(status) if !status.success() => {
                tracing::debug!(program = %reaped, %status, "host application exited");
            }
            Ok(_) => {}
            Err(err) => tracing::warn!(program = %reaped, error = %err, "failed to wait for host"),
        });
        // The host is running either way; only its exit status goes unobserved.
        if let Err(err) = reaper {
            tracing::warn!(program = %label, error = %err, "failed to spawn reaper thread");
        }
        Ok(())
    }
}
