//! Per-user endpoint identity.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::constants::endpoint::{MEX_SUFFIX, SCHEME, SERVER_PREFIX};
use crate::core::constants::{APP_ID, APP_NAME};

/// Returns the real user id of the current process.
#[must_use]
pub fn current_user_id() -> u32 {
    // SAFETY: getuid has no preconditions and cannot fail.
    unsafe { libc::getuid() }
}

/// Directory holding the endpoint sockets when none is configured.
///
/// Uses the per-user runtime directory when the platform has one, otherwise
/// a user-specific directory under the system temp dir.
#[must_use]
pub fn default_socket_dir(user: u32) -> PathBuf {
    dirs::runtime_dir()
        .map(|dir| dir.join(APP_ID))
        .unwrap_or_else(|| std::env::temp_dir().join(format!("{APP_ID}-{user}")))
}

/// Identifies the control endpoint of one user.
///
/// Derived deterministically from the user id, so the binding server and
/// every connecting client agree on it without coordination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointIdentity {
    user: u32,
    dir: PathBuf,
}

impl EndpointIdentity {
    /// The identity of the current user in the default location.
    #[must_use]
    pub fn current() -> Self {
        let user = current_user_id();
        Self::new(user, default_socket_dir(user))
    }

    /// The identity of the current user with sockets under `dir`.
    #[must_use]
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self { Self::new(current_user_id(), dir.into()) }

    /// An explicit identity.
    #[must_use]
    pub const fn new(user: u32, dir: PathBuf) -> Self { Self { user, dir } }

    /// The user this endpoint belongs to.
    #[must_use]
    pub const fn user(&self) -> u32 { self.user }

    /// Endpoint name, `Server_<uid>`.
    #[must_use]
    pub fn name(&self) -> String { format!("{SERVER_PREFIX}{}", self.user) }

    /// Address of the control endpoint.
    #[must_use]
    pub fn uri(&self) -> String { format!("{SCHEME}://localhost/{APP_NAME}/{}", self.name()) }

    /// Address of the introspection endpoint.
    #[must_use]
    pub fn mex_uri(&self) -> String { format!("{}{MEX_SUFFIX}", self.uri()) }

    /// Directory holding the socket and lock files.
    #[must_use]
    pub fn dir(&self) -> &Path { &self.dir }

    /// Socket serving the control contract.
    #[must_use]
    pub fn socket_path(&self) -> PathBuf { self.dir.join(format!("{}.sock", self.name())) }

    /// Socket serving the contract description.
    #[must_use]
    pub fn mex_socket_path(&self) -> PathBuf { self.dir.join(format!("{}.mex.sock", self.name())) }

    /// Lock file held for as long as the endpoint is bound.
    #[must_use]
    pub fn lock_path(&self) -> PathBuf { self.dir.join(format!("{}.lock", self.name())) }
}

impl fmt::Display for EndpointIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.uri()) }
}
