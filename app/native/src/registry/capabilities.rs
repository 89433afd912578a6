//! Capabilities known to the application.

use super::Capability;
use crate::addons::launcher::HostLauncher;
use crate::capture::CaptureService;
use crate::config::ConfigProvider;
use crate::destinations::Destination;
use crate::platform::ipc::ControlEndpoint;

/// Export targets a capture can be delivered to.
pub const DESTINATION: Capability<dyn Destination> = Capability::new("Destination");

/// The single-instance control endpoint.
pub const RPC_ENDPOINT: Capability<dyn ControlEndpoint> = Capability::new("RpcEndpoint");

/// Read-only application settings.
pub const CONFIGURATION: Capability<dyn ConfigProvider> = Capability::new("Configuration");

/// The screen-capture and file-loading subsystem.
pub const CAPTURE: Capability<dyn CaptureService> = Capability::new("Capture");

/// Locates and launches host applications.
pub const LAUNCHER: Capability<dyn HostLauncher> = Capability::new("HostLauncher");
