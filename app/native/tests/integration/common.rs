//! Common test utilities.
//!
//! Builds applications around a temporary endpoint directory, a recording
//! capture service and a launcher that finds nothing.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use glint_lib::addons::launcher::{HostLauncher, SystemLauncher};
use glint_lib::app::Application;
use glint_lib::capture::{
    CaptureDetails, CaptureError, CaptureHelper, CaptureService, CaptureSource, ScreenCaptureMode,
};
use glint_lib::config::{ConfigProvider, GlintConfig, StaticConfig};
use glint_lib::platform::ipc::{ControlServer, EndpointIdentity};
use glint_lib::registry::{CAPTURE, CONFIGURATION, CapabilityRegistry, LAUNCHER};
use glint_lib::services::Orchestrator;
use glint_lib::ui::LoopExit;
use parking_lot::Mutex;
use tempfile::TempDir;

/// One call the capture service received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureCall {
    File(PathBuf),
    Screen { include_cursor: bool },
}

/// Capture service that records calls and the thread they ran on.
#[derive(Debug, Default)]
pub struct RecordingCapture {
    calls: Mutex<Vec<(CaptureCall, ThreadId)>>,
}

impl RecordingCapture {
    pub fn new() -> Arc<Self> { Arc::new(Self::default()) }

    pub fn calls(&self) -> Vec<CaptureCall> {
        self.calls.lock().iter().map(|(call, _)| call.clone()).collect()
    }

    pub fn threads(&self) -> Vec<ThreadId> { self.calls.lock().iter().map(|(_, id)| *id).collect() }

    fn record(&self, call: CaptureCall) { self.calls.lock().push((call, thread::current().id())); }
}

impl CaptureService for RecordingCapture {
    fn capture_file(&self, path: &Path) -> Result<CaptureDetails, CaptureError> {
        self.record(CaptureCall::File(path.to_path_buf()));
        Ok(CaptureDetails::from_file(path))
    }

    fn capture_fullscreen(
        &self,
        include_cursor: bool,
        _mode: ScreenCaptureMode,
    ) -> Result<CaptureDetails, CaptureError> {
        self.record(CaptureCall::Screen { include_cursor });
        Ok(CaptureDetails {
            path: PathBuf::from("/tmp/screen.png"),
            title: "screen".to_string(),
            source: CaptureSource::Screen,
        })
    }
}

/// A private endpoint directory, removed when dropped.
pub struct Endpoint {
    dir: TempDir,
}

impl Endpoint {
    pub fn new() -> Self { Self { dir: tempfile::tempdir().unwrap() } }

    pub fn identity(&self) -> EndpointIdentity { EndpointIdentity::in_dir(self.dir.path()) }

    pub fn path(&self) -> &Path { self.dir.path() }
}

/// Registry holding the configuration, an empty-PATH launcher and `capture`.
pub fn registry_with(config: GlintConfig, capture: Arc<RecordingCapture>) -> Arc<CapabilityRegistry> {
    let registry = Arc::new(CapabilityRegistry::new());
    let settings: Arc<dyn ConfigProvider> = Arc::new(StaticConfig::new(config));
    let launcher: Arc<dyn HostLauncher> = Arc::new(SystemLauncher::with_search_path("/nonexistent/glint/bin"));
    let capture: Arc<dyn CaptureService> = capture;
    registry.export(CONFIGURATION, settings);
    registry.export(LAUNCHER, launcher);
    registry.export(CAPTURE, capture);
    registry
}

/// Application running only the control server.
pub fn server_app(endpoint: &Endpoint, capture: Arc<RecordingCapture>) -> Application {
    let registry = registry_with(GlintConfig::default(), capture);
    let mut orchestrator = Orchestrator::new();
    orchestrator.register(Box::new(ControlServer::new(endpoint.identity())));
    Application::from_parts(registry, orchestrator, endpoint.identity())
}

/// Runs the application's UI loop on a dedicated thread.
///
/// Returns the thread's id and a handle yielding why the loop stopped.
pub fn spawn_ui_thread(app: &mut Application) -> (ThreadId, thread::JoinHandle<LoopExit>) {
    let ui_loop = app.take_ui_loop().unwrap();
    let mut helper = CaptureHelper::from_registry(app.context().registry_handle()).unwrap();
    let handle = thread::Builder::new()
        .name("test-ui".to_string())
        .spawn(move || ui_loop.run(&mut helper))
        .unwrap();
    (handle.thread().id(), handle)
}
