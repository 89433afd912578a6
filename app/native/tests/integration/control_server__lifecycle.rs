//! Integration tests for the single-instance control endpoint lifecycle.
//!
//! ## Test Coverage
//! - A second instance on the same endpoint reports a bind conflict
//! - The conflicting instance can hand its intent to the first one
//! - Shutdown releases the endpoint so a new instance can bind
//! - Connections opened before shutdown are closed with it

use glint_lib::app::Intent;
use glint_lib::capture::CaptureHelper;
use glint_lib::platform::ipc::{ControlClient, ControlRequest, IpcError};
use glint_lib::registry::RPC_ENDPOINT;
use glint_lib::services::UnitState;
use glint_lib::ui::LoopExit;

use crate::common::*;

#[test]
fn test_second_instance_reports_bind_conflict() {
    let endpoint = Endpoint::new();
    let mut first = server_app(&endpoint, RecordingCapture::new());
    assert!(first.start().is_clean());
    assert!(ControlClient::is_running(&endpoint.identity()));

    let mut second = server_app(&endpoint, RecordingCapture::new());
    let report = second.start();

    assert!(matches!(report.bind_conflict(), Some(IpcError::BindConflict { .. })));
    assert!(!report.aborted());
    assert_eq!(second.state_of("control-server"), Some(UnitState::FailedToStart));
    assert!(second.registry().resolve(RPC_ENDPOINT).is_empty());

    // The losing instance leaves the winner's endpoint untouched.
    second.shutdown();
    assert!(ControlClient::is_running(&endpoint.identity()));
    first.shutdown();
}

#[test]
fn test_conflicting_launch_hands_off_its_intent() {
    let endpoint = Endpoint::new();
    let capture = RecordingCapture::new();
    let mut first = server_app(&endpoint, capture.clone());
    first.start();
    let (_, ui_thread) = spawn_ui_thread(&mut first);

    let mut second = server_app(&endpoint, RecordingCapture::new());
    assert!(second.start().bind_conflict().is_some());
    second.shutdown();

    let mut client = ControlClient::connect(&endpoint.identity()).unwrap();
    for request in (Intent::Capture { include_cursor: true }).requests() {
        client.call(&request).unwrap();
    }
    for request in Intent::Exit.requests() {
        client.call(&request).unwrap();
    }

    assert_eq!(ui_thread.join().unwrap(), LoopExit::Requested);
    assert_eq!(capture.calls(), vec![CaptureCall::Screen { include_cursor: true }]);
    first.shutdown();
}

#[test]
fn test_shutdown_releases_the_endpoint() {
    let endpoint = Endpoint::new();
    let identity = endpoint.identity();

    let mut first = server_app(&endpoint, RecordingCapture::new());
    first.start();
    first.shutdown();

    assert_eq!(first.state_of("control-server"), Some(UnitState::Stopped));
    assert!(!identity.socket_path().exists());
    assert!(!identity.mex_socket_path().exists());
    assert!(matches!(ControlClient::connect(&identity), Err(IpcError::NotRunning { .. })));

    let mut second = server_app(&endpoint, RecordingCapture::new());
    assert!(second.start().is_clean());
    assert!(second.registry().resolve_one(RPC_ENDPOINT).unwrap().is_started());
    second.shutdown();
}

#[test]
fn test_shutdown_closes_open_connections() {
    let endpoint = Endpoint::new();
    let capture = RecordingCapture::new();
    let mut app = server_app(&endpoint, capture.clone());
    app.start();
    let mut ui_loop = app.take_ui_loop().unwrap();
    let mut helper = CaptureHelper::from_registry(app.context().registry_handle()).unwrap();

    let mut client = ControlClient::connect(&endpoint.identity()).unwrap();
    client.call(&ControlRequest::CaptureScreen { include_cursor: true }).unwrap();
    assert_eq!(ui_loop.drain(&mut helper), Some(1));

    app.shutdown();

    assert!(client.send(&ControlRequest::CaptureScreen { include_cursor: false }).is_err());
    assert_eq!(ui_loop.drain(&mut helper), Some(0));
    assert_eq!(capture.calls(), vec![CaptureCall::Screen { include_cursor: true }]);
}
