//! Integration tests for requests served by a running instance.
//!
//! ## Test Coverage
//! - OpenFile of a missing path is accepted without capturing anything
//! - Accepted work runs on the UI thread, never the request thread
//! - CaptureScreen passes the cursor flag through
//! - Malformed requests and handler failures return the generic fault
//! - The introspection endpoint describes the contract

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::thread;

use glint_lib::core::constants::endpoint::GENERIC_FAULT;
use glint_lib::platform::ipc::{ControlClient, ControlRequest, ControlResponse, IpcError};
use glint_lib::ui::LoopExit;

use crate::common::*;

fn raw_exchange(endpoint: &Endpoint, line: &str) -> ControlResponse {
    let stream = UnixStream::connect(endpoint.identity().socket_path()).unwrap();
    let mut writer = stream.try_clone().unwrap();
    writer.write_all(line.as_bytes()).unwrap();
    writer.write_all(b"\n").unwrap();

    let mut reply = String::new();
    BufReader::new(stream).read_line(&mut reply).unwrap();
    serde_json::from_str(&reply).unwrap()
}

#[test]
fn test_missing_file_is_accepted_and_never_captured() {
    let endpoint = Endpoint::new();
    let capture = RecordingCapture::new();
    let mut app = server_app(&endpoint, capture.clone());
    assert!(app.start().is_clean());
    let (_, ui_thread) = spawn_ui_thread(&mut app);

    let mut client = ControlClient::connect(&endpoint.identity()).unwrap();
    let missing = endpoint.path().join("nope.png");
    assert_eq!(
        client.send(&ControlRequest::OpenFile { path: missing }).unwrap(),
        ControlResponse::Accepted
    );
    client.call(&ControlRequest::Exit).unwrap();

    assert_eq!(ui_thread.join().unwrap(), LoopExit::Requested);
    assert!(capture.calls().is_empty());
    app.shutdown();
}

#[test]
fn test_existing_file_is_captured_on_the_ui_thread() {
    let endpoint = Endpoint::new();
    let image = endpoint.path().join("shot.png");
    fs::write(&image, [0_u8; 8]).unwrap();

    let capture = RecordingCapture::new();
    let mut app = server_app(&endpoint, capture.clone());
    app.start();
    let (ui_id, ui_thread) = spawn_ui_thread(&mut app);

    let identity = endpoint.identity();
    let request_path = image.clone();
    let requester = thread::spawn(move || {
        let mut client = ControlClient::connect(&identity).unwrap();
        client.call(&ControlRequest::OpenFile { path: request_path }).unwrap();
        client.call(&ControlRequest::Exit).unwrap();
        thread::current().id()
    });

    let requester_id = requester.join().unwrap();
    ui_thread.join().unwrap();

    assert_eq!(capture.calls(), vec![CaptureCall::File(image)]);
    assert_eq!(capture.threads(), vec![ui_id]);
    assert_ne!(capture.threads()[0], requester_id);
    app.shutdown();
}

#[test]
fn test_capture_screen_passes_cursor_flag() {
    let endpoint = Endpoint::new();
    let capture = RecordingCapture::new();
    let mut app = server_app(&endpoint, capture.clone());
    app.start();
    let (_, ui_thread) = spawn_ui_thread(&mut app);

    let mut client = ControlClient::connect(&endpoint.identity()).unwrap();
    client.call(&ControlRequest::CaptureScreen { include_cursor: false }).unwrap();
    client.call(&ControlRequest::CaptureScreen { include_cursor: true }).unwrap();
    client.call(&ControlRequest::Exit).unwrap();
    ui_thread.join().unwrap();

    assert_eq!(
        capture.calls(),
        vec![
            CaptureCall::Screen { include_cursor: false },
            CaptureCall::Screen { include_cursor: true }
        ]
    );
    app.shutdown();
}

#[test]
fn test_unknown_operation_returns_generic_fault() {
    let endpoint = Endpoint::new();
    let mut app = server_app(&endpoint, RecordingCapture::new());
    app.start();

    let reply = raw_exchange(&endpoint, r#"{"method":"Frobnicate"}"#);
    assert_eq!(reply, ControlResponse::Fault { message: GENERIC_FAULT.to_string() });

    let reply = raw_exchange(&endpoint, "not json at all");
    assert_eq!(reply, ControlResponse::Fault { message: GENERIC_FAULT.to_string() });
    app.shutdown();
}

#[test]
fn test_handler_failure_returns_generic_fault() {
    let endpoint = Endpoint::new();
    let image = endpoint.path().join("shot.png");
    fs::write(&image, [0_u8; 8]).unwrap();

    let mut app = server_app(&endpoint, RecordingCapture::new());
    app.start();
    // No UI thread: queueing work fails inside the handler.
    drop(app.take_ui_loop());

    let mut client = ControlClient::connect(&endpoint.identity()).unwrap();
    let err = client.call(&ControlRequest::OpenFile { path: image }).unwrap_err();
    match err {
        IpcError::Fault(message) => assert_eq!(message, GENERIC_FAULT),
        other => panic!("expected a fault, got {other:?}"),
    }

    // The connection survives a fault.
    assert!(matches!(client.send(&ControlRequest::Exit).unwrap(), ControlResponse::Fault { .. }));
    app.shutdown();
}

#[test]
fn test_mex_describes_the_contract() {
    let endpoint = Endpoint::new();
    let mut app = server_app(&endpoint, RecordingCapture::new());
    app.start();

    let description = ControlClient::describe(&endpoint.identity()).unwrap();
    assert_eq!(description.endpoint, endpoint.identity().uri());
    assert_eq!(description.mex, endpoint.identity().mex_uri());

    let operations: Vec<_> = description.operations.iter().map(|op| op.name.as_str()).collect();
    assert_eq!(operations, vec!["Exit", "OpenFile", "CaptureScreen"]);
    app.shutdown();
}
