//! Control contract and wire framing.
//!
//! Requests and responses are single JSON objects, one per line.
//!
//! ```text
//! -> {"method":"OpenFile","params":{"path":"/home/me/shot.png"}}
//! <- {"status":"accepted"}
//! -> {"method":"Frobnicate"}
//! <- {"status":"fault","message":"internal error"}
//! ```

use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::identity::EndpointIdentity;

/// Operations a running instance accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum ControlRequest {
    /// Stop the running instance.
    Exit,
    /// Load an image file as a capture.
    OpenFile { path: PathBuf },
    /// Capture the whole screen.
    CaptureScreen {
        #[serde(rename = "includeCursor")]
        include_cursor: bool,
    },
}

/// Reply to a [`ControlRequest`].
///
/// `Accepted` only means the work was queued; it says nothing about whether
/// the work succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ControlResponse {
    /// The request was queued.
    Accepted,
    /// The request could not be handled. The message never carries detail.
    Fault { message: String },
}

/// One operation in a [`ContractDescription`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDescription {
    pub name: String,
    pub params: Vec<String>,
    pub description: String,
}

/// What the introspection endpoint serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractDescription {
    pub endpoint: String,
    pub mex: String,
    pub version: String,
    pub operations: Vec<OperationDescription>,
}

/// Describes the contract served at `identity`.
#[must_use]
pub fn describe(identity: &EndpointIdentity) -> ContractDescription {
    let operation = |name: &str, params: &[&str], description: &str| OperationDescription {
        name: name.to_string(),
        params: params.iter().map(ToString::to_string).collect(),
        description: description.to_string(),
    };

    ContractDescription {
        endpoint: identity.uri(),
        mex: identity.mex_uri(),
        version: crate::core::constants::APP_VERSION.to_string(),
        operations: vec![
            operation("Exit", &[], "Stop the running instance"),
            operation("OpenFile", &["path"], "Load an existing image file as a capture"),
            operation("CaptureScreen", &["includeCursor"], "Capture the whole screen"),
        ],
    }
}

/// One framed read.
#[derive(Debug, PartialEq, Eq)]
pub enum Frame {
    /// A complete line, without its terminator.
    Line(String),
    /// The line exceeded the size limit.
    TooLarge,
    /// The peer closed the connection.
    Closed,
}

/// Reads one line of at most `limit` bytes.
///
/// # Errors
///
/// Returns an error if reading fails, including on timeout.
pub fn read_frame<R: BufRead>(reader: &mut R, limit: usize) -> io::Result<Frame> {
    let mut buffer = Vec::new();
    let max = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    let read = reader.by_ref().take(max).read_until(b'\n', &mut buffer)?;

    if read == 0 {
        return Ok(Frame::Closed);
    }
    if buffer.last() == Some(&b'\n') {
        buffer.pop();
        if buffer.last() == Some(&b'\r') {
            buffer.pop();
        }
    } else if buffer.len() > limit {
        return Ok(Frame::TooLarge);
    }

    Ok(Frame::Line(String::from_utf8_lossy(&buffer).into_owned()))
}

/// Writes `message` as one JSON line and flushes.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_frame<W: Write, T: Serialize>(writer: &mut W, message: &T) -> io::Result<()> {
    serde_json::to_writer(&mut *writer, message)?;
    writer.write_all(b"\n")?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_request_wire_format() {
        let json = serde_json::to_string(&ControlRequest::CaptureScreen { include_cursor: true }).unwrap();
        assert_eq!(json, r#"{"method":"CaptureScreen","params":{"includeCursor":true}}"#);

        let exit: ControlRequest = serde_json::from_str(r#"{"method":"Exit"}"#).unwrap();
        assert_eq!(exit, ControlRequest::Exit);
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        assert!(serde_json::from_str::<ControlRequest>(r#"{"method":"Shutdown"}"#).is_err());
    }

    #[test]
    fn test_response_wire_format() {
        assert_eq!(serde_json::to_string(&ControlResponse::Accepted).unwrap(), r#"{"status":"accepted"}"#);
        let fault = ControlResponse::Fault { message: "internal error".to_string() };
        assert_eq!(
            serde_json::to_string(&fault).unwrap(),
            r#"{"status":"fault","message":"internal error"}"#
        );
    }

    #[test]
    fn test_read_frames() {
        let mut reader = Cursor::new(b"first\r\nsecond\nlast".to_vec());
        assert_eq!(read_frame(&mut reader, 64).unwrap(), Frame::Line("first".to_string()));
        assert_eq!(read_frame(&mut reader, 64).unwrap(), Frame::Line("second".to_string()));
        assert_eq!(read_frame(&mut reader, 64).unwrap(), Frame::Line("last".to_string()));
        assert_eq!(read_frame(&mut reader, 64).unwrap(), Frame::Closed);
    }

    #[test]
    fn test_oversized_frame() {
        let mut reader = Cursor::new(b"0123456789\n".to_vec());
        assert_eq!(read_frame(&mut reader, 4).unwrap(), Frame::TooLarge);

        let mut reader = Cursor::new(b"0123\n".to_vec());
        assert_eq!(read_frame(&mut reader, 4).unwrap(), Frame::Line("0123".to_string()));
    }

    #[test]
    fn test_description_lists_operations() {
        let identity = EndpointIdentity::new(1, PathBuf::from("/tmp"));
        let description = describe(&identity);
        let names: Vec<_> = description.operations.iter().map(|op| op.name.as_str()).collect();
        assert_eq!(names, vec!["Exit", "OpenFile", "CaptureScreen"]);
        assert!(description.mex.ends_with("/mex"));
    }

    #[test]
    fn test_write_frame_appends_newline() {
        let mut out = Vec::new();
        write_frame(&mut out, &ControlResponse::Accepted).unwrap();
        assert_eq!(out, b"{\"status\":\"accepted\"}\n");
    }
}
