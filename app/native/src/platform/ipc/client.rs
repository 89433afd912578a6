//! Client side of the control endpoint.

use std::io::{self, BufReader};
use std::os::unix::net::UnixStream;
use std::path::Path;

use super::error::IpcError;
use super::identity::EndpointIdentity;
use super::protocol::{self, ContractDescription, ControlRequest, ControlResponse, Frame};
use crate::core::constants::endpoint::{CLIENT_TIMEOUT, MAX_REQUEST_BYTES};

/// Connection to a running instance.
#[derive(Debug)]
pub struct ControlClient {
    endpoint: String,
    writer: UnixStream,
    reader: BufReader<UnixStream>,
}

fn open(path: &Path, endpoint: &str) -> Result<UnixStream, IpcError> {
    let stream = UnixStream::connect(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::ConnectionRefused => {
            IpcError::NotRunning { endpoint: endpoint.to_string() }
        }
        _ => IpcError::Io(err),
    })?;
    stream.set_read_timeout(Some(CLIENT_TIMEOUT))?;
    stream.set_write_timeout(Some(CLIENT_TIMEOUT))?;
    Ok(stream)
}

fn read_reply<T: serde::de::DeserializeOwned>(reader: &mut BufReader<UnixStream>) -> Result<T, IpcError> {
    match protocol::read_frame(reader, MAX_REQUEST_BYTES)? {
        Frame::Line(line) => Ok(serde_json::from_str(&line)?),
        Frame::TooLarge => Err(IpcError::Protocol("reply exceeds size limit".to_string())),
        Frame::Closed => Err(IpcError::Protocol("connection closed before reply".to_string())),
    }
}

impl ControlClient {
    /// Connects to the instance bound to `identity`.
    ///
    /// # Errors
    ///
    /// Returns [`IpcError::NotRunning`] when no instance is listening.
    pub fn connect(identity: &EndpointIdentity) -> Result<Self, IpcError> {
        let endpoint = identity.uri();
        let writer = open(&identity.socket_path(), &endpoint)?;
        let reader = BufReader::new(writer.try_clone()?);
        Ok(Self { endpoint, writer, reader })
    }

    /// Sends one request and waits for the reply.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails or the reply is not valid.
    pub fn send(&mut self, request: &ControlRequest) -> Result<ControlResponse, IpcError> {
        tracing::debug!(endpoint = %self.endpoint, ?request, "sending control request");
        protocol::write_frame(&mut self.writer, request)?;
        read_reply(&mut self.reader)
    }

    /// Sends one request and treats a fault as an error.
    ///
    /// # Errors
    ///
    /// Returns [`IpcError::Fault`] when the server answered with a fault.
    pub fn call(&mut self, request: &ControlRequest) -> Result<(), IpcError> {
        match self.send(request)? {
            ControlResponse::Accepted => Ok(()),
            ControlResponse::Fault { message } => Err(IpcError::Fault(message)),
        }
    }

    /// Reads the contract description from the introspection endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`IpcError::NotRunning`] when no instance is listening.
    pub fn describe(identity: &EndpointIdentity) -> Result<ContractDescription, IpcError> {
        let stream = open(&identity.mex_socket_path(), &identity.mex_uri())?;
        read_reply(&mut BufReader::new(stream))
    }

    /// Returns `true` if an instance is listening on `identity`.
    #[must_use]
    pub fn is_running(identity: &EndpointIdentity) -> bool { Self::describe(identity).is_ok() }
}
