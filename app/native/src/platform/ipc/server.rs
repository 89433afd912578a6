//! The single-instance control server.
//!
//! [`ControlServer`] is a lifecycle unit. Starting it claims the per-user
//! endpoint: an exclusive advisory lock on the identity's lock file, then
//! the contract socket and the introspection socket. If another process holds
//! the lock, start fails with [`IpcError::BindConflict`] so the launcher can
//! hand its request over instead.
//!
//! Each socket gets one accept thread; each connection gets its own worker
//! thread. Workers never touch the UI; accepted work goes through the UI
//! queue. Closing the endpoint disconnects every open connection and joins
//! its worker, so no request is served once the lock is released.

use std::fs::{self, DirBuilder, File, OpenOptions};
use std::io::{self, BufReader, Write};
use std::net::Shutdown;
use std::os::fd::AsRawFd;
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use parking_lot::Mutex;

use super::contract::ControlContract;
use super::error::{IpcError, RequestError};
use super::identity::EndpointIdentity;
use super::middleware::{Handler, dispatcher, fault_for};
use super::protocol::{self, Frame};
use crate::core::constants::endpoint::{MAX_REQUEST_BYTES, READ_TIMEOUT};
use crate::core::constants::startup_order;
use crate::registry::RPC_ENDPOINT;
use crate::services::thread::spawn_named_thread;
use crate::services::{AppContext, LifecycleUnit, ModuleError, ModuleResult};

/// The bound control endpoint, as seen by other units.
pub trait ControlEndpoint: Send + Sync {
    /// Identity the endpoint is bound to.
    fn identity(&self) -> &EndpointIdentity;

    /// Whether the endpoint is currently accepting connections.
    fn is_started(&self) -> bool;
}

/// Shared started flag.
#[derive(Debug, Clone, Default)]
struct ServerStatus(Arc<AtomicBool>);

impl ServerStatus {
    fn set(&self, started: bool) { self.0.store(started, Ordering::SeqCst); }

    fn get(&self) -> bool { self.0.load(Ordering::SeqCst) }
}

/// Handle exported under the `RpcEndpoint` capability.
#[derive(Debug, Clone)]
pub struct EndpointHandle {
    identity: EndpointIdentity,
    status: ServerStatus,
}

impl ControlEndpoint for EndpointHandle {
    fn identity(&self) -> &EndpointIdentity { &self.identity }

    fn is_started(&self) -> bool { self.status.get() }
}

/// Lifecycle unit owning the per-user control endpoint.
#[derive(Debug)]
pub struct ControlServer {
    identity: EndpointIdentity,
    status: ServerStatus,
    running: Option<RunningServer>,
    exported: bool,
}

impl ControlServer {
    /// Creates an unbound server for `identity`.
    #[must_use]
    pub fn new(identity: EndpointIdentity) -> Self {
        Self { identity, status: ServerStatus::default(), running: None, exported: false }
    }

    /// Identity this server binds.
    #[must_use]
    pub const fn identity(&self) -> &EndpointIdentity { &self.identity }

    /// Whether the endpoint is bound and accepting connections.
    #[must_use]
    pub fn is_started(&self) -> bool { self.status.get() }

    /// A handle observing this server.
    #[must_use]
    pub fn handle(&self) -> EndpointHandle {
        EndpointHandle { identity: self.identity.clone(), status: self.status.clone() }
    }

    /// Claims the endpoint and starts serving `handler`.
    ///
    /// Binding an already bound server is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`IpcError::BindConflict`] if another instance holds the
    /// endpoint, or [`IpcError::Bind`] if the sockets could not be created.
    pub fn bind(&mut self, handler: Arc<dyn Handler>) -> Result<(), IpcError> {
        if self.running.is_some() {
            tracing::debug!(endpoint = %self.identity, "control endpoint already bound");
            return Ok(());
        }

        self.running = Some(RunningServer::bind(&self.identity, handler)?);
        self.status.set(true);
        tracing::info!(endpoint = %self.identity, "control endpoint bound");
        Ok(())
    }

    /// Stops serving and releases the endpoint. A no-op when not bound.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket files could not be removed. The lock
    /// is released regardless.
    pub fn close(&mut self) -> Result<(), IpcError> {
        let Some(running) = self.running.take() else {
            return Ok(());
        };
        self.status.set(false);
        running.stop()?;
        tracing::info!(endpoint = %self.identity, "control endpoint released");
        Ok(())
    }
}

impl LifecycleUnit for ControlServer {
    fn name(&self) -> &'static str { "control-server" }

    fn order(&self) -> i32 { startup_order::SERVER }

    fn start(&mut self, ctx: &AppContext) -> ModuleResult<()> {
        self.bind(dispatcher(ControlContract::new(ctx.ui().clone())))?;

        if !self.exported {
            let endpoint: Arc<dyn ControlEndpoint> = Arc::new(self.handle());
            ctx.registry().export(RPC_ENDPOINT, endpoint);
            self.exported = true;
        }
        Ok(())
    }

    fn shutdown(&mut self) -> ModuleResult<()> { self.close().map_err(ModuleError::from) }
}

impl Drop for ControlServer {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            tracing::warn!(endpoint = %self.identity, error = %err, "failed to release control endpoint");
        }
    }
}

/// Resources held while the endpoint is bound.
#[derive(Debug)]
struct RunningServer {
    lock: File,
    stop: Arc<AtomicBool>,
    loops: Vec<AcceptLoop>,
    connections: Arc<Connections>,
}

#[derive(Debug)]
struct AcceptLoop {
    path: PathBuf,
    /// Shares the accept thread's socket, so it can be shut down from here.
    listener: UnixListener,
    thread: JoinHandle<()>,
}

impl AcceptLoop {
    /// Unblocks the pending `accept` so the loop observes the stop flag.
    ///
    /// Returns `false` when the thread could not be woken and must not be joined.
    fn wake(&self) -> bool {
        match UnixStream::connect(&self.path) {
            Ok(_) => return true,
            Err(err) => tracing::debug!(
                socket = %self.path.display(),
                error = %err,
                "wake-up connect failed; shutting the listener down"
            ),
        }

        // SAFETY: the descriptor is owned by `self.listener` and stays open for the call.
        if unsafe { libc::shutdown(self.listener.as_raw_fd(), libc::SHUT_RDWR) } == 0 {
            return true;
        }
        tracing::warn!(
            socket = %self.path.display(),
            error = %io::Error::last_os_error(),
            "could not wake accept thread"
        );
        false
    }

    fn finish(self) {
        if !self.wake() {
            tracing::warn!(socket = %self.path.display(), "detaching accept thread");
            return;
        }
        if self.thread.join().is_err() {
            tracing::warn!(socket = %self.path.display(), "accept thread panicked");
        }
    }
}

/// A served connection and its worker.
#[derive(Debug)]
struct Connection {
    stream: UnixStream,
    thread: JoinHandle<()>,
}

/// Connections open on either socket.
#[derive(Debug, Default)]
struct Connections(Mutex<Vec<Connection>>);

impl Connections {
    fn track(&self, stream: UnixStream, thread: JoinHandle<()>) {
        let mut live = self.0.lock();
        live.retain(|connection| !connection.thread.is_finished());
        live.push(Connection { stream, thread });
    }

    #[cfg(test)]
    fn len(&self) -> usize { self.0.lock().len() }

    /// Disconnects every peer and waits for the workers to return.
    fn close_all(&self) {
        let live = std::mem::take(&mut *self.0.lock());
        for Connection { stream, thread } in live {
            if let Err(err) = stream.shutdown(Shutdown::Both) {
                tracing::debug!(error = %err, "control connection already closed");
            }
            if thread.join().is_err() {
                tracing::warn!("control connection worker panicked");
            }
        }
    }
}

type Serve = Arc<dyn Fn(UnixStream) + Send + Sync>;

impl RunningServer {
    fn bind(identity: &EndpointIdentity, handler: Arc<dyn Handler>) -> Result<Self, IpcError> {
        let endpoint = identity.uri();
        let bind_error = |source: io::Error| IpcError::Bind { endpoint: endpoint.clone(), source };

        DirBuilder::new().recursive(true).mode(0o700).create(identity.dir()).map_err(bind_error)?;
        let lock = acquire_lock(&identity.lock_path(), &endpoint)?;

        // Any socket file left behind belongs to a dead instance; we hold the lock.
        let socket_path = identity.socket_path();
        let mex_path = identity.mex_socket_path();
        remove_socket(&socket_path).map_err(bind_error)?;
        remove_socket(&mex_path).map_err(bind_error)?;

        let listener = UnixListener::bind(&socket_path).map_err(bind_error)?;
        let mex_listener = UnixListener::bind(&mex_path).map_err(bind_error)?;

        let stop = Arc::new(AtomicBool::new(false));
        let connections = Arc::new(Connections::default());
        let mut server = Self {
            lock,
            stop: Arc::clone(&stop),
            loops: Vec::new(),
            connections: Arc::clone(&connections),
        };

        let closing = Arc::clone(&stop);
        let serve: Serve = Arc::new(move |stream| serve_requests(stream, handler.as_ref(), &closing));
        let description = protocol::describe(identity);
        let serve_mex: Serve = Arc::new(move |mut stream| {
            if let Err(err) = protocol::write_frame(&mut stream, &description) {
                tracing::debug!(error = %err, "failed to send contract description");
            }
        });

        let sockets = [
            ("ipc-accept", socket_path.clone(), listener, serve),
            ("ipc-mex", mex_path.clone(), mex_listener, serve_mex),
        ];
        for (name, path, listener, serve) in sockets {
            let stop = Arc::clone(&stop);
            let connections = Arc::clone(&connections);
            let spawned = listener.try_clone().and_then(|handle| {
                spawn_named_thread(name, move || accept_loop(&listener, &stop, &connections, &serve))
                    .map(|thread| (handle, thread))
            });
            match spawned {
                Ok((listener, thread)) => server.loops.push(AcceptLoop { path, listener, thread }),
                Err(err) => {
                    // Unwind what is already running so the lock is not left held.
                    if let Err(stop_err) = server.stop() {
                        tracing::warn!(error = %stop_err, "failed to clean up partial bind");
                    }
                    for path in [&socket_path, &mex_path] {
                        if let Err(rm_err) = remove_socket(path) {
                            tracing::debug!(socket = %path.display(), error = %rm_err, "failed to remove socket");
                        }
                    }
                    return Err(bind_error(err));
                }
            }
        }

        Ok(server)
    }

    fn stop(self) -> Result<(), IpcError> {
        self.stop.store(true, Ordering::SeqCst);

        let mut cleanup: Result<(), IpcError> = Ok(());
        for accept in self.loops {
            let path = accept.path.clone();
            accept.finish();
            if let Err(err) = remove_socket(&path) {
                cleanup = Err(err.into());
            }
        }

        // The accept threads are gone, so no connection can be added past this point.
        self.connections.close_all();
        release_lock(&self.lock);
        cleanup
    }
}

fn acquire_lock(path: &Path, endpoint: &str) -> Result<File, IpcError> {
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .mode(0o600)
        .open(path)
        .map_err(|source| IpcError::Bind { endpoint: endpoint.to_string(), source })?;

    // SAFETY: the descriptor is owned by `file` and stays open for the call.
    let locked = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if locked != 0 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::WouldBlock {
            return Err(IpcError::BindConflict { endpoint: endpoint.to_string() });
        }
        return Err(IpcError::Bind { endpoint: endpoint.to_string(), source: err });
    }

    // The pid is informational only; the lock is what guards the endpoint.
    if let Err(err) = file.set_len(0).and_then(|()| writeln!(file, "{}", std::process::id())) {
        tracing::debug!(error = %err, "failed to record pid in lock file");
    }
    Ok(file)
}

fn release_lock(file: &File) {
    // SAFETY: the descriptor is owned by `file` and stays open for the call.
    if unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_UN) } != 0 {
        tracing::warn!(error = %io::Error::last_os_error(), "failed to unlock control endpoint");
    }
}

fn remove_socket(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

fn accept_loop(listener: &UnixListener, stop: &AtomicBool, connections: &Connections, serve: &Serve) {
    for stream in listener.incoming() {
        if stop.load(Ordering::SeqCst) {
            break;
        }
        match stream {
            Ok(stream) => {
                let tracked = match stream.try_clone() {
                    Ok(tracked) => tracked,
                    Err(err) => {
                        tracing::warn!(error = %err, "dropping control connection");
                        continue;
                    }
                };
                let serve = Arc::clone(serve);
                match spawn_named_thread("ipc-conn", move || serve(stream)) {
                    Ok(thread) => connections.track(tracked, thread),
                    Err(err) => tracing::warn!(error = %err, "dropping control connection"),
                }
            }
            Err(err) => tracing::warn!(error = %err, "failed to accept control connection"),
        }
    }
    tracing::debug!("accept loop stopped");
}

/// Serves requests on one connection until the peer disconnects or the
/// endpoint closes.
fn serve_requests(stream: UnixStream, handler: &dyn Handler, closing: &AtomicBool) {
    if let Err(err) = stream.set_read_timeout(Some(READ_TIMEOUT)) {
        tracing::debug!(error = %err, "failed to set read timeout");
    }
    let mut writer = match stream.try_clone() {
        Ok(writer) => writer,
        Err(err) => {
            tracing::warn!(error = %err, "failed to clone control connection");
            return;
        }
    };
    let mut reader = BufReader::new(stream);

    loop {
        let response = match protocol::read_frame(&mut reader, MAX_REQUEST_BYTES) {
            Ok(Frame::Line(line)) if line.trim().is_empty() => continue,
            Ok(Frame::Line(_)) if closing.load(Ordering::SeqCst) => {
                tracing::debug!("control endpoint closing; dropping request");
                return;
            }
            Ok(Frame::Line(line)) => handler.call(&line),
            Ok(Frame::TooLarge) => {
                let err = RequestError::TooLarge { limit: MAX_REQUEST_BYTES };
                tracing::error!(error = %err, "control request rejected");
                if let Err(write_err) = protocol::write_frame(&mut writer, &fault_for(&err)) {
                    tracing::debug!(error = %write_err, "failed to send control reply");
                }
                return;
            }
            Ok(Frame::Closed) => return,
            Err(err) => {
                tracing::debug!(error = %err, "control connection closed");
                return;
            }
        };

        if let Err(err) = protocol::write_frame(&mut writer, &response) {
            tracing::debug!(error = %err, "failed to send control reply");
            return;
        }
    }
}
