//! Hand-off of UI-affecting work to the single UI-owning thread.
//!
//! Request handlers and other background threads never touch the capture
//! subsystem directly. They queue a [`UiCommand`] through a [`UiDispatcher`],
//! and the one thread that owns the [`UiLoop`] processes the queue in FIFO
//! order.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::capture::ScreenCaptureMode;
use crate::services::guard::catch_panic;

/// Work that must run on the UI thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum UiCommand {
    /// Load an existing image file as a capture.
    CaptureFile { path: PathBuf },
    /// Capture the whole screen.
    CaptureFullscreen { include_cursor: bool, mode: ScreenCaptureMode },
    /// Stop the UI loop so the application can exit.
    Exit,
}

/// Errors raised when queueing UI work.
#[derive(Debug, Error)]
pub enum UiError {
    /// The UI loop has stopped and no longer accepts work.
    #[error("UI thread is no longer accepting work")]
    Closed,
}

/// Thread-safe handle for queueing work onto the UI thread.
#[derive(Debug, Clone)]
pub struct UiDispatcher {
    sender: mpsc::UnboundedSender<UiCommand>,
}

impl UiDispatcher {
    /// Queues `command` for the UI thread and returns immediately.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::Closed`] if the UI loop is gone.
    pub fn run_on(&self, command: UiCommand) -> Result<(), UiError> {
        tracing::trace!(?command, "queueing UI command");
        self.sender.send(command).map_err(|_| UiError::Closed)
    }
}

/// Processes UI commands other than [`UiCommand::Exit`].
pub trait CommandHandler {
    /// Handles one command on the UI thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the command failed; the loop logs it and continues.
    fn handle(&mut self, command: UiCommand) -> crate::core::Result<()>;
}

/// Why the UI loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// An [`UiCommand::Exit`] was processed.
    Requested,
    /// Every dispatcher was dropped.
    Disconnected,
}

/// The receiving end of the UI queue, owned by the UI thread.
#[derive(Debug)]
pub struct UiLoop {
    receiver: mpsc::UnboundedReceiver<UiCommand>,
}

impl UiLoop {
    /// Blocks the current thread, handling commands until exit is requested.
    ///
    /// A failing or panicking command is logged and does not stop the loop.
    /// Must not be called from inside an async runtime.
    pub fn run<H: CommandHandler>(mut self, handler: &mut H) -> LoopExit {
        tracing::debug!("UI loop running");

        while let Some(command) = self.receiver.blocking_recv() {
            if command == UiCommand::Exit {
                tracing::info!("exit requested; stopping UI loop");
                return LoopExit::Requested;
            }
            dispatch(handler, command);
        }

        tracing::debug!("all UI dispatchers dropped; stopping UI loop");
        LoopExit::Disconnected
    }

    /// Handles every command already queued without blocking.
    ///
    /// Returns the number of commands handled, or `None` when an exit request
    /// was reached; commands queued after the exit stay in the queue.
    pub fn drain<H: CommandHandler>(&mut self, handler: &mut H) -> Option<usize> {
        let mut handled = 0;
        while let Ok(command) = self.receiver.try_recv() {
            if command == UiCommand::Exit {
                return None;
            }
            dispatch(handler, command);
            handled += 1;
        }
        Some(handled)
    }
}

fn dispatch<H: CommandHandler>(handler: &mut H, command: UiCommand) {
    let description = format!("{command:?}");
    match catch_panic(|| handler.handle(command)) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => tracing::error!(command = %description, error = %err, "UI command failed"),
        Err(panic) => tracing::error!(command = %description, panic = %panic, "UI command panicked"),
    }
}

/// Creates a connected dispatcher/loop pair.
#[must_use]
pub fn channel() -> (UiDispatcher, UiLoop) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (UiDispatcher { sender }, UiLoop { receiver })
}
