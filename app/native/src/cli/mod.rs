//! Command-line entry point.
//!
//! Every launch first tries to become the running instance. When the control
//! endpoint is already owned by another process, the launch hands its intent
//! over through the endpoint and exits instead.

pub mod commands;

use clap::Parser;

pub use commands::{Cli, Commands};

use crate::app::{Application, Intent};
use crate::config::{self, GlintConfig};
use crate::core::{Error, Result};
use crate::platform::ipc::{ControlClient, EndpointIdentity, IpcError};

/// Parses the command line and runs it.
///
/// # Errors
///
/// Returns an error if the command fails.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    if cli.is_local() {
        return cli.execute();
    }

    let config = config::load_or_default();
    match cli.intent(&config.capture)? {
        Some(intent) => launch(&intent, config),
        None => cli.execute(),
    }
}

/// Runs `intent` in this process, or hands it to the running instance.
///
/// # Errors
///
/// Returns an error if startup fails for a reason other than an existing
/// instance, or if the hand-off fails.
pub fn launch(intent: &Intent, config: GlintConfig) -> Result<()> {
    let identity = EndpointIdentity::current();

    if *intent == Intent::Exit {
        return match hand_off(&identity, intent) {
            Err(Error::Ipc(IpcError::NotRunning { .. })) => {
                println!("Glint is not running.");
                Ok(())
            }
            other => other,
        };
    }

    let mut app = Application::bootstrap(config, identity.clone());
    let report = app.start();

    if let Some(conflict) = report.bind_conflict() {
        tracing::info!(reason = %conflict, "another instance is running; handing over");
        app.shutdown();
        return hand_off(&identity, intent);
    }
    if report.aborted() {
        app.shutdown();
        let reason = report.failures().last().map_or_else(|| "unknown".to_string(), ToString::to_string);
        return Err(Error::other(format!("startup aborted: {reason}")));
    }

    app.dispatch(intent)?;
    app.run()?;
    Ok(())
}

/// Sends `intent` to the instance bound to `identity`.
///
/// # Errors
///
/// Returns [`IpcError::NotRunning`] when nothing is listening and
/// [`IpcError::Fault`] when the instance rejected a request.
pub fn hand_off(identity: &EndpointIdentity, intent: &Intent) -> Result<()> {
    let mut client = ControlClient::connect(identity)?;
    for request in intent.requests() {
        client.call(&request)?;
    }
    tracing::debug!(endpoint = %identity, ?intent, "handed intent to running instance");
    Ok(())
}
