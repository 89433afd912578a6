//! CLI command definitions using Clap.
//!
//! This module defines all CLI commands and their arguments.

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};

use crate::app::Intent;
use crate::config::{self, CaptureConfig};
use crate::core::constants::{APP_ID, APP_VERSION};
use crate::core::{Error, Result};
use crate::platform::ipc::{ControlClient, EndpointIdentity};

/// Glint - screenshot tool with a single running instance per user.
///
/// Run without arguments to start Glint. Passing image files opens them in
/// the running instance, starting one if needed.
#[derive(Parser, Debug)]
#[command(name = "glint")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Image files to open.
    files: Vec<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// Open image files as captures.
    Open {
        /// Image files to open.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Capture the whole screen.
    ///
    /// Whether the cursor is captured follows `capture.includeCursor` in the
    /// configuration unless overridden here.
    Capture {
        /// Include the mouse cursor in the capture.
        #[arg(long, overrides_with = "no_cursor")]
        cursor: bool,

        /// Leave the mouse cursor out of the capture.
        #[arg(long, overrides_with = "cursor")]
        no_cursor: bool,
    },

    /// Stop the running instance.
    Exit,

    /// Show whether an instance is running for this user.
    ///
    /// Prints the control endpoint and, when an instance is running, the
    /// contract it serves.
    Status,

    /// Output Glint configuration JSON Schema.
    ///
    /// Outputs a JSON Schema to stdout that describes the structure of the
    /// Glint configuration file. Can be redirected to a file for use with
    /// editors that support JSON Schema validation.
    Schema,

    /// Generate shell completions.
    ///
    /// Outputs shell completion script to stdout for the specified shell.
    ///
    /// Usage:
    ///   eval "$(glint completions --shell zsh)"
    ///   glint completions --shell fish > ~/.config/fish/completions/glint.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

/// Makes relative paths absolute, so the running instance resolves them the
/// same way this process would.
fn absolute(files: &[PathBuf]) -> Result<Vec<PathBuf>> {
    files.iter().map(|file| std::path::absolute(file).map_err(Error::from)).collect()
}

impl Cli {
    /// Whether the command runs entirely in this process.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(&self.command, Some(Commands::Status | Commands::Schema | Commands::Completions { .. }))
    }

    /// The intent this command line carries, or `None` for commands that
    /// run entirely in this process.
    ///
    /// Flags left unset fall back to `capture`.
    ///
    /// # Errors
    ///
    /// Returns an error if a file path cannot be made absolute.
    pub fn intent(&self, capture: &CaptureConfig) -> Result<Option<Intent>> {
        let intent = match &self.command {
            None if self.files.is_empty() => Intent::Run,
            None => Intent::OpenFiles(absolute(&self.files)?),
            Some(Commands::Open { files }) => Intent::OpenFiles(absolute(files)?),
            Some(Commands::Capture { cursor, no_cursor }) => Intent::Capture {
                include_cursor: match (*cursor, *no_cursor) {
                    (true, _) => true,
                    (_, true) => false,
                    _ => capture.include_cursor,
                },
            },
            Some(Commands::Exit) => Intent::Exit,
            Some(Commands::Status | Commands::Schema | Commands::Completions { .. }) => return Ok(None),
        };
        Ok(Some(intent))
    }

    /// Execute the CLI commands that do not need an instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the command execution fails.
    pub fn execute(&self) -> Result<()> {
        match &self.command {
            Some(Commands::Status) => Self::print_status(&EndpointIdentity::current()),
            Some(Commands::Schema) => println!("{}", config::schema_json()?),
            Some(Commands::Completions { shell }) => Self::print_completions(*shell),
            _ => return Err(Error::invalid_args("this command needs a running instance")),
        }
        Ok(())
    }

    fn print_status(identity: &EndpointIdentity) {
        match ControlClient::describe(identity) {
            Ok(description) => {
                println!("Glint is running at {}", description.endpoint);
                println!("Introspection: {}", description.mex);
                for operation in description.operations {
                    println!("  {}({}) - {}", operation.name, operation.params.join(", "), operation.description);
                }
            }
            Err(err) => {
                tracing::debug!(error = %err, "status probe failed");
                println!("Glint is not running ({identity})");
            }
        }
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, APP_ID, &mut io::stdout());
    }
}
