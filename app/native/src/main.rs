#![allow(clippy::multiple_crate_versions)]

//! Glint - screenshot tool with addon destinations.
//!
//! The first launch for a user becomes the running instance. Later launches
//! hand their request (open files, capture, exit) to it and exit.

fn main() {
    glint_lib::logging::init();

    if let Err(err) = glint_lib::cli::run() {
        eprintln!("glint: {err}");
        std::process::exit(1);
    }
}
