//! Service infrastructure for Glint.
//!
//! This module provides the lifecycle plumbing that every addon and the
//! control server plug into.
//!
//! - [`traits`] - Lifecycle unit trait and errors
//! - [`context`] - Explicit context handed to units
//! - [`orchestrator`] - Ordered startup and shutdown
//! - [`guard`] - Panic containment
//! - [`thread`] - Named thread spawning

pub mod context;
pub mod guard;
pub mod orchestrator;
pub mod thread;
pub mod traits;

pub use context::AppContext;
pub use orchestrator::{Orchestrator, StartupReport, UnitFailure, UnitState};
pub use traits::{LifecycleUnit, ModuleError, ModuleResult};
