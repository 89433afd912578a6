//! Common re-exports for convenience.
//!
//! This module provides a prelude that can be imported to get access to
//! commonly used types and traits throughout the application.
//!
//! # Usage
//!
//! ```ignore
//! use crate::core::prelude::*;
//! ```

pub use super::constants::{APP_ID, APP_NAME, APP_VERSION};
pub use super::error::{Error, Result};
pub use crate::registry::{Capability, CapabilityRegistry, Import, Injectable};
pub use crate::services::{AppContext, LifecycleUnit, ModuleError, ModuleResult};
