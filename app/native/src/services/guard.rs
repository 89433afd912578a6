//! Panic containment for hooks that must not take their caller down.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Runs `task`, converting a panic into its message.
///
/// # Errors
///
/// Returns the panic payload rendered as text if `task` panicked.
pub fn catch_panic<T>(task: impl FnOnce() -> T) -> Result<T, String> {
    panic::catch_unwind(AssertUnwindSafe(task)).map_err(|payload| panic_message(payload.as_ref()))
}

/// Renders a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
