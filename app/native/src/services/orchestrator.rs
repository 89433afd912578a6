//! Startup/shutdown orchestration.
//!
//! Runs lifecycle units' start hooks in ascending tier order and their
//! shutdown hooks in reverse, isolating every call so that one failing unit
//! cannot prevent independent units from running.

use std::fmt;

use super::context::AppContext;
use super::guard::catch_panic;
use super::traits::{LifecycleUnit, ModuleError, ModuleResult};
use crate::platform::ipc::IpcError;

/// Lifecycle state of a registered unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    /// Registered, start not attempted yet.
    NotStarted,
    /// Start hook is running.
    Starting,
    /// Start succeeded; shutdown pending.
    Started,
    /// Start failed. Terminal; shutdown is skipped.
    FailedToStart,
    /// Shutdown hook is running.
    ShuttingDown,
    /// Shutdown ran. Terminal.
    Stopped,
}

/// A unit whose hook failed.
#[derive(Debug)]
pub struct UnitFailure {
    /// Unit name.
    pub name: &'static str,
    /// Unit startup tier.
    pub order: i32,
    /// Whether the unit was flagged critical.
    pub critical: bool,
    /// What went wrong.
    pub error: ModuleError,
}

impl fmt::Display for UnitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (order {}): {}", self.name, self.order, self.error)
    }
}

/// Outcome of [`Orchestrator::run_startup`].
#[derive(Debug, Default)]
pub struct StartupReport {
    started: Vec<&'static str>,
    failures: Vec<UnitFailure>,
    aborted: bool,
}

impl StartupReport {
    /// Names of the units that started, in start order.
    #[must_use]
    pub fn started(&self) -> &[&'static str] { &self.started }

    /// Units whose start failed.
    #[must_use]
    pub fn failures(&self) -> &[UnitFailure] { &self.failures }

    /// Whether a critical failure stopped startup early.
    #[must_use]
    pub const fn aborted(&self) -> bool { self.aborted }

    /// Whether every unit started.
    #[must_use]
    pub fn is_clean(&self) -> bool { self.failures.is_empty() }

    /// Returns the bind conflict raised by the control server, if any.
    ///
    /// A conflict means another instance owns the endpoint; the launcher hands
    /// its intent off instead of running a second instance.
    #[must_use]
    pub fn bind_conflict(&self) -> Option<&IpcError> {
        self.failures.iter().find_map(|failure| match &failure.error {
            ModuleError::Ipc(err @ IpcError::BindConflict { .. }) => Some(err),
            _ => None,
        })
    }
}

struct UnitSlot {
    unit: Box<dyn LifecycleUnit>,
    state: UnitState,
}

/// Holds the lifecycle units and sequences their hooks.
#[derive(Default)]
pub struct Orchestrator {
    units: Vec<UnitSlot>,
    /// Indices into `units`, in the order they started.
    start_sequence: Vec<usize>,
}

impl Orchestrator {
    /// Creates an empty orchestrator.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Adds a unit. Units sharing an order keep their registration order.
    pub fn register(&mut self, unit: Box<dyn LifecycleUnit>) -> &mut Self {
        tracing::debug!(unit = unit.name(), order = unit.order(), "registered lifecycle unit");
        self.units.push(UnitSlot { unit, state: UnitState::NotStarted });
        self
    }

    /// Number of registered units.
    #[must_use]
    pub fn len(&self) -> usize { self.units.len() }

    /// Whether no unit is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.units.is_empty() }

    /// Returns the state of the first unit called `name`.
    #[must_use]
    pub fn state_of(&self, name: &str) -> Option<UnitState> {
        self.units.iter().find(|slot| slot.unit.name() == name).map(|slot| slot.state)
    }

    /// Starts every unit in ascending order.
    ///
    /// Tiers run one after another; within a tier units run sequentially in
    /// registration order. A failing unit is logged and skipped. A failing
    /// critical unit stops startup and leaves later units `NotStarted`.
    pub fn run_startup(&mut self, ctx: &AppContext) -> StartupReport {
        let mut sequence: Vec<usize> = (0..self.units.len()).collect();
        sequence.sort_by_key(|&index| self.units[index].unit.order());

        let mut report = StartupReport::default();
        let mut tier = None;

        for index in sequence {
            let slot = &mut self.units[index];
            let name = slot.unit.name();
            let order = slot.unit.order();

            if slot.state != UnitState::NotStarted {
                tracing::warn!(unit = name, state = ?slot.state, "unit already started once; skipping");
                continue;
            }

            if tier != Some(order) {
                tracing::debug!(order, "entering startup tier");
                tier = Some(order);
            }

            slot.state = UnitState::Starting;
            match guarded(name, || slot.unit.start(ctx)) {
                Ok(()) => {
                    slot.state = UnitState::Started;
                    self.start_sequence.push(index);
                    report.started.push(name);
                    tracing::info!(unit = name, order, "started");
                }
                Err(error) => {
                    slot.state = UnitState::FailedToStart;
                    let critical = slot.unit.is_critical();
                    tracing::error!(unit = name, order, critical, error = %error, "failed to start");
                    report.failures.push(UnitFailure { name, order, critical, error });

                    if critical {
                        report.aborted = true;
                        tracing::error!(unit = name, "critical unit failed; aborting startup");
                        break;
                    }
                }
            }
        }

        report
    }

    /// Shuts down every started unit, in reverse start order.
    ///
    /// Each call is isolated; failures are logged and returned without
    /// blocking the remaining shutdowns. Calling this again is a no-op.
    pub fn run_shutdown(&mut self) -> Vec<UnitFailure> {
        let mut failures = Vec::new();

        while let Some(index) = self.start_sequence.pop() {
            let slot = &mut self.units[index];
            let name = slot.unit.name();

            slot.state = UnitState::ShuttingDown;
            let result = guarded(name, || slot.unit.shutdown());
            slot.state = UnitState::Stopped;

            match result {
                Ok(()) => tracing::debug!(unit = name, "stopped"),
                Err(error) => {
                    tracing::error!(unit = name, error = %error, "failed to shut down");
                    failures.push(UnitFailure {
                        name,
                        order: slot.unit.order(),
                        critical: slot.unit.is_critical(),
                        error,
                    });
                }
            }
        }

        failures
    }
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.units.iter().map(|slot| (slot.unit.name(), slot.unit.order(), slot.state)))
            .finish()
    }
}

/// Runs a lifecycle hook, turning a panic into [`ModuleError::Panicked`].
fn guarded(name: &'static str, hook: impl FnOnce() -> ModuleResult<()>) -> ModuleResult<()> {
    catch_panic(hook).unwrap_or_else(|message| Err(ModuleError::panicked(name, message)))
}
