//! Integration tests for startup ordering and addon feasibility.
//!
//! ## Test Coverage
//! - Units start in ascending order, ties in registration order
//! - Shutdown runs in reverse start order
//! - A critical failure leaves later units unstarted
//! - Infeasible addons export nothing while the control server still starts
//! - A feasible addon is exported before the control server accepts requests

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::sync::Arc;

use glint_lib::addons::{cloud, office, share};
use glint_lib::app::Application;
use glint_lib::config::GlintConfig;
use glint_lib::core::constants::startup_order;
use glint_lib::platform::ipc::ControlServer;
use glint_lib::registry::{DESTINATION, RPC_ENDPOINT};
use glint_lib::services::{AppContext, LifecycleUnit, ModuleError, ModuleResult, Orchestrator, UnitState};
use parking_lot::Mutex;

use crate::common::*;

type Journal = Arc<Mutex<Vec<String>>>;

struct Probe {
    name: &'static str,
    order: i32,
    critical: bool,
    fail: bool,
    journal: Journal,
}

impl Probe {
    fn boxed(name: &'static str, order: i32, journal: &Journal) -> Box<Self> {
        Box::new(Self { name, order, critical: false, fail: false, journal: Arc::clone(journal) })
    }
}

impl LifecycleUnit for Probe {
    fn name(&self) -> &'static str { self.name }

    fn order(&self) -> i32 { self.order }

    fn is_critical(&self) -> bool { self.critical }

    fn start(&mut self, _ctx: &AppContext) -> ModuleResult<()> {
        self.journal.lock().push(format!("start {}", self.name));
        if self.fail {
            return Err(ModuleError::init_failed(self.name, "refused"));
        }
        Ok(())
    }

    fn shutdown(&mut self) -> ModuleResult<()> {
        self.journal.lock().push(format!("stop {}", self.name));
        Ok(())
    }
}

#[test]
fn test_units_start_by_order_then_registration() {
    let endpoint = Endpoint::new();
    let journal = Journal::default();
    let mut orchestrator = Orchestrator::new();
    orchestrator
        .register(Probe::boxed("A", 5, &journal))
        .register(Probe::boxed("B", 5, &journal))
        .register(Probe::boxed("C", 1, &journal));

    let registry = registry_with(GlintConfig::default(), RecordingCapture::new());
    let mut app = Application::from_parts(registry, orchestrator, endpoint.identity());

    let report = app.start();
    assert_eq!(report.started(), ["C", "A", "B"]);

    app.shutdown();
    assert_eq!(*journal.lock(), ["start C", "start A", "start B", "stop B", "stop A", "stop C"]);
}

#[test]
fn test_critical_failure_stops_later_tiers() {
    let endpoint = Endpoint::new();
    let journal = Journal::default();
    let mut critical = Probe::boxed("gate", 1, &journal);
    critical.critical = true;
    critical.fail = true;

    let mut orchestrator = Orchestrator::new();
    orchestrator.register(critical).register(Probe::boxed("later", 2, &journal));

    let registry = registry_with(GlintConfig::default(), RecordingCapture::new());
    let mut app = Application::from_parts(registry, orchestrator, endpoint.identity());

    let report = app.start();
    assert!(report.aborted());
    assert_eq!(app.state_of("gate"), Some(UnitState::FailedToStart));
    assert_eq!(app.state_of("later"), Some(UnitState::NotStarted));

    app.shutdown();
    assert_eq!(*journal.lock(), ["start gate"]);
}

#[test]
fn test_infeasible_addons_do_not_block_the_server() {
    let endpoint = Endpoint::new();
    let mut orchestrator = Orchestrator::new();
    orchestrator
        .register(Box::new(office::exporter()))
        .register(Box::new(share::exporter()))
        .register(Box::new(cloud::exporter()))
        .register(Box::new(ControlServer::new(endpoint.identity())));

    let registry = registry_with(GlintConfig::default(), RecordingCapture::new());
    let mut app = Application::from_parts(registry, orchestrator, endpoint.identity());

    let report = app.start();
    assert!(report.is_clean());
    assert!(app.registry().resolve(DESTINATION).is_empty());
    assert!(app.registry().resolve_one(RPC_ENDPOINT).unwrap().is_started());
    assert_eq!(report.started().last(), Some(&"control-server"));
    app.shutdown();
}

#[test]
fn test_feasible_addon_is_exported_before_the_server() {
    let endpoint = Endpoint::new();
    let helper = endpoint.path().join("share-helper");
    fs::write(&helper, "#!/bin/sh\n").unwrap();
    fs::set_permissions(&helper, fs::Permissions::from_mode(0o755)).unwrap();

    let mut config = GlintConfig::default();
    config.office.enabled = false;
    config.share.helpers = vec![helper.display().to_string()];

    let journal = Journal::default();
    let mut orchestrator = Orchestrator::new();
    orchestrator
        .register(Box::new(ControlServer::new(endpoint.identity())))
        .register(Box::new(share::exporter()))
        .register(Probe::boxed("between", startup_order::ADDON + 1, &journal));

    let registry = registry_with(config, RecordingCapture::new());
    let mut app = Application::from_parts(registry, orchestrator, endpoint.identity());

    let report = app.start();
    assert_eq!(report.started(), ["share", "between", "control-server"]);

    let designations: Vec<_> =
        app.registry().resolve(DESTINATION).iter().map(|destination| destination.designation()).collect();
    assert_eq!(designations, [share::DESIGNATION]);
    app.shutdown();
}
