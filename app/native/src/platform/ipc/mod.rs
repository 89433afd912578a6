//! Inter-Process Communication for Glint.
//!
//! One instance per user owns the control endpoint. Later launches connect to
//! it and hand over what they were asked to do instead of starting a second
//! instance.
//!
//! - [`identity`] - Per-user endpoint naming and file locations
//! - [`protocol`] - Request/response contract and line framing
//! - [`middleware`] - Request logging and fault containment
//! - [`contract`] - Contract operations, queued onto the UI thread
//! - [`server`] - The endpoint lifecycle unit
//! - [`client`] - Connecting to a running instance

pub mod client;
pub mod contract;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod protocol;
pub mod server;

pub use client::ControlClient;
pub use contract::ControlContract;
pub use error::{IpcError, RequestError};
pub use identity::EndpointIdentity;
pub use middleware::{ContractService, FaultBoundary, Handler, MessageLog, dispatcher, invoke};
pub use protocol::{ContractDescription, ControlRequest, ControlResponse};
pub use server::{ControlEndpoint, ControlServer, EndpointHandle};
