//! HTTP plumbing shared by every service
//!
//! - `ServerBuilder` assembles health routes, application routes and gates
//! - `maintenance_layer` closes the service during maintenance windows
//! - `auth_layer` runs the configured authentication strategies

pub mod builder;
pub mod guard;
pub mod maintenance;

pub use builder::ServerBuilder;
pub use guard::auth_layer;
pub use maintenance::{MaintenanceGate, maintenance_layer};
