//! TrafficJam Reconciler
//!
//! Declarative management of interfaces, VLAN subinterfaces and VRFs on a
//! TrafficJam network-configuration service. A [`ResourceDescriptor`] states the
//! desired configuration of one resource; the [`Reconciler`] validates it, plans
//! exactly one request against the REST API, guards creations with an existence
//! check and reports whether anything changed.
//!
//! - `model`: per-kind paths, fields, rules and payload layouts
//! - `validate`: consistency checks, first failure wins
//! - `plan`: descriptor to method, URL and payload
//! - `guard`: duplicate scan before POST
//! - `reconciler`: the pipeline and outcome interpretation

pub mod config;
pub mod descriptor;
pub mod error;
pub mod guard;
pub mod model;
pub mod plan;
pub mod reconciler;
pub mod validate;

#[cfg(test)]
mod test_utils;

pub use config::Config;
pub use descriptor::{Connection, DesiredState, Fields, ResourceDescriptor};
pub use error::{ConfigError, DuplicateResourceError, ReconcileError, RemoteOperationError, ValidationError};
pub use model::{ResourceKind, resolve_path};
pub use plan::{ExistenceCheck, RequestPlan, plan};
pub use reconciler::{ReconciliationOutcome, Reconciler, is_success};
pub use validate::validate;
