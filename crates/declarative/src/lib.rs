//! # Declarative
//!
//! Idempotent reconciliation of database objects.
//!
//! This crate provides the core abstractions for declaring desired state,
//! reading back observed state through a control-plane gateway, and
//! converging with the minimal set of commands.
//!
//! ## Core Concepts
//!
//! - **Driver**: One resource kind (user, tablespace, backup...) and how to
//!   describe, create, modify and delete it
//! - **DesiredState**: What the caller wants for one identity
//! - **ObservedState**: What the control plane reports for that identity
//! - **Reconciler**: Validates, describes, decides and acts for one driver
//! - **ExecutionPlan**: A batch of requests, each bound to its reconciler
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{ApplyContext, DesiredState, Lifecycle, Reconciler, ResourceKind};
//! use orakit::{CliGateway, ConnectionDescriptor};
//!
//! let gateway = CliGateway::new();
//! let reconciler = Reconciler::new(RoleDriver, &gateway);
//!
//! let desired = DesiredState::new(ResourceKind::Role, "app_reader", Lifecycle::Present)
//!     .with_connection(ConnectionDescriptor::local("ORCL"));
//! let result = reconciler.apply(&desired, &ApplyContext::default());
//! println!("changed={} {}", result.changed, result.message);
//! ```
//!
//! ## Decision table
//!
//! | desired | observed | decision |
//! |---------|----------|----------|
//! | present | absent   | create |
//! | present | present  | modify (diffable drivers) or no-op |
//! | absent  | present  | delete |
//! | absent  | absent   | no-op |
//!
//! Operational drivers (backup, restore, startup, shutdown) skip the
//! describe step and always act.

pub mod context;
pub mod driver;
pub mod executor;
pub mod planner;
pub mod reconciler;
pub mod types;

// Re-export main types at crate root
pub use context::{ApplyContext, NoProgress, ProgressCallback};
pub use driver::{Capabilities, Driver, exists_in};
pub use executor::{ExecuteReport, execute};
pub use planner::{ExecutionPlan, PlanEntry};
pub use reconciler::{Reconcile, Reconciler};
pub use types::{
    Attributes, Decision, DesiredState, ExecuteOptions, ExecuteSummary, Lifecycle, ObservedState,
    ReconciliationResult, ResourceKind, Verb,
};
