//! Resource drivers for every kind oradm manages
//!
//! Catalog objects (users, roles, profiles, schemas, tablespaces, jobs) are
//! described through a `dba_*` view and converged with DDL. Parameter files
//! live on the filesystem. Backup, restore, startup and shutdown always act;
//! instance discovery only reads host process state.

use declarative::{Reconcile, Reconciler, ResourceKind};
use orakit::{Error, Gateway, Result, Secret, quote};
use serde_json::Value;

use crate::config::Settings;

pub mod backup;
pub mod instances;
pub mod job;
pub mod param_file;
pub mod profile;
pub mod restore;
pub mod rman;
pub mod role;
pub mod schema;
pub mod shutdown;
pub mod startup;
pub mod tablespace;
pub mod user;

pub use backup::BackupDriver;
pub use instances::InstancesDriver;
pub use job::JobDriver;
pub use param_file::ParamFileDriver;
pub use profile::ProfileDriver;
pub use restore::RestoreDriver;
pub use role::RoleDriver;
pub use schema::SchemaDriver;
pub use shutdown::ShutdownDriver;
pub use startup::StartupDriver;
pub use tablespace::TablespaceDriver;
pub use user::UserDriver;

/// One reconciler per resource kind, sharing a gateway
pub struct Registry<'g> {
    reconcilers: Vec<Box<dyn Reconcile + 'g>>,
}

impl<'g> Registry<'g> {
    pub fn new(gateway: &'g dyn Gateway, settings: &Settings) -> Self {
        let reconcilers: Vec<Box<dyn Reconcile + 'g>> = vec![
            Box::new(Reconciler::new(UserDriver, gateway)),
            Box::new(Reconciler::new(RoleDriver, gateway)),
            Box::new(Reconciler::new(ProfileDriver, gateway)),
            Box::new(Reconciler::new(SchemaDriver, gateway)),
            Box::new(Reconciler::new(TablespaceDriver, gateway)),
            Box::new(Reconciler::new(JobDriver, gateway)),
            Box::new(Reconciler::new(ParamFileDriver, gateway)),
            Box::new(Reconciler::new(BackupDriver, gateway)),
            Box::new(Reconciler::new(
                RestoreDriver::new(settings.restore_policy()),
                gateway,
            )),
            Box::new(Reconciler::new(StartupDriver, gateway)),
            Box::new(Reconciler::new(ShutdownDriver, gateway)),
            Box::new(Reconciler::new(
                InstancesDriver::new(settings.ps_program()),
                gateway,
            )),
        ];
        Self { reconcilers }
    }

    pub fn get(&self, kind: ResourceKind) -> Option<&dyn Reconcile> {
        self.reconcilers
            .iter()
            .find(|r| r.kind() == kind)
            .map(|r| r.as_ref() as &dyn Reconcile)
    }
}

/// Single-column lookup of `identity` in a catalog view.
///
/// `identity` is already a validated, upper-cased identifier.
pub(crate) fn lookup(column: &str, view: &str, identity: &str) -> String {
    format!(
        "SELECT {column} FROM {view} WHERE {column} = {};",
        quote::literal(identity)
    )
}

/// Password needed to create an account or role, checked against the
/// password policy.
pub(crate) fn require_password<'a>(
    noun: &str,
    identity: &str,
    password: Option<&'a Secret>,
) -> Result<&'a Secret> {
    let password = password.ok_or_else(|| {
        Error::config(format!(
            "A password is required to create {} {identity}",
            noun.to_lowercase()
        ))
    })?;
    quote::password(identity, password)?;
    Ok(password)
}

/// Render a scalar attribute value as command text.
pub(crate) fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Request against a local instance, shared by the driver tests.
#[cfg(test)]
pub(crate) fn request(
    kind: ResourceKind,
    name: &str,
    lifecycle: declarative::Lifecycle,
) -> declarative::DesiredState {
    declarative::DesiredState::new(kind, name, lifecycle)
        .with_connection(orakit::ConnectionDescriptor::local("ORCL"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use orakit::{ErrorKind, ScriptedGateway};

    #[test]
    fn test_registry_covers_every_kind() {
        let gateway = ScriptedGateway::new();
        let settings = Settings::default();
        let registry = Registry::new(&gateway, &settings);
        for kind in ResourceKind::ALL {
            assert_eq!(registry.get(kind).map(|r| r.kind()), Some(kind));
        }
    }

    #[test]
    fn test_lookup_quotes_identity() {
        assert_eq!(
            lookup("role", "dba_roles", "APP_READER"),
            "SELECT role FROM dba_roles WHERE role = 'APP_READER';"
        );
    }

    #[test]
    fn test_require_password() {
        let err = require_password("User", "SCOTT", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(
            err.to_string(),
            "configuration error: A password is required to create user SCOTT"
        );

        let weak = Secret::new("9lives");
        let err = require_password("User", "SCOTT", Some(&weak)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(!err.to_string().contains("9lives"));
    }

    #[test]
    fn test_scalar() {
        assert_eq!(scalar(&Value::from(5)).as_deref(), Some("5"));
        assert_eq!(scalar(&Value::from("10M")).as_deref(), Some("10M"));
        assert_eq!(scalar(&Value::Null), None);
    }
}
