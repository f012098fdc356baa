//! Schema resource - an owning user with default and temporary tablespaces

use declarative::{Capabilities, Driver, Lifecycle, ObservedState, ResourceKind, exists_in};
use orakit::{ExecutionOutcome, Result, Secret, Session, quote};
use serde::Deserialize;

use super::{lookup, require_password};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaSpec {
    pub password: Option<Secret>,
    pub tablespace: Option<String>,
    pub temp_tablespace: Option<String>,
}

pub struct SchemaDriver;

impl Driver for SchemaDriver {
    type Spec = SchemaSpec;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Schema
    }

    fn noun(&self) -> &'static str {
        "Schema"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::catalog(false)
    }

    fn validate(&self, identity: &str, lifecycle: Lifecycle, spec: &SchemaSpec) -> Result<()> {
        if lifecycle == Lifecycle::Present {
            require_password(self.noun(), identity, spec.password.as_ref())?;
        }
        for tablespace in [&spec.tablespace, &spec.temp_tablespace].into_iter().flatten() {
            quote::identifier(tablespace)?;
        }
        Ok(())
    }

    fn secrets<'a>(&self, spec: &'a SchemaSpec) -> Vec<&'a Secret> {
        spec.password.iter().collect()
    }

    fn describe(&self, session: &Session, identity: &str, _spec: &SchemaSpec) -> Result<ObservedState> {
        let rows = session.query(lookup("username", "dba_users", identity))?;
        Ok(exists_in(rows, identity))
    }

    /// Account and baseline grants go out in one invocation.
    fn create(&self, session: &Session, identity: &str, spec: &SchemaSpec) -> Result<ExecutionOutcome> {
        let password = require_password(self.noun(), identity, spec.password.as_ref())?;
        let mut statement = format!("CREATE USER {identity} IDENTIFIED BY \"{}\"", password.expose());
        if let Some(tablespace) = &spec.tablespace {
            statement.push_str(&format!(" DEFAULT TABLESPACE {}", quote::identifier(tablespace)?));
        }
        if let Some(temp) = &spec.temp_tablespace {
            statement.push_str(&format!(" TEMPORARY TABLESPACE {}", quote::identifier(temp)?));
        }
        session.sql(format!("{statement};\nGRANT CONNECT, RESOURCE TO {identity};"))
    }

    fn delete(&self, session: &Session, identity: &str, _spec: &SchemaSpec) -> Result<ExecutionOutcome> {
        session.sql(format!("DROP USER {identity} CASCADE;"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::request;
    use declarative::{ApplyContext, Reconciler};
    use orakit::{ErrorKind, ScriptedGateway};

    #[test]
    fn test_create_with_tablespaces() {
        let gateway = ScriptedGateway::new();
        let reconciler = Reconciler::new(SchemaDriver, &gateway);
        let desired = request(ResourceKind::Schema, "hr", Lifecycle::Present)
            .with_attribute("password", "Hr_Pass1")
            .with_attribute("tablespace", "users")
            .with_attribute("temp_tablespace", "temp");

        let result = reconciler.apply(&desired, &ApplyContext::default());
        assert!(result.changed);
        assert_eq!(result.message, "Schema HR has been created on the database.");
        assert_eq!(gateway.calls().len(), 2);
        assert_eq!(
            gateway.payloads()[1],
            "CREATE USER HR IDENTIFIED BY \"Hr_Pass1\" DEFAULT TABLESPACE USERS TEMPORARY TABLESPACE TEMP;\nGRANT CONNECT, RESOURCE TO HR;"
        );
    }

    #[test]
    fn test_absent_schema_is_noop() {
        let gateway = ScriptedGateway::new();
        let reconciler = Reconciler::new(SchemaDriver, &gateway);
        let desired = request(ResourceKind::Schema, "hr", Lifecycle::Absent);

        let result = reconciler.apply(&desired, &ApplyContext::default());
        assert!(!result.changed);
        assert_eq!(result.message, "Schema HR does not exist on the database.");
    }

    #[test]
    fn test_bad_tablespace_name() {
        let gateway = ScriptedGateway::new();
        let reconciler = Reconciler::new(SchemaDriver, &gateway);
        let desired = request(ResourceKind::Schema, "hr", Lifecycle::Present)
            .with_attribute("password", "Hr_Pass1")
            .with_attribute("tablespace", "users quota unlimited");

        let result = reconciler.apply(&desired, &ApplyContext::default());
        assert_eq!(result.error, Some(ErrorKind::Validation));
        assert!(gateway.calls().is_empty());
    }
}
