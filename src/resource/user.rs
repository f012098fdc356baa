//! User resource - database accounts with the CONNECT and RESOURCE roles

use declarative::{Capabilities, Driver, Lifecycle, ObservedState, ResourceKind, exists_in};
use orakit::{ExecutionOutcome, Result, Secret, Session};
use serde::Deserialize;

use super::{lookup, require_password};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserSpec {
    pub password: Option<Secret>,
}

pub struct UserDriver;

impl Driver for UserDriver {
    type Spec = UserSpec;

    fn kind(&self) -> ResourceKind {
        ResourceKind::User
    }

    fn noun(&self) -> &'static str {
        "User"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::catalog(false)
    }

    fn validate(&self, identity: &str, lifecycle: Lifecycle, spec: &UserSpec) -> Result<()> {
        if lifecycle == Lifecycle::Present {
            require_password(self.noun(), identity, spec.password.as_ref())?;
        }
        Ok(())
    }

    fn secrets<'a>(&self, spec: &'a UserSpec) -> Vec<&'a Secret> {
        spec.password.iter().collect()
    }

    fn describe(&self, session: &Session, identity: &str, _spec: &UserSpec) -> Result<ObservedState> {
        let rows = session.query(lookup("username", "dba_users", identity))?;
        Ok(exists_in(rows, identity))
    }

    fn create(&self, session: &Session, identity: &str, spec: &UserSpec) -> Result<ExecutionOutcome> {
        let password = require_password(self.noun(), identity, spec.password.as_ref())?;
        // Sent on stdin so the password never lands in a script file
        session.sql(format!(
            "CREATE USER {identity} IDENTIFIED BY \"{}\";\nGRANT CONNECT, RESOURCE TO {identity};",
            password.expose()
        ))
    }

    fn delete(&self, session: &Session, identity: &str, _spec: &UserSpec) -> Result<ExecutionOutcome> {
        session.sql(format!("DROP USER {identity} CASCADE;"))
    }
}
