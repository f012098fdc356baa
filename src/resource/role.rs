//! Role resource - optional password, privileges granted after creation

use declarative::{Capabilities, Driver, Lifecycle, ObservedState, ResourceKind, exists_in};
use orakit::{ExecutionOutcome, Result, Secret, Session, quote};
use serde::Deserialize;

use super::lookup;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleSpec {
    pub password: Option<Secret>,
    #[serde(default)]
    pub privileges: Vec<String>,
}

pub struct RoleDriver;

impl Driver for RoleDriver {
    type Spec = RoleSpec;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Role
    }

    fn noun(&self) -> &'static str {
        "Role"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::catalog(false)
    }

    fn validate(&self, identity: &str, _lifecycle: Lifecycle, spec: &RoleSpec) -> Result<()> {
        if let Some(password) = &spec.password {
            quote::password(identity, password)?;
        }
        for privilege in &spec.privileges {
            quote::privilege(privilege)?;
        }
        Ok(())
    }

    fn secrets<'a>(&self, spec: &'a RoleSpec) -> Vec<&'a Secret> {
        spec.password.iter().collect()
    }

    fn describe(&self, session: &Session, identity: &str, _spec: &RoleSpec) -> Result<ObservedState> {
        let rows = session.query(lookup("role", "dba_roles", identity))?;
        Ok(exists_in(rows, identity))
    }

    /// Create the role, then grant each privilege with its own call.
    ///
    /// A failed grant leaves the role in place with the grants made so far.
    fn create(&self, session: &Session, identity: &str, spec: &RoleSpec) -> Result<ExecutionOutcome> {
        let statement = match &spec.password {
            Some(password) => format!("CREATE ROLE {identity} IDENTIFIED BY \"{}\";", password.expose()),
            None => format!("CREATE ROLE {identity};"),
        };
        let mut outcome = session.sql(statement)?;

        for privilege in &spec.privileges {
            let privilege = quote::privilege(privilege)?;
            log::debug!("Granting {privilege} to {identity}");
            outcome = session.sql(format!("GRANT {privilege} TO {identity};"))?;
        }
        Ok(outcome)
    }

    fn delete(&self, session: &Session, identity: &str, _spec: &RoleSpec) -> Result<ExecutionOutcome> {
        session.sql(format!("DROP ROLE {identity};"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::request;
    use declarative::{ApplyContext, Reconciler};
    use orakit::{ErrorKind, ScriptedGateway};
    use serde_json::json;

    #[test]
    fn test_create_then_grant_each_privilege() {
        let gateway = ScriptedGateway::new();
        let reconciler = Reconciler::new(RoleDriver, &gateway);
        let desired = request(ResourceKind::Role, "app_reader", Lifecycle::Present)
            .with_attribute("privileges", json!(["create session", "select any table"]));

        let result = reconciler.apply(&desired, &ApplyContext::default());
        assert!(result.changed);
        assert_eq!(result.message, "Role APP_READER has been created on the database.");
        assert_eq!(
            gateway.payloads()[1..],
            [
                "CREATE ROLE APP_READER;",
                "GRANT CREATE SESSION TO APP_READER;",
                "GRANT SELECT ANY TABLE TO APP_READER;",
            ]
        );
    }

    #[test]
    fn test_partial_grant_failure_is_reported() {
        let gateway = ScriptedGateway::new();
        gateway.push_ok().push_ok().push_ok();
        gateway.push_stdout("ORA-01031: insufficient privileges");
        let reconciler = Reconciler::new(RoleDriver, &gateway);
        let desired = request(ResourceKind::Role, "app", Lifecycle::Present)
            .with_attribute("privileges", json!(["create session", "dba", "select any table"]));

        let result = reconciler.apply(&desired, &ApplyContext::default());
        assert_eq!(result.error, Some(ErrorKind::Domain));
        // No further grants and no rollback of the role
        assert_eq!(gateway.calls().len(), 4);
        assert!(!gateway.payloads().iter().any(|p| p.starts_with("DROP")));
    }

    #[test]
    fn test_password_role() {
        let gateway = ScriptedGateway::new();
        let reconciler = Reconciler::new(RoleDriver, &gateway);
        let desired = request(ResourceKind::Role, "secure", Lifecycle::Present)
            .with_attribute("password", "Open_Sesame");

        reconciler.apply(&desired, &ApplyContext::default());
        assert_eq!(
            gateway.payloads()[1],
            "CREATE ROLE SECURE IDENTIFIED BY \"Open_Sesame\";"
        );
    }

    #[test]
    fn test_bad_privilege_rejected_before_any_call() {
        let gateway = ScriptedGateway::new();
        let reconciler = Reconciler::new(RoleDriver, &gateway);
        let desired = request(ResourceKind::Role, "app", Lifecycle::Present)
            .with_attribute("privileges", json!(["dba; drop user sys"]));

        let result = reconciler.apply(&desired, &ApplyContext::default());
        assert_eq!(result.error, Some(ErrorKind::Validation));
        assert!(gateway.calls().is_empty());
    }

    #[test]
    fn test_idempotent_present_and_absent() {
        let gateway = ScriptedGateway::new();
        let reconciler = Reconciler::new(RoleDriver, &gateway);
        let ctx = ApplyContext::default();

        let absent = request(ResourceKind::Role, "ghost", Lifecycle::Absent);
        assert!(!reconciler.apply(&absent, &ctx).changed);

        gateway.push_rows(&["GHOST"]);
        let present = request(ResourceKind::Role, "ghost", Lifecycle::Present);
        let result = reconciler.apply(&present, &ctx);
        assert!(!result.changed);
        assert_eq!(result.message, "Role GHOST already exists on the database.");
    }
}
