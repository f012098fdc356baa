//! Gateway abstraction for control-plane invocations.
//!
//! The [`Gateway`] trait is the single seam through which commands reach
//! sqlplus or rman. [`cli::CliGateway`] spawns the real programs;
//! [`scripted::ScriptedGateway`] replays canned output for tests.

pub mod cli;
pub mod scripted;

use crate::connection::ConnectionDescriptor;
use crate::error::Result;
use crate::retry::RetryPolicy;
use crate::secret::Secret;
use crate::types::{CommandPayload, ExecutionOutcome, Tool};

/// One request to the control plane.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub tool: Tool,
    pub payload: CommandPayload,
    pub retry: RetryPolicy,
    /// Values embedded in the payload that must be scrubbed from captured
    /// output, in addition to the connection password
    pub secrets: Vec<Secret>,
}

impl Invocation {
    pub fn new(tool: Tool, payload: CommandPayload) -> Self {
        Self {
            tool,
            payload,
            retry: RetryPolicy::once(),
            secrets: Vec::new(),
        }
    }

    /// Every secret to scrub: the connection's and the invocation's own.
    pub fn all_secrets<'a>(&'a self, conn: &'a ConnectionDescriptor) -> Vec<&'a Secret> {
        let mut secrets = conn.secrets();
        secrets.extend(self.secrets.iter());
        secrets
    }
}

/// Executes commands against a database instance.
///
/// Implementations resolve the target before anything runs, so a descriptor
/// with neither or both of `sid` and `service_name` fails with a
/// configuration error and no process is spawned. The returned outcome is
/// already classified and redacted; failures are reported in
/// [`ExecutionOutcome::result`] rather than as `Err`. `Err` is reserved for
/// problems that prevented the program from running at all.
pub trait Gateway: Send + Sync {
    fn execute(&self, conn: &ConnectionDescriptor, invocation: &Invocation)
    -> Result<ExecutionOutcome>;
}

/// A gateway bound to one connection, as seen by resource drivers.
#[derive(Clone)]
pub struct Session<'a> {
    gateway: &'a dyn Gateway,
    conn: &'a ConnectionDescriptor,
    retry: RetryPolicy,
    secrets: Vec<Secret>,
}

impl<'a> Session<'a> {
    pub fn new(gateway: &'a dyn Gateway, conn: &'a ConnectionDescriptor) -> Self {
        Self {
            gateway,
            conn,
            retry: RetryPolicy::once(),
            secrets: Vec::new(),
        }
    }

    /// Same session with a different retry policy.
    pub fn with_retry(&self, retry: RetryPolicy) -> Self {
        Self {
            retry,
            ..self.clone()
        }
    }

    /// Same session, additionally scrubbing `secret` from captured output.
    pub fn with_secret(&self, secret: &Secret) -> Self {
        let mut session = self.clone();
        session.secrets.push(secret.clone());
        session
    }

    pub fn connection(&self) -> &ConnectionDescriptor {
        self.conn
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Run a payload and return the outcome whatever its classification.
    pub fn execute(&self, tool: Tool, payload: CommandPayload) -> Result<ExecutionOutcome> {
        let invocation = Invocation {
            tool,
            payload,
            retry: self.retry.clone(),
            secrets: self.secrets.clone(),
        };
        self.gateway.execute(self.conn, &invocation)
    }

    /// Run a payload, turning a failed classification into an error.
    pub fn run(&self, tool: Tool, payload: CommandPayload) -> Result<ExecutionOutcome> {
        self.execute(tool, payload)?.into_result()
    }

    /// Run one SQL statement through sqlplus.
    pub fn sql(&self, statement: impl Into<String>) -> Result<ExecutionOutcome> {
        self.run(Tool::Sqlplus, CommandPayload::Inline(statement.into()))
    }

    /// Run a multi-statement sqlplus script.
    pub fn sql_script(&self, body: impl Into<String>) -> Result<ExecutionOutcome> {
        self.run(Tool::Sqlplus, CommandPayload::Script(body.into()))
    }

    /// Run an rman script.
    pub fn rman(&self, body: impl Into<String>) -> Result<ExecutionOutcome> {
        self.run(Tool::Rman, CommandPayload::Script(body.into()))
    }

    /// Run a query and collect its non-empty output rows.
    pub fn query(&self, sql: impl Into<String>) -> Result<Vec<String>> {
        let outcome = self.sql(sql)?;
        Ok(outcome.rows().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::scripted::ScriptedGateway;

    #[test]
    fn test_query_collects_rows() {
        let gateway = ScriptedGateway::new();
        gateway.push_rows(&["SCOTT", "", "HR"]);
        let conn = ConnectionDescriptor::local("ORCL");
        let session = Session::new(&gateway, &conn);
        assert_eq!(
            session.query("SELECT username FROM dba_users;").unwrap(),
            vec!["SCOTT", "HR"]
        );
    }

    #[test]
    fn test_run_turns_domain_error_into_err() {
        let gateway = ScriptedGateway::new();
        gateway.push_stdout("ORA-00959: tablespace 'TS9' does not exist");
        let conn = ConnectionDescriptor::local("ORCL");
        let session = Session::new(&gateway, &conn);
        let err = session.sql("DROP TABLESPACE TS9;").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Domain);
    }

    #[test]
    fn test_with_secret_scrubs_output() {
        let gateway = ScriptedGateway::new();
        gateway.push_stdout("CREATE USER SCOTT IDENTIFIED BY Tiger_123\nORA-01920: conflict");
        let conn = ConnectionDescriptor::local("ORCL");
        let password = Secret::new("Tiger_123");
        let session = Session::new(&gateway, &conn).with_secret(&password);
        let outcome = session
            .execute(Tool::Sqlplus, CommandPayload::Inline("CREATE USER ...".into()))
            .unwrap();
        assert!(!outcome.stdout.contains("Tiger_123"));
    }

    #[test]
    fn test_with_retry_is_forwarded() {
        let gateway = ScriptedGateway::new();
        let conn = ConnectionDescriptor::local("ORCL");
        let session = Session::new(&gateway, &conn).with_retry(RetryPolicy::restore_default());
        session.rman("RESTORE DATABASE;").unwrap();
        assert_eq!(gateway.calls()[0].max_attempts, 3);
    }
}
