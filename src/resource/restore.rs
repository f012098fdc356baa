//! Restore resource - RMAN restore of the database or a tablespace
//!
//! Restores contend with other I/O more often than backups do, so they run
//! under a retry policy: a non-zero exit is repeated after a fixed delay.

use declarative::{Attributes, Capabilities, Decision, Driver, Lifecycle, ResourceKind, Verb};
use orakit::{ExecutionOutcome, Result, RetryPolicy, Session};
use serde::Deserialize;

use super::rman;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestoreScope {
    Database,
    Tablespace,
}

impl RestoreScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::Tablespace => "tablespace",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RestoreSpec {
    pub scope: RestoreScope,
    #[serde(default)]
    pub options: Attributes,
}

impl RestoreSpec {
    pub fn command(&self, identity: &str) -> Result<String> {
        let target = match self.scope {
            RestoreScope::Database => "DATABASE".to_string(),
            RestoreScope::Tablespace => format!("TABLESPACE {identity}"),
        };
        Ok(format!("RESTORE {target}{};", rman::options(&self.options)?))
    }
}

pub struct RestoreDriver {
    retry: RetryPolicy,
}

impl RestoreDriver {
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }
}

impl Default for RestoreDriver {
    fn default() -> Self {
        Self::new(RetryPolicy::restore_default())
    }
}

impl Driver for RestoreDriver {
    type Spec = RestoreSpec;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Restore
    }

    fn noun(&self) -> &'static str {
        "Restore"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::operational()
    }

    fn validate(&self, identity: &str, _lifecycle: Lifecycle, spec: &RestoreSpec) -> Result<()> {
        if spec.scope == RestoreScope::Tablespace {
            rman::require_name("restore", spec.scope.as_str(), identity)?;
        }
        spec.command(identity).map(|_| ())
    }

    fn execute(
        &self,
        session: &Session,
        identity: &str,
        spec: &RestoreSpec,
        _verb: Verb,
    ) -> Result<ExecutionOutcome> {
        let command = spec.command(identity)?;
        log::info!(
            "Running {command} (up to {} attempts)",
            self.retry.attempts()
        );
        session.with_retry(self.retry.clone()).rman(command)
    }

    fn message(&self, _identity: &str, spec: &RestoreSpec, _decision: Decision) -> String {
        format!(
            "RMAN restore of type {} has been completed.",
            spec.scope.as_str()
        )
    }
}
