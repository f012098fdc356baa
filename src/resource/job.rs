//! Scheduler job resource (`DBMS_SCHEDULER`)
//!
//! An existing job is left alone even when its action or schedule differ
//! from the request; only presence is converged.

use declarative::{Capabilities, Driver, Lifecycle, ObservedState, ResourceKind, exists_in};
use orakit::{Error, ExecutionOutcome, Result, Session, quote};
use serde::Deserialize;

use super::lookup;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    #[default]
    #[serde(alias = "plsql_block")]
    PlsqlBlock,
    #[serde(alias = "stored_procedure")]
    StoredProcedure,
    #[serde(alias = "executable")]
    Executable,
}

impl JobType {
    fn as_str(self) -> &'static str {
        match self {
            Self::PlsqlBlock => "PLSQL_BLOCK",
            Self::StoredProcedure => "STORED_PROCEDURE",
            Self::Executable => "EXECUTABLE",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobSpec {
    pub job_action: Option<String>,
    /// Calendar expression for `repeat_interval`; one-shot when absent
    pub schedule: Option<String>,
    #[serde(default)]
    pub job_type: JobType,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

pub struct JobDriver;

impl Driver for JobDriver {
    type Spec = JobSpec;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Job
    }

    fn noun(&self) -> &'static str {
        "Job"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::catalog(false)
    }

    fn validate(&self, identity: &str, lifecycle: Lifecycle, spec: &JobSpec) -> Result<()> {
        if lifecycle == Lifecycle::Present && spec.job_action.is_none() {
            return Err(Error::config(format!("Job {identity} requires job_action")));
        }
        Ok(())
    }

    fn describe(&self, session: &Session, identity: &str, _spec: &JobSpec) -> Result<ObservedState> {
        let rows = session.query(lookup("job_name", "dba_scheduler_jobs", identity))?;
        Ok(exists_in(rows, identity))
    }

    fn create(&self, session: &Session, identity: &str, spec: &JobSpec) -> Result<ExecutionOutcome> {
        let action = spec
            .job_action
            .as_deref()
            .ok_or_else(|| Error::config(format!("Job {identity} requires job_action")))?;
        let interval = spec
            .schedule
            .as_deref()
            .map_or_else(|| "NULL".to_string(), quote::literal);

        let body = format!(
            "BEGIN\n  DBMS_SCHEDULER.CREATE_JOB(\n    job_name        => {name},\n    job_type        => '{job_type}',\n    job_action      => {action},\n    start_date      => SYSTIMESTAMP,\n    repeat_interval => {interval},\n    enabled         => {enabled});\nEND;\n/\n",
            name = quote::literal(identity),
            job_type = spec.job_type.as_str(),
            action = quote::literal(action),
            enabled = if spec.enabled { "TRUE" } else { "FALSE" },
        );
        session.sql_script(body)
    }

    fn delete(&self, session: &Session, identity: &str, _spec: &JobSpec) -> Result<ExecutionOutcome> {
        session.sql(format!(
            "BEGIN DBMS_SCHEDULER.DROP_JOB({}); END;\n/",
            quote::literal(identity)
        ))
    }
}
