//! Backup resource - RMAN backup of the database, archived logs or a tablespace

use declarative::{Attributes, Capabilities, Decision, Driver, Lifecycle, ResourceKind, Verb};
use orakit::{ExecutionOutcome, Result, Session};
use serde::Deserialize;

use super::rman;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupScope {
    Database,
    Archivelog,
    Tablespace,
}

impl BackupScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::Archivelog => "archivelog",
            Self::Tablespace => "tablespace",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackupSpec {
    pub scope: BackupScope,
    #[serde(default)]
    pub options: Attributes,
}

impl BackupSpec {
    /// Full RMAN command for a validated request.
    pub fn command(&self, identity: &str) -> Result<String> {
        let target = match self.scope {
            BackupScope::Database => "DATABASE".to_string(),
            BackupScope::Archivelog => "ARCHIVELOG ALL".to_string(),
            BackupScope::Tablespace => format!("TABLESPACE {identity}"),
        };
        Ok(format!("BACKUP {target}{};", rman::options(&self.options)?))
    }
}

pub struct BackupDriver;

impl Driver for BackupDriver {
    type Spec = BackupSpec;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Backup
    }

    fn noun(&self) -> &'static str {
        "Backup"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::operational()
    }

    fn validate(&self, identity: &str, _lifecycle: Lifecycle, spec: &BackupSpec) -> Result<()> {
        if spec.scope == BackupScope::Tablespace {
            rman::require_name("backup", spec.scope.as_str(), identity)?;
        }
        spec.command(identity).map(|_| ())
    }

    fn execute(
        &self,
        session: &Session,
        identity: &str,
        spec: &BackupSpec,
        _verb: Verb,
    ) -> Result<ExecutionOutcome> {
        let command = spec.command(identity)?;
        log::info!("Running {command}");
        session.rman(command)
    }

    fn message(&self, _identity: &str, spec: &BackupSpec, _decision: Decision) -> String {
        format!("RMAN backup of type {} has been created.", spec.scope.as_str())
    }
}
