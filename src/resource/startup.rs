//! Startup resource - open an instance in the requested mode

use declarative::{Capabilities, Decision, Driver, Lifecycle, ResourceKind, Verb};
use orakit::{ExecutionOutcome, Result, Session, quote};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartupMode {
    #[default]
    #[serde(alias = "NORMAL")]
    Normal,
    #[serde(alias = "MOUNT")]
    Mount,
    #[serde(alias = "RESTRICT")]
    Restrict,
    #[serde(alias = "FORCE")]
    Force,
}

impl StartupMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Mount => "mount",
            Self::Restrict => "restrict",
            Self::Force => "force",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StartupSpec {
    #[serde(default)]
    pub mode: StartupMode,
    /// Parameter file to start from instead of the default spfile
    pub pfile: Option<String>,
}

impl StartupSpec {
    /// Clauses in the order sqlplus expects them.
    pub fn statement(&self) -> Result<String> {
        let mut statement = String::from("STARTUP");
        if self.mode == StartupMode::Force {
            statement.push_str(" FORCE");
        }
        if self.mode == StartupMode::Restrict {
            statement.push_str(" RESTRICT");
        }
        if let Some(pfile) = &self.pfile {
            let pfile = quote::verbatim("pfile", pfile)?;
            statement.push_str(&format!(" PFILE={}", quote::literal(pfile)));
        }
        if self.mode == StartupMode::Mount {
            statement.push_str(" MOUNT");
        }
        statement.push(';');
        Ok(statement)
    }
}

pub struct StartupDriver;

impl Driver for StartupDriver {
    type Spec = StartupSpec;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Startup
    }

    fn noun(&self) -> &'static str {
        "Instance"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::operational()
    }

    /// SIDs are case-sensitive on the host, so the name is checked but kept as given.
    fn normalize(&self, identity: &str) -> Result<String> {
        quote::identifier(identity)?;
        Ok(identity.trim().to_string())
    }

    fn validate(&self, _identity: &str, _lifecycle: Lifecycle, spec: &StartupSpec) -> Result<()> {
        spec.statement().map(|_| ())
    }

    fn execute(
        &self,
        session: &Session,
        _identity: &str,
        spec: &StartupSpec,
        _verb: Verb,
    ) -> Result<ExecutionOutcome> {
        session.sql(spec.statement()?)
    }

    fn message(&self, identity: &str, spec: &StartupSpec, _decision: Decision) -> String {
        format!(
            "Oracle database with SID {identity} started in {} mode.",
            spec.mode.as_str()
        )
    }
}
