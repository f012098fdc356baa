//! Shutdown resource - stop an instance

use declarative::{Capabilities, Decision, Driver, ResourceKind, Verb};
use orakit::{ExecutionOutcome, Result, Session, quote};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShutdownMode {
    #[default]
    #[serde(alias = "IMMEDIATE")]
    Immediate,
    #[serde(alias = "NORMAL")]
    Normal,
    #[serde(alias = "TRANSACTIONAL")]
    Transactional,
    #[serde(alias = "ABORT")]
    Abort,
}

impl ShutdownMode {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Immediate => "IMMEDIATE",
            Self::Normal => "NORMAL",
            Self::Transactional => "TRANSACTIONAL",
            Self::Abort => "ABORT",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShutdownSpec {
    #[serde(default)]
    pub mode: ShutdownMode,
    /// Overrides `mode` with `ABORT`
    #[serde(default)]
    pub force: bool,
}

impl ShutdownSpec {
    pub fn effective_mode(&self) -> ShutdownMode {
        if self.force {
            ShutdownMode::Abort
        } else {
            self.mode
        }
    }

    pub fn statement(&self) -> String {
        format!("SHUTDOWN {};", self.effective_mode().keyword())
    }
}

pub struct ShutdownDriver;

impl Driver for ShutdownDriver {
    type Spec = ShutdownSpec;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Shutdown
    }

    fn noun(&self) -> &'static str {
        "Instance"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::operational()
    }

    fn normalize(&self, identity: &str) -> Result<String> {
        quote::identifier(identity)?;
        Ok(identity.trim().to_string())
    }

    fn execute(
        &self,
        session: &Session,
        identity: &str,
        spec: &ShutdownSpec,
        _verb: Verb,
    ) -> Result<ExecutionOutcome> {
        if spec.force {
            log::warn!("Aborting instance {identity}");
        }
        session.sql(spec.statement())
    }

    fn message(&self, identity: &str, spec: &ShutdownSpec, _decision: Decision) -> String {
        format!(
            "Oracle instance {identity} shut down successfully with {} mode.",
            spec.effective_mode().keyword()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::request;
    use declarative::{ApplyContext, Lifecycle, Reconciler};
    use orakit::{ErrorKind, ScriptedGateway, Tool};

    #[test]
    fn test_default_is_immediate() {
        let gateway = ScriptedGateway::new();
        let reconciler = Reconciler::new(ShutdownDriver, &gateway);
        let desired = request(ResourceKind::Shutdown, "ORCL", Lifecycle::Execute(Verb::Run));

        let result = reconciler.apply(&desired, &ApplyContext::default());
        assert!(result.changed);
        assert_eq!(
            result.message,
            "Oracle instance ORCL shut down successfully with IMMEDIATE mode."
        );
        let calls = gateway.calls();
        assert_eq!(calls[0].tool, Tool::Sqlplus);
        assert_eq!(calls[0].payload.text(), "SHUTDOWN IMMEDIATE;");
    }

    #[test]
    fn test_force_overrides_mode() {
        let spec = ShutdownSpec {
            mode: ShutdownMode::Transactional,
            force: true,
        };
        assert_eq!(spec.statement(), "SHUTDOWN ABORT;");
    }

    #[test]
    fn test_modes() {
        let gateway = ScriptedGateway::new();
        let reconciler = Reconciler::new(ShutdownDriver, &gateway);
        for mode in ["normal", "transactional", "abort"] {
            let desired = request(ResourceKind::Shutdown, "ORCL", Lifecycle::Execute(Verb::Run))
                .with_attribute("mode", mode);
            assert!(reconciler.apply(&desired, &ApplyContext::default()).changed);
        }
        assert_eq!(
            gateway.payloads(),
            ["SHUTDOWN NORMAL;", "SHUTDOWN TRANSACTIONAL;", "SHUTDOWN ABORT;"]
        );
    }

    #[test]
    fn test_not_connected_is_domain_error() {
        let gateway = ScriptedGateway::new();
        gateway.push_stdout("ORA-01034: ORACLE not available");
        let reconciler = Reconciler::new(ShutdownDriver, &gateway);
        let desired = request(ResourceKind::Shutdown, "ORCL", Lifecycle::Execute(Verb::Run));

        let result = reconciler.apply(&desired, &ApplyContext::default());
        assert_eq!(result.error, Some(ErrorKind::Domain));
        assert!(!result.changed);
    }
}
