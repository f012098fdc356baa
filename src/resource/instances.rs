//! Instance discovery - list running instances from host process state
//!
//! Every instance runs a process monitor named `ora_pmon_<SID>`. Listing
//! never fails: if `ps` cannot run the result is simply empty.

use declarative::{Capabilities, Decision, Driver, ResourceKind, Verb};
use orakit::{ExecutionOutcome, Result, Session};
use regex::Regex;
use serde::Deserialize;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::process::Command;
use std::sync::LazyLock;

static PMON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ora_pmon_(\w+)").expect("pmon pattern is valid"));

/// Instance names in `ps` output, first occurrence wins.
pub fn parse_pmon(listing: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for caps in PMON.captures_iter(listing) {
        let sid = &caps[1];
        if !found.iter().any(|s| s == sid) {
            found.push(sid.to_string());
        }
    }
    found
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstancesSpec {}

pub struct InstancesDriver {
    ps: PathBuf,
}

impl InstancesDriver {
    pub fn new(ps: impl Into<PathBuf>) -> Self {
        Self { ps: ps.into() }
    }

    /// Running instances, or an empty list when the process table is unreadable.
    pub fn list(&self) -> Vec<String> {
        let output = match Command::new(&self.ps).args(["-eo", "args"]).output() {
            Ok(output) => output,
            Err(e) => {
                log::warn!("Failed to run {}: {e}", self.ps.display());
                return Vec::new();
            }
        };
        if !output.status.success() {
            log::warn!(
                "{} exited with {}: {}",
                self.ps.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Vec::new();
        }
        parse_pmon(&String::from_utf8_lossy(&output.stdout))
    }
}

impl Default for InstancesDriver {
    fn default() -> Self {
        Self::new("ps")
    }
}

impl Driver for InstancesDriver {
    type Spec = InstancesSpec;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Instances
    }

    fn noun(&self) -> &'static str {
        "Instances"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            describe: false,
            diffable: false,
            needs_connection: false,
            anonymous: true,
            verbs: &[Verb::Run],
            read_only: true,
        }
    }

    fn execute(
        &self,
        _session: &Session,
        _identity: &str,
        _spec: &InstancesSpec,
        _verb: Verb,
    ) -> Result<ExecutionOutcome> {
        let instances = self.list();
        log::debug!("Found {} running instance(s)", instances.len());
        Ok(ExecutionOutcome::local("ps", instances.join("\n")))
    }

    fn summarize(
        &self,
        _identity: &str,
        _spec: &InstancesSpec,
        _decision: Decision,
        outcome: &ExecutionOutcome,
    ) -> String {
        let instances: Vec<&str> = outcome.rows().collect();
        match instances.len() {
            0 => "No running Oracle databases found".to_string(),
            1 => format!("Found 1 running Oracle database: {}", instances[0]),
            n => format!("Found {n} running Oracle databases: {}", instances.join(", ")),
        }
    }

    fn facts(&self, outcome: &ExecutionOutcome) -> Option<Value> {
        let instances: Vec<&str> = outcome.rows().collect();
        Some(json!({ "instances": instances }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::{ApplyContext, DesiredState, Lifecycle, Reconciler};
    use orakit::ScriptedGateway;

    fn discover(driver: InstancesDriver) -> declarative::ReconciliationResult {
        let gateway = ScriptedGateway::new();
        let reconciler = Reconciler::new(driver, &gateway);
        let desired = DesiredState::new(ResourceKind::Instances, "", Lifecycle::Execute(Verb::Run));
        let result = reconciler.apply(&desired, &ApplyContext::default());
        assert!(gateway.calls().is_empty());
        result
    }

    #[test]
    fn test_parse_pmon_dedups_in_order() {
        let listing = "\
/usr/sbin/sshd -D
ora_pmon_ORCL
ora_pmon_cdb2
grep ora_pmon_ORCL
ora_smon_ORCL
";
        assert_eq!(parse_pmon(listing), ["ORCL", "cdb2"]);
        assert!(parse_pmon("bash\nsshd").is_empty());
    }

    #[test]
    fn test_missing_ps_yields_empty_result() {
        let result = discover(InstancesDriver::new("/nonexistent/oradm-ps"));
        assert!(result.is_success());
        assert!(!result.changed);
        assert_eq!(result.message, "No running Oracle databases found");
        assert_eq!(result.facts, Some(json!({"instances": []})));
    }

    #[cfg(unix)]
    fn fake_ps(dir: &std::path::Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("ps");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn test_lists_running_instances() {
        let dir = tempfile::tempdir().unwrap();
        let ps = fake_ps(dir.path(), "echo ora_pmon_ORCL\necho ora_pmon_TEST\necho ora_pmon_ORCL");

        let result = discover(InstancesDriver::new(ps));
        assert!(!result.changed);
        assert_eq!(result.message, "Found 2 running Oracle databases: ORCL, TEST");
        assert_eq!(result.facts, Some(json!({"instances": ["ORCL", "TEST"]})));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_ps_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let ps = fake_ps(dir.path(), "echo ora_pmon_ORCL\nexit 3");

        let result = discover(InstancesDriver::new(ps));
        assert!(result.is_success());
        assert_eq!(result.message, "No running Oracle databases found");
    }
}
