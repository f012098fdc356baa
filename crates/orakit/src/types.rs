//! Core types shared by the gateway and its callers.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// External control-plane program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Catalog and instance administration through SQL
    Sqlplus,
    /// Backup and recovery manager
    Rman,
}

impl Tool {
    /// Default program name looked up on `PATH`.
    pub fn program(&self) -> &'static str {
        match self {
            Self::Sqlplus => "sqlplus",
            Self::Rman => "rman",
        }
    }

    /// Suffix for transient script files.
    pub fn script_suffix(&self) -> &'static str {
        match self {
            Self::Sqlplus => ".sql",
            Self::Rman => ".rman",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// What to send to the control plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandPayload {
    /// A single command line written straight to the session
    Inline(String),
    /// A multi-statement body written to a transient file and run with `@`
    Script(String),
}

impl CommandPayload {
    pub fn text(&self) -> &str {
        match self {
            Self::Inline(text) | Self::Script(text) => text,
        }
    }

    pub fn is_script(&self) -> bool {
        matches!(self, Self::Script(_))
    }
}

/// Classified result of one invocation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Success,
    /// Process exited non-zero, was killed, or timed out
    ToolError { code: Option<i32>, stderr: String },
    /// Zero exit but the output carries a control-plane error marker
    DomainError { marker: String, detail: String },
}

impl CommandResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn is_tool_error(&self) -> bool {
        matches!(self, Self::ToolError { .. })
    }
}

/// Everything observed about one gateway call.
///
/// Produced once per call; when retries happened, it describes the last
/// attempt and records how many were made. Captured text is already redacted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// Program label ("sqlplus", "rman", or a local action such as "pfile")
    pub program: String,
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub result: CommandResult,
    pub attempts: u32,
}

impl ExecutionOutcome {
    /// Outcome for work done in-process (filesystem drivers).
    pub fn local(program: &str, summary: impl Into<String>) -> Self {
        Self {
            program: program.to_string(),
            status: Some(0),
            stdout: summary.into(),
            stderr: String::new(),
            result: CommandResult::Success,
            attempts: 1,
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_success()
    }

    /// Turn a failed outcome into the matching error, keeping successful
    /// outcomes as they are.
    pub fn into_result(self) -> Result<Self> {
        match &self.result {
            CommandResult::Success => Ok(self),
            CommandResult::ToolError { code, stderr } => Err(Error::Tool {
                program: self.program.clone(),
                code: *code,
                stderr: stderr.clone(),
            }),
            CommandResult::DomainError { marker, detail } => Err(Error::Domain {
                program: self.program.clone(),
                marker: marker.clone(),
                detail: detail.clone(),
            }),
        }
    }

    /// Non-empty trimmed stdout lines.
    pub fn rows(&self) -> impl Iterator<Item = &str> {
        self.stdout.lines().map(str::trim).filter(|l| !l.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(result: CommandResult) -> ExecutionOutcome {
        ExecutionOutcome {
            program: "sqlplus".into(),
            status: Some(0),
            stdout: "  SCOTT \n\n HR\n".into(),
            stderr: String::new(),
            result,
            attempts: 1,
        }
    }

    #[test]
    fn test_into_result_domain() {
        let err = outcome(CommandResult::DomainError {
            marker: "ORA-01920".into(),
            detail: "ORA-01920: user name 'SCOTT' conflicts".into(),
        })
        .into_result()
        .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Domain);
        assert!(err.to_string().contains("ORA-01920"));
    }

    #[test]
    fn test_into_result_tool() {
        let err = outcome(CommandResult::ToolError {
            code: Some(3),
            stderr: "boom".into(),
        })
        .into_result()
        .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Tool);
    }

    #[test]
    fn test_rows_trims_and_skips_blank() {
        let out = outcome(CommandResult::Success);
        assert_eq!(out.rows().collect::<Vec<_>>(), vec!["SCOTT", "HR"]);
    }

    #[test]
    fn test_payload_text() {
        assert_eq!(CommandPayload::Inline("SHUTDOWN ABORT;".into()).text(), "SHUTDOWN ABORT;");
        assert!(CommandPayload::Script("BEGIN NULL; END;\n/".into()).is_script());
    }
}
