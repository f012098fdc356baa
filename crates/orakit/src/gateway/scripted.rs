//! Gateway that replays canned output instead of spawning programs.

use crate::classify::classify;
use crate::connection::ConnectionDescriptor;
use crate::error::Result;
use crate::gateway::{Gateway, Invocation};
use crate::retry::{NoCallback, RetryPolicy, with_retry};
use crate::secret::redact;
use crate::types::{CommandPayload, ExecutionOutcome, Tool};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Raw output of one scripted attempt, classified like real output.
#[derive(Debug, Clone, Default)]
pub struct ScriptedResponse {
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// One attempt seen by the gateway.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub tool: Tool,
    pub payload: CommandPayload,
    /// Resolved target, e.g. `sid=ORCL`
    pub target: String,
    pub attempt: u32,
    pub max_attempts: u32,
}

/// Test double for [`Gateway`].
///
/// Responses are consumed one per attempt in the order they were pushed;
/// once the queue is empty every attempt succeeds with no output. Retries
/// follow the invocation's policy without sleeping.
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    responses: Mutex<VecDeque<ScriptedResponse>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: ScriptedResponse) -> &Self {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(response);
        }
        self
    }

    /// Queue a zero-exit attempt printing `stdout`.
    pub fn push_stdout(&self, stdout: &str) -> &Self {
        self.push(ScriptedResponse {
            status: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        })
    }

    /// Queue a zero-exit attempt printing one line per row.
    pub fn push_rows(&self, rows: &[&str]) -> &Self {
        self.push_stdout(&rows.join("\n"))
    }

    /// Queue a successful attempt with no output.
    pub fn push_ok(&self) -> &Self {
        self.push_stdout("")
    }

    /// Queue an attempt that exits with `code`.
    pub fn push_exit(&self, code: i32, stderr: &str) -> &Self {
        self.push(ScriptedResponse {
            status: Some(code),
            stdout: String::new(),
            stderr: stderr.to_string(),
        })
    }

    /// Every attempt made so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Payload text of every attempt, in order.
    pub fn payloads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|c| c.payload.text().to_string())
            .collect()
    }

    fn next_response(&self) -> ScriptedResponse {
        self.responses
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .unwrap_or(ScriptedResponse {
                status: Some(0),
                ..Default::default()
            })
    }
}

impl Gateway for ScriptedGateway {
    fn execute(
        &self,
        conn: &ConnectionDescriptor,
        invocation: &Invocation,
    ) -> Result<ExecutionOutcome> {
        let target = conn.target()?;
        conn.validate()?;
        let secrets = invocation.all_secrets(conn);

        let policy = RetryPolicy {
            backoff: std::time::Duration::ZERO,
            ..invocation.retry.clone()
        };
        with_retry(&policy, &NoCallback, |attempt| {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(RecordedCall {
                    tool: invocation.tool,
                    payload: invocation.payload.clone(),
                    target: target.to_string(),
                    attempt,
                    max_attempts: policy.attempts(),
                });
            }
            let response = self.next_response();
            let stdout = redact(&response.stdout, &secrets);
            let stderr = redact(&response.stderr, &secrets);
            Ok(ExecutionOutcome {
                program: invocation.tool.program().to_string(),
                status: response.status,
                result: classify(response.status, &stdout, &stderr),
                stdout,
                stderr,
                attempts: attempt,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CommandResult;

    fn invocation(retry: RetryPolicy) -> Invocation {
        Invocation {
            retry,
            ..Invocation::new(Tool::Rman, CommandPayload::Script("RESTORE DATABASE;".into()))
        }
    }

    #[test]
    fn test_replays_in_order() {
        let gateway = ScriptedGateway::new();
        gateway.push_rows(&["A"]).push_exit(1, "boom");
        let conn = ConnectionDescriptor::local("ORCL");

        let first = gateway.execute(&conn, &invocation(RetryPolicy::once())).unwrap();
        assert!(first.is_success());
        let second = gateway.execute(&conn, &invocation(RetryPolicy::once())).unwrap();
        assert!(second.result.is_tool_error());
        assert_eq!(gateway.calls().len(), 2);
        assert_eq!(gateway.calls()[0].target, "sid=ORCL");
    }

    #[test]
    fn test_retries_consume_responses() {
        let gateway = ScriptedGateway::new();
        gateway.push_exit(1, "a").push_exit(1, "b").push_exit(1, "c");
        let conn = ConnectionDescriptor::local("ORCL");

        let outcome = gateway
            .execute(&conn, &invocation(RetryPolicy::restore_default()))
            .unwrap();
        assert_eq!(outcome.attempts, 3);
        assert_eq!(
            outcome.result,
            CommandResult::ToolError {
                code: Some(1),
                stderr: "c".into()
            }
        );
        assert_eq!(gateway.calls().len(), 3);
    }

    #[test]
    fn test_unresolvable_target_records_nothing() {
        let gateway = ScriptedGateway::new();
        let err = gateway
            .execute(&ConnectionDescriptor::default(), &invocation(RetryPolicy::once()))
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Configuration);
        assert!(gateway.calls().is_empty());
    }
}
