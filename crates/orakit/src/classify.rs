//! Two-tier classification of raw process output.
//!
//! sqlplus and rman can exit zero after failing to do what was asked; the
//! failure only shows up as a marker such as `ORA-01920` in the text. Exit
//! status is checked first, then the text.

use crate::types::CommandResult;
use regex::Regex;
use std::sync::LazyLock;

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:ORA|SP2|RMAN|PLS|TNS)-\d{4,5}\b").expect("marker pattern is valid")
});

/// Classify one attempt from its exit status and captured output.
///
/// `status` is `None` when the process was killed or never produced one.
pub fn classify(status: Option<i32>, stdout: &str, stderr: &str) -> CommandResult {
    if status != Some(0) {
        let stderr = if stderr.trim().is_empty() {
            stdout.trim()
        } else {
            stderr.trim()
        };
        return CommandResult::ToolError {
            code: status,
            stderr: stderr.to_string(),
        };
    }

    match find_marker(stdout).or_else(|| find_marker(stderr)) {
        Some((marker, detail)) => CommandResult::DomainError { marker, detail },
        None => CommandResult::Success,
    }
}

/// Find the first error marker and the line it appears on.
pub fn find_marker(text: &str) -> Option<(String, String)> {
    text.lines().find_map(|line| {
        MARKER
            .find(line)
            .map(|m| (m.as_str().to_string(), line.trim().to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonzero_exit_is_tool_error() {
        let result = classify(Some(1), "", "rman: command not found\n");
        assert_eq!(
            result,
            CommandResult::ToolError {
                code: Some(1),
                stderr: "rman: command not found".into()
            }
        );
    }

    #[test]
    fn test_nonzero_exit_wins_over_marker() {
        let result = classify(Some(1), "ORA-01017: invalid username/password", "");
        assert!(result.is_tool_error());
    }

    #[test]
    fn test_zero_exit_with_marker_is_domain_error() {
        let stdout = "\nCREATE USER SCOTT IDENTIFIED BY ********\n*\nERROR at line 1:\nORA-01920: user name 'SCOTT' conflicts with another user or role name\n";
        match classify(Some(0), stdout, "") {
            CommandResult::DomainError { marker, detail } => {
                assert_eq!(marker, "ORA-01920");
                assert!(detail.starts_with("ORA-01920: user name"));
            }
            other => panic!("expected domain error, got {other:?}"),
        }
    }

    #[test]
    fn test_marker_in_stderr() {
        let result = classify(Some(0), "", "SP2-0310: unable to open file \"x.sql\"");
        assert!(matches!(
            result,
            CommandResult::DomainError { ref marker, .. } if marker == "SP2-0310"
        ));
    }

    #[test]
    fn test_rman_marker() {
        let (marker, _) = find_marker("RMAN-03002: failure of backup command").unwrap();
        assert_eq!(marker, "RMAN-03002");
    }

    #[test]
    fn test_clean_output_is_success() {
        assert_eq!(classify(Some(0), "SCOTT\nHR\n", ""), CommandResult::Success);
    }

    #[test]
    fn test_lookalike_is_not_marker() {
        assert_eq!(
            classify(Some(0), "TORA-1 FLORA-12345x", ""),
            CommandResult::Success
        );
    }

    #[test]
    fn test_killed_process() {
        assert!(classify(None, "", "timed out after 5s").is_tool_error());
    }
}
