//! Gateway that drives the real `sqlplus` and `rman` programs.
//!
//! Credentials travel over the child's stdin, never its argument list.
//! `ORACLE_SID`, `ORACLE_HOME` and `ORACLE_BASE` are set on the spawned
//! command only.

use crate::classify::classify;
use crate::connection::{ConnectionDescriptor, Target};
use crate::error::{Error, Result};
use crate::gateway::{Gateway, Invocation};
use crate::retry::{LogCallback, RetryCallback, with_retry};
use crate::secret::redact;
use crate::types::{CommandPayload, ExecutionOutcome, Tool};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::OnceLock;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;

/// Session settings sent to sqlplus before the payload.
const SQLPLUS_PREAMBLE: &str =
    "SET HEADING OFF FEEDBACK OFF PAGESIZE 0 VERIFY OFF LINESIZE 32767 TRIMSPOOL ON TRIMOUT ON";

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Where to find each program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub sqlplus: PathBuf,
    pub rman: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            sqlplus: PathBuf::from(Tool::Sqlplus.program()),
            rman: PathBuf::from(Tool::Rman.program()),
        }
    }
}

impl ToolPaths {
    pub fn get(&self, tool: Tool) -> &Path {
        match tool {
            Tool::Sqlplus => &self.sqlplus,
            Tool::Rman => &self.rman,
        }
    }
}

/// Host account the database software runs as, checked with `id <user>`
/// before the first spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountCheck {
    pub program: PathBuf,
    pub user: String,
}

impl AccountCheck {
    fn run(&self) -> std::result::Result<(), String> {
        let status = Command::new(&self.program)
            .arg(&self.user)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match status {
            Ok(status) if status.success() => Ok(()),
            Ok(_) => Err(format!(
                "OS account '{}' does not exist on this host",
                self.user
            )),
            Err(e) => Err(format!(
                "Could not check OS account '{}' with {}: {e}",
                self.user,
                self.program.display()
            )),
        }
    }
}

/// Gateway that spawns one process per attempt.
pub struct CliGateway {
    paths: ToolPaths,
    timeout: Option<Duration>,
    scratch_dir: Option<PathBuf>,
    callback: Box<dyn RetryCallback>,
    account: Option<AccountCheck>,
    account_verdict: OnceLock<std::result::Result<(), String>>,
}

impl Default for CliGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl CliGateway {
    pub fn new() -> Self {
        Self {
            paths: ToolPaths::default(),
            timeout: None,
            scratch_dir: None,
            callback: Box::new(LogCallback),
            account: None,
            account_verdict: OnceLock::new(),
        }
    }

    pub fn with_paths(mut self, paths: ToolPaths) -> Self {
        self.paths = paths;
        self
    }

    /// Kill any attempt still running after `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Directory for transient script files (system temp dir by default).
    pub fn with_scratch_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.scratch_dir = dir;
        self
    }

    pub fn with_callback(mut self, callback: Box<dyn RetryCallback>) -> Self {
        self.callback = callback;
        self
    }

    /// Refuse to spawn anything unless the account exists.
    pub fn with_account_check(mut self, check: Option<AccountCheck>) -> Self {
        self.account = check;
        self
    }

    /// Run the account check once; later calls reuse the verdict.
    fn check_account(&self) -> Result<()> {
        let Some(check) = &self.account else {
            return Ok(());
        };
        self.account_verdict
            .get_or_init(|| {
                log::debug!("Checking OS account {}", check.user);
                check.run()
            })
            .clone()
            .map_err(Error::config)
    }

    /// Resolve the executable, preferring `<oracle_home>/bin` for bare names.
    fn program_path(&self, tool: Tool, conn: &ConnectionDescriptor) -> PathBuf {
        let configured = self.paths.get(tool);
        let bare = configured.components().count() == 1;
        match &conn.oracle_home {
            Some(home) if bare => home.join("bin").join(configured),
            _ => configured.to_path_buf(),
        }
    }

    fn write_script(&self, tool: Tool, body: &str) -> Result<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("oradm-").suffix(tool.script_suffix());
        let mut file = match &self.scratch_dir {
            Some(dir) => builder
                .tempfile_in(dir)
                .map_err(|e| Error::from_fs(e, "create a script in", dir))?,
            None => builder.tempfile()?,
        };
        file.write_all(body.as_bytes())?;
        if !body.ends_with('\n') {
            file.write_all(b"\n")?;
        }
        file.flush()?;
        Ok(file)
    }

    fn spawn(
        &self,
        program: &Path,
        tool: Tool,
        conn: &ConnectionDescriptor,
        target: Target<'_>,
        input: &str,
    ) -> Result<RawOutput> {
        let mut cmd = Command::new(program);
        if tool == Tool::Sqlplus {
            cmd.args(["-S", "-L", "/nolog"]);
        }
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        match target {
            Target::Sid(sid) => {
                cmd.env("ORACLE_SID", sid);
            }
            Target::Service(_) => {
                cmd.env_remove("ORACLE_SID");
            }
        }
        if let Some(home) = &conn.oracle_home {
            cmd.env("ORACLE_HOME", home);
        }
        if let Some(base) = &conn.oracle_base {
            cmd.env("ORACLE_BASE", base);
        }

        let mut child = cmd.spawn().map_err(|e| Error::Tool {
            program: tool.program().to_string(),
            code: None,
            stderr: format!("failed to execute {}: {e}", program.display()),
        })?;

        let stdin = child.stdin.take();
        let input = input.to_string();
        let writer = thread::spawn(move || {
            if let Some(mut stdin) = stdin {
                // The child may exit before reading everything
                let _ = stdin.write_all(input.as_bytes());
            }
        });
        let stdout = child.stdout.take().map(|s| thread::spawn(move || drain(s)));
        let stderr = child.stderr.take().map(|s| thread::spawn(move || drain(s)));

        let status = wait_with_deadline(&mut child, self.timeout)?;
        let _ = writer.join();
        let stdout = stdout.and_then(|h| h.join().ok()).unwrap_or_default();
        let mut stderr = stderr.and_then(|h| h.join().ok()).unwrap_or_default();

        let status = match (status, self.timeout) {
            (Some(status), _) => status.code(),
            (None, Some(timeout)) => {
                if !stderr.is_empty() && !stderr.ends_with('\n') {
                    stderr.push('\n');
                }
                stderr.push_str(&format!("timed out after {timeout:?}"));
                None
            }
            (None, None) => None,
        };
        Ok(RawOutput {
            status,
            stdout,
            stderr,
        })
    }
}

struct RawOutput {
    status: Option<i32>,
    stdout: String,
    stderr: String,
}

fn drain(mut source: impl Read) -> String {
    let mut buf = Vec::new();
    let _ = source.read_to_end(&mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Wait for the child, killing it once `timeout` has elapsed.
///
/// Returns `None` when the child was killed.
fn wait_with_deadline(child: &mut Child, timeout: Option<Duration>) -> Result<Option<ExitStatus>> {
    let Some(timeout) = timeout else {
        return Ok(Some(child.wait()?));
    };
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Build everything written to the child's stdin.
fn session_input(
    tool: Tool,
    conn: &ConnectionDescriptor,
    target: Target<'_>,
    payload: &CommandPayload,
    script: Option<&Path>,
) -> String {
    let body = match script {
        Some(path) => format!("@\"{}\"", path.display()),
        None => payload.text().trim_end().to_string(),
    };
    match tool {
        Tool::Sqlplus => format!(
            "CONNECT {}\n{SQLPLUS_PREAMBLE}\n{body}\nEXIT\n",
            conn.connect_string(target)
        ),
        Tool::Rman => {
            let connect = match &conn.credentials {
                Some(_) => format!("CONNECT TARGET '{}'", conn.connect_string(target)),
                None => "CONNECT TARGET /".to_string(),
            };
            format!("{connect}\n{body}\nEXIT;\n")
        }
    }
}

impl Gateway for CliGateway {
    fn execute(
        &self,
        conn: &ConnectionDescriptor,
        invocation: &Invocation,
    ) -> Result<ExecutionOutcome> {
        let target = conn.target()?;
        conn.validate()?;
        self.check_account()?;
        let tool = invocation.tool;
        let secrets = invocation.all_secrets(conn);
        let program = self.program_path(tool, conn);

        // Lives until this function returns; dropping it removes the file
        let script = match &invocation.payload {
            CommandPayload::Script(body) => Some(self.write_script(tool, body)?),
            CommandPayload::Inline(_) => None,
        };
        let input = session_input(
            tool,
            conn,
            target,
            &invocation.payload,
            script.as_ref().map(NamedTempFile::path),
        );

        let max = invocation.retry.attempts();
        with_retry(&invocation.retry, self.callback.as_ref(), |attempt| {
            log::debug!("Running {tool} against {target} (attempt {attempt}/{max})");
            let raw = self.spawn(&program, tool, conn, target, &input)?;
            let stdout = redact(&raw.stdout, &secrets);
            let stderr = redact(&raw.stderr, &secrets);
            log::trace!("{tool} exited with {:?}\n{stdout}{stderr}", raw.status);
            Ok(ExecutionOutcome {
                program: tool.program().to_string(),
                status: raw.status,
                result: classify(raw.status, &stdout, &stderr),
                stdout,
                stderr,
                attempts: attempt,
            })
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::retry::{NoCallback, RetryPolicy};
    use crate::secret::Secret;
    use crate::types::CommandResult;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Writing an executable while another test forks can fail with ETXTBSY
    static SPAWN_LOCK: Mutex<()> = Mutex::new(());

    fn fake_program(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn gateway(dir: &TempDir, sqlplus: PathBuf) -> CliGateway {
        CliGateway::new()
            .with_paths(ToolPaths {
                sqlplus,
                rman: PathBuf::from("/nonexistent/rman"),
            })
            .with_scratch_dir(Some(dir.path().to_path_buf()))
            .with_callback(Box::new(NoCallback))
    }

    fn inline(sql: &str) -> Invocation {
        Invocation::new(Tool::Sqlplus, CommandPayload::Inline(sql.into()))
    }

    #[test]
    fn test_connect_line_goes_to_stdin_not_argv() {
        let _guard = SPAWN_LOCK.lock().unwrap();
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("seen");
        let program = fake_program(
            &dir,
            "sqlplus",
            &format!(
                "echo \"ARGS $*\" > {0}\necho \"SID $ORACLE_SID\" >> {0}\ncat >> {0}",
                log.display()
            ),
        );
        let conn = ConnectionDescriptor::local("ORCL")
            .with_credentials("scott", Secret::new("Tiger_123"));

        let outcome = gateway(&dir, program)
            .execute(&conn, &inline("SELECT 1 FROM dual;"))
            .unwrap();
        assert!(outcome.is_success());

        let seen = fs::read_to_string(&log).unwrap();
        let mut lines = seen.lines();
        assert_eq!(lines.next(), Some("ARGS -S -L /nolog"));
        assert_eq!(lines.next(), Some("SID ORCL"));
        assert_eq!(lines.next(), Some("CONNECT scott/\"Tiger_123\" AS SYSDBA"));
        assert_eq!(lines.next(), Some(SQLPLUS_PREAMBLE));
        assert_eq!(lines.next(), Some("SELECT 1 FROM dual;"));
        assert_eq!(lines.next(), Some("EXIT"));
    }

    #[test]
    fn test_echoed_password_is_redacted() {
        let _guard = SPAWN_LOCK.lock().unwrap();
        let dir = TempDir::new().unwrap();
        let program = fake_program(&dir, "sqlplus", "cat");
        let conn = ConnectionDescriptor::local("ORCL")
            .with_credentials("scott", Secret::new("Tiger_123"));

        let outcome = gateway(&dir, program).execute(&conn, &inline("SELECT 1 FROM dual;")).unwrap();
        assert!(outcome.stdout.contains("CONNECT scott/"));
        assert!(!outcome.stdout.contains("Tiger_123"));
    }

    #[test]
    fn test_script_payload_runs_from_temp_file_and_is_removed() {
        let _guard = SPAWN_LOCK.lock().unwrap();
        let dir = TempDir::new().unwrap();
        let copy = dir.path().join("copy");
        let program = fake_program(
            &dir,
            "sqlplus",
            &format!(
                "while read line; do case \"$line\" in @*) f=${{line#@}}; f=${{f#\\\"}}; f=${{f%\\\"}}; echo \"$f\" > {0}.path; cat \"$f\" > {0};; esac; done\nexit 1",
                copy.display()
            ),
        );
        let conn = ConnectionDescriptor::local("ORCL");
        let invocation = Invocation::new(
            Tool::Sqlplus,
            CommandPayload::Script("BEGIN\n  NULL;\nEND;\n/".into()),
        );

        let outcome = gateway(&dir, program).execute(&conn, &invocation).unwrap();
        assert!(outcome.result.is_tool_error());

        assert_eq!(fs::read_to_string(&copy).unwrap(), "BEGIN\n  NULL;\nEND;\n/\n");
        let script_path = fs::read_to_string(dir.path().join("copy.path")).unwrap();
        let script_path = PathBuf::from(script_path.trim());
        assert!(script_path.starts_with(dir.path()));
        assert!(
            script_path
                .file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("oradm-")
        );
        assert!(!script_path.exists());
    }

    #[test]
    fn test_failing_attempts_are_retried_with_backoff() {
        let _guard = SPAWN_LOCK.lock().unwrap();
        let dir = TempDir::new().unwrap();
        let counter = dir.path().join("count");
        let program = fake_program(
            &dir,
            "sqlplus",
            &format!("echo run >> {}\necho 'network hiccup' >&2\nexit 3", counter.display()),
        );
        let conn = ConnectionDescriptor::local("ORCL");
        let invocation = Invocation {
            retry: RetryPolicy::fixed(3, Duration::from_millis(50)),
            ..inline("SELECT 1 FROM dual;")
        };

        let started = Instant::now();
        let outcome = gateway(&dir, program).execute(&conn, &invocation).unwrap();
        assert!(started.elapsed() >= Duration::from_millis(100));
        assert_eq!(outcome.attempts, 3);
        assert_eq!(
            outcome.result,
            CommandResult::ToolError {
                code: Some(3),
                stderr: "network hiccup".into()
            }
        );
        assert_eq!(fs::read_to_string(&counter).unwrap().lines().count(), 3);
    }

    #[test]
    fn test_marker_with_zero_exit_is_not_retried() {
        let _guard = SPAWN_LOCK.lock().unwrap();
        let dir = TempDir::new().unwrap();
        let counter = dir.path().join("count");
        let program = fake_program(
            &dir,
            "sqlplus",
            &format!(
                "echo run >> {}\necho \"ORA-01918: user 'FOO' does not exist\"",
                counter.display()
            ),
        );
        let conn = ConnectionDescriptor::local("ORCL");
        let invocation = Invocation {
            retry: RetryPolicy::fixed(3, Duration::ZERO),
            ..inline("DROP USER FOO CASCADE;")
        };

        let outcome = gateway(&dir, program).execute(&conn, &invocation).unwrap();
        assert!(matches!(
            outcome.result,
            CommandResult::DomainError { ref marker, .. } if marker == "ORA-01918"
        ));
        assert_eq!(fs::read_to_string(&counter).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_timeout_kills_the_attempt() {
        let _guard = SPAWN_LOCK.lock().unwrap();
        let dir = TempDir::new().unwrap();
        let program = fake_program(&dir, "sqlplus", "exec sleep 5");
        let conn = ConnectionDescriptor::local("ORCL");

        let started = Instant::now();
        let outcome = gateway(&dir, program)
            .with_timeout(Some(Duration::from_millis(200)))
            .execute(&conn, &inline("SELECT 1 FROM dual;"))
            .unwrap();
        assert!(started.elapsed() < Duration::from_secs(4));
        match outcome.result {
            CommandResult::ToolError { code, stderr } => {
                assert_eq!(code, None);
                assert!(stderr.contains("timed out"));
            }
            other => panic!("expected tool error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_program_is_tool_error_without_retry() {
        let dir = TempDir::new().unwrap();
        let conn = ConnectionDescriptor::local("ORCL");
        let invocation = Invocation {
            retry: RetryPolicy::fixed(3, Duration::from_secs(10)),
            ..Invocation::new(Tool::Rman, CommandPayload::Script("RESTORE DATABASE;".into()))
        };

        let started = Instant::now();
        let err = gateway(&dir, PathBuf::from("/nonexistent/sqlplus"))
            .execute(&conn, &invocation)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Tool);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_unresolved_target_spawns_nothing() {
        let _guard = SPAWN_LOCK.lock().unwrap();
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("ran");
        let program = fake_program(&dir, "sqlplus", &format!("touch {}", marker.display()));

        let err = gateway(&dir, program)
            .execute(&ConnectionDescriptor::default(), &inline("SELECT 1 FROM dual;"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(!marker.exists());
    }

    #[test]
    fn test_concurrent_calls_keep_their_own_script_and_sid() {
        let _guard = SPAWN_LOCK.lock().unwrap();
        let dir = TempDir::new().unwrap();
        let program = fake_program(
            &dir,
            "sqlplus",
            &format!(
                "while read line; do case \"$line\" in @*) f=${{line#@}}; f=${{f#\\\"}}; f=${{f%\\\"}}; echo \"$f\" > {0}/seen.$ORACLE_SID; cat \"$f\" >> {0}/seen.$ORACLE_SID;; esac; done\nsleep 0.2",
                dir.path().display()
            ),
        );
        let gateway = gateway(&dir, program);

        thread::scope(|scope| {
            for sid in ["ORCL", "CDB2"] {
                let gateway = &gateway;
                scope.spawn(move || {
                    let invocation = Invocation::new(
                        Tool::Sqlplus,
                        CommandPayload::Script(format!("SELECT '{sid}' FROM dual;")),
                    );
                    let outcome = gateway
                        .execute(&ConnectionDescriptor::local(sid), &invocation)
                        .unwrap();
                    assert!(outcome.is_success(), "{outcome:?}");
                });
            }
        });

        let mut scripts = Vec::new();
        for sid in ["ORCL", "CDB2"] {
            let seen = fs::read_to_string(dir.path().join(format!("seen.{sid}"))).unwrap();
            let mut lines = seen.lines();
            let script = PathBuf::from(lines.next().unwrap());
            assert_eq!(lines.next(), Some(format!("SELECT '{sid}' FROM dual;").as_str()));
            assert!(!script.exists());
            scripts.push(script);
        }
        assert_ne!(scripts[0], scripts[1]);
    }

    #[test]
    fn test_oracle_base_and_home_reach_the_child() {
        let _guard = SPAWN_LOCK.lock().unwrap();
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("env");
        let program = fake_program(
            &dir,
            "sqlplus",
            &format!("echo \"$ORACLE_HOME $ORACLE_BASE\" > {}\ncat > /dev/null", log.display()),
        );
        let mut conn = ConnectionDescriptor::local("ORCL");
        conn.oracle_home = Some(PathBuf::from("/u01/app/oracle/product/19c"));
        conn.oracle_base = Some(PathBuf::from("/u01/app/oracle"));

        gateway(&dir, program)
            .execute(&conn, &inline("SELECT 1 FROM dual;"))
            .unwrap();
        assert_eq!(
            fs::read_to_string(&log).unwrap().trim(),
            "/u01/app/oracle/product/19c /u01/app/oracle"
        );
    }

    #[test]
    fn test_missing_os_account_spawns_nothing() {
        let _guard = SPAWN_LOCK.lock().unwrap();
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("ran");
        let program = fake_program(&dir, "sqlplus", &format!("touch {}", marker.display()));
        let id = fake_program(&dir, "id", "exit 1");

        let err = gateway(&dir, program)
            .with_account_check(Some(AccountCheck {
                program: id,
                user: "oracle".into(),
            }))
            .execute(&ConnectionDescriptor::local("ORCL"), &inline("SELECT 1 FROM dual;"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("'oracle' does not exist"));
        assert!(!marker.exists());
    }

    #[test]
    fn test_os_account_is_checked_once() {
        let _guard = SPAWN_LOCK.lock().unwrap();
        let dir = TempDir::new().unwrap();
        let counter = dir.path().join("checks");
        let program = fake_program(&dir, "sqlplus", "cat > /dev/null");
        let id = fake_program(&dir, "id", &format!("echo \"$1\" >> {}", counter.display()));
        let gateway = gateway(&dir, program).with_account_check(Some(AccountCheck {
            program: id,
            user: "oracle".into(),
        }));

        let conn = ConnectionDescriptor::local("ORCL");
        for _ in 0..2 {
            assert!(gateway.execute(&conn, &inline("SELECT 1 FROM dual;")).unwrap().is_success());
        }
        assert_eq!(fs::read_to_string(&counter).unwrap(), "oracle\n");
    }

    #[test]
    fn test_oracle_home_prefixes_bare_program() {
        let gateway = CliGateway::new();
        let mut conn = ConnectionDescriptor::local("ORCL");
        assert_eq!(gateway.program_path(Tool::Rman, &conn), PathBuf::from("rman"));

        conn.oracle_home = Some(PathBuf::from("/u01/app/oracle/product/19c"));
        assert_eq!(
            gateway.program_path(Tool::Rman, &conn),
            PathBuf::from("/u01/app/oracle/product/19c/bin/rman")
        );

        let pinned = CliGateway::new().with_paths(ToolPaths {
            sqlplus: PathBuf::from("/opt/bin/sqlplus"),
            ..ToolPaths::default()
        });
        assert_eq!(
            pinned.program_path(Tool::Sqlplus, &conn),
            PathBuf::from("/opt/bin/sqlplus")
        );
    }

    #[test]
    fn test_rman_session_input() {
        let conn = ConnectionDescriptor::service("PDB1")
            .with_credentials("backup_admin", Secret::new("Tiger_123"))
            .with_mode(crate::ConnectionMode::Sysbackup);
        let target = conn.target().unwrap();
        let input = session_input(
            Tool::Rman,
            &conn,
            target,
            &CommandPayload::Script(String::new()),
            Some(Path::new("/tmp/oradm-1.rman")),
        );
        assert_eq!(
            input,
            "CONNECT TARGET 'backup_admin/\"Tiger_123\"@PDB1 AS SYSBACKUP'\n@\"/tmp/oradm-1.rman\"\nEXIT;\n"
        );

        let local = ConnectionDescriptor::local("ORCL");
        let input = session_input(
            Tool::Rman,
            &local,
            local.target().unwrap(),
            &CommandPayload::Inline("BACKUP DATABASE;".into()),
            None,
        );
        assert_eq!(input, "CONNECT TARGET /\nBACKUP DATABASE;\nEXIT;\n");
    }
}
