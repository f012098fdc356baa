//! # orakit
//!
//! Pure Rust gateway for driving `sqlplus` and `rman`.
//!
//! This crate provides functionality for:
//! - Running SQL and RMAN payloads against a local or remote instance
//! - Classifying output into success, tool failure and domain failure
//! - Retrying transient process failures with backoff
//! - Keeping credentials out of argv, logs and error messages
//! - Escaping identifiers and literals embedded in generated commands
//!
//! ## Example
//!
//! ```no_run
//! use orakit::{CliGateway, ConnectionDescriptor, Session};
//!
//! let gateway = CliGateway::new();
//! let conn = ConnectionDescriptor::local("ORCL");
//! let session = Session::new(&gateway, &conn);
//!
//! let users = session
//!     .query("SELECT username FROM dba_users ORDER BY username;")
//!     .expect("query failed");
//! for user in users {
//!     println!("{user}");
//! }
//! ```
//!
//! ## Retry Logic
//!
//! Attempts that exit non-zero are repeated according to a [`RetryPolicy`].
//! Output carrying an error marker such as `ORA-01920` is final.
//!
//! ```no_run
//! use orakit::{CliGateway, ConnectionDescriptor, RetryPolicy, Session};
//! use std::time::Duration;
//!
//! let gateway = CliGateway::new();
//! let conn = ConnectionDescriptor::local("ORCL");
//! let session = Session::new(&gateway, &conn)
//!     .with_retry(RetryPolicy::fixed(3, Duration::from_secs(10)));
//! session.rman("RESTORE DATABASE;\nRECOVER DATABASE;").unwrap();
//! ```

pub mod classify;
pub mod connection;
pub mod error;
pub mod gateway;
pub mod quote;
pub mod retry;
pub mod secret;
pub mod types;

pub use classify::classify;
pub use connection::{ConnectionDescriptor, ConnectionMode, Credentials, Target};
pub use error::{Error, ErrorKind, Result};
pub use gateway::cli::{AccountCheck, CliGateway, ToolPaths};
pub use gateway::scripted::{RecordedCall, ScriptedGateway, ScriptedResponse};
pub use gateway::{Gateway, Invocation, Session};
pub use retry::{LogCallback, NoCallback, RetryCallback, RetryPolicy, with_retry};
pub use secret::{REDACTED, Secret, redact};
pub use types::{CommandPayload, CommandResult, ExecutionOutcome, Tool};
