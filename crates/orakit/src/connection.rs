//! Connection descriptor and target resolution.
//!
//! Target selection travels with the descriptor down to the child process
//! (`ORACLE_SID` is set on the spawned command only), so concurrent
//! reconciliations against different instances never share ambient state.

use crate::error::{Error, Result};
use crate::secret::Secret;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Privilege the session connects with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionMode {
    #[default]
    Sysdba,
    Sysoper,
    Sysbackup,
    Sysdg,
    Syskm,
    /// Plain session, no administrative privilege
    Normal,
}

impl ConnectionMode {
    /// The `AS ...` keyword, or `None` for a plain session.
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            Self::Sysdba => Some("SYSDBA"),
            Self::Sysoper => Some("SYSOPER"),
            Self::Sysbackup => Some("SYSBACKUP"),
            Self::Sysdg => Some("SYSDG"),
            Self::Syskm => Some("SYSKM"),
            Self::Normal => None,
        }
    }
}

/// User/password pair for an authenticated connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: Secret,
}

/// Resolved target identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    /// Local instance selected through `ORACLE_SID`
    Sid(&'a str),
    /// Net service name appended to the connect string
    Service(&'a str),
}

impl fmt::Display for Target<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Sid(sid) => write!(f, "sid={sid}"),
            Target::Service(svc) => write!(f, "service={svc}"),
        }
    }
}

/// Everything needed to reach one database instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    pub sid: Option<String>,
    pub service_name: Option<String>,
    /// Absent means an implicit privileged local connection (`/ AS SYSDBA`)
    pub credentials: Option<Credentials>,
    pub mode: ConnectionMode,
    /// Exported as `ORACLE_HOME` to the child process when set
    pub oracle_home: Option<PathBuf>,
    /// Exported as `ORACLE_BASE` to the child process when set
    pub oracle_base: Option<PathBuf>,
}

impl ConnectionDescriptor {
    /// Local bequeath connection to the instance named `sid`.
    pub fn local(sid: &str) -> Self {
        Self {
            sid: Some(sid.to_string()),
            ..Default::default()
        }
    }

    /// Connection through a net service name.
    pub fn service(service_name: &str) -> Self {
        Self {
            service_name: Some(service_name.to_string()),
            ..Default::default()
        }
    }

    pub fn with_credentials(mut self, user: &str, password: Secret) -> Self {
        self.credentials = Some(Credentials {
            user: user.to_string(),
            password,
        });
        self
    }

    pub fn with_mode(mut self, mode: ConnectionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Resolve the target identifier.
    ///
    /// Exactly one of `sid` and `service_name` must be set; blank values
    /// count as unset.
    pub fn target(&self) -> Result<Target<'_>> {
        let sid = self.sid.as_deref().filter(|s| !s.trim().is_empty());
        let service = self.service_name.as_deref().filter(|s| !s.trim().is_empty());
        match (sid, service) {
            (Some(sid), None) => Ok(Target::Sid(sid)),
            (None, Some(svc)) => Ok(Target::Service(svc)),
            (None, None) => Err(Error::config("Either sid or service_name must be provided")),
            (Some(_), Some(_)) => Err(Error::config(
                "Only one of sid or service_name may be provided",
            )),
        }
    }

    /// Credential material that must never reach logs or messages.
    pub fn secrets(&self) -> Vec<&Secret> {
        self.credentials.iter().map(|c| &c.password).collect()
    }

    /// Check the descriptor can be rendered safely.
    ///
    /// The user name must be a plain identifier and the password must not
    /// contain characters that would break out of its quoted form.
    pub fn validate(&self) -> Result<()> {
        self.target()?;
        if let Some(creds) = &self.credentials {
            crate::quote::identifier(&creds.user)
                .map_err(|_| Error::validation("Connection user is not a valid identifier"))?;
            let pw = creds.password.expose();
            if pw.is_empty() {
                return Err(Error::validation("Connection password must not be empty"));
            }
            if pw.chars().any(|c| c == '"' || c == '\'' || c.is_control()) {
                return Err(Error::validation(
                    "Connection password contains a quote or control character",
                ));
            }
        }
        Ok(())
    }

    /// Build the connect string for a resolved target.
    ///
    /// The result contains the raw password; it is only ever written to the
    /// child's stdin.
    pub fn connect_string(&self, target: Target<'_>) -> String {
        let at = match target {
            Target::Sid(_) => String::new(),
            Target::Service(svc) => format!("@{svc}"),
        };
        let role = self
            .mode
            .keyword()
            .map(|k| format!(" AS {k}"))
            .unwrap_or_default();
        match &self.credentials {
            Some(creds) => format!(
                "{}/\"{}\"{at}{role}",
                creds.user,
                creds.password.expose()
            ),
            None => format!("/{at}{role}"),
        }
    }
}
