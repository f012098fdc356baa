//! Request manifests
//!
//! A manifest is either a single request or a batch sharing one connection
//! block:
//!
//! ```toml
//! [connection]
//! sid = "ORCL"
//!
//! [[resources]]
//! kind = "user"
//! name = "scott"
//! attributes = { password = "Tiger_123" }
//! ```
//!
//! Connection blocks layer request over manifest over settings defaults.
//! The target (`sid`/`service_name`) and the credentials (`user`/`password`)
//! each move as a unit, so a request naming a service never inherits a SID.

use anyhow::{Context, Result, bail};
use declarative::{Attributes, DesiredState, Lifecycle, ResourceKind, Verb};
use orakit::{ConnectionDescriptor, ConnectionMode, Secret};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use crate::paths;

/// Connection block as written in a manifest or the settings file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionDoc {
    pub sid: Option<String>,
    pub service_name: Option<String>,
    pub user: Option<String>,
    pub password: Option<Secret>,
    /// File holding the password; the trailing newline is dropped
    pub password_file: Option<String>,
    pub mode: Option<ConnectionMode>,
    pub oracle_home: Option<String>,
    pub oracle_base: Option<String>,
}

impl ConnectionDoc {
    fn has_target(&self) -> bool {
        self.sid.is_some() || self.service_name.is_some()
    }

    fn has_credentials(&self) -> bool {
        self.user.is_some() || self.password.is_some() || self.password_file.is_some()
    }

    /// Layer `self` over `base`.
    pub fn over(&self, base: &Self) -> Self {
        let target = if self.has_target() { self } else { base };
        let creds = if self.has_credentials() { self } else { base };
        Self {
            sid: target.sid.clone(),
            service_name: target.service_name.clone(),
            user: creds.user.clone(),
            password: creds.password.clone(),
            password_file: creds.password_file.clone(),
            mode: self.mode.or(base.mode),
            oracle_home: self.oracle_home.clone().or_else(|| base.oracle_home.clone()),
            oracle_base: self.oracle_base.clone().or_else(|| base.oracle_base.clone()),
        }
    }

    /// Build the descriptor the gateway uses.
    ///
    /// Target conflicts are left for the reconciler to report per request.
    pub fn resolve(&self) -> Result<ConnectionDescriptor> {
        let password = match (&self.password, &self.password_file) {
            (Some(_), Some(_)) => bail!("password and password_file are mutually exclusive"),
            (Some(pw), None) => Some(pw.clone()),
            (None, Some(file)) => Some(read_password_file(file)?),
            (None, None) => None,
        };

        let mut conn = ConnectionDescriptor {
            sid: self.sid.clone(),
            service_name: self.service_name.clone(),
            mode: self.mode.unwrap_or_default(),
            oracle_home: self.oracle_home.as_deref().map(paths::expand),
            oracle_base: self.oracle_base.as_deref().map(paths::expand),
            ..Default::default()
        };
        match (&self.user, password) {
            (Some(user), Some(password)) => {
                conn = conn.with_credentials(user, password);
            }
            (Some(user), None) => {
                log::warn!("Connection user {user} has no password; using local authentication");
            }
            (None, Some(_)) => {
                log::warn!("Connection password given without a user; using local authentication");
            }
            (None, None) => {}
        }
        Ok(conn)
    }
}

fn read_password_file(file: &str) -> Result<Secret> {
    let path = paths::expand(file);
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Could not read password file {}", path.display()))?;
    Ok(Secret::new(content.trim_end_matches(['\r', '\n'])))
}

/// One request as written in a manifest
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestDoc {
    pub kind: ResourceKind,
    #[serde(default)]
    pub name: String,
    pub state: Option<Lifecycle>,
    #[serde(default)]
    pub attributes: Attributes,
    pub connection: Option<ConnectionDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BatchDoc {
    connection: Option<ConnectionDoc>,
    resources: Vec<RequestDoc>,
}

/// State used when a request names none.
pub fn default_lifecycle(kind: ResourceKind) -> Lifecycle {
    if kind.is_operational() {
        Lifecycle::Execute(Verb::Run)
    } else {
        Lifecycle::Present
    }
}

impl RequestDoc {
    /// Turn the document into a desired state, layering its connection over
    /// `base`.
    pub fn into_desired(self, base: &ConnectionDoc) -> Result<DesiredState> {
        let conn_doc = match &self.connection {
            Some(own) => own.over(base),
            None => base.clone(),
        };
        let connection = conn_doc
            .resolve()
            .with_context(|| format!("Invalid connection for {} {}", self.kind, self.name))?;

        // Instance operations are labelled by the SID they act on
        let mut name = self.name;
        if name.is_empty() && matches!(self.kind, ResourceKind::Startup | ResourceKind::Shutdown) {
            name = connection.sid.clone().unwrap_or_default();
        }

        let lifecycle = self.state.unwrap_or_else(|| default_lifecycle(self.kind));
        Ok(DesiredState::new(self.kind, &name, lifecycle)
            .with_attributes(self.attributes)
            .with_connection(connection))
    }
}

/// Parse manifest text into desired states.
pub fn parse(text: &str, json: bool, defaults: &ConnectionDoc) -> Result<Vec<DesiredState>> {
    let value: Value = if json {
        serde_json::from_str(text).context("Invalid JSON manifest")?
    } else {
        toml::from_str(text).context("Invalid TOML manifest")?
    };

    if value.get("resources").is_some() {
        let batch: BatchDoc = serde_json::from_value(value).context("Invalid manifest")?;
        let base = match &batch.connection {
            Some(conn) => conn.over(defaults),
            None => defaults.clone(),
        };
        batch
            .resources
            .into_iter()
            .map(|doc| doc.into_desired(&base))
            .collect()
    } else {
        let doc: RequestDoc = serde_json::from_value(value).context("Invalid request")?;
        Ok(vec![doc.into_desired(defaults)?])
    }
}

/// Whether `source` is read as JSON: stdin and `.json` files are.
pub fn is_json_source(source: &str) -> bool {
    source == "-"
        || Path::new(source)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Load a manifest from a file, or from stdin when `source` is `-`.
pub fn load(source: &str, defaults: &ConnectionDoc) -> Result<Vec<DesiredState>> {
    let text = if source == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Could not read manifest from stdin")?;
        buf
    } else {
        let path = paths::expand(source);
        fs::read_to_string(&path)
            .with_context(|| format!("Could not read manifest {}", path.display()))?
    };
    parse(&text, is_json_source(source), defaults)
}
