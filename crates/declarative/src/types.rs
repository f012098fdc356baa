//! Core types for declarative reconciliation

use orakit::{ConnectionDescriptor, ErrorKind, Secret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Resource-specific attributes, in document order.
pub type Attributes = Map<String, Value>;

/// Kind of resource a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    User,
    Role,
    Profile,
    Schema,
    Tablespace,
    Job,
    ParamFile,
    Backup,
    Restore,
    Startup,
    Shutdown,
    Instances,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 12] = [
        Self::User,
        Self::Role,
        Self::Profile,
        Self::Schema,
        Self::Tablespace,
        Self::Job,
        Self::ParamFile,
        Self::Backup,
        Self::Restore,
        Self::Startup,
        Self::Shutdown,
        Self::Instances,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Role => "role",
            Self::Profile => "profile",
            Self::Schema => "schema",
            Self::Tablespace => "tablespace",
            Self::Job => "job",
            Self::ParamFile => "param_file",
            Self::Backup => "backup",
            Self::Restore => "restore",
            Self::Startup => "startup",
            Self::Shutdown => "shutdown",
            Self::Instances => "instances",
        }
    }

    /// Operational kinds always act; they have no describe step.
    pub fn is_operational(&self) -> bool {
        matches!(
            self,
            Self::Backup | Self::Restore | Self::Startup | Self::Shutdown | Self::Instances
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown resource kind '{s}'"))
    }
}

/// Explicit action for operational resources and file verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Run,
    Create,
    Modify,
    Delete,
    Convert,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Run => "run",
            Self::Create => "create",
            Self::Modify => "modify",
            Self::Delete => "delete",
            Self::Convert => "convert",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target lifecycle of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lifecycle {
    #[default]
    Present,
    Absent,
    Execute(Verb),
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => f.write_str("present"),
            Self::Absent => f.write_str("absent"),
            Self::Execute(verb) => verb.fmt(f),
        }
    }
}

impl FromStr for Lifecycle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            "run" => Ok(Self::Execute(Verb::Run)),
            "create" => Ok(Self::Execute(Verb::Create)),
            "modify" => Ok(Self::Execute(Verb::Modify)),
            "delete" => Ok(Self::Execute(Verb::Delete)),
            "convert" => Ok(Self::Execute(Verb::Convert)),
            other => Err(format!(
                "unknown state '{other}' (expected present, absent, run, create, modify, delete or convert)"
            )),
        }
    }
}

impl Serialize for Lifecycle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Lifecycle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// What a resource should look like. Built once per request, never mutated.
#[derive(Debug, Clone)]
pub struct DesiredState {
    pub kind: ResourceKind,
    pub identity: String,
    pub lifecycle: Lifecycle,
    pub attributes: Attributes,
    pub connection: ConnectionDescriptor,
}

impl DesiredState {
    pub fn new(kind: ResourceKind, identity: &str, lifecycle: Lifecycle) -> Self {
        Self {
            kind,
            identity: identity.to_string(),
            lifecycle,
            attributes: Attributes::new(),
            connection: ConnectionDescriptor::default(),
        }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_attribute(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    pub fn with_connection(mut self, connection: ConnectionDescriptor) -> Self {
        self.connection = connection;
        self
    }

    /// Label used in progress output and target filters, e.g. `user.SCOTT`.
    pub fn label(&self) -> String {
        if self.identity.is_empty() {
            self.kind.to_string()
        } else {
            format!("{}.{}", self.kind, self.identity)
        }
    }

    /// Credential material carried by the request: the connection password
    /// and any `password` attribute.
    pub fn secrets(&self) -> Vec<Secret> {
        let mut secrets: Vec<Secret> = self.connection.secrets().into_iter().cloned().collect();
        if let Some(Value::String(pw)) = self.attributes.get("password") {
            secrets.push(Secret::new(pw.clone()));
        }
        secrets
    }
}

/// What a describe call read back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservedState {
    pub present: bool,
    /// Attributes the driver could read back; empty when only existence is known
    pub attributes: Attributes,
}

impl ObservedState {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn present() -> Self {
        Self {
            present: true,
            attributes: Attributes::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }
}

/// Action chosen after describing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Nothing to do; `present` records what was observed
    NoOp { present: bool },
    Create,
    Modify,
    Delete,
    Execute(Verb),
}

impl Decision {
    /// Decision table for catalog resources.
    pub fn from_states(lifecycle: Lifecycle, observed: &ObservedState, diffable: bool) -> Self {
        match (lifecycle, observed.present) {
            (Lifecycle::Present, false) => Self::Create,
            (Lifecycle::Present, true) if diffable => Self::Modify,
            (Lifecycle::Present, true) => Self::NoOp { present: true },
            (Lifecycle::Absent, true) => Self::Delete,
            (Lifecycle::Absent, false) => Self::NoOp { present: false },
            (Lifecycle::Execute(verb), _) => Self::Execute(verb),
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp { .. })
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoOp { .. } => f.write_str("no-op"),
            Self::Create => f.write_str("create"),
            Self::Modify => f.write_str("modify"),
            Self::Delete => f.write_str("delete"),
            Self::Execute(verb) => verb.fmt(f),
        }
    }
}

/// Result returned to the caller for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationResult {
    pub changed: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facts: Option<Value>,
}

impl ReconciliationResult {
    pub fn changed(message: impl Into<String>) -> Self {
        Self {
            changed: true,
            message: message.into(),
            error: None,
            facts: None,
        }
    }

    pub fn unchanged(message: impl Into<String>) -> Self {
        Self {
            changed: false,
            ..Self::changed(message)
        }
    }

    pub fn failed(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            changed: false,
            error: Some(kind),
            ..Self::changed(message)
        }
    }

    pub fn with_facts(mut self, facts: Value) -> Self {
        self.facts = Some(facts);
        self
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Summary of execution results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecuteSummary {
    pub changed: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl ExecuteSummary {
    /// Check if execution was fully successful (no failures)
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of requests processed
    pub fn total(&self) -> usize {
        self.changed + self.unchanged + self.failed
    }

    /// Add a result to the summary
    pub fn add_result(&mut self, result: &ReconciliationResult) {
        if !result.is_success() {
            self.failed += 1;
        } else if result.changed {
            self.changed += 1;
        } else {
            self.unchanged += 1;
        }
    }
}

/// Options for execution
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Validate only, make no calls to the control plane
    pub dry_run: bool,
    /// Number of requests reconciled concurrently
    pub jobs: usize,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            jobs: 1,
        }
    }
}
