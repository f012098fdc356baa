//! Driver trait: the capability set every resource kind implements
//!
//! A driver knows how to read one kind of object back from the control plane
//! and how to build the commands that create, alter or remove it. It holds
//! no state between calls; the reconciler decides which operation to run.

use crate::types::{Attributes, Decision, Lifecycle, ObservedState, ResourceKind, Verb};
use orakit::{Error, ExecutionOutcome, Result, Secret, Session, quote};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// What a driver supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Has a describe step; operational drivers always act
    pub describe: bool,
    /// Present-on-present runs `modify` instead of reporting no-op
    pub diffable: bool,
    /// Requires a resolvable connection target
    pub needs_connection: bool,
    /// Identity may be empty
    pub anonymous: bool,
    /// Verbs accepted as an explicit state
    pub verbs: &'static [Verb],
    /// Never changes anything, so results always report unchanged
    pub read_only: bool,
}

impl Capabilities {
    /// Catalog object on the database: describe, then converge.
    pub const fn catalog(diffable: bool) -> Self {
        Self {
            describe: true,
            diffable,
            needs_connection: true,
            anonymous: false,
            verbs: &[],
            read_only: false,
        }
    }

    /// Operation that always runs when requested.
    pub const fn operational() -> Self {
        Self {
            describe: false,
            diffable: false,
            needs_connection: true,
            anonymous: true,
            verbs: &[Verb::Run],
            read_only: false,
        }
    }

    pub fn accepts(&self, lifecycle: Lifecycle) -> bool {
        match lifecycle {
            Lifecycle::Present | Lifecycle::Absent => self.describe,
            Lifecycle::Execute(verb) => self.verbs.contains(&verb),
        }
    }
}

/// Shared contract implemented by every resource kind.
///
/// Unsupported operations fall back to a configuration error, so a driver
/// only implements what its capabilities declare.
///
/// # Example
///
/// ```ignore
/// struct RoleDriver;
///
/// impl Driver for RoleDriver {
///     type Spec = RoleSpec;
///
///     fn kind(&self) -> ResourceKind { ResourceKind::Role }
///     fn noun(&self) -> &'static str { "Role" }
///     fn capabilities(&self) -> Capabilities { Capabilities::catalog(false) }
///
///     fn describe(&self, session: &Session, name: &str, _: &RoleSpec) -> Result<ObservedState> {
///         let rows = session.query("SELECT role FROM dba_roles;")?;
///         Ok(exists_in(rows, name))
///     }
///     // create / delete ...
/// }
/// ```
pub trait Driver: Send + Sync {
    /// Typed attribute set, checked before any command is built
    type Spec: DeserializeOwned + Send + Sync;

    fn kind(&self) -> ResourceKind;

    /// Human name used in messages ("User", "Tablespace", ...)
    fn noun(&self) -> &'static str;

    fn capabilities(&self) -> Capabilities;

    /// Canonical form of the identity. Catalog names are validated as
    /// unquoted identifiers and upper-cased.
    fn normalize(&self, identity: &str) -> Result<String> {
        quote::identifier(identity)
    }

    /// Parse the open attribute mapping into the typed spec.
    ///
    /// Unknown keys and ill-typed values are validation errors.
    fn parse(&self, attributes: &Attributes) -> Result<Self::Spec> {
        serde_json::from_value(Value::Object(attributes.clone()))
            .map_err(|e| Error::validation(format!("Invalid {} attributes: {e}", self.kind())))
    }

    /// Check cross-field rules that depend on the requested lifecycle.
    fn validate(&self, _identity: &str, _lifecycle: Lifecycle, _spec: &Self::Spec) -> Result<()> {
        Ok(())
    }

    /// Secrets embedded in generated commands, scrubbed from captured output.
    fn secrets<'a>(&self, _spec: &'a Self::Spec) -> Vec<&'a Secret> {
        Vec::new()
    }

    fn describe(&self, _session: &Session, _identity: &str, _spec: &Self::Spec) -> Result<ObservedState> {
        Err(self.unsupported("describe"))
    }

    fn create(&self, _session: &Session, _identity: &str, _spec: &Self::Spec) -> Result<ExecutionOutcome> {
        Err(self.unsupported("create"))
    }

    /// Bring an existing object in line with the desired attributes.
    ///
    /// Returns `None` when every attribute already matches.
    fn modify(
        &self,
        _session: &Session,
        _identity: &str,
        _spec: &Self::Spec,
        _observed: &ObservedState,
    ) -> Result<Option<ExecutionOutcome>> {
        Ok(None)
    }

    fn delete(&self, _session: &Session, _identity: &str, _spec: &Self::Spec) -> Result<ExecutionOutcome> {
        Err(self.unsupported("delete"))
    }

    /// Run an explicit verb.
    fn execute(
        &self,
        _session: &Session,
        _identity: &str,
        _spec: &Self::Spec,
        verb: Verb,
    ) -> Result<ExecutionOutcome> {
        Err(self.unsupported(verb.as_str()))
    }

    /// Message reported for a successful decision.
    fn message(&self, identity: &str, _spec: &Self::Spec, decision: Decision) -> String {
        let noun = self.noun();
        match decision {
            Decision::NoOp { present: true } => format!("{noun} {identity} already exists on the database."),
            Decision::NoOp { present: false } => format!("{noun} {identity} does not exist on the database."),
            Decision::Create => format!("{noun} {identity} has been created on the database."),
            Decision::Modify => format!("{noun} {identity} has been modified on the database."),
            Decision::Delete => format!("{noun} {identity} has been removed from the database."),
            Decision::Execute(verb) => format!("{noun} {identity}: {verb} completed."),
        }
    }

    /// Message for an operation that ran; drivers whose wording depends on
    /// the command output override this.
    fn summarize(
        &self,
        identity: &str,
        spec: &Self::Spec,
        decision: Decision,
        _outcome: &ExecutionOutcome,
    ) -> String {
        self.message(identity, spec, decision)
    }

    /// Structured data attached to a successful result.
    fn facts(&self, _outcome: &ExecutionOutcome) -> Option<Value> {
        None
    }

    /// Configuration error for an operation this driver does not offer.
    fn unsupported(&self, operation: &str) -> Error {
        Error::config(format!("{} does not support {operation}", self.kind()))
    }
}

/// Observed state from a single-column result set, matching `identity`
/// exactly and case-insensitively.
pub fn exists_in<I, S>(rows: I, identity: &str) -> ObservedState
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let found = rows
        .into_iter()
        .any(|row| row.as_ref().trim().eq_ignore_ascii_case(identity));
    if found {
        ObservedState::present()
    } else {
        ObservedState::absent()
    }
}
