//! Parameter file resource (PFILE/SPFILE text form)
//!
//! The identity is the file path. Files hold one `name = value` per line and
//! lines are matched by their leading parameter name, so `db_files` never
//! touches `db_files_limit`. Values are checked against a closed registry
//! before anything is written.

use declarative::{Attributes, Capabilities, Decision, Driver, Lifecycle, ObservedState, ResourceKind, Verb};
use orakit::{Error, ExecutionOutcome, Result, Session};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::paths;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamType {
    Integer,
    Text,
    OneOf(&'static [&'static str]),
}

const REGISTRY: &[(&str, ParamType)] = &[
    ("db_cache_size", ParamType::Integer),
    ("shared_pool_size", ParamType::Integer),
    ("sga_target", ParamType::Integer),
    ("pga_aggregate_target", ParamType::Integer),
    ("processes", ParamType::Integer),
    ("audit_trail", ParamType::OneOf(&["DB", "OS", "NONE"])),
    ("log_archive_format", ParamType::Text),
    ("db_block_size", ParamType::Integer),
    ("db_files", ParamType::Integer),
    ("undo_management", ParamType::OneOf(&["AUTO", "MANUAL"])),
    ("log_buffer", ParamType::Integer),
];

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Check one parameter and return its canonical `(name, value)`.
pub fn validate_parameter(name: &str, value: &Value) -> Result<(String, String)> {
    let Some((canonical, kind)) = REGISTRY
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name.trim()))
    else {
        return Err(Error::validation(format!(
            "Invalid parameter: {name}. This parameter is not recognized."
        )));
    };
    let shown = display(value);

    let rendered = match kind {
        ParamType::Integer => {
            let parsed = match value {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.trim().parse::<u64>().ok(),
                _ => None,
            };
            parsed.map(|n| n.to_string()).ok_or_else(|| {
                Error::validation(format!(
                    "Invalid type for {canonical}: {shown}. Expected integer."
                ))
            })?
        }
        ParamType::OneOf(allowed) => allowed
            .iter()
            .find(|a| a.eq_ignore_ascii_case(shown.trim()))
            .map(|a| (*a).to_string())
            .ok_or_else(|| {
                Error::validation(format!(
                    "Invalid value for {canonical}: {shown}. Allowed values are: {}.",
                    allowed.join(", ")
                ))
            })?,
        ParamType::Text => {
            if !matches!(value, Value::String(_) | Value::Number(_)) {
                return Err(Error::validation(format!(
                    "Invalid type for {canonical}: {shown}. Expected string."
                )));
            }
            if shown.contains(['\n', '\r']) {
                return Err(Error::validation(format!(
                    "Invalid value for {canonical}: line breaks are not allowed."
                )));
            }
            shown
        }
    };
    Ok(((*canonical).to_string(), rendered))
}

/// One `[scope.]name = value` line. `scope` is `*` or an instance SID.
struct ParamLine<'a> {
    scope: Option<&'a str>,
    name: String,
    value: &'a str,
    quote: Option<char>,
}

impl<'a> ParamLine<'a> {
    fn split(line: &'a str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let (name, value) = line.split_once('=')?;
        let (scope, name) = match name.trim().split_once('.') {
            Some((scope, name)) => (Some(scope), name),
            None => (None, name.trim()),
        };
        let value = value.trim();
        let quote = value
            .chars()
            .next()
            .filter(|&c| matches!(c, '\'' | '"') && value.len() > 1 && value.ends_with(c));
        let value = match quote {
            Some(_) => &value[1..value.len() - 1],
            None => value,
        };
        Some(Self {
            scope,
            name: name.trim().to_ascii_lowercase(),
            value,
            quote,
        })
    }

    /// Render `value` for this line, keeping its scope and quoting.
    fn replace(&self, value: &str) -> String {
        let value = match self.quote {
            Some(q) => format!("{q}{value}{q}"),
            None => value.to_string(),
        };
        match self.scope {
            Some(scope) => format!("{scope}.{} = {value}", self.name),
            None => format!("{} = {value}", self.name),
        }
    }
}

/// `(name, unquoted value)` for every parameter line.
fn parse_lines(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .filter_map(ParamLine::split)
        .map(|l| (l.name, l.value.to_string()))
        .collect()
}

/// Whether a file value already satisfies the validated desired value.
fn same_value(name: &str, current: &str, desired: &str) -> bool {
    match REGISTRY.iter().find(|(known, _)| *known == name) {
        Some((_, ParamType::OneOf(_))) => current.trim().eq_ignore_ascii_case(desired),
        _ => current.trim() == desired,
    }
}

fn render(parameters: &[(String, String)]) -> String {
    parameters
        .iter()
        .map(|(name, value)| format!("{name} = {value}\n"))
        .collect()
}

/// Validate every parameter line of a file.
///
/// Returns one message per offending line; quotes around values are ignored.
pub fn check_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| Error::from_fs(e, "read", path))?;
    let mut problems = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let Some(parsed) = ParamLine::split(line) else {
            continue;
        };
        if let Err(err) = validate_parameter(&parsed.name, &Value::String(parsed.value.to_string())) {
            let message = match err {
                Error::Validation { message } => message,
                other => other.to_string(),
            };
            problems.push(format!("line {}: {message}", index + 1));
        }
    }
    Ok(problems)
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawParamFileSpec {
    #[serde(default)]
    parameters: Attributes,
    convert_to: Option<String>,
}

/// Validated parameters in document order
#[derive(Debug, Default, Deserialize)]
#[serde(try_from = "RawParamFileSpec")]
pub struct ParamFileSpec {
    pub parameters: Vec<(String, String)>,
    pub convert_to: Option<PathBuf>,
}

impl TryFrom<RawParamFileSpec> for ParamFileSpec {
    type Error = Error;

    fn try_from(raw: RawParamFileSpec) -> Result<Self> {
        let parameters = raw
            .parameters
            .iter()
            .map(|(name, value)| validate_parameter(name, value))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            parameters,
            convert_to: raw.convert_to.as_deref().map(paths::expand),
        })
    }
}

pub struct ParamFileDriver;

impl ParamFileDriver {
    fn write(path: &Path, parameters: &[(String, String)]) -> Result<ExecutionOutcome> {
        fs::write(path, render(parameters)).map_err(|e| Error::from_fs(e, "create", path))?;
        log::info!("Wrote {} parameters to {}", parameters.len(), path.display());
        Ok(ExecutionOutcome::local(
            "pfile",
            format!("{} parameters written", parameters.len()),
        ))
    }

    /// Replace matching lines in place and append the rest.
    fn rewrite(path: &Path, parameters: &[(String, String)]) -> Result<ExecutionOutcome> {
        let content = fs::read_to_string(path).map_err(|e| Error::from_fs(e, "modify", path))?;
        let mut found = vec![false; parameters.len()];

        let mut lines: Vec<String> = content
            .lines()
            .map(|line| {
                let matched = ParamLine::split(line).and_then(|parsed| {
                    let i = parameters.iter().position(|(p, _)| *p == parsed.name)?;
                    Some((i, parsed))
                });
                match matched {
                    Some((i, parsed)) => {
                        found[i] = true;
                        parsed.replace(&parameters[i].1)
                    }
                    None => line.to_string(),
                }
            })
            .collect();
        for (i, (name, value)) in parameters.iter().enumerate() {
            if !found[i] {
                lines.push(format!("{name} = {value}"));
            }
        }

        let mut updated = lines.join("\n");
        updated.push('\n');
        fs::write(path, updated).map_err(|e| Error::from_fs(e, "modify", path))?;
        log::info!("Updated {} parameters in {}", parameters.len(), path.display());
        Ok(ExecutionOutcome::local(
            "pfile",
            format!("{} parameters updated", parameters.len()),
        ))
    }

    fn remove(path: &Path) -> Result<ExecutionOutcome> {
        fs::remove_file(path).map_err(|e| Error::from_fs(e, "delete", path))?;
        Ok(ExecutionOutcome::local("pfile", "removed"))
    }

    /// Copy the content verbatim to the other representation.
    fn convert(source: &Path, target: &Path) -> Result<ExecutionOutcome> {
        let content = fs::read(source).map_err(|e| Error::from_fs(e, "convert", source))?;
        fs::write(target, content).map_err(|e| Error::from_fs(e, "convert", target))?;
        Ok(ExecutionOutcome::local(
            "pfile",
            format!("converted to {}", target.display()),
        ))
    }
}

impl Driver for ParamFileDriver {
    type Spec = ParamFileSpec;

    fn kind(&self) -> ResourceKind {
        ResourceKind::ParamFile
    }

    fn noun(&self) -> &'static str {
        "Parameter file"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            describe: true,
            diffable: true,
            needs_connection: false,
            anonymous: false,
            verbs: &[Verb::Create, Verb::Modify, Verb::Delete, Verb::Convert],
            read_only: false,
        }
    }

    fn normalize(&self, identity: &str) -> Result<String> {
        Ok(paths::expand(identity.trim()).display().to_string())
    }

    fn validate(&self, _identity: &str, lifecycle: Lifecycle, spec: &ParamFileSpec) -> Result<()> {
        if lifecycle == Lifecycle::Execute(Verb::Convert) && spec.convert_to.is_none() {
            return Err(Error::config("convert requires convert_to"));
        }
        Ok(())
    }

    fn describe(&self, _session: &Session, identity: &str, _spec: &ParamFileSpec) -> Result<ObservedState> {
        let path = Path::new(identity);
        match fs::read_to_string(path) {
            Ok(content) => Ok(parse_lines(&content)
                .into_iter()
                .fold(ObservedState::present(), |observed, (name, value)| {
                    observed.with(&name, value)
                })),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(ObservedState::absent()),
            Err(e) => Err(Error::from_fs(e, "read", path)),
        }
    }

    fn create(&self, _session: &Session, identity: &str, spec: &ParamFileSpec) -> Result<ExecutionOutcome> {
        Self::write(Path::new(identity), &spec.parameters)
    }

    fn modify(
        &self,
        _session: &Session,
        identity: &str,
        spec: &ParamFileSpec,
        observed: &ObservedState,
    ) -> Result<Option<ExecutionOutcome>> {
        let drift: Vec<(String, String)> = spec
            .parameters
            .iter()
            .filter(|(name, value)| {
                !observed
                    .get_str(name)
                    .is_some_and(|current| same_value(name, current, value))
            })
            .cloned()
            .collect();
        if drift.is_empty() {
            return Ok(None);
        }
        Self::rewrite(Path::new(identity), &drift).map(Some)
    }

    fn delete(&self, _session: &Session, identity: &str, _spec: &ParamFileSpec) -> Result<ExecutionOutcome> {
        Self::remove(Path::new(identity))
    }

    fn execute(
        &self,
        _session: &Session,
        identity: &str,
        spec: &ParamFileSpec,
        verb: Verb,
    ) -> Result<ExecutionOutcome> {
        let path = Path::new(identity);
        match verb {
            Verb::Create => Self::write(path, &spec.parameters),
            Verb::Modify => Self::rewrite(path, &spec.parameters),
            Verb::Delete => Self::remove(path),
            Verb::Convert => match &spec.convert_to {
                Some(target) => Self::convert(path, target),
                None => Err(Error::config("convert requires convert_to")),
            },
            Verb::Run => Err(self.unsupported(verb.as_str())),
        }
    }

    fn message(&self, identity: &str, spec: &ParamFileSpec, decision: Decision) -> String {
        match decision {
            Decision::NoOp { present: true } => format!("Parameter file {identity} is up to date."),
            Decision::NoOp { present: false } => format!("Parameter file {identity} does not exist."),
            Decision::Create | Decision::Execute(Verb::Create) => {
                format!("Parameter file {identity} created successfully.")
            }
            Decision::Modify | Decision::Execute(Verb::Modify) => {
                format!("Parameter file {identity} modified successfully.")
            }
            Decision::Delete | Decision::Execute(Verb::Delete) => {
                format!("Parameter file {identity} deleted successfully.")
            }
            Decision::Execute(Verb::Convert) => {
                let target = spec
                    .convert_to
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                format!("Parameter file {identity} converted to {target}.")
            }
            Decision::Execute(verb) => format!("Parameter file {identity}: {verb} completed."),
        }
    }
}
