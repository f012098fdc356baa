//! Profile resource - resource and password limits
//!
//! Describe reads back the limits set explicitly on the profile, so `modify`
//! only alters limits whose value differs. Size limits compare as bytes.
//! Each alteration is its own statement; a failure partway leaves the
//! earlier ones applied.

use declarative::{Attributes, Capabilities, Driver, ObservedState, ResourceKind};
use orakit::{Error, ExecutionOutcome, Result, Session, quote};
use serde::Deserialize;

use super::scalar;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawProfileSpec {
    #[serde(default)]
    limits: Attributes,
}

/// Limits in document order, names and values already rendered
#[derive(Debug, Default, Deserialize)]
#[serde(try_from = "RawProfileSpec")]
pub struct ProfileSpec {
    pub limits: Vec<(String, String)>,
}

impl TryFrom<RawProfileSpec> for ProfileSpec {
    type Error = Error;

    fn try_from(raw: RawProfileSpec) -> Result<Self> {
        let limits = raw
            .limits
            .iter()
            .map(|(name, value)| {
                let rendered = scalar(value).ok_or_else(|| {
                    Error::validation(format!("Limit {name} must be a string or number"))
                })?;
                Ok((quote::identifier(name)?, quote::limit_value(&rendered)?))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { limits })
    }
}

/// Whether the observed limit already holds the desired value.
///
/// Unset limits are reported as absent, which is what `DEFAULT` asks for.
fn limit_matches(current: Option<&str>, desired: &str) -> bool {
    match current {
        None => desired == "DEFAULT",
        Some(current) if current.eq_ignore_ascii_case(desired) => true,
        Some(current) => match (quote::parse_size(current), quote::parse_size(desired)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    }
}

impl ProfileSpec {
    fn render(&self) -> String {
        self.limits
            .iter()
            .map(|(name, value)| format!("{name} {value}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub struct ProfileDriver;

impl Driver for ProfileDriver {
    type Spec = ProfileSpec;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Profile
    }

    fn noun(&self) -> &'static str {
        "Profile"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::catalog(true)
    }

    /// One row per limit: `RESOURCE_NAME=LIMIT`. `DEFAULT` rows only mark
    /// the profile as present.
    fn describe(&self, session: &Session, identity: &str, _spec: &ProfileSpec) -> Result<ObservedState> {
        let rows = session.query(format!(
            "SELECT resource_name || '=' || limit FROM dba_profiles WHERE profile = {};",
            quote::literal(identity)
        ))?;

        let mut observed = ObservedState::absent();
        for row in rows {
            if let Some((name, value)) = row.split_once('=') {
                observed.present = true;
                let value = value.trim();
                if !value.eq_ignore_ascii_case("DEFAULT") {
                    observed = observed.with(name.trim(), value);
                }
            }
        }
        Ok(observed)
    }

    fn create(&self, session: &Session, identity: &str, spec: &ProfileSpec) -> Result<ExecutionOutcome> {
        if spec.limits.is_empty() {
            return Err(Error::config(format!(
                "Profile {identity} needs at least one limit to be created"
            )));
        }
        session.sql(format!("CREATE PROFILE {identity} LIMIT {};", spec.render()))
    }

    fn modify(
        &self,
        session: &Session,
        identity: &str,
        spec: &ProfileSpec,
        observed: &ObservedState,
    ) -> Result<Option<ExecutionOutcome>> {
        let mut last = None;
        for (name, value) in &spec.limits {
            let current = observed.get_str(name);
            if limit_matches(current, value) {
                continue;
            }
            log::debug!("Profile {identity}: {name} {} -> {value}", current.unwrap_or("?"));
            last = Some(session.sql(format!("ALTER PROFILE {identity} LIMIT {name} {value};"))?);
        }
        Ok(last)
    }

    fn delete(&self, session: &Session, identity: &str, _spec: &ProfileSpec) -> Result<ExecutionOutcome> {
        session.sql(format!("DROP PROFILE {identity} CASCADE;"))
    }
}
