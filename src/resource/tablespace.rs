//! Tablespace resource - one datafile with optional autoextend
//!
//! Describe reads back the first datafile, so size and autoextend drift is
//! corrected with `ALTER DATABASE DATAFILE`. `size` is a floor: a datafile
//! that has grown past it is never shrunk. Alterations run one at a time
//! without rollback.

use declarative::{Capabilities, Driver, Lifecycle, ObservedState, ResourceKind};
use orakit::{Error, ExecutionOutcome, Result, Session, quote};
use serde::Deserialize;
use serde_json::Value;

/// `MAXBYTES` reported for `MAXSIZE UNLIMITED` with 8K blocks
const UNLIMITED_MAXBYTES: u64 = 34_359_721_984;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TablespaceSpec {
    pub datafile: Option<String>,
    pub size: Option<String>,
    #[serde(default)]
    pub autoextend: bool,
    pub maxsize: Option<String>,
}

impl TablespaceSpec {
    fn autoextend_clause(&self) -> Result<String> {
        if !self.autoextend {
            return Ok(" AUTOEXTEND OFF".to_string());
        }
        match &self.maxsize {
            Some(max) => Ok(format!(" AUTOEXTEND ON MAXSIZE {}", quote::size(max)?)),
            None => Ok(" AUTOEXTEND ON".to_string()),
        }
    }

    fn maxsize_matches(&self, observed: Option<u64>) -> bool {
        let Some(max) = &self.maxsize else {
            return true;
        };
        match (quote::parse_size(max), observed) {
            (Some(want), Some(have)) => want == have,
            // UNLIMITED
            (None, Some(have)) => have >= UNLIMITED_MAXBYTES,
            (_, None) => false,
        }
    }
}

pub struct TablespaceDriver;

impl Driver for TablespaceDriver {
    type Spec = TablespaceSpec;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Tablespace
    }

    fn noun(&self) -> &'static str {
        "Tablespace"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::catalog(true)
    }

    fn validate(&self, identity: &str, lifecycle: Lifecycle, spec: &TablespaceSpec) -> Result<()> {
        if lifecycle == Lifecycle::Present && (spec.datafile.is_none() || spec.size.is_none()) {
            return Err(Error::config(format!(
                "Tablespace {identity} requires datafile and size"
            )));
        }
        if let Some(datafile) = &spec.datafile {
            quote::verbatim("datafile", datafile)?;
        }
        if let Some(size) = &spec.size {
            if quote::parse_size(size).is_none() {
                return Err(Error::validation(format!(
                    "'{size}' is not a valid datafile size"
                )));
            }
        }
        if let Some(max) = &spec.maxsize {
            quote::size(max)?;
            if !spec.autoextend {
                return Err(Error::validation("maxsize requires autoextend"));
            }
        }
        Ok(())
    }

    /// One row per datafile:
    /// `TABLESPACE|FILE_NAME|BYTES|AUTOEXTENSIBLE|MAXBYTES`.
    fn describe(&self, session: &Session, identity: &str, _spec: &TablespaceSpec) -> Result<ObservedState> {
        let rows = session.query(format!(
            "SELECT t.tablespace_name || '|' || f.file_name || '|' || f.bytes || '|' || \
             f.autoextensible || '|' || f.maxbytes FROM dba_tablespaces t \
             LEFT JOIN dba_data_files f ON f.tablespace_name = t.tablespace_name \
             WHERE t.tablespace_name = {} ORDER BY f.file_id;",
            quote::literal(identity)
        ))?;

        let first = rows.iter().find_map(|row| {
            let fields: Vec<&str> = row.split('|').map(str::trim).collect();
            fields[0].eq_ignore_ascii_case(identity).then_some(fields)
        });
        let Some(fields) = first else {
            return Ok(ObservedState::absent());
        };

        let mut observed = ObservedState::present();
        if let [_, file, bytes, auto, maxbytes, ..] = fields.as_slice() {
            if !file.is_empty() {
                observed = observed
                    .with("datafile", *file)
                    .with("autoextend", auto.eq_ignore_ascii_case("YES"));
                if let Ok(bytes) = bytes.parse::<u64>() {
                    observed = observed.with("bytes", bytes);
                }
                if let Ok(maxbytes) = maxbytes.parse::<u64>() {
                    observed = observed.with("maxbytes", maxbytes);
                }
            }
        }
        Ok(observed)
    }

    fn create(&self, session: &Session, identity: &str, spec: &TablespaceSpec) -> Result<ExecutionOutcome> {
        let (Some(datafile), Some(size)) = (&spec.datafile, &spec.size) else {
            return Err(Error::config(format!(
                "Tablespace {identity} requires datafile and size"
            )));
        };
        let mut statement = format!(
            "CREATE TABLESPACE {identity} DATAFILE {} SIZE {}",
            quote::literal(datafile),
            quote::size(size)?
        );
        if spec.autoextend {
            statement.push_str(&spec.autoextend_clause()?);
        }
        statement.push(';');
        session.sql(statement)
    }

    fn modify(
        &self,
        session: &Session,
        identity: &str,
        spec: &TablespaceSpec,
        observed: &ObservedState,
    ) -> Result<Option<ExecutionOutcome>> {
        let Some(datafile) = observed.get_str("datafile") else {
            log::debug!("Tablespace {identity} has no datafile to compare");
            return Ok(None);
        };
        let file = quote::literal(datafile);
        let bytes = observed.attributes.get("bytes").and_then(Value::as_u64);
        let maxbytes = observed.attributes.get("maxbytes").and_then(Value::as_u64);
        let autoextend = observed
            .attributes
            .get("autoextend")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let mut last = None;
        if let Some(size) = &spec.size {
            let want = quote::parse_size(size);
            if want.is_some_and(|want| bytes.is_some_and(|have| have < want)) {
                last = Some(session.sql(format!(
                    "ALTER DATABASE DATAFILE {file} RESIZE {};",
                    quote::size(size)?
                ))?);
            }
        }

        let autoextend_drift = if spec.autoextend {
            !autoextend || !spec.maxsize_matches(maxbytes)
        } else {
            autoextend
        };
        if autoextend_drift {
            last = Some(session.sql(format!(
                "ALTER DATABASE DATAFILE {file}{};",
                spec.autoextend_clause()?
            ))?);
        }
        Ok(last)
    }

    fn delete(&self, session: &Session, identity: &str, _spec: &TablespaceSpec) -> Result<ExecutionOutcome> {
        session.sql(format!(
            "DROP TABLESPACE {identity} INCLUDING CONTENTS AND DATAFILES;"
        ))
    }
}
