//! RMAN command rendering shared by backup and restore

use declarative::Attributes;
use orakit::{Error, Result, quote};
use serde_json::Value;

use super::scalar;

/// Append option pairs as ` KEY VALUE` in document order.
///
/// `true` emits the key alone and `false` drops it, so flags such as
/// `"COMPRESSED BACKUPSET" = true` read naturally.
pub fn options(options: &Attributes) -> Result<String> {
    let mut rendered = String::new();
    for (key, value) in options {
        quote::verbatim("RMAN option", key)?;
        match value {
            Value::Bool(true) => rendered.push_str(&format!(" {key}")),
            Value::Bool(false) | Value::Null => {}
            other => {
                let text = scalar(other).ok_or_else(|| {
                    Error::validation(format!("RMAN option {key} must be a scalar"))
                })?;
                quote::verbatim("RMAN option", &text)?;
                rendered.push_str(&format!(" {key} {text}"));
            }
        }
    }
    Ok(rendered)
}

/// Require a sub-unit name for scoped operations.
pub fn require_name(operation: &str, scope: &str, identity: &str) -> Result<()> {
    if identity.is_empty() {
        return Err(Error::config(format!(
            "The 'name' parameter is required when {operation} scope is '{scope}'."
        )));
    }
    Ok(())
}
