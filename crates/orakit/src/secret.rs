//! Credential handling.
//!
//! A [`Secret`] never prints its contents through `Debug` or `Display`, so it
//! can sit inside request structs that get logged. Text captured from the
//! control plane is passed through [`redact`] before it is stored in an
//! outcome or an error.

use serde::Deserialize;
use std::fmt;

/// Placeholder written wherever a secret would have appeared.
pub const REDACTED: &str = "********";

/// A credential value that does not leak through formatting.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the raw value. Only the gateway's stdin writer and SQL
    /// builders that must embed the credential should call this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret({REDACTED})")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

/// Replace every occurrence of each secret in `text` with [`REDACTED`].
pub fn redact(text: &str, secrets: &[&Secret]) -> String {
    let mut out = text.to_string();
    for secret in secrets.iter().filter(|s| !s.is_empty()) {
        out = out.replace(secret.expose(), REDACTED);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_and_display_hide_value() {
        let secret = Secret::new("Tiger123");
        assert_eq!(format!("{secret:?}"), "Secret(********)");
        assert_eq!(secret.to_string(), "********");
        assert_eq!(secret.expose(), "Tiger123");
    }

    #[test]
    fn test_redact_replaces_all_occurrences() {
        let secret = Secret::new("Tiger123");
        let text = "CONNECT scott/Tiger123@ORCL\nORA-01017: Tiger123 rejected";
        let redacted = redact(text, &[&secret]);
        assert!(!redacted.contains("Tiger123"));
        assert_eq!(redacted.matches(REDACTED).count(), 2);
    }

    #[test]
    fn test_redact_ignores_empty_secret() {
        let empty = Secret::default();
        assert_eq!(redact("unchanged", &[&empty]), "unchanged");
    }
}
