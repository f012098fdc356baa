//! Escaping and validation contract for text embedded in commands.
//!
//! Nothing supplied by a caller is interpolated into SQL or RMAN text without
//! going through one of these functions. Identifiers are restricted to the
//! unquoted form and upper-cased; free text becomes a single-quoted literal.

use crate::error::{Error, Result};
use crate::secret::Secret;

/// Longest identifier accepted (database limit since 12.2).
pub const MAX_IDENTIFIER_LEN: usize = 128;

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '#')
}

/// Validate an unquoted identifier and return its canonical upper-case form.
pub fn identifier(name: &str) -> Result<String> {
    let name = name.trim();
    let mut chars = name.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    if !starts_alpha || name.len() > MAX_IDENTIFIER_LEN || !chars.all(is_ident_char) {
        return Err(Error::validation(format!(
            "'{name}' is not a valid identifier (letters, digits, _, $, # starting with a letter)"
        )));
    }
    Ok(name.to_ascii_uppercase())
}

/// Render `value` as a single-quoted string literal, doubling embedded quotes.
pub fn literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Validate a storage size such as `100M`, `1G`, `8192` or `UNLIMITED`.
pub fn size(value: &str) -> Result<String> {
    let upper = value.trim().to_ascii_uppercase();
    if upper == "UNLIMITED" || parse_size(&upper).is_some() {
        Ok(upper)
    } else {
        Err(Error::validation(format!(
            "'{value}' is not a valid size (digits with optional K, M, G, T, P or E suffix)"
        )))
    }
}

/// Parse a size clause into bytes. `UNLIMITED` and malformed input give `None`.
pub fn parse_size(value: &str) -> Option<u64> {
    let value = value.trim().to_ascii_uppercase();
    let (digits, shift) = match value.chars().last()? {
        'K' => (&value[..value.len() - 1], 10),
        'M' => (&value[..value.len() - 1], 20),
        'G' => (&value[..value.len() - 1], 30),
        'T' => (&value[..value.len() - 1], 40),
        'P' => (&value[..value.len() - 1], 50),
        'E' => (&value[..value.len() - 1], 60),
        _ => (value.as_str(), 0),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u64>().ok()?.checked_mul(1u64 << shift)
}

/// Validate a privilege or role name as granted, e.g. `CREATE SESSION`,
/// `DBA`, `SELECT ON HR.EMPLOYEES`.
pub fn privilege(value: &str) -> Result<String> {
    let words: Vec<&str> = value.split_whitespace().collect();
    let valid = !words.is_empty()
        && words.iter().all(|w| {
            w.split('.')
                .all(|part| identifier(part).is_ok())
        });
    if !valid {
        return Err(Error::validation(format!("'{value}' is not a valid privilege")));
    }
    Ok(words.join(" ").to_ascii_uppercase())
}

/// Validate a profile limit value: a number, a simple fraction such as
/// `1/24`, or a keyword like `UNLIMITED` / `DEFAULT`.
pub fn limit_value(value: &str) -> Result<String> {
    let value = value.trim();
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '/' | '_'));
    if !valid {
        return Err(Error::validation(format!("'{value}' is not a valid limit value")));
    }
    Ok(value.to_ascii_uppercase())
}

/// Accept option text that is appended to a command as-is.
///
/// Statement terminators and line breaks are rejected so an option can never
/// start a second command.
pub fn verbatim<'a>(what: &str, value: &'a str) -> Result<&'a str> {
    if value.contains(';') || value.chars().any(|c| c == '\n' || c == '\r') {
        return Err(Error::validation(format!(
            "{what} must not contain ';' or line breaks"
        )));
    }
    Ok(value)
}

/// Enforce the password policy for accounts created on the database.
///
/// Messages name the violated rule for `owner` and never echo the password.
pub fn password(owner: &str, password: &Secret) -> Result<()> {
    let pw = password.expose();
    let fail = |rule: &str| Err(Error::validation(format!("Password for {owner} {rule}")));

    if pw.is_empty() {
        return fail("must not be empty");
    }
    if pw.chars().any(|c| matches!(c, '\'' | '"' | ';' | '@')) {
        return fail("contains forbidden symbols such as quotes, semicolons, or '@'");
    }
    if !pw.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return fail("must start with an alphabetic character");
    }
    if pw.chars().any(|c| c == '$' || c == '#') {
        return fail("contains discouraged symbols '$' or '#'");
    }
    if !pw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return fail("contains invalid characters; only alphanumeric and '_' are allowed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_uppercases() {
        assert_eq!(identifier("app_user").unwrap(), "APP_USER");
        assert_eq!(identifier(" ts1 ").unwrap(), "TS1");
    }

    #[test]
    fn test_identifier_rejects_injection() {
        assert!(identifier("x; DROP USER SYS").is_err());
        assert!(identifier("1abc").is_err());
        assert!(identifier("").is_err());
        assert!(identifier("a'b").is_err());
        assert!(identifier(&"A".repeat(129)).is_err());
    }

    #[test]
    fn test_literal_doubles_quotes() {
        assert_eq!(literal("/data/ts1.dbf"), "'/data/ts1.dbf'");
        assert_eq!(literal("it's"), "'it''s'");
    }

    #[test]
    fn test_size() {
        assert_eq!(size("100m").unwrap(), "100M");
        assert_eq!(size("unlimited").unwrap(), "UNLIMITED");
        assert!(size("100MB").is_err());
        assert!(size("ten").is_err());
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("100M"), Some(100 * 1024 * 1024));
        assert_eq!(parse_size("1G"), Some(1 << 30));
        assert_eq!(parse_size("8192"), Some(8192));
        assert_eq!(parse_size("UNLIMITED"), None);
        assert_eq!(parse_size("M"), None);
    }

    #[test]
    fn test_privilege() {
        assert_eq!(privilege("create  session").unwrap(), "CREATE SESSION");
        assert_eq!(
            privilege("select on hr.employees").unwrap(),
            "SELECT ON HR.EMPLOYEES"
        );
        assert!(privilege("DBA; DROP").is_err());
        assert!(privilege("").is_err());
    }

    #[test]
    fn test_verbatim_rejects_terminators() {
        assert_eq!(verbatim("option", "'/backup/%U'").unwrap(), "'/backup/%U'");
        assert!(verbatim("option", "x; DELETE BACKUP").is_err());
        assert!(verbatim("option", "x\nDELETE").is_err());
    }

    #[test]
    fn test_password_policy() {
        assert!(password("SCOTT", &Secret::new("Tiger_123")).is_ok());
        assert!(password("SCOTT", &Secret::new("1tiger")).is_err());
        assert!(password("SCOTT", &Secret::new("tig'er")).is_err());
        assert!(password("SCOTT", &Secret::new("tiger$")).is_err());
        assert!(password("SCOTT", &Secret::new("tiger-x")).is_err());
    }

    #[test]
    fn test_password_message_does_not_echo() {
        let err = password("SCOTT", &Secret::new("Bad;Secret")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("SCOTT"));
        assert!(!msg.contains("Bad;Secret"));
    }
}
