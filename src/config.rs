//! Settings file (`config.toml` in the config directory)
//!
//! Every key is optional:
//!
//! ```toml
//! [tools]
//! sqlplus = "sqlplus"
//! rman = "/u01/app/oracle/product/19c/bin/rman"
//! ps = "ps"
//! id = "id"
//!
//! [gateway]
//! timeout_secs = 3600   # 0 disables the deadline
//! scratch_dir = "~/tmp"
//! os_user = "oracle"    # "" skips the account check
//!
//! [restore]
//! attempts = 3
//! backoff_secs = 10
//!
//! [defaults]
//! sid = "ORCL"
//! ```

use anyhow::{Context, Result};
use orakit::{AccountCheck, CliGateway, LogCallback, RetryPolicy, ToolPaths};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::paths;
use crate::request::ConnectionDoc;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub tools: ToolSettings,
    pub gateway: GatewaySettings,
    pub restore: RestoreSettings,
    /// Connection block merged under every request
    pub defaults: ConnectionDoc,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolSettings {
    pub sqlplus: String,
    pub rman: String,
    pub ps: String,
    pub id: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            sqlplus: "sqlplus".to_string(),
            rman: "rman".to_string(),
            ps: "ps".to_string(),
            id: "id".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewaySettings {
    pub timeout_secs: u64,
    pub scratch_dir: Option<String>,
    /// Host account that must exist before anything is spawned
    pub os_user: String,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            timeout_secs: 3600,
            scratch_dir: None,
            os_user: "oracle".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RestoreSettings {
    pub attempts: u32,
    pub backoff_secs: u64,
}

impl Default for RestoreSettings {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff_secs: 10,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from the default location.
    ///
    /// An explicit path must exist; a missing default file means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = paths::settings_file()?;
                if !default.exists() {
                    log::debug!("No settings at {}, using defaults", default.display());
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid settings in {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply command-line overrides on top of the file.
    pub fn with_overrides(
        mut self,
        sqlplus: Option<String>,
        rman: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Self {
        if let Some(sqlplus) = sqlplus {
            self.tools.sqlplus = sqlplus;
        }
        if let Some(rman) = rman {
            self.tools.rman = rman;
        }
        if let Some(secs) = timeout_secs {
            self.gateway.timeout_secs = secs;
        }
        self
    }

    /// Per-attempt deadline; `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.gateway.timeout_secs > 0).then(|| Duration::from_secs(self.gateway.timeout_secs))
    }

    pub fn restore_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(
            self.restore.attempts,
            Duration::from_secs(self.restore.backoff_secs),
        )
    }

    pub fn ps_program(&self) -> PathBuf {
        paths::expand(&self.tools.ps)
    }

    /// `None` when `os_user` is blank.
    pub fn account_check(&self) -> Option<AccountCheck> {
        let user = self.gateway.os_user.trim();
        (!user.is_empty()).then(|| AccountCheck {
            program: paths::expand(&self.tools.id),
            user: user.to_string(),
        })
    }

    /// Gateway that spawns the configured programs.
    pub fn gateway(&self) -> CliGateway {
        CliGateway::new()
            .with_paths(ToolPaths {
                sqlplus: paths::expand(&self.tools.sqlplus),
                rman: paths::expand(&self.tools.rman),
            })
            .with_timeout(self.timeout())
            .with_scratch_dir(self.gateway.scratch_dir.as_deref().map(paths::expand))
            .with_callback(Box::new(LogCallback))
            .with_account_check(self.account_check())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::parse("").unwrap();
        assert_eq!(settings.tools.sqlplus, "sqlplus");
        assert_eq!(settings.timeout(), Some(Duration::from_secs(3600)));
        assert_eq!(settings.restore_policy(), RetryPolicy::restore_default());
        assert!(settings.defaults.sid.is_none());
        assert_eq!(
            settings.account_check(),
            Some(AccountCheck {
                program: PathBuf::from("id"),
                user: "oracle".into()
            })
        );
    }

    #[test]
    fn test_blank_os_user_skips_account_check() {
        let settings = Settings::parse("[gateway]\nos_user = \"\"\n").unwrap();
        assert_eq!(settings.account_check(), None);

        let settings = Settings::parse("[tools]\nid = \"/usr/bin/id\"\n[gateway]\nos_user = \"grid\"\n").unwrap();
        let check = settings.account_check().unwrap();
        assert_eq!(check.program, PathBuf::from("/usr/bin/id"));
        assert_eq!(check.user, "grid");
    }

    #[test]
    fn test_full_settings() {
        let settings = Settings::parse(
            r#"
            [tools]
            rman = "/opt/oracle/bin/rman"

            [gateway]
            timeout_secs = 0

            [restore]
            attempts = 5
            backoff_secs = 2

            [defaults]
            service_name = "pdb1"
            mode = "sysbackup"
            "#,
        )
        .unwrap();
        assert_eq!(settings.tools.rman, "/opt/oracle/bin/rman");
        assert_eq!(settings.tools.sqlplus, "sqlplus");
        assert_eq!(settings.timeout(), None);
        assert_eq!(settings.restore_policy().attempts(), 5);
        assert_eq!(settings.defaults.service_name.as_deref(), Some("pdb1"));
        assert_eq!(settings.defaults.mode, Some(orakit::ConnectionMode::Sysbackup));
    }

    #[test]
    fn test_overrides_win() {
        let settings = Settings::parse("[tools]\nrman = \"/opt/rman\"\n")
            .unwrap()
            .with_overrides(Some("/opt/sqlplus".into()), None, Some(0));
        assert_eq!(settings.tools.sqlplus, "/opt/sqlplus");
        assert_eq!(settings.tools.rman, "/opt/rman");
        assert_eq!(settings.timeout(), None);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(Settings::parse("[gateway]\ntimeout = 5\n").is_err());
    }

    #[test]
    fn test_explicit_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[tools]\nps = \"/bin/ps\"\n").unwrap();
        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.ps_program(), PathBuf::from("/bin/ps"));
    }
}
