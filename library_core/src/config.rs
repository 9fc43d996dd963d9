//! Application configuration: TOML file plus environment overrides.
//!
//! ```toml
//! database_url = "library.db"
//!
//! [loans]
//! default_due_days = 14
//! ```
//!
//! Every key is optional; missing keys fall back to [`LibraryConfig::default`].
//! Unknown keys are rejected so typos do not silently fall back to defaults.
//! `DATABASE_URL` in the environment wins over the file's `database_url`.

use std::{num::NonZeroU32, path::Path};

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

use crate::circulation::DEFAULT_DUE_DAYS;

/// Environment variable that overrides [`LibraryConfig::database_url`].
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct LibraryConfig {
    /// SQLite file path or `sqlite:` URL.
    pub database_url: String,
    /// Lending rules.
    pub loans: LoanPolicy,
}

/// Lending rules applied by the issue desk.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct LoanPolicy {
    /// Loan period used when the issue form leaves it blank.
    pub default_due_days: NonZeroU32,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            database_url: "library.db".to_string(),
            loans: LoanPolicy::default(),
        }
    }
}

impl Default for LoanPolicy {
    fn default() -> Self {
        Self {
            default_due_days: DEFAULT_DUE_DAYS,
        }
    }
}

impl LibraryConfig {
    /// Replaces values that have an environment override.
    ///
    /// `lookup` is usually `|k| std::env::var(k).ok()`; tests pass a map.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(DATABASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.database_url = url;
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.database_url.trim().is_empty() {
            bail!("database_url cannot be empty");
        }
        Ok(())
    }
}

/// Parse a configuration from a TOML string.
pub fn load_config_str(s: &str) -> anyhow::Result<LibraryConfig> {
    let cfg: LibraryConfig = toml::from_str(s).context("invalid library config")?;
    cfg.validate()?;
    Ok(cfg)
}

/// Parse a configuration file.
pub fn load_config_path(path: impl AsRef<Path>) -> anyhow::Result<LibraryConfig> {
    let path = path.as_ref();
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read config {}", path.display()))?;
    load_config_str(&s).with_context(|| format!("in {}", path.display()))
}

/// File (when given) or defaults, then process-environment overrides.
pub fn resolve(path: Option<&Path>) -> anyhow::Result<LibraryConfig> {
    let mut cfg = match path {
        Some(p) => load_config_path(p)?,
        None => LibraryConfig::default(),
    };
    cfg.apply_env_overrides(|k| std::env::var(k).ok());
    cfg.validate()?;
    Ok(cfg)
}
