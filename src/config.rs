//! Optional defaults from `~/.config/kubectl-trail/config.toml`
//!
//! ```toml
//! url = "monitoring/loki"
//! context = "prod"
//! limit = 500
//! since = "1h"
//! level = "warn"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Loki URL or `namespace/service`
    pub url: Option<String>,
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
    pub limit: Option<u32>,
    /// Duration string, same syntax as `--since`
    pub since: Option<String>,
    pub level: Option<String>,
}

impl Config {
    /// Get the config file path
    pub fn path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join("kubectl-trail").join("config.toml"))
    }

    /// Load the config file, or defaults if there is none
    pub fn load() -> Result<Self> {
        match Self::path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        let config = Config::parse(
            r#"
            url = "monitoring/loki"
            context = "prod"
            limit = 500
            since = "1h"
            level = "warn"
            "#,
        )
        .unwrap();

        assert_eq!(config.url.as_deref(), Some("monitoring/loki"));
        assert_eq!(config.context.as_deref(), Some("prod"));
        assert_eq!(config.limit, Some(500));
        assert_eq!(config.since.as_deref(), Some("1h"));
        assert_eq!(config.level.as_deref(), Some("warn"));
        assert_eq!(config.kubeconfig, None);
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(Config::parse("colour = true").is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(Config::load_from(Path::new("/nonexistent/config.toml")).is_err());
    }
}
