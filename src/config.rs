//! Service configuration.
//!
//! Loaded from `$SITETRACK_CONFIG` or `<config dir>/sitetrack/config.json`,
//! then overridden by `SITETRACK_PORT` and `SITETRACK_DB`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::progress::{PhaseCatalog, PhaseWeight};

const APP_NAME: &str = "sitetrack";
const CONFIG_FILE: &str = "config.json";
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Port for the HTTP API.
    pub port: u16,
    /// SQLite database file. Defaults to the platform data directory.
    pub database_path: Option<PathBuf>,
    /// Phase order and weights. Defaults to the built-in catalog.
    pub phases: Option<Vec<PhaseWeight>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_path: None,
            phases: None,
        }
    }
}

impl AppConfig {
    /// Load configuration, applying environment overrides.
    /// A missing file yields defaults; an unreadable one is an error.
    pub fn load() -> Result<Self> {
        let path = match std::env::var_os("SITETRACK_CONFIG") {
            Some(path) => Some(PathBuf::from(path)),
            None => get_config_path().ok(),
        };

        let mut config = match path {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(port) = std::env::var("SITETRACK_PORT") {
            self.port = port
                .parse()
                .with_context(|| format!("Invalid SITETRACK_PORT: {}", port))?;
        }
        if let Some(db) = std::env::var_os("SITETRACK_DB") {
            self.database_path = Some(PathBuf::from(db));
        }
        Ok(())
    }

    /// The configured phase catalog, checked against its invariants.
    pub fn phase_catalog(&self) -> Result<PhaseCatalog> {
        match &self.phases {
            Some(phases) => {
                PhaseCatalog::new(phases.clone()).context("Invalid phase catalog in config")
            }
            None => Ok(PhaseCatalog::default()),
        }
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Phase;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "port": 8080 }"#).unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.database_path.is_none());
        assert_eq!(config.phase_catalog().unwrap(), PhaseCatalog::default());
    }

    #[test]
    fn custom_phases_are_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "phases": [
                { "phase": "design", "weight": 40 },
                { "phase": "execution", "weight": 50 }
            ] }"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert!(config.phase_catalog().is_err());
    }

    #[test]
    fn custom_phases_build_catalog() {
        let config = AppConfig {
            phases: Some(vec![
                PhaseWeight {
                    phase: Phase::Design,
                    weight: 40,
                },
                PhaseWeight {
                    phase: Phase::Execution,
                    weight: 60,
                },
            ]),
            ..AppConfig::default()
        };

        let catalog = config.phase_catalog().unwrap();
        assert_eq!(catalog.weight(Phase::Execution), 60);
        assert_eq!(catalog.next_weighted(Phase::Design), Some(Phase::Execution));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }
}
