//! Configuration for the `avenue` binary.
//!
//! Stored in `~/.avenue/config.toml`. Every section and field is optional;
//! anything left out takes its default value.

use avenue_algo::{Area, SearchConfig, SiteLayout};
use avenue_core::ElectricalParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("could not determine config directory")]
    NoConfigDir,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvenueConfig {
    /// Site count and provisioning
    pub layout: SiteLayout,
    /// Extent sites are scattered over
    pub area: Area,
    /// Congestion search parameters
    pub search: SearchConfig,
    /// Electrical constants for the load flow
    pub model: ElectricalParams,
    pub runtime: RuntimeConfig,
}

/// Process-level settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Number of worker threads (0 = one per core).
    pub worker_threads: usize,

    /// Site placement seed. A fresh random seed is drawn when unset.
    pub seed: Option<u64>,
}

impl AvenueConfig {
    /// Get the default config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".avenue"))
    }

    /// Get the default config file path.
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    /// Load configuration from the default location.
    ///
    /// Returns default config if file doesn't exist.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().ok_or(ConfigError::NoConfigDir)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avenue_algo::TrialIsolation;
    use avenue_core::SolverKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = AvenueConfig::default();
        assert_eq!(config.layout.count, 800);
        assert_eq!(config.layout.group_by, 80);
        assert_eq!(config.search.edge_limit, 4);
        assert_eq!(config.search.isolation, TrialIsolation::Cloned);
        assert_eq!(config.search.max_trials, avenue_algo::congestion::DEFAULT_MAX_TRIALS);
        assert_eq!(config.runtime.worker_threads, 0);
        assert!(config.runtime.seed.is_none());
    }

    #[test]
    fn test_partial_config_parsing() {
        let toml = r#"
            [layout]
            count = 120

            [search]
            isolation = "serialized"
            max_trials = 5000

            [model]
            solver = "gauss"

            [runtime]
            seed = 17
        "#;

        let config: AvenueConfig = toml::from_str(toml).unwrap();

        assert_eq!(config.layout.count, 120);
        assert_eq!(config.search.isolation, TrialIsolation::Serialized);
        assert_eq!(config.search.max_trials, 5000);
        assert_eq!(config.model.solver, SolverKind::Gauss);
        assert_eq!(config.runtime.seed, Some(17));

        assert_eq!(config.layout.group_by, 80);
        assert_eq!(config.search.edge_limit, 4);
        assert_eq!(config.area, Area::default());
    }

    #[test]
    fn test_save_and_load() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();

        let mut config = AvenueConfig::default();
        config.search.edge_limit = 2;
        config.runtime.seed = Some(99);
        config.save_to(&path).unwrap();

        let loaded = AvenueConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[layout]\ncount = \"many\"").unwrap();
        let err = AvenueConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
