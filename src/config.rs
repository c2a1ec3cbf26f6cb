//! Configuration file support for bookstat
//!
//! Supports TOML configuration files with the following search order:
//! 1. `--config <path>` - explicitly specified path
//! 2. `./bookstat.toml` - current directory
//! 3. `~/.config/bookstat/config.toml` - user config
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! schema_version = 1
//!
//! [general]
//! threads = 4
//!
//! [statistics]
//! page_algorithm = "fixed-size"
//! gunning_fog = false
//!
//! [remote]
//! enabled = true
//! timeout_secs = 20
//!
//! [output]
//! overwrite_existing = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::batch::BatchOptions;
use crate::stats::{PageAlgorithm, StatisticKind};

/// Supported configuration schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Configuration file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// File not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Schema written by a newer release
    #[error("Unsupported config schema version {0} (expected {SCHEMA_VERSION})")]
    UnsupportedSchema(u32),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// General configuration options
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// Number of worker threads
    #[serde(default)]
    pub threads: Option<usize>,

    /// Verbosity level (0-2)
    #[serde(default)]
    pub verbose: Option<u8>,
}

/// Statistic selection and algorithm options
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StatisticsConfig {
    /// Compute page counts
    #[serde(default)]
    pub pages: Option<bool>,

    /// Compute word counts
    #[serde(default)]
    pub words: Option<bool>,

    /// Compute Flesch Reading Ease
    #[serde(default)]
    pub flesch_reading: Option<bool>,

    /// Compute Flesch-Kincaid Grade
    #[serde(default)]
    pub flesch_grade: Option<bool>,

    /// Compute Gunning Fog Index
    #[serde(default)]
    pub gunning_fog: Option<bool>,

    /// Page-count algorithm for reflowable books
    #[serde(default)]
    pub page_algorithm: Option<PageAlgorithm>,
}

/// Remote lookup options
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RemoteConfig {
    /// Prefer remote lookup for page counts
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Base URL of the metadata site
    #[serde(default)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Result store options
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    /// Path of the JSON result store
    #[serde(default)]
    pub store_path: Option<PathBuf>,

    /// Replace statistics already in the store
    #[serde(default)]
    pub overwrite_existing: Option<bool>,
}

/// Complete configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FileConfig {
    #[serde(default)]
    pub schema_version: Option<u32>,

    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub statistics: StatisticsConfig,

    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl FileConfig {
    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: FileConfig = toml::from_str(&content)?;
        if let Some(version) = config.schema_version {
            if version > SCHEMA_VERSION {
                return Err(ConfigError::UnsupportedSchema(version));
            }
        }
        Ok(config)
    }

    /// Find a config file following the search order
    pub fn find_config_file() -> Option<PathBuf> {
        let local = PathBuf::from("bookstat.toml");
        if local.exists() {
            return Some(local);
        }

        if let Some(home) = std::env::var_os("HOME") {
            let user = PathBuf::from(home)
                .join(".config")
                .join("bookstat")
                .join("config.toml");
            if user.exists() {
                return Some(user);
            }
        }

        None
    }

    /// Load the explicitly given file, or the first file found in the
    /// search order, or defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => match Self::find_config_file() {
                Some(path) => Self::load(&path),
                None => Ok(Self::default()),
            },
        }
    }

    /// Statistic kinds enabled by this configuration. A kind is enabled
    /// unless explicitly disabled.
    pub fn enabled_statistics(&self) -> Vec<StatisticKind> {
        let s = &self.statistics;
        let enabled = [
            (StatisticKind::PageCount, s.pages),
            (StatisticKind::WordCount, s.words),
            (StatisticKind::FleschReadingEase, s.flesch_reading),
            (StatisticKind::FleschKincaidGrade, s.flesch_grade),
            (StatisticKind::GunningFogIndex, s.gunning_fog),
        ];
        enabled
            .into_iter()
            .filter(|(_, flag)| flag.unwrap_or(true))
            .map(|(kind, _)| kind)
            .collect()
    }

    /// Fold this file's settings into batch options.
    pub fn apply_to(&self, options: &mut BatchOptions) {
        options.statistics = self.enabled_statistics();
        if let Some(algorithm) = self.statistics.page_algorithm {
            options.page_algorithm = algorithm;
        }
        if let Some(enabled) = self.remote.enabled {
            options.use_remote = enabled;
        }
        if let Some(base_url) = &self.remote.base_url {
            options.remote.base_url = base_url.clone();
        }
        if let Some(secs) = self.remote.timeout_secs {
            options.remote.timeout = Duration::from_secs(secs);
        }
        if let Some(threads) = self.general.threads {
            options.threads = Some(threads);
        }
    }

    /// Overwrite policy, defaulting to replacing stored values.
    pub fn overwrite_existing(&self) -> bool {
        self.output.overwrite_existing.unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_enables_everything() {
        let config = FileConfig::default();
        assert_eq!(config.enabled_statistics().len(), 5);
        assert!(config.overwrite_existing());
    }

    #[test]
    fn test_load_full_config() {
        let mut temp = NamedTempFile::new().unwrap();
        write!(
            temp,
            r#"
schema_version = 1

[general]
threads = 4
verbose = 1

[statistics]
gunning_fog = false
page_algorithm = "fixed-size"

[remote]
enabled = true
base_url = "https://example.test"
timeout_secs = 5

[output]
overwrite_existing = false
"#
        )
        .unwrap();

        let config = FileConfig::load(temp.path()).unwrap();
        assert_eq!(config.general.threads, Some(4));
        assert_eq!(
            config.statistics.page_algorithm,
            Some(PageAlgorithm::FixedSize)
        );
        assert!(!config.overwrite_existing());

        let stats = config.enabled_statistics();
        assert_eq!(stats.len(), 4);
        assert!(!stats.contains(&StatisticKind::GunningFogIndex));

        let mut options = BatchOptions::default();
        config.apply_to(&mut options);
        assert!(options.use_remote);
        assert_eq!(options.remote.base_url, "https://example.test");
        assert_eq!(options.remote.timeout, Duration::from_secs(5));
        assert_eq!(options.threads, Some(4));
        assert_eq!(options.page_algorithm, PageAlgorithm::FixedSize);
    }

    #[test]
    fn test_load_missing_file() {
        let result = FileConfig::load(Path::new("/nonexistent/bookstat.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut temp = NamedTempFile::new().unwrap();
        write!(temp, "this is not [valid toml").unwrap();
        let result = FileConfig::load(temp.path());
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_newer_schema_rejected() {
        let mut temp = NamedTempFile::new().unwrap();
        write!(temp, "schema_version = 99").unwrap();
        let result = FileConfig::load(temp.path());
        assert!(matches!(result, Err(ConfigError::UnsupportedSchema(99))));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let mut temp = NamedTempFile::new().unwrap();
        write!(temp, "[statistics]\nwords = false\n").unwrap();

        let config = FileConfig::load(temp.path()).unwrap();
        let stats = config.enabled_statistics();
        assert!(!stats.contains(&StatisticKind::WordCount));
        assert!(stats.contains(&StatisticKind::PageCount));

        let mut options = BatchOptions::default();
        config.apply_to(&mut options);
        assert!(!options.use_remote);
        assert_eq!(options.threads, None);
    }

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        let config = FileConfig::load_or_default(Some(Path::new("/nonexistent.toml")));
        assert!(config.is_err());
    }
}
