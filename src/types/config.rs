//! Configuration for Leitbox.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::LeitboxResult;

/// Main configuration for Leitbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Progress storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Review session settings.
    #[serde(default)]
    pub review: ReviewConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Progress storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database path.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from(".leitbox/leitbox.db")
}

/// Review session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Maximum number of evaluations per session (0 = unlimited).
    #[serde(default = "default_session_limit")]
    pub session_limit: usize,

    /// Sheet reviewed when none is given on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_sheet: Option<String>,

    /// Shows the audio reference next to the translation.
    #[serde(default = "default_true")]
    pub show_audio_reference: bool,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            session_limit: default_session_limit(),
            default_sheet: None,
            show_audio_reference: true,
        }
    }
}

fn default_session_limit() -> usize {
    20
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> LeitboxResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> LeitboxResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Creates default configuration.
    pub fn default_config() -> Self {
        Self {
            general: GeneralConfig::default(),
            storage: StorageConfig::default(),
            review: ReviewConfig::default(),
        }
    }

    /// Carrega `path` se existir; arquivo ausente ou inválido usa o padrão.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default_config();
        }
        Self::load(path).unwrap_or_else(|_| Self::default_config())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [review]
            session_limit = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.review.session_limit, 5);
        assert!(config.review.show_audio_reference);
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.storage.db_path, PathBuf::from(".leitbox/leitbox.db"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("leitbox.toml");

        let mut config = Config::default_config();
        config.review.default_sheet = Some("Lesson 3".to_string());
        config.general.log_format = "json".to_string();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.review.default_sheet.as_deref(), Some("Lesson 3"));
        assert_eq!(loaded.general.log_format, "json");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempdir().unwrap();
        assert!(Config::load(dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_load_or_default() {
        let dir = tempdir().unwrap();

        let missing = Config::load_or_default(dir.path().join("missing.toml"));
        assert_eq!(missing.review.session_limit, 20);

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[review\nsession_limit = ").unwrap();
        assert_eq!(Config::load_or_default(&broken).review.session_limit, 20);

        let valid = dir.path().join("leitbox.toml");
        std::fs::write(&valid, "[review]\nsession_limit = 7\n").unwrap();
        assert_eq!(Config::load_or_default(&valid).review.session_limit, 7);
    }
}
