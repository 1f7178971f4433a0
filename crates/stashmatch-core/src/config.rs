use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Root configuration, loaded from `~/.config/stashmatch/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub matching: MatchConfig,
    pub apply: ApplyConfig,
    pub logging: LoggingConfig,
}

/// Thresholds and concurrency for the matching engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Scores at or above this are high confidence and eligible for auto-apply.
    pub auto_match_threshold: u8,
    /// Scores at or above this (and below the auto threshold) need review.
    pub review_threshold: u8,
    /// Maximum number of concurrent registry searches per batch.
    pub batch_size: usize,
    /// Registry endpoint recorded on entities when a match is applied.
    pub registry_endpoint: String,
}

/// Which attributes of a selected registry record are copied onto a local entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyConfig {
    pub include_images: bool,
    pub include_parent_studios: bool,
    pub include_aliases: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub level: String,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            auto_match_threshold: 95,
            review_threshold: 70,
            batch_size: 50,
            registry_endpoint: "https://stashdb.org/graphql".to_string(),
        }
    }
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            include_images: true,
            include_parent_studios: true,
            include_aliases: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ─── Validation ────────────────────────────────────────────

impl MatchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.auto_match_threshold > 100 {
            return Err(CoreError::ConfigError(format!(
                "auto_match_threshold must be at most 100, got {}",
                self.auto_match_threshold
            )));
        }
        if self.review_threshold > self.auto_match_threshold {
            return Err(CoreError::ConfigError(format!(
                "review_threshold ({}) must not exceed auto_match_threshold ({})",
                self.review_threshold, self.auto_match_threshold
            )));
        }
        if self.batch_size == 0 {
            return Err(CoreError::ConfigError(
                "batch_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        self.matching.validate()
    }

    // ─── Load / Save ───────────────────────────────────────

    /// Standard config file path: `~/.config/stashmatch/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("STASHMATCH_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("stashmatch")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        Self::load_from(&path)
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard path.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        self.save_to(&path)
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.matching.auto_match_threshold, 95);
        assert_eq!(cfg.matching.review_threshold, 70);
        assert_eq!(cfg.matching.batch_size, 50);
        assert!(cfg.apply.include_images);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = AppConfig::default();
        cfg.matching.auto_match_threshold = 90;
        cfg.apply.include_aliases = false;
        cfg.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.matching.auto_match_threshold, 90);
        assert!(!loaded.apply.include_aliases);
        assert_eq!(loaded.logging.level, "info");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[matching]\nbatch_size = 8\n").unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.matching.batch_size, 8);
        assert_eq!(loaded.matching.auto_match_threshold, 95);
        assert!(loaded.apply.include_parent_studios);
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let cfg =
            AppConfig::load_from(Path::new("/tmp/nonexistent_stashmatch_config.toml")).unwrap();
        assert_eq!(cfg.matching.batch_size, 50);
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let cfg = MatchConfig {
            auto_match_threshold: 60,
            review_threshold: 70,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(CoreError::ConfigError(_))));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[matching]\nbatch_size = 0\n").unwrap();

        assert!(AppConfig::load_from(&path).is_err());
    }
}
