//! Runtime configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::embedding::EmbeddingProviderConfig;
use crate::StoryError;

pub const CONFIG_FILE: &str = "storyloom.toml";
pub const CONFIG_ENV: &str = "STORYLOOM_CONFIG";
pub const DATA_PATH_ENV: &str = "STORYLOOM_DATA_PATH";

fn default_utc_offset_hours() -> i32 {
    8
}

fn default_handler() -> String {
    "live".to_string()
}

fn default_cache_capacity() -> u64 {
    1024
}

/// Process-wide runtime settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Offset used for the "current time" prompt section
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
    /// Handler used when a story does not name one
    #[serde(default = "default_handler")]
    pub default_handler: String,
    #[serde(default)]
    pub embedding: EmbeddingProviderConfig,
    /// Query-embedding cache entries; 0 disables the cache
    #[serde(default = "default_cache_capacity")]
    pub embedding_cache_capacity: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: default_utc_offset_hours(),
            default_handler: default_handler(),
            embedding: EmbeddingProviderConfig::default(),
            embedding_cache_capacity: default_cache_capacity(),
        }
    }
}

impl RuntimeConfig {
    pub fn validate(&self) -> Result<(), StoryError> {
        if !(-12..=14).contains(&self.utc_offset_hours) {
            return Err(StoryError::Config(format!(
                "utc_offset_hours must be between -12 and 14, got {}",
                self.utc_offset_hours
            )));
        }
        if self.default_handler.trim().is_empty() {
            return Err(StoryError::Config("default_handler must not be empty".into()));
        }
        Ok(())
    }
}

/// Load runtime config with priority:
/// 1. `{data_path}/storyloom.toml`
/// 2. `STORYLOOM_CONFIG` env var (JSON)
/// 3. Defaults
///
/// Unreadable sources are logged and skipped.
pub fn load_runtime_config(data_path: &Path) -> RuntimeConfig {
    let config_path = data_path.join(CONFIG_FILE);
    if config_path.exists() {
        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str::<RuntimeConfig>(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded runtime config from {}", config_path.display());
                    return config;
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse {}: {}. Using defaults.",
                        config_path.display(),
                        e
                    );
                }
            },
            Err(e) => {
                tracing::warn!(
                    "Failed to read {}: {}. Using defaults.",
                    config_path.display(),
                    e
                );
            }
        }
    }

    if let Ok(json) = std::env::var(CONFIG_ENV) {
        match serde_json::from_str::<RuntimeConfig>(&json) {
            Ok(config) => {
                tracing::info!("Loaded runtime config from {} env", CONFIG_ENV);
                return config;
            }
            Err(e) => tracing::warn!("Failed to parse {}: {}. Using defaults.", CONFIG_ENV, e),
        }
    }

    RuntimeConfig::default()
}

/// Data path priority: explicit path > STORYLOOM_DATA_PATH env > ./.storyloom (if exists) > ~/.storyloom
pub fn resolve_data_path(explicit_path: Option<PathBuf>) -> PathBuf {
    explicit_path
        .or_else(|| std::env::var(DATA_PATH_ENV).ok().map(PathBuf::from))
        .or_else(|| {
            let local_path = Path::new(".storyloom");
            if local_path.is_dir() {
                Some(local_path.to_path_buf())
            } else {
                None
            }
        })
        .unwrap_or_else(|| {
            dirs::home_dir()
                .map(|h| h.join(".storyloom"))
                .unwrap_or_else(|| PathBuf::from(".storyloom"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_config_fills_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "utc_offset_hours = 9\n\n[embedding]\nprovider = \"noop\"\n",
        )
        .unwrap();

        let config = load_runtime_config(dir.path());
        assert_eq!(config.utc_offset_hours, 9);
        assert_eq!(config.embedding, EmbeddingProviderConfig::Noop);
        assert_eq!(config.default_handler, "live");
        assert_eq!(config.embedding_cache_capacity, 1024);
    }

    #[test]
    fn test_broken_file_falls_back() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "utc_offset_hours = \"east\"").unwrap();
        assert_eq!(load_runtime_config(dir.path()), RuntimeConfig::default());
    }

    #[test]
    fn test_validate_offset_range() {
        let mut config = RuntimeConfig::default();
        assert!(config.validate().is_ok());
        config.utc_offset_hours = 20;
        assert!(matches!(config.validate(), Err(StoryError::Config(_))));
    }

    #[test]
    fn test_explicit_data_path_wins() {
        let path = resolve_data_path(Some(PathBuf::from("/tmp/explicit")));
        assert_eq!(path, PathBuf::from("/tmp/explicit"));
    }
}
