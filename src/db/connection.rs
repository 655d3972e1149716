use std::path::Path;

use serde::{Deserialize, Serialize};
use surrealdb::engine::any::Any;
use surrealdb::Surreal;

use crate::StoryError;

/// Unified database handle type. Works with both embedded and remote SurrealDB.
pub type StoryDb = Surreal<Any>;

fn default_namespace() -> String {
    "storyloom".to_string()
}

fn default_database() -> String {
    "stories".to_string()
}

/// Database connection configuration.
/// Loaded from `{data_path}/database.toml`, env vars, or defaults to embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DbConfig {
    /// Embedded RocksDB. Single-process access.
    Embedded {
        /// Overrides the default RocksDB path (`{data_path}/db` is implicit)
        #[serde(default)]
        path: Option<String>,
    },
    /// Remote SurrealDB server via WebSocket.
    Remote {
        /// WebSocket endpoint (e.g. `ws://127.0.0.1:8000`)
        endpoint: String,
        /// Username (can also be set via `STORYLOOM_DB_USER`)
        #[serde(default)]
        username: Option<String>,
        /// Password (can also be set via `STORYLOOM_DB_PASS`)
        #[serde(default)]
        password: Option<String>,
        #[serde(default = "default_namespace")]
        namespace: String,
        #[serde(default = "default_database")]
        database: String,
    },
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::Embedded { path: None }
    }
}

/// Load database config with priority:
/// 1. `{data_path}/database.toml` file
/// 2. `STORYLOOM_DB_URL` env var → `Remote` config
/// 3. Default → `Embedded { path: None }`
pub fn load_db_config(data_path: &Path) -> DbConfig {
    let config_path = data_path.join("database.toml");
    if config_path.exists() {
        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str::<DbConfig>(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded database config from {}", config_path.display());
                    return config;
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse {}: {}. Using default.",
                        config_path.display(),
                        e
                    );
                }
            },
            Err(e) => {
                tracing::warn!(
                    "Failed to read {}: {}. Using default.",
                    config_path.display(),
                    e
                );
            }
        }
    }

    if let Ok(url) = std::env::var("STORYLOOM_DB_URL") {
        tracing::info!("Loaded database config from STORYLOOM_DB_URL env");
        return DbConfig::Remote {
            endpoint: url,
            username: std::env::var("STORYLOOM_DB_USER").ok(),
            password: std::env::var("STORYLOOM_DB_PASS").ok(),
            namespace: default_namespace(),
            database: default_database(),
        };
    }

    DbConfig::default()
}

/// Connect to SurrealDB and select the namespace/database.
///
/// # Arguments
///
/// * `config` - Database connection configuration
/// * `data_path` - Base data directory (default RocksDB location for embedded mode)
pub async fn init_db(config: &DbConfig, data_path: &Path) -> Result<StoryDb, StoryError> {
    match config {
        DbConfig::Embedded { path } => {
            let db_path = path
                .as_deref()
                .map(String::from)
                .unwrap_or_else(|| data_path.join("db").to_string_lossy().into_owned());
            let db = surrealdb::engine::any::connect(format!("rocksdb:{db_path}")).await?;
            db.use_ns(default_namespace())
                .use_db(default_database())
                .await?;
            Ok(db)
        }
        DbConfig::Remote {
            endpoint,
            username,
            password,
            namespace,
            database,
        } => {
            let db = surrealdb::engine::any::connect(endpoint).await?;
            // Resolve credentials: config field > env var > default
            let user = username
                .clone()
                .or_else(|| std::env::var("STORYLOOM_DB_USER").ok())
                .unwrap_or_else(|| "root".to_string());
            let pass = password
                .clone()
                .or_else(|| std::env::var("STORYLOOM_DB_PASS").ok())
                .unwrap_or_else(|| "root".to_string());
            db.signin(surrealdb::opt::auth::Root {
                username: &user,
                password: &pass,
            })
            .await?;
            db.use_ns(namespace).use_db(database).await?;
            Ok(db)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_config_toml_remote() {
        let config: DbConfig =
            toml::from_str("mode = \"remote\"\nendpoint = \"ws://127.0.0.1:8000\"").unwrap();
        match config {
            DbConfig::Remote {
                endpoint,
                namespace,
                database,
                ..
            } => {
                assert_eq!(endpoint, "ws://127.0.0.1:8000");
                assert_eq!(namespace, "storyloom");
                assert_eq!(database, "stories");
            }
            other => panic!("unexpected config: {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_defaults_to_embedded() {
        let dir = tempfile::TempDir::new().unwrap();
        if std::env::var("STORYLOOM_DB_URL").is_err() {
            assert!(matches!(
                load_db_config(dir.path()),
                DbConfig::Embedded { path: None }
            ));
        }
    }
}
