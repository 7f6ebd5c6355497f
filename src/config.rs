// Configuration: optional YAML file merged under CLI overrides

use crate::filter::SortKey;
use crate::storage::{FileStorage, KeyValueStore, SqliteStorage};
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const APP_DIR: &str = "todostore";
const CONFIG_FILE: &str = "config.yaml";

/// Which key-value backend holds the collections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// `todostore.db` inside the data directory
    #[default]
    Sqlite,
    /// One `<key>.json` file per collection
    Files,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: Backend,
    pub data_dir: PathBuf,
    pub default_sort: SortKey,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            data_dir: default_data_dir(),
            default_sort: SortKey::default(),
        }
    }
}

impl Config {
    /// Load configuration
    ///
    /// An explicit `path` must exist. Without one, the per-user config file is
    /// used if present, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config file {:?}", path))?;
        let config = Self::from_yaml(&content).with_context(|| format!("Invalid config file {:?}", path))?;
        info!(path = ?path, backend = ?config.backend, "Loaded config");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| eyre!("Failed to parse YAML config: {}", e))
    }

    /// Open the configured backend under `data_dir`
    pub fn open_storage(&self) -> Result<Box<dyn KeyValueStore>> {
        let storage: Box<dyn KeyValueStore> = match self.backend {
            Backend::Sqlite => Box::new(SqliteStorage::open(&self.data_dir)?),
            Backend::Files => Box::new(FileStorage::open(&self.data_dir)?),
        };
        Ok(storage)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".").join(format!(".{}", APP_DIR)))
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend, Backend::Sqlite);
        assert_eq!(config.default_sort, SortKey::DueDate);
        assert!(config.data_dir.to_string_lossy().contains("todostore"));
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = Config::from_yaml("backend: files\ndefault_sort: priority\n").unwrap();
        assert_eq!(config.backend, Backend::Files);
        assert_eq!(config.default_sort, SortKey::Priority);
        assert_eq!(config.data_dir, default_data_dir());
    }

    #[test]
    fn test_from_yaml_empty() {
        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
    }

    #[test]
    fn test_from_yaml_invalid() {
        assert!(Config::from_yaml("backend: cloud\n").is_err());
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let temp = TempDir::new().unwrap();
        assert!(Config::load(Some(temp.path().join("nope.yaml").as_path())).is_err());
    }

    #[test]
    fn test_load_file_and_open_storage() {
        let temp = TempDir::new().unwrap();
        let data_dir = temp.path().join("data");
        let config_path = temp.path().join("config.yaml");
        fs::write(
            &config_path,
            format!("backend: files\ndata_dir: {}\n", data_dir.display()),
        )
        .unwrap();

        let config = Config::load(Some(config_path.as_path())).unwrap();
        assert_eq!(config.data_dir, data_dir);

        let mut storage = config.open_storage().unwrap();
        storage.set("todos", "[]").unwrap();
        assert!(data_dir.join("todos.json").exists());
    }

    #[test]
    fn test_sqlite_backend_opens_db() {
        let temp = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp.path().to_path_buf(),
            ..Config::default()
        };

        let storage = config.open_storage().unwrap();
        assert_eq!(storage.get("todos").unwrap(), None);
        assert!(temp.path().join("todostore.db").exists());
    }
}
