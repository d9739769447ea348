use directories::ProjectDirs;
use eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tsundoku_domain::LibraryOptions;
use tsundoku_storage::Stage;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub library: LibraryConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StorageConfig {
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct LibraryConfig {
    #[serde(default)]
    pub default_stage: Stage,
    #[serde(default)]
    pub compact_on_delete: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: get_default_data_dir()
                .join("library")
                .to_string_lossy()
                .to_string(),
        }
    }
}

impl LibraryConfig {
    pub fn options(&self) -> LibraryOptions {
        LibraryOptions {
            default_stage: self.default_stage,
            compact_on_delete: self.compact_on_delete,
        }
    }
}

impl Config {
    pub fn get_config_path() -> PathBuf {
        get_default_config_dir().join("config.json")
    }

    pub async fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()).await
    }

    /// Load from `config_path`, writing the defaults there if it is missing.
    pub async fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save_to(config_path).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(config_path).await?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub async fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()).await
    }

    pub async fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, content).await?;
        Ok(())
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["storage", "path"] => {
                self.storage.path = value.to_string();
            }
            ["library", "default_stage"] => {
                self.library.default_stage = value.parse::<Stage>()?;
            }
            ["library", "compact_on_delete"] => {
                self.library.compact_on_delete = value
                    .parse::<bool>()
                    .map_err(|_| eyre::eyre!("Invalid boolean value: {}", value))?;
            }
            _ => {
                return Err(eyre::eyre!("Unknown configuration key: {}", key));
            }
        }

        Ok(())
    }

    pub fn get_value(&self, key: &str) -> Result<String> {
        let parts: Vec<&str> = key.split('.').collect();

        let value = match parts.as_slice() {
            ["storage", "path"] => self.storage.path.clone(),
            ["library", "default_stage"] => self.library.default_stage.to_string(),
            ["library", "compact_on_delete"] => self.library.compact_on_delete.to_string(),
            _ => {
                return Err(eyre::eyre!("Unknown configuration key: {}", key));
            }
        };

        Ok(value)
    }

    pub fn show_all(&self) -> String {
        format!(
            "Configuration:\n\
             Storage:\n\
             └─ path: {}\n\
             Library:\n\
             ├─ default_stage: {}\n\
             └─ compact_on_delete: {}",
            self.storage.path, self.library.default_stage, self.library.compact_on_delete,
        )
    }

    pub async fn reset() -> Result<Self> {
        let config = Self::default();
        config.save().await?;
        Ok(config)
    }
}

/// Get the default configuration directory
fn get_default_config_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("org", "tsundoku", "tsundoku") {
        proj_dirs.config_dir().to_path_buf()
    } else {
        // Fallback to current directory if we can't determine project dirs
        PathBuf::from(".tsundoku").join("config")
    }
}

/// Get the default data directory
fn get_default_data_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("org", "tsundoku", "tsundoku") {
        proj_dirs.data_dir().to_path_buf()
    } else {
        PathBuf::from(".tsundoku").join("data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_and_get_values() {
        let mut config = Config::default();

        config.set_value("library.default_stage", "to-read").unwrap();
        config.set_value("library.compact_on_delete", "true").unwrap();
        config.set_value("storage.path", "/tmp/books").unwrap();

        assert_eq!(config.get_value("library.default_stage").unwrap(), "to_read");
        assert_eq!(config.get_value("library.compact_on_delete").unwrap(), "true");
        assert_eq!(config.get_value("storage.path").unwrap(), "/tmp/books");

        let options = config.library.options();
        assert_eq!(options.default_stage, Stage::ToRead);
        assert!(options.compact_on_delete);
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.set_value("library.default_stage", "shelf").is_err());
        assert!(config.set_value("library.compact_on_delete", "maybe").is_err());
        assert!(config.set_value("export.format", "epub").is_err());
        assert!(config.get_value("nope").is_err());
    }

    #[tokio::test]
    async fn test_load_creates_default_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/config.json");

        let config = Config::load_from(&path).await.unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        let mut changed = config.clone();
        changed.set_value("library.compact_on_delete", "true").unwrap();
        changed.save_to(&path).await.unwrap();

        let reloaded = Config::load_from(&path).await.unwrap();
        assert!(reloaded.library.compact_on_delete);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = serde_json::from_str(r#"{ "storage": { "path": "/x" } }"#).unwrap();
        assert_eq!(config.storage.path, "/x");
        assert_eq!(config.library, LibraryConfig::default());
    }
}
