use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::{
    DEFAULT_CACHE_PAGES, DEFAULT_MAX_CONCURRENT_FETCHES, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT_SECS,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub paging: PagingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Seconds
    #[serde(default = "default_timeout")]
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagingConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_cache_pages")]
    pub cache_pages: usize,

    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
}

impl Config {
    /// Load from the user config directory, writing defaults on first run.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            debug!("Loading config from {:?}", path);
            let contents = fs::read_to_string(path).context("Failed to read config file")?;
            let config: Config =
                toml::from_str(&contents).context("Failed to parse config file")?;
            info!("Config loaded successfully");
            Ok(config)
        } else {
            info!("No config file found at {:?}, using defaults", path);
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents).context("Failed to write config file")?;

        debug!("Config saved to {:?}", path);
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to get config directory")?;
        Ok(config_dir.join("wholphin").join("config.toml"))
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connection_timeout: default_timeout(),
        }
    }
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            cache_pages: default_cache_pages(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
        }
    }
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}
fn default_cache_pages() -> usize {
    DEFAULT_CACHE_PAGES
}
fn default_max_concurrent_fetches() -> usize {
    DEFAULT_MAX_CONCURRENT_FETCHES
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[server]
url = "http://jellyfin.local:8096"
access_token = "abc"

[paging]
page_size = 20
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.server.url, "http://jellyfin.local:8096");
        assert_eq!(config.server.access_token.as_deref(), Some("abc"));
        assert_eq!(config.paging.page_size, 20);
        assert_eq!(config.paging.cache_pages, DEFAULT_CACHE_PAGES);
        assert_eq!(config.network.connection_timeout, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.server.user_id = "user".to_string();
        config.paging.max_concurrent_fetches = 4;
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[paging\npage_size = ").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}
