use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Explicit mpv binary.  When unset, mpv is looked up beside the
    /// executable and then on PATH.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mpv_binary: Option<PathBuf>,
    /// Skip the beside-the-executable lookup and use PATH only.
    #[serde(default)]
    pub use_system_mpv: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// TOML track list that replaces the built-in catalog when present.
    /// Defaults to `$XDG_CONFIG_HOME/spin/catalog.toml`.
    #[serde(default = "default_catalog_toml")]
    pub catalog_toml: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// tracing filter used when RUST_LOG is not set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_show_keys_bar")]
    pub show_keys_bar: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            catalog_toml: default_catalog_toml(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_keys_bar: default_show_keys_bar(),
        }
    }
}

fn default_catalog_toml() -> PathBuf {
    platform::config_dir().join("catalog.toml")
}

fn default_log_filter() -> String {
    "debug".to_string()
}

fn default_show_keys_bar() -> bool {
    true
}

impl Config {
    /// Writes defaults to `config_path` on first run.
    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log.filter, "debug");
        assert!(config.ui.show_keys_bar);
        assert!(config.audio.mpv_binary.is_none());
        assert!(config.catalog.catalog_toml.ends_with("spin/catalog.toml"));
    }

    #[test]
    fn test_first_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.log.filter, "debug");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[audio]\nuse_system_mpv = true\n\n[ui]\nshow_keys_bar = false\n",
        )
        .unwrap();
        let config = Config::load_from(&path).unwrap();
        assert!(config.audio.use_system_mpv);
        assert!(!config.ui.show_keys_bar);
        assert_eq!(config.log.filter, "debug");
    }
}
