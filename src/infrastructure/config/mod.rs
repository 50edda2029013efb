//! Configuration management

pub mod paths;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::application::errors::ConfigError;

pub use paths::{relative_path_to_absolute, resolve_path, sanitize_path, strip_all_whitespace};

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    pub plugins: PluginConfig,
    pub adapters: AdaptersConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct PluginConfig {
    /// Loaded in order; each load replaces the active plugin table
    pub directories: Vec<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct AdaptersConfig {
    pub telegram: Option<TelegramConfig>,
    pub console: Option<ConsoleConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct TelegramConfig {
    pub enabled: bool,
    pub token: Option<String>,
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleConfig {
    pub enabled: bool,
}

fn default_poll_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "tendril-bot".to_string(),
            },
            plugins: PluginConfig {
                directories: vec![
                    PathBuf::from("./plugins/core"),
                    PathBuf::from("./plugins/contrib"),
                ],
            },
            adapters: AdaptersConfig {
                telegram: Some(TelegramConfig {
                    enabled: false,
                    token: None,
                    poll_timeout_secs: default_poll_timeout(),
                }),
                console: Some(ConsoleConfig {
                    enabled: true,
                }),
            },
        }
    }
}

impl Config {
    /// Shallow merge: each top-level key in `overrides` replaces that whole section
    pub fn merge(defaults: &Config, overrides: serde_yaml::Value) -> Result<Self, ConfigError> {
        let mut merged = serde_yaml::to_value(defaults)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize defaults: {}", e)))?;

        match (&mut merged, overrides) {
            (_, serde_yaml::Value::Null) => {}
            (serde_yaml::Value::Mapping(base), serde_yaml::Value::Mapping(user)) => {
                for (key, value) in user {
                    base.insert(key, value);
                }
            }
            (_, other) => {
                return Err(ConfigError::InvalidValue(format!(
                    "Config root must be a mapping, got {:?}",
                    other
                )));
            }
        }

        serde_yaml::from_value(merged)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    /// Parse a user document and merge it over the defaults
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let overrides: serde_yaml::Value = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;

        Self::merge(&Config::default(), overrides)
    }

    /// Load a config file; plugin paths resolve against the file's directory
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        let base_dir = path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .or_else(|| std::env::current_dir().ok());

        Ok(Self::from_yaml_str(&content)?
            .apply_env()
            .resolve_paths(base_dir.as_deref()))
    }

    /// Defaults plus environment overrides, resolved against the working directory
    pub fn load_env() -> Self {
        let base_dir = std::env::current_dir().ok();
        Config::default()
            .apply_env()
            .resolve_paths(base_dir.as_deref())
    }

    pub fn apply_env(mut self) -> Self {
        if let Ok(token) = std::env::var("BOT_TOKEN") {
            let telegram = self.adapters.telegram.get_or_insert(TelegramConfig {
                enabled: true,
                token: None,
                poll_timeout_secs: default_poll_timeout(),
            });
            telegram.token = Some(token);
            telegram.enabled = true;
        }

        self
    }

    /// Sanitize every plugin directory and make `./` paths absolute
    pub fn resolve_paths(mut self, base_dir: Option<&Path>) -> Self {
        self.plugins.directories = self.plugins.directories
            .iter()
            .map(|dir| resolve_path(&dir.to_string_lossy(), base_dir))
            .collect();
        self
    }

    /// Telegram token, if the adapter is enabled and has one
    pub fn telegram_token(&self) -> Option<String> {
        self.adapters.telegram
            .as_ref()
            .filter(|t| t.enabled)
            .and_then(|t| t.token.as_deref())
            .map(strip_all_whitespace)
            .filter(|t| !t.is_empty())
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(Config::from_yaml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_user_sections_replace_defaults() {
        let config = Config::from_yaml_str("bot:\n  name: custom\n").unwrap();
        assert_eq!(config.bot.name, "custom");
        // Untouched sections keep their defaults
        assert_eq!(config.plugins, Config::default().plugins);
        assert_eq!(config.adapters, Config::default().adapters);
    }

    #[test]
    fn test_merge_is_shallow() {
        let yaml = "adapters:\n  telegram:\n    enabled: true\n    token: abc\n";
        let config = Config::from_yaml_str(yaml).unwrap();
        // The whole adapters section was replaced, so console is gone
        assert!(config.adapters.console.is_none());
        assert_eq!(config.telegram_token().as_deref(), Some("abc"));
        assert_eq!(config.adapters.telegram.unwrap().poll_timeout_secs, 30);
    }

    #[test]
    fn test_non_mapping_root_is_rejected() {
        assert!(matches!(Config::from_yaml_str("- a\n- b\n"), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_resolve_paths() {
        let config = Config::default().resolve_paths(Some(Path::new("/opt/bot")));
        assert_eq!(
            config.plugins.directories,
            vec![PathBuf::from("/opt/bot/plugins/core"), PathBuf::from("/opt/bot/plugins/contrib")]
        );
    }

    #[test]
    fn test_disabled_telegram_has_no_token() {
        let mut config = Config::default();
        if let Some(t) = config.adapters.telegram.as_mut() {
            t.token = Some("abc".to_string());
        }
        assert!(config.telegram_token().is_none());
    }

    #[test]
    fn test_round_trip_yaml() {
        let yaml = Config::default().to_yaml().unwrap();
        assert_eq!(Config::from_yaml_str(&yaml).unwrap(), Config::default());
    }
}
