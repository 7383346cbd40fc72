use serde::Deserialize;
use std::path::PathBuf;

use crate::types::SortMode;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Sort mode used for the first page; see [`SortMode::parse_or_default`].
    pub default_sort: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_sort: "updated".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub token_env: Option<String>,
    pub token_command: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_env: Some("GITHUB_TOKEN".to_string()),
            token_command: Some("gh auth token".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub retries: u32,
    pub retry_backoff_ms: u64,
    pub timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            retries: 2,
            retry_backoff_ms: 500,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Spinner frame interval.
    pub tick_rate_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { tick_rate_ms: 100 }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub auth: AuthConfig,
    pub network: NetworkConfig,
    pub ui: UiConfig,
}

pub fn config_dir() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("forkview"))
}

fn config_path() -> Option<PathBuf> {
    Some(config_dir()?.join("config.toml"))
}

impl Config {
    /// Load `~/.config/forkview/config.toml`, falling back to defaults.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Config::default();
        };

        let Ok(content) = std::fs::read_to_string(&path) else {
            return Config::default();
        };

        match toml::from_str::<Config>(&content) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "invalid config, using defaults");
                Config::default()
            }
        }
    }

    pub fn default_sort(&self) -> SortMode {
        SortMode::parse_or_default(&self.general.default_sort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
[general]
default_sort = "stars"

[auth]
token_env = "FORKVIEW_TOKEN"
token_command = "pass show github"

[network]
retries = 0
retry_backoff_ms = 100
timeout_secs = 5

[ui]
tick_rate_ms = 80
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.default_sort(), SortMode::Stargazers);
        assert_eq!(config.auth.token_env.as_deref(), Some("FORKVIEW_TOKEN"));
        assert_eq!(config.auth.token_command.as_deref(), Some("pass show github"));
        assert_eq!(config.network.retries, 0);
        assert_eq!(config.network.timeout_secs, 5);
        assert_eq!(config.ui.tick_rate_ms, 80);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let config: Config = toml::from_str("[network]\nretries = 5\n").unwrap();
        assert_eq!(config.network.retries, 5);
        assert_eq!(config.network.retry_backoff_ms, 500);
        assert_eq!(config.default_sort(), SortMode::UpdatedAt);
        assert_eq!(config.auth.token_env.as_deref(), Some("GITHUB_TOKEN"));
        assert_eq!(config.ui.tick_rate_ms, 100);
    }

    #[test]
    fn unknown_default_sort_falls_back() {
        let config: Config = toml::from_str("[general]\ndefault_sort = \"popularity\"\n").unwrap();
        assert_eq!(config.default_sort(), SortMode::UpdatedAt);
    }
}
