use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// Environment variable consulted before the config file for the API key.
pub const ENV_API_KEY: &str = "GEMINI_API_KEY";

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Gemini API key. `GEMINI_API_KEY` in the environment takes precedence.
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

const fn default_timeout_secs() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Platform data directory, used as the key-value store root.
    pub fn data_dir() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "comfortcast", "comfort")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// The API key to use, preferring the environment over the file.
    pub fn resolved_api_key(&self) -> Result<String> {
        resolve_api_key(std::env::var(ENV_API_KEY).ok(), self.api_key.clone())
    }
}

fn resolve_api_key(env_key: Option<String>, file_key: Option<String>) -> Result<String> {
    env_key
        .filter(|k| !k.trim().is_empty())
        .or_else(|| file_key.filter(|k| !k.trim().is_empty()))
        .ok_or_else(|| {
            anyhow!(
                "No Gemini API key configured.\n\
                 Hint: run `comfort configure` and enter your API key, \
                 or set the {ENV_API_KEY} environment variable."
            )
        })
}
