use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::app::TrainerSettings;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_analysis_interval")]
    pub analysis_interval: u64,
    #[serde(default = "default_celebration_ms")]
    pub celebration_ms: u64,
    #[serde(default = "default_learn_mode")]
    pub learn_mode: bool,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Per-request timeout; unset keeps the transport default.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_server_url() -> String {
    "http://127.0.0.1:5000".to_string()
}
fn default_analysis_interval() -> u64 {
    20
}
fn default_celebration_ms() -> u64 {
    800
}
fn default_learn_mode() -> bool {
    true
}
fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            analysis_interval: default_analysis_interval(),
            celebration_ms: default_celebration_ms(),
            learn_mode: default_learn_mode(),
            theme: default_theme(),
            log_level: default_log_level(),
            request_timeout_secs: None,
        }
    }
}

impl Config {
    fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Startup load. Writes the defaults out on first run so there is a file
    /// to edit; a file that cannot be read or parsed gives the defaults back
    /// together with the error, for the caller to report.
    pub fn load_or_init() -> (Self, Option<anyhow::Error>) {
        Self::load_or_init_at(&Self::config_path())
    }

    fn load_or_init_at(path: &Path) -> (Self, Option<anyhow::Error>) {
        if path.exists() {
            return match Self::load_from(path) {
                Ok(config) => (config, None),
                Err(err) => (Config::default(), Some(err)),
            };
        }
        let config = Config::default();
        let err = config.save_to(path).err();
        (config, err)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tapcoach")
            .join("config.toml")
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn trainer_settings(&self, fallback_level: u32) -> TrainerSettings {
        TrainerSettings {
            analysis_interval: self.analysis_interval,
            celebration: Duration::from_millis(self.celebration_ms),
            learn_mode: self.learn_mode,
            fallback_level,
        }
    }
}
