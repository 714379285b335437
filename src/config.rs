//! Configuration loading and management for precis.
//!
//! Loads settings from `precis.toml` with environment variable overrides.
//! Every section has defaults, so a missing file is not an error.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::summary::DEFAULT_MIN_WORDS;

/// Environment variable overriding `remote.endpoint`
pub const SUMMARIZER_URL_ENV: &str = "PRECIS_SUMMARIZER_URL";

const CONFIG_FILE: &str = "precis.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Summary selection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Word floor the selection tops up to
    pub min_words: usize,
    /// Fixed seed for reproducible filler selection
    pub seed: Option<u64>,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            min_words: DEFAULT_MIN_WORDS,
            seed: None,
        }
    }
}

/// Speech backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Speech program, invoked as `program [-v voice] -s wpm text`
    pub program: String,
    /// Preferred voice name; unknown names fall back to the default voice
    pub voice: Option<String>,
    /// Initial playback rate
    pub rate: f32,
    /// Rate increment applied by fast forward
    pub rate_step: f32,
    /// Words per minute at rate 1.0
    pub base_wpm: u32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            program: "espeak-ng".to_string(),
            voice: None,
            rate: 1.0,
            rate_step: 0.5,
            base_wpm: 175,
        }
    }
}

/// Remote summarizer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the summarizer service; `POST {endpoint}/summarize`
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: 30,
        }
    }
}

/// Export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub file_name: String,
    /// Directory summaries are written to
    pub dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: "summary.txt".to_string(),
            dir: PathBuf::from("."),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub summary: SummaryConfig,
    pub speech: SpeechConfig,
    pub remote: RemoteConfig,
    pub export: ExportConfig,
}

impl Config {
    /// Load configuration from the default location (precis.toml in cwd or home)
    pub fn load() -> Result<Self, ConfigError> {
        match Self::find_config_file() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("no config file found, using defaults");
                let mut config = Config::default();
                config.apply_env();
                Ok(config)
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        debug!(path = %path.display(), "loaded config");

        config.apply_env();
        Ok(config)
    }

    /// Override settings from environment variables
    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(SUMMARIZER_URL_ENV) {
            if !url.trim().is_empty() {
                self.remote.endpoint = Some(url);
            }
        }
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let local_config = PathBuf::from(CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::home_dir()
            .map(|home| home.join(".config").join("precis").join(CONFIG_FILE))
            .filter(|path| path.exists())
    }

    /// Directory for log files and other runtime data
    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|dir| dir.join("precis"))
            .unwrap_or_else(|| PathBuf::from("./data"))
    }
}
