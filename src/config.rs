//! Configuration file loading with environment variable overrides.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::adapters::live::gemini::GEMINI_API_BASE;
use crate::model::{DEFAULT_EDIT_MODEL, DEFAULT_GENERATE_MODEL};

/// Environment variables checked for the API key, in order.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// API key configuration.
    #[serde(default)]
    pub keys: KeysConfig,

    /// Model selection.
    #[serde(default)]
    pub models: ModelsConfig,

    /// Where and how images are saved.
    #[serde(default)]
    pub output: OutputConfig,

    /// Remote endpoint.
    #[serde(default)]
    pub api: ApiConfig,
}

/// API key configuration.
#[derive(Debug, Default, Deserialize)]
pub struct KeysConfig {
    /// Gemini API key.
    pub gemini: Option<String>,
}

/// Model names (aliases allowed).
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Text-to-image model for step 1.
    pub generate: String,
    /// Image-editing model for steps 2 and 3.
    pub edit: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self { generate: DEFAULT_GENERATE_MODEL.to_string(), edit: DEFAULT_EDIT_MODEL.to_string() }
    }
}

/// Output settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for saved images.
    pub dir: PathBuf,
    /// Saved image format: jpeg, png or webp.
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dir: PathBuf::from("."), format: "jpeg".to_string() }
    }
}

/// Endpoint settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// REST base for model calls.
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: GEMINI_API_BASE.to_string() }
    }
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// Get the API key, preferring environment variables.
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        API_KEY_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
            .or_else(|| self.keys.gemini.clone())
    }
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `MOCKUP_CONFIG` environment variable
/// 3. `~/.config/mockup/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("MOCKUP_CONFIG") {
        return PathBuf::from(p);
    }

    default_config_path()
}

fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/mockup/config.toml")
    } else {
        PathBuf::from("mockup.toml")
    }
}
