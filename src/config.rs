// Settings and secrets for the insight assistant.
//
// Non-secret options live in an optional TOML file:
//   <config_dir>/paid-media-report/settings.toml
// The API key is only ever read from the environment; it is never stored in
// the settings file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const API_KEY_VAR: &str = "PAID_MEDIA_API_KEY";
pub const FALLBACK_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const MODEL_VAR: &str = "PAID_MEDIA_MODEL";
pub const BASE_URL_VAR: &str = "PAID_MEDIA_BASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing settings: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Contents of `settings.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub insight: InsightSettings,
}

/// `[insight]` table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct InsightSettings {
    pub model: String,
    /// OpenAI-compatible API root, without the `/chat/completions` suffix.
    pub base_url: String,
    pub timeout_secs: u64,
    pub temperature: f32,
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout_secs: 60,
            temperature: 0.3,
        }
    }
}

/// Where the API key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Environment,
    None,
}

/// Fully resolved assistant configuration.
#[derive(Debug, Clone)]
pub struct InsightConfig {
    pub settings: InsightSettings,
    pub api_key: Option<String>,
    pub key_source: KeySource,
}

impl Settings {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// `<config_dir>/paid-media-report/settings.toml`, if a config dir exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(env!("CARGO_PKG_NAME")).join("settings.toml"))
    }

    /// Load the settings file if present; a broken file falls back to defaults.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::from_path(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring settings file: {e}");
                Self::default()
            }
        }
    }

    /// Apply `PAID_MEDIA_*` overrides through `lookup` (usually `std::env::var`).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(model) = lookup(MODEL_VAR).filter(|v| !v.is_empty()) {
            self.insight.model = model;
        }
        if let Some(url) = lookup(BASE_URL_VAR).filter(|v| !v.is_empty()) {
            self.insight.base_url = url;
        }
    }

    /// Resolve the assistant config, taking the key from `lookup`.
    pub fn resolve_insight(&self, lookup: impl Fn(&str) -> Option<String>) -> InsightConfig {
        let api_key = [API_KEY_VAR, FALLBACK_API_KEY_VAR]
            .into_iter()
            .find_map(|var| lookup(var).filter(|k| !k.trim().is_empty()));
        let key_source = if api_key.is_some() {
            KeySource::Environment
        } else {
            KeySource::None
        };
        InsightConfig {
            settings: self.insight.clone(),
            api_key,
            key_source,
        }
    }
}

/// Settings file + process environment.
pub fn resolve_from_env() -> InsightConfig {
    let env = |name: &str| std::env::var(name).ok();
    let mut settings = Settings::load();
    settings.apply_env(env);
    let config = settings.resolve_insight(env);
    log::info!(
        "Insight assistant: model={}, key={:?}",
        config.settings.model,
        config.key_source
    );
    config
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = Settings::from_toml_str("[insight]\nmodel = \"gpt-4.1\"\n").unwrap();
        assert_eq!(settings.insight.model, "gpt-4.1");
        assert_eq!(settings.insight.timeout_secs, 60);
        assert_eq!(settings.insight.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(Settings::from_toml_str("").unwrap(), Settings::default());
    }

    #[test]
    fn test_malformed_toml_is_error() {
        assert!(matches!(
            Settings::from_toml_str("[insight\nmodel = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[insight]\ntimeout_secs = 5\n").unwrap();
        assert_eq!(Settings::from_path(&path).unwrap().insight.timeout_secs, 5);

        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            Settings::from_path(&missing),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        settings.apply_env(env(&[(MODEL_VAR, "local-model"), (BASE_URL_VAR, "")]));
        assert_eq!(settings.insight.model, "local-model");
        assert_eq!(settings.insight.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn test_key_resolution_order() {
        let settings = Settings::default();

        let both = settings.resolve_insight(env(&[
            (API_KEY_VAR, "primary"),
            (FALLBACK_API_KEY_VAR, "fallback"),
        ]));
        assert_eq!(both.api_key.as_deref(), Some("primary"));
        assert_eq!(both.key_source, KeySource::Environment);

        let fallback = settings.resolve_insight(env(&[(FALLBACK_API_KEY_VAR, "fallback")]));
        assert_eq!(fallback.api_key.as_deref(), Some("fallback"));

        let blank = settings.resolve_insight(env(&[(API_KEY_VAR, "  ")]));
        assert!(blank.api_key.is_none());
        assert_eq!(blank.key_source, KeySource::None);
    }
}
