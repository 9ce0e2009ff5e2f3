use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ChatGraphError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            temperature: 0.0,
            api_key: None,
            base_url: None,
        }
    }
}

impl ModelConfig {
    pub fn new(provider: impl Into<String>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            temperature,
            api_key: None,
            base_url: None,
        }
    }

    /// API key from config, then the generic variable, then the provider's own variables.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = &self.api_key {
            return Some(key.clone());
        }
        let provider_vars: &[&str] = match self.provider.as_str() {
            "groq" => &["GROQ_API_KEY"],
            "gemini" => &["GOOGLE_API_KEY", "GEMINI_API_KEY"],
            "openai" => &["OPENAI_API_KEY"],
            _ => &[],
        };
        std::iter::once("CHATGRAPH_API_KEY")
            .chain(provider_vars.iter().copied())
            .find_map(|var| env::var(var).ok().filter(|value| !value.is_empty()))
    }
}

fn default_provider() -> String {
    "gemini".into()
}

fn default_model() -> String {
    "gemini-2.5-flash".into()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    #[serde(default = "default_transcript_path")]
    pub transcript_path: PathBuf,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            transcript_path: default_transcript_path(),
            output_dir: None,
        }
    }
}

fn default_transcript_path() -> PathBuf {
    PathBuf::from("logging.txt")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn with_model(model: ModelConfig) -> Self {
        Self {
            model,
            session: SessionConfig::default(),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw)
            .map_err(|err| ChatGraphError::Config(format!("Failed to parse configuration: {err}")))
    }

    /// Load `path` if it exists (otherwise start from `fallback`), then apply
    /// `CHATGRAPH_*` environment overrides.
    pub fn from_env_or_file(path: impl AsRef<Path>, fallback: Self) -> Result<Self> {
        let path = path.as_ref();
        let mut cfg = if path.exists() {
            Self::from_file(path)?
        } else {
            fallback
        };
        cfg.apply_env()?;
        Ok(cfg)
    }

    /// `from_env_or_file` on `$CHATGRAPH_CONFIG`, or `chatgraph.toml` in the working directory.
    pub fn load(fallback: Self) -> Result<Self> {
        let path = env::var("CHATGRAPH_CONFIG").unwrap_or_else(|_| "chatgraph.toml".to_string());
        Self::from_env_or_file(path, fallback)
    }

    /// Operator overrides read once at startup. Model settings, temperature
    /// included, are never taken from the interactive session.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(provider) = env::var("CHATGRAPH_PROVIDER") {
            self.model.provider = provider.to_ascii_lowercase();
        }
        if let Ok(model) = env::var("CHATGRAPH_MODEL") {
            self.model.model = model;
        }
        if let Ok(temperature) = env::var("CHATGRAPH_TEMPERATURE") {
            self.model.temperature = temperature.parse::<f32>().map_err(|err| {
                ChatGraphError::Config(format!(
                    "CHATGRAPH_TEMPERATURE `{temperature}` is not a number: {err}"
                ))
            })?;
        }
        if let Ok(base_url) = env::var("CHATGRAPH_BASE_URL") {
            self.model.base_url = Some(base_url);
        }
        if let Ok(key) = env::var("CHATGRAPH_API_KEY") {
            self.model.api_key = Some(key);
        }
        if let Ok(path) = env::var("CHATGRAPH_TRANSCRIPT_PATH") {
            self.session.transcript_path = PathBuf::from(path);
        }
        if let Ok(dir) = env::var("CHATGRAPH_OUTPUT_DIR") {
            self.session.output_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::io::Write;
    use tempfile::NamedTempFile;

    // Environment variables are process-wide; keep every env-touching assertion in one test.
    #[test]
    fn loads_file_then_env_overrides() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[model]\nprovider='groq'\nmodel='llama-3.3-70b-versatile'\ntemperature=0.7\n[session]\noutput_dir='drafts'"
        )
        .unwrap();

        let cfg = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.model.provider, "groq");
        assert_eq!(cfg.model.temperature, 0.7);
        assert_eq!(cfg.session.output_dir, Some(PathBuf::from("drafts")));
        assert_eq!(cfg.session.transcript_path, PathBuf::from("logging.txt"));

        env::set_var("CHATGRAPH_MODEL", "llama-3.1-8b-instant");
        env::set_var("CHATGRAPH_TRANSCRIPT_PATH", "chat.log");
        let cfg = AppConfig::from_env_or_file(file.path(), AppConfig::default()).unwrap();
        assert_eq!(cfg.model.model, "llama-3.1-8b-instant");
        assert_eq!(cfg.session.transcript_path, PathBuf::from("chat.log"));

        let fallback = AppConfig::with_model(ModelConfig::new("stub", "scripted", 0.3));
        let cfg = AppConfig::from_env_or_file("/nonexistent/chatgraph.toml", fallback).unwrap();
        assert_eq!(cfg.model.provider, "stub");
        assert_eq!(cfg.model.model, "llama-3.1-8b-instant");
        assert_eq!(cfg.model.temperature, 0.3);

        env::set_var("CHATGRAPH_TEMPERATURE", "warm");
        let err = AppConfig::from_env_or_file(file.path(), AppConfig::default()).unwrap_err();
        assert!(matches!(err, ChatGraphError::Config(_)));

        env::remove_var("CHATGRAPH_MODEL");
        env::remove_var("CHATGRAPH_TRANSCRIPT_PATH");
        env::remove_var("CHATGRAPH_TEMPERATURE");
    }

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = AppConfig::from_toml("").unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.model.model, "gemini-2.5-flash");
    }

    #[test]
    fn explicit_key_wins() {
        let mut model = ModelConfig::new("groq", "llama", 0.0);
        model.api_key = Some("from-config".into());
        assert_eq!(model.resolve_api_key().as_deref(), Some("from-config"));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = AppConfig::from_toml("[model\nprovider=").unwrap_err();
        assert!(err.to_string().contains("Failed to parse configuration"));
    }
}
