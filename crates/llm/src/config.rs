use crate::error::{LlmError, Result};
use std::fs;
use std::path::Path;

pub const ENV_LLM_MODEL: &str = "INCIDENT_LENS_LLM_MODEL";
pub const ENV_LLM_BASE_URL: &str = "INCIDENT_LENS_LLM_BASE_URL";
pub const ENV_LLM_API_KEY: &str = "INCIDENT_LENS_LLM_API_KEY";
pub const ENV_LLM_TIMEOUT_MS: &str = "INCIDENT_LENS_LLM_TIMEOUT_MS";

pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_LLM_BASE_URL: &str = "https://llmfoundry.straive.com/openai/v1";
pub const DEFAULT_LLM_TIMEOUT_MS: u64 = 120_000;

/// Endpoint settings for the OpenAI-compatible chat-completions service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextGenerationConfig {
    pub model: String,
    pub base_url: String,

    /// Sent as a bearer token when present
    pub api_key: Option<String>,

    pub timeout_ms: u64,
}

impl Default for TextGenerationConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_LLM_MODEL.to_string(),
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            api_key: None,
            timeout_ms: DEFAULT_LLM_TIMEOUT_MS,
        }
    }
}

impl TextGenerationConfig {
    /// TOML file keys take precedence over the environment.
    ///
    /// Keys are the environment variable names, either at the root or in an
    /// `[llm]` table.
    pub fn from_config_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|err| LlmError::ReadConfigFile {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        let value: toml::Value =
            toml::from_str(&content).map_err(|err| LlmError::ParseConfigFile {
                path: path.display().to_string(),
                message: err.to_string(),
            })?;
        let root = value.as_table().ok_or_else(|| LlmError::ParseConfigFile {
            path: path.display().to_string(),
            message: "root is not a TOML table".to_string(),
        })?;
        let table = root
            .get("llm")
            .and_then(toml::Value::as_table)
            .unwrap_or(root);

        Self::from_env_with(|key| {
            table
                .get(key)
                .and_then(toml_value_to_string)
                .or_else(|| std::env::var(key).ok())
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_env_with<F>(mut getter: F) -> Result<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let model = optional_value(&mut getter, ENV_LLM_MODEL)?
            .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string());
        let base_url = optional_value(&mut getter, ENV_LLM_BASE_URL)?
            .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string());
        let api_key = getter(ENV_LLM_API_KEY).filter(|key| !key.trim().is_empty());
        let timeout_ms = match getter(ENV_LLM_TIMEOUT_MS) {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map_err(|_| LlmError::InvalidTimeout { value })?,
            None => DEFAULT_LLM_TIMEOUT_MS,
        };

        Ok(Self {
            model,
            base_url,
            api_key,
            timeout_ms,
        })
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

fn toml_value_to_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(value) => Some(value.clone()),
        toml::Value::Integer(value) => Some(value.to_string()),
        toml::Value::Float(value) => Some(value.to_string()),
        toml::Value::Boolean(value) => Some(value.to_string()),
        _ => None,
    }
}

/// Absent keys fall back to defaults; present-but-blank keys are an error
fn optional_value<F>(getter: &mut F, key: &'static str) -> Result<Option<String>>
where
    F: FnMut(&str) -> Option<String>,
{
    match getter(key) {
        Some(value) if value.trim().is_empty() => Err(LlmError::EmptyValue { key }),
        other => Ok(other),
    }
}
