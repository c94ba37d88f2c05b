//! Provider configuration for the external judge.
//!
//! Configuration is an explicit value handed to the judge at call time; there is
//! no process-wide provider state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_LOCAL_MODEL: &str = "llama3";
pub const DEFAULT_CLOUD_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_CLOUD_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// The two request/response envelopes the judge speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// OpenAI-compatible chat completions (Ollama, LM Studio, ...).
    LocalChat,
    /// Gemini `generateContent`.
    CloudGenerative,
}

impl ProviderKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "ollama" | "lmstudio" | "local" | "openai" => Some(Self::LocalChat),
            "gemini" | "google" => Some(Self::CloudGenerative),
            _ => None,
        }
    }
}

/// Caller-supplied provider settings, as received on the wire or from the environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    #[serde(default)]
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("No AI provider configured")]
    MissingProvider,

    #[error("Unknown AI provider '{0}'")]
    UnknownProvider(String),

    #[error("Provider '{0}' requires an API key")]
    MissingApiKey(String),

    #[error("Provider '{0}' requires a base URL")]
    MissingBaseUrl(String),
}

/// A provider configuration that passed validation, with defaults filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProvider {
    pub name: String,
    pub kind: ProviderKind,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl ProviderConfig {
    pub fn validate(&self) -> Result<ResolvedProvider, ConfigError> {
        let name = self.provider.trim();
        if name.is_empty() {
            return Err(ConfigError::MissingProvider);
        }
        let kind = ProviderKind::from_name(name)
            .ok_or_else(|| ConfigError::UnknownProvider(name.to_string()))?;

        let api_key = present(&self.api_key);
        let api_url = present(&self.api_url);

        let (base_url, default_model) = match kind {
            ProviderKind::CloudGenerative => {
                if api_key.is_none() {
                    return Err(ConfigError::MissingApiKey(name.to_string()));
                }
                (
                    api_url.unwrap_or_else(|| DEFAULT_CLOUD_BASE_URL.to_string()),
                    DEFAULT_CLOUD_MODEL,
                )
            }
            ProviderKind::LocalChat => (
                api_url.ok_or_else(|| ConfigError::MissingBaseUrl(name.to_string()))?,
                DEFAULT_LOCAL_MODEL,
            ),
        };

        Ok(ResolvedProvider {
            name: name.to_lowercase(),
            kind,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: present(&self.model).unwrap_or_else(|| default_model.to_string()),
            api_key,
        })
    }
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
