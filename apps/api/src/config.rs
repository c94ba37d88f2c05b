use std::time::Duration;

use anyhow::{Context, Result};

use crate::judge::{BatchSettings, ProviderConfig};

/// Application configuration loaded from environment variables.
/// Every variable is optional; without `JUDGE_PROVIDER` scoring is heuristic only.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Default judge provider, overridable per request.
    pub judge: Option<ProviderConfig>,
    pub batch: BatchSettings,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = BatchSettings::default();

        let judge = var("JUDGE_PROVIDER")
            .filter(|p| !p.trim().is_empty())
            .map(|provider| ProviderConfig {
                provider,
                api_url: var("JUDGE_API_URL"),
                model: var("JUDGE_MODEL"),
                api_key: var("JUDGE_API_KEY"),
            });

        Ok(Config {
            port: parse_or(&var, "PORT", 8080u16)?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            judge,
            batch: BatchSettings {
                chunk_size: parse_or(&var, "JUDGE_CHUNK_SIZE", defaults.chunk_size)?,
                chunk_delay: Duration::from_millis(parse_or(
                    &var,
                    "JUDGE_CHUNK_DELAY_MS",
                    defaults.chunk_delay.as_millis() as u64,
                )?),
            },
        })
    }
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
