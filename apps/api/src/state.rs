use reqwest::Client;

use crate::config::Config;
use crate::judge::{ConfigError, HttpJudge, ProviderConfig, ResolvedProvider};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Outbound client shared by every judge.
    pub http: Client,
    /// Validated default provider from the environment, if any.
    pub default_judge: Option<ResolvedProvider>,
}

impl AppState {
    /// Validates the default provider up front; a misconfigured one aborts startup.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let default_judge = config
            .judge
            .as_ref()
            .map(ProviderConfig::validate)
            .transpose()?;
        let http = HttpJudge::build_client()?;

        Ok(Self {
            config,
            http,
            default_judge,
        })
    }

    /// Resolves the judge for one call: a provider in the request wins over the default.
    pub fn judge_for(
        &self,
        requested: Option<&ProviderConfig>,
    ) -> Result<Option<HttpJudge>, ConfigError> {
        let provider = match requested {
            Some(config) => Some(config.validate()?),
            None => self.default_judge.clone(),
        };
        Ok(provider.map(|p| HttpJudge::new(self.http.clone(), p)))
    }
}
