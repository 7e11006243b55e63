use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use ghsearch_client::ReqwestTransport;
use once_cell::sync::OnceCell;

use crate::config::ProxyConfig;
use crate::upstream::GithubGraphql;

pub struct Services {
    upstream: GithubGraphql,
}

impl Services {
    pub fn new(upstream: GithubGraphql) -> Self {
        Self { upstream }
    }

    /// Production wiring: reqwest transport with the configured timeout.
    pub fn from_config(cfg: &ProxyConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&cfg.user_agent, cfg.upstream_timeout())
            .context("failed to build upstream HTTP client")?;
        Ok(Self::new(GithubGraphql::new(
            Arc::new(transport),
            cfg.graphql_url.as_str(),
            cfg.github_token.clone(),
        )))
    }

    pub fn upstream(&self) -> &GithubGraphql {
        &self.upstream
    }
}

static SERVICES: OnceCell<Services> = OnceCell::new();

/// Install the process-wide services; connection tasks borrow them for `'static`.
pub fn init(services: Services) -> Result<&'static Services> {
    SERVICES
        .set(services)
        .map_err(|_| anyhow!("services already initialized"))?;
    SERVICES.get().ok_or_else(|| anyhow!("services not initialized"))
}
