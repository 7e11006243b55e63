use std::fmt;
use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const DEFAULT_GRAPHQL_URL: &str = "https://api.github.com/graphql";
pub const DEFAULT_ADDR: &str = "127.0.0.1:8888";

#[derive(Clone)]
pub struct ProxyConfig {
    /// Bearer credential for the upstream API. Never taken from requests.
    pub github_token: String,
    pub graphql_url: Url,
    pub addr: String,
    pub upstream_timeout_secs: u64, // 10 (0 disables)
    pub user_agent: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GITHUB_API_TOKEN is not set")]
    MissingToken,

    #[error("{var} is not a valid URL ({value:?}): {reason}")]
    InvalidUrl { var: &'static str, value: String, reason: String },
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("github_token", &"<set>")
            .field("graphql_url", &self.graphql_url.as_str())
            .field("addr", &self.addr)
            .field("upstream_timeout_secs", &self.upstream_timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ProxyConfig {
    /// - GITHUB_API_TOKEN (required)
    /// - GITHUB_GRAPHQL_URL (default https://api.github.com/graphql)
    /// - GHSEARCH_ADDR (default 127.0.0.1:8888)
    /// - GHSEARCH_UPSTREAM_TIMEOUT_SECS (default 10, 0 disables)
    /// - GHSEARCH_USER_AGENT (default ghsearchd/<version>)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let github_token = lookup("GITHUB_API_TOKEN")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let raw_url = lookup("GITHUB_GRAPHQL_URL").unwrap_or_else(|| DEFAULT_GRAPHQL_URL.to_string());
        let graphql_url = Url::parse(raw_url.trim()).map_err(|e| ConfigError::InvalidUrl {
            var: "GITHUB_GRAPHQL_URL",
            value: raw_url.clone(),
            reason: e.to_string(),
        })?;

        let addr = lookup("GHSEARCH_ADDR")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_ADDR.to_string());

        let upstream_timeout_secs = lookup("GHSEARCH_UPSTREAM_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(10);

        let user_agent = lookup("GHSEARCH_USER_AGENT")
            .unwrap_or_else(|| concat!("ghsearchd/", env!("CARGO_PKG_VERSION")).to_string());

        Ok(Self { github_token, graphql_url, addr, upstream_timeout_secs, user_agent })
    }

    pub fn upstream_timeout(&self) -> Option<Duration> {
        (self.upstream_timeout_secs > 0).then(|| Duration::from_secs(self.upstream_timeout_secs))
    }
}
