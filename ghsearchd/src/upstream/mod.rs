//! GitHub GraphQL user search.

use std::sync::Arc;

use ghsearch_api::response::ErrorBody;
use ghsearch_api::status::StatusCode;
use ghsearch_client::{HttpRequest, HttpResponse, RequestInit, Transport, TransportError};
use ghsearch_query::{Page, SearchParams};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub const USER_SEARCH_QUERY: &str = r#"query ($q: String!, $after: String, $first: Int, $before: String, $last: Int) {
  search(query: $q, type: USER, first: $first, last: $last, before: $before, after: $after) {
    userCount
    pageInfo {
      hasNextPage
      hasPreviousPage
      endCursor
      startCursor
    }
    users: nodes {
      ... on User {
        id
        login
        avatarUrl
        name
        company
        bio
        twitterUsername
        url
        websiteUrl
        status {
          message
        }
        followers: followers(first: 0) {
          totalCount
        }
        following: following(first: 0) {
          totalCount
        }
      }
    }
  }
}"#;

#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: GraphqlVariables<'a>,
}

#[derive(Serialize)]
struct GraphqlVariables<'a> {
    q: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    first: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    after: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    before: Option<&'a str>,
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("failed to encode upstream request: {0}")]
    Encode(String),

    #[error("upstream request timed out")]
    Timeout,

    #[error("upstream request failed: {0}")]
    Transport(TransportError),

    #[error("upstream rate limit exceeded")]
    RateLimited { status: u16, body: Value },

    #[error("upstream responded {status}")]
    Status { status: u16, body: Value },

    #[error("upstream returned GraphQL errors")]
    Graphql { errors: Value },

    #[error("upstream response was not valid JSON: {0}")]
    InvalidBody(String),

    #[error("upstream response has no `search` object")]
    MissingSearch,
}

impl UpstreamError {
    /// Status the proxy answers with for this failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            UpstreamError::Encode(_) => StatusCode::InternalServerError,
            UpstreamError::Timeout => StatusCode::GatewayTimeout,
            UpstreamError::RateLimited { .. } => StatusCode::TooManyRequests,
            UpstreamError::Transport(_)
            | UpstreamError::Status { .. }
            | UpstreamError::Graphql { .. }
            | UpstreamError::InvalidBody(_)
            | UpstreamError::MissingSearch => StatusCode::BadGateway,
        }
    }

    pub fn to_error_body(&self) -> ErrorBody {
        let body = ErrorBody::new(self.to_string());
        match self {
            UpstreamError::RateLimited { status, body: details } | UpstreamError::Status { status, body: details } => {
                body.with_upstream(*status, Some(details.clone()))
            }
            UpstreamError::Graphql { errors } => body.with_upstream(200, Some(errors.clone())),
            UpstreamError::MissingSearch => body.with_upstream(200, None),
            _ => body,
        }
    }
}

/// Client for the upstream GraphQL endpoint.
pub struct GithubGraphql {
    transport: Arc<dyn Transport>,
    endpoint: String,
    token: String,
}

impl GithubGraphql {
    pub fn new(transport: Arc<dyn Transport>, endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self { transport, endpoint: endpoint.into(), token: token.into() }
    }

    /// JSON body `{query, variables}` for one page of `params`.
    pub fn request_body(params: &SearchParams) -> serde_json::Result<Vec<u8>> {
        let vars = params.variables();
        serde_json::to_vec(&GraphqlRequest {
            query: USER_SEARCH_QUERY,
            variables: GraphqlVariables {
                q: &vars.q,
                first: vars.first,
                after: vars.after.as_deref(),
                last: vars.last,
                before: vars.before.as_deref(),
            },
        })
    }

    /// Run the search and return the upstream `search` object untouched.
    pub async fn search_users(&self, params: &SearchParams) -> Result<Value, UpstreamError> {
        let body = Self::request_body(params).map_err(|e| UpstreamError::Encode(e.to_string()))?;
        let direction = match &params.page {
            Page::First => "first",
            Page::After(_) => "after",
            Page::Before(_) => "before",
        };
        debug!(target: "ghsearchd::upstream", q = %params.q, direction, "querying upstream");

        let init = RequestInit { method: "POST".into(), headers: Vec::new(), body: Some(body) }
            .header("authorization", format!("bearer {}", self.token))
            .header("content-type", "application/json")
            .header("accept", "application/json");
        let response = match self.transport.send(HttpRequest::new(self.endpoint.as_str(), init)).await {
            Ok(r) => r,
            Err(TransportError::Timeout) => return Err(UpstreamError::Timeout),
            Err(e) => return Err(UpstreamError::Transport(e)),
        };
        extract_search(response)
    }
}

fn is_rate_limited(response: &HttpResponse) -> bool {
    response.status == 429
        || (response.status == 403 && response.header("x-ratelimit-remaining").map(str::trim) == Some("0"))
}

fn extract_search(response: HttpResponse) -> Result<Value, UpstreamError> {
    if !response.is_success() {
        let body = serde_json::from_slice(&response.body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&response.body).into_owned()));
        warn!(target: "ghsearchd::upstream", status = response.status, "upstream error response");
        if is_rate_limited(&response) {
            return Err(UpstreamError::RateLimited { status: response.status, body });
        }
        return Err(UpstreamError::Status { status: response.status, body });
    }

    let mut payload: Value =
        serde_json::from_slice(&response.body).map_err(|e| UpstreamError::InvalidBody(e.to_string()))?;
    if let Some(errors) = payload.get("errors").filter(|e| e.as_array().map_or(false, |a| !a.is_empty())) {
        return Err(UpstreamError::Graphql { errors: errors.clone() });
    }
    match payload.pointer_mut("/data/search").map(Value::take) {
        Some(search) if search.is_object() => Ok(search),
        _ => Err(UpstreamError::MissingSearch),
    }
}
