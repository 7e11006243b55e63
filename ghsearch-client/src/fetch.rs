use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::transport::{HttpRequest, RequestInit, Transport};

/// `statusText` reported when no HTTP response exists.
pub const INTERNAL_ERROR: &str = "InternalError";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// Non-2xx response with a JSON body.
    #[error("upstream responded {status} {status_text}")]
    Upstream { status: u16, status_text: String, body: Value },
    /// The request never completed or the body was not JSON.
    #[error("{0}")]
    NetworkOrParse(String),
}

impl FetchError {
    pub fn status(&self) -> u16 {
        match self {
            FetchError::Upstream { status, .. } => *status,
            FetchError::NetworkOrParse(_) => 0,
        }
    }

    pub fn status_text(&self) -> &str {
        match self {
            FetchError::Upstream { status_text, .. } => status_text,
            FetchError::NetworkOrParse(_) => INTERNAL_ERROR,
        }
    }

    pub fn into_state(self) -> ErrorState {
        match self {
            FetchError::Upstream { status, status_text, body } => ErrorState { status, status_text, body },
            FetchError::NetworkOrParse(detail) => ErrorState {
                status: 0,
                status_text: INTERNAL_ERROR.to_string(),
                body: Value::String(detail),
            },
        }
    }
}

/// The normalized `{status, statusText, body}` error object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorState {
    pub status: u16,
    pub status_text: String,
    pub body: Value,
}

/// Issue one request and return the parsed JSON body of a 2xx response.
pub async fn fetch_json(transport: &dyn Transport, url: &str, init: &RequestInit) -> Result<Value, FetchError> {
    debug!(target: "ghsearch_client", method = %init.method, url, "fetch");
    let response = transport
        .send(HttpRequest::new(url, init.clone()))
        .await
        .map_err(|e| FetchError::NetworkOrParse(e.to_string()))?;
    let body: Value = serde_json::from_slice(&response.body)
        .map_err(|e| FetchError::NetworkOrParse(format!("invalid JSON body: {e}")))?;
    if response.is_success() {
        Ok(body)
    } else {
        Err(FetchError::Upstream { status: response.status, status_text: response.status_text, body })
    }
}
