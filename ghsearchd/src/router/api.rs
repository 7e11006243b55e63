use anyhow::{Context, Result};
use ghsearch_api::response::ErrorBody;
use ghsearch_api::status::StatusCode;
use ghsearch_query::SearchParams;
use tracing::{info, warn};

use crate::proto::http_like::{Request, Response};
use crate::services::Services;

use super::util::{error_response, json_response};

pub async fn handle_search(req: Request, services: &Services) -> Result<Response> {
    let params = match SearchParams::from_pairs(req.query_pairs()) {
        Ok(p) => p,
        Err(e) => return Ok(error_response(StatusCode::BadRequest, &ErrorBody::new(e.to_string()))),
    };

    match services.upstream().search_users(&params).await {
        Ok(search) => {
            info!(q = %params.q, "search ok");
            let body = serde_json::to_vec(&search).context("encoding search result")?;
            Ok(json_response(StatusCode::Ok, body))
        }
        Err(e) => {
            let code = e.status_code();
            warn!(q = %params.q, status = code.as_u16(), "search failed: {e}");
            Ok(error_response(code, &e.to_error_body()))
        }
    }
}
