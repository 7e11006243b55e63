use anyhow::Result;
use ghsearch_api::response::ErrorBody;
use ghsearch_api::status::StatusCode;

use crate::proto::http_like::{Request, Response};
use crate::services::Services;

mod api;
pub(crate) mod util;

/// Paths the search function answers on. The last one matches hosts that
/// mount serverless functions under `/.netlify/functions/<name>`.
pub const SEARCH_ROUTES: [&str; 3] = ["/search", "/api/search", "/.netlify/functions/search"];

pub async fn handle(req: Request, services: &Services) -> Result<Response> {
    let route = req.route();
    let known = route == "/health/ready" || SEARCH_ROUTES.contains(&route);
    match (req.method.as_str(), route) {
        ("GET", "/health/ready") => Ok(util::json_response(StatusCode::Ok, b"{\"status\":\"ready\"}".to_vec())),
        ("GET", _) if known => api::handle_search(req, services).await,
        (_, _) if known => Ok(util::error_response(
            StatusCode::MethodNotAllowed,
            &ErrorBody::new(format!("method {} not allowed", req.method)),
        )),
        _ => Ok(util::error_response(StatusCode::NotFound, &ErrorBody::new(format!("no route for {route}")))),
    }
}
