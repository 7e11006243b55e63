use ghsearch_api::response::ErrorBody;
use ghsearch_api::status::StatusCode;
use tracing::error;

use crate::proto::http_like::Response;

pub fn json_response(code: StatusCode, body: Vec<u8>) -> Response {
    Response { code, headers: vec![("content-type".into(), "application/json".into())], body }
}

pub fn error_response(code: StatusCode, body: &ErrorBody) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => json_response(code, bytes),
        Err(e) => {
            error!("failed to encode error body: {e}");
            json_response(code, b"{}".to_vec())
        }
    }
}
