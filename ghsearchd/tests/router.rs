mod common;

use ghsearch_api::response::ErrorBody;
use ghsearch_client::TransportError;
use ghsearchd::proto::http_like::Request;
use ghsearchd::router::handle;
use serde_json::{json, Value};

use common::{ok_upstream, sample_search, services_with, FakeUpstream, ENDPOINT, TOKEN};

fn error_body(body: &[u8]) -> ErrorBody {
    serde_json::from_slice(body).expect("structured error body")
}

#[tokio::test]
async fn health_ready_returns_200_and_json() {
    let services = services_with(ok_upstream());
    let resp = handle(Request::get("/health/ready"), &services).await.expect("router should handle");
    assert_eq!(resp.code.as_u16(), 200);
    assert_eq!(resp.header("content-type"), Some("application/json"));
    assert_eq!(String::from_utf8_lossy(&resp.body), "{\"status\":\"ready\"}");
}

#[tokio::test]
async fn search_passes_the_upstream_object_through() {
    let upstream = ok_upstream();
    let services = services_with(upstream.clone());
    let resp = handle(Request::get("/search?q=octocat"), &services).await.unwrap();
    assert_eq!(resp.code.as_u16(), 200);
    let v: Value = serde_json::from_slice(&resp.body).expect("valid json");
    assert_eq!(v, sample_search());

    let calls = upstream.calls();
    assert_eq!(calls[0].url, ENDPOINT);
    assert_eq!(calls[0].init.method, "POST");
    assert!(calls[0]
        .init
        .headers
        .contains(&("authorization".to_string(), format!("bearer {TOKEN}"))));
}

#[tokio::test]
async fn no_cursor_requests_first_twelve() {
    let upstream = ok_upstream();
    let services = services_with(upstream.clone());
    handle(Request::get("/search?q=rust+lang"), &services).await.unwrap();
    assert_eq!(upstream.sent_variables(), json!({ "q": "rust lang", "first": 12 }));
}

#[tokio::test]
async fn next_cursor_requests_the_following_page() {
    let upstream = ok_upstream();
    let services = services_with(upstream.clone());
    handle(Request::get("/search?q=rust&next=Y3Vyc29yOjEy"), &services).await.unwrap();
    assert_eq!(upstream.sent_variables(), json!({ "q": "rust", "first": 12, "after": "Y3Vyc29yOjEy" }));
}

#[tokio::test]
async fn prev_cursor_requests_the_preceding_page() {
    let upstream = ok_upstream();
    let services = services_with(upstream.clone());
    handle(Request::get("/api/search?q=rust&prev=Y3Vyc29yOjEz"), &services).await.unwrap();
    assert_eq!(upstream.sent_variables(), json!({ "q": "rust", "last": 12, "before": "Y3Vyc29yOjEz" }));
}

#[tokio::test]
async fn next_wins_when_both_cursors_are_given() {
    let upstream = ok_upstream();
    let services = services_with(upstream.clone());
    handle(Request::get("/.netlify/functions/search?q=rust&prev=p&next=n"), &services).await.unwrap();
    assert_eq!(upstream.sent_variables(), json!({ "q": "rust", "first": 12, "after": "n" }));
}

#[tokio::test]
async fn search_with_empty_q_returns_400_without_calling_upstream() {
    let upstream = ok_upstream();
    let services = services_with(upstream.clone());
    for path in ["/search?q=", "/search", "/search?next=abc"] {
        let resp = handle(Request::get(path), &services).await.unwrap();
        assert_eq!(resp.code.as_u16(), 400, "{path}");
        assert_eq!(error_body(&resp.body).error, "missing query parameter `q`");
    }
    assert!(upstream.calls().is_empty());
}

#[tokio::test]
async fn unknown_route_is_404_and_wrong_method_is_405() {
    let services = services_with(ok_upstream());
    let resp = handle(Request::get("/nope"), &services).await.unwrap();
    assert_eq!(resp.code.as_u16(), 404);

    let mut post = Request::get("/search?q=rust");
    post.method = "POST".into();
    let resp = handle(post, &services).await.unwrap();
    assert_eq!(resp.code.as_u16(), 405);
}

#[tokio::test]
async fn upstream_server_error_becomes_502() {
    let services = services_with(FakeUpstream::json(500, &json!({ "message": "boom" })));
    let resp = handle(Request::get("/search?q=rust"), &services).await.unwrap();
    assert_eq!(resp.code.as_u16(), 502);
    let body = error_body(&resp.body);
    assert_eq!(body.status, 500);
    assert_eq!(body.details, Some(json!({ "message": "boom" })));
}

#[tokio::test]
async fn rejected_credential_becomes_502() {
    let services = services_with(FakeUpstream::json(401, &json!({ "message": "Bad credentials" })));
    let resp = handle(Request::get("/search?q=rust"), &services).await.unwrap();
    assert_eq!(resp.code.as_u16(), 502);
    assert_eq!(error_body(&resp.body).status, 401);
}

#[tokio::test]
async fn upstream_rate_limit_becomes_429() {
    let services = services_with(FakeUpstream::respond(
        403,
        &[("x-ratelimit-remaining", "0")],
        b"{\"message\":\"API rate limit exceeded\"}",
    ));
    let resp = handle(Request::get("/search?q=rust"), &services).await.unwrap();
    assert_eq!(resp.code.as_u16(), 429);

    let services = services_with(FakeUpstream::json(429, &json!({})));
    let resp = handle(Request::get("/search?q=rust"), &services).await.unwrap();
    assert_eq!(resp.code.as_u16(), 429);
}

#[tokio::test]
async fn graphql_errors_become_502_with_details() {
    let services = services_with(FakeUpstream::json(
        200,
        &json!({ "errors": [{ "type": "INVALID_CURSOR_ARGUMENTS", "message": "bad cursor" }] }),
    ));
    let resp = handle(Request::get("/search?q=rust&next=garbage"), &services).await.unwrap();
    assert_eq!(resp.code.as_u16(), 502);
    let body = error_body(&resp.body);
    assert_eq!(body.details.unwrap()[0]["type"], "INVALID_CURSOR_ARGUMENTS");
}

#[tokio::test]
async fn network_failure_becomes_502_and_timeout_504() {
    let services = services_with(FakeUpstream::fail(TransportError::Connection("dns error".into())));
    let resp = handle(Request::get("/search?q=rust"), &services).await.unwrap();
    assert_eq!(resp.code.as_u16(), 502);
    assert_eq!(error_body(&resp.body).status, 0);

    let services = services_with(FakeUpstream::fail(TransportError::Timeout));
    let resp = handle(Request::get("/search?q=rust"), &services).await.unwrap();
    assert_eq!(resp.code.as_u16(), 504);
}

#[tokio::test]
async fn garbage_upstream_body_becomes_502() {
    let services = services_with(FakeUpstream::respond(200, &[], b"<html>"));
    let resp = handle(Request::get("/search?q=rust"), &services).await.unwrap();
    assert_eq!(resp.code.as_u16(), 502);
}
