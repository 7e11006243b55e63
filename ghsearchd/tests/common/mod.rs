#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use ghsearch_client::transport::BoxFuture;
use ghsearch_client::{HttpRequest, HttpResponse, Transport, TransportError};
use ghsearchd::services::Services;
use ghsearchd::upstream::GithubGraphql;
use serde_json::{json, Value};

pub const ENDPOINT: &str = "https://graphql.test/graphql";
pub const TOKEN: &str = "ghp_test_token";

/// Canned upstream: records every request and answers with one fixed outcome.
pub struct FakeUpstream {
    pub calls: Mutex<Vec<HttpRequest>>,
    outcome: Result<HttpResponse, TransportError>,
}

impl FakeUpstream {
    pub fn respond(status: u16, headers: &[(&str, &str)], body: &[u8]) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            outcome: Ok(HttpResponse {
                status,
                status_text: String::new(),
                headers: headers.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
                body: body.to_vec(),
            }),
        })
    }

    pub fn json(status: u16, body: &Value) -> Arc<Self> {
        Self::respond(status, &[("content-type", "application/json")], &serde_json::to_vec(body).unwrap())
    }

    pub fn fail(err: TransportError) -> Arc<Self> {
        Arc::new(Self { calls: Mutex::new(Vec::new()), outcome: Err(err) })
    }

    pub fn calls(&self) -> Vec<HttpRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// `variables` of the only recorded GraphQL request.
    pub fn sent_variables(&self) -> Value {
        let calls = self.calls();
        assert_eq!(calls.len(), 1, "expected exactly one upstream call");
        let body: Value = serde_json::from_slice(calls[0].init.body.as_deref().unwrap_or(b"null")).unwrap();
        body["variables"].clone()
    }
}

impl Transport for FakeUpstream {
    fn send(&self, req: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, TransportError>> {
        self.calls.lock().unwrap().push(req);
        let outcome = self.outcome.clone();
        Box::pin(async move { outcome })
    }
}

pub fn services_with(upstream: Arc<FakeUpstream>) -> Services {
    Services::new(GithubGraphql::new(upstream, ENDPOINT, TOKEN))
}

pub fn sample_search() -> Value {
    json!({
        "userCount": 1,
        "pageInfo": {
            "hasNextPage": false,
            "hasPreviousPage": false,
            "startCursor": "Y3Vyc29yOjE=",
            "endCursor": "Y3Vyc29yOjE="
        },
        "users": [{
            "id": "MDQ6VXNlcjU4MzIzMQ==",
            "login": "octocat",
            "avatarUrl": "https://avatars.githubusercontent.com/u/583231",
            "name": "The Octocat",
            "company": "@github",
            "bio": null,
            "twitterUsername": null,
            "url": "https://github.com/octocat",
            "websiteUrl": "https://github.blog",
            "status": null,
            "followers": { "totalCount": 20000 },
            "following": { "totalCount": 9 }
        }]
    })
}

pub fn ok_upstream() -> Arc<FakeUpstream> {
    FakeUpstream::json(200, &json!({ "data": { "search": sample_search() } }))
}
