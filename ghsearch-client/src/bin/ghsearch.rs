//! Search-as-you-type against a running `ghsearchd`.
//!
//! Every line read from stdin becomes the new query; the request goes out
//! once typing pauses. `:next` / `:prev` page through results, `:flush`
//! sends the pending request now, `:cancel` drops it, `:q` quits.
//!
//! Env: GHSEARCH_PROXY_URL (default http://127.0.0.1:8888/search),
//! GHSEARCH_DELAY_MS (default 500).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use dotenv::dotenv;
use ghsearch_api::response::{PageInfo, SearchResult};
use ghsearch_client::{DebouncedFetch, ErrorState, FetchOptions, Observable, ReqwestTransport};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Cursor {
    Next(String),
    Prev(String),
}

fn search_url(base: &Url, query: &str, cursor: Option<&Cursor>) -> String {
    let mut url = base.clone();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear().append_pair("q", query);
        match cursor {
            Some(Cursor::Next(c)) => {
                pairs.append_pair("next", c);
            }
            Some(Cursor::Prev(c)) => {
                pairs.append_pair("prev", c);
            }
            None => {}
        }
    }
    url.to_string()
}

fn print_results(value: &Value) {
    if value.as_object().map_or(true, |o| o.is_empty()) {
        return;
    }
    let result: SearchResult = match serde_json::from_value(value.clone()) {
        Ok(r) => r,
        Err(e) => {
            warn!("unexpected result shape: {e}");
            return;
        }
    };
    println!("{} users", result.user_count);
    for user in result.users.iter().filter(|u| !u.login.is_empty()) {
        let followers = user.followers.as_ref().map_or(0, |c| c.total_count);
        match &user.name {
            Some(name) => println!("  {:<24} {name} ({followers} followers)", user.login),
            None => println!("  {:<24} ({followers} followers)", user.login),
        }
    }
    let info = &result.page_info;
    println!(
        "  [{}{}]",
        if info.has_previous_page { ":prev " } else { "" },
        if info.has_next_page { ":next" } else { "" }
    );
}

fn print_error(error: &ErrorState) {
    eprintln!("error {} {}: {}", error.status, error.status_text, error.body);
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let base = std::env::var("GHSEARCH_PROXY_URL").unwrap_or_else(|_| "http://127.0.0.1:8888/search".to_string());
    let base = Url::parse(&base).with_context(|| format!("invalid GHSEARCH_PROXY_URL {base:?}"))?;
    let delay = std::env::var("GHSEARCH_DELAY_MS")
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_millis);

    let transport = Arc::new(
        ReqwestTransport::new(concat!("ghsearch/", env!("CARGO_PKG_VERSION")), None)
            .context("failed to build HTTP client")?,
    );
    let url = Observable::new(String::new());
    let options = Observable::new(FetchOptions { delay, ..FetchOptions::default() });
    let fetch = DebouncedFetch::new(transport, &url, &options);

    let page_info = Arc::new(Mutex::new(PageInfo::default()));
    let printer = {
        let mut results = fetch.results().subscribe();
        let mut errors = fetch.error().subscribe();
        let page_info = Arc::clone(&page_info);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    r = results.changed() => {
                        if r.is_err() { break; }
                        let value = results.borrow_and_update().clone();
                        if let Ok(result) = serde_json::from_value::<SearchResult>(value.clone()) {
                            *page_info.lock().unwrap_or_else(|p| p.into_inner()) = result.page_info;
                        }
                        print_results(&value);
                    }
                    r = errors.changed() => {
                        if r.is_err() { break; }
                        if let Some(error) = errors.borrow_and_update().clone() {
                            print_error(&error);
                        }
                    }
                }
            }
        })
    };

    let mut query = String::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let line = line.trim();
        let cursor = match line {
            ":q" => break,
            ":flush" => {
                if fetch.flush().is_none() {
                    eprintln!("nothing pending");
                }
                continue;
            }
            ":cancel" => {
                if !fetch.cancel() {
                    eprintln!("nothing pending");
                }
                continue;
            }
            ":next" | ":prev" => {
                let info = page_info.lock().unwrap_or_else(|p| p.into_inner()).clone();
                let cursor = if line == ":next" {
                    info.end_cursor.filter(|_| info.has_next_page).map(Cursor::Next)
                } else {
                    info.start_cursor.filter(|_| info.has_previous_page).map(Cursor::Prev)
                };
                if cursor.is_none() {
                    eprintln!("no such page");
                    continue;
                }
                cursor
            }
            "" => continue,
            text => {
                query = text.to_string();
                None
            }
        };
        if query.is_empty() {
            eprintln!("type a query first");
            continue;
        }
        url.set(search_url(&base, &query, cursor.as_ref()));
    }

    fetch.cancel();
    printer.abort();
    Ok(())
}
