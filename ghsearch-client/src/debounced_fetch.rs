use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::debounce::Debouncer;
use crate::fetch::{fetch_json, ErrorState};
use crate::observable::Observable;
use crate::transport::{BoxFuture, RequestInit, Transport};

pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// Request options plus the debounce delay, which is never forwarded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    pub delay: Option<Duration>,
    pub request: RequestInit,
}

impl FetchOptions {
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay: Some(delay), request: RequestInit::default() }
    }

    /// A missing or zero delay falls back to [`DEFAULT_DELAY`].
    pub fn effective_delay(&self) -> Duration {
        self.delay.filter(|d| !d.is_zero()).unwrap_or(DEFAULT_DELAY)
    }
}

struct Invocation {
    url: String,
    init: RequestInit,
}

/// Fetches `url` whenever it or the request options change, debounced,
/// and publishes the outcome to `results` / `error`.
///
/// Errors never reach the caller: a failed call sets `results` to `{}` and
/// `error` to the normalized error object. Completions are tagged with a
/// sequence number so an older response can never overwrite a newer one.
pub struct DebouncedFetch {
    results: Observable<Value>,
    error: Observable<Option<ErrorState>>,
    debouncer: Arc<Debouncer<Invocation>>,
    watcher: JoinHandle<()>,
}

impl DebouncedFetch {
    /// Must be called from within a tokio runtime. Nothing is fetched until
    /// one of the sources changes.
    pub fn new(
        transport: Arc<dyn Transport>,
        url: &Observable<String>,
        options: &Observable<FetchOptions>,
    ) -> Self {
        let results = Observable::new(empty_object());
        let error = Observable::new(None);
        let debouncer = Arc::new(Debouncer::new(invoker(transport, results.clone(), error.clone())));
        // baseline is the value at construction; any later set is a change
        let mut url_rx = url.subscribe();
        let mut options_rx = options.subscribe();
        let baseline = (url_rx.borrow_and_update().clone(), options_rx.borrow_and_update().request.clone());
        let watcher = tokio::spawn(watch_sources(url_rx, options_rx, baseline, Arc::clone(&debouncer)));
        Self { results, error, debouncer, watcher }
    }

    pub fn results(&self) -> &Observable<Value> {
        &self.results
    }

    pub fn error(&self) -> &Observable<Option<ErrorState>> {
        &self.error
    }

    /// Fire the pending call now; `None` when nothing is pending.
    pub fn flush(&self) -> Option<JoinHandle<()>> {
        self.debouncer.flush()
    }

    /// Drop the pending call, if any. In-flight calls are unaffected.
    pub fn cancel(&self) -> bool {
        self.debouncer.cancel()
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}

impl Drop for DebouncedFetch {
    fn drop(&mut self) {
        self.watcher.abort();
        self.debouncer.cancel();
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

fn invoker(
    transport: Arc<dyn Transport>,
    results: Observable<Value>,
    error: Observable<Option<ErrorState>>,
) -> impl Fn(Invocation) -> BoxFuture<'static, ()> + Send + Sync + 'static {
    let issued = Arc::new(Mutex::new(0u64));
    let applied = Arc::new(Mutex::new(0u64));
    move |inv: Invocation| -> BoxFuture<'static, ()> {
        let seq = {
            let mut issued = issued.lock().unwrap_or_else(|p| p.into_inner());
            *issued += 1;
            *issued
        };
        let transport = Arc::clone(&transport);
        let applied = Arc::clone(&applied);
        let results = results.clone();
        let error = error.clone();
        Box::pin(async move {
            debug!(target: "ghsearch_client", seq, url = %inv.url, "debounced fetch fired");
            let outcome = fetch_json(transport.as_ref(), &inv.url, &inv.init).await;
            let mut latest = applied.lock().unwrap_or_else(|p| p.into_inner());
            if seq < *latest {
                debug!(target: "ghsearch_client", seq, latest = *latest, "dropping stale response");
                return;
            }
            *latest = seq;
            match outcome {
                Ok(body) => {
                    error.set(None);
                    results.set(body);
                }
                Err(e) => {
                    debug!(target: "ghsearch_client", seq, error = %e, "fetch failed");
                    results.set(empty_object());
                    error.set(Some(e.into_state()));
                }
            }
        })
    }
}

async fn watch_sources(
    mut url_rx: watch::Receiver<String>,
    mut options_rx: watch::Receiver<FetchOptions>,
    (mut last_url, mut last_request): (String, RequestInit),
    debouncer: Arc<Debouncer<Invocation>>,
) {
    loop {
        let changed = tokio::select! {
            r = url_rx.changed() => r,
            r = options_rx.changed() => r,
        };
        if changed.is_err() {
            // a source was dropped along with its owner
            break;
        }
        let url = url_rx.borrow_and_update().clone();
        let options = options_rx.borrow_and_update().clone();
        if url == last_url && options.request == last_request {
            trace!(target: "ghsearch_client", "only the delay changed; not scheduling");
            continue;
        }
        let delay = options.effective_delay();
        last_url = url.clone();
        last_request = options.request.clone();
        debouncer.schedule(Invocation { url, init: options.request }, delay);
    }
}
