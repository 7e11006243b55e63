//! Client-side helpers for the search proxy: a transport seam, a JSON
//! fetch wrapper, and a debounced fetch that publishes its outcome through
//! observable values.

pub mod debounce;
pub mod debounced_fetch;
pub mod fetch;
pub mod observable;
pub mod transport;

pub use debounce::Debouncer;
pub use debounced_fetch::{DebouncedFetch, FetchOptions, DEFAULT_DELAY};
pub use fetch::{fetch_json, ErrorState, FetchError, INTERNAL_ERROR};
pub use observable::Observable;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, RequestInit, Transport, TransportError};
