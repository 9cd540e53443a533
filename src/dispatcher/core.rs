//! Dispatcher core module - hot path for request execution.
//!
//! Everything a request touches between matching and the returned response
//! lives here: the request/response views handed to chain handlers, the
//! handler chain itself, and the middleware hooks that run around it.

// Keep allocations out of the per-request path; error paths may allocate.
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use http::Method;
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::middleware::Middleware;
use crate::registry::HandlerId;
use crate::router::{ParamVec, Router};

/// Maximum inline headers before heap allocation; most requests carry fewer.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage for the hot path.
///
/// Header names use `Arc<str>` because the same names repeat across requests
/// and `Arc::clone()` is an O(1) atomic increment; values are per-request
/// data and stay `String`.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Verdict a chain entry returns: run the rest of the chain or stop here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Hand the request to the next chain entry (or fall through if none
    /// remain).
    Continue,
    /// The response is final; skip the remaining entries.
    Halt,
}

/// Callable signature for one entry in a route's handler chain.
pub type HandlerFn = dyn Fn(&HandlerRequest, &mut HandlerResponse) -> Flow + Send + Sync;

/// One entry in a route's handler chain.
///
/// Carries a process-unique [`HandlerId`] so provenance metadata can be
/// attached out of band; the callable itself stays a plain function.
#[derive(Clone)]
pub struct Handler {
    id: HandlerId,
    original: Option<HandlerId>,
    func: Arc<HandlerFn>,
}

impl Handler {
    /// Wrap a callable as a chain entry with a fresh identity.
    #[must_use]
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&HandlerRequest, &mut HandlerResponse) -> Flow + Send + Sync + 'static,
    {
        Self {
            id: HandlerId::next(),
            original: None,
            func: Arc::new(func),
        }
    }

    /// An adapter over another handler. Registration records the link so
    /// provenance can be resolved through the wrapper to the handler it
    /// wraps.
    #[must_use]
    pub fn wrapping<F>(func: F, original: &Handler) -> Self
    where
        F: Fn(&HandlerRequest, &mut HandlerResponse) -> Flow + Send + Sync + 'static,
    {
        Self {
            id: HandlerId::next(),
            original: Some(original.id),
            func: Arc::new(func),
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> HandlerId {
        self.id
    }

    /// Identity of the handler this one wraps, if any.
    #[inline]
    #[must_use]
    pub fn original(&self) -> Option<HandlerId> {
        self.original
    }

    /// Invoke the callable.
    pub fn call(&self, req: &HandlerRequest, res: &mut HandlerResponse) -> Flow {
        (self.func)(req, res)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("id", &self.id)
            .field("original", &self.original)
            .finish_non_exhaustive()
    }
}

/// Shorthand for [`Handler::new`] at registration sites.
pub fn handler<F>(func: F) -> Handler
where
    F: Fn(&HandlerRequest, &mut HandlerResponse) -> Flow + Send + Sync + 'static,
{
    Handler::new(func)
}

/// Request-side view of the matched route.
#[derive(Debug, Clone)]
pub struct MatchedRoute {
    /// Route path template as registered, e.g. `/users/:id`.
    pub path: String,
    /// Source tag of each chain entry, in stack order.
    pub handler_sources: Vec<Option<Arc<str>>>,
}

/// Request data passed to chain handlers and middleware.
///
/// Uses `SmallVec` storage for parameters and headers to avoid heap
/// allocation in the common case.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// HTTP method (GET, POST, etc.)
    pub method: Method,
    /// Request path relative to the mount point, query string excluded
    pub path: String,
    /// Mount prefix accumulated while matching the router tree
    pub base_url: String,
    /// Full request target as received: path plus query string
    pub original_url: String,
    /// Path parameters extracted from the URL (stack-allocated for ≤8 params)
    pub path_params: ParamVec,
    /// Query string parameters (stack-allocated for ≤8 params)
    pub query_params: ParamVec,
    /// HTTP headers (stack-allocated for ≤16 headers)
    pub headers: HeaderVec,
    /// Request body parsed as JSON (if present)
    pub body: Option<Value>,
    /// View of the matched route, when one matched
    pub route: Option<MatchedRoute>,
}

impl HandlerRequest {
    /// Get a path parameter by name.
    ///
    /// Uses "last write wins" semantics: if duplicate parameter names exist
    /// at different path depths, returns the innermost occurrence.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name (last occurrence wins).
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a header by name (case-insensitive per RFC 7230).
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response being assembled for the current request.
///
/// Starts as a fall-through 404 and is rewritten in place by chain handlers;
/// middleware `after` hooks see the settled value before it is returned.
#[derive(Debug, Clone, Serialize)]
pub struct HandlerResponse {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: u16,
    /// HTTP response headers (stack-allocated for ≤16 headers)
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// Response body as JSON
    pub body: Value,
}

impl HandlerResponse {
    /// Create a new response with the given status, headers, and body.
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create a JSON response with the content type preset.
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create an error response.
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    /// Get a header by name (case-insensitive).
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or update a header.
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

/// Runs matched requests through middleware hooks and the route's chain.
///
/// Holds the application-level middleware; router-scoped middleware is
/// gathered per request from the matched mount path and runs after it, in
/// outer-to-inner order.
#[derive(Clone, Default)]
pub struct Dispatcher {
    /// Ordered list of middleware applied around every dispatched request
    pub middlewares: Vec<Arc<dyn Middleware>>,
}

impl Dispatcher {
    /// Create a new dispatcher with no middleware attached.
    #[must_use]
    pub fn new() -> Self {
        Dispatcher {
            middlewares: Vec::new(),
        }
    }

    /// Add middleware to the processing pipeline.
    ///
    /// Middleware executes in the order it is added: every `before` hook may
    /// veto the chain with an early response, and every `after` hook sees the
    /// settled response.
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        self.middlewares.push(mw);
    }

    /// Run one request through the pipeline.
    ///
    /// `target` is the request target as received, path plus optional query
    /// string. Unmatched requests return a 404 without running middleware.
    pub fn dispatch(
        &self,
        router: &Router,
        method: Method,
        target: &str,
        body: Option<Value>,
        headers: HeaderVec,
    ) -> HandlerResponse {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, query),
            None => (target, ""),
        };

        let Some(found) = router.find(&method, path) else {
            debug!(method = %method, path = %path, "no route matched");
            return HandlerResponse::error(404, "Not Found");
        };

        debug!(
            method = %method,
            path = %path,
            route = %found.route.path,
            base_url = %found.base_url,
            chain_len = found.route.chain().len(),
            "dispatching matched route"
        );

        // The request's own path is relative to the mount point, the way the
        // matched subtree saw it.
        let rel_path = path.strip_prefix(found.base_url.as_str()).unwrap_or(path);
        let rel_path = if rel_path.is_empty() { "/" } else { rel_path };

        let request = HandlerRequest {
            method,
            path: rel_path.to_string(),
            base_url: found.base_url.clone(),
            original_url: target.to_string(),
            path_params: found.path_params.clone(),
            query_params: parse_query(query),
            headers,
            body,
            route: Some(MatchedRoute {
                path: found.route.path.clone(),
                handler_sources: found.handler_sources.clone(),
            }),
        };

        let mut early_resp: Option<HandlerResponse> = None;
        for mw in self.middlewares.iter().chain(found.middlewares.iter()) {
            if early_resp.is_none() {
                early_resp = mw.before(&request);
            } else {
                mw.before(&request);
            }
        }

        let (mut response, latency) = if let Some(resp) = early_resp {
            (resp, Duration::from_millis(0))
        } else {
            let start = Instant::now();
            // A chain where every entry continues falls through to 404.
            let mut resp = HandlerResponse::error(404, "Not Found");
            for entry in found.route.chain() {
                if entry.call(&request, &mut resp) == Flow::Halt {
                    break;
                }
            }
            (resp, start.elapsed())
        };

        for mw in self.middlewares.iter().chain(found.middlewares.iter()) {
            mw.after(&request, &mut response, latency);
        }

        response
    }
}

/// Parse a query string into parameter pairs, percent-decoding as it goes.
fn parse_query(query: &str) -> ParamVec {
    let mut params = ParamVec::new();
    if query.is_empty() {
        return params;
    }
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        params.push((Arc::from(key.as_ref()), value.into_owned()));
    }
    params
}
