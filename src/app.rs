//! Application facade tying a root router to its dispatch pipeline.

use std::fmt;
use std::sync::Arc;

use http::Method;
use serde_json::Value;

use crate::dispatcher::{Dispatcher, HandlerResponse, HeaderVec};
use crate::middleware::Middleware;
use crate::router::Router;

/// A root router paired with the dispatcher that serves it.
///
/// The root router is untagged. Applications build feature routers through
/// [`Router::with_source`], mount them here, and push cross-cutting
/// middleware onto the dispatcher.
#[derive(Clone, Default)]
pub struct App {
    router: Router,
    dispatcher: Dispatcher,
}

impl App {
    pub fn new() -> Self {
        App::default()
    }

    /// The root router, used for mounting and route inspection.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Attach application-level middleware, run around every request.
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        self.dispatcher.add_middleware(mw);
    }

    /// Dispatch one request with no headers attached.
    pub fn handle(&self, method: Method, target: &str, body: Option<Value>) -> HandlerResponse {
        self.handle_with_headers(method, target, body, HeaderVec::new())
    }

    /// Dispatch one request, headers included.
    pub fn handle_with_headers(
        &self,
        method: Method,
        target: &str,
        body: Option<Value>,
        headers: HeaderVec,
    ) -> HandlerResponse {
        self.dispatcher
            .dispatch(&self.router, method, target, body, headers)
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("router", &self.router)
            .field("middlewares", &self.dispatcher.middlewares.len())
            .finish()
    }
}
