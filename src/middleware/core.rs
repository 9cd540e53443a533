use std::time::Duration;

use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Hooks that run around every dispatched request.
///
/// `before` runs ahead of the route's handler chain and may produce an early
/// response, which skips the chain entirely. `after` runs once the response is
/// settled and may rewrite it in place; it is the response-transform stage
/// that link injection and similar body decorators hook into. `after` always
/// runs, whether the response came from the chain or from an early `before`.
pub trait Middleware: Send + Sync {
    /// Inspect the request before the handler chain. Returning `Some`
    /// short-circuits the chain with that response.
    fn before(&self, _req: &HandlerRequest) -> Option<HandlerResponse> {
        None
    }

    /// Rewrite or observe the response after the handler chain.
    fn after(&self, _req: &HandlerRequest, _res: &mut HandlerResponse, _latency: Duration) {}
}
