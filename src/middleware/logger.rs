//! Per-request route logging.
//!
//! The tagging router installs [`route_logger`] as the first entry of every
//! handler chain it registers. Each request then prints one fixed-format line
//! naming the matched route and the provenance of every chain entry.

use http::Method;

use crate::dispatcher::{Flow, Handler, MatchedRoute};

const UNKNOWN: &str = "unknown";

/// Build the per-request log line for a matched route.
///
/// The route name falls back to `"unknown"` when no route matched; so does
/// any chain entry without a source tag. Sources are joined with `", "` in
/// stack order.
#[must_use]
pub fn format_route_log(method: &Method, route: Option<&MatchedRoute>) -> String {
    let route_name = route.map_or(UNKNOWN, |r| r.path.as_str());
    let sources = route
        .map(|r| {
            r.handler_sources
                .iter()
                .map(|source| source.as_deref().unwrap_or(UNKNOWN))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .filter(|joined| !joined.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string());
    format!("[Route Log]: {method} {route_name} - Source: {sources}")
}

/// Chain entry that prints the route log line and always continues.
///
/// Every call builds a fresh entry with its own identity, so each registered
/// route carries its own logger and the registering router's tag lands on it
/// like any other chain entry.
#[must_use]
pub fn route_logger() -> Handler {
    Handler::new(|req, _res| {
        println!("{}", format_route_log(&req.method, req.route.as_ref()));
        Flow::Continue
    })
}
