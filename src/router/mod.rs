//! # Router Module
//!
//! A nestable layer-tree router with provenance tagging built into
//! registration.
//!
//! ## Overview
//!
//! Each router holds an ordered stack of [`Layer`]s: terminal [`Route`]s and
//! mounted child routers. Registration through a router built with
//! [`Router::with_source`] records, for the route and every handler in its
//! chain, which source registered it; the route logger is inserted ahead of
//! user handlers at the same time. Matching walks the stack in registration
//! order, first match wins, accumulating mount prefixes and router-scoped
//! middleware on the way down.
//!
//! ## Path templates
//!
//! Routes are registered with `:param` templates:
//!
//! ```rust
//! use waymark::{handler, Flow, HandlerResponse, Router};
//!
//! let router = Router::with_source("routes/users.rs");
//! router.get("/users/:id", [handler(|req, res| {
//!     let id = req.get_path_param("id").unwrap_or_default().to_string();
//!     *res = HandlerResponse::json(200, serde_json::json!({ "id": id }));
//!     Flow::Halt
//! })]);
//!
//! let found = router.find(&http::Method::GET, "/users/42").unwrap();
//! assert_eq!(found.route.path, "/users/:id");
//! assert_eq!(found.path_params[0].1, "42");
//! ```
//!
//! Templates compile to anchored regexes at registration time; matching a
//! request is regex captures plus O(1) `Arc` clones of the parameter names.

mod core;
pub(crate) mod pattern;
#[cfg(test)]
mod tests;

pub use core::{Layer, Mount, ParamVec, Route, RouteMatch, Router, MAX_INLINE_PARAMS};
pub use pattern::strip_mount_pattern;
