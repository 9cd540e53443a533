//! # Dispatcher Module
//!
//! The dispatcher runs one matched request through the full pipeline:
//! application-level middleware `before` hooks, then the matched route's
//! handler chain, then every `after` hook with the settled response. Router
//! tagging, route logging, and link injection all observe requests through
//! the views defined here.
//!
//! ## Request Flow
//!
//! 1. The router tree is matched against the request target
//! 2. A [`HandlerRequest`] is assembled: parameters, mount-relative path,
//!    accumulated mount prefix, and the matched route's provenance snapshot
//! 3. Middleware `before` hooks run in order; the first early response wins
//! 4. The handler chain runs entry by entry until one returns [`Flow::Halt`]
//! 5. Middleware `after` hooks run with the response and measured latency
//!
//! Unmatched requests return a 404 without entering the pipeline. A matched
//! chain where every entry continues falls through to a 404 as well.

mod core;

pub use core::{
    handler, Dispatcher, Flow, Handler, HandlerFn, HandlerRequest, HandlerResponse, HeaderVec,
    MatchedRoute, MAX_INLINE_HEADERS,
};
