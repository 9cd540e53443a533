//! # waymark
//!
//! **waymark** is a route provenance toolkit for composable HTTP routers: it tags
//! every registered route with the source that declared it, logs the tag chain as
//! requests dispatch, renders a color-coded route table for startup diagnostics,
//! and injects [HATEOAS](https://en.wikipedia.org/wiki/HATEOAS) navigation links
//! into JSON responses.
//!
//! ## Overview
//!
//! Applications build feature routers through [`Router::with_source`], which
//! records the registering source file for every route and handler in an
//! out-of-band [`registry::SourceRegistry`]. The provenance feeds three
//! consumers: a per-route request logger, the [`display`] table that shows
//! where each mounted route came from, and the [`middleware::HateoasMiddleware`]
//! response transform that advertises a router's sibling routes as hypermedia
//! links.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - **[`router`]** - Composable routers with regex path templates and nestable mounts
//! - **[`registry`]** - Out-of-band provenance metadata keyed by handler identity
//! - **[`dispatcher`]** - Request assembly and the middleware/handler pipeline
//! - **[`middleware`]** - Route logging and HATEOAS link injection
//! - **[`display`]** - Route table rendering for mounted applications
//! - **[`app`]** - Root router plus dispatcher facade
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant App
//!     participant Router
//!     participant Dispatcher
//!     participant Chain as Handler Chain
//!     participant HATEOAS as HateoasMiddleware
//!
//!     Client->>App: handle(GET, /api/users/42)
//!     App->>Router: find("GET", "/api/users/42")
//!     Router->>Router: Walk layers, descend mounts
//!     Router-->>App: RouteMatch (params, base_url, sources)
//!
//!     App->>Dispatcher: dispatch(request)
//!     Dispatcher->>Dispatcher: before hooks (may short-circuit)
//!     Dispatcher->>Chain: run handlers in order
//!     Chain->>Chain: route logger prints tag chain
//!     Chain-->>Dispatcher: HandlerResponse
//!     Dispatcher->>HATEOAS: after hooks transform response
//!     HATEOAS->>HATEOAS: attach links map to JSON body
//!     Dispatcher-->>Client: HTTP response
//! ```
//!
//! ### Key Architectural Patterns
//!
//! 1. **Provenance as data**: source tags are plain registry entries looked up by
//!    handler id, never fields smuggled onto foreign objects
//! 2. **Composition over mutation**: tagging happens inside the router's own
//!    registration methods, and response enrichment runs as an explicit after
//!    stage of the dispatch pipeline
//! 3. **Read-only after startup**: layer stacks and tags are written during
//!    registration and only read while serving requests
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use http::Method;
//! use serde_json::json;
//! use waymark::middleware::HateoasMiddleware;
//! use waymark::{handler, App, Flow, HandlerResponse, Router};
//!
//! let users = Router::with_source("routes/users.rs");
//! users.get("/users/:id", [handler(|req, res| {
//!     let id = req.get_path_param("id").unwrap_or("").to_string();
//!     *res = HandlerResponse::json(200, json!({ "id": id }));
//!     Flow::Halt
//! })]);
//!
//! let mut app = App::new();
//! app.router().mount("/api", users.clone());
//! app.add_middleware(Arc::new(HateoasMiddleware::new(users)));
//!
//! let res = app.handle(Method::GET, "/api/users/42", None);
//! assert_eq!(res.status, 200);
//! assert_eq!(res.body["id"], json!("42"));
//! assert_eq!(res.body["links"]["self"]["href"], json!("/api/users/42"));
//! ```

pub mod app;
pub mod dispatcher;
pub mod display;
pub mod middleware;
pub mod registry;
pub mod router;

pub use app::App;
pub use dispatcher::{
    handler, Dispatcher, Flow, Handler, HandlerRequest, HandlerResponse, HeaderVec,
};
pub use display::{RouteDisplay, RouteInfo};
pub use middleware::Middleware;
pub use registry::{HandlerId, HandlerMeta, SourceRegistry};
pub use router::{Layer, Route, RouteMatch, Router};
