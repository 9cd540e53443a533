use http::Method;
use regex::Regex;
use smallvec::SmallVec;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::debug;

use crate::dispatcher::Handler;
use crate::middleware::{route_logger, Middleware};
use crate::registry::SourceRegistry;
use crate::router::pattern::{compile_template, mount_pattern, prefix_remainder};

/// Maximum inline path/query parameters before heap allocation
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the hot path.
///
/// Parameter names use `Arc<str>` so a match clones them in O(1) from the
/// compiled route; values are extracted per request and stay `String`.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// One registered route: a method, a path template, and its handler chain.
#[derive(Debug, Clone)]
pub struct Route {
    /// HTTP method the route answers
    pub method: Method,
    /// Path template as registered, `:param` segments included
    pub path: String,
    /// Source tag attached by the registering router, if any
    pub source: Option<Arc<str>>,
    chain: Vec<Handler>,
    matcher: Regex,
    param_names: Vec<Arc<str>>,
}

impl Route {
    /// The handler chain in execution order.
    #[must_use]
    pub fn chain(&self) -> &[Handler] {
        &self.chain
    }
}

/// A mounted child router and the pattern it is matched under.
#[derive(Debug, Clone)]
pub struct Mount {
    /// Anchored match pattern in regex source form, e.g. `^\/api\/?(?=\/|$)`
    pub pattern: String,
    prefix: String,
    /// The nested router
    pub router: Router,
}

impl Mount {
    /// Plain path prefix the pattern was built from.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

/// One entry in a router's stack.
#[derive(Debug, Clone)]
pub enum Layer {
    /// Terminal route
    Route(Route),
    /// Nested router mounted under a prefix pattern
    Mount(Mount),
}

struct RouterInner {
    layers: Vec<Layer>,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl RouterInner {
    fn new() -> Self {
        Self {
            layers: Vec::new(),
            middlewares: Vec::new(),
        }
    }
}

impl fmt::Debug for RouterInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterInner")
            .field("layers", &self.layers)
            .field("middlewares", &self.middlewares.len())
            .finish()
    }
}

/// Result of matching a request against the router tree.
#[derive(Clone)]
pub struct RouteMatch {
    /// The matched route (a cheap handle; the chain is shared)
    pub route: Route,
    /// Path parameters extracted from the request path
    pub path_params: ParamVec,
    /// Mount prefix accumulated on the way to the route
    pub base_url: String,
    /// Source tag of each chain entry, stack order, resolved at match time
    pub handler_sources: Vec<Option<Arc<str>>>,
    /// Middleware gathered outer-to-inner along the mount path
    pub middlewares: Vec<Arc<dyn Middleware>>,
}

impl fmt::Debug for RouteMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMatch")
            .field("route", &self.route)
            .field("path_params", &self.path_params)
            .field("base_url", &self.base_url)
            .field("handler_sources", &self.handler_sources)
            .field("middlewares", &self.middlewares.len())
            .finish()
    }
}

/// A nestable collection of routes and mounted child routers.
///
/// A router is a cheap handle over shared state: clones refer to the same
/// layer stack, so a handle captured by middleware observes registrations
/// made through any other handle. Registration happens at startup; during
/// request handling the tree is only read.
///
/// Routers built with [`Router::with_source`] are the tagging factory: every
/// registration through them records provenance metadata for the route and
/// each chain entry, and installs the route logger ahead of user handlers.
/// Routers built with [`Router::new`] register the same way but carry no tag
/// and write no provenance.
#[derive(Debug, Clone)]
pub struct Router {
    inner: Arc<RwLock<RouterInner>>,
    source: Option<Arc<str>>,
    registry: Arc<SourceRegistry>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Fresh router with no source tag.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(RouterInner::new())),
            source: None,
            registry: SourceRegistry::global(),
        }
    }

    /// Fresh router bound to a source identifier; registrations through it
    /// carry provenance.
    #[must_use]
    pub fn with_source(source: impl Into<Arc<str>>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::new()
        }
    }

    /// The router's own source tag, if any.
    #[must_use]
    pub fn source(&self) -> Option<Arc<str>> {
        self.source.clone()
    }

    /// The registry recording handler provenance. Routers share the
    /// process-wide store, so a tag recorded here resolves through any
    /// router the handler is registered on.
    #[must_use]
    pub fn registry(&self) -> Arc<SourceRegistry> {
        Arc::clone(&self.registry)
    }

    /// Register a GET route.
    pub fn get(&self, path: &str, handlers: impl IntoIterator<Item = Handler>) -> Route {
        self.register(Method::GET, path, handlers)
    }

    /// Register a POST route.
    pub fn post(&self, path: &str, handlers: impl IntoIterator<Item = Handler>) -> Route {
        self.register(Method::POST, path, handlers)
    }

    /// Register a PUT route.
    pub fn put(&self, path: &str, handlers: impl IntoIterator<Item = Handler>) -> Route {
        self.register(Method::PUT, path, handlers)
    }

    /// Register a DELETE route.
    pub fn delete(&self, path: &str, handlers: impl IntoIterator<Item = Handler>) -> Route {
        self.register(Method::DELETE, path, handlers)
    }

    /// Register a PATCH route.
    pub fn patch(&self, path: &str, handlers: impl IntoIterator<Item = Handler>) -> Route {
        self.register(Method::PATCH, path, handlers)
    }

    /// Core registration shared by the five method shorthands.
    ///
    /// On a tagged router this tags every chain entry with the router's
    /// source and a `"<METHOD> <path>"` display name, inserts the route
    /// logger as the first entry, and tags the produced route. Wrapped
    /// handlers always get their original linked in the registry, tagged or
    /// not. The returned route is a handle onto the registered layer.
    pub fn register(
        &self,
        method: Method,
        path: &str,
        handlers: impl IntoIterator<Item = Handler>,
    ) -> Route {
        let mut chain: Vec<Handler> = Vec::new();
        if self.source.is_some() {
            chain.push(route_logger());
        }
        chain.extend(handlers);

        let name = format!("{method} {path}");
        for entry in &chain {
            if let Some(original) = entry.original() {
                self.registry.set_original(entry.id(), original);
            }
            if let Some(source) = &self.source {
                self.registry.set_source(entry.id(), Arc::clone(source));
                self.registry.set_name(entry.id(), name.clone());
                // The wrapped handler keeps its provenance even when it is
                // later registered through an untagged router.
                if let Some(original) = entry.original() {
                    self.registry.set_source(original, Arc::clone(source));
                }
            }
        }

        let (matcher, param_names) = compile_template(path);
        let route = Route {
            method,
            path: path.to_string(),
            source: self.source.clone(),
            chain,
            matcher,
            param_names,
        };

        debug!(
            method = %route.method,
            path = %route.path,
            source = route.source.as_deref().unwrap_or("unknown"),
            chain_len = route.chain.len(),
            "route registered"
        );

        if let Ok(mut inner) = self.inner.write() {
            inner.layers.push(Layer::Route(route.clone()));
        }
        route
    }

    /// Mount a child router under a path prefix.
    pub fn mount(&self, prefix: &str, child: Router) {
        let mount = Mount {
            pattern: mount_pattern(prefix),
            prefix: prefix.trim_end_matches('/').to_string(),
            router: child,
        };
        if let Ok(mut inner) = self.inner.write() {
            inner.layers.push(Layer::Mount(mount));
        }
    }

    /// Attach middleware scoped to requests routed through this router.
    pub fn use_middleware(&self, mw: Arc<dyn Middleware>) {
        if let Ok(mut inner) = self.inner.write() {
            inner.middlewares.push(mw);
        }
    }

    /// Snapshot of the layer stack. Layers are handles; cloning them does not
    /// copy handler chains.
    #[must_use]
    pub fn layers(&self) -> Vec<Layer> {
        self.inner
            .read()
            .map(|inner| inner.layers.clone())
            .unwrap_or_default()
    }

    /// Method and path of every route directly on this router, in
    /// registration order. Mounted child routers are not entered.
    #[must_use]
    pub fn direct_routes(&self) -> Vec<(Method, String)> {
        self.layers()
            .into_iter()
            .filter_map(|layer| match layer {
                Layer::Route(route) => Some((route.method, route.path)),
                Layer::Mount(_) => None,
            })
            .collect()
    }

    /// Match a request against the tree, first registered match wins.
    #[must_use]
    pub fn find(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let mut middlewares = Vec::new();
        self.find_at(method, path, "", &mut middlewares)
    }

    fn find_at(
        &self,
        method: &Method,
        path: &str,
        base_url: &str,
        middlewares: &mut Vec<Arc<dyn Middleware>>,
    ) -> Option<RouteMatch> {
        let inner = self.inner.read().ok()?;
        middlewares.extend(inner.middlewares.iter().map(Arc::clone));

        for layer in &inner.layers {
            match layer {
                Layer::Route(route) => {
                    if route.method != *method {
                        continue;
                    }
                    let Some(captures) = route.matcher.captures(path) else {
                        continue;
                    };
                    let mut path_params = ParamVec::new();
                    for (i, name) in route.param_names.iter().enumerate() {
                        if let Some(value) = captures.get(i + 1) {
                            path_params.push((Arc::clone(name), value.as_str().to_string()));
                        }
                    }
                    let handler_sources = route
                        .chain
                        .iter()
                        .map(|entry| self.registry.source(entry.id()))
                        .collect();
                    return Some(RouteMatch {
                        route: route.clone(),
                        path_params,
                        base_url: base_url.to_string(),
                        handler_sources,
                        middlewares: middlewares.clone(),
                    });
                }
                Layer::Mount(mount) => {
                    let Some(rest) = prefix_remainder(path, mount.prefix()) else {
                        continue;
                    };
                    let child_base = format!("{base_url}{}", mount.prefix());
                    let attached = middlewares.len();
                    if let Some(found) =
                        mount.router.find_at(method, rest, &child_base, middlewares)
                    {
                        return Some(found);
                    }
                    // Unwind middleware picked up in the failed subtree.
                    middlewares.truncate(attached);
                }
            }
        }
        None
    }
}
