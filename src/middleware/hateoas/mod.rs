mod builder;
mod links;

pub use builder::HateoasMiddlewareBuilder;
pub use links::{
    generate_relationship, normalize_route_path, substitute_path_params, Link, Links,
};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use http::Method;
use serde_json::Value;
use tracing::warn;

use crate::dispatcher::{HandlerRequest, HandlerResponse};
use crate::middleware::Middleware;
use crate::router::Router;

use links::pagination_pages;

/// Generator invoked once per response to produce an extra link, or nothing.
pub type CustomLinkFn = Arc<dyn Fn(&HandlerRequest) -> Option<Link> + Send + Sync>;

/// Configuration for [`HateoasMiddleware`].
///
/// `auto_include_same_route` is deliberately tri-state. Left unset, sibling
/// routes are linked but the currently matched route is skipped. Explicit
/// `true` links every sibling including the current route. Explicit `false`
/// disables sibling links altogether and leaves only `self`, pagination, and
/// custom links.
#[derive(Clone, Default)]
pub struct HateoasOptions {
    /// Whether the current route may appear among its own sibling links.
    pub auto_include_same_route: Option<bool>,
    /// Prefix prepended to every generated href, e.g. `https://api.example.com`.
    pub base_url: String,
    /// Emit `first`/`prev`/`next`/`last` links when the body carries a
    /// `pagination` object spanning more than one page.
    pub include_pagination: bool,
    /// Extra links keyed by relation name, evaluated after the built-in ones
    /// so they can override same-named entries.
    pub custom_links: Vec<(String, CustomLinkFn)>,
}

impl fmt::Debug for HateoasOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HateoasOptions")
            .field("auto_include_same_route", &self.auto_include_same_route)
            .field("base_url", &self.base_url)
            .field("include_pagination", &self.include_pagination)
            .field("custom_links", &self.custom_links.len())
            .finish()
    }
}

/// Response transform that embeds hypermedia links into JSON object bodies.
///
/// Holds a handle to the router whose routes it advertises. Runs in the
/// after stage of the dispatch pipeline: once the handler chain has produced
/// a response, the middleware rewrites object bodies to carry a `links` map
/// with a `self` entry, optional pagination entries, one entry per sibling
/// route registered directly on the router, and any configured custom links.
/// Non-object bodies pass through untouched.
///
/// The router must carry a source tag. Untagged routers produce a warning
/// per request and no augmentation, never a request failure.
///
/// # Example
///
/// ```rust,ignore
/// use waymark::middleware::HateoasMiddleware;
///
/// let hateoas = HateoasMiddleware::builder()
///     .base_url("https://api.example.com")
///     .include_pagination(true)
///     .build(items.clone());
/// dispatcher.add_middleware(Arc::new(hateoas));
/// ```
#[derive(Debug, Clone)]
pub struct HateoasMiddleware {
    router: Router,
    options: HateoasOptions,
}

impl HateoasMiddleware {
    /// Wrap a router with default options.
    pub fn new(router: Router) -> Self {
        Self {
            router,
            options: HateoasOptions::default(),
        }
    }

    /// Wrap a router with explicit options.
    pub fn with_options(router: Router, options: HateoasOptions) -> Self {
        Self { router, options }
    }

    /// Fluent construction, see [`HateoasMiddlewareBuilder`].
    pub fn builder() -> HateoasMiddlewareBuilder {
        HateoasMiddlewareBuilder::new()
    }

    fn build_links(&self, req: &HandlerRequest, body: &Value) -> Links {
        let base = &self.options.base_url;
        let mut links = Links::new();
        links.insert(
            "self".to_string(),
            Link::new("self", format!("{base}{}", req.original_url), &req.method),
        );

        if self.options.include_pagination {
            if let Some((current, total)) = pagination_pages(body) {
                if total > 1 {
                    let page_base = format!("{base}{}", req.path);
                    links.insert(
                        "first".to_string(),
                        Link::new("first", format!("{page_base}?page=1"), &Method::GET),
                    );
                    if current > 1 {
                        links.insert(
                            "prev".to_string(),
                            Link::new(
                                "prev",
                                format!("{page_base}?page={}", current - 1),
                                &Method::GET,
                            ),
                        );
                    }
                    if current < total {
                        links.insert(
                            "next".to_string(),
                            Link::new(
                                "next",
                                format!("{page_base}?page={}", current + 1),
                                &Method::GET,
                            ),
                        );
                    }
                    links.insert(
                        "last".to_string(),
                        Link::new("last", format!("{page_base}?page={total}"), &Method::GET),
                    );
                }
            }
        }

        if self.options.auto_include_same_route != Some(false) {
            let current_path = req
                .route
                .as_ref()
                .map(|route| normalize_route_path(&route.path))
                .unwrap_or_default();
            for (method, path) in self.router.direct_routes() {
                let is_current =
                    method == req.method && normalize_route_path(&path) == current_path;
                if is_current && self.options.auto_include_same_route != Some(true) {
                    continue;
                }
                let rel = generate_relationship(&method, &path);
                let href = format!(
                    "{base}{}{}",
                    req.base_url,
                    substitute_path_params(&path, req, body)
                );
                links.insert(
                    rel.clone(),
                    Link::titled(format!("{method} {path}"), rel, href, &method),
                );
            }
        }

        for (rel, generator) in &self.options.custom_links {
            if let Some(link) = generator(req) {
                links.insert(rel.clone(), link);
            }
        }

        links
    }
}

impl Middleware for HateoasMiddleware {
    fn after(&self, req: &HandlerRequest, res: &mut HandlerResponse, _latency: Duration) {
        if self.router.source().is_none() {
            warn!("No source tag found on router, skipping link augmentation");
            return;
        }
        if !res.body.is_object() {
            return;
        }

        let links = self.build_links(req, &res.body);
        match serde_json::to_value(&links) {
            Ok(value) => {
                if let Some(map) = res.body.as_object_mut() {
                    map.insert("links".to_string(), value);
                }
            }
            Err(error) => warn!(error = %error, "Failed to serialize response links"),
        }
    }
}
