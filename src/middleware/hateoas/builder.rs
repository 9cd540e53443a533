use std::sync::Arc;

use super::{HateoasMiddleware, HateoasOptions, Link};
use crate::dispatcher::HandlerRequest;
use crate::router::Router;

/// Builder for `HateoasMiddleware` with a fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use waymark::middleware::HateoasMiddlewareBuilder;
///
/// let hateoas = HateoasMiddlewareBuilder::new()
///     .base_url("https://api.example.com")
///     .include_pagination(true)
///     .custom_link("docs", |_req| {
///         Some(Link::new("docs", "/docs/items", &Method::GET))
///     })
///     .build(items_router);
/// ```
pub struct HateoasMiddlewareBuilder {
    options: HateoasOptions,
}

impl HateoasMiddlewareBuilder {
    /// Create a builder with every option unset: no base URL, no pagination
    /// links, no custom links, and sibling inclusion left in its default
    /// skip-the-current-route state.
    pub fn new() -> Self {
        Self {
            options: HateoasOptions::default(),
        }
    }

    /// Control whether the currently matched route appears among its own
    /// sibling links. Calling with `false` turns sibling links off entirely;
    /// leaving the option unset keeps siblings while skipping the current
    /// route.
    pub fn auto_include_same_route(mut self, include: bool) -> Self {
        self.options.auto_include_same_route = Some(include);
        self
    }

    /// Prefix for every generated href, typically a scheme and authority.
    pub fn base_url(mut self, base: impl Into<String>) -> Self {
        self.options.base_url = base.into();
        self
    }

    /// Emit `first`/`prev`/`next`/`last` links for paginated bodies.
    pub fn include_pagination(mut self, include: bool) -> Self {
        self.options.include_pagination = include;
        self
    }

    /// Register an extra link generator under a relation name. Generators run
    /// after the built-in links and may override them; returning `None` adds
    /// nothing for that response.
    pub fn custom_link<F>(mut self, rel: impl Into<String>, generator: F) -> Self
    where
        F: Fn(&HandlerRequest) -> Option<Link> + Send + Sync + 'static,
    {
        self.options
            .custom_links
            .push((rel.into(), Arc::new(generator)));
        self
    }

    /// Attach the configured options to a router handle.
    pub fn build(self, router: Router) -> HateoasMiddleware {
        HateoasMiddleware::with_options(router, self.options)
    }
}

impl Default for HateoasMiddlewareBuilder {
    fn default() -> Self {
        Self::new()
    }
}
