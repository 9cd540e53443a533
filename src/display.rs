//! Route table rendering for a mounted application.
//!
//! Walks the application's router tree depth-first, reconstructs each route's
//! full path from the accumulated mount prefixes, resolves the source file
//! that registered it, and prints the result as a color-coded table.

use colored::Colorize;

use crate::app::App;
use crate::registry::SourceRegistry;
use crate::router::{strip_mount_pattern, Layer, Route, Router};

const UNKNOWN_SOURCE: &str = "unknown";

/// One row of the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    /// Uppercase HTTP method.
    pub method: String,
    /// Full request path, mount prefixes included.
    pub path: String,
    /// Source file that registered the route, or `"unknown"`.
    pub source_path: String,
}

/// Collects and renders the routes of a mounted application.
///
/// Every invocation walks the router tree afresh, so repeated calls against
/// an unchanged application produce identical output.
#[derive(Debug)]
pub struct RouteDisplay<'a> {
    app: &'a App,
}

impl<'a> RouteDisplay<'a> {
    pub fn new(app: &'a App) -> Self {
        Self { app }
    }

    /// Gather every route reachable from the root router, sorted by path
    /// ascending and method ascending within a path.
    pub fn collect(&self) -> Vec<RouteInfo> {
        let mut routes = Vec::new();
        collect_routes(self.app.router(), "", &mut routes);
        routes.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.method.cmp(&b.method)));
        routes
    }

    /// Render the table as a string, one line per row.
    pub fn render(&self) -> String {
        render_table(&self.collect())
    }

    /// Print the route table to stdout, with a notice when nothing is mounted.
    pub fn display_routes(&self) {
        let routes = self.collect();
        if routes.is_empty() {
            println!();
            println!("No routes found. Make sure routes are mounted on the application.");
            return;
        }

        println!();
        println!("API Routes:");
        println!("{}", render_table(&routes));
        println!();
        println!("Total routes: {}", routes.len());
        println!();
    }
}

fn collect_routes(router: &Router, base_path: &str, routes: &mut Vec<RouteInfo>) {
    let registry = router.registry();
    for layer in router.layers() {
        match layer {
            Layer::Route(route) => {
                let full_path = format!("{base_path}{}", route.path);
                routes.push(RouteInfo {
                    method: route.method.to_string(),
                    path: if full_path.is_empty() {
                        "/".to_string()
                    } else {
                        full_path
                    },
                    source_path: resolve_source(&registry, &route),
                });
            }
            Layer::Mount(mount) => {
                let prefix = strip_mount_pattern(&mount.pattern);
                let child_base = format!("{base_path}{prefix}");
                collect_routes(&mount.router, &child_base, routes);
            }
        }
    }
}

/// Resolve the source file behind a route: the route's own tag first, then
/// the tag of its first handler, then the tag of the handler that first
/// handler wraps.
fn resolve_source(registry: &SourceRegistry, route: &Route) -> String {
    if let Some(source) = &route.source {
        return source.to_string();
    }
    if let Some(first) = route.chain().first() {
        if let Some(source) = registry.source(first.id()) {
            return source.to_string();
        }
        if let Some(original) = first.original() {
            if let Some(source) = registry.source(original) {
                return source.to_string();
            }
        }
    }
    UNKNOWN_SOURCE.to_string()
}

fn render_table(routes: &[RouteInfo]) -> String {
    let method_width = routes
        .iter()
        .map(|route| route.method.len())
        .max()
        .unwrap_or(0)
        .max("Method".len());
    let path_width = routes
        .iter()
        .map(|route| route.path.len())
        .max()
        .unwrap_or(0)
        .max("Path".len());
    let source_width = routes
        .iter()
        .map(|route| route.source_path.len())
        .max()
        .unwrap_or(0)
        .max("Source".len());

    let mut lines = Vec::with_capacity(routes.len() + 2);
    lines.push(format!(
        "{:<method_width$}  {:<path_width$}  Source",
        "Method", "Path"
    ));
    lines.push(
        "-".repeat(method_width + path_width + source_width + 4)
            .dimmed()
            .to_string(),
    );
    for route in routes {
        // Pad before coloring so the ANSI escapes do not skew the columns.
        let method = format!("{:<method_width$}", route.method);
        let path = format!("{:<path_width$}", route.path);
        lines.push(format!(
            "{}  {}  {}",
            method_cell(&route.method, method),
            path,
            route.source_path.dimmed()
        ));
    }
    lines.join("\n")
}

fn method_cell(method: &str, padded: String) -> String {
    match method {
        "GET" => padded.green().to_string(),
        "POST" => padded.blue().to_string(),
        "PUT" => padded.magenta().to_string(),
        "DELETE" => padded.red().to_string(),
        "PATCH" => padded.cyan().to_string(),
        _ => padded,
    }
}
