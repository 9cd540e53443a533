use http::Method;
use std::sync::Arc;

use super::pattern::{compile_template, mount_pattern, prefix_remainder, strip_mount_pattern};
use super::{Layer, Router};
use crate::dispatcher::{handler, Flow};

fn noop() -> crate::dispatcher::Handler {
    handler(|_req, _res| Flow::Halt)
}

#[test]
fn test_template_compiles_to_anchored_regex() {
    let (regex, params) = compile_template("/users/:id");
    assert_eq!(regex.as_str(), "^/users/([^/]+)$");
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].as_ref(), "id");
    assert!(regex.is_match("/users/42"));
    assert!(!regex.is_match("/users/42/posts"));
    assert!(!regex.is_match("/users"));
}

#[test]
fn test_root_template_matches_only_root() {
    let (regex, params) = compile_template("/");
    assert!(params.is_empty());
    assert!(regex.is_match("/"));
    assert!(!regex.is_match("/x"));
}

#[test]
fn test_multi_param_template_captures_in_order() {
    let (regex, params) = compile_template("/users/:user_id/orders/:order_id");
    let captures = regex.captures("/users/7/orders/19").unwrap();
    assert_eq!(&captures[1], "7");
    assert_eq!(&captures[2], "19");
    assert_eq!(params[0].as_ref(), "user_id");
    assert_eq!(params[1].as_ref(), "order_id");
}

#[test]
fn test_mount_pattern_round_trips_through_strip() {
    let pattern = mount_pattern("/api");
    assert_eq!(pattern, "^\\/api\\/?(?=\\/|$)");
    assert_eq!(strip_mount_pattern(&pattern), "/api");

    let nested = mount_pattern("/api/v2");
    assert_eq!(strip_mount_pattern(&nested), "/api/v2");
}

#[test]
fn test_strip_mount_pattern_handles_plain_anchors() {
    assert_eq!(strip_mount_pattern("^\\/admin$"), "/admin");
    assert_eq!(strip_mount_pattern("/raw"), "/raw");
}

#[test]
fn test_prefix_remainder_respects_segment_boundaries() {
    assert_eq!(prefix_remainder("/api/users", "/api"), Some("/users"));
    assert_eq!(prefix_remainder("/api", "/api"), Some("/"));
    assert_eq!(prefix_remainder("/apiary", "/api"), None);
    assert_eq!(prefix_remainder("/users", "/api"), None);
    assert_eq!(prefix_remainder("/anything", ""), Some("/anything"));
}

#[test]
fn test_tagged_registration_records_route_and_chain_provenance() {
    let router = Router::with_source("routes/users.rs");
    let route = router.get("/users/:id", [noop()]);

    assert_eq!(route.source.as_deref(), Some("routes/users.rs"));
    // Route logger first, then the user handler.
    assert_eq!(route.chain().len(), 2);

    let registry = router.registry();
    for entry in route.chain() {
        let meta = registry.meta(entry.id()).unwrap();
        assert_eq!(meta.source.as_deref(), Some("routes/users.rs"));
        assert_eq!(meta.name.as_deref(), Some("GET /users/:id"));
    }
}

#[test]
fn test_untagged_registration_writes_no_provenance() {
    let router = Router::new();
    let route = router.get("/health", [noop()]);

    assert_eq!(route.source, None);
    // No source, no logger insertion either.
    assert_eq!(route.chain().len(), 1);
    assert!(router.registry().meta(route.chain()[0].id()).is_none());
}

#[test]
fn test_wrapped_handlers_link_their_original_even_untagged() {
    let inner = noop();
    let wrapper = crate::dispatcher::Handler::wrapping(|_req, _res| Flow::Halt, &inner);
    let router = Router::new();
    let route = router.get("/wrapped", [wrapper]);

    let meta = router.registry().meta(route.chain()[0].id()).unwrap();
    assert_eq!(meta.original, Some(inner.id()));
    assert_eq!(meta.source, None);
}

#[test]
fn test_handler_tags_travel_to_other_routers() {
    let shared = noop();
    let tagged = Router::with_source("routes/shared.rs");
    tagged.get("/a", [shared.clone()]);

    // Re-registering the same handler elsewhere finds the recorded tag.
    let untagged = Router::new();
    let route = untagged.get("/b", [shared.clone()]);
    assert_eq!(route.source, None);
    assert_eq!(
        untagged.registry().source(shared.id()).as_deref(),
        Some("routes/shared.rs")
    );
}

#[test]
fn test_find_extracts_params_and_resolves_sources() {
    let router = Router::with_source("routes/users.rs");
    router.get("/users/:id", [noop()]);

    let found = router.find(&Method::GET, "/users/42").unwrap();
    assert_eq!(found.route.path, "/users/:id");
    assert_eq!(found.base_url, "");
    assert_eq!(found.path_params.len(), 1);
    assert_eq!(found.path_params[0].0.as_ref(), "id");
    assert_eq!(found.path_params[0].1, "42");
    assert_eq!(
        found.handler_sources,
        vec![
            Some(Arc::from("routes/users.rs")),
            Some(Arc::from("routes/users.rs"))
        ]
    );
}

#[test]
fn test_find_respects_method_and_registration_order() {
    let router = Router::with_source("routes/items.rs");
    router.get("/items/:id", [noop()]);
    router.get("/items/special", [noop()]);

    // Registered first, so the template shadows the literal path.
    let found = router.find(&Method::GET, "/items/special").unwrap();
    assert_eq!(found.route.path, "/items/:id");

    assert!(router.find(&Method::POST, "/items/special").is_none());
    assert!(router.find(&Method::GET, "/missing").is_none());
}

#[test]
fn test_find_descends_mounts_and_accumulates_base_url() {
    let api = Router::with_source("routes/api.rs");
    let users = Router::with_source("routes/users.rs");
    users.get("/users/:id", [noop()]);
    api.mount("/v1", users);

    let root = Router::new();
    root.mount("/api", api);

    let found = root.find(&Method::GET, "/api/v1/users/9").unwrap();
    assert_eq!(found.base_url, "/api/v1");
    assert_eq!(found.route.path, "/users/:id");
    assert_eq!(found.path_params[0].1, "9");

    assert!(root.find(&Method::GET, "/api/users/9").is_none());
}

#[test]
fn test_mounted_root_route_matches_bare_prefix() {
    let child = Router::with_source("routes/status.rs");
    child.get("/", [noop()]);
    let root = Router::new();
    root.mount("/status", child);

    let found = root.find(&Method::GET, "/status").unwrap();
    assert_eq!(found.route.path, "/");
    assert_eq!(found.base_url, "/status");
}

#[test]
fn test_mount_layer_stores_anchored_pattern() {
    let root = Router::new();
    root.mount("/api", Router::new());

    let layers = root.layers();
    assert_eq!(layers.len(), 1);
    match &layers[0] {
        Layer::Mount(mount) => {
            assert_eq!(mount.pattern, "^\\/api\\/?(?=\\/|$)");
            assert_eq!(mount.prefix(), "/api");
        }
        Layer::Route(route) => panic!("expected a mount layer, found route {}", route.path),
    }
}

#[test]
fn test_direct_routes_skip_mounted_children() {
    let router = Router::with_source("routes/items.rs");
    router.get("/items", [noop()]);
    router.post("/items", [noop()]);

    let nested = Router::with_source("routes/nested.rs");
    nested.get("/deep", [noop()]);
    router.mount("/nested", nested);

    let routes = router.direct_routes();
    assert_eq!(
        routes,
        vec![
            (Method::GET, "/items".to_string()),
            (Method::POST, "/items".to_string())
        ]
    );
}

#[test]
fn test_clones_share_the_layer_stack() {
    let router = Router::with_source("routes/shared.rs");
    let observer = router.clone();
    router.get("/later", [noop()]);

    assert_eq!(observer.direct_routes().len(), 1);
}
