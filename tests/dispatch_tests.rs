use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use http::Method;
use serde_json::json;
use waymark::{handler, App, Flow, HandlerRequest, HandlerResponse, Middleware, Router};

mod common;

/// Middleware that counts its hook invocations.
#[derive(Default)]
struct Counting {
    before: AtomicUsize,
    after: AtomicUsize,
}

impl Middleware for Counting {
    fn before(&self, _req: &HandlerRequest) -> Option<HandlerResponse> {
        self.before.fetch_add(1, Ordering::SeqCst);
        None
    }

    fn after(&self, _req: &HandlerRequest, _res: &mut HandlerResponse, _latency: Duration) {
        self.after.fetch_add(1, Ordering::SeqCst);
    }
}

/// Middleware that records the order its hooks run in.
struct Tagged {
    name: &'static str,
    order: Arc<Mutex<Vec<String>>>,
}

impl Middleware for Tagged {
    fn before(&self, _req: &HandlerRequest) -> Option<HandlerResponse> {
        self.order.lock().unwrap().push(format!("{} before", self.name));
        None
    }

    fn after(&self, _req: &HandlerRequest, _res: &mut HandlerResponse, _latency: Duration) {
        self.order.lock().unwrap().push(format!("{} after", self.name));
    }
}

#[test]
fn test_unmatched_requests_skip_the_middleware_pipeline() {
    let counting = Arc::new(Counting::default());
    let mut app = App::new();
    app.add_middleware(Arc::clone(&counting) as Arc<dyn Middleware>);

    let res = app.handle(Method::GET, "/nowhere", None);
    assert_eq!(res.status, 404);
    assert_eq!(counting.before.load(Ordering::SeqCst), 0);
    assert_eq!(counting.after.load(Ordering::SeqCst), 0);
}

#[test]
fn test_before_veto_skips_the_chain_but_not_after_hooks() {
    struct Deny;
    impl Middleware for Deny {
        fn before(&self, _req: &HandlerRequest) -> Option<HandlerResponse> {
            Some(HandlerResponse::error(403, "Forbidden"))
        }
    }

    let ran = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&ran);
    let counting = Arc::new(Counting::default());

    let mut app = App::new();
    app.router().get("/guarded", [handler(move |_req, res| {
        seen.fetch_add(1, Ordering::SeqCst);
        *res = HandlerResponse::json(200, json!({ "ok": true }));
        Flow::Halt
    })]);
    app.add_middleware(Arc::new(Deny));
    app.add_middleware(Arc::clone(&counting) as Arc<dyn Middleware>);

    let res = app.handle(Method::GET, "/guarded", None);
    assert_eq!(res.status, 403);
    assert_eq!(ran.load(Ordering::SeqCst), 0);
    // Every before hook still runs after the veto, and so does every after.
    assert_eq!(counting.before.load(Ordering::SeqCst), 1);
    assert_eq!(counting.after.load(Ordering::SeqCst), 1);
}

#[test]
fn test_chain_halts_at_the_first_halting_entry() {
    let order = Arc::new(Mutex::new(Vec::<&'static str>::new()));
    let first = {
        let order = Arc::clone(&order);
        handler(move |_req, _res| {
            order.lock().unwrap().push("first");
            Flow::Continue
        })
    };
    let second = {
        let order = Arc::clone(&order);
        handler(move |_req, res| {
            order.lock().unwrap().push("second");
            *res = HandlerResponse::json(200, json!({ "by": "second" }));
            Flow::Halt
        })
    };
    let third = {
        let order = Arc::clone(&order);
        handler(move |_req, _res| {
            order.lock().unwrap().push("third");
            Flow::Halt
        })
    };

    let app = App::new();
    app.router().get("/chain", [first, second, third]);

    let res = app.handle(Method::GET, "/chain", None);
    assert_eq!(res.body["by"], json!("second"));
    assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
}

#[test]
fn test_all_continue_entries_fall_through_to_not_found() {
    let app = App::new();
    app.router().get("/fall", [
        handler(|_req, _res| Flow::Continue),
        handler(|_req, _res| Flow::Continue),
    ]);

    let res = app.handle(Method::GET, "/fall", None);
    assert_eq!(res.status, 404);
    assert_eq!(res.body, json!({ "error": "Not Found" }));
}

#[test]
fn test_application_middleware_runs_before_router_scoped() {
    let order = Arc::new(Mutex::new(Vec::new()));

    let admin = Router::with_source("routes/admin.rs");
    admin.get("/panel", [common::empty_ok()]);
    admin.use_middleware(Arc::new(Tagged {
        name: "router",
        order: Arc::clone(&order),
    }));

    let mut app = App::new();
    app.add_middleware(Arc::new(Tagged {
        name: "app",
        order: Arc::clone(&order),
    }));
    app.router().mount("/admin", admin);

    let res = app.handle(Method::GET, "/admin/panel", None);
    assert_eq!(res.status, 200);
    assert_eq!(
        *order.lock().unwrap(),
        vec!["app before", "router before", "app after", "router after"]
    );
}

#[test]
fn test_router_scoped_middleware_only_sees_its_subtree() {
    let counting = Arc::new(Counting::default());

    let admin = Router::new();
    admin.get("/panel", [common::empty_ok()]);
    admin.use_middleware(Arc::clone(&counting) as Arc<dyn Middleware>);

    let app = App::new();
    app.router().get("/", [common::json_ok(json!({ "root": true }))]);
    app.router().mount("/admin", admin);

    app.handle(Method::GET, "/", None);
    assert_eq!(counting.before.load(Ordering::SeqCst), 0);

    app.handle(Method::GET, "/admin/panel", None);
    assert_eq!(counting.before.load(Ordering::SeqCst), 1);
    assert_eq!(counting.after.load(Ordering::SeqCst), 1);
}

#[test]
fn test_handlers_see_mount_relative_request_views() {
    let api = Router::with_source("routes/echo.rs");
    api.get("/echo/:word", [handler(|req, res| {
        let sources: Vec<String> = req
            .route
            .as_ref()
            .map(|route| {
                route
                    .handler_sources
                    .iter()
                    .map(|source| source.as_deref().unwrap_or("unknown").to_string())
                    .collect()
            })
            .unwrap_or_default();
        *res = HandlerResponse::json(
            200,
            json!({
                "path": req.path,
                "base": req.base_url,
                "original": req.original_url,
                "word": req.get_path_param("word"),
                "limit": req.get_query_param("limit"),
                "route": req.route.as_ref().map(|route| route.path.clone()),
                "sources": sources,
            }),
        );
        Flow::Halt
    })]);

    let app = App::new();
    app.router().mount("/api", api);

    let res = app.handle(Method::GET, "/api/echo/hi?limit=5&limit=9", None);
    assert_eq!(res.body["path"], json!("/echo/hi"));
    assert_eq!(res.body["base"], json!("/api"));
    assert_eq!(res.body["original"], json!("/api/echo/hi?limit=5&limit=9"));
    assert_eq!(res.body["word"], json!("hi"));
    assert_eq!(res.body["limit"], json!("9"));
    assert_eq!(res.body["route"], json!("/echo/:word"));
    // Route logger first, then the user handler, both tagged.
    assert_eq!(
        res.body["sources"],
        json!(["routes/echo.rs", "routes/echo.rs"])
    );
}

#[test]
fn test_request_bodies_reach_handlers() {
    let app = App::new();
    app.router().post("/sum", [handler(|req, res| {
        let n = req
            .body
            .as_ref()
            .and_then(|body| body["n"].as_i64())
            .unwrap_or(0);
        *res = HandlerResponse::json(200, json!({ "twice": n * 2 }));
        Flow::Halt
    })]);

    let res = app.handle(Method::POST, "/sum", Some(json!({ "n": 21 })));
    assert_eq!(res.body["twice"], json!(42));
}
