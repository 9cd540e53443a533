//! Demo binary exercising the toolkit against a small storefront API.
//!
//! `waymark routes` prints the sample application's route table. `waymark
//! request <METHOD> <PATH>` dispatches one request through the pipeline and
//! prints the resulting response, hypermedia links included.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use http::Method;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use waymark::middleware::{HateoasMiddleware, Link};
use waymark::{handler, App, Flow, HandlerResponse, RouteDisplay, Router};

#[derive(Parser)]
#[command(name = "waymark")]
#[command(about = "Route provenance and HATEOAS demo", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the sample application's route table
    Routes,
    /// Dispatch one request through the sample application
    Request {
        /// HTTP method, e.g. GET or POST
        method: String,

        /// Request target, path plus optional query string
        path: String,

        /// JSON body to attach to the request
        #[arg(short, long)]
        body: Option<String>,

        /// Prefix for generated hypermedia links
        #[arg(long, env = "WAYMARK_BASE_URL", default_value = "")]
        base_url: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Routes => {
            let app = sample_app("");
            RouteDisplay::new(&app).display_routes();
        }
        Commands::Request {
            method,
            path,
            body,
            base_url,
        } => {
            let app = sample_app(&base_url);
            let method: Method = method.to_uppercase().parse()?;
            let body = body
                .as_deref()
                .map(|raw| serde_json::from_str::<Value>(raw))
                .transpose()?;
            let res = app.handle(method, &path, body);
            println!("{}", serde_json::to_string_pretty(&res)?);
        }
    }
    Ok(())
}

/// Build the sample storefront: a tagged items router and a tagged users
/// router nested under `/api`, plus an untagged health probe on the root.
fn sample_app(base_url: &str) -> App {
    let items = Router::with_source("routes/items.rs");
    items.get("/", [handler(|req, res| {
        let page = req
            .get_query_param("page")
            .and_then(|raw| raw.parse::<i64>().ok())
            .unwrap_or(1);
        *res = HandlerResponse::json(200, json!({
            "items": [
                { "id": "1", "name": "anvil" },
                { "id": "2", "name": "mallet" }
            ],
            "pagination": { "currentPage": page, "totalPages": 3 }
        }));
        Flow::Halt
    })]);
    items.get("/:id", [handler(|req, res| {
        let id = req.get_path_param("id").unwrap_or("").to_string();
        *res = HandlerResponse::json(200, json!({ "id": id, "name": "anvil", "price": 1200 }));
        Flow::Halt
    })]);
    items.post("/", [handler(|req, res| {
        let name = req
            .body
            .as_ref()
            .and_then(|body| body.get("name"))
            .cloned()
            .unwrap_or_else(|| json!("unnamed"));
        *res = HandlerResponse::json(201, json!({ "id": "3", "name": name }));
        Flow::Halt
    })]);
    items.delete("/:id", [handler(|req, res| {
        let id = req.get_path_param("id").unwrap_or("").to_string();
        *res = HandlerResponse::json(200, json!({ "deleted": id }));
        Flow::Halt
    })]);
    items.use_middleware(Arc::new(
        HateoasMiddleware::builder()
            .base_url(base_url)
            .include_pagination(true)
            .custom_link("docs", |_req| {
                Some(Link::new("docs", "/docs/items", &Method::GET))
            })
            .build(items.clone()),
    ));

    let users = Router::with_source("routes/users.rs");
    users.get("/", [handler(|_req, res| {
        *res = HandlerResponse::json(200, json!({
            "users": [ { "id": "7", "name": "ada" } ]
        }));
        Flow::Halt
    })]);
    users.get("/:id", [handler(|req, res| {
        let id = req.get_path_param("id").unwrap_or("").to_string();
        *res = HandlerResponse::json(200, json!({ "id": id, "name": "ada" }));
        Flow::Halt
    })]);
    users.patch("/:id", [handler(|req, res| {
        let id = req.get_path_param("id").unwrap_or("").to_string();
        *res = HandlerResponse::json(200, json!({ "id": id, "updated": true }));
        Flow::Halt
    })]);
    users.use_middleware(Arc::new(
        HateoasMiddleware::builder()
            .base_url(base_url)
            .build(users.clone()),
    ));

    let api = Router::new();
    api.mount("/items", items);
    api.mount("/users", users);

    let app = App::new();
    app.router().mount("/api", api);
    app.router().get("/health", [handler(|_req, res| {
        *res = HandlerResponse::json(200, json!({ "status": "ok" }));
        Flow::Halt
    })]);
    app
}
