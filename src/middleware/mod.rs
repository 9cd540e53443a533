mod core;
mod hateoas;
mod logger;

pub use core::Middleware;
pub use hateoas::{
    generate_relationship, normalize_route_path, substitute_path_params, CustomLinkFn,
    HateoasMiddleware, HateoasMiddlewareBuilder, HateoasOptions, Link, Links,
};
pub use logger::{format_route_log, route_logger};
