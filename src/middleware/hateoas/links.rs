use std::collections::BTreeMap;

use http::Method;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::Value;

use crate::dispatcher::HandlerRequest;

/// Matches a single `:name` parameter token inside a path template.
static PARAM_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(":[^/]+").expect("Failed to compile path regex"));

/// One hypermedia link embedded in a response body.
///
/// Serializes to `{title?, rel, href, method}`. The relation name is carried
/// both as the [`Links`] map key and in the `rel` field so each link is
/// self-describing when clients iterate the map values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Human-readable label, set on sibling route links.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Relation name describing how the target relates to the current resource.
    pub rel: String,
    /// Target of the link, prefixed with the configured base URL.
    pub href: String,
    /// HTTP method the client should use when following the link.
    pub method: String,
}

impl Link {
    /// Create an untitled link.
    pub fn new(rel: impl Into<String>, href: impl Into<String>, method: &Method) -> Self {
        Self {
            title: None,
            rel: rel.into(),
            href: href.into(),
            method: method.to_string(),
        }
    }

    /// Create a link with a human-readable title.
    pub fn titled(
        title: impl Into<String>,
        rel: impl Into<String>,
        href: impl Into<String>,
        method: &Method,
    ) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::new(rel, href, method)
        }
    }
}

/// Link map keyed by relation name. `BTreeMap` keeps serialization stable
/// across runs.
pub type Links = BTreeMap<String, Link>;

/// Derive a relation name from an HTTP method and a path template.
///
/// RESTful conventions first: the collection root maps `GET` to `collection`
/// and `POST` to `create`, an `:id`-terminated path maps `GET`/`PUT`/`DELETE`/
/// `PATCH` to `item`/`update`/`delete`/`partial-update`. Anything else falls
/// back to a slug of the lowercased method and the dash-joined path segments
/// with parameter colons removed, e.g. `GET /users/:id/orders` becomes
/// `get-users-id-orders`.
pub fn generate_relationship(method: &Method, path: &str) -> String {
    let lowered = method.as_str().to_ascii_lowercase();

    if path == "/" || path.is_empty() {
        return match *method {
            Method::GET => "collection".to_string(),
            Method::POST => "create".to_string(),
            _ => lowered,
        };
    }

    if path.rsplit('/').next() == Some(":id") {
        return match *method {
            Method::GET => "item".to_string(),
            Method::PUT => "update".to_string(),
            Method::DELETE => "delete".to_string(),
            Method::PATCH => "partial-update".to_string(),
            _ => lowered,
        };
    }

    let slug = path
        .trim_matches('/')
        .replace(':', "")
        .replace('/', "-");
    format!("{lowered}-{slug}")
}

/// Normalize a path template for equality comparison: strip one trailing and
/// one leading slash, then collapse every `:name` token to `:param`.
///
/// `/users/:id/` normalizes to `users/:param`; the bare root `/` normalizes
/// to the empty string.
pub fn normalize_route_path(path: &str) -> String {
    let path = path.strip_suffix('/').unwrap_or(path);
    let path = path.strip_prefix('/').unwrap_or(path);
    PARAM_TOKEN.replace_all(path, ":param").into_owned()
}

/// Fill the `:name` tokens of a path template with concrete values.
///
/// Each token resolves, in order of preference, to the matching path parameter
/// of the current request, then to a string or number field of the response
/// body, and otherwise stays in the output verbatim so the gap is visible to
/// clients.
pub fn substitute_path_params(template: &str, req: &HandlerRequest, body: &Value) -> String {
    PARAM_TOKEN
        .replace_all(template, |caps: &Captures<'_>| {
            let token = &caps[0];
            let name = &token[1..];
            if let Some(value) = req.get_path_param(name) {
                return value.to_string();
            }
            match body.get(name) {
                Some(Value::String(text)) => text.clone(),
                Some(Value::Number(number)) => number.to_string(),
                _ => token.to_string(),
            }
        })
        .into_owned()
}

/// Read `currentPage` and `totalPages` out of a body's `pagination` object.
/// Any missing or non-integer field disables pagination links entirely.
pub(super) fn pagination_pages(body: &Value) -> Option<(i64, i64)> {
    let pagination = body.get("pagination")?;
    let current = pagination.get("currentPage")?.as_i64()?;
    let total = pagination.get("totalPages")?.as_i64()?;
    Some((current, total))
}
