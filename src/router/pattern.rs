//! Path template and mount pattern helpers.
//!
//! Route paths use `:param` segments (`/users/:id`) and compile to anchored
//! regexes with one capture group per parameter. Mount prefixes are stored in
//! the anchored source form the layer exposes (`^\/api\/?(?=\/|$)`); matching
//! itself never evaluates the lookahead, it checks the plain prefix at a
//! segment boundary.

use regex::Regex;
use std::sync::Arc;

/// Compile a `:param` path template into an anchored matcher and its ordered
/// parameter names. `/users/:id` becomes `^/users/([^/]+)$` with `["id"]`.
pub(crate) fn compile_template(path: &str) -> (Regex, Vec<Arc<str>>) {
    if path == "/" {
        return (
            Regex::new(r"^/$").expect("Failed to compile path regex"),
            Vec::new(),
        );
    }

    let mut pattern = String::with_capacity(path.len() + 8);
    pattern.push('^');
    let mut param_names: Vec<Arc<str>> = Vec::new();

    for segment in path.split('/') {
        if let Some(name) = segment.strip_prefix(':') {
            if !name.is_empty() {
                pattern.push_str("/([^/]+)");
                param_names.push(Arc::from(name));
                continue;
            }
        }
        if !segment.is_empty() {
            pattern.push('/');
            pattern.push_str(&regex::escape(segment));
        }
    }

    pattern.push('$');
    let regex = Regex::new(&pattern).expect("Failed to compile path regex");

    (regex, param_names)
}

/// Anchored pattern a mounted router is stored under: `/api` becomes
/// `^\/api\/?(?=\/|$)`.
pub(crate) fn mount_pattern(prefix: &str) -> String {
    let trimmed = prefix.trim_end_matches('/');
    format!("^{}\\/?(?=\\/|$)", trimmed.replace('/', "\\/"))
}

/// Undo the anchoring on a mount pattern: drop the optional-trailing-slash
/// assertion, un-escape slashes, strip the leading `^` and trailing `$`.
#[must_use]
pub fn strip_mount_pattern(pattern: &str) -> String {
    let unanchored = pattern.replacen("\\/?(?=\\/|$)", "", 1);
    let unescaped = unanchored.replace("\\/", "/");
    let stripped = unescaped.strip_prefix('^').unwrap_or(&unescaped);
    stripped.strip_suffix('$').unwrap_or(stripped).to_string()
}

/// Remainder of `path` under a mount `prefix`, or `None` when the prefix does
/// not apply at a segment boundary. A fully consumed path leaves `/`.
pub(crate) fn prefix_remainder<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return Some(path);
    }
    let rest = path.strip_prefix(prefix)?;
    if rest.is_empty() {
        Some("/")
    } else if rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}
