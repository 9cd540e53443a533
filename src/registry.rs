//! Out-of-band provenance metadata store.
//!
//! Handler callables cannot carry fields, so the tagging router records
//! everything it knows about a chain entry here, keyed by [`HandlerId`].
//! Entries are written while routes are registered at startup and only read
//! afterwards, during dispatch and route display.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

static GLOBAL_REGISTRY: Lazy<Arc<SourceRegistry>> = Lazy::new(|| Arc::new(SourceRegistry::new()));

/// Identity of a registered handler, stable for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

static NEXT_HANDLER_ID: AtomicU64 = AtomicU64::new(1);

impl HandlerId {
    /// Allocate the next id from the shared counter.
    pub(crate) fn next() -> Self {
        Self(NEXT_HANDLER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Metadata recorded for one handler.
#[derive(Debug, Clone, Default)]
pub struct HandlerMeta {
    /// Source identifier of the registration that produced the handler.
    pub source: Option<Arc<str>>,
    /// Display name in `"<METHOD> <path>"` form.
    pub name: Option<String>,
    /// The handler this one wraps, when it is an adapter over another handler.
    pub original: Option<HandlerId>,
    /// Sub-middleware declared for the handler. Nothing downstream consults
    /// the list; it is carried for callers that record it.
    pub middleware: Vec<HandlerId>,
}

/// Registry mapping handler identity to provenance metadata.
///
/// Shared between a router and everything that introspects it. Lock poisoning
/// is treated as "no metadata": lookups return `None` and writes are dropped,
/// consistent with the crate-wide rule that missing provenance degrades to
/// `"unknown"` rather than failing a request.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    entries: RwLock<HashMap<HandlerId, HandlerMeta>>,
}

impl SourceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry shared by every router.
    ///
    /// Handler ids are globally unique, so one store lets a tag recorded by
    /// any tagging router resolve wherever the handler is registered later.
    #[must_use]
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    /// Record the source tag for a handler.
    pub fn set_source(&self, id: HandlerId, source: Arc<str>) {
        if let Ok(mut entries) = self.entries.write() {
            entries.entry(id).or_default().source = Some(source);
        }
    }

    /// Record the display name for a handler.
    pub fn set_name(&self, id: HandlerId, name: String) {
        if let Ok(mut entries) = self.entries.write() {
            entries.entry(id).or_default().name = Some(name);
        }
    }

    /// Record which handler this one wraps.
    pub fn set_original(&self, id: HandlerId, original: HandlerId) {
        if let Ok(mut entries) = self.entries.write() {
            entries.entry(id).or_default().original = Some(original);
        }
    }

    /// Record sub-middleware declared for a handler.
    pub fn set_middleware(&self, id: HandlerId, middleware: Vec<HandlerId>) {
        if let Ok(mut entries) = self.entries.write() {
            entries.entry(id).or_default().middleware = middleware;
        }
    }

    /// Source tag recorded for a handler, if any.
    #[must_use]
    pub fn source(&self, id: HandlerId) -> Option<Arc<str>> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(&id).and_then(|meta| meta.source.clone()))
    }

    /// Full metadata snapshot for a handler, if any was recorded.
    #[must_use]
    pub fn meta(&self, id: HandlerId) -> Option<HandlerMeta> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(&id).cloned())
    }
}
