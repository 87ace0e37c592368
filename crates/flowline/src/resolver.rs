//! Key-to-middleware resolution.
//!
//! Keyed stages name their middleware by string; something has to map that
//! string to an instance. That something is a [`Resolver`], injected into the
//! pipeline at construction ([`Pipeline::with_resolver`](crate::Pipeline::with_resolver))
//! rather than reached for as ambient state, which keeps the core testable
//! with a stub.
//!
//! [`Registry`] is the bundled in-memory implementation: middleware are
//! registered under string keys at startup and looked up during `run`.

use crate::middleware::Middleware;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Maps string keys to middleware instances.
///
/// Lookup only; the pipeline never mutates its resolver. An implementation
/// shared across pipelines or threads must carry its own synchronization —
/// the bundled [`Registry`] is immutable after setup and needs none.
pub trait Resolver<P, R = P>: Send + Sync {
    /// Looks up the middleware registered under `key`.
    ///
    /// Returns `None` when the key is unregistered; the pipeline surfaces
    /// that as [`FlowError::Resolution`](crate::FlowError::Resolution).
    fn resolve(&self, key: &str) -> Option<Arc<dyn Middleware<P, R>>>;
}

/// An in-memory [`Resolver`] backed by a `HashMap`.
///
/// # Example
///
/// ```
/// use flowline::{FnMiddleware, Next, Registry, Resolver};
/// use std::sync::Arc;
///
/// let mut registry: Registry<i64> = Registry::new();
/// registry.register(
///     "double",
///     Arc::new(FnMiddleware::new("double", |x: i64, next: Next<'_, i64>, _args: &[String]| {
///         next.run(x * 2)
///     })),
/// );
///
/// assert!(registry.resolve("double").is_some());
/// assert!(registry.resolve("triple").is_none());
/// ```
pub struct Registry<P, R = P> {
    entries: HashMap<String, Arc<dyn Middleware<P, R>>>,
}

impl<P, R> Registry<P, R> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registers a middleware under a key, replacing any previous entry.
    pub fn register(&mut self, key: impl Into<String>, middleware: Arc<dyn Middleware<P, R>>) {
        self.entries.insert(key.into(), middleware);
    }

    /// Checks whether a key is registered.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the number of registered middleware.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no middleware are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P, R> Default for Registry<P, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, R> Resolver<P, R> for Registry<P, R>
where
    P: Send + Sync,
    R: Send + Sync,
{
    fn resolve(&self, key: &str) -> Option<Arc<dyn Middleware<P, R>>> {
        self.entries.get(key).map(Arc::clone)
    }
}

impl<P, R> fmt::Debug for Registry<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("entry_count", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlowResult;
    use crate::middleware::{FnMiddleware, Next};

    fn noop() -> Arc<dyn Middleware<i64>> {
        Arc::new(FnMiddleware::new(
            "noop",
            |x: i64, next: Next<'_, i64>, _args: &[String]| -> FlowResult<i64> { next.run(x) },
        ))
    }

    #[test]
    fn test_registry_new_is_empty() {
        let registry: Registry<i64> = Registry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_register_and_resolve() {
        let mut registry = Registry::new();
        registry.register("noop", noop());

        let resolved = registry.resolve("noop");
        assert!(resolved.is_some());
        assert_eq!(resolved.unwrap().name(), "noop");
    }

    #[test]
    fn test_resolve_missing() {
        let registry: Registry<i64> = Registry::new();
        assert!(registry.resolve("ghost").is_none());
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = Registry::new();
        registry.register("stage", noop());
        registry.register(
            "stage",
            Arc::new(FnMiddleware::new(
                "other",
                |x: i64, next: Next<'_, i64>, _args: &[String]| next.run(x),
            )),
        );

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve("stage").unwrap().name(), "other");
    }

    #[test]
    fn test_contains() {
        let mut registry = Registry::new();
        assert!(!registry.contains("noop"));
        registry.register("noop", noop());
        assert!(registry.contains("noop"));
    }

    #[test]
    fn test_empty_string_key_is_allowed() {
        let mut registry = Registry::new();
        registry.register("", noop());
        assert!(registry.resolve("").is_some());
    }

    #[test]
    fn test_registry_debug() {
        let mut registry = Registry::new();
        registry.register("noop", noop());

        let debug = format!("{registry:?}");
        assert!(debug.contains("Registry"));
        assert!(debug.contains("entry_count"));
    }
}
