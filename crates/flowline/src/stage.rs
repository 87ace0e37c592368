//! Stage descriptors.
//!
//! A [`Stage`] describes one interceptor in the configured list, in one of
//! two shapes:
//!
//! - a closure, invoked positionally with `(passable, next)`;
//! - a registry key with optional string arguments, resolved through the
//!   pipeline's [`Resolver`](crate::Resolver) when the chain reaches it.
//!
//! The string form `"RateLimit?10:60"` encodes the arguments in the key:
//! everything after [`PARAM_MARKER`] splits on [`PARAM_DELIMITER`]. The
//! parse happens eagerly when the descriptor is built, so invocation only
//! ever sees the structured `(key, args)` pair.

use crate::error::FlowResult;
use crate::middleware::Next;
use std::fmt;
use std::sync::Arc;

/// Separates the resolver key from the parameter block in a string
/// descriptor.
pub const PARAM_MARKER: char = '?';

/// Separates individual arguments inside the parameter block.
pub const PARAM_DELIMITER: char = ':';

/// The callable form of a stage.
pub type CallableStage<P, R> =
    dyn for<'a> Fn(P, Next<'a, P, R>) -> FlowResult<R> + Send + Sync;

/// One interceptor in the configured list.
pub enum Stage<P, R = P> {
    /// A closure invoked positionally with `(passable, next)`.
    ///
    /// It fully owns whether, when, and how often to call `next`.
    Closure(Arc<CallableStage<P, R>>),

    /// A registry key resolved at invocation time, plus the extra arguments
    /// appended after `(passable, next)` when the resolved middleware is
    /// dispatched.
    Keyed {
        /// The resolver key. A zero-length key is legal; it simply will not
        /// resolve unless something is registered under `""`.
        key: String,
        /// Extra string arguments. Empty for plain keys.
        args: Vec<String>,
    },
}

impl<P, R> Stage<P, R> {
    /// Builds a closure stage.
    pub fn closure<F>(func: F) -> Self
    where
        F: for<'a> Fn(P, Next<'a, P, R>) -> FlowResult<R> + Send + Sync + 'static,
    {
        Self::Closure(Arc::new(func))
    }

    /// Builds a keyed stage from a string descriptor, parsing any embedded
    /// parameter block.
    ///
    /// ```
    /// use flowline::Stage;
    ///
    /// let stage: Stage<i64> = Stage::keyed("RateLimit?10:60");
    /// assert_eq!(stage.key(), Some("RateLimit"));
    /// assert_eq!(stage.args(), ["10", "60"]);
    /// ```
    #[must_use]
    pub fn keyed(descriptor: impl AsRef<str>) -> Self {
        let descriptor = descriptor.as_ref();
        match descriptor.split_once(PARAM_MARKER) {
            Some((key, block)) => Self::Keyed {
                key: key.to_string(),
                args: parse_param_block(block),
            },
            None => Self::Keyed {
                key: descriptor.to_string(),
                args: Vec::new(),
            },
        }
    }

    /// Builds a keyed stage from an explicit key and argument list.
    ///
    /// The key is taken verbatim; no parameter-block parsing happens here.
    #[must_use]
    pub fn keyed_with<K, I, A>(key: K, args: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self::Keyed {
            key: key.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the resolver key for keyed stages.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Closure(_) => None,
            Self::Keyed { key, .. } => Some(key),
        }
    }

    /// Returns the extra arguments for keyed stages; empty for closures.
    #[must_use]
    pub fn args(&self) -> &[String] {
        match self {
            Self::Closure(_) => &[],
            Self::Keyed { args, .. } => args,
        }
    }
}

/// Splits a parameter block into arguments. An empty block means no
/// arguments, not one empty argument.
fn parse_param_block(block: &str) -> Vec<String> {
    if block.is_empty() {
        Vec::new()
    } else {
        block.split(PARAM_DELIMITER).map(str::to_string).collect()
    }
}

impl<P, R> Clone for Stage<P, R> {
    fn clone(&self) -> Self {
        match self {
            Self::Closure(func) => Self::Closure(Arc::clone(func)),
            Self::Keyed { key, args } => Self::Keyed {
                key: key.clone(),
                args: args.clone(),
            },
        }
    }
}

impl<P, R> fmt::Debug for Stage<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closure(_) => f.write_str("Stage::Closure"),
            Self::Keyed { key, args } => f
                .debug_struct("Stage::Keyed")
                .field("key", key)
                .field("args", args)
                .finish(),
        }
    }
}

impl<P, R> From<&str> for Stage<P, R> {
    fn from(descriptor: &str) -> Self {
        Self::keyed(descriptor)
    }
}

impl<P, R> From<String> for Stage<P, R> {
    fn from(descriptor: String) -> Self {
        Self::keyed(descriptor)
    }
}

impl<P, R> From<(String, Vec<String>)> for Stage<P, R> {
    fn from((key, args): (String, Vec<String>)) -> Self {
        Self::Keyed { key, args }
    }
}

impl<P, R> From<(&str, Vec<String>)> for Stage<P, R> {
    fn from((key, args): (&str, Vec<String>)) -> Self {
        Self::Keyed {
            key: key.to_string(),
            args,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type IntStage = Stage<i64>;

    #[test]
    fn test_plain_key() {
        let stage = IntStage::keyed("Logger");
        assert_eq!(stage.key(), Some("Logger"));
        assert!(stage.args().is_empty());
    }

    #[test]
    fn test_key_with_params() {
        let stage = IntStage::keyed("RateLimit?10:60");
        assert_eq!(stage.key(), Some("RateLimit"));
        assert_eq!(stage.args(), ["10", "60"]);
    }

    #[test]
    fn test_key_with_single_param() {
        let stage = IntStage::keyed("Throttle?5");
        assert_eq!(stage.key(), Some("Throttle"));
        assert_eq!(stage.args(), ["5"]);
    }

    #[test]
    fn test_marker_with_empty_block() {
        let stage = IntStage::keyed("Logger?");
        assert_eq!(stage.key(), Some("Logger"));
        assert!(stage.args().is_empty());
    }

    #[test]
    fn test_empty_key_is_valid() {
        let stage = IntStage::keyed("");
        assert_eq!(stage.key(), Some(""));
        assert!(stage.args().is_empty());
    }

    #[test]
    fn test_empty_key_with_params() {
        let stage = IntStage::keyed("?a:b");
        assert_eq!(stage.key(), Some(""));
        assert_eq!(stage.args(), ["a", "b"]);
    }

    #[test]
    fn test_delimiter_without_marker_stays_in_key() {
        let stage = IntStage::keyed("a:b");
        assert_eq!(stage.key(), Some("a:b"));
        assert!(stage.args().is_empty());
    }

    #[test]
    fn test_only_first_marker_splits() {
        let stage = IntStage::keyed("Cache?ttl=60?x");
        assert_eq!(stage.key(), Some("Cache"));
        assert_eq!(stage.args(), ["ttl=60?x"]);
    }

    #[test]
    fn test_keyed_with_takes_key_verbatim() {
        let stage = IntStage::keyed_with("Rate?Limit", ["10", "60"]);
        assert_eq!(stage.key(), Some("Rate?Limit"));
        assert_eq!(stage.args(), ["10", "60"]);
    }

    #[test]
    fn test_from_str() {
        let stage: IntStage = "Logger?debug".into();
        assert_eq!(stage.key(), Some("Logger"));
        assert_eq!(stage.args(), ["debug"]);
    }

    #[test]
    fn test_from_tuple() {
        let stage: IntStage = ("Logger", vec!["debug".to_string()]).into();
        assert_eq!(stage.key(), Some("Logger"));
        assert_eq!(stage.args(), ["debug"]);
    }

    #[test]
    fn test_closure_has_no_key() {
        let stage = IntStage::closure(|x, next| next.run(x));
        assert_eq!(stage.key(), None);
        assert!(stage.args().is_empty());
    }

    #[test]
    fn test_clone_shares_closure() {
        let stage = IntStage::closure(|x, next| next.run(x + 1));
        let cloned = stage.clone();
        assert!(matches!(cloned, Stage::Closure(_)));
    }

    #[test]
    fn test_debug_output() {
        let keyed = IntStage::keyed("Logger?a");
        let debug = format!("{keyed:?}");
        assert!(debug.contains("Logger"));

        let closure = IntStage::closure(|x, next| next.run(x));
        assert_eq!(format!("{closure:?}"), "Stage::Closure");
    }
}
