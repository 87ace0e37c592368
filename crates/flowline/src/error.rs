//! Error types for flowline.
//!
//! This module provides [`FlowError`], the standard error type returned by
//! [`Pipeline::run`](crate::Pipeline::run) and everything it invokes.
//!
//! The pipeline itself only produces the `Resolution`, `Invocation`, and
//! `Configuration` kinds. Failures raised inside stage logic or the terminal
//! handler travel through the `Middleware` variant unchanged, so callers see
//! the original error rather than a pipeline-flavored wrapper.

use thiserror::Error;

/// Result type alias using [`FlowError`].
pub type FlowResult<T> = Result<T, FlowError>;

/// Standard error type for flowline.
///
/// # Example
///
/// ```
/// use flowline::{FlowError, FlowResult};
///
/// fn check_key(key: &str) -> FlowResult<()> {
///     if key.is_empty() {
///         return Err(FlowError::resolution(key));
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug, Error)]
pub enum FlowError {
    /// A keyed stage's identifier was not found by the resolver.
    #[error("no middleware registered for key `{key}`")]
    Resolution {
        /// The key that failed to resolve.
        key: String,
    },

    /// A resolved middleware exposes neither the configured method nor the
    /// callable form.
    #[error("middleware `{name}` exposes no method `{method}`")]
    Invocation {
        /// Name of the resolved middleware.
        name: String,
        /// The invocation method the pipeline was configured with.
        method: String,
    },

    /// The pipeline was asked to do something its configuration cannot
    /// support, e.g. running without a passable or reaching a keyed stage
    /// with no resolver attached.
    #[error("pipeline misconfigured: {message}")]
    Configuration {
        /// Human-readable description of the misconfiguration.
        message: String,
    },

    /// A failure raised inside a stage or the terminal handler.
    ///
    /// The pipeline does not catch, wrap, or suppress these; the chain
    /// unwinds and the original error surfaces to the caller of `run`.
    #[error(transparent)]
    Middleware(#[from] anyhow::Error),
}

impl FlowError {
    /// Creates a resolution error for an unregistered key.
    #[must_use]
    pub fn resolution(key: impl Into<String>) -> Self {
        Self::Resolution { key: key.into() }
    }

    /// Creates an invocation error for a middleware/method pair.
    #[must_use]
    pub fn invocation(name: impl Into<String>, method: impl Into<String>) -> Self {
        Self::Invocation {
            name: name.into(),
            method: method.into(),
        }
    }

    /// Creates a configuration error with a message.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Wraps a stage-level failure so it can travel through the chain.
    pub fn middleware(source: impl Into<anyhow::Error>) -> Self {
        Self::Middleware(source.into())
    }
}
