//! Core middleware trait and the chain continuation.
//!
//! This module defines the [`Middleware`] trait implemented by instances that
//! a [`Resolver`](crate::Resolver) hands back for keyed stages, and [`Next`],
//! the continuation a stage calls to delegate to the rest of the chain.
//!
//! A middleware may act before delegating, after delegating, both, or not
//! delegate at all. Skipping the call to [`Next::run`] short-circuits the
//! chain: downstream stages and the terminal handler never execute, and the
//! middleware's return value becomes the overall result.
//!
//! # Example
//!
//! ```
//! use flowline::{FlowResult, Middleware, Next};
//!
//! struct Doubler;
//!
//! impl Middleware<i64> for Doubler {
//!     fn name(&self) -> &'static str {
//!         "doubler"
//!     }
//!
//!     fn handle(&self, passable: i64, next: Next<'_, i64>, _args: &[String]) -> FlowResult<i64> {
//!         next.run(passable * 2)
//!     }
//! }
//! ```

use crate::error::{FlowError, FlowResult};
use std::fmt;

/// The invocation method keyed stages are dispatched through unless
/// [`Pipeline::via`](crate::Pipeline::via) says otherwise.
pub const DEFAULT_METHOD: &str = "handle";

/// The contract for resolved middleware instances.
///
/// Closure stages never touch this trait; they are invoked positionally.
/// Keyed stages resolve to `Arc<dyn Middleware>` and are invoked through
/// [`Middleware::dispatch`] with the pipeline's configured method name.
///
/// The trailing `args` slice carries the extra arguments encoded in the stage
/// descriptor (`"RateLimit?10:60"` yields `["10", "60"]`); it is empty for
/// plain keys.
pub trait Middleware<P, R = P>: Send + Sync {
    /// Returns the name of this middleware, used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Processes the passable, delegating to `next` when appropriate.
    ///
    /// `next` may be called zero, one, or several times; the pipeline places
    /// no restriction and does not detect misuse.
    fn handle(&self, passable: P, next: Next<'_, P, R>, args: &[String]) -> FlowResult<R>;

    /// Dispatches an invocation by method name.
    ///
    /// The default implementation recognizes only [`DEFAULT_METHOD`] and
    /// answers any other name with [`FlowError::Invocation`]. Middleware
    /// exposing additional entry points overrides this:
    ///
    /// ```
    /// use flowline::{FlowError, FlowResult, Middleware, Next};
    ///
    /// struct Audited;
    ///
    /// impl Middleware<i64> for Audited {
    ///     fn name(&self) -> &'static str {
    ///         "audited"
    ///     }
    ///
    ///     fn handle(&self, passable: i64, next: Next<'_, i64>, _args: &[String]) -> FlowResult<i64> {
    ///         next.run(passable)
    ///     }
    ///
    ///     fn dispatch(
    ///         &self,
    ///         method: &str,
    ///         passable: i64,
    ///         next: Next<'_, i64>,
    ///         args: &[String],
    ///     ) -> FlowResult<i64> {
    ///         match method {
    ///             "handle" | "process" => self.handle(passable, next, args),
    ///             other => Err(FlowError::invocation(self.name(), other)),
    ///         }
    ///     }
    /// }
    /// ```
    fn dispatch(
        &self,
        method: &str,
        passable: P,
        next: Next<'_, P, R>,
        args: &[String],
    ) -> FlowResult<R> {
        if method == DEFAULT_METHOD {
            self.handle(passable, next, args)
        } else {
            Err(FlowError::invocation(self.name(), method))
        }
    }
}

/// Continuation that invokes the remaining chain.
///
/// A `Next` is handed to every stage. Calling [`Next::run`] executes the next
/// stage (or the wrapped terminal handler if this stage is innermost-but-one)
/// with whatever passable the caller supplies. `Next` is `Copy`, so a stage
/// is free to delegate more than once, or not at all.
pub struct Next<'a, P, R = P> {
    link: &'a dyn Fn(P) -> FlowResult<R>,
}

impl<'a, P, R> Next<'a, P, R> {
    /// Creates a continuation over a chain link.
    pub(crate) fn new(link: &'a dyn Fn(P) -> FlowResult<R>) -> Self {
        Self { link }
    }

    /// Delegates to the remaining chain with the given passable.
    pub fn run(&self, passable: P) -> FlowResult<R> {
        (self.link)(passable)
    }
}

impl<P, R> Clone for Next<'_, P, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P, R> Copy for Next<'_, P, R> {}

impl<P, R> fmt::Debug for Next<'_, P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Next")
    }
}

/// A middleware created from a plain function or closure.
///
/// Unlike trait implementations, an `FnMiddleware` accepts **any** method
/// name in [`Middleware::dispatch`]: a resolved function is callable no
/// matter what the pipeline was configured `via`, so the method name is
/// irrelevant to it.
///
/// # Example
///
/// ```
/// use flowline::{FnMiddleware, Next};
///
/// let add_ten = FnMiddleware::new("add-ten", |x: i64, next: Next<'_, i64>, _args: &[String]| {
///     next.run(x + 10)
/// });
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F> {
    /// Creates a new function-based middleware.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<P, R, F> Middleware<P, R> for FnMiddleware<F>
where
    F: Fn(P, Next<'_, P, R>, &[String]) -> FlowResult<R> + Send + Sync,
    P: Send + Sync,
    R: Send + Sync,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn handle(&self, passable: P, next: Next<'_, P, R>, args: &[String]) -> FlowResult<R> {
        (self.func)(passable, next, args)
    }

    fn dispatch(
        &self,
        _method: &str,
        passable: P,
        next: Next<'_, P, R>,
        args: &[String],
    ) -> FlowResult<R> {
        self.handle(passable, next, args)
    }
}
