//! The pipeline: configuration, chain composition, and execution.
//!
//! [`Pipeline`] holds the passable, the ordered stage list, the invocation
//! method name, and an optional resolver. [`Pipeline::run`] folds the stage
//! list around the terminal handler into a single chain and calls it:
//!
//! ```text
//! passable → stage[0] → stage[1] → ... → stage[n-1] → destination
//!                                                          ↓
//! result   ← stage[0] ← stage[1] ← ... ← stage[n-1] ←──────┘
//! ```
//!
//! Composition and execution are distinct phases: the fold builds nested
//! links without running any stage code, then the outermost link is invoked
//! with the passable and execution unwinds depth-first to the destination
//! and back.
//!
//! Two seams are replaceable independently of the fold: the strategy that
//! invokes a stage ([`Invoker`]) and the wrap around the terminal handler
//! ([`Pipeline::wrap_destination`]).

use crate::error::{FlowError, FlowResult};
use crate::middleware::{Next, DEFAULT_METHOD};
use crate::resolver::Resolver;
use crate::stage::Stage;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// One link of a composed chain.
type ChainLink<'a, P, R> = Box<dyn Fn(P) -> FlowResult<R> + 'a>;

/// The wrap applied to the terminal handler before composition.
pub type DestinationWrap<P, R> =
    Arc<dyn for<'a> Fn(P, &'a (dyn Fn(P) -> FlowResult<R>)) -> FlowResult<R> + Send + Sync>;

/// Strategy for invoking a single stage.
///
/// The default strategy, [`DefaultInvoker`], calls closures positionally and
/// dispatches keyed stages through the resolver. Specialized pipelines that
/// need to treat descriptors differently inject their own implementation via
/// [`Pipeline::with_invoker`] without touching the composition fold.
pub trait Invoker<P, R = P>: Send + Sync {
    /// Invokes `stage` with the passable and the remaining chain.
    fn invoke(
        &self,
        pipeline: &Pipeline<P, R>,
        stage: &Stage<P, R>,
        passable: P,
        next: Next<'_, P, R>,
    ) -> FlowResult<R>;
}

/// The standard stage-invocation strategy.
///
/// - Closure stages are called with `(passable, next)` and their result is
///   returned verbatim.
/// - Keyed stages are resolved when the chain reaches them — not eagerly at
///   composition — so stages earlier in the list run before an unresolvable
///   key surfaces. The resolved middleware is dispatched through the
///   pipeline's configured method name with the descriptor's extra
///   arguments.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultInvoker;

impl<P, R> Invoker<P, R> for DefaultInvoker {
    fn invoke(
        &self,
        pipeline: &Pipeline<P, R>,
        stage: &Stage<P, R>,
        passable: P,
        next: Next<'_, P, R>,
    ) -> FlowResult<R> {
        match stage {
            Stage::Closure(func) => {
                trace!("invoking closure stage");
                (func.as_ref())(passable, next)
            }
            Stage::Keyed { key, args } => {
                let resolver = pipeline.resolver().ok_or_else(|| {
                    FlowError::configuration(format!(
                        "keyed stage `{key}` requires a resolver; \
                         construct the pipeline with `Pipeline::with_resolver`"
                    ))
                })?;
                let middleware = resolver
                    .resolve(key)
                    .ok_or_else(|| FlowError::resolution(key))?;
                trace!(
                    key = %key,
                    middleware = middleware.name(),
                    method = pipeline.method(),
                    "invoking keyed stage"
                );
                middleware.dispatch(pipeline.method(), passable, next, args)
            }
        }
    }
}

/// A configurable interceptor pipeline.
///
/// # Example
///
/// ```
/// use flowline::{Pipeline, Stage};
///
/// let result = Pipeline::new()
///     .send(5_i64)
///     .through([
///         Stage::closure(|x, next| next.run(x * 2)),
///         Stage::closure(|x, next| next.run(x + 10)),
///     ])
///     .run(|x| Ok(x))
///     .unwrap();
///
/// assert_eq!(result, 20);
/// ```
///
/// Configuration methods take and return `self`, so a pipeline is built in
/// one expression and then `run` one or more times; each `run` composes a
/// fresh chain from the current configuration.
pub struct Pipeline<P, R = P> {
    passable: Option<P>,
    stages: Vec<Stage<P, R>>,
    method: String,
    resolver: Option<Arc<dyn Resolver<P, R>>>,
    invoker: Arc<dyn Invoker<P, R>>,
    destination_wrap: Option<DestinationWrap<P, R>>,
}

impl<P, R> Pipeline<P, R> {
    /// Creates a pipeline with no resolver.
    ///
    /// Closure stages work as usual; reaching a keyed stage fails with
    /// [`FlowError::Configuration`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            passable: None,
            stages: Vec::new(),
            method: DEFAULT_METHOD.to_string(),
            resolver: None,
            invoker: Arc::new(DefaultInvoker),
            destination_wrap: None,
        }
    }

    /// Creates a pipeline that resolves keyed stages through `resolver`.
    #[must_use]
    pub fn with_resolver(resolver: Arc<dyn Resolver<P, R>>) -> Self {
        let mut pipeline = Self::new();
        pipeline.resolver = Some(resolver);
        pipeline
    }

    /// Sets the value threaded through the pipeline.
    #[must_use]
    pub fn send(mut self, passable: P) -> Self {
        self.passable = Some(passable);
        self
    }

    /// Sets the ordered stage list, replacing any previous configuration.
    ///
    /// Accepts anything convertible into stages, so string descriptors and
    /// `(key, args)` pairs work directly:
    ///
    /// ```
    /// use flowline::Pipeline;
    ///
    /// let pipeline: Pipeline<i64> = Pipeline::new()
    ///     .through(["Logger", "RateLimit?10:60"]);
    /// assert_eq!(pipeline.stage_count(), 2);
    /// ```
    ///
    /// An empty list is valid: `run` then degenerates to calling the
    /// destination directly.
    #[must_use]
    pub fn through<I, S>(mut self, stages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Stage<P, R>>,
    {
        self.stages = stages.into_iter().map(Into::into).collect();
        self
    }

    /// Appends a single stage to the configured list.
    #[must_use]
    pub fn through_stage(mut self, stage: impl Into<Stage<P, R>>) -> Self {
        self.stages.push(stage.into());
        self
    }

    /// Sets the method name used to dispatch keyed stages.
    ///
    /// Defaults to [`DEFAULT_METHOD`]. Closure stages are always invoked
    /// positionally and ignore this.
    #[must_use]
    pub fn via(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Replaces the stage-invocation strategy.
    #[must_use]
    pub fn with_invoker(mut self, invoker: Arc<dyn Invoker<P, R>>) -> Self {
        self.invoker = invoker;
        self
    }

    /// Replaces the identity wrap around the terminal handler.
    ///
    /// The wrap receives the passable and the destination and decides how
    /// (or whether) to call it — the seam for pipelines that need to adapt
    /// the terminal call, e.g. to inject a fixed return shape.
    #[must_use]
    pub fn wrap_destination<F>(mut self, wrap: F) -> Self
    where
        F: for<'a> Fn(P, &'a (dyn Fn(P) -> FlowResult<R>)) -> FlowResult<R>
            + Send
            + Sync
            + 'static,
    {
        self.destination_wrap = Some(Arc::new(wrap));
        self
    }

    /// Returns the configured invocation method name.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the injected resolver, if any.
    #[must_use]
    pub fn resolver(&self) -> Option<&dyn Resolver<P, R>> {
        self.resolver.as_deref()
    }

    /// Returns the number of configured stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Composes the chain and executes it, returning the terminal value.
    ///
    /// The stage list is folded last-to-first so the first configured stage
    /// sits outermost and therefore runs first. No stage code executes
    /// during the fold; everything happens when the outermost link is called
    /// with the passable, synchronously and depth-first.
    ///
    /// # Errors
    ///
    /// - [`FlowError::Configuration`] if no passable was `send`
    /// - whatever the stages, resolver, or destination produce, unchanged
    pub fn run<F>(&self, destination: F) -> FlowResult<R>
    where
        P: Clone,
        F: Fn(P) -> FlowResult<R>,
    {
        let passable = self.passable.clone().ok_or_else(|| {
            FlowError::configuration("no passable value; call `send` before `run`")
        })?;

        debug!(
            stages = self.stages.len(),
            method = %self.method,
            "composing pipeline chain"
        );

        let innermost: ChainLink<'_, P, R> = match self.destination_wrap.as_ref() {
            Some(wrap) => {
                let wrap = Arc::clone(wrap);
                Box::new(move |passable: P| (wrap.as_ref())(passable, &destination))
            }
            None => Box::new(move |passable: P| destination(passable)),
        };

        let mut chain = innermost;
        for stage in self.stages.iter().rev() {
            let next = chain;
            chain = Box::new(move |passable: P| {
                self.invoker
                    .invoke(self, stage, passable, Next::new(next.as_ref()))
            });
        }

        chain(passable)
    }
}

impl<P, R> Default for Pipeline<P, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, R> fmt::Debug for Pipeline<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stages)
            .field("method", &self.method)
            .field("has_resolver", &self.resolver.is_some())
            .field("has_destination_wrap", &self.destination_wrap.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pipeline_calls_destination_directly() {
        let result = Pipeline::new()
            .send(5_i64)
            .through(Vec::<Stage<i64>>::new())
            .run(|x| Ok(x + 1))
            .unwrap();
        assert_eq!(result, 6);
    }

    #[test]
    fn test_run_without_send_is_a_configuration_error() {
        let pipeline: Pipeline<i64> = Pipeline::new();
        let err = pipeline.run(Ok).unwrap_err();
        assert!(matches!(err, FlowError::Configuration { .. }));
    }

    #[test]
    fn test_first_configured_stage_runs_first() {
        let result = Pipeline::new()
            .send("x".to_string())
            .through([
                Stage::closure(|s: String, next: Next<'_, String>| next.run(s + "a")),
                Stage::closure(|s: String, next: Next<'_, String>| next.run(s + "b")),
            ])
            .run(Ok)
            .unwrap();
        assert_eq!(result, "xab");
    }

    #[test]
    fn test_through_replaces_previous_stages() {
        let pipeline = Pipeline::new()
            .send(1_i64)
            .through([Stage::closure(|x, next| next.run(x + 1))])
            .through([Stage::closure(|x, next| next.run(x * 10))]);

        assert_eq!(pipeline.stage_count(), 1);
        assert_eq!(pipeline.run(Ok).unwrap(), 10);
    }

    #[test]
    fn test_through_stage_appends() {
        let pipeline = Pipeline::new()
            .send(1_i64)
            .through([Stage::closure(|x, next| next.run(x + 1))])
            .through_stage(Stage::closure(|x, next| next.run(x * 10)));

        assert_eq!(pipeline.stage_count(), 2);
        assert_eq!(pipeline.run(Ok).unwrap(), 20);
    }

    #[test]
    fn test_default_method_is_handle() {
        let pipeline: Pipeline<i64> = Pipeline::new();
        assert_eq!(pipeline.method(), DEFAULT_METHOD);
    }

    #[test]
    fn test_via_overrides_method() {
        let pipeline: Pipeline<i64> = Pipeline::new().via("process");
        assert_eq!(pipeline.method(), "process");
    }

    #[test]
    fn test_keyed_stage_without_resolver_fails() {
        let err = Pipeline::<i64>::new()
            .send(1)
            .through(["Logger"])
            .run(Ok)
            .unwrap_err();
        assert!(matches!(err, FlowError::Configuration { .. }));
        assert!(err.to_string().contains("Logger"));
    }

    #[test]
    fn test_debug_output() {
        let pipeline: Pipeline<i64> = Pipeline::new().through(["Logger"]);
        let debug = format!("{pipeline:?}");
        assert!(debug.contains("Pipeline"));
        assert!(debug.contains("Logger"));
    }
}
