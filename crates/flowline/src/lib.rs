//! # Flowline
//!
//! A composable interceptor pipeline: send a value through an ordered list
//! of middleware stages wrapped around a terminal handler.
//!
//! ```text
//! passable → stage A → stage B → stage C → destination
//!                                               ↓
//! result   ← stage A ← stage B ← stage C ←──────┘
//! ```
//!
//! Each stage receives the passable and a [`Next`] continuation. It may
//! transform the passable before delegating, post-process the result after
//! delegating, or short-circuit the whole chain by returning without
//! delegating at all.
//!
//! ## Stage descriptors
//!
//! Stages come in two shapes:
//!
//! - **Closures** — `Stage::closure(|x, next| next.run(x * 2))`, invoked
//!   positionally.
//! - **Keys** — `"RateLimit?10:60"`, resolved against an injected
//!   [`Resolver`] when the chain reaches them; the resolved [`Middleware`]
//!   is dispatched through a configurable method name (default `"handle"`,
//!   overridable with [`Pipeline::via`]) with the `?`/`:`-encoded extra
//!   arguments.
//!
//! ## Example
//!
//! ```
//! use flowline::{Pipeline, Stage};
//!
//! let result = Pipeline::new()
//!     .send(5_i64)
//!     .through([
//!         Stage::closure(|x, next| next.run(x * 2)),
//!         Stage::closure(|x, next| next.run(x + 10)),
//!     ])
//!     .run(|x| Ok(x))
//!     .unwrap();
//!
//! assert_eq!(result, 20);
//! ```
//!
//! ## Extension seams
//!
//! Two steps of the composition are replaceable without touching the fold:
//! the stage-invocation strategy ([`Invoker`], injected with
//! [`Pipeline::with_invoker`]) and the wrap around the terminal handler
//! ([`Pipeline::wrap_destination`]).
//!
//! ## What flowline is not
//!
//! There is no scheduling, no retry, no concurrency between stages: a `run`
//! is one synchronous, depth-first pass whose stack depth is the stage count
//! plus one. Errors raised inside stages travel to the caller unchanged.

#![doc(html_root_url = "https://docs.rs/flowline/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod middleware;
pub mod pipeline;
pub mod resolver;
pub mod stage;

pub use error::{FlowError, FlowResult};
pub use middleware::{FnMiddleware, Middleware, Next, DEFAULT_METHOD};
pub use pipeline::{DefaultInvoker, DestinationWrap, Invoker, Pipeline};
pub use resolver::{Registry, Resolver};
pub use stage::{CallableStage, Stage, PARAM_DELIMITER, PARAM_MARKER};
