//! # stepwise-core
//!
//! Core primitives for the Stepwise action pipeline.
//!
//! This crate has minimal dependencies and is meant to be imported by crates
//! that ship reusable middleware without depending on the executor in
//! `stepwise-std`.
//!
//! # Building Blocks
//!
//! An *action* runs an ordered list of middleware and then one terminal
//! handler, threading a shared [`Context`] through them.
//!
//! ## Steps ([`Middleware`], [`AsyncMiddleware`])
//!
//! Each middleware receives a [`Request`] (input plus the context so far) and
//! answers with a [`Control`]:
//!
//! - [`Control::Next`] carries a context patch and lets the action continue
//! - [`Control::Stop`] ends the action early with a final value
//!
//! Returning an error stops the action too, but routes it through the
//! exception boundary.
//!
//! ## Terminal ([`Handler`], [`AsyncHandler`])
//!
//! Runs once every middleware continued and produces the output.
//!
//! ## Progress ([`Progress`], [`Mode`])
//!
//! Driving a pipeline yields a [`Progress`]: ready when no step suspended,
//! pending otherwise. The [`Mode`] markers ([`SyncMode`], [`AsyncMode`])
//! record at build time whether a pipeline can suspend at all.
//!
//! # Error Types
//!
//! - [`BoxError`] - The value a failing step throws
//! - [`ActionError`] - Returned by throwing actions
//! - [`StepError`] - Panics and timeouts raised on a step's behalf

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod context;
mod control;
mod error;
mod message;
mod middleware;
mod progress;

// Re-exports
pub use context::{Context, Request};
pub use control::{Control, IntoControl, next};
pub use error::{ActionError, BoxError, StepError};
pub use message::Message;
pub use middleware::{
    AsyncHandler, AsyncMiddleware, DynAsyncHandler, DynAsyncMiddleware, Handler, Middleware,
    StepFuture,
};
pub use progress::{AsyncMode, Mode, Progress, SyncMode, pipe};
