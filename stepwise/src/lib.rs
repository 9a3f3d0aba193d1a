//! # stepwise - Ordered Middleware Pipelines
//!
//! `stepwise` runs a list of middleware in declaration order, threading a
//! shared context through them, and finishes with a terminal handler. Any
//! middleware can enrich the context, stop the action early with a value, or
//! throw, in which case the action's exception boundary decides the output.
//!
//! Pipelines built only from synchronous steps run synchronously. Adding an
//! asynchronous step makes the whole action asynchronous, decided once at
//! build time.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepwise::prelude::*;
//!
//! let greet = action::<String, String>()
//!     .step(|req: &Request<String>| next(Context::new().with("greeting", "hello")))
//!     .handler(|req| {
//!         let greeting = req.context.get::<&str>("greeting").copied().unwrap_or("hi");
//!         Ok(format!("{greeting}, {}", req.input))
//!     });
//!
//! assert_eq!(greet.call("ada".into())?, "hello, ada");
//! ```
//!
//! ## Features
//!
//! - `tracing` (default): step-level logging through `tracing`
//! - `timeout`: [`steps::TimeoutStep`], backed by `tokio::time`
//! - `tower`: expose an action as a `tower::Service`

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use stepwise_core::{
    // Errors
    ActionError,
    // Middleware
    AsyncHandler,
    AsyncMiddleware,
    // Progress / Modes
    AsyncMode,
    BoxError,
    // Context
    Context,
    // Control
    Control,
    DynAsyncHandler,
    DynAsyncMiddleware,
    Handler,
    IntoControl,
    // Message
    Message,
    Middleware,
    Mode,
    Progress,
    Request,
    StepError,
    StepFuture,
    SyncMode,
    next,
};

// Actions
pub use stepwise_std::action::{Action, ActionBuilder, Boundary, Rethrow, Settle};

// Composition
pub use stepwise_std::compose::{Flow, flow, flow_async, pipe};

#[cfg(feature = "tower")]
pub mod tower;

/// Start a throwing action; shorthand for [`ActionBuilder::new`].
pub fn action<In: Message, Out: 'static>() -> ActionBuilder<In, Out> {
    ActionBuilder::new()
}

/// Start a result-returning action; shorthand for [`ActionBuilder::safe`].
pub fn safe_action<In, T, E>() -> ActionBuilder<In, Result<T, E>, Settle<T, E>>
where
    In: Message,
    T: Send + 'static,
    E: From<ActionError> + Send + 'static,
{
    ActionBuilder::safe()
}

/// Standard middleware implementations.
pub mod steps {
    #![allow(clippy::wildcard_imports)]
    pub use stepwise_std::steps::*;
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use stepwise_std::testing::*;
}

/// Prelude module - common imports for Stepwise.
///
/// # Usage
///
/// ```rust,ignore
/// use stepwise::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Actions
        Action,
        ActionBuilder,
        ActionError,
        // Core traits
        AsyncMiddleware,
        // Errors
        BoxError,
        Context,
        Control,
        Handler,
        Middleware,
        Progress,
        Request,
        // Shorthands
        action,
        flow,
        next,
        pipe,
        safe_action,
    };
}
