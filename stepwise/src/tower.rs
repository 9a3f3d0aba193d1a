//! Tower integration for stepwise.
//!
//! Wraps an [`Action`] as a tower [`Service`], so it can sit behind tower
//! middleware (timeouts, rate limiting, load shedding, ...).
//!
//! # Example
//!
//! ```rust,ignore
//! use stepwise::tower::into_service;
//! use tower::ServiceExt;
//!
//! let service = into_service(create_user);
//! let id = service.oneshot(new_user).await?;
//! ```

use crate::{Action, Boundary, Message, Mode, Progress, Rethrow, SyncMode};
use std::{
    fmt,
    future::IntoFuture,
    task::{Context, Poll},
};
use tower::Service;

/// Wraps an [`Action`] as a tower `Service`.
///
/// The response is the action's output and the error is its boundary's
/// error, so a throwing action answers `Result<Out, ActionError>` and a safe
/// action `Result<Result<T, E>, E>`. The service is always ready.
pub struct ActionService<In: Message, Out: 'static, B = Rethrow<Out>, M = SyncMode> {
    action: Action<In, Out, B, M>,
}

impl<In: Message, Out: 'static, B, M> ActionService<In, Out, B, M> {
    /// Create a new `ActionService` wrapping the given action.
    pub fn new(action: Action<In, Out, B, M>) -> Self {
        Self { action }
    }

    /// Get a reference to the inner action.
    pub fn inner(&self) -> &Action<In, Out, B, M> {
        &self.action
    }

    /// Unwrap the inner action.
    pub fn into_inner(self) -> Action<In, Out, B, M> {
        self.action
    }
}

impl<In: Message, Out: 'static, B, M> Clone for ActionService<In, Out, B, M> {
    fn clone(&self) -> Self {
        Self {
            action: self.action.clone(),
        }
    }
}

impl<In: Message, Out: 'static, B, M: Mode> fmt::Debug for ActionService<In, Out, B, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ActionService").field(&self.action).finish()
    }
}

impl<In, Out, B, M> Service<In> for ActionService<In, Out, B, M>
where
    In: Message + Clone,
    Out: Send + 'static,
    B: Boundary<Out>,
    M: Mode,
{
    type Response = B::Value;
    type Error = B::Error;
    type Future = <Progress<Result<B::Value, B::Error>> as IntoFuture>::IntoFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // Actions hold no per-call resources
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, input: In) -> Self::Future {
        self.action.run(input).into_future()
    }
}

/// Convert an action into a tower Service.
pub fn into_service<In, Out, B, M>(action: Action<In, Out, B, M>) -> ActionService<In, Out, B, M>
where
    In: Message,
    Out: 'static,
{
    ActionService::new(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ActionBuilder, ActionError, BoxError, Control, Request};

    #[tokio::test]
    async fn test_sync_action_as_service() {
        let action = ActionBuilder::<i32, i32>::new().handler(|req| Ok(req.input * 2));
        let mut service = into_service(action);

        assert_eq!(service.call(21).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_async_action_as_service() {
        let action = ActionBuilder::<i32, i32>::new()
            .step_async(|req: Request<i32>| async move {
                if req.input < 0 {
                    Control::stop(0)
                } else {
                    Control::next()
                }
            })
            .handler_async(|req| async move { Ok::<_, BoxError>(req.input + 1) });
        let mut service = into_service(action);

        assert_eq!(service.call(-5).await.unwrap(), 0);
        assert_eq!(service.call(1).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_service_error_is_boundary_error() {
        let action = ActionBuilder::<(), ()>::new().handler(|_| Err("nope".into()));
        let mut service = into_service(action);

        let err: ActionError = service.call(()).await.unwrap_err();
        assert!(err.is_unhandled());
        assert_eq!(err.to_string(), "nope");
    }
}
