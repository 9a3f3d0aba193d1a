//! # Middleware
//!
//! A middleware is one step of an action: it sees the input and the context
//! accumulated so far, then either continues (optionally enriching the
//! context) or stops the action with a final value. Returning an error, or
//! panicking, sends the action to its exception boundary instead.
//!
//! Synchronous steps implement [`Middleware`], asynchronous ones
//! [`AsyncMiddleware`]. Both are implemented for matching closures, so most
//! pipelines never name these traits.
//!
//! # Static vs Dynamic Dispatch
//!
//! [`AsyncMiddleware`] uses `async fn` in traits for zero-cost static
//! dispatch. Executors store steps as [`DynAsyncMiddleware`] trait objects.

use crate::{
    context::Request,
    control::{Control, IntoControl},
    error::BoxError,
    message::Message,
};
use std::{future::Future, pin::Pin};

/// A synchronous pipeline step.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a synchronous `Middleware<{In}, {Out}>`",
    label = "missing `Middleware` implementation",
    note = "Closures of the form `Fn(&Request<{In}>) -> Control<{Out}>` implement it automatically."
)]
pub trait Middleware<In: Message, Out>: Send + Sync + 'static {
    /// Run the step.
    fn handle(&self, request: &Request<In>) -> Result<Control<Out>, BoxError>;
}

impl<F, R, In, Out> Middleware<In, Out> for F
where
    In: Message,
    F: Fn(&Request<In>) -> R + Send + Sync + 'static,
    R: IntoControl<Out>,
{
    fn handle(&self, request: &Request<In>) -> Result<Control<Out>, BoxError> {
        (self)(request).into_control()
    }
}

/// An asynchronous pipeline step.
///
/// The request is passed by value so the returned future can own it.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `AsyncMiddleware<{In}, {Out}>`",
    label = "missing `AsyncMiddleware` implementation",
    note = "Closures of the form `Fn(Request<{In}>) -> impl Future<Output = Control<{Out}>>` implement it automatically."
)]
pub trait AsyncMiddleware<In: Message, Out>: Send + Sync + 'static {
    /// Run the step.
    fn handle(
        &self,
        request: Request<In>,
    ) -> impl Future<Output = Result<Control<Out>, BoxError>> + Send;
}

impl<F, Fut, R, In, Out> AsyncMiddleware<In, Out> for F
where
    In: Message,
    F: Fn(Request<In>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send,
    R: IntoControl<Out>,
{
    async fn handle(&self, request: Request<In>) -> Result<Control<Out>, BoxError> {
        (self)(request).await.into_control()
    }
}

/// Boxed future returned by dynamically dispatched steps.
pub type StepFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, BoxError>> + Send + 'a>>;

/// Dynamic object-safe version of [`AsyncMiddleware`].
pub trait DynAsyncMiddleware<In: Message, Out: 'static>: Send + Sync + 'static {
    /// Run the step (dynamic dispatch version).
    fn handle_dyn(&self, request: Request<In>) -> StepFuture<'_, Control<Out>>;
}

// Blanket implementation: any AsyncMiddleware is a DynAsyncMiddleware.
impl<In: Message, Out: 'static, T: AsyncMiddleware<In, Out>> DynAsyncMiddleware<In, Out> for T {
    fn handle_dyn(&self, request: Request<In>) -> StepFuture<'_, Control<Out>> {
        Box::pin(self.handle(request))
    }
}

/// The synchronous terminal step of an action.
///
/// Runs only when every middleware continued; its value becomes the output.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot terminate an action taking `{In}` and returning `{Out}`",
    label = "missing `Handler<{In}, {Out}>` implementation",
    note = "Closures of the form `Fn(Request<{In}>) -> Result<{Out}, E>` implement it automatically."
)]
pub trait Handler<In: Message, Out>: Send + Sync + 'static {
    /// Produce the action output.
    fn call(&self, request: Request<In>) -> Result<Out, BoxError>;
}

impl<F, In, Out, E> Handler<In, Out> for F
where
    In: Message,
    F: Fn(Request<In>) -> Result<Out, E> + Send + Sync + 'static,
    E: Into<BoxError>,
{
    fn call(&self, request: Request<In>) -> Result<Out, BoxError> {
        (self)(request).map_err(Into::into)
    }
}

/// The asynchronous terminal step of an action.
pub trait AsyncHandler<In: Message, Out>: Send + Sync + 'static {
    /// Produce the action output.
    fn call(&self, request: Request<In>) -> impl Future<Output = Result<Out, BoxError>> + Send;
}

impl<F, Fut, In, Out, E> AsyncHandler<In, Out> for F
where
    In: Message,
    F: Fn(Request<In>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Out, E>> + Send,
    E: Into<BoxError>,
{
    async fn call(&self, request: Request<In>) -> Result<Out, BoxError> {
        (self)(request).await.map_err(Into::into)
    }
}

/// Dynamic object-safe version of [`AsyncHandler`].
pub trait DynAsyncHandler<In: Message, Out: 'static>: Send + Sync + 'static {
    /// Produce the action output (dynamic dispatch version).
    fn call_dyn(&self, request: Request<In>) -> StepFuture<'_, Out>;
}

impl<In: Message, Out: 'static, T: AsyncHandler<In, Out>> DynAsyncHandler<In, Out> for T {
    fn call_dyn(&self, request: Request<In>) -> StepFuture<'_, Out> {
        Box::pin(self.call(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;

    struct Tagging;

    impl Middleware<u32, String> for Tagging {
        fn handle(&self, request: &Request<u32>) -> Result<Control<String>, BoxError> {
            if request.input == 0 {
                return Ok(Control::stop("zero".into()));
            }
            Ok(Control::next_with(Context::new().with("tag", request.input * 2)))
        }
    }

    #[test]
    fn test_struct_middleware() {
        let stop = Tagging.handle(&Request::new(0)).unwrap();
        assert!(matches!(stop, Control::Stop(ref s) if s == "zero"));

        let next = Tagging.handle(&Request::new(4)).unwrap();
        assert!(matches!(next, Control::Next(ref patch) if patch.get::<u32>("tag") == Some(&8)));
    }

    #[test]
    fn test_closure_middleware() {
        let step = |request: &Request<u32>| -> Control<u32> { Control::stop(request.input + 1) };
        let outcome = Middleware::<u32, u32>::handle(&step, &Request::new(1)).unwrap();
        assert!(matches!(outcome, Control::Stop(2)));
    }

    #[tokio::test]
    async fn test_async_closure_through_dyn() {
        let step = |request: Request<u32>| async move {
            if request.input > 10 {
                Err(std::io::Error::other("too big"))
            } else {
                Ok(Control::<u32>::next())
            }
        };
        let boxed: Box<dyn DynAsyncMiddleware<u32, u32>> = Box::new(step);

        assert!(boxed.handle_dyn(Request::new(1)).await.unwrap().is_next());
        let err = boxed.handle_dyn(Request::new(11)).await.unwrap_err();
        assert_eq!(err.to_string(), "too big");
    }

    #[tokio::test]
    async fn test_closure_handlers() {
        let sync = |request: Request<u32>| Ok::<_, BoxError>(request.input * 3);
        assert_eq!(Handler::call(&sync, Request::new(2)).unwrap(), 6);

        let async_handler = |request: Request<u32>| async move {
            Ok::<_, std::io::Error>(request.input.to_string())
        };
        let boxed: Box<dyn DynAsyncHandler<u32, String>> = Box::new(async_handler);
        assert_eq!(boxed.call_dyn(Request::new(5)).await.unwrap(), "5");
    }
}
