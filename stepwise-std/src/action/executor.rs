//! The stepping loop shared by every action.
//!
//! Steps run strictly in declaration order. As long as every step answers
//! synchronously the loop stays on the caller's stack and produces
//! [`Progress::Ready`]; at the first step that returns a future the rest of
//! the invocation moves into a boxed future, which awaits each remaining
//! step before starting the next.

use super::boundary::Boundary;
use futures::FutureExt;
use std::{
    future::Future,
    ops::ControlFlow,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};
use stepwise_core::{
    BoxError, Control, DynAsyncHandler, DynAsyncMiddleware, Handler, Message, Middleware,
    Progress, Request, StepError,
};

/// A type-erased middleware.
pub(crate) enum Step<In: Message, Out: 'static> {
    Sync(Arc<dyn Middleware<In, Out>>),
    Async(Arc<dyn DynAsyncMiddleware<In, Out>>),
}

impl<In: Message, Out: 'static> Clone for Step<In, Out> {
    fn clone(&self) -> Self {
        match self {
            Step::Sync(step) => Step::Sync(Arc::clone(step)),
            Step::Async(step) => Step::Async(Arc::clone(step)),
        }
    }
}

/// A type-erased terminal handler.
pub(crate) enum Terminal<In: Message, Out: 'static> {
    Sync(Arc<dyn Handler<In, Out>>),
    Async(Arc<dyn DynAsyncHandler<In, Out>>),
}

/// Output of a pipeline whose boundary is `B`.
pub(crate) type Outcome<Out, B> =
    Result<<B as Boundary<Out>>::Value, <B as Boundary<Out>>::Error>;

/// An assembled, immutable pipeline.
pub(crate) struct Pipeline<In: Message, Out: 'static, B> {
    pub(crate) name: &'static str,
    pub(crate) steps: Vec<Step<In, Out>>,
    pub(crate) terminal: Terminal<In, Out>,
    pub(crate) boundary: B,
    pub(crate) catch_panics: bool,
}

impl<In, Out, B> Pipeline<In, Out, B>
where
    In: Message + Clone,
    Out: Send + 'static,
    B: Boundary<Out>,
{
    /// Run one invocation, staying synchronous for as long as possible.
    pub(crate) fn run(this: &Arc<Self>, input: In) -> Progress<Outcome<Out, B>> {
        let mut request = Request::new(input);

        for (index, step) in this.steps.iter().enumerate() {
            let outcome = match step {
                Step::Sync(step) => this.guard(|| step.handle(&request)),
                Step::Async(_) => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(action = this.name, step = index, "suspending");
                    return Progress::pending(Arc::clone(this).resume(request, index));
                }
            };
            if let ControlFlow::Break(output) = this.advance(index, &mut request, outcome) {
                return Progress::Ready(output);
            }
        }

        match &this.terminal {
            Terminal::Sync(handler) => {
                let outcome = this.guard(|| handler.call(request));
                Progress::Ready(this.finish(outcome))
            }
            Terminal::Async(_) => {
                Progress::pending(Arc::clone(this).resume(request, this.steps.len()))
            }
        }
    }

    /// Continue an invocation from step `start`, awaiting every step.
    async fn resume(self: Arc<Self>, mut request: Request<In>, start: usize) -> Outcome<Out, B> {
        for (index, step) in self.steps.iter().enumerate().skip(start) {
            let outcome = match step {
                Step::Sync(step) => self.guard(|| step.handle(&request)),
                Step::Async(step) => {
                    let pending = request.clone();
                    self.guard_async(|| step.handle_dyn(pending)).await
                }
            };
            if let ControlFlow::Break(output) = self.advance(index, &mut request, outcome) {
                return output;
            }
        }

        let outcome = match &self.terminal {
            Terminal::Sync(handler) => self.guard(|| handler.call(request)),
            Terminal::Async(handler) => self.guard_async(|| handler.call_dyn(request)).await,
        };
        self.finish(outcome)
    }

    /// Apply one middleware outcome to the request.
    fn advance(
        &self,
        index: usize,
        request: &mut Request<In>,
        outcome: Result<Control<Out>, BoxError>,
    ) -> ControlFlow<Outcome<Out, B>> {
        match outcome {
            Ok(Control::Next(patch)) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(action = self.name, step = index, keys = patch.len(), "next");
                request.context.merge(patch);
                ControlFlow::Continue(())
            }
            Ok(Control::Stop(value)) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(action = self.name, step = index, "short-circuit");
                ControlFlow::Break(self.boundary.settle(value))
            }
            Err(error) => {
                #[cfg(not(feature = "tracing"))]
                let _ = index;
                #[cfg(feature = "tracing")]
                tracing::warn!(action = self.name, step = index, %error, "step failed");
                ControlFlow::Break(self.boundary.recover(error))
            }
        }
    }

    /// Report the terminal handler's outcome.
    fn finish(&self, outcome: Result<Out, BoxError>) -> Outcome<Out, B> {
        match outcome {
            Ok(value) => self.boundary.settle(value),
            Err(error) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(action = self.name, %error, "handler failed");
                self.boundary.recover(error)
            }
        }
    }

    /// Call a synchronous step, turning a panic into a thrown error.
    fn guard<T>(&self, call: impl FnOnce() -> Result<T, BoxError>) -> Result<T, BoxError> {
        if !self.catch_panics {
            return call();
        }
        panic::catch_unwind(AssertUnwindSafe(call))
            .unwrap_or_else(|payload| Err(StepError::from_panic(payload).into()))
    }

    /// Start and await an asynchronous step, turning a panic into a thrown
    /// error whether it happens while creating or while polling the future.
    async fn guard_async<T, F>(&self, start: impl FnOnce() -> F) -> Result<T, BoxError>
    where
        F: Future<Output = Result<T, BoxError>> + Send,
    {
        if !self.catch_panics {
            return start().await;
        }
        let future = match panic::catch_unwind(AssertUnwindSafe(start)) {
            Ok(future) => future,
            Err(payload) => return Err(StepError::from_panic(payload).into()),
        };
        AssertUnwindSafe(future)
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(StepError::from_panic(payload).into()))
    }
}
