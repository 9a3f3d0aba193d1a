use super::{
    Action,
    boundary::{Boundary, Rethrow, Settle},
    executor::{Pipeline, Step, Terminal},
};
use std::{future::Future, marker::PhantomData, sync::Arc};
use stepwise_core::{
    ActionError, AsyncHandler, AsyncMiddleware, AsyncMode, BoxError, Handler, IntoControl,
    Message, Middleware, Mode, Request, SyncMode,
};

/// Fluent construction of an [`Action`].
///
/// Every method takes `&self` and returns a new builder, so a partially
/// built pipeline can be reused as a common prefix:
///
/// ```rust,ignore
/// let authed = ActionBuilder::<Req, Res>::new().step(authenticate);
///
/// let read = authed.handler(read_item);
/// let write = authed.step(require_admin).handler(write_item);
/// ```
///
/// The `M` parameter tracks whether any asynchronous step was added. Builders
/// start in [`SyncMode`]; `step_async`, `with_async` and `handler_async` move
/// them to [`AsyncMode`].
///
/// Inputs must be `Clone`: an asynchronous step owns its request, so it gets
/// a copy of the input. Synchronous steps and terminal handlers never clone
/// it.
pub struct ActionBuilder<In: Message, Out: 'static, B = Rethrow<Out>, M = SyncMode> {
    name: &'static str,
    steps: Vec<Step<In, Out>>,
    boundary: B,
    catch_panics: bool,
    _mode: PhantomData<fn() -> M>,
}

impl<In: Message, Out: 'static> ActionBuilder<In, Out, Rethrow<Out>, SyncMode> {
    /// Start a throwing action: failures come back as [`ActionError`].
    pub fn new() -> Self {
        Self::with_boundary(Rethrow::new())
    }
}

impl<In: Message, Out: 'static> Default for ActionBuilder<In, Out, Rethrow<Out>, SyncMode> {
    fn default() -> Self {
        Self::new()
    }
}

impl<In, T, E> ActionBuilder<In, Result<T, E>, Settle<T, E>, SyncMode>
where
    In: Message,
    T: Send + 'static,
    E: From<ActionError> + Send + 'static,
{
    /// Start a result-returning action: every outcome, including thrown
    /// errors, comes back as `Result<T, E>`.
    ///
    /// `E` must be buildable from [`ActionError`], which is what the default
    /// boundary hands it for unrecovered errors.
    pub fn safe() -> Self {
        Self::with_boundary(Settle::new())
    }
}

impl<In: Message, Out: 'static, B> ActionBuilder<In, Out, B, SyncMode> {
    /// Start an action with a custom exception boundary.
    pub fn with_boundary(boundary: B) -> Self {
        Self {
            name: "action",
            steps: Vec::new(),
            boundary,
            catch_panics: true,
            _mode: PhantomData,
        }
    }
}

impl<In: Message, Out: 'static, B: Clone, M> Clone for ActionBuilder<In, Out, B, M> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            steps: self.steps.clone(),
            boundary: self.boundary.clone(),
            catch_panics: self.catch_panics,
            _mode: PhantomData,
        }
    }
}

impl<In, Out, B, M> ActionBuilder<In, Out, B, M>
where
    In: Message + Clone,
    Out: Send + 'static,
    B: Boundary<Out> + Clone,
    M: Mode,
{
    /// Label the action in log output.
    pub fn named(&self, name: &'static str) -> Self {
        let mut next = self.clone();
        next.name = name;
        next
    }

    /// Whether panics inside steps are routed to the exception boundary
    /// (the default) or left to unwind into the caller.
    pub fn catch_panics(&self, enabled: bool) -> Self {
        let mut next = self.clone();
        next.catch_panics = enabled;
        next
    }

    /// Append a synchronous middleware closure.
    pub fn step<F, R>(&self, f: F) -> Self
    where
        F: Fn(&Request<In>) -> R + Send + Sync + 'static,
        R: IntoControl<Out>,
    {
        self.with(f)
    }

    /// Append a synchronous middleware.
    pub fn with<S>(&self, step: S) -> Self
    where
        S: Middleware<In, Out>,
    {
        let mut next = self.clone();
        next.steps.push(Step::Sync(Arc::new(step)));
        next
    }

    /// Append an asynchronous middleware closure.
    pub fn step_async<F, Fut, R>(&self, f: F) -> ActionBuilder<In, Out, B, AsyncMode>
    where
        F: Fn(Request<In>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send,
        R: IntoControl<Out>,
    {
        self.with_async(f)
    }

    /// Append an asynchronous middleware.
    pub fn with_async<S>(&self, step: S) -> ActionBuilder<In, Out, B, AsyncMode>
    where
        S: AsyncMiddleware<In, Out>,
    {
        let mut next = self.to_mode::<AsyncMode>();
        next.steps.push(Step::Async(Arc::new(step)));
        next
    }

    /// Finish with a synchronous terminal closure.
    pub fn handler<F>(&self, f: F) -> Action<In, Out, B, M>
    where
        F: Fn(Request<In>) -> Result<Out, BoxError> + Send + Sync + 'static,
    {
        self.terminal(f)
    }

    /// Finish with a synchronous terminal handler.
    pub fn terminal<H>(&self, handler: H) -> Action<In, Out, B, M>
    where
        H: Handler<In, Out>,
    {
        self.build(Terminal::Sync(Arc::new(handler)))
    }

    /// Finish with an asynchronous terminal closure.
    pub fn handler_async<F, Fut>(&self, f: F) -> Action<In, Out, B, AsyncMode>
    where
        F: Fn(Request<In>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Out, BoxError>> + Send,
    {
        self.terminal_async(f)
    }

    /// Finish with an asynchronous terminal handler.
    pub fn terminal_async<H>(&self, handler: H) -> Action<In, Out, B, AsyncMode>
    where
        H: AsyncHandler<In, Out>,
    {
        self.to_mode::<AsyncMode>()
            .build(Terminal::Async(Arc::new(handler)))
    }

    /// Number of middleware added so far.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether no middleware has been added.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    fn to_mode<N: Mode>(&self) -> ActionBuilder<In, Out, B, N> {
        ActionBuilder {
            name: self.name,
            steps: self.steps.clone(),
            boundary: self.boundary.clone(),
            catch_panics: self.catch_panics,
            _mode: PhantomData,
        }
    }

    fn build(&self, terminal: Terminal<In, Out>) -> Action<In, Out, B, M> {
        Action::from_pipeline(Pipeline {
            name: self.name,
            steps: self.steps.clone(),
            terminal,
            boundary: self.boundary.clone(),
            catch_panics: self.catch_panics,
        })
    }
}

impl<In, Out, M> ActionBuilder<In, Out, Rethrow<Out>, M>
where
    In: Message + Clone,
    Out: Send + 'static,
    M: Mode,
{
    /// Handle thrown errors with `handler` instead of rethrowing them.
    ///
    /// Returning `Ok` recovers with a value; returning `Err` hands that error
    /// to the caller.
    pub fn catch<F>(&self, handler: F) -> Self
    where
        F: Fn(BoxError) -> Result<Out, ActionError> + Send + Sync + 'static,
    {
        let mut next = self.clone();
        next.boundary = Rethrow::with_handler(handler);
        next
    }
}

impl<In, T, E, M> ActionBuilder<In, Result<T, E>, Settle<T, E>, M>
where
    In: Message + Clone,
    T: Send + 'static,
    E: From<ActionError> + Send + 'static,
    M: Mode,
{
    /// Handle thrown errors with `handler` instead of converting them.
    pub fn catch<F>(&self, handler: F) -> Self
    where
        F: Fn(BoxError) -> Result<T, E> + Send + Sync + 'static,
    {
        let mut next = self.clone();
        next.boundary = Settle::with_handler(handler);
        next
    }
}
