//! Conditional steps - run middleware only for some requests.

use stepwise_core::{AsyncMiddleware, BoxError, Control, Message, Middleware, Request};

/// A step that runs its inner step only when a condition holds.
///
/// When the condition is `false` the action simply continues.
///
/// # Example
///
/// ```rust,ignore
/// // Only check quotas for free-tier accounts
/// let quota = when(|req: &Request<Upload>| req.input.tier == Tier::Free, check_quota);
///
/// let action = ActionBuilder::new().with(quota).handler(store_upload);
/// ```
pub struct When<C, S> {
    condition: C,
    inner: S,
}

impl<C, S> When<C, S> {
    /// Create a new `When`.
    pub fn new(condition: C, inner: S) -> Self {
        Self { condition, inner }
    }
}

/// Shorthand for [`When::new`].
pub fn when<C, S>(condition: C, inner: S) -> When<C, S> {
    When::new(condition, inner)
}

impl<In, Out, C, S> Middleware<In, Out> for When<C, S>
where
    In: Message,
    C: Fn(&Request<In>) -> bool + Send + Sync + 'static,
    S: Middleware<In, Out>,
{
    fn handle(&self, request: &Request<In>) -> Result<Control<Out>, BoxError> {
        if (self.condition)(request) {
            self.inner.handle(request)
        } else {
            Ok(Control::next())
        }
    }
}

impl<In, Out, C, S> AsyncMiddleware<In, Out> for When<C, S>
where
    In: Message,
    Out: Send,
    C: Fn(&Request<In>) -> bool + Send + Sync + 'static,
    S: AsyncMiddleware<In, Out>,
{
    async fn handle(&self, request: Request<In>) -> Result<Control<Out>, BoxError> {
        if (self.condition)(&request) {
            self.inner.handle(request).await
        } else {
            Ok(Control::next())
        }
    }
}

/// A step that runs one of two inner steps depending on a condition.
///
/// # Example
///
/// ```rust,ignore
/// let auth = Branch::new(
///     |req: &Request<Call>| req.input.token.is_some(),
///     verify_token,
///     reject_anonymous,
/// );
/// ```
pub struct Branch<C, T, E> {
    condition: C,
    then_step: T,
    else_step: E,
}

impl<C, T, E> Branch<C, T, E> {
    /// Create a new `Branch`.
    pub fn new(condition: C, then_step: T, else_step: E) -> Self {
        Self {
            condition,
            then_step,
            else_step,
        }
    }
}

impl<In, Out, C, T, E> Middleware<In, Out> for Branch<C, T, E>
where
    In: Message,
    C: Fn(&Request<In>) -> bool + Send + Sync + 'static,
    T: Middleware<In, Out>,
    E: Middleware<In, Out>,
{
    fn handle(&self, request: &Request<In>) -> Result<Control<Out>, BoxError> {
        if (self.condition)(request) {
            self.then_step.handle(request)
        } else {
            self.else_step.handle(request)
        }
    }
}

impl<In, Out, C, T, E> AsyncMiddleware<In, Out> for Branch<C, T, E>
where
    In: Message,
    Out: Send,
    C: Fn(&Request<In>) -> bool + Send + Sync + 'static,
    T: AsyncMiddleware<In, Out>,
    E: AsyncMiddleware<In, Out>,
{
    async fn handle(&self, request: Request<In>) -> Result<Control<Out>, BoxError> {
        if (self.condition)(&request) {
            self.then_step.handle(request).await
        } else {
            self.else_step.handle(request).await
        }
    }
}
