//! Timeout step - time-limited asynchronous middleware.
//!
//! **Note**: This module requires the `tokio` runtime (feature `timeout`).

use std::time::Duration;
use stepwise_core::{AsyncMiddleware, BoxError, Control, Message, Request, StepError};
use tokio::time::timeout;

/// A step that wraps an asynchronous step with a timeout.
///
/// If the inner step does not settle within the duration, it is dropped and
/// the step fails with [`StepError::Timeout`], which reaches the action's
/// exception boundary like any other error.
///
/// # Example
///
/// ```rust,ignore
/// let action = ActionBuilder::new()
///     .with_async(TimeoutStep::millis(load_profile, 250))
///     .handler(render);
/// ```
pub struct TimeoutStep<S> {
    inner: S,
    duration: Duration,
}

impl<S> TimeoutStep<S> {
    /// Create a new `TimeoutStep` wrapping the given step.
    pub fn new(inner: S, duration: Duration) -> Self {
        Self { inner, duration }
    }

    /// Create a `TimeoutStep` with the timeout specified in seconds.
    pub fn secs(inner: S, seconds: u64) -> Self {
        Self::new(inner, Duration::from_secs(seconds))
    }

    /// Create a `TimeoutStep` with the timeout specified in milliseconds.
    pub fn millis(inner: S, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }

    /// Get the configured timeout duration.
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl<In, Out, S> AsyncMiddleware<In, Out> for TimeoutStep<S>
where
    In: Message,
    Out: Send,
    S: AsyncMiddleware<In, Out>,
{
    async fn handle(&self, request: Request<In>) -> Result<Control<Out>, BoxError> {
        match timeout(self.duration, self.inner.handle(request)).await {
            Ok(result) => result,
            Err(_) => Err(Box::new(StepError::Timeout(self.duration))),
        }
    }
}
