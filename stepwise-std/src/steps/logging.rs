//! Logging step for observing requests as they pass through an action.

use std::fmt::Debug;
use stepwise_core::{AsyncMiddleware, BoxError, Control, Message, Middleware, Request};

/// A step that logs the request and continues.
///
/// Uses the `tracing` crate when the `tracing` feature is enabled, and does
/// nothing otherwise.
///
/// # Example
///
/// ```rust,ignore
/// let action = ActionBuilder::new()
///     .with(LoggingStep::named("checkout"))
///     .step(validate_cart)
///     .handler(place_order);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LoggingStep {
    name: &'static str,
}

impl LoggingStep {
    /// Create a new `LoggingStep` with a default name.
    pub fn new() -> Self {
        Self { name: "request" }
    }

    /// Create a new `LoggingStep` with a custom name.
    ///
    /// The name is used in log messages to identify the pipeline stage.
    pub fn named(name: &'static str) -> Self {
        Self { name }
    }

    /// The name used in log messages.
    pub fn name(&self) -> &'static str {
        self.name
    }

    fn log<In: Debug>(&self, request: &Request<In>) {
        #[cfg(feature = "tracing")]
        {
            tracing::debug!(
                name = %self.name,
                input = ?request.input,
                context = ?request.context,
                "Processing request"
            );
        }

        #[cfg(not(feature = "tracing"))]
        {
            let _ = (self.name, request);
        }
    }
}

impl Default for LoggingStep {
    fn default() -> Self {
        Self::new()
    }
}

impl<In, Out> Middleware<In, Out> for LoggingStep
where
    In: Message + Debug,
{
    fn handle(&self, request: &Request<In>) -> Result<Control<Out>, BoxError> {
        self.log(request);
        Ok(Control::next())
    }
}

impl<In, Out> AsyncMiddleware<In, Out> for LoggingStep
where
    In: Message + Debug,
    Out: Send,
{
    async fn handle(&self, request: Request<In>) -> Result<Control<Out>, BoxError> {
        self.log(&request);
        Ok(Control::next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug)]
    struct TestInput {
        #[allow(dead_code)]
        data: String,
    }

    #[test]
    fn test_logging_step_continues() {
        let step = LoggingStep::new();
        let request = Request::new(TestInput {
            data: "test".into(),
        });

        let outcome: Control<()> = Middleware::handle(&step, &request).unwrap();
        assert!(outcome.is_next());
    }

    #[tokio::test]
    async fn test_logging_step_named_async() {
        let step = LoggingStep::named("my_pipeline");
        assert_eq!(step.name(), "my_pipeline");

        let request = Request::new(TestInput {
            data: "test".into(),
        });

        let outcome: Control<()> = AsyncMiddleware::handle(&step, request).await.unwrap();
        assert!(outcome.is_next());
    }
}
