//! Exception boundaries.
//!
//! Both action flavors share one executor. They differ only in how a final
//! value is reported and what happens to a thrown error, which is what a
//! [`Boundary`] decides.

use std::sync::Arc;
use stepwise_core::{ActionError, BoxError};

/// Exception-handling policy of an action.
pub trait Boundary<Out>: Send + Sync + 'static {
    /// Success type returned to the caller.
    type Value: Send + 'static;
    /// Error type returned to the caller.
    type Error: Send + 'static;

    /// Report a value produced by the terminal handler or a short-circuit.
    fn settle(&self, value: Out) -> Result<Self::Value, Self::Error>;

    /// Handle an error thrown by any step.
    fn recover(&self, error: BoxError) -> Result<Self::Value, Self::Error>;
}

type RethrowFn<Out> = dyn Fn(BoxError) -> Result<Out, ActionError> + Send + Sync;

/// Boundary of throwing actions.
///
/// Values are returned as `Ok`. By default a thrown error is wrapped in
/// [`ActionError::Unhandled`] and returned as `Err`. A custom handler may
/// recover with `Ok`, or return its own `Err` to the caller.
pub struct Rethrow<Out> {
    handler: Option<Arc<RethrowFn<Out>>>,
}

impl<Out> Rethrow<Out> {
    /// The default boundary: wrap and rethrow.
    pub fn new() -> Self {
        Self { handler: None }
    }

    /// A boundary running `handler` on every thrown error.
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(BoxError) -> Result<Out, ActionError> + Send + Sync + 'static,
    {
        Self {
            handler: Some(Arc::new(handler)),
        }
    }
}

impl<Out> Default for Rethrow<Out> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Out> Clone for Rethrow<Out> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
        }
    }
}

impl<Out: Send + 'static> Boundary<Out> for Rethrow<Out> {
    type Value = Out;
    type Error = ActionError;

    fn settle(&self, value: Out) -> Result<Out, ActionError> {
        Ok(value)
    }

    fn recover(&self, error: BoxError) -> Result<Out, ActionError> {
        match &self.handler {
            Some(handler) => handler(error),
            None => Err(ActionError::Unhandled { source: error }),
        }
    }
}

type SettleFn<T, E> = dyn Fn(BoxError) -> Result<T, E> + Send + Sync;

/// Boundary of result-returning actions.
///
/// The pipeline output already is a `Result<T, E>` and is returned as is.
/// By default a thrown error becomes `Err(E::from(ActionError::Unhandled))`,
/// so nothing escapes as anything but a value.
pub struct Settle<T, E> {
    handler: Option<Arc<SettleFn<T, E>>>,
}

impl<T, E> Settle<T, E> {
    /// The default boundary: convert the thrown error into `E`.
    pub fn new() -> Self {
        Self { handler: None }
    }

    /// A boundary running `handler` on every thrown error.
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(BoxError) -> Result<T, E> + Send + Sync + 'static,
    {
        Self {
            handler: Some(Arc::new(handler)),
        }
    }
}

impl<T, E> Default for Settle<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Clone for Settle<T, E> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
        }
    }
}

impl<T, E> Boundary<Result<T, E>> for Settle<T, E>
where
    T: Send + 'static,
    E: From<ActionError> + Send + 'static,
{
    type Value = T;
    type Error = E;

    fn settle(&self, value: Result<T, E>) -> Result<T, E> {
        value
    }

    fn recover(&self, error: BoxError) -> Result<T, E> {
        match &self.handler {
            Some(handler) => handler(error),
            None => Err(E::from(ActionError::Unhandled { source: error })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rethrow_default_wraps() {
        let boundary = Rethrow::<u8>::new();
        assert_eq!(boundary.settle(3).unwrap(), 3);

        let err = boundary.recover("boom".into()).unwrap_err();
        assert!(err.is_unhandled());
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_rethrow_custom_recovers() {
        let boundary = Rethrow::with_handler(|err: BoxError| Ok(err.to_string().len()));
        assert_eq!(boundary.recover("four".into()).unwrap(), 4);
    }

    #[test]
    fn test_settle_default_converts() {
        let boundary = Settle::<u8, ActionError>::new();
        assert!(matches!(boundary.settle(Ok(1)), Ok(1)));

        let err = boundary.recover("bad".into()).unwrap_err();
        assert_eq!(err.to_string(), "bad");
    }
}
