//! Error types for Stepwise.
//!
//! - [`BoxError`] - The value a failing step "throws"
//! - [`ActionError`] - What a throwing action returns to its caller
//! - [`StepError`] - Failures raised by the framework on a step's behalf

use std::{any::Any, time::Duration};
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error returned by an action whose exception boundary did not recover.
#[derive(Error, Debug)]
pub enum ActionError {
    /// A step failed and the default boundary rethrew it.
    ///
    /// Displays exactly as the original error; the original is available
    /// through [`std::error::Error::source`].
    #[error("{source}")]
    Unhandled {
        /// The error the step returned.
        #[source]
        source: BoxError,
    },

    /// An error raised by a custom exception handler.
    #[error(transparent)]
    Custom(BoxError),
}

impl ActionError {
    /// Wrap a step failure the way the default boundary does.
    pub fn unhandled(source: impl Into<BoxError>) -> Self {
        ActionError::Unhandled {
            source: source.into(),
        }
    }

    /// Create a custom error, typically from an exception handler.
    pub fn custom(error: impl Into<BoxError>) -> Self {
        ActionError::Custom(error.into())
    }

    /// Whether this error is a rethrown step failure.
    pub fn is_unhandled(&self) -> bool {
        matches!(self, ActionError::Unhandled { .. })
    }

    /// Borrow the wrapped error.
    pub fn inner(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        match self {
            ActionError::Unhandled { source } => source.as_ref(),
            ActionError::Custom(error) => error.as_ref(),
        }
    }

    /// Take the wrapped error.
    pub fn into_inner(self) -> BoxError {
        match self {
            ActionError::Unhandled { source } => source,
            ActionError::Custom(error) => error,
        }
    }
}

/// Failures the framework raises on a step's behalf.
///
/// These reach the exception boundary as a [`BoxError`] like any other
/// failure, so handlers can downcast to tell them apart.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    /// The step panicked.
    #[error("step panicked: {0}")]
    Panic(String),

    /// The step did not settle in time.
    #[error("step timed out after {0:?}")]
    Timeout(Duration),
}

impl StepError {
    /// Build a [`StepError::Panic`] from a caught panic payload.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(message) => *message,
            Err(payload) => match payload.downcast::<&'static str>() {
                Ok(message) => (*message).to_string(),
                Err(_) => "unknown panic payload".to_string(),
            },
        };
        StepError::Panic(message)
    }
}

impl From<BoxError> for ActionError {
    fn from(err: BoxError) -> Self {
        ActionError::Custom(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_unhandled_keeps_message_and_source() {
        let err = ActionError::unhandled("boom");

        assert_eq!(err.to_string(), "boom");
        assert!(err.is_unhandled());
        assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("boom"));
    }

    #[test]
    fn test_custom_is_transparent() {
        let err = ActionError::custom("fatal");
        assert_eq!(err.to_string(), "fatal");
        assert!(!err.is_unhandled());
    }

    #[test]
    fn test_into_inner_downcasts() {
        let err = ActionError::unhandled(StepError::Timeout(Duration::from_millis(5)));
        let inner = err.into_inner();
        assert_eq!(
            inner.downcast_ref::<StepError>(),
            Some(&StepError::Timeout(Duration::from_millis(5)))
        );
    }

    #[test]
    fn test_panic_payloads() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let borrowed: Box<dyn Any + Send> = Box::new("static");
        let other: Box<dyn Any + Send> = Box::new(7_u8);

        assert_eq!(StepError::from_panic(owned), StepError::Panic("owned".into()));
        assert_eq!(StepError::from_panic(borrowed), StepError::Panic("static".into()));
        assert_eq!(
            StepError::from_panic(other),
            StepError::Panic("unknown panic payload".into())
        );
    }
}
