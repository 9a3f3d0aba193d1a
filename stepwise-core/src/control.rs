//! Step outcomes.
//!
//! A middleware either continues with a context patch or stops the action
//! with a final value. [`Control`] is that choice as a plain enum, so no
//! user value can be mistaken for a continuation.

use crate::{context::Context, error::BoxError};

/// What a middleware asks the action to do next.
#[derive(Debug, Clone)]
pub enum Control<Out> {
    /// Merge the patch into the context and run the next step.
    Next(Context),
    /// Stop the action now and return this value as its output.
    Stop(Out),
}

impl<Out> Control<Out> {
    /// Continue without touching the context.
    pub fn next() -> Self {
        Control::Next(Context::new())
    }

    /// Continue, merging `patch` into the context.
    pub fn next_with(patch: Context) -> Self {
        Control::Next(patch)
    }

    /// Stop the action with `value`.
    pub fn stop(value: Out) -> Self {
        Control::Stop(value)
    }

    /// Whether this is a continuation.
    pub fn is_next(&self) -> bool {
        matches!(self, Control::Next(_))
    }

    /// Whether this stops the action.
    pub fn is_stop(&self) -> bool {
        matches!(self, Control::Stop(_))
    }

    /// Map the stop value, leaving continuations untouched.
    pub fn map<U>(self, f: impl FnOnce(Out) -> U) -> Control<U> {
        match self {
            Control::Next(patch) => Control::Next(patch),
            Control::Stop(value) => Control::Stop(f(value)),
        }
    }
}

impl<T, E> Control<Result<T, E>> {
    /// Stop a result-returning action with a success.
    pub fn done(value: T) -> Self {
        Control::Stop(Ok(value))
    }

    /// Stop a result-returning action with an expected failure.
    pub fn fail(error: E) -> Self {
        Control::Stop(Err(error))
    }
}

/// Continue, merging `patch` into the context.
///
/// Shorthand for [`Control::next_with`].
pub fn next<Out>(patch: Context) -> Control<Out> {
    Control::Next(patch)
}

/// Trait for converting a middleware's return value into a [`Control`].
///
/// # Default Implementations
///
/// - `Control<Out>` → As is
/// - `Result<Control<Out>, E>` → `Ok` as is, `Err` becomes the thrown error
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be turned into a `Control<{Out}>`",
    label = "middleware must return `Control<{Out}>` or `Result<Control<{Out}>, E>`",
    note = "Continue with `Control::next()`, or stop with `Control::stop(value)`."
)]
pub trait IntoControl<Out> {
    /// Convert into a control decision or a thrown error.
    fn into_control(self) -> Result<Control<Out>, BoxError>;
}

impl<Out> IntoControl<Out> for Control<Out> {
    fn into_control(self) -> Result<Control<Out>, BoxError> {
        Ok(self)
    }
}

impl<Out, E> IntoControl<Out> for Result<Control<Out>, E>
where
    E: Into<BoxError>,
{
    fn into_control(self) -> Result<Control<Out>, BoxError> {
        self.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert!(Control::<()>::next().is_next());
        assert!(Control::stop("early").is_stop());
        assert!(matches!(
            next::<()>(Context::new().with("k", 1)),
            Control::Next(patch) if patch.get::<i32>("k") == Some(&1)
        ));
    }

    #[test]
    fn test_result_helpers() {
        let done: Control<Result<u8, String>> = Control::done(1);
        let fail: Control<Result<u8, String>> = Control::fail("nope".into());

        assert!(matches!(done, Control::Stop(Ok(1))));
        assert!(matches!(fail, Control::Stop(Err(ref e)) if e == "nope"));
    }

    #[test]
    fn test_into_control_from_result() {
        let ok: Result<Control<u8>, std::io::Error> = Ok(Control::stop(3));
        assert!(matches!(ok.into_control(), Ok(Control::Stop(3))));

        let err: Result<Control<u8>, std::io::Error> =
            Err(std::io::Error::other("disk on fire"));
        let thrown = err.into_control().unwrap_err();
        assert_eq!(thrown.to_string(), "disk on fire");
    }

    #[test]
    fn test_map_only_touches_stop() {
        assert!(matches!(Control::stop(2).map(|v| v * 10), Control::Stop(20)));
        assert!(Control::<i32>::next().map(|v| v * 10).is_next());
    }
}
