//! Testing utilities for Stepwise.
//!
//! This module provides utilities to make testing actions and steps easier.
//!
//! # Features
//!
//! - [`ExecutionLog`]: A shared, ordered record of which steps ran
//! - [`RecordingStep`]: A step that writes its name into an [`ExecutionLog`]
//! - [`FailingStep`]: A step that always throws
//! - [`CountingHandler`]: A terminal handler that counts invocations

use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicUsize, Ordering},
};
use stepwise_core::{
    AsyncMiddleware, BoxError, Context, Control, Handler, Message, Middleware, Request,
};

// ============================================================================
// Execution Log
// ============================================================================

/// A shared, ordered list of entries written by steps under test.
///
/// # Example
///
/// ```rust,ignore
/// let log = ExecutionLog::new();
///
/// let action = ActionBuilder::<(), ()>::new()
///     .with(RecordingStep::new("mw1", &log))
///     .with(RecordingStep::new("mw2", &log))
///     .handler(|_| Ok(()));
///
/// action.call(()).unwrap();
/// assert_eq!(log.entries(), ["mw1", "mw2"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExecutionLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl ExecutionLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&self, entry: impl Into<String>) {
        self.lock().push(entry.into());
    }

    /// Get a clone of the recorded entries.
    pub fn entries(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Get the number of recorded entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Clear all recorded entries.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        // A panicking step under test must not hide what was recorded.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ============================================================================
// Recording Step
// ============================================================================

/// A step that records its name and continues.
///
/// Optionally contributes a context patch, which makes it useful for
/// checking merge order.
#[derive(Debug, Clone)]
pub struct RecordingStep {
    name: String,
    log: ExecutionLog,
    patch: Context,
}

impl RecordingStep {
    /// Create a recording step writing to `log`.
    pub fn new(name: impl Into<String>, log: &ExecutionLog) -> Self {
        Self {
            name: name.into(),
            log: log.clone(),
            patch: Context::new(),
        }
    }

    /// Continue with `patch` instead of an empty patch.
    pub fn with_patch(mut self, patch: Context) -> Self {
        self.patch = patch;
        self
    }
}

impl<In: Message, Out> Middleware<In, Out> for RecordingStep {
    fn handle(&self, _request: &Request<In>) -> Result<Control<Out>, BoxError> {
        self.log.push(self.name.clone());
        Ok(Control::next_with(self.patch.clone()))
    }
}

impl<In: Message, Out: Send> AsyncMiddleware<In, Out> for RecordingStep {
    async fn handle(&self, _request: Request<In>) -> Result<Control<Out>, BoxError> {
        self.log.push(self.name.clone());
        Ok(Control::next_with(self.patch.clone()))
    }
}

// ============================================================================
// Failing Step
// ============================================================================

/// A step that always throws an error with the given message.
#[derive(Debug, Clone)]
pub struct FailingStep {
    message: String,
    log: Option<(String, ExecutionLog)>,
}

impl FailingStep {
    /// Create a failing step.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            log: None,
        }
    }

    /// Also record `name` into `log` before failing.
    pub fn recorded(mut self, name: impl Into<String>, log: &ExecutionLog) -> Self {
        self.log = Some((name.into(), log.clone()));
        self
    }

    fn fail<Out>(&self) -> Result<Control<Out>, BoxError> {
        if let Some((name, log)) = &self.log {
            log.push(name.clone());
        }
        Err(self.message.clone().into())
    }
}

impl<In: Message, Out> Middleware<In, Out> for FailingStep {
    fn handle(&self, _request: &Request<In>) -> Result<Control<Out>, BoxError> {
        self.fail()
    }
}

impl<In: Message, Out: Send> AsyncMiddleware<In, Out> for FailingStep {
    async fn handle(&self, _request: Request<In>) -> Result<Control<Out>, BoxError> {
        self.fail()
    }
}

// ============================================================================
// Counting Handler
// ============================================================================

/// A terminal handler that counts invocations and returns the new count.
///
/// # Example
///
/// ```rust,ignore
/// let counter = CountingHandler::new();
///
/// let action = ActionBuilder::<(), usize>::new().terminal(counter.clone());
/// action.call(()).unwrap();
///
/// assert_eq!(counter.count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CountingHandler {
    count: Arc<AtomicUsize>,
}

impl CountingHandler {
    /// Create a new counting handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current count.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset the counter.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

impl<In: Message> Handler<In, usize> for CountingHandler {
    fn call(&self, _request: Request<In>) -> Result<usize, BoxError> {
        Ok(self.count.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_step_logs_and_patches() {
        let log = ExecutionLog::new();
        let step = RecordingStep::new("mw1", &log).with_patch(Context::new().with("k", 1_u8));

        let outcome: Control<()> = Middleware::handle(&step, &Request::new(())).unwrap();

        assert_eq!(log.entries(), ["mw1"]);
        assert!(matches!(outcome, Control::Next(ref p) if p.get::<u8>("k") == Some(&1)));
    }

    #[test]
    fn test_failing_step() {
        let log = ExecutionLog::new();
        let step = FailingStep::new("boom").recorded("mw2", &log);

        let err = Middleware::<(), ()>::handle(&step, &Request::new(())).unwrap_err();

        assert_eq!(err.to_string(), "boom");
        assert_eq!(log.entries(), ["mw2"]);
    }

    #[test]
    fn test_counting_handler() {
        let counter = CountingHandler::new();
        assert_eq!(Handler::call(&counter, Request::new(())).unwrap(), 1);
        assert_eq!(Handler::call(&counter, Request::new(())).unwrap(), 2);
        assert_eq!(counter.count(), 2);

        counter.reset();
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn test_log_clear() {
        let log = ExecutionLog::new();
        log.push("a");
        assert_eq!(log.len(), 1);
        log.clear();
        assert!(log.is_empty());
    }
}
