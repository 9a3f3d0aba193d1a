//! # Actions
//!
//! An [`Action`] is an assembled pipeline: middleware in declaration order,
//! then one terminal handler, all sharing a per-invocation context.
//!
//! ```rust,ignore
//! let create = ActionBuilder::<NewUser, UserId>::new()
//!     .named("create_user")
//!     .step(validate)
//!     .step_async(load_account)
//!     .handler_async(insert_user);
//!
//! let id = create.call(new_user).await?;
//! ```
//!
//! # Flavors
//!
//! - **Throwing** ([`ActionBuilder::new`]): `call` returns
//!   `Result<Out, ActionError>`. A failing step is wrapped in
//!   [`ActionError::Unhandled`] unless a handler set with `catch` recovers.
//! - **Safe** ([`ActionBuilder::safe`]): the pipeline produces a
//!   `Result<T, E>` and thrown errors are converted into `E`.
//!
//! # Sync and Async
//!
//! An action built only from synchronous steps is called synchronously. As
//! soon as one asynchronous step is added, `call` returns a future on every
//! invocation. [`Action::run`] exposes the underlying ready-or-pending
//! result in both modes.
//!
//! [`ActionError`]: stepwise_core::ActionError
//! [`ActionError::Unhandled`]: stepwise_core::ActionError::Unhandled

mod boundary;
mod builder;
mod executor;

pub use boundary::{Boundary, Rethrow, Settle};
pub use builder::ActionBuilder;

use executor::Pipeline;
use std::{
    fmt,
    future::{Future, IntoFuture},
    marker::PhantomData,
    sync::Arc,
};
use stepwise_core::{AsyncMode, Message, Mode, Progress, SyncMode};

/// A built, callable pipeline.
///
/// Cheap to clone; clones share the same steps. Every invocation gets its
/// own context, so an action can be called concurrently.
pub struct Action<In: Message, Out: 'static, B = Rethrow<Out>, M = SyncMode> {
    pipeline: Arc<Pipeline<In, Out, B>>,
    _mode: PhantomData<fn() -> M>,
}

impl<In, Out, B, M> Action<In, Out, B, M>
where
    In: Message + Clone,
    Out: Send + 'static,
    B: Boundary<Out>,
    M: Mode,
{
    pub(crate) fn from_pipeline(pipeline: Pipeline<In, Out, B>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            _mode: PhantomData,
        }
    }

    /// Run one invocation.
    ///
    /// The result is ready if no step suspended, whatever the mode.
    pub fn run(&self, input: In) -> Progress<Result<B::Value, B::Error>> {
        Pipeline::run(&self.pipeline, input)
    }

    /// The name given with [`ActionBuilder::named`].
    pub fn name(&self) -> &'static str {
        self.pipeline.name
    }

    /// Number of middleware before the terminal handler.
    pub fn len(&self) -> usize {
        self.pipeline.steps.len()
    }

    /// Whether the terminal handler runs directly.
    pub fn is_empty(&self) -> bool {
        self.pipeline.steps.is_empty()
    }

    /// Whether `call` returns a future.
    pub fn is_async(&self) -> bool {
        M::ASYNC
    }
}

impl<In, Out, B> Action<In, Out, B, SyncMode>
where
    In: Message + Clone,
    Out: Send + 'static,
    B: Boundary<Out>,
{
    /// Run one invocation to completion.
    pub fn call(&self, input: In) -> Result<B::Value, B::Error> {
        self.run(input).wait()
    }
}

impl<In, Out, B> Action<In, Out, B, AsyncMode>
where
    In: Message + Clone,
    Out: Send + 'static,
    B: Boundary<Out>,
{
    /// Run one invocation; always returns a future, even when no step
    /// actually suspended.
    pub fn call(
        &self,
        input: In,
    ) -> impl Future<Output = Result<B::Value, B::Error>> + Send + use<In, Out, B> {
        self.run(input).into_future()
    }
}

impl<In: Message, Out: 'static, B, M> Clone for Action<In, Out, B, M> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            _mode: PhantomData,
        }
    }
}

impl<In: Message, Out: 'static, B, M: Mode> fmt::Debug for Action<In, Out, B, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.pipeline.name)
            .field("steps", &self.pipeline.steps.len())
            .field("async", &M::ASYNC)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use stepwise_core::{ActionError, BoxError, Context, Control, Request, StepError};

    #[derive(Debug)]
    struct Tracked {
        clones: Arc<AtomicUsize>,
    }

    impl Clone for Tracked {
        fn clone(&self) -> Self {
            self.clones.fetch_add(1, Ordering::SeqCst);
            Self {
                clones: Arc::clone(&self.clones),
            }
        }
    }

    #[test]
    fn test_sync_action_stays_ready() {
        let action = ActionBuilder::<u32, u32>::new()
            .step(|r: &Request<u32>| Control::next_with(Context::new().with("n", r.input)))
            .handler(|r| Ok(r.context.get::<u32>("n").copied().unwrap_or(0) + 1));

        let progress = action.run(1);
        assert!(progress.is_ready());
        assert_eq!(progress.now().map(Result::unwrap), Some(2));
        assert_eq!(
            format!("{action:?}"),
            r#"Action { name: "action", steps: 1, async: false }"#
        );
    }

    #[test]
    fn test_step_async_switches_mode() {
        let sync = ActionBuilder::<u32, u32>::new().named("mixed");
        let asynchronous = sync.step_async(|_: Request<u32>| async { Control::next() });

        assert!(!sync.handler(|r| Ok(r.input)).is_async());
        assert!(asynchronous.handler(|r| Ok(r.input)).is_async());

        let terminal =
            sync.terminal_async(|r: Request<u32>| async move { Ok::<_, BoxError>(r.input) });
        assert!(terminal.is_async());
    }

    #[tokio::test]
    async fn test_async_step_suspends_at_first_async_step() {
        let action = ActionBuilder::<u32, u32>::new()
            .step(|r: &Request<u32>| {
                if r.input == 0 {
                    Control::stop(0)
                } else {
                    Control::next()
                }
            })
            .step_async(|r: Request<u32>| async move { Control::stop(r.input * 10) })
            .handler(|_| Ok(1));

        assert!(action.run(0).is_ready());

        let pending = action.run(3);
        assert!(!pending.is_ready());
        assert_eq!(pending.await.unwrap(), 30);
    }

    #[tokio::test]
    async fn test_panic_in_async_step_is_captured() {
        let action = ActionBuilder::<u32, u32>::new()
            .step_async(|r: Request<u32>| {
                assert!(r.input > 0, "zero input");
                async { Control::next() }
            })
            .handler(|r| Ok(r.input));

        let err: ActionError = action.call(0).await.unwrap_err();
        assert_eq!(
            err.into_inner().downcast_ref::<StepError>(),
            Some(&StepError::Panic("zero input".into()))
        );
    }

    #[tokio::test]
    async fn test_async_call_future_outlives_borrow() {
        let action = ActionBuilder::<u32, u32>::new()
            .step_async(|r: Request<u32>| async move { Control::stop(r.input + 1) })
            .handler(|_| Ok(0));

        let start = move |n: u32| action.call(n);
        let first = tokio::spawn(start(1));
        let second = tokio::spawn(start(2));

        assert_eq!(first.await.unwrap().unwrap(), 2);
        assert_eq!(second.await.unwrap().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_input_cloned_only_for_async_steps() {
        let clones = Arc::new(AtomicUsize::new(0));
        let input = || Tracked {
            clones: Arc::clone(&clones),
        };

        let sync = ActionBuilder::<Tracked, usize>::new()
            .step(|_: &Request<Tracked>| Control::next())
            .handler(|r| Ok(r.input.clones.load(Ordering::SeqCst)));
        assert_eq!(sync.call(input()).unwrap(), 0);

        let mixed = ActionBuilder::<Tracked, usize>::new()
            .step(|_: &Request<Tracked>| Control::next())
            .step_async(|_: Request<Tracked>| async { Control::next() })
            .handler(|r| Ok(r.input.clones.load(Ordering::SeqCst)));
        assert_eq!(mixed.call(input()).await.unwrap(), 1);
    }

    #[derive(Debug, PartialEq)]
    enum Rejected {
        Negative,
        Failed(String),
    }

    impl From<ActionError> for Rejected {
        fn from(err: ActionError) -> Self {
            Rejected::Failed(err.to_string())
        }
    }

    #[test]
    fn test_safe_builder_with_convertible_error() {
        let action = ActionBuilder::<i32, Result<i32, Rejected>, Settle<i32, Rejected>>::safe()
            .step(|r: &Request<i32>| {
                if r.input < 0 {
                    Control::fail(Rejected::Negative)
                } else {
                    Control::next()
                }
            })
            .handler(|r| {
                if r.input == 0 {
                    Err("zero".into())
                } else {
                    Ok(Ok(r.input))
                }
            });

        assert_eq!(action.call(4), Ok(4));
        assert_eq!(action.call(-1), Err(Rejected::Negative));
        assert_eq!(action.call(0), Err(Rejected::Failed("zero".into())));
    }
}
