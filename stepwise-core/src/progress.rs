//! Ready-or-pending results.
//!
//! Running an action or a flow never suspends unless one of its steps does.
//! [`Progress`] captures that: it is `Ready` when every step finished
//! synchronously, and `Pending` once a step handed back a future. Either way
//! it can be awaited.

use futures::future::{self, BoxFuture, Either};
use std::{fmt, future::Future, future::IntoFuture};

/// The runtime result of driving a pipeline.
pub enum Progress<T> {
    /// Every step finished synchronously.
    Ready(T),
    /// A step suspended; the rest of the work lives in this future.
    Pending(BoxFuture<'static, T>),
}

impl<T: Send + 'static> Progress<T> {
    /// Wrap a future as pending progress.
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Progress::Pending(Box::pin(future))
    }

    /// Whether the value is already available.
    pub fn is_ready(&self) -> bool {
        matches!(self, Progress::Ready(_))
    }

    /// The value if no step suspended.
    pub fn now(self) -> Option<T> {
        match self {
            Progress::Ready(value) => Some(value),
            Progress::Pending(_) => None,
        }
    }

    /// Get the value, blocking the current thread on pending work.
    ///
    /// Only used by synchronous pipelines, where every step is synchronous
    /// and the progress is always ready.
    pub fn wait(self) -> T {
        match self {
            Progress::Ready(value) => value,
            Progress::Pending(future) => futures::executor::block_on(future),
        }
    }

    /// Apply a synchronous transform, staying ready if nothing suspended.
    pub fn map<U, F>(self, f: F) -> Progress<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        match self {
            Progress::Ready(value) => Progress::Ready(f(value)),
            Progress::Pending(future) => Progress::pending(async move { f(future.await) }),
        }
    }

    /// Apply an asynchronous transform; the result is always pending.
    pub fn then<U, F, Fut>(self, f: F) -> Progress<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Fut + Send + 'static,
        Fut: Future<Output = U> + Send + 'static,
    {
        Progress::pending(async move { f(self.await).await })
    }

    /// Continue with another ready-or-pending computation.
    pub fn chain<U, F>(self, f: F) -> Progress<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Progress<U> + Send + 'static,
    {
        match self {
            Progress::Ready(value) => f(value),
            Progress::Pending(future) => Progress::pending(async move { f(future.await).await }),
        }
    }
}

impl<T> IntoFuture for Progress<T> {
    type Output = T;
    type IntoFuture = Either<future::Ready<T>, BoxFuture<'static, T>>;

    fn into_future(self) -> Self::IntoFuture {
        match self {
            Progress::Ready(value) => Either::Left(future::ready(value)),
            Progress::Pending(future) => Either::Right(future),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Progress<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Progress::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Progress::Pending(_) => f.write_str("Pending"),
        }
    }
}

/// Starts immediate, in-order application of transforms to `value`.
///
/// ```rust,ignore
/// let total = pipe(2).map(|n| n + 1).then(fetch_price).map(|p| p * 3).await;
/// ```
pub fn pipe<T>(value: T) -> Progress<T> {
    Progress::Ready(value)
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::SyncMode {}
    impl Sealed for super::AsyncMode {}
}

/// Type-level marker telling whether an assembled pipeline may suspend.
///
/// Decided while building: adding any asynchronous step moves a builder to
/// [`AsyncMode`], and there is no way back.
pub trait Mode: sealed::Sealed + Send + Sync + 'static {
    /// Whether pipelines in this mode return futures.
    const ASYNC: bool;
}

/// Every step is synchronous; calling returns the output directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncMode;

/// At least one step is asynchronous; calling always returns a future.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsyncMode;

impl Mode for SyncMode {
    const ASYNC: bool = false;
}

impl Mode for AsyncMode {
    const ASYNC: bool = true;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_stays_ready_through_map() {
        let progress = pipe(2).map(|n| n + 1).map(|n| n * 10);
        assert!(progress.is_ready());
        assert_eq!(progress.now(), Some(30));
    }

    #[test]
    fn test_then_is_pending() {
        let progress = pipe(2).then(|n| async move { n + 1 });
        assert!(!progress.is_ready());
        assert_eq!(progress.wait(), 3);
    }

    #[tokio::test]
    async fn test_pending_awaits_in_order() {
        let progress = pipe(String::from("a"))
            .map(|s| s + "b")
            .then(|s| async move {
                tokio::task::yield_now().await;
                s + "c"
            })
            .map(|s| s + "d");

        assert_eq!(format!("{progress:?}"), "Pending");
        assert_eq!(progress.await, "abcd");
    }

    #[tokio::test]
    async fn test_chain_keeps_fast_path() {
        let ready = pipe(1).chain(|n| Progress::Ready(n + 1));
        assert!(ready.is_ready());
        assert_eq!(ready.await, 2);

        let pending = pipe(1).chain(|n| Progress::pending(async move { n + 1 }));
        assert_eq!(pending.await, 2);
    }
}
