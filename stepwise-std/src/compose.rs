//! Function composition.
//!
//! [`flow`] builds a reusable chain of unary transforms; [`pipe`] applies
//! transforms to a value right away. In both, a chain becomes asynchronous
//! as soon as one transform is, and transforms always run in order: an
//! asynchronous transform finishes before the next one starts.
//!
//! ```rust,ignore
//! let slug = flow(|s: String| s.trim().to_lowercase()).then(|s| s.replace(' ', "-"));
//! assert_eq!(slug.call("  Hello World ".into()), "hello-world");
//!
//! let enrich = flow(parse_id).then_async(fetch_user).then(render);
//! let page = enrich.call(raw).await;
//! ```

use std::{
    fmt,
    future::{Future, IntoFuture},
    marker::PhantomData,
    sync::Arc,
};
use stepwise_core::{AsyncMode, Mode, Progress, SyncMode};

pub use stepwise_core::pipe;

type Run<A, B> = dyn Fn(A) -> Progress<B> + Send + Sync;

/// A reusable chain of transforms from `A` to `B`.
pub struct Flow<A, B, M = SyncMode> {
    run: Arc<Run<A, B>>,
    len: usize,
    _mode: PhantomData<fn() -> M>,
}

/// Start a flow with a synchronous transform.
pub fn flow<A, B, F>(f: F) -> Flow<A, B, SyncMode>
where
    A: Send + 'static,
    B: Send + 'static,
    F: Fn(A) -> B + Send + Sync + 'static,
{
    Flow {
        run: Arc::new(move |a| Progress::Ready(f(a))),
        len: 1,
        _mode: PhantomData,
    }
}

/// Start a flow with an asynchronous transform.
pub fn flow_async<A, B, F, Fut>(f: F) -> Flow<A, B, AsyncMode>
where
    A: Send + 'static,
    B: Send + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = B> + Send + 'static,
{
    Flow {
        run: Arc::new(move |a| Progress::pending(f(a))),
        len: 1,
        _mode: PhantomData,
    }
}

impl<A, B, M> Flow<A, B, M>
where
    A: Send + 'static,
    B: Send + 'static,
    M: Mode,
{
    /// Append a synchronous transform.
    pub fn then<C, F>(&self, f: F) -> Flow<A, C, M>
    where
        C: Send + 'static,
        F: Fn(B) -> C + Send + Sync + 'static,
    {
        let previous = Arc::clone(&self.run);
        let f = Arc::new(f);
        Flow {
            run: Arc::new(move |a| {
                let f = Arc::clone(&f);
                previous(a).map(move |b| f(b))
            }),
            len: self.len + 1,
            _mode: PhantomData,
        }
    }

    /// Append an asynchronous transform, making the whole flow asynchronous.
    pub fn then_async<C, F, Fut>(&self, f: F) -> Flow<A, C, AsyncMode>
    where
        C: Send + 'static,
        F: Fn(B) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = C> + Send + 'static,
    {
        let previous = Arc::clone(&self.run);
        let f = Arc::new(f);
        Flow {
            run: Arc::new(move |a| {
                let f = Arc::clone(&f);
                previous(a).then(move |b| f(b))
            }),
            len: self.len + 1,
            _mode: PhantomData,
        }
    }

    /// Apply the flow, staying ready if no transform suspended.
    pub fn run(&self, input: A) -> Progress<B> {
        (self.run)(input)
    }

    /// Number of transforms in the flow.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`: a flow starts with one transform.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<A, B> Flow<A, B, SyncMode>
where
    A: Send + 'static,
    B: Send + 'static,
{
    /// Apply the flow.
    pub fn call(&self, input: A) -> B {
        self.run(input).wait()
    }
}

impl<A, B> Flow<A, B, AsyncMode>
where
    A: Send + 'static,
    B: Send + 'static,
{
    /// Apply the flow; always returns a future.
    pub fn call(&self, input: A) -> impl Future<Output = B> + Send + use<A, B> {
        self.run(input).into_future()
    }
}

impl<A, B, M> Clone for Flow<A, B, M> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
            len: self.len,
            _mode: PhantomData,
        }
    }
}

impl<A, B, M: Mode> fmt::Debug for Flow<A, B, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flow")
            .field("len", &self.len)
            .field("async", &M::ASYNC)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_sync_flow_returns_plain_value() {
        let slug = flow(|s: String| s.trim().to_lowercase()).then(|s| s.replace(' ', "-"));

        assert_eq!(slug.len(), 2);
        assert!(slug.run("x".into()).is_ready());
        assert_eq!(slug.call("  Hello World ".into()), "hello-world");
    }

    #[tokio::test]
    async fn test_async_step_lifts_flow() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());

        let chain = flow(move |n: u32| {
            l1.lock().unwrap().push("double");
            n * 2
        })
        .then_async(move |n| {
            let log = l2.clone();
            async move {
                log.lock().unwrap().push("async-start");
                tokio::task::yield_now().await;
                log.lock().unwrap().push("async-end");
                n + 1
            }
        })
        .then(move |n| {
            l3.lock().unwrap().push("format");
            format!("#{n}")
        });

        assert_eq!(format!("{chain:?}"), "Flow { len: 3, async: true }");
        assert_eq!(chain.call(4).await, "#9");
        assert_eq!(
            *log.lock().unwrap(),
            vec!["double", "async-start", "async-end", "format"]
        );
    }

    #[tokio::test]
    async fn test_flow_async_start_and_reuse() {
        let base = flow_async(|n: i64| async move { n - 1 });
        let shown = base.then(|n| n.to_string());

        assert_eq!(base.call(10).await, 9);
        assert_eq!(shown.call(10).await, "9");
        assert!(!base.run(1).is_ready());
    }

    #[tokio::test]
    async fn test_pipe_applies_immediately() {
        let ready = pipe(3).map(|n| n * 2);
        assert_eq!(ready.now(), Some(6));

        let pending = pipe(3).then(|n| async move { n * 2 }).map(|n| n + 1);
        assert_eq!(pending.await, 7);
    }

    #[tokio::test]
    async fn test_async_flow_future_can_be_spawned() {
        let square = flow_async(|n: u64| async move { n * n });
        let outer = flow(|n: u64| n + 1).then_async(move |n| square.call(n));

        let handle = tokio::spawn(outer.call(2));
        assert_eq!(handle.await.unwrap(), 9);
    }
}
