//! Fetch coordinator
//!
//! Work is executed on a tokio runtime; async work on its worker threads,
//! blocking work on its (unbounded) blocking pool. Each request resolves
//! exactly once, either through its `PendingFetch` future or through the
//! completion callback, which runs on the worker that finished the request.
//!
//! Debounced requests are keyed. A new submission for a key cancels the
//! queued one for that key and restarts the quiet period; the cancelled
//! request resolves with `UsageError::Superseded`. Once the quiet period
//! has elapsed the request is claimed and runs to completion even if newer
//! submissions arrive, which then start a new burst.

use crate::config::FetchConfig;
use dashmap::DashMap;
use netusage_common::{UsageError, UsageResult};
use std::future::Future;
use std::hash::Hash;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::oneshot;

/// Queued debounced request
struct PendingSlot {
    generation: u64,
    cancel: oneshot::Sender<()>,
}

/// Schedules fetches off the caller's context
pub struct FetchCoordinator<K = String> {
    /// Worker pool
    runtime: Handle,
    /// Debounce quiet period
    debounce_window: Duration,
    /// Queued debounced request per key
    pending: Arc<DashMap<K, PendingSlot>>,
    /// Submission counter for debounced requests
    generation: AtomicU64,
}

impl<K> FetchCoordinator<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    /// Create coordinator on a runtime
    pub fn new(runtime: Handle, config: &FetchConfig) -> UsageResult<Self> {
        if config.debounce_ms == 0 {
            return Err(UsageError::Config("debounce_ms must be greater than zero".into()));
        }

        Ok(Self {
            runtime,
            debounce_window: config.debounce_window(),
            pending: Arc::new(DashMap::new()),
            generation: AtomicU64::new(0),
        })
    }

    /// Create coordinator on the runtime of the calling task
    pub fn current(config: &FetchConfig) -> UsageResult<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| UsageError::Config(format!("no tokio runtime: {}", e)))?;
        Self::new(runtime, config)
    }

    /// Debounce quiet period
    pub fn debounce_window(&self) -> Duration {
        self.debounce_window
    }

    /// Number of debounced requests still waiting for their quiet period
    pub fn pending_debounced(&self) -> usize {
        self.pending.len()
    }

    /// Run async work; every submission runs independently
    pub fn submit<F, Fut, T>(&self, work: F) -> PendingFetch<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UsageResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let (completion, pending) = PendingFetch::channel();
        self.submit_with(work, completion);
        pending
    }

    /// Run async work and hand the result to `on_complete`
    pub fn submit_with<F, Fut, T, C>(&self, work: F, on_complete: C)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UsageResult<T>> + Send + 'static,
        T: Send + 'static,
        C: FnOnce(UsageResult<T>) + Send + 'static,
    {
        let completion = Completion::new(on_complete);
        self.runtime.spawn(async move {
            let result = work().await;
            completion.complete(result);
        });
    }

    /// Run blocking work on the blocking pool
    pub fn submit_blocking<F, T>(&self, work: F) -> PendingFetch<T>
    where
        F: FnOnce() -> UsageResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let (completion, pending) = PendingFetch::channel();
        self.submit_blocking_with(work, completion);
        pending
    }

    /// Run blocking work and hand the result to `on_complete`
    pub fn submit_blocking_with<F, T, C>(&self, work: F, on_complete: C)
    where
        F: FnOnce() -> UsageResult<T> + Send + 'static,
        T: Send + 'static,
        C: FnOnce(UsageResult<T>) + Send + 'static,
    {
        let completion = Completion::new(on_complete);
        self.runtime.spawn_blocking(move || {
            let result = work();
            completion.complete(result);
        });
    }

    /// Run async work after the quiet period unless superseded for `key`
    pub fn submit_debounced<F, Fut, T>(&self, key: K, work: F) -> PendingFetch<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UsageResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let (completion, pending) = PendingFetch::channel();
        self.submit_debounced_with(key, work, completion);
        pending
    }

    /// Debounced submission delivering to `on_complete`
    pub fn submit_debounced_with<F, Fut, T, C>(&self, key: K, work: F, on_complete: C)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UsageResult<T>> + Send + 'static,
        T: Send + 'static,
        C: FnOnce(UsageResult<T>) + Send + 'static,
    {
        let completion = Completion::new(on_complete);
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let (cancel_tx, cancel_rx) = oneshot::channel();

        let slot = PendingSlot {
            generation,
            cancel: cancel_tx,
        };
        if let Some(previous) = self.pending.insert(key.clone(), slot) {
            let _ = previous.cancel.send(());
        }

        let pending = Arc::clone(&self.pending);
        let window = self.debounce_window;
        self.runtime.spawn(async move {
            tokio::select! {
                _ = cancel_rx => {}
                _ = tokio::time::sleep(window) => {}
            }

            // A newer submission may have replaced the slot after the timer fired
            let claimed = pending
                .remove_if(&key, |_, slot| slot.generation == generation)
                .is_some();
            if !claimed {
                tracing::debug!(generation, "Debounced request superseded");
                completion.complete(Err(UsageError::Superseded));
                return;
            }

            let result = work().await;
            completion.complete(result);
        });
    }
}

/// Completion callback that fires exactly once.
///
/// Dropping it undelivered (panicking work, runtime shut down) reports
/// `WorkerAborted`.
struct Completion<T, C>
where
    C: FnOnce(UsageResult<T>),
{
    callback: Option<C>,
    _result: PhantomData<fn(T)>,
}

impl<T, C> Completion<T, C>
where
    C: FnOnce(UsageResult<T>),
{
    fn new(callback: C) -> Self {
        Self {
            callback: Some(callback),
            _result: PhantomData,
        }
    }

    fn complete(mut self, result: UsageResult<T>) {
        if let Some(callback) = self.callback.take() {
            callback(result);
        }
    }
}

impl<T, C> Drop for Completion<T, C>
where
    C: FnOnce(UsageResult<T>),
{
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            tracing::error!("Fetch dropped before completion");
            callback(Err(UsageError::WorkerAborted(
                "request dropped before completion".into(),
            )));
        }
    }
}

/// Result of a submitted fetch
#[must_use = "a PendingFetch does nothing unless awaited"]
pub struct PendingFetch<T> {
    rx: oneshot::Receiver<UsageResult<T>>,
}

impl<T: Send + 'static> PendingFetch<T> {
    fn channel() -> (impl FnOnce(UsageResult<T>) + Send + 'static, Self) {
        let (tx, rx) = oneshot::channel();
        let deliver = move |result: UsageResult<T>| {
            let _ = tx.send(result);
        };
        (deliver, Self { rx })
    }
}

impl<T> Future for PendingFetch<T> {
    type Output = UsageResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|received| {
            received.unwrap_or_else(|_| {
                Err(UsageError::WorkerAborted("completion channel closed".into()))
            })
        })
    }
}
