use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::CollectError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkerConfig {
    /// Upper bound for a single session query, enforced by the collector.
    /// `None` (the default) lets a query wait for as long as the OS takes to
    /// answer, so a hung OS call parks its worker thread forever.
    pub timeout: Option<Duration>,
}

/// A query running on its own OS thread.
///
/// Dropping the task detaches it: the query still runs to completion and its
/// result is still delivered. Joining is only useful to wait for delivery.
#[derive(Debug)]
pub struct QueryTask {
    handle: Option<JoinHandle<()>>,
}

impl QueryTask {
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Blocks until the result has been delivered. Returns false if the
    /// delivery callback itself panicked.
    pub fn join(self) -> bool {
        match self.handle {
            Some(handle) => handle.join().is_ok(),
            None => true,
        }
    }
}

/// Runs the future built by `make_query` on a fresh thread with its own
/// current-thread tokio runtime, then hands the outcome to `deliver` on that
/// same thread.
///
/// The future is created inside the worker, so it does not need to be `Send`.
/// WinRT proxies are bound to the thread that created them.
///
/// If the OS refuses to start the thread, `deliver` receives a runtime error
/// right away on the calling thread. A panic that escapes the query is
/// delivered as an unknown error.
pub fn spawn_query<T, Fut, F, D>(
    name: &str,
    make_query: F,
    deliver: D,
) -> QueryTask
where
    T: 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = T> + 'static,
    D: FnOnce(Result<T, CollectError>) + Send + 'static,
{
    let deliver = Arc::new(Mutex::new(Some(deliver)));
    let worker_deliver = Arc::clone(&deliver);

    let spawned = thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            let outcome = run_query(make_query);
            if let Some(deliver) = take_once(&worker_deliver) {
                deliver(outcome);
            }
        });

    match spawned {
        Ok(handle) => QueryTask {
            handle: Some(handle),
        },
        Err(e) => {
            tracing::error!("failed to start {name} worker: {e}");
            if let Some(deliver) = take_once(&deliver) {
                deliver(Err(e.into()));
            }
            QueryTask { handle: None }
        }
    }
}

fn take_once<D>(slot: &Mutex<Option<D>>) -> Option<D> {
    slot.lock().ok().and_then(|mut slot| slot.take())
}

fn run_query<T, Fut, F>(make_query: F) -> Result<T, CollectError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        rt.block_on(async move { make_query().await })
    }));

    match outcome {
        Ok(result) => Ok(result),
        Err(_) => {
            tracing::error!("media query panicked");
            Err(CollectError::Unknown)
        }
    }
}
