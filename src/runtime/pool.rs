//! Fire-and-forget job execution with fault isolation
//!
//! Hotkey callbacks and mod loads are submitted here and never awaited by
//! the submitter. Each job runs on the tokio blocking pool; a job returning
//! an error or panicking is logged and affects nothing else. Handles are
//! tracked so shutdown can wait, with a bound, for work still in flight.

use parking_lot::Mutex;
use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// A unit of work for the pool
pub type Job = Box<dyn FnOnce() -> anyhow::Result<()> + Send + 'static>;

/// Accepts jobs without blocking on their completion
pub trait Dispatch: Send + Sync {
    fn submit(&self, label: &str, job: Job);
}

/// Run `job`, logging its error or panic instead of propagating it
pub fn run_isolated(label: &str, job: Job) {
    match panic::catch_unwind(AssertUnwindSafe(job)) {
        Ok(Ok(())) => debug!(job = label, "job finished"),
        Ok(Err(err)) => error!(job = label, "{:#}", err),
        Err(payload) => error!(job = label, "job panicked: {}", panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Worker pool backed by a dedicated tokio runtime
pub struct WorkerPool {
    runtime: Mutex<Option<Runtime>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Build a pool with `worker_threads` async workers and up to
    /// `max_blocking_threads` threads running jobs
    pub fn new(worker_threads: usize, max_blocking_threads: usize) -> io::Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(worker_threads.max(1))
            .max_blocking_threads(max_blocking_threads.max(1))
            .thread_name("mod-worker")
            .enable_all()
            .build()?;

        Ok(WorkerPool {
            runtime: Mutex::new(Some(runtime)),
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Jobs submitted but not yet finished
    pub fn in_flight(&self) -> usize {
        let mut tasks = self.tasks.lock();
        tasks.retain(|t| !t.is_finished());
        tasks.len()
    }

    /// Wait until nothing is in flight or `timeout` passes; true if drained
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = std::time::Instant::now() + timeout;
        while self.in_flight() > 0 {
            if std::time::Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        true
    }

    /// Stop accepting jobs, wait up to `timeout` for running ones, then
    /// abandon whatever is left. Returns the number of abandoned jobs.
    ///
    /// Must not be called from inside the pool's own jobs.
    pub fn shutdown(&self, timeout: Duration) -> usize {
        let runtime = match self.runtime.lock().take() {
            Some(runtime) => runtime,
            None => return 0,
        };
        let tasks = std::mem::take(&mut *self.tasks.lock());

        let abandoned = runtime.block_on(async move {
            let deadline = tokio::time::Instant::now() + timeout;
            let mut abandoned = 0;
            for task in tasks {
                if tokio::time::timeout_at(deadline, task).await.is_err() {
                    abandoned += 1;
                }
            }
            abandoned
        });

        if abandoned > 0 {
            warn!("Abandoning {} unfinished job(s) at shutdown", abandoned);
        }
        runtime.shutdown_background();
        abandoned
    }
}

impl Dispatch for WorkerPool {
    fn submit(&self, label: &str, job: Job) {
        let runtime = self.runtime.lock();
        let Some(runtime) = runtime.as_ref() else {
            warn!(job = label, "Pool is shut down; dropping job");
            return;
        };

        let label = label.to_string();
        let handle = runtime.spawn_blocking(move || run_isolated(&label, job));

        let mut tasks = self.tasks.lock();
        tasks.retain(|t| !t.is_finished());
        tasks.push(handle);
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.get_mut().take() {
            runtime.shutdown_background();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_jobs_run() {
        let pool = WorkerPool::new(1, 4).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..10 {
            let counter = Arc::clone(&counter);
            pool.submit(
                "count",
                Box::new(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }),
            );
        }
        assert!(pool.wait_idle(Duration::from_secs(5)));
        assert_eq!(counter.load(Ordering::SeqCst), 10);
        assert_eq!(pool.shutdown(Duration::from_secs(1)), 0);
    }

    #[test]
    fn test_failing_and_panicking_jobs_are_isolated() {
        let pool = WorkerPool::new(1, 4).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        pool.submit("fails", Box::new(|| Err(anyhow::anyhow!("boom"))));
        pool.submit("panics", Box::new(|| panic!("kaboom")));
        let c = Arc::clone(&counter);
        pool.submit(
            "survivor",
            Box::new(move || {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        );

        assert!(pool.wait_idle(Duration::from_secs(5)));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_submit_does_not_wait() {
        let pool = WorkerPool::new(1, 4).unwrap();
        let start = std::time::Instant::now();
        pool.submit(
            "slow",
            Box::new(|| {
                std::thread::sleep(Duration::from_millis(300));
                Ok(())
            }),
        );
        assert!(start.elapsed() < Duration::from_millis(200));
        assert_eq!(pool.in_flight(), 1);
        assert!(pool.wait_idle(Duration::from_secs(5)));
    }

    #[test]
    fn test_shutdown_abandons_slow_jobs() {
        let pool = WorkerPool::new(1, 4).unwrap();
        pool.submit(
            "stuck",
            Box::new(|| {
                std::thread::sleep(Duration::from_secs(2));
                Ok(())
            }),
        );

        let start = std::time::Instant::now();
        assert_eq!(pool.shutdown(Duration::from_millis(100)), 1);
        assert!(start.elapsed() < Duration::from_secs(1));

        // later submissions are dropped
        pool.submit("late", Box::new(|| Ok(())));
        assert_eq!(pool.in_flight(), 0);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(payload.as_ref()), "static");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic payload");
    }
}
