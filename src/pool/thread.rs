//! Demand-driven thread pool implementation.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use super::error::{PoolError, PoolResult};
use super::PoolStats;

/// Default maximum number of concurrently running workers.
pub const DEFAULT_MAX_WORKERS: usize = 2;

/// A unit of work queued on the pool.
type Job = Box<dyn FnOnce() + Send + 'static>;

/// Queue and worker accounting, guarded by a single mutex.
struct State {
    /// Pending jobs, popped front first.
    jobs: VecDeque<Job>,
    /// Workers currently alive.
    active: usize,
    /// Highest value `active` has reached.
    peak: usize,
    /// Total jobs accepted by `submit`.
    submitted: u64,
}

struct Inner {
    state: Mutex<State>,
    /// Signalled whenever the last active worker exits.
    idle: Condvar,
    max_workers: usize,
    completed: AtomicU64,
    panicked: AtomicU64,
    /// Jobs dropped unrun because no worker could be started.
    abandoned: AtomicU64,
    next_worker_id: AtomicUsize,
    name: String,
}

impl Inner {
    /// Workers never run jobs while holding the lock, so a poisoned lock
    /// still guards consistent state.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A thread pool that grows on demand and shrinks to zero when idle.
///
/// Each `submit` queues the job and, if fewer than `max_workers` workers are
/// alive, starts a new one. A worker pops jobs until it finds the queue empty,
/// then exits. No thread outlives the work it was started for.
///
/// Cloning is cheap and yields a handle to the same pool.
#[derive(Clone)]
pub struct WorkerPool {
    inner: Arc<Inner>,
}

impl WorkerPool {
    /// Create a new pool.
    ///
    /// # Arguments
    /// * `max_workers` - Upper bound on concurrently running workers (0 = use CPU count)
    /// * `name` - Name for worker threads and logging
    pub fn new(max_workers: usize, name: impl Into<String>) -> Self {
        let max_workers = if max_workers == 0 {
            num_cpus::get()
        } else {
            max_workers
        };
        let name = name.into();

        tracing::debug!(pool = %name, max_workers, "worker pool created");

        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    jobs: VecDeque::new(),
                    active: 0,
                    peak: 0,
                    submitted: 0,
                }),
                idle: Condvar::new(),
                max_workers,
                completed: AtomicU64::new(0),
                panicked: AtomicU64::new(0),
                abandoned: AtomicU64::new(0),
                next_worker_id: AtomicUsize::new(0),
                name,
            }),
        }
    }

    /// Queue a job for execution. Never blocks on the job itself.
    ///
    /// A job that panics is logged and counted; the worker that ran it keeps
    /// serving the queue. Jobs that own futures must resolve them on every
    /// path, including being dropped unrun when no worker can be started.
    pub fn submit<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let start_worker = {
            let mut state = self.inner.lock();
            state.jobs.push_back(Box::new(job));
            state.submitted += 1;

            if state.active < self.inner.max_workers {
                state.active += 1;
                state.peak = state.peak.max(state.active);
                true
            } else {
                false
            }
        };

        if start_worker {
            if let Err(e) = self.spawn_worker() {
                let abandoned = self.release_failed_worker();
                tracing::error!(
                    pool = %self.inner.name,
                    abandoned,
                    error = %e,
                    "could not start worker"
                );
            }
        }
    }

    /// Undo the accounting for a worker that never started.
    ///
    /// While other workers are alive the queue is left to them. With none
    /// left, queued jobs would never run: they are dropped instead, which
    /// lets their guards resolve the futures they own. Returns the number
    /// of dropped jobs.
    fn release_failed_worker(&self) -> usize {
        let stranded: Vec<Job> = {
            let mut state = self.inner.lock();
            state.active -= 1;
            if state.active > 0 {
                return 0;
            }
            state.jobs.drain(..).collect()
        };

        let count = stranded.len();
        self.inner
            .abandoned
            .fetch_add(count as u64, Ordering::Relaxed);
        drop(stranded);

        let _state = self.inner.lock();
        self.inner.idle.notify_all();
        count
    }

    fn spawn_worker(&self) -> PoolResult<()> {
        let id = self.inner.next_worker_id.fetch_add(1, Ordering::Relaxed);
        let inner = Arc::clone(&self.inner);

        thread::Builder::new()
            .name(format!("{}-{}", self.inner.name, id))
            .spawn(move || Self::worker_loop(id, inner))?;

        Ok(())
    }

    /// Worker thread main loop.
    fn worker_loop(id: usize, inner: Arc<Inner>) {
        tracing::trace!(pool = %inner.name, worker = id, "worker started");

        loop {
            let job = {
                let mut state = inner.lock();
                match state.jobs.pop_front() {
                    Some(job) => job,
                    None => {
                        state.active -= 1;
                        if state.active == 0 {
                            inner.idle.notify_all();
                        }
                        break;
                    }
                }
            };

            let started = Instant::now();
            match panic::catch_unwind(AssertUnwindSafe(job)) {
                Ok(()) => {
                    inner.completed.fetch_add(1, Ordering::Relaxed);
                }
                Err(payload) => {
                    inner.panicked.fetch_add(1, Ordering::Relaxed);
                    let err = PoolError::from_panic(payload);
                    tracing::error!(
                        pool = %inner.name,
                        worker = id,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        error = %err,
                        "job failed"
                    );
                }
            }
        }

        tracing::trace!(pool = %inner.name, worker = id, "worker stopped");
    }

    /// Get the maximum number of concurrent workers.
    pub fn max_workers(&self) -> usize {
        self.inner.max_workers
    }

    /// Get the number of workers currently alive.
    pub fn active_workers(&self) -> usize {
        self.inner.lock().active
    }

    /// Get the number of jobs waiting for a worker.
    pub fn queued(&self) -> usize {
        self.inner.lock().jobs.len()
    }

    /// Get the pool name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Snapshot of the pool counters.
    pub fn stats(&self) -> PoolStats {
        let state = self.inner.lock();
        PoolStats {
            submitted: state.submitted,
            completed: self.inner.completed.load(Ordering::Relaxed),
            panicked: self.inner.panicked.load(Ordering::Relaxed),
            abandoned: self.inner.abandoned.load(Ordering::Relaxed),
            peak_workers: state.peak,
        }
    }

    /// Block until the queue is empty and every worker has exited.
    pub fn wait_idle(&self) {
        let mut state = self.inner.lock();
        while state.active > 0 || !state.jobs.is_empty() {
            state = self
                .inner
                .idle
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Like [`wait_idle`](Self::wait_idle), giving up after `timeout`.
    ///
    /// Returns `true` if the pool became idle in time.
    pub fn wait_idle_timeout(&self, timeout: Duration) -> bool {
        let state = self.inner.lock();
        let (state, _) = self
            .inner
            .idle
            .wait_timeout_while(state, timeout, |s| s.active > 0 || !s.jobs.is_empty())
            .unwrap_or_else(PoisonError::into_inner);
        state.active == 0 && state.jobs.is_empty()
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WORKERS, "tubecache")
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("name", &self.inner.name)
            .field("max_workers", &self.inner.max_workers)
            .finish_non_exhaustive()
    }
}
