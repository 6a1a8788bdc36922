//! Self-sizing worker pool.
//!
//! Metadata lookups and stream resolution run here, never on the thread
//! that asked for a field.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      WorkerPool                            │
//! ├────────────────────────────────────────────────────────────┤
//! │              ┌───────────────┐                             │
//! │              │   submit()    │  (never blocks)             │
//! │              └───────┬───────┘                             │
//! │                      │                                     │
//! │              ┌───────▼───────┐                             │
//! │              │ Mutex<State>  │  job queue + active count   │
//! │              └───────┬───────┘                             │
//! │       ┌──────────────┴──────────────┐                      │
//! │  ┌────▼────┐                   ┌────▼────┐                 │
//! │  │ Worker0 │  ... up to max    │ WorkerN │                 │
//! │  └─────────┘                   └─────────┘                 │
//! │   (exits as soon as it finds the queue empty)              │
//! └────────────────────────────────────────────────────────────┘
//! ```

mod error;
mod thread;

pub use error::{PoolError, PoolResult};
pub use thread::{WorkerPool, DEFAULT_MAX_WORKERS};

/// Counters describing pool activity since creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Jobs accepted by `submit`.
    pub submitted: u64,
    /// Jobs that returned normally.
    pub completed: u64,
    /// Jobs that panicked.
    pub panicked: u64,
    /// Jobs dropped unrun because no worker could be started.
    pub abandoned: u64,
    /// Highest number of workers alive at the same time.
    pub peak_workers: usize,
}

impl PoolStats {
    /// Jobs accepted but not yet finished.
    pub fn outstanding(&self) -> u64 {
        self.submitted
            .saturating_sub(self.completed)
            .saturating_sub(self.panicked)
            .saturating_sub(self.abandoned)
    }
}
