//! Worker pool error types.

use std::any::Any;
use std::fmt;

/// Errors that can occur inside the worker pool.
///
/// None of these reach the code that submitted a job: `submit` never fails.
/// They exist so workers can report what went wrong through tracing.
#[derive(Debug)]
pub enum PoolError {
    /// The OS refused to start a worker thread.
    Spawn(std::io::Error),

    /// A job panicked while running on a worker.
    JobPanicked(String),
}

impl PoolError {
    /// Build a [`PoolError::JobPanicked`] from a `catch_unwind` payload.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        PoolError::JobPanicked(message)
    }

    /// Check if this is a job panic.
    pub fn is_panic(&self) -> bool {
        matches!(self, PoolError::JobPanicked(_))
    }
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::Spawn(e) => write!(f, "failed to spawn worker thread: {}", e),
            PoolError::JobPanicked(msg) => write!(f, "job panicked: {}", msg),
        }
    }
}

impl std::error::Error for PoolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PoolError::Spawn(e) => Some(e),
            PoolError::JobPanicked(_) => None,
        }
    }
}

impl From<std::io::Error> for PoolError {
    fn from(e: std::io::Error) -> Self {
        PoolError::Spawn(e)
    }
}

/// Result type alias for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;
