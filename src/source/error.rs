//! Data source error types.

use std::fmt;

/// Errors raised by a [`DataSource`](super::DataSource) call.
///
/// These stop at the batch-job boundary: callers of entity fields only ever
/// see an absent value.
#[derive(Debug)]
pub enum SourceError {
    /// Transport failure (connect, timeout, body read).
    Http(reqwest::Error),

    /// The remote answered with a non-success status.
    Status { status: u16, endpoint: String },

    /// The response could not be decoded.
    Parse(String),

    /// The backend cannot serve requests (missing key, disabled feature).
    Unavailable(String),
}

impl SourceError {
    /// Check if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, SourceError::Http(e) if e.is_timeout())
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Http(e) => write!(f, "HTTP error: {}", e),
            SourceError::Status { status, endpoint } => {
                write!(f, "{} returned status {}", endpoint, status)
            }
            SourceError::Parse(msg) => write!(f, "parse error: {}", msg),
            SourceError::Unavailable(msg) => write!(f, "source unavailable: {}", msg),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            SourceError::Parse(e.to_string())
        } else {
            SourceError::Http(e)
        }
    }
}

impl From<regex::Error> for SourceError {
    fn from(e: regex::Error) -> Self {
        SourceError::Unavailable(format!("invalid pattern: {}", e))
    }
}
