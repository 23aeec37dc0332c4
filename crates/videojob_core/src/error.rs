use std::fmt;

use thiserror::Error;

/// A status or result request that did not produce a usable answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: TransportFailure,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportFailure, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailure {
    InvalidUrl,
    Network,
    Timeout,
    HttpStatus(u16),
    Decode,
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportFailure::InvalidUrl => write!(f, "invalid url"),
            TransportFailure::Network => write!(f, "network error"),
            TransportFailure::Timeout => write!(f, "timeout"),
            TransportFailure::HttpStatus(code) => write!(f, "http status {code}"),
            TransportFailure::Decode => write!(f, "malformed response body"),
        }
    }
}

/// Terminal failure of a poll session. Transport errors never end up here
/// directly; they are retried until the tick ceiling is reached.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    /// The service itself reported the job as failed.
    #[error("video generation failed: {message}")]
    ServerReported { message: String },
    /// The job claims completion but never yields a playable video.
    #[error("job {job_id} completed but no playable video is available")]
    IncompleteResult { job_id: String },
    /// The tick ceiling was reached before a terminal status.
    #[error("gave up on job {job_id} after {ticks} status checks{}", last_error_suffix(.last_error))]
    Timeout {
        job_id: String,
        ticks: u32,
        last_error: Option<String>,
    },
}

fn last_error_suffix(last_error: &Option<String>) -> String {
    last_error
        .as_deref()
        .map(|err| format!(" (last error: {err})"))
        .unwrap_or_default()
}
