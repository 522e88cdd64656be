use std::error::Error;
use std::fmt::{Display, Formatter};

/// Error kind that represents failures reported by a [`crate::GateEvaluator`] or the [`crate::Client`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The evaluator could not produce a result (e.g. it was not initialized or its backend is gone).
    EvaluatorUnavailable = 1000,
    /// The user passed to the gate check has neither a user ID nor any custom ID.
    InvalidContext = 1001,
    /// An HTTP response indicating an invalid SDK key was received (401 Unauthorized or 403 Forbidden).
    InvalidSdkKey = 1100,
    /// Initialization of the internal [`reqwest::Client`] failed.
    HttpClientInitFailure = 1101,
    /// Invalid HTTP response was received (unexpected HTTP status code).
    UnexpectedHttpResponse = 1102,
    /// The HTTP request timed out.
    HttpRequestTimeout = 1103,
    /// The HTTP request failed (most likely, due to a local network issue).
    HttpRequestFailure = 1104,
    /// An invalid HTTP response was received (200 OK with an invalid content).
    InvalidHttpResponseContent = 1105,
    /// Events could not be delivered.
    EventLoggingFailure = 2000,
    /// A custom event was rejected before it was queued (e.g. its name is empty).
    InvalidEvent = 2001,
    /// The client is in offline mode, it cannot initiate HTTP requests.
    OfflineClient = 3200,
    /// The client was shut down and does not evaluate gates anymore.
    ClientShutDown = 3201,
}

impl ErrorKind {
    pub(crate) fn as_u16(&self) -> u16 {
        *self as u16
    }
}

/// Error struct that holds the [`ErrorKind`] and message of the reported failure.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatorError {
    /// Error kind that represents the reported failure.
    pub kind: ErrorKind,
    /// The text representation of the failure.
    pub message: String,
}

impl EvaluatorError {
    /// Creates a new [`EvaluatorError`].
    pub fn new(kind: ErrorKind, message: String) -> Self {
        Self { message, kind }
    }
}

impl Display for EvaluatorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message.as_str())
    }
}

impl Error for EvaluatorError {}

/// Failure reported when a [`crate::GateSource`] cannot be loaded.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The gate file could not be read.
    #[error("failed to read gate file: {0}")]
    Io(#[from] std::io::Error),
    /// The gate file's content is not a valid gate document.
    #[error("gate file content is invalid: {0}")]
    Json(#[from] serde_json::Error),
}
