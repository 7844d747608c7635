//! Error types for the Algolia client.
//!
//! Every fallible operation in the library returns [`AlgoliaError`]; the
//! binary wraps it in `anyhow` at the edges.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while talking to the Algolia APIs.
#[derive(Error, Debug)]
pub enum AlgoliaError {
    /// Failed to read an input file.
    #[error("failed to read input file '{path}': {source}")]
    InputFileRead {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write to an output file.
    #[error("failed to write to output file '{path}': {source}")]
    OutputFileWrite {
        /// Path to the file that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a JSON record from an input file.
    #[error("failed to parse JSON at line {line}: {source}")]
    JsonParse {
        /// Line number where the error occurred.
        line: usize,
        /// The underlying JSON parsing error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to encode or decode a JSON payload.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The HTTP client could not be built or a request could not be formed.
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A required parameter was missing or empty.
    #[error("missing the required parameter '{param}' when calling {operation}")]
    MissingParameter {
        /// Name of the parameter.
        param: &'static str,
        /// Operation that required it.
        operation: &'static str,
    },

    /// A parameter had an invalid value.
    #[error("invalid value for '{param}': {reason}")]
    InvalidParameter {
        /// Name of the parameter.
        param: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// The API answered with a non-retryable status.
    #[error("API returned status {status}: {message}")]
    Api {
        /// HTTP status code returned.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// Every tryable host failed.
    #[error("unreachable hosts after {attempts} attempts: {}", .errors.join("; "))]
    RetryExhausted {
        /// Number of hosts tried.
        attempts: u32,
        /// One entry per failed attempt.
        errors: Vec<String>,
    },

    /// The global request timeout elapsed before any host answered.
    #[error("request timed out after {attempts} attempts")]
    Timeout {
        /// Number of attempts made before timeout.
        attempts: u32,
    },

    /// A task was still pending after the configured number of polls.
    #[error("task {task_id} not published after {attempts} polls")]
    TaskTimeout {
        /// The task being waited on.
        task_id: i64,
        /// Number of polls made.
        attempts: u32,
    },

    /// A record sent with an update or delete action had no `objectID`.
    #[error(
        "all objects must have an unique objectID (like a primary key) to be valid; missing at position {position}. \
         Map an existing primary key with `save_objects_with_id_key`, or let the engine generate IDs with `save_objects_auto_id`"
    )]
    MissingObjectId {
        /// Position of the offending record in the submitted list.
        position: usize,
    },

    /// A response did not have the expected shape.
    #[error("invalid API response: {message}")]
    InvalidResponse {
        /// Description of what was invalid.
        message: String,
    },
}

impl AlgoliaError {
    /// Whether this error came back from the API with the given status.
    #[must_use]
    pub fn is_status(&self, code: u16) -> bool {
        matches!(self, Self::Api { status, .. } if *status == code)
    }
}

/// Result type alias for Algolia operations.
pub type Result<T> = std::result::Result<T, AlgoliaError>;
