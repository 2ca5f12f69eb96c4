use error_stack::Report;
use thiserror::Error;

// Error message prefixes
const MSG_FAILED_TO_PREFIX: &str = "Failed to";
const MSG_INVALID_PREFIX: &str = "Invalid";
const MSG_MISSING_PREFIX: &str = "Missing";

/// Result type for the dump pipeline
pub type Result<T> = std::result::Result<T, Report<Error>>;

/// Error categories of a dump run
///
/// Only `Configuration` is fatal. The other kinds are recovered where they occur and
/// end up on the `RunReport`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Invocation failed: {0}")]
    Invocation(String),

    #[error("Marshalling failed: {0}")]
    Marshal(String),
}

impl Error {
    /// Create a "Failed to X" configuration error
    pub fn failed_to(action: &str, details: impl std::fmt::Display) -> Self {
        Self::Configuration(format!("{MSG_FAILED_TO_PREFIX} {action}: {details}"))
    }

    /// Create an "Invalid X" configuration error
    pub fn invalid(what: &str, details: impl std::fmt::Display) -> Self {
        Self::Configuration(format!("{MSG_INVALID_PREFIX} {what}: {details}"))
    }

    /// Create a "Missing X" configuration error
    pub fn missing(what: &str) -> Self {
        Self::Configuration(format!("{MSG_MISSING_PREFIX} {what}"))
    }

    /// Create error for a failed row source query
    pub fn query_failed(query: impl std::fmt::Display, reason: impl std::fmt::Display) -> Self {
        Self::Query(format!("{MSG_FAILED_TO_PREFIX} run '{query}': {reason}"))
    }

    /// Create error for a property that could not be read from a sampled instance
    pub fn invocation_failed(
        owner: impl std::fmt::Display,
        accessor: &str,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::Invocation(format!(
            "{MSG_FAILED_TO_PREFIX} invoke {owner}.{accessor}(): {reason}"
        ))
    }

    /// Create error for XML output failures
    pub fn marshal_failed(operation: &str, error: impl std::fmt::Display) -> Self {
        Self::Marshal(format!("{MSG_FAILED_TO_PREFIX} {operation}: {error}"))
    }

    /// Whether this error aborts the run
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
