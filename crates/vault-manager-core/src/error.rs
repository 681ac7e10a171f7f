//! Error types for the reconciliation engine.
//!
//! Every error is fatal for the run that raised it. Nothing in this crate
//! retries or skips; callers surface the error and stop.

use std::fmt;

/// Errors reported by a remote [`EntityStore`](crate::EntityStore).
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The requested entity does not exist on the remote side.
    #[error("Entity not found: {key}")]
    NotFound {
        /// Identifier that was looked up.
        key: String,
    },

    /// The remote service answered with a non-success status.
    #[error("Remote returned HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error text reported by the remote service.
        message: String,
    },

    /// The remote service could not be reached.
    #[error("Connection error: {message}")]
    Connection {
        /// Description of the transport failure.
        message: String,
    },

    /// The remote service answered with a body we could not interpret.
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Description of what was wrong with the response.
        message: String,
    },
}

impl StoreError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Creates a new `Status` error.
    #[must_use]
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Creates a new `Connection` error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidResponse` error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors raised while decoding desired state.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid YAML")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid document: {0}")]
    Invalid(String),
}

impl DecodeError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// A failed reconciliation run.
///
/// Each variant names the entity kind and, where one is involved, the
/// identifier whose remote call failed. The underlying cause is exposed
/// through [`std::error::Error::source`] and is not repeated in the message.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("failed to decode {kind} configuration")]
    Decode { kind: String, source: DecodeError },

    #[error("failed to list existing {kind} entries")]
    List { kind: String, source: StoreError },

    #[error("failed to fetch existing {kind} entry '{key}'")]
    Fetch {
        kind: String,
        key: String,
        source: StoreError,
    },

    #[error("fetch task for {kind} did not complete")]
    Join {
        kind: String,
        source: tokio::task::JoinError,
    },

    #[error("failed to write {kind} entry '{key}'")]
    Write {
        kind: String,
        key: String,
        source: StoreError,
    },

    #[error("failed to delete {kind} entry '{key}'")]
    Delete {
        kind: String,
        key: String,
        source: StoreError,
    },

    #[error("registry error: {0}")]
    Registry(String),
}

impl ReconcileError {
    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry(msg.into())
    }

    /// The entity kind the failing run was reconciling, if any.
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        match self {
            Self::Decode { kind, .. }
            | Self::List { kind, .. }
            | Self::Fetch { kind, .. }
            | Self::Join { kind, .. }
            | Self::Write { kind, .. }
            | Self::Delete { kind, .. } => Some(kind),
            Self::Registry(_) => None,
        }
    }

    /// The identifier whose remote call failed, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Fetch { key, .. } | Self::Write { key, .. } | Self::Delete { key, .. } => {
                Some(key)
            }
            _ => None,
        }
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Decode { .. } | Self::Registry(_) => ErrorCategory::Input,
            Self::List { .. }
            | Self::Fetch { .. }
            | Self::Write { .. }
            | Self::Delete { .. } => ErrorCategory::Remote,
            Self::Join { .. } => ErrorCategory::Internal,
        }
    }
}

/// Error categories for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The desired-state document was rejected.
    Input,
    /// The remote service failed or refused a call.
    Remote,
    /// The engine itself failed (a fetch task panicked or was cancelled).
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Input => "input",
            Self::Remote => "remote",
            Self::Internal => "internal",
        };
        write!(f, "{s}")
    }
}
