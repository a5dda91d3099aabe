// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Domain-specific errors for the pipe execution model, the intermediate
//! operator algebra, and the bucket/storage substrate.
//!
//! ## Design Principles
//!
//! - **Specific**: each variant names one failure mode, not a grab-bag.
//! - **Recoverable vs terminal**: [`PipeError::is_recoverable`] tells the
//!   retrier (`sluice::infrastructure::storage::retrier`) whether a failure
//!   is worth retrying.
//! - **Cloneable**: errors can be cloned so they can be delivered to both a
//!   listener and a metrics counter without moving ownership around.

use thiserror::Error;

/// The full error taxonomy propagated by pipes, operators, and buckets.
///
/// See spec.md section 7 ("Error handling design") for the conceptual
/// taxonomy this enum implements one-to-one.
#[derive(Error, Debug, Clone)]
pub enum PipeError {
    /// Underlying file/network/subprocess failure.
    #[error("io error: {0}")]
    Io(String),

    /// A pipe promising sorted input observed a descending pair.
    #[error("out of order: {0}")]
    OutOfOrder(String),

    /// A user predicate or transform rejected an item.
    #[error("validation error: {0}")]
    Validation(String),

    /// Non-2xx response from an HTTP source.
    #[error("http error: status {status}: {message}")]
    Http { status: u16, message: String },

    /// Underlying database connection or query failure.
    #[error("jdbc error: {0}")]
    Jdbc(String),

    /// A remote JSON blob could not be parsed into the requested shape.
    #[error("illegal json: {0}")]
    IllegalJson(String),

    /// Signalled by the upstream of a queue-backed bridge.
    #[error("queue producer error: {0}")]
    QueueProducer(String),

    /// An unexpected programming error, wrapping an underlying failure.
    #[error("internal error: {0}")]
    Internal(String),

    /// Always terminal. Restores the thread's interruption/cancellation
    /// state at the point it is observed.
    #[error("interrupted: {0}")]
    Interruption(String),

    /// Invalid or missing configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The bucket implementation does not support the requested operation.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Requested object/key/pipeline does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Attempted to create something that already exists (e.g. a lock file,
    /// or `put` with `allow_override = false` on an existing key).
    #[error("already exists: {0}")]
    AlreadyExists(String),
}

impl PipeError {
    /// Creates an I/O error from any displayable cause.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Creates an out-of-order error, naming the pipe that detected it.
    pub fn out_of_order(msg: impl Into<String>) -> Self {
        Self::OutOfOrder(msg.into())
    }

    /// Creates a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates an internal/programming error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Creates an interruption error.
    pub fn interruption(msg: impl Into<String>) -> Self {
        Self::Interruption(msg.into())
    }

    /// Creates a not-found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Creates an already-exists error.
    pub fn already_exists(msg: impl Into<String>) -> Self {
        Self::AlreadyExists(msg.into())
    }

    /// Creates an unsupported-operation error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Whether the retrier should retry this failure class.
    ///
    /// Transient I/O is retried up to the configured cap; interruption and
    /// a handful of terminal classes are never retried (spec.md section 7,
    /// "Retries").
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PipeError::Io(_) | PipeError::Http { .. } | PipeError::Jdbc(_))
    }

    /// Whether this error must never be retried and always unwinds the
    /// pipe chain immediately.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipeError::Interruption(_) | PipeError::Internal(_) | PipeError::InvalidConfiguration(_)
        )
    }

    /// A short, stable category name, useful for metrics labels.
    pub fn category(&self) -> &'static str {
        match self {
            PipeError::Io(_) => "io",
            PipeError::OutOfOrder(_) => "out_of_order",
            PipeError::Validation(_) => "validation",
            PipeError::Http { .. } => "http",
            PipeError::Jdbc(_) => "jdbc",
            PipeError::IllegalJson(_) => "illegal_json",
            PipeError::QueueProducer(_) => "queue_producer",
            PipeError::Internal(_) => "internal",
            PipeError::Interruption(_) => "interruption",
            PipeError::InvalidConfiguration(_) => "configuration",
            PipeError::Unsupported(_) => "unsupported",
            PipeError::NotFound(_) => "not_found",
            PipeError::AlreadyExists(_) => "already_exists",
        }
    }
}

impl From<std::io::Error> for PipeError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::Interrupted {
            PipeError::Interruption(err.to_string())
        } else if err.kind() == std::io::ErrorKind::NotFound {
            PipeError::NotFound(err.to_string())
        } else {
            PipeError::Io(err.to_string())
        }
    }
}

impl From<serde_json::Error> for PipeError {
    fn from(err: serde_json::Error) -> Self {
        PipeError::IllegalJson(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_classes_retry_transient_io_only() {
        assert!(PipeError::io("disk full").is_recoverable());
        assert!(!PipeError::validation("bad row").is_recoverable());
        assert!(!PipeError::interruption("cancelled").is_recoverable());
    }

    #[test]
    fn interruption_and_internal_are_terminal() {
        assert!(PipeError::interruption("x").is_terminal());
        assert!(PipeError::internal("x").is_terminal());
        assert!(!PipeError::io("x").is_terminal());
    }

    #[test]
    fn io_error_not_found_maps_to_not_found_category() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: PipeError = io_err.into();
        assert_eq!(err.category(), "not_found");
    }
}
