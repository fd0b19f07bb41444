//! Error types used by the task bus and the response assembler.
//!
//! This module defines three error enums:
//!
//! - [`StoreError`]: failures of the external key-value store.
//! - [`PublishError`]: errors raised on the producer side of a task bus.
//! - [`GenerateError`]: errors surfaced to the consumer of a task.
//!
//! All of them provide `as_label` for logs/metrics. [`GenerateError::from_failure`]
//! translates a failure carried by an [`Event::Error`](crate::Event::Error) into the
//! error the caller actually sees.

use thiserror::Error;

use crate::events::{FailureKind, InvokeFailure};

/// Message surfaced for every authorization failure, whatever the provider said.
pub const AUTHORIZATION_MESSAGE: &str = "Incorrect API key provided";

/// # Errors produced by a key-value store backend.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached or rejected the operation.
    #[error("key-value store unavailable: {reason}")]
    Unavailable {
        /// Backend-specific description.
        reason: String,
    },
}

impl StoreError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            StoreError::Unavailable { .. } => "store_unavailable",
        }
    }
}

/// # Errors produced on the producer side.
///
/// [`PublishError::TaskCancelled`] is a control signal, not a failure: the
/// producer's outer loop should stop generating and return cleanly, since the
/// listener has already emitted (or will emit) the final `Stop`.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// The event payload violates the publish contract; it was not enqueued.
    #[error("invalid event payload: {reason}")]
    Validation {
        /// What was wrong with the payload.
        reason: String,
    },

    /// The task has been stopped; the producer must unwind.
    #[error("task cancelled")]
    TaskCancelled,

    /// The ownership record could not be written when opening the bus.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PublishError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskrelay::PublishError;
    ///
    /// assert_eq!(PublishError::TaskCancelled.as_label(), "publish_task_cancelled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            PublishError::Validation { .. } => "publish_validation",
            PublishError::TaskCancelled => "publish_task_cancelled",
            PublishError::Store(_) => "publish_store",
        }
    }

    /// True if this is the cooperative cancellation signal.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PublishError::TaskCancelled)
    }

    pub(crate) fn validation(reason: impl Into<String>) -> Self {
        PublishError::Validation {
            reason: reason.into(),
        }
    }
}

/// # Errors surfaced to whoever consumes a task's output.
///
/// Blocking callers receive one of these instead of a response; streaming
/// callers receive it as the last item of the stream (no `message_end` frame).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// Provider rejected the credentials. The message is always
    /// [`AUTHORIZATION_MESSAGE`] so provider details never leak.
    #[error("{message}")]
    Authorization {
        /// Sanitized message.
        message: String,
    },

    /// Descriptive, recoverable failure raised by the model invocation.
    #[error("{message}")]
    Invoke {
        /// Message as reported by the generation pipeline.
        message: String,
    },

    /// Invalid input detected by the generation pipeline.
    #[error("{message}")]
    InvalidValue {
        /// Message as reported by the generation pipeline.
        message: String,
    },

    /// Anything else, wrapped into an opaque error.
    #[error("{description}")]
    Internal {
        /// Best available description of the failure.
        description: String,
    },

    /// A persistence or model-runtime collaborator failed during finalization.
    #[error("persistence failed: {message}")]
    Persistence {
        /// Collaborator-specific description.
        message: String,
    },
}

impl GenerateError {
    /// Translates a failure carried by an `Error` event into the caller-facing error.
    ///
    /// - authorization failures are sanitized to [`AUTHORIZATION_MESSAGE`];
    /// - invoke and value failures pass through unchanged;
    /// - everything else becomes [`GenerateError::Internal`] carrying the
    ///   failure's description, or its message when there is no description.
    ///
    /// # Example
    /// ```
    /// use taskrelay::{GenerateError, InvokeFailure, FailureKind};
    ///
    /// let failure = InvokeFailure::new(FailureKind::Authorization, "sk-... is revoked");
    /// let err = GenerateError::from_failure(&failure);
    /// assert_eq!(err.to_string(), "Incorrect API key provided");
    /// ```
    pub fn from_failure(failure: &InvokeFailure) -> Self {
        match failure.kind {
            FailureKind::Authorization => GenerateError::Authorization {
                message: AUTHORIZATION_MESSAGE.to_string(),
            },
            FailureKind::Invoke => GenerateError::Invoke {
                message: failure.message.clone(),
            },
            FailureKind::InvalidValue => GenerateError::InvalidValue {
                message: failure.message.clone(),
            },
            FailureKind::Other => GenerateError::Internal {
                description: failure
                    .description
                    .clone()
                    .unwrap_or_else(|| failure.message.clone()),
            },
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            GenerateError::Authorization { .. } => "generate_authorization",
            GenerateError::Invoke { .. } => "generate_invoke",
            GenerateError::InvalidValue { .. } => "generate_invalid_value",
            GenerateError::Internal { .. } => "generate_internal",
            GenerateError::Persistence { .. } => "generate_persistence",
        }
    }

    /// True for errors whose message can be shown to the end user as-is.
    ///
    /// Internal and persistence failures should be rendered generically.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            GenerateError::Authorization { .. }
                | GenerateError::Invoke { .. }
                | GenerateError::InvalidValue { .. }
        )
    }

    pub(crate) fn internal(description: impl Into<String>) -> Self {
        GenerateError::Internal {
            description: description.into(),
        }
    }

    /// Builds a [`GenerateError::Persistence`]; for collaborator implementations.
    pub fn persistence(message: impl Into<String>) -> Self {
        GenerateError::Persistence {
            message: message.into(),
        }
    }
}

impl From<StoreError> for GenerateError {
    fn from(e: StoreError) -> Self {
        GenerateError::Persistence {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_is_sanitized() {
        let failure = InvokeFailure::new(FailureKind::Authorization, "key sk-123 revoked by acme");
        let err = GenerateError::from_failure(&failure);
        assert_eq!(
            err,
            GenerateError::Authorization {
                message: AUTHORIZATION_MESSAGE.into()
            }
        );
        assert!(!err.to_string().contains("sk-123"));
    }

    #[test]
    fn invoke_and_value_pass_through() {
        let invoke = InvokeFailure::new(FailureKind::Invoke, "rate limited");
        assert_eq!(
            GenerateError::from_failure(&invoke).to_string(),
            "rate limited"
        );

        let value = InvokeFailure::new(FailureKind::InvalidValue, "query is required");
        assert_eq!(
            GenerateError::from_failure(&value),
            GenerateError::InvalidValue {
                message: "query is required".into()
            }
        );
    }

    #[test]
    fn unknown_prefers_description() {
        let with_desc =
            InvokeFailure::new(FailureKind::Other, "boom").with_description("upstream closed");
        assert_eq!(
            GenerateError::from_failure(&with_desc).to_string(),
            "upstream closed"
        );

        let bare = InvokeFailure::new(FailureKind::Other, "boom");
        assert_eq!(GenerateError::from_failure(&bare).as_label(), "generate_internal");
        assert_eq!(GenerateError::from_failure(&bare).to_string(), "boom");
    }

    #[test]
    fn cancellation_is_a_control_signal() {
        assert!(PublishError::TaskCancelled.is_cancelled());
        assert!(!PublishError::validation("x").is_cancelled());
    }
}
