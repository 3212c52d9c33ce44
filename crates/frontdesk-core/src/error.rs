//! Error types for the core library.

use thiserror::Error;

use crate::document::{DocumentId, DocumentStatus};
use crate::lifecycle::Action;
use crate::mailbox::ValidationError;
use crate::search::ResultKind;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A result source or collaborator could not be reached or answered badly.
    #[error("{source_name} unavailable: {reason}")]
    SourceUnavailable {
        /// Name of the failing source.
        source_name: String,
        /// What went wrong (network error, status code, timeout).
        reason: String,
    },

    /// A lifecycle action was attempted against a document whose status forbids it.
    #[error("cannot {action} document {id} ({status}): {reason}")]
    InvalidTransition {
        /// Document the action targeted.
        id: DocumentId,
        /// Status at the time of the attempt.
        status: DocumentStatus,
        /// The refused action.
        action: Action,
        /// Which precondition failed.
        reason: &'static str,
    },

    /// The collaborator rejected our credentials; the user must sign in again.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Intake metadata failed validation.
    #[error("Validation failed: {}", join_messages(.0))]
    Validation(Vec<ValidationError>),

    /// No document with this id is in the registry.
    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),

    /// A source payload could not be turned into a document.
    #[error("Invalid document payload: {0}")]
    Normalization(String),

    /// Document storage rejected an operation.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl Error {
    /// Creates a `SourceUnavailable` error for one of the search sources.
    #[must_use]
    pub fn source_unavailable(kind: ResultKind, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            source_name: kind.source_name().to_string(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if the user has to sign in again before retrying.
    #[must_use]
    pub const fn is_auth_required(&self) -> bool {
        matches!(self, Self::AuthenticationRequired)
    }

    /// Message shown to the user in place of a generic failure banner.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthenticationRequired => "Your session has expired. Please sign in again.".into(),
            Self::SourceUnavailable { .. } | Self::Storage(_) => {
                format!("Could not reach the mailroom service ({self})")
            }
            other => other.to_string(),
        }
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ValidationError::message)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_every_error() {
        let err = Error::Validation(vec![
            ValidationError::MissingFileName,
            ValidationError::InvalidContactEmail,
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: A file is required, Contact email address is invalid"
        );
    }

    #[test]
    fn test_auth_required_is_distinguished() {
        assert!(Error::AuthenticationRequired.is_auth_required());
        assert!(!Error::Storage("boom".into()).is_auth_required());
        assert!(
            Error::AuthenticationRequired
                .user_message()
                .contains("sign in")
        );
    }

    #[test]
    fn test_source_unavailable_names_the_source() {
        let err = Error::source_unavailable(ResultKind::Room, "timed out");
        assert_eq!(err.to_string(), "room catalog unavailable: timed out");
    }
}
