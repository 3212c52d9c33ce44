//! Error types for the HTTP collaborators.

use std::io;

use frontdesk_core::ResultKind;

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// API error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error (reading a file to upload).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// HTTP request error (connect, timeout, body).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The backend rejected the token (401/403).
    #[error("Unauthorized")]
    Unauthorized,

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Creates a status error, keeping at most 200 characters of the body.
    #[must_use]
    pub fn status(status: u16, body: &str) -> Self {
        if status == 401 || status == 403 {
            return Self::Unauthorized;
        }
        Self::Status {
            status,
            body: body.trim().chars().take(200).collect(),
        }
    }

    /// Returns `true` for a 404 answer.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }

    /// Converts into the core error for a failing search source.
    #[must_use]
    pub fn into_source_error(self, kind: ResultKind) -> frontdesk_core::Error {
        match self {
            Self::Unauthorized => frontdesk_core::Error::AuthenticationRequired,
            other => frontdesk_core::Error::source_unavailable(kind, other.to_string()),
        }
    }
}

impl From<Error> for frontdesk_core::Error {
    fn from(error: Error) -> Self {
        match error {
            Error::Unauthorized => Self::AuthenticationRequired,
            Error::Json(e) => Self::Serde(e),
            Error::InvalidConfig(msg) => Self::Config(msg),
            other => Self::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_statuses_become_unauthorized() {
        assert!(matches!(Error::status(401, ""), Error::Unauthorized));
        assert!(matches!(Error::status(403, "nope"), Error::Unauthorized));
        let core: frontdesk_core::Error = Error::status(401, "").into();
        assert!(core.is_auth_required());
    }

    #[test]
    fn test_status_body_is_truncated() {
        let long = "x".repeat(1000);
        let Error::Status { status, body } = Error::status(502, &long) else {
            panic!("expected status error");
        };
        assert_eq!(status, 502);
        assert_eq!(body.len(), 200);
    }

    #[test]
    fn test_source_errors_name_the_source() {
        let err = Error::status(503, "maintenance").into_source_error(ResultKind::Automation);
        assert_eq!(
            err.to_string(),
            "service catalog unavailable: HTTP 503: maintenance"
        );
        let auth = Error::Unauthorized.into_source_error(ResultKind::Tenant);
        assert!(auth.is_auth_required());
    }

    #[test]
    fn test_not_found() {
        assert!(Error::status(404, "").is_not_found());
        assert!(!Error::status(500, "").is_not_found());
    }
}
