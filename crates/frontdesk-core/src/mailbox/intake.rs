//! Intake requests and their validation.

use serde::Serialize;

use crate::directory::Contact;
use crate::document::{DocumentId, DocumentKind, PickupCode};

/// Validation error for an intake request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No file name was given.
    MissingFileName,
    /// The uploaded file has no content.
    EmptyFile,
    /// The contact email address is malformed.
    InvalidContactEmail,
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::MissingFileName => "A file is required",
            Self::EmptyFile => "The selected file is empty",
            Self::InvalidContactEmail => "Contact email address is invalid",
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::MissingFileName | Self::EmptyFile => "file",
            Self::InvalidContactEmail => "contact_email",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Result of validating an intake request.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A document about to be registered from an uploaded file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntakeRequest {
    /// Name of the uploaded file.
    pub file_name: String,
    /// File content.
    pub content: Vec<u8>,
    /// Display title; defaults to the file name.
    pub title: Option<String>,
    /// Mail or package.
    pub kind: DocumentKind,
    /// Recipient name, selected or typed.
    pub contact_name: Option<String>,
    /// Recipient email, selected or typed.
    pub contact_email: Option<String>,
    /// Number of scanned pages.
    pub page_count: u32,
}

impl IntakeRequest {
    /// Creates a mail intake for `file_name`.
    #[must_use]
    pub fn new(file_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content,
            ..Self::default()
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the document kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: DocumentKind) -> Self {
        self.kind = kind;
        self
    }

    /// Uses a contact picked from the directory.
    #[must_use]
    pub fn with_contact(self, contact: &Contact) -> Self {
        self.with_typed_contact(contact.name.clone(), contact.email.clone())
    }

    /// Uses a contact typed in by hand.
    #[must_use]
    pub fn with_typed_contact(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.contact_name = Some(name.into());
        self.contact_email = Some(email.into());
        self
    }

    /// Sets the page count.
    #[must_use]
    pub const fn with_page_count(mut self, page_count: u32) -> Self {
        self.page_count = page_count;
        self
    }

    /// Title to store: the given one, or the file name.
    #[must_use]
    pub fn resolved_title(&self) -> String {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| self.file_name.trim())
            .to_string()
    }
}

/// Metadata sent to storage alongside the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadMetadata {
    /// Id reserved for the new document.
    pub id: DocumentId,
    /// Display title.
    pub title: String,
    /// `mail` or `package`.
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    /// Recipient name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    /// Recipient email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    /// Number of scanned pages.
    pub page_count: u32,
    /// Pickup code reserved for a package.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_code: Option<PickupCode>,
}

impl UploadMetadata {
    /// Builds the metadata for a validated request.
    #[must_use]
    pub fn new(request: &IntakeRequest, id: DocumentId, pickup_code: Option<PickupCode>) -> Self {
        let clean = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Self {
            id,
            title: request.resolved_title(),
            kind: request.kind,
            contact_name: clean(request.contact_name.as_deref()),
            contact_email: clean(request.contact_email.as_deref()),
            page_count: request.page_count,
            pickup_code,
        }
    }
}

/// Validate an intake request before anything is uploaded.
///
/// # Errors
///
/// Returns every `ValidationError` found.
pub fn validate_intake(request: &IntakeRequest) -> ValidationResult {
    let mut errors = Vec::new();

    if request.file_name.trim().is_empty() {
        errors.push(ValidationError::MissingFileName);
    }
    if request.content.is_empty() {
        errors.push(ValidationError::EmptyFile);
    }
    if let Some(email) = request.contact_email.as_deref().filter(|e| !e.trim().is_empty()) {
        if !is_valid_email(email) {
            errors.push(ValidationError::InvalidContactEmail);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Basic email validation.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.trim().split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    // Domain needs at least two non-empty labels
    domain.contains('.') && domain.split('.').all(|label| !label.is_empty())
}
