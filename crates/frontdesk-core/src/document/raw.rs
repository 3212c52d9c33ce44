//! Storage payloads and their normalization into [`Document`].
//!
//! Storage backends disagree on field names (`contactName` vs
//! `recipient_name`, `receivedAt` vs `createdAt`), on id types, and on how
//! statuses are spelled. [`RawDocument`] accepts all of them; [`normalize`]
//! turns one into a `Document` that satisfies the model invariants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::codes::CodeIssuer;
use super::model::{Document, DocumentId, DocumentKind, DocumentStatus, PickupCode};
use crate::{Error, Result};

/// A document as delivered by a storage collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDocument {
    /// String or numeric id.
    #[serde(default, alias = "_id", alias = "documentId", alias = "document_id")]
    pub id: Option<Value>,
    /// Display label.
    #[serde(default, alias = "name", alias = "fileName", alias = "file_name", alias = "subject")]
    pub title: Option<String>,
    /// Recipient name.
    #[serde(
        default,
        alias = "contact_name",
        alias = "recipientName",
        alias = "recipient_name"
    )]
    pub contact_name: Option<String>,
    /// Recipient email.
    #[serde(
        default,
        alias = "contact_email",
        alias = "recipientEmail",
        alias = "recipient_email"
    )]
    pub contact_email: Option<String>,
    /// Intake timestamp.
    #[serde(
        default,
        alias = "received_at",
        alias = "createdAt",
        alias = "created_at",
        alias = "uploadedAt",
        alias = "uploaded_at"
    )]
    pub received_at: Option<DateTime<Utc>>,
    /// Status in any of the accepted spellings.
    #[serde(default)]
    pub status: Option<String>,
    /// Most recent notification.
    #[serde(default, alias = "last_notified_at", alias = "notifiedAt")]
    pub last_notified_at: Option<DateTime<Utc>>,
    /// Notifications sent so far.
    #[serde(default, alias = "notification_count")]
    pub notification_count: Option<u32>,
    /// `mail`/`package` (or `letter`/`parcel`).
    #[serde(default, rename = "type", alias = "kind", alias = "documentType")]
    pub kind: Option<String>,
    /// Pickup code for packages.
    #[serde(default, alias = "pickup_code")]
    pub pickup_code: Option<String>,
    /// Page count; negative values are clamped to zero.
    #[serde(default, alias = "page_count", alias = "pages")]
    pub page_count: Option<i64>,
}

impl RawDocument {
    /// The payload's id as a string, if it carries a usable one.
    #[must_use]
    pub fn id_string(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Returns `true` if this payload identifies a document.
    ///
    /// Storage confirmations without an id are treated as empty.
    #[must_use]
    pub fn is_confirmation(&self) -> bool {
        self.id_string().is_some()
    }
}

impl From<&Document> for RawDocument {
    fn from(doc: &Document) -> Self {
        Self {
            id: Some(Value::String(doc.id().to_string())),
            title: Some(doc.title.clone()),
            contact_name: doc.contact_name.clone(),
            contact_email: doc.contact_email.clone(),
            received_at: Some(doc.received_at()),
            status: Some(doc.status().as_str().to_string()),
            last_notified_at: doc.last_notified_at(),
            notification_count: Some(doc.notification_count()),
            kind: Some(doc.kind().as_str().to_string()),
            pickup_code: doc.pickup_code().map(|c| c.as_str().to_string()),
            page_count: Some(i64::from(doc.page_count)),
        }
    }
}

/// Either one document or several.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    /// A list of documents.
    Many(Vec<RawDocument>),
    /// A single document.
    One(Box<RawDocument>),
}

/// What an upload call may answer with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UploadResponse {
    /// A bare array.
    Many(Vec<RawDocument>),
    /// `{ "documents": ... }`, `{ "data": ... }` or `{ "items": ... }`.
    Envelope {
        /// Wrapped payload.
        #[serde(alias = "data", alias = "items")]
        documents: OneOrMany,
    },
    /// A single object.
    One(Box<RawDocument>),
}

impl UploadResponse {
    /// Flattens the response, dropping entries without an id.
    #[must_use]
    pub fn into_documents(self) -> Vec<RawDocument> {
        let all = match self {
            Self::Many(docs) | Self::Envelope {
                documents: OneOrMany::Many(docs),
            } => docs,
            Self::One(doc) | Self::Envelope {
                documents: OneOrMany::One(doc),
            } => vec![*doc],
        };
        all.into_iter().filter(RawDocument::is_confirmation).collect()
    }
}

/// Turns a storage payload into a document.
///
/// Missing ids and package pickup codes are generated by `issuer`; a missing
/// intake time falls back to `now`. Notification stamps on `New` documents
/// and pickup codes on mail are dropped.
///
/// # Errors
///
/// Returns `Error::Normalization` for unknown statuses or kinds, for mail
/// that claims to have been picked up, and for a pickup code already held by
/// another document.
pub fn normalize(raw: RawDocument, issuer: &mut CodeIssuer, now: DateTime<Utc>) -> Result<Document> {
    let id = match raw.id_string() {
        Some(id) => {
            let id = DocumentId::new(id);
            issuer.reserve_id(&id);
            id
        }
        None => issuer.issue_id(),
    };

    let status = match raw.status.as_deref() {
        None => DocumentStatus::New,
        Some(s) => DocumentStatus::parse(s)
            .ok_or_else(|| Error::Normalization(format!("{id}: unknown status {s:?}")))?,
    };

    let pickup_code = raw
        .pickup_code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(PickupCode::new);

    let kind = match raw.kind.as_deref() {
        Some(s) => DocumentKind::parse(s)
            .ok_or_else(|| Error::Normalization(format!("{id}: unknown type {s:?}")))?,
        None if pickup_code.is_some() => DocumentKind::Package,
        None => DocumentKind::Mail,
    };

    if kind == DocumentKind::Mail && status == DocumentStatus::PickedUp {
        return Err(Error::Normalization(format!(
            "{id}: mail cannot be picked up"
        )));
    }
    // Packages have no viewed state; keep them awaiting pickup.
    let status = if kind == DocumentKind::Package && status == DocumentStatus::Viewed {
        DocumentStatus::Notified
    } else {
        status
    };

    let pickup_code = match kind {
        DocumentKind::Mail => {
            if pickup_code.is_some() {
                warn!(%id, "Dropping pickup code from mail document");
            }
            None
        }
        DocumentKind::Package => Some(match pickup_code {
            Some(code) => {
                if !issuer.reserve_code(&code, &id) {
                    return Err(Error::Normalization(format!(
                        "{id}: pickup code {} already belongs to another document",
                        code.as_str()
                    )));
                }
                code
            }
            None => issuer.issue_code(&id),
        }),
    };

    let (last_notified_at, notification_count) = if status == DocumentStatus::New {
        (None, 0)
    } else {
        let stamped = raw.last_notified_at;
        let count = raw
            .notification_count
            .unwrap_or_else(|| u32::from(stamped.is_some()));
        (stamped, if stamped.is_some() { count.max(1) } else { 0 })
    };

    let title = raw
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "Untitled document".to_string());

    let mut doc = Document {
        id,
        title,
        contact_name: None,
        contact_email: None,
        received_at: raw.received_at.unwrap_or(now),
        status,
        last_notified_at,
        notification_count,
        kind,
        pickup_code,
        page_count: u32::try_from(raw.page_count.unwrap_or(0).max(0)).unwrap_or(u32::MAX),
    };
    doc.set_contact(
        raw.contact_name.unwrap_or_default(),
        raw.contact_email.unwrap_or_default(),
    );
    Ok(doc)
}
