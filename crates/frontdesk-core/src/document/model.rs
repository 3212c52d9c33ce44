//! Document models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque document identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wraps an existing id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// What kind of item arrived at the front desk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// A letter or scanned mail item.
    #[default]
    Mail,
    /// A physical parcel awaiting collection.
    Package,
}

impl DocumentKind {
    /// Parses the loose spellings used by storage payloads.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "mail" | "letter" | "document" | "scan" => Some(Self::Mail),
            "package" | "parcel" => Some(Self::Package),
            _ => None,
        }
    }

    /// Lowercase label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mail => "mail",
            Self::Package => "package",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a document.
///
/// Mail moves `New → Notified → Viewed`; packages move
/// `New → Notified → PickedUp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Just received; nobody has been told yet.
    #[default]
    New,
    /// The recipient has been notified.
    Notified,
    /// The recipient has looked at the (mail) document.
    Viewed,
    /// The package was collected with its pickup code.
    PickedUp,
}

impl DocumentStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 4] = [Self::New, Self::Notified, Self::Viewed, Self::PickedUp];

    /// Position in the lifecycle; `Viewed` and `PickedUp` are parallel end states.
    #[must_use]
    pub const fn rank(&self) -> u8 {
        match self {
            Self::New => 0,
            Self::Notified => 1,
            Self::Viewed | Self::PickedUp => 2,
        }
    }

    /// Returns `true` for `Viewed` and `PickedUp`.
    #[must_use]
    pub const fn is_final(&self) -> bool {
        self.rank() == 2
    }

    /// Parses the loose spellings used by storage payloads.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "new" | "received" | "pending" => Some(Self::New),
            "notified" | "sent" => Some(Self::Notified),
            "viewed" | "read" | "opened" => Some(Self::Viewed),
            "pickedup" | "collected" | "redeemed" => Some(Self::PickedUp),
            _ => None,
        }
    }

    /// Convert to the storage string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Notified => "notified",
            Self::Viewed => "viewed",
            Self::PickedUp => "picked_up",
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Short token that releases a package to its recipient.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PickupCode(String);

impl PickupCode {
    /// Wraps a code, trimming and uppercasing it.
    #[must_use]
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_ascii_uppercase())
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if a presented code redeems this one.
    ///
    /// Surrounding whitespace and ASCII case are ignored.
    #[must_use]
    pub fn matches(&self, presented: &str) -> bool {
        let presented = presented.trim();
        !presented.is_empty() && self.0.eq_ignore_ascii_case(presented)
    }
}

impl std::fmt::Display for PickupCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One piece of incoming mail or a package.
///
/// Status, notification stamps and the pickup code are only changed through
/// the lifecycle functions, which keep the invariants intact:
/// a pickup code exists exactly for packages, only packages reach `PickedUp`,
/// and `last_notified_at` is unset while the document is `New`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub(crate) id: DocumentId,
    /// Display label.
    pub title: String,
    /// Recipient name, if known.
    pub contact_name: Option<String>,
    /// Recipient email, if known.
    pub contact_email: Option<String>,
    pub(crate) received_at: DateTime<Utc>,
    pub(crate) status: DocumentStatus,
    pub(crate) last_notified_at: Option<DateTime<Utc>>,
    pub(crate) notification_count: u32,
    #[serde(rename = "type")]
    pub(crate) kind: DocumentKind,
    pub(crate) pickup_code: Option<PickupCode>,
    /// Number of scanned pages.
    pub page_count: u32,
}

impl Document {
    /// Creates a new mail document.
    #[must_use]
    pub fn mail(id: impl Into<DocumentId>, title: impl Into<String>, received_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            contact_name: None,
            contact_email: None,
            received_at,
            status: DocumentStatus::New,
            last_notified_at: None,
            notification_count: 0,
            kind: DocumentKind::Mail,
            pickup_code: None,
            page_count: 0,
        }
    }

    /// Creates a new package document with its pickup code.
    #[must_use]
    pub fn package(
        id: impl Into<DocumentId>,
        title: impl Into<String>,
        received_at: DateTime<Utc>,
        pickup_code: PickupCode,
    ) -> Self {
        Self {
            kind: DocumentKind::Package,
            pickup_code: Some(pickup_code),
            ..Self::mail(id, title, received_at)
        }
    }

    /// Sets the recipient.
    #[must_use]
    pub fn with_contact(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.set_contact(name, email);
        self
    }

    /// Sets the page count.
    #[must_use]
    pub const fn with_page_count(mut self, page_count: u32) -> Self {
        self.page_count = page_count;
        self
    }

    /// Backfills the recipient; empty values clear the field.
    pub fn set_contact(&mut self, name: impl Into<String>, email: impl Into<String>) {
        self.contact_name = non_empty(name.into());
        self.contact_email = non_empty(email.into());
    }

    /// Document id.
    #[must_use]
    pub const fn id(&self) -> &DocumentId {
        &self.id
    }

    /// When the document was received.
    #[must_use]
    pub const fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    /// Current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> DocumentStatus {
        self.status
    }

    /// Most recent notification, if any.
    #[must_use]
    pub const fn last_notified_at(&self) -> Option<DateTime<Utc>> {
        self.last_notified_at
    }

    /// How many notifications have been sent.
    #[must_use]
    pub const fn notification_count(&self) -> u32 {
        self.notification_count
    }

    /// Mail or package.
    #[must_use]
    pub const fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Pickup code (packages only).
    #[must_use]
    pub const fn pickup_code(&self) -> Option<&PickupCode> {
        self.pickup_code.as_ref()
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_loose_spellings() {
        assert_eq!(DocumentStatus::parse("NEW"), Some(DocumentStatus::New));
        assert_eq!(DocumentStatus::parse("picked_up"), Some(DocumentStatus::PickedUp));
        assert_eq!(DocumentStatus::parse("pickedUp"), Some(DocumentStatus::PickedUp));
        assert_eq!(DocumentStatus::parse("Picked Up"), Some(DocumentStatus::PickedUp));
        assert_eq!(DocumentStatus::parse("collected"), Some(DocumentStatus::PickedUp));
        assert_eq!(DocumentStatus::parse("archived"), None);
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!(DocumentKind::parse("Parcel"), Some(DocumentKind::Package));
        assert_eq!(DocumentKind::parse("letter"), Some(DocumentKind::Mail));
        assert_eq!(DocumentKind::parse("crate"), None);
    }

    #[test]
    fn test_status_rank_is_monotonic() {
        assert!(DocumentStatus::New.rank() < DocumentStatus::Notified.rank());
        assert!(DocumentStatus::Notified.rank() < DocumentStatus::Viewed.rank());
        assert_eq!(DocumentStatus::Viewed.rank(), DocumentStatus::PickedUp.rank());
    }

    #[test]
    fn test_pickup_code_matching() {
        let code = PickupCode::new("A1B2");
        assert!(code.matches("A1B2"));
        assert!(code.matches(" a1b2 "));
        assert!(!code.matches("A1B3"));
        assert!(!code.matches(""));
    }

    #[test]
    fn test_contact_backfill_trims_and_clears() {
        let mut doc = Document::mail("d1", "Invoice", Utc::now());
        doc.set_contact("  Ada Lovelace ", "ada@example.com");
        assert_eq!(doc.contact_name.as_deref(), Some("Ada Lovelace"));

        doc.set_contact("", " ");
        assert!(doc.contact_name.is_none());
        assert!(doc.contact_email.is_none());
    }

    #[test]
    fn test_package_constructor_sets_code() {
        let doc = Document::package("p1", "Parcel", Utc::now(), PickupCode::new("x9y8"));
        assert_eq!(doc.kind(), DocumentKind::Package);
        assert_eq!(doc.pickup_code().map(PickupCode::as_str), Some("X9Y8"));
        assert_eq!(doc.status(), DocumentStatus::New);
    }
}
