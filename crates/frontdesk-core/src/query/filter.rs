//! Conjunctive document filters.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::document::{Document, DocumentStatus};

/// Status constraint; `All` bypasses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "status")]
pub enum StatusFilter {
    /// Any status.
    #[default]
    All,
    /// Exactly this status.
    Only(DocumentStatus),
}

impl StatusFilter {
    /// Parses `all` or any status spelling accepted by [`DocumentStatus::parse`].
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            Some(Self::All)
        } else {
            DocumentStatus::parse(s).map(Self::Only)
        }
    }

    fn accepts(self, status: DocumentStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

/// Filter set applied to the registry. Every populated field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentFilter {
    /// Status constraint.
    pub status: StatusFilter,
    /// First accepted UTC day of `received_at`, inclusive.
    pub date_from: Option<NaiveDate>,
    /// Last accepted UTC day of `received_at`, inclusive through end of day.
    pub date_to: Option<NaiveDate>,
    /// Case-insensitive substring of the contact name or the title.
    pub name_query: String,
    /// Case-insensitive substring of the contact email.
    pub email_query: String,
}

impl DocumentFilter {
    /// Filter matching everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to one status.
    #[must_use]
    pub const fn with_status(mut self, status: DocumentStatus) -> Self {
        self.status = StatusFilter::Only(status);
        self
    }

    /// Restricts `received_at` to the inclusive day range.
    #[must_use]
    pub const fn with_dates(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    /// Sets the name/title query.
    #[must_use]
    pub fn with_name(mut self, query: impl Into<String>) -> Self {
        self.name_query = query.into();
        self
    }

    /// Sets the email query.
    #[must_use]
    pub fn with_email(mut self, query: impl Into<String>) -> Self {
        self.email_query = query.into();
        self
    }

    /// Returns `true` if no constraint is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status == StatusFilter::All
            && self.date_from.is_none()
            && self.date_to.is_none()
            && self.name_query.trim().is_empty()
            && self.email_query.trim().is_empty()
    }

    /// Returns `true` if `doc` passes every active constraint.
    #[must_use]
    pub fn matches(&self, doc: &Document) -> bool {
        if !self.status.accepts(doc.status()) {
            return false;
        }

        let day = doc.received_at().date_naive();
        if self.date_from.is_some_and(|from| day < from) || self.date_to.is_some_and(|to| day > to) {
            return false;
        }

        let name = self.name_query.trim().to_lowercase();
        if !name.is_empty() {
            let in_contact = doc
                .contact_name
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(&name));
            if !in_contact && !doc.title.to_lowercase().contains(&name) {
                return false;
            }
        }

        let email = self.email_query.trim().to_lowercase();
        if !email.is_empty() {
            return doc
                .contact_email
                .as_deref()
                .is_some_and(|e| e.to_lowercase().contains(&email));
        }

        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn doc(id: &str, title: &str, day: u32) -> Document {
        Document::mail(id, title, Utc.with_ymd_and_hms(2024, 3, day, 18, 30, 0).unwrap())
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn test_name_query_matches_title_case_insensitively() {
        let acme = doc("1", "Registered Mail – ACME Logistics", 1);
        let bank = doc("2", "Bank Statement – Lunar Bank", 1);
        let filter = DocumentFilter::new().with_name("acme");

        assert!(filter.matches(&acme));
        assert!(!filter.matches(&bank));
    }

    #[test]
    fn test_name_query_matches_contact_name() {
        let d = doc("1", "Invoice", 1).with_contact("Grace Hopper", "grace@navy.mil");
        assert!(DocumentFilter::new().with_name("HOPPER").matches(&d));
        assert!(DocumentFilter::new().with_email("NAVY").matches(&d));
        assert!(!DocumentFilter::new().with_email("acme").matches(&d));
    }

    #[test]
    fn test_email_query_requires_a_contact() {
        let d = doc("1", "Invoice", 1);
        assert!(!DocumentFilter::new().with_email("a").matches(&d));
        assert!(DocumentFilter::new().with_email("   ").matches(&d));
    }

    #[test]
    fn test_date_range_is_inclusive_by_day() {
        let d = doc("1", "Invoice", 10);
        assert!(DocumentFilter::new().with_dates(Some(date(10)), Some(date(10))).matches(&d));
        assert!(DocumentFilter::new().with_dates(None, Some(date(10))).matches(&d));
        assert!(!DocumentFilter::new().with_dates(Some(date(11)), None).matches(&d));
        assert!(!DocumentFilter::new().with_dates(None, Some(date(9))).matches(&d));
    }

    #[test]
    fn test_status_filter() {
        let mut d = doc("1", "Invoice", 1);
        assert!(DocumentFilter::new().matches(&d));
        assert!(DocumentFilter::new().with_status(DocumentStatus::New).matches(&d));
        d.status = DocumentStatus::Notified;
        assert!(!DocumentFilter::new().with_status(DocumentStatus::New).matches(&d));
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let d = doc("1", "ACME invoice", 5).with_contact("Ada", "ada@acme.io");
        let filter = DocumentFilter::new()
            .with_name("acme")
            .with_email("ada@")
            .with_dates(Some(date(1)), Some(date(4)));
        assert!(!filter.matches(&d));
        assert!(filter.with_dates(Some(date(1)), Some(date(5))).matches(&d));
    }

    #[test]
    fn test_status_filter_parse() {
        assert_eq!(StatusFilter::parse("ALL"), Some(StatusFilter::All));
        assert_eq!(
            StatusFilter::parse("picked_up"),
            Some(StatusFilter::Only(DocumentStatus::PickedUp))
        );
        assert_eq!(StatusFilter::parse("lost"), None);
    }
}
