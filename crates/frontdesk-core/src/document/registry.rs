//! In-memory document registry.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::codes::CodeIssuer;
use super::model::{Document, DocumentId, DocumentKind, DocumentStatus, PickupCode};
use super::raw::{RawDocument, normalize};
use crate::{Error, Result};

/// Handle for one full refresh, taken before the storage call is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    seq: u64,
    clock: u64,
}

/// Per-status and per-kind counts over the whole registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryCounts {
    /// All documents.
    pub total: usize,
    /// Status `New`.
    pub new: usize,
    /// Status `Notified`.
    pub notified: usize,
    /// Status `Viewed`.
    pub viewed: usize,
    /// Status `PickedUp`.
    pub picked_up: usize,
    /// Mail documents.
    pub mail: usize,
    /// Package documents.
    pub packages: usize,
    /// Packages not yet picked up.
    pub awaiting_pickup: usize,
}

impl SummaryCounts {
    /// Count for one status.
    #[must_use]
    pub const fn for_status(&self, status: DocumentStatus) -> usize {
        match status {
            DocumentStatus::New => self.new,
            DocumentStatus::Notified => self.notified,
            DocumentStatus::Viewed => self.viewed,
            DocumentStatus::PickedUp => self.picked_up,
        }
    }
}

/// Owns every document the dashboard knows about.
///
/// Documents are kept most-recent-first: intake prepends. All mutation goes
/// through [`upsert`](Self::upsert), [`remove`](Self::remove),
/// [`update`](Self::update) and [`apply_refresh`](Self::apply_refresh).
///
/// Every local mutation advances a clock. A [`RefreshTicket`] remembers the
/// clock at the moment the refresh was requested, so when a slow refresh
/// lands, documents changed or deleted locally in the meantime keep their
/// newer local state.
#[derive(Debug, Clone)]
pub struct DocumentRegistry {
    docs: Vec<Document>,
    issuer: CodeIssuer,
    clock: u64,
    touched: HashMap<DocumentId, u64>,
    removed: HashMap<DocumentId, u64>,
    issued_refreshes: u64,
    applied_refresh: u64,
}

impl DocumentRegistry {
    /// Creates an empty registry issuing pickup codes of `pickup_code_len`.
    #[must_use]
    pub fn new(pickup_code_len: usize) -> Self {
        Self {
            docs: Vec::new(),
            issuer: CodeIssuer::new(pickup_code_len),
            clock: 0,
            touched: HashMap::new(),
            removed: HashMap::new(),
            issued_refreshes: 0,
            applied_refresh: 0,
        }
    }

    /// Number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Returns `true` if the registry holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// All documents, most recent first.
    #[must_use]
    pub fn documents(&self) -> &[Document] {
        &self.docs
    }

    /// Looks up a document.
    #[must_use]
    pub fn get(&self, id: &DocumentId) -> Option<&Document> {
        self.docs.iter().find(|doc| &doc.id == id)
    }

    /// Index of a document in registry order.
    #[must_use]
    pub fn position(&self, id: &DocumentId) -> Option<usize> {
        self.docs.iter().position(|doc| &doc.id == id)
    }

    /// Reserves a fresh id, plus a pickup code when `kind` is a package,
    /// for a document about to be uploaded.
    pub fn issue_identity(&mut self, kind: DocumentKind) -> (DocumentId, Option<PickupCode>) {
        let id = self.issuer.issue_id();
        let code = (kind == DocumentKind::Package).then(|| self.issuer.issue_code(&id));
        (id, code)
    }

    /// Normalizes a storage payload using this registry's id and code issuer.
    ///
    /// A package already known here keeps its pickup code when the payload
    /// omits it.
    ///
    /// # Errors
    ///
    /// Returns `Error::Normalization` if the payload is unusable.
    pub fn normalize(&mut self, mut raw: RawDocument, now: DateTime<Utc>) -> Result<Document> {
        if raw.pickup_code.is_none() {
            raw.pickup_code = raw
                .id_string()
                .and_then(|id| self.get(&DocumentId::new(id)))
                .and_then(Document::pickup_code)
                .map(|code| code.as_str().to_string());
        }
        normalize(raw, &mut self.issuer, now)
    }

    /// Applies a storage confirmation over the document it names.
    ///
    /// Fields the payload omits keep their current values. Intake time, kind
    /// and pickup code never change, and a confirmation reporting an earlier
    /// status than the stored one does not move the document backwards.
    /// Unknown ids are normalized as new documents.
    ///
    /// # Errors
    ///
    /// Returns `Error::Normalization` if the merged payload is unusable; the
    /// stored document is untouched in that case.
    pub fn merge_confirmation(&mut self, raw: RawDocument, now: DateTime<Utc>) -> Result<Document> {
        let current = raw
            .id_string()
            .and_then(|id| self.get(&DocumentId::new(id)))
            .cloned();
        let Some(current) = current else {
            let doc = self.normalize(raw, now)?;
            self.upsert(doc.clone());
            return Ok(doc);
        };

        let mut merged = RawDocument::from(&current);
        if raw.title.is_some() {
            merged.title = raw.title;
        }
        if raw.contact_name.is_some() || raw.contact_email.is_some() {
            merged.contact_name = raw.contact_name;
            merged.contact_email = raw.contact_email;
        }
        if let Some(status) = raw.status.as_deref().and_then(DocumentStatus::parse) {
            if status.rank() >= current.status.rank() {
                merged.status = Some(status.as_str().to_string());
            } else {
                debug!(id = %current.id, %status, "Ignoring confirmation behind local status");
            }
        }
        if raw.last_notified_at.is_some() {
            merged.last_notified_at = raw.last_notified_at;
        }
        if let Some(count) = raw.notification_count {
            merged.notification_count = Some(count.max(current.notification_count));
        }
        if raw.page_count.is_some() {
            merged.page_count = raw.page_count;
        }

        let doc = self.normalize(merged, now)?;
        self.upsert(doc.clone());
        Ok(doc)
    }

    /// Normalizes and upserts a batch, skipping unusable payloads.
    ///
    /// Returns the ids that were stored, in input order.
    pub fn ingest(&mut self, raws: Vec<RawDocument>, now: DateTime<Utc>) -> Vec<DocumentId> {
        let mut ids = Vec::with_capacity(raws.len());
        // Prepend in reverse so the batch keeps its own order at the front.
        let docs: Vec<Document> = raws
            .into_iter()
            .filter_map(|raw| match self.normalize(raw, now) {
                Ok(doc) => Some(doc),
                Err(e) => {
                    warn!(error = %e, "Skipping document payload");
                    None
                }
            })
            .collect();
        for doc in docs.into_iter().rev() {
            ids.push(doc.id.clone());
            self.upsert(doc);
        }
        ids.reverse();
        ids
    }

    /// Inserts a new document at the front, or replaces one in place.
    ///
    /// Returns `true` if the document was new.
    pub fn upsert(&mut self, doc: Document) -> bool {
        let stamp = self.tick();
        self.touched.insert(doc.id.clone(), stamp);
        self.removed.remove(&doc.id);
        if let Some(slot) = self.docs.iter_mut().find(|d| d.id == doc.id) {
            *slot = doc;
            false
        } else {
            debug!(id = %doc.id, "Registering document");
            self.docs.insert(0, doc);
            true
        }
    }

    /// Removes a document; removing an unknown id is a no-op.
    pub fn remove(&mut self, id: &DocumentId) -> Option<Document> {
        let index = self.position(id)?;
        let stamp = self.tick();
        self.touched.remove(id);
        self.removed.insert(id.clone(), stamp);
        Some(self.docs.remove(index))
    }

    /// Puts a removed document back at `index` (clamped to the end).
    ///
    /// Used to undo a local removal that storage refused.
    pub fn restore(&mut self, index: usize, doc: Document) {
        if self.get(&doc.id).is_some() {
            return;
        }
        let stamp = self.tick();
        self.removed.remove(&doc.id);
        self.touched.insert(doc.id.clone(), stamp);
        let index = index.min(self.docs.len());
        self.docs.insert(index, doc);
    }

    /// Applies `change` to a copy of the document and stores it only on success.
    ///
    /// Returns the updated document.
    ///
    /// # Errors
    ///
    /// Returns `Error::DocumentNotFound` for unknown ids, or whatever `change`
    /// returns; the stored document is untouched in both cases.
    pub fn update<F>(&mut self, id: &DocumentId, change: F) -> Result<Document>
    where
        F: FnOnce(&mut Document) -> Result<()>,
    {
        let mut doc = self
            .get(id)
            .cloned()
            .ok_or_else(|| Error::DocumentNotFound(id.clone()))?;
        change(&mut doc)?;
        self.upsert(doc.clone());
        Ok(doc)
    }

    /// Takes a ticket for a full refresh about to be requested.
    pub const fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued_refreshes += 1;
        RefreshTicket {
            seq: self.issued_refreshes,
            clock: self.clock,
        }
    }

    /// Replaces the registry contents with a refresh result.
    ///
    /// The refresh is discarded if a newer one was already applied. Otherwise
    /// documents in `docs` replace the registry, except that anything
    /// upserted or removed locally after the ticket was issued wins over the
    /// refreshed copy. Returns `false` if the refresh was discarded.
    pub fn apply_refresh(&mut self, ticket: RefreshTicket, docs: Vec<Document>) -> bool {
        if ticket.seq < self.applied_refresh {
            warn!(
                seq = ticket.seq,
                applied = self.applied_refresh,
                "Discarding stale refresh"
            );
            return false;
        }
        self.applied_refresh = ticket.seq;

        let newer_than_ticket = |stamps: &HashMap<DocumentId, u64>, id: &DocumentId| {
            stamps.get(id).is_some_and(|&stamp| stamp > ticket.clock)
        };

        let mut local: HashMap<DocumentId, Document> =
            std::mem::take(&mut self.docs).into_iter().map(|d| (d.id.clone(), d)).collect();
        let mut local_order: Vec<DocumentId> = Vec::new();
        let mut seen: HashSet<DocumentId> = HashSet::new();
        let mut next = Vec::with_capacity(docs.len());

        for doc in docs {
            if !seen.insert(doc.id.clone()) || newer_than_ticket(&self.removed, &doc.id) {
                continue;
            }
            if newer_than_ticket(&self.touched, &doc.id) {
                if let Some(kept) = local.remove(&doc.id) {
                    debug!(id = %doc.id, "Keeping locally updated document over refresh");
                    next.push(kept);
                    continue;
                }
            }
            next.push(doc);
        }

        // Documents added locally after the ticket that storage did not list yet.
        for id in self.docs_in_touch_order(&local) {
            if !seen.contains(&id) && newer_than_ticket(&self.touched, &id) {
                local_order.push(id);
            }
        }
        let mut fresh: Vec<Document> = local_order
            .into_iter()
            .filter_map(|id| local.remove(&id))
            .collect();
        fresh.append(&mut next);
        self.docs = fresh;

        self.touched.retain(|_, stamp| *stamp > ticket.clock);
        self.removed.retain(|_, stamp| *stamp > ticket.clock);
        info!(count = self.docs.len(), "Registry refreshed");
        true
    }

    /// Replaces everything without any staleness checks.
    pub fn replace_all(&mut self, docs: Vec<Document>) {
        self.touched.clear();
        self.removed.clear();
        let ticket = self.begin_refresh();
        self.apply_refresh(ticket, docs);
    }

    /// Counts documents by status and kind.
    #[must_use]
    pub fn summary(&self) -> SummaryCounts {
        let mut counts = SummaryCounts {
            total: self.docs.len(),
            ..SummaryCounts::default()
        };
        for doc in &self.docs {
            match doc.status {
                DocumentStatus::New => counts.new += 1,
                DocumentStatus::Notified => counts.notified += 1,
                DocumentStatus::Viewed => counts.viewed += 1,
                DocumentStatus::PickedUp => counts.picked_up += 1,
            }
            match doc.kind {
                DocumentKind::Mail => counts.mail += 1,
                DocumentKind::Package => {
                    counts.packages += 1;
                    if doc.status != DocumentStatus::PickedUp {
                        counts.awaiting_pickup += 1;
                    }
                }
            }
        }
        counts
    }

    /// Ids of `local` ordered newest touch first.
    fn docs_in_touch_order(&self, local: &HashMap<DocumentId, Document>) -> Vec<DocumentId> {
        let mut ids: Vec<DocumentId> = local.keys().cloned().collect();
        ids.sort_by_key(|id| std::cmp::Reverse(self.touched.get(id).copied().unwrap_or(0)));
        ids
    }

    const fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

impl Default for DocumentRegistry {
    fn default() -> Self {
        Self::new(crate::config::MailboxConfig::default().pickup_code_len)
    }
}
