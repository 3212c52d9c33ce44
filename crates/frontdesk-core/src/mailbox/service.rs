//! Mailbox model handed to the presentation layer.
//!
//! [`Mailbox`] ties storage, the registry, the lifecycle rules and the query
//! engine together. Actions apply locally first, then confirm with storage:
//! a confirmation is merged over the optimistic copy, an empty confirmation
//! triggers a full refresh, and a failure restores the previous state unless
//! the document has moved on since.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use super::intake::{IntakeRequest, UploadMetadata, validate_intake};
use super::store::DocumentStore;
use crate::config::MailboxConfig;
use crate::directory::Contact;
use crate::document::{
    Document, DocumentId, DocumentRegistry, DownloadLinks, RawDocument, SummaryCounts,
};
use crate::lifecycle::{self, Eligibility};
use crate::query::{DocumentFilter, MailboxQuery, PageView};
use crate::{Error, Result};

/// Everything a mailbox screen renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MailboxView {
    /// Every document, most recent first.
    pub documents: Vec<Document>,
    /// The current page after filtering.
    pub filtered_page: PageView,
    /// Pages implied by the filtered match count.
    pub total_pages: usize,
    /// Counts over the whole registry.
    pub summary_counts: SummaryCounts,
    /// A storage call is outstanding.
    pub is_loading: bool,
    /// Message for the last failed operation.
    pub error: Option<String>,
    /// The last failure asked the user to sign in again.
    pub auth_required: bool,
}

#[derive(Debug)]
struct State {
    registry: DocumentRegistry,
    query: MailboxQuery,
    loading: usize,
    error: Option<String>,
    auth_required: bool,
}

impl State {
    fn fail(&mut self, error: &Error) {
        self.error = Some(error.user_message());
        self.auth_required = error.is_auth_required();
    }

    fn succeed(&mut self) {
        self.error = None;
        self.auth_required = false;
    }
}

/// Counts an outstanding storage call for as long as it lives.
struct Loading<'a>(&'a Mutex<State>);

impl<'a> Loading<'a> {
    fn start(state: &'a Mutex<State>) -> Self {
        state.lock().loading += 1;
        Self(state)
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        let mut state = self.0.lock();
        state.loading = state.loading.saturating_sub(1);
    }
}

/// A local change confirmed with storage afterwards.
enum Change<'a> {
    Notify,
    MarkViewed,
    RedeemPickup(&'a str),
    AssignContact(&'a Contact),
}

impl Change<'_> {
    fn apply(&self, doc: &mut Document, now: DateTime<Utc>) -> Result<()> {
        match self {
            Self::Notify => lifecycle::notify(doc, now),
            Self::MarkViewed => lifecycle::mark_viewed(doc),
            Self::RedeemPickup(code) => lifecycle::redeem_pickup(doc, code),
            Self::AssignContact(contact) => {
                doc.set_contact(contact.name.clone(), contact.email.clone());
                Ok(())
            }
        }
    }
}

/// Stages `change` in the registry, returning the previous and new copies.
fn stage(
    registry: &mut DocumentRegistry,
    id: &DocumentId,
    change: &Change<'_>,
    now: DateTime<Utc>,
) -> Result<(Document, Document)> {
    let previous = registry
        .get(id)
        .cloned()
        .ok_or_else(|| Error::DocumentNotFound(id.clone()))?;
    let staged = registry.update(id, |doc| change.apply(doc, now))?;
    Ok((previous, staged))
}

/// Fills fields the upload response left out from what was sent.
fn backfill(raw: &mut RawDocument, metadata: &UploadMetadata) {
    if raw.title.is_none() {
        raw.title = Some(metadata.title.clone());
    }
    if raw.contact_name.is_none() {
        raw.contact_name.clone_from(&metadata.contact_name);
    }
    if raw.contact_email.is_none() {
        raw.contact_email.clone_from(&metadata.contact_email);
    }
    if raw.kind.is_none() {
        raw.kind = Some(metadata.kind.as_str().to_string());
    }
    if raw.pickup_code.is_none() {
        raw.pickup_code = metadata.pickup_code.as_ref().map(|c| c.as_str().to_string());
    }
    if raw.page_count.is_none() {
        raw.page_count = Some(i64::from(metadata.page_count));
    }
}

/// Mailbox administration model over a [`DocumentStore`].
pub struct Mailbox<S> {
    store: S,
    links: Option<DownloadLinks>,
    state: Mutex<State>,
}

impl<S: DocumentStore> Mailbox<S> {
    /// Creates an empty mailbox; call [`refresh`](Self::refresh) to load it.
    #[must_use]
    pub fn new(store: S, config: &MailboxConfig) -> Self {
        Self {
            store,
            links: None,
            state: Mutex::new(State {
                registry: DocumentRegistry::new(config.pickup_code_len),
                query: MailboxQuery::new(config.page_size),
                loading: 0,
                error: None,
                auth_required: false,
            }),
        }
    }

    /// Resolves download URLs for [`open`](Self::open).
    #[must_use]
    pub fn with_links(mut self, links: DownloadLinks) -> Self {
        self.links = Some(links);
        self
    }

    /// The storage collaborator.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Snapshot of everything a screen needs.
    ///
    /// The stored page is clamped to the range the current filter allows.
    #[must_use]
    pub fn view(&self) -> MailboxView {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let filtered_page = state.query.evaluate_and_clamp(state.registry.documents());
        let documents = state.registry.documents().to_vec();
        let summary_counts = state.registry.summary();

        MailboxView {
            documents,
            total_pages: filtered_page.total_pages,
            filtered_page,
            summary_counts,
            is_loading: state.loading > 0,
            error: state.error.clone(),
            auth_required: state.auth_required,
        }
    }

    /// Current copy of one document.
    #[must_use]
    pub fn document(&self, id: &DocumentId) -> Option<Document> {
        self.state.lock().registry.get(id).cloned()
    }

    /// Which actions are currently accepted for a document.
    #[must_use]
    pub fn eligibility(&self, id: &DocumentId) -> Option<Eligibility> {
        self.state.lock().registry.get(id).map(lifecycle::eligibility)
    }

    /// Active filter.
    #[must_use]
    pub fn filters(&self) -> DocumentFilter {
        self.state.lock().query.filter().clone()
    }

    /// Replaces the filter; a changed filter returns to page 1.
    pub fn set_filters(&self, filter: DocumentFilter) {
        self.state.lock().query.set_filter(filter);
    }

    /// Selects a page (1-based).
    pub fn set_page(&self, page: usize) {
        self.state.lock().query.set_page(page);
    }

    /// Reloads every document from storage.
    ///
    /// Local changes made while the call was outstanding survive it. On
    /// failure the last known documents stay in place.
    ///
    /// # Errors
    ///
    /// Returns the storage error, which is also recorded in the view.
    pub async fn refresh(&self) -> Result<()> {
        let ticket = self.state.lock().registry.begin_refresh();
        let loading = Loading::start(&self.state);
        let listed = self.store.list_documents(None).await;
        drop(loading);

        let mut state = self.state.lock();
        match listed {
            Ok(raws) => {
                let now = Utc::now();
                let mut docs = Vec::with_capacity(raws.len());
                for raw in raws {
                    match state.registry.normalize(raw, now) {
                        Ok(doc) => docs.push(doc),
                        Err(e) => warn!(error = %e, "Skipping document payload"),
                    }
                }
                if state.registry.apply_refresh(ticket, docs) {
                    state.succeed();
                }
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Refresh failed; keeping last known documents");
                state.fail(&e);
                Err(e)
            }
        }
    }

    /// Uploads a file and registers the resulting document(s).
    ///
    /// Returns the registered documents, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` before any upload if the request is
    /// incomplete, or the storage error if the upload fails.
    pub async fn intake(&self, request: IntakeRequest) -> Result<Vec<Document>> {
        if let Err(errors) = validate_intake(&request) {
            let e = Error::Validation(errors);
            self.state.lock().fail(&e);
            return Err(e);
        }

        let (id, pickup_code) = self.state.lock().registry.issue_identity(request.kind);
        let metadata = UploadMetadata::new(&request, id, pickup_code);
        let IntakeRequest {
            file_name, content, ..
        } = request;

        let loading = Loading::start(&self.state);
        let uploaded = self.store.upload(&file_name, content, &metadata).await;
        drop(loading);

        let mut raws = match uploaded {
            Ok(response) => response.into_documents(),
            Err(e) => {
                warn!(error = %e, file = %file_name, "Upload failed");
                self.state.lock().fail(&e);
                return Err(e);
            }
        };

        if raws.is_empty() {
            debug!(file = %file_name, "Upload returned no document; refreshing");
            if let Err(e) = self.refresh().await {
                warn!(error = %e, "Refresh after upload failed");
            }
            return Ok(self.document(&metadata.id).into_iter().collect());
        }

        let single = raws.len() == 1;
        for raw in &mut raws {
            if single || raw.id_string().as_deref() == Some(metadata.id.as_str()) {
                backfill(raw, &metadata);
            }
        }

        let mut state = self.state.lock();
        let ids = state.registry.ingest(raws, Utc::now());
        state.succeed();
        info!(count = ids.len(), file = %file_name, "Intake registered");
        Ok(ids
            .iter()
            .filter_map(|id| state.registry.get(id).cloned())
            .collect())
    }

    /// Notifies the recipient (again, while still `Notified`).
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` once viewed or picked up, or the storage
    /// error after rolling back.
    pub async fn notify(&self, id: &DocumentId) -> Result<Document> {
        self.apply_change(id, Change::Notify).await
    }

    /// Marks a notified mail document as viewed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the document is notified mail, or
    /// the storage error after rolling back.
    pub async fn mark_viewed(&self, id: &DocumentId) -> Result<Document> {
        self.apply_change(id, Change::MarkViewed).await
    }

    /// Redeems a package with the presented pickup code.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` for mail, for collected packages and for a
    /// wrong code, or the storage error after rolling back.
    pub async fn redeem_pickup(&self, id: &DocumentId, code: &str) -> Result<Document> {
        self.apply_change(id, Change::RedeemPickup(code)).await
    }

    /// Backfills the recipient from a directory contact.
    ///
    /// # Errors
    ///
    /// Returns `DocumentNotFound`, or the storage error after rolling back.
    pub async fn assign_contact(&self, id: &DocumentId, contact: &Contact) -> Result<Document> {
        self.apply_change(id, Change::AssignContact(contact)).await
    }

    /// Opens a document, returning its download URL.
    ///
    /// Opening notified mail marks it viewed. A failure to record that is
    /// kept in the view but does not stop the document from opening.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if no download base is set, or
    /// `DocumentNotFound` for unknown ids.
    pub async fn open(&self, id: &DocumentId) -> Result<Url> {
        let Some(links) = &self.links else {
            return Err(Error::Config("no download base URL configured".into()));
        };
        let Some(eligibility) = self.eligibility(id) else {
            return Err(Error::DocumentNotFound(id.clone()));
        };
        if eligibility.mark_viewed {
            if let Err(e) = self.apply_change(id, Change::MarkViewed).await {
                warn!(%id, error = %e, "Could not mark opened document as viewed");
            }
        }
        Ok(links.resolve_download_url(id))
    }

    /// Deletes a document. Unknown ids are a no-op.
    ///
    /// The document leaves the registry immediately and comes back in place
    /// if storage refuses the delete.
    ///
    /// # Errors
    ///
    /// Returns the storage error.
    pub async fn delete(&self, id: &DocumentId) -> Result<()> {
        let removed = {
            let mut state = self.state.lock();
            let index = state.registry.position(id);
            index.zip(state.registry.remove(id))
        };
        let Some((index, doc)) = removed else {
            debug!(%id, "Delete of unknown document ignored");
            return Ok(());
        };

        let loading = Loading::start(&self.state);
        let deleted = self.store.delete(id).await;
        drop(loading);

        let mut state = self.state.lock();
        match deleted {
            Ok(()) | Err(Error::DocumentNotFound(_)) => {
                info!(%id, "Document deleted");
                state.succeed();
                Ok(())
            }
            Err(e) => {
                warn!(%id, error = %e, "Delete failed; restoring document");
                state.registry.restore(index, doc);
                state.fail(&e);
                Err(e)
            }
        }
    }

    async fn apply_change(&self, id: &DocumentId, change: Change<'_>) -> Result<Document> {
        let now = Utc::now();
        let staged = {
            let mut state = self.state.lock();
            let staged = stage(&mut state.registry, id, &change, now);
            if let Err(e) = &staged {
                debug!(%id, error = %e, "Action refused");
                state.fail(e);
            }
            staged
        };
        let (previous, optimistic) = staged?;

        let loading = Loading::start(&self.state);
        let confirmed = self.confirm(id, &change).await;
        drop(loading);

        match confirmed {
            Ok(Some(raw)) if raw.id_string().as_deref() == Some(id.as_str()) => {
                let mut state = self.state.lock();
                state.succeed();
                match state.registry.merge_confirmation(raw, now) {
                    Ok(doc) => Ok(doc),
                    Err(e) => {
                        warn!(%id, error = %e, "Unusable confirmation; keeping local update");
                        Ok(optimistic)
                    }
                }
            }
            Ok(_) => {
                debug!(%id, "Empty confirmation; refreshing");
                if let Err(e) = self.refresh().await {
                    warn!(%id, error = %e, "Refresh after action failed");
                }
                Ok(self.document(id).unwrap_or(optimistic))
            }
            Err(e) => {
                warn!(%id, error = %e, "Storage rejected action; rolling back");
                let mut state = self.state.lock();
                // Anything newer than our own staged copy stays put.
                if state.registry.get(id) == Some(&optimistic) {
                    state.registry.upsert(previous);
                } else {
                    debug!(%id, "Document changed meanwhile; keeping newer state");
                }
                state.fail(&e);
                Err(e)
            }
        }
    }

    async fn confirm(&self, id: &DocumentId, change: &Change<'_>) -> Result<Option<RawDocument>> {
        match change {
            Change::Notify => self.store.notify(id).await,
            Change::MarkViewed => self.store.mark_viewed(id).await,
            Change::RedeemPickup(code) => self.store.redeem_pickup(id, code).await,
            Change::AssignContact(contact) => {
                self.store
                    .assign_contact(id, &contact.name, &contact.email)
                    .await
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::document::{DocumentKind, DocumentStatus, UploadResponse};

    /// Store keeping raw payloads in memory.
    #[derive(Default)]
    struct MemoryStore {
        docs: Mutex<Vec<RawDocument>>,
        fail: AtomicBool,
        echo: AtomicBool,
        partial: AtomicBool,
        calls: AtomicUsize,
    }

    impl MemoryStore {
        fn with(docs: serde_json::Value) -> Self {
            let store = Self::default();
            *store.docs.lock() = serde_json::from_value(docs).unwrap();
            store.echo.store(true, Ordering::SeqCst);
            store
        }

        fn check(&self) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                Err(Error::Storage("backend down".into()))
            } else {
                Ok(())
            }
        }

        fn set_status(&self, id: &DocumentId, status: &str) -> Option<RawDocument> {
            let mut docs = self.docs.lock();
            let doc = docs
                .iter_mut()
                .find(|d| d.id_string().as_deref() == Some(id.as_str()))?;
            doc.status = Some(status.into());
            if status == "notified" {
                doc.last_notified_at = Some(Utc::now());
            }
            let copy = if self.partial.load(Ordering::SeqCst) {
                serde_json::from_value(json!({ "id": id.as_str(), "status": status })).unwrap()
            } else {
                doc.clone()
            };
            drop(docs);
            self.echo.load(Ordering::SeqCst).then_some(copy)
        }
    }

    #[async_trait]
    impl DocumentStore for MemoryStore {
        async fn list_documents(&self, _: Option<&DocumentFilter>) -> Result<Vec<RawDocument>> {
            self.check()?;
            Ok(self.docs.lock().clone())
        }

        async fn upload(&self, _: &str, _: Vec<u8>, metadata: &UploadMetadata) -> Result<UploadResponse> {
            self.check()?;
            let raw: RawDocument = serde_json::from_value(json!({ "id": metadata.id })).unwrap();
            self.docs.lock().insert(0, raw.clone());
            Ok(UploadResponse::One(Box::new(raw)))
        }

        async fn notify(&self, id: &DocumentId) -> Result<Option<RawDocument>> {
            self.check()?;
            Ok(self.set_status(id, "notified"))
        }

        async fn mark_viewed(&self, id: &DocumentId) -> Result<Option<RawDocument>> {
            self.check()?;
            Ok(self.set_status(id, "viewed"))
        }

        async fn redeem_pickup(&self, id: &DocumentId, _: &str) -> Result<Option<RawDocument>> {
            self.check()?;
            Ok(self.set_status(id, "picked_up"))
        }

        async fn assign_contact(&self, id: &DocumentId, name: &str, email: &str) -> Result<Option<RawDocument>> {
            self.check()?;
            let mut docs = self.docs.lock();
            if let Some(doc) = docs.iter_mut().find(|d| d.id_string().as_deref() == Some(id.as_str())) {
                doc.contact_name = Some(name.into());
                doc.contact_email = Some(email.into());
            }
            Ok(None)
        }

        async fn delete(&self, id: &DocumentId) -> Result<()> {
            self.check()?;
            self.docs
                .lock()
                .retain(|d| d.id_string().as_deref() != Some(id.as_str()));
            Ok(())
        }
    }

    fn seeded() -> Mailbox<MemoryStore> {
        let store = MemoryStore::with(json!([
            {
                "id": "m1",
                "title": "Registered Mail – ACME Logistics",
                "status": "new",
                "receivedAt": "2026-01-05T09:00:00Z",
                "contactName": "Ada",
            },
            { "id": "p1", "title": "Parcel", "type": "package", "pickupCode": "A1B2" },
        ]));
        let links = DownloadLinks::new(Url::parse("https://api.example.com/v1/").unwrap()).unwrap();
        Mailbox::new(store, &MailboxConfig::default()).with_links(links)
    }

    #[tokio::test]
    async fn test_refresh_loads_documents_in_server_order() {
        let mailbox = seeded();
        mailbox.refresh().await.unwrap();
        let view = mailbox.view();
        let ids: Vec<&str> = view.documents.iter().map(|d| d.id().as_str()).collect();
        assert_eq!(ids, vec!["m1", "p1"]);
        assert_eq!(view.summary_counts.total, 2);
        assert_eq!(view.total_pages, 1);
        assert!(!view.is_loading);
        assert!(view.error.is_none());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_last_known_documents() {
        let mailbox = seeded();
        mailbox.refresh().await.unwrap();
        mailbox.store().fail.store(true, Ordering::SeqCst);

        assert!(mailbox.refresh().await.is_err());
        let view = mailbox.view();
        assert_eq!(view.documents.len(), 2);
        assert!(view.error.unwrap().contains("mailroom service"));
    }

    #[tokio::test]
    async fn test_notify_applies_server_confirmation() {
        let mailbox = seeded();
        mailbox.refresh().await.unwrap();
        let doc = mailbox.notify(&"m1".into()).await.unwrap();
        assert_eq!(doc.status(), DocumentStatus::Notified);
        assert!(doc.last_notified_at().is_some());
        assert_eq!(mailbox.document(&"m1".into()).unwrap().status(), DocumentStatus::Notified);
    }

    #[tokio::test]
    async fn test_partial_confirmation_keeps_untouched_fields() {
        let mailbox = seeded();
        mailbox.refresh().await.unwrap();
        mailbox.store().partial.store(true, Ordering::SeqCst);
        let before = mailbox.document(&"m1".into()).unwrap();

        let doc = mailbox.notify(&"m1".into()).await.unwrap();
        assert_eq!(doc.status(), DocumentStatus::Notified);
        assert_eq!(doc.received_at(), before.received_at());
        assert_eq!(doc.title, before.title);
        assert_eq!(doc.contact_name.as_deref(), Some("Ada"));
        assert_eq!(doc.notification_count(), 1);
        assert!(doc.last_notified_at().is_some());

        let viewed = mailbox.mark_viewed(&"m1".into()).await.unwrap();
        assert_eq!(viewed.status(), DocumentStatus::Viewed);
        assert_eq!(viewed.received_at(), before.received_at());
    }

    #[tokio::test]
    async fn test_open_marks_notified_mail_viewed() {
        let mailbox = seeded();
        mailbox.refresh().await.unwrap();

        let url = mailbox.open(&"m1".into()).await.unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/mailbox/documents/m1/download");
        assert_eq!(mailbox.document(&"m1".into()).unwrap().status(), DocumentStatus::New);

        mailbox.notify(&"m1".into()).await.unwrap();
        mailbox.open(&"m1".into()).await.unwrap();
        assert_eq!(mailbox.document(&"m1".into()).unwrap().status(), DocumentStatus::Viewed);
    }

    #[tokio::test]
    async fn test_open_leaves_packages_alone() {
        let mailbox = seeded();
        mailbox.refresh().await.unwrap();
        mailbox.notify(&"p1".into()).await.unwrap();
        let calls = mailbox.store().calls.load(Ordering::SeqCst);

        mailbox.open(&"p1".into()).await.unwrap();
        assert_eq!(mailbox.document(&"p1".into()).unwrap().status(), DocumentStatus::Notified);
        assert_eq!(mailbox.store().calls.load(Ordering::SeqCst), calls);

        let err = mailbox.open(&"missing".into()).await.unwrap_err();
        assert!(matches!(err, Error::DocumentNotFound(_)));
    }

    #[tokio::test]
    async fn test_open_without_links_is_a_config_error() {
        let mailbox = Mailbox::new(MemoryStore::default(), &MailboxConfig::default());
        assert!(matches!(
            mailbox.open(&"m1".into()).await.unwrap_err(),
            Error::Config(_)
        ));
    }

    #[tokio::test]
    async fn test_empty_confirmation_falls_back_to_refresh() {
        let mailbox = seeded();
        mailbox.refresh().await.unwrap();
        mailbox.store().echo.store(false, Ordering::SeqCst);
        let before = mailbox.store().calls.load(Ordering::SeqCst);

        let doc = mailbox.notify(&"m1".into()).await.unwrap();
        assert_eq!(doc.status(), DocumentStatus::Notified);
        // notify + list
        assert_eq!(mailbox.store().calls.load(Ordering::SeqCst), before + 2);
    }

    #[tokio::test]
    async fn test_storage_failure_rolls_back_optimistic_change() {
        let mailbox = seeded();
        mailbox.refresh().await.unwrap();
        mailbox.store().fail.store(true, Ordering::SeqCst);

        assert!(mailbox.notify(&"m1".into()).await.is_err());
        let doc = mailbox.document(&"m1".into()).unwrap();
        assert_eq!(doc.status(), DocumentStatus::New);
        assert!(doc.last_notified_at().is_none());
        assert!(mailbox.view().error.is_some());
    }

    #[tokio::test]
    async fn test_refused_transition_never_reaches_storage() {
        let mailbox = seeded();
        mailbox.refresh().await.unwrap();
        let before = mailbox.store().calls.load(Ordering::SeqCst);

        let err = mailbox.mark_viewed(&"m1".into()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidTransition { .. }));
        let err = mailbox.redeem_pickup(&"p1".into(), "ZZZZ").await.unwrap_err();
        assert!(matches!(err, Error::InvalidTransition { .. }));
        assert_eq!(mailbox.store().calls.load(Ordering::SeqCst), before);
    }

    #[tokio::test]
    async fn test_pickup_with_code() {
        let mailbox = seeded();
        mailbox.refresh().await.unwrap();
        let doc = mailbox.redeem_pickup(&"p1".into(), "a1b2").await.unwrap();
        assert_eq!(doc.status(), DocumentStatus::PickedUp);
        assert_eq!(mailbox.view().summary_counts.awaiting_pickup, 0);
        assert!(!mailbox.eligibility(&"p1".into()).unwrap().show_pickup_code);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let mailbox = seeded();
        mailbox.refresh().await.unwrap();
        mailbox.delete(&"m1".into()).await.unwrap();
        let calls = mailbox.store().calls.load(Ordering::SeqCst);

        mailbox.delete(&"m1".into()).await.unwrap();
        assert_eq!(mailbox.store().calls.load(Ordering::SeqCst), calls);
        assert!(mailbox.view().documents.iter().all(|d| d.id().as_str() != "m1"));
    }

    #[tokio::test]
    async fn test_failed_delete_restores_document() {
        let mailbox = seeded();
        mailbox.refresh().await.unwrap();
        mailbox.store().fail.store(true, Ordering::SeqCst);

        assert!(mailbox.delete(&"p1".into()).await.is_err());
        let ids: Vec<String> = mailbox.view().documents.iter().map(|d| d.id().to_string()).collect();
        assert_eq!(ids, vec!["m1", "p1"]);
    }

    #[tokio::test]
    async fn test_invalid_intake_is_rejected_before_upload() {
        let mailbox = seeded();
        let err = mailbox
            .intake(IntakeRequest::new("", Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(ref errors) if errors.len() == 2));
        assert_eq!(mailbox.store().calls.load(Ordering::SeqCst), 0);
        assert!(mailbox.view().error.unwrap().contains("A file is required"));
    }

    #[tokio::test]
    async fn test_intake_backfills_metadata_and_prepends() {
        let mailbox = seeded();
        mailbox.refresh().await.unwrap();
        let request = IntakeRequest::new("parcel.jpg", b"jpeg".to_vec())
            .with_kind(DocumentKind::Package)
            .with_contact(&Contact::new("c1", "Ada Lovelace", "ada@example.com"));

        let docs = mailbox.intake(request).await.unwrap();
        assert_eq!(docs.len(), 1);
        let doc = &docs[0];
        assert_eq!(doc.title, "parcel.jpg");
        assert_eq!(doc.kind(), DocumentKind::Package);
        assert_eq!(doc.pickup_code().unwrap().as_str().len(), 6);
        assert_eq!(doc.contact_email.as_deref(), Some("ada@example.com"));
        assert_eq!(mailbox.view().documents[0].id(), doc.id());
    }

    #[tokio::test]
    async fn test_assign_contact_backfills_recipient() {
        let mailbox = seeded();
        mailbox.refresh().await.unwrap();
        mailbox.store().echo.store(false, Ordering::SeqCst);
        let contact = Contact::new("c9", "Grace Hopper", "grace@example.com");

        let doc = mailbox.assign_contact(&"m1".into(), &contact).await.unwrap();
        assert_eq!(doc.contact_name.as_deref(), Some("Grace Hopper"));
    }

    #[tokio::test]
    async fn test_filters_reset_page() {
        let mailbox = seeded();
        mailbox.refresh().await.unwrap();
        mailbox.set_page(4);
        assert_eq!(mailbox.view().filtered_page.page, 1);

        mailbox.set_filters(DocumentFilter::new().with_name("acme"));
        let view = mailbox.view();
        assert_eq!(view.filtered_page.total_matches, 1);
        assert_eq!(view.filtered_page.items[0].id().as_str(), "m1");
    }
}
