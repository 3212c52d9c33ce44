//! Document storage collaborator.

use std::sync::Arc;

use async_trait::async_trait;

use super::intake::UploadMetadata;
use crate::Result;
use crate::document::{DocumentId, RawDocument, UploadResponse};
use crate::query::DocumentFilter;

/// Remote store holding the mailroom documents and their files.
///
/// Action calls answer with the updated document when the backend sends one
/// back. `None` (or a payload without an id) means the caller has to refresh
/// to learn the new state.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Lists documents, optionally narrowed server-side.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be reached.
    async fn list_documents(&self, filter: Option<&DocumentFilter>) -> Result<Vec<RawDocument>>;

    /// Stores a file with its metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload is rejected.
    async fn upload(
        &self,
        file_name: &str,
        content: Vec<u8>,
        metadata: &UploadMetadata,
    ) -> Result<UploadResponse>;

    /// Sends (or resends) the arrival notification.
    ///
    /// # Errors
    ///
    /// Returns an error if storage refuses the notification.
    async fn notify(&self, id: &DocumentId) -> Result<Option<RawDocument>>;

    /// Records that the recipient viewed the document.
    ///
    /// # Errors
    ///
    /// Returns an error if storage refuses the update.
    async fn mark_viewed(&self, id: &DocumentId) -> Result<Option<RawDocument>>;

    /// Confirms a package pickup with the presented code.
    ///
    /// # Errors
    ///
    /// Returns an error if storage refuses the pickup.
    async fn redeem_pickup(&self, id: &DocumentId, code: &str) -> Result<Option<RawDocument>>;

    /// Associates a recipient with the document.
    ///
    /// # Errors
    ///
    /// Returns an error if storage refuses the update.
    async fn assign_contact(
        &self,
        id: &DocumentId,
        name: &str,
        email: &str,
    ) -> Result<Option<RawDocument>>;

    /// Deletes the document and its file.
    ///
    /// # Errors
    ///
    /// Returns an error if storage refuses the delete. Unknown ids should
    /// answer `Error::DocumentNotFound`.
    async fn delete(&self, id: &DocumentId) -> Result<()>;
}

#[async_trait]
impl<T: DocumentStore + ?Sized> DocumentStore for Arc<T> {
    async fn list_documents(&self, filter: Option<&DocumentFilter>) -> Result<Vec<RawDocument>> {
        (**self).list_documents(filter).await
    }

    async fn upload(
        &self,
        file_name: &str,
        content: Vec<u8>,
        metadata: &UploadMetadata,
    ) -> Result<UploadResponse> {
        (**self).upload(file_name, content, metadata).await
    }

    async fn notify(&self, id: &DocumentId) -> Result<Option<RawDocument>> {
        (**self).notify(id).await
    }

    async fn mark_viewed(&self, id: &DocumentId) -> Result<Option<RawDocument>> {
        (**self).mark_viewed(id).await
    }

    async fn redeem_pickup(&self, id: &DocumentId, code: &str) -> Result<Option<RawDocument>> {
        (**self).redeem_pickup(id, code).await
    }

    async fn assign_contact(
        &self,
        id: &DocumentId,
        name: &str,
        email: &str,
    ) -> Result<Option<RawDocument>> {
        (**self).assign_contact(id, name, email).await
    }

    async fn delete(&self, id: &DocumentId) -> Result<()> {
        (**self).delete(id).await
    }
}
