//! Collaborator traits and their search adapters.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, warn};

use crate::catalog::{Room, Service, name_matches};
use crate::directory::{ContactPage, SortOrder};
use crate::search::{ResultKind, SearchResult};
use crate::{Error, Result};

/// Server-side filtered tenant directory.
#[async_trait]
pub trait DirectorySearch: Send + Sync {
    /// Searches contacts matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be reached.
    async fn search(&self, query: &str, page_size: u32, sort: SortOrder) -> Result<ContactPage>;
}

/// Full listing of rooms and locations.
#[async_trait]
pub trait RoomCatalog: Send + Sync {
    /// Lists every room.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be reached.
    async fn list_rooms(&self) -> Result<Vec<Room>>;
}

/// Full listing of services and automations.
#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    /// Lists every service.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be reached.
    async fn list_services(&self) -> Result<Vec<Service>>;
}

/// Uniform contract the aggregator fans out over.
#[async_trait]
pub trait ResultSource: Send + Sync {
    /// Kind of results this source produces.
    fn kind(&self) -> ResultKind;

    /// Fetches candidate results for a (trimmed, non-empty) query.
    ///
    /// # Errors
    ///
    /// Returns `Error::SourceUnavailable` (or `AuthenticationRequired`) when
    /// the collaborator fails.
    async fn fetch(&self, query: &str) -> Result<Vec<SearchResult>>;
}

/// Tenant search backed by a [`DirectorySearch`].
pub struct DirectorySource<D> {
    directory: D,
    page_size: u32,
    min_query_len: usize,
}

impl<D: DirectorySearch> DirectorySource<D> {
    /// Creates a directory source.
    ///
    /// Queries shorter than `min_query_len` characters never reach the directory.
    #[must_use]
    pub const fn new(directory: D, page_size: u32, min_query_len: usize) -> Self {
        Self {
            directory,
            page_size,
            min_query_len,
        }
    }
}

#[async_trait]
impl<D: DirectorySearch> ResultSource for DirectorySource<D> {
    fn kind(&self) -> ResultKind {
        ResultKind::Tenant
    }

    async fn fetch(&self, query: &str) -> Result<Vec<SearchResult>> {
        let query = query.trim();
        if query.chars().count() < self.min_query_len {
            return Ok(Vec::new());
        }
        let page = self
            .directory
            .search(query, self.page_size, SortOrder::NameAsc)
            .await?;
        Ok(page.items.into_iter().map(SearchResult::from).collect())
    }
}

/// Room search over a [`RoomCatalog`], filtered client-side by name.
pub struct RoomSource<R> {
    catalog: R,
}

impl<R: RoomCatalog> RoomSource<R> {
    /// Creates a room source.
    #[must_use]
    pub const fn new(catalog: R) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl<R: RoomCatalog> ResultSource for RoomSource<R> {
    fn kind(&self) -> ResultKind {
        ResultKind::Room
    }

    async fn fetch(&self, query: &str) -> Result<Vec<SearchResult>> {
        let rooms = self.catalog.list_rooms().await?;
        Ok(rooms
            .into_iter()
            .filter(|room| name_matches(&room.name, query))
            .map(SearchResult::from)
            .collect())
    }
}

/// Service search over a [`ServiceCatalog`], filtered client-side by name.
pub struct ServiceSource<S> {
    catalog: S,
}

impl<S: ServiceCatalog> ServiceSource<S> {
    /// Creates a service source.
    #[must_use]
    pub const fn new(catalog: S) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl<S: ServiceCatalog> ResultSource for ServiceSource<S> {
    fn kind(&self) -> ResultKind {
        ResultKind::Automation
    }

    async fn fetch(&self, query: &str) -> Result<Vec<SearchResult>> {
        let services = self.catalog.list_services().await?;
        Ok(services
            .into_iter()
            .filter(|service| name_matches(&service.name, query))
            .map(SearchResult::from)
            .collect())
    }
}

#[async_trait]
impl<T: DirectorySearch + ?Sized> DirectorySearch for Arc<T> {
    async fn search(&self, query: &str, page_size: u32, sort: SortOrder) -> Result<ContactPage> {
        (**self).search(query, page_size, sort).await
    }
}

#[async_trait]
impl<T: RoomCatalog + ?Sized> RoomCatalog for Arc<T> {
    async fn list_rooms(&self) -> Result<Vec<Room>> {
        (**self).list_rooms().await
    }
}

#[async_trait]
impl<T: ServiceCatalog + ?Sized> ServiceCatalog for Arc<T> {
    async fn list_services(&self) -> Result<Vec<Service>> {
        (**self).list_services().await
    }
}

/// Outcome of one source within a fan-out.
#[derive(Debug)]
pub struct SourceOutcome {
    /// Which source produced this outcome.
    pub kind: ResultKind,
    /// Results, or why the source contributed nothing.
    pub result: Result<Vec<SearchResult>>,
}

impl SourceOutcome {
    /// Results if the source succeeded, otherwise nothing.
    #[must_use]
    pub fn into_results(self) -> Vec<SearchResult> {
        self.result.unwrap_or_default()
    }
}

/// Runs every source concurrently and waits for all of them.
///
/// Outcomes are returned in source order. A source that errors or exceeds
/// `timeout` yields an `Err` outcome; the others are unaffected.
pub async fn settle_all(
    sources: &[Arc<dyn ResultSource>],
    query: &str,
    timeout: Duration,
) -> Vec<SourceOutcome> {
    let calls = sources.iter().map(|source| {
        let kind = source.kind();
        async move {
            debug!(source = %kind, query, "Querying result source");
            let result = match tokio::time::timeout(timeout, source.fetch(query)).await {
                Ok(Ok(results)) => Ok(results),
                Ok(Err(e)) => Err(e),
                Err(_) => Err(Error::source_unavailable(
                    kind,
                    format!("timed out after {}ms", timeout.as_millis()),
                )),
            };
            if let Err(e) = &result {
                warn!(source = %kind, error = %e, "Result source failed; treating as empty");
            }
            SourceOutcome { kind, result }
        }
    });
    join_all(calls).await
}
