//! HTTP client implementing every core collaborator.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use frontdesk_core::mailbox::UploadMetadata;
use frontdesk_core::{
    ContactPage, DirectorySearch, DocumentFilter, DocumentId, DocumentStore, DownloadLinks,
    RawDocument, ResultKind, Room, RoomCatalog, Service, ServiceCatalog, SortOrder, StatusFilter,
    UploadResponse,
};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// A listing answered either as a bare array or wrapped in an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Bare(Vec<T>),
    Wrapped {
        #[serde(alias = "data", alias = "documents", alias = "results")]
        items: Vec<T>,
    },
}

impl<T> Listing<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Wrapped { items } => items,
        }
    }
}

/// Parses an action confirmation; empty bodies and id-less payloads yield `None`.
///
/// # Errors
///
/// Returns an error if the body is present but not JSON.
pub fn parse_confirmation(body: &str) -> Result<Option<RawDocument>> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let response: UploadResponse = serde_json::from_str(body)?;
    Ok(response.into_documents().into_iter().next())
}

/// Reads a file from disk for upload, returning its name and bytes.
///
/// # Errors
///
/// Returns an error if the file cannot be read or has no file name.
pub async fn read_upload(path: &Path) -> Result<(String, Vec<u8>)> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::InvalidConfig(format!("{} has no file name", path.display())))?
        .to_string();
    let content = tokio::fs::read(path).await?;
    Ok((name, content))
}

/// Client for the dashboard backend.
///
/// All endpoints live under one base URL; requests carry the bearer token
/// when one is configured.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: Url,
    token: Option<String>,
    http: reqwest::Client,
    links: DownloadLinks,
}

impl ApiClient {
    /// Creates a client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url)?;
        let links =
            DownloadLinks::new(base.clone()).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("frontdesk/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base,
            token: token.filter(|t| !t.trim().is_empty()),
            http,
            links,
        })
    }

    /// Base URL.
    #[must_use]
    pub const fn base(&self) -> &Url {
        &self.base
    }

    /// Download link resolver rooted at the base URL.
    #[must_use]
    pub const fn links(&self) -> &DownloadLinks {
        &self.links
    }

    /// Download URL for a stored document. Pure; no request is made.
    #[must_use]
    pub fn download_url(&self, id: &DocumentId) -> Url {
        self.links.resolve_download_url(id)
    }

    /// `base/<segments...>`, each segment percent-encoded.
    #[must_use]
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Directory search URL.
    #[must_use]
    pub fn contacts_url(&self, query: &str, page_size: u32, sort: SortOrder) -> Url {
        let mut url = self.endpoint(&["contacts"]);
        url.query_pairs_mut()
            .append_pair("search", query)
            .append_pair("pageSize", &page_size.to_string())
            .append_pair("sort", sort.as_str());
        url
    }

    /// Document listing URL with the filter as query parameters.
    #[must_use]
    pub fn documents_url(&self, filter: Option<&DocumentFilter>) -> Url {
        let mut url = self.endpoint(&["mailbox", "documents"]);
        let Some(filter) = filter.filter(|f| !f.is_empty()) else {
            return url;
        };
        {
            let mut pairs = url.query_pairs_mut();
            if let StatusFilter::Only(status) = filter.status {
                pairs.append_pair("status", status.as_str());
            }
            if let Some(from) = filter.date_from {
                pairs.append_pair("dateFrom", &from.to_string());
            }
            if let Some(to) = filter.date_to {
                pairs.append_pair("dateTo", &to.to_string());
            }
            if !filter.name_query.trim().is_empty() {
                pairs.append_pair("name", filter.name_query.trim());
            }
            if !filter.email_query.trim().is_empty() {
                pairs.append_pair("email", filter.email_query.trim());
            }
        }
        url
    }

    /// URL of one document, optionally followed by an action segment.
    #[must_use]
    pub fn document_url(&self, id: &DocumentId, action: Option<&str>) -> Url {
        match action {
            Some(action) => self.endpoint(&["mailbox", "documents", id.as_str(), action]),
            None => self.endpoint(&["mailbox", "documents", id.as_str()]),
        }
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "API request");
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::status(status.as_u16(), &body))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.send(self.request(Method::GET, url)).await?;
        Ok(response.json().await?)
    }

    async fn confirm(&self, builder: RequestBuilder) -> Result<Option<RawDocument>> {
        let response = self.send(builder).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let body = response.text().await?;
        parse_confirmation(&body)
    }
}

#[async_trait]
impl DirectorySearch for ApiClient {
    async fn search(
        &self,
        query: &str,
        page_size: u32,
        sort: SortOrder,
    ) -> frontdesk_core::Result<ContactPage> {
        self.get_json(self.contacts_url(query, page_size, sort))
            .await
            .map_err(|e| e.into_source_error(ResultKind::Tenant))
    }
}

#[async_trait]
impl RoomCatalog for ApiClient {
    async fn list_rooms(&self) -> frontdesk_core::Result<Vec<Room>> {
        self.get_json::<Listing<Room>>(self.endpoint(&["rooms"]))
            .await
            .map(Listing::into_vec)
            .map_err(|e| e.into_source_error(ResultKind::Room))
    }
}

#[async_trait]
impl ServiceCatalog for ApiClient {
    async fn list_services(&self) -> frontdesk_core::Result<Vec<Service>> {
        self.get_json::<Listing<Service>>(self.endpoint(&["services"]))
            .await
            .map(Listing::into_vec)
            .map_err(|e| e.into_source_error(ResultKind::Automation))
    }
}

#[async_trait]
impl DocumentStore for ApiClient {
    async fn list_documents(
        &self,
        filter: Option<&DocumentFilter>,
    ) -> frontdesk_core::Result<Vec<RawDocument>> {
        let listing: Listing<RawDocument> = self.get_json(self.documents_url(filter)).await?;
        Ok(listing.into_vec())
    }

    async fn upload(
        &self,
        file_name: &str,
        content: Vec<u8>,
        metadata: &UploadMetadata,
    ) -> frontdesk_core::Result<UploadResponse> {
        let metadata = serde_json::to_string(metadata)?;
        let file = reqwest::multipart::Part::bytes(content).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new()
            .part("file", file)
            .text("metadata", metadata);
        let builder = self
            .request(Method::POST, self.endpoint(&["mailbox", "documents"]))
            .multipart(form);
        let response = self.send(builder).await?;
        let body = response.text().await.map_err(Error::from)?;
        if body.trim().is_empty() {
            return Ok(UploadResponse::Many(Vec::new()));
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn notify(&self, id: &DocumentId) -> frontdesk_core::Result<Option<RawDocument>> {
        let url = self.document_url(id, Some("notify"));
        Ok(self.confirm(self.request(Method::POST, url)).await?)
    }

    async fn mark_viewed(&self, id: &DocumentId) -> frontdesk_core::Result<Option<RawDocument>> {
        let url = self.document_url(id, Some("viewed"));
        Ok(self.confirm(self.request(Method::POST, url)).await?)
    }

    async fn redeem_pickup(
        &self,
        id: &DocumentId,
        code: &str,
    ) -> frontdesk_core::Result<Option<RawDocument>> {
        let url = self.document_url(id, Some("pickup"));
        let builder = self
            .request(Method::POST, url)
            .json(&json!({ "code": code.trim() }));
        Ok(self.confirm(builder).await?)
    }

    async fn assign_contact(
        &self,
        id: &DocumentId,
        name: &str,
        email: &str,
    ) -> frontdesk_core::Result<Option<RawDocument>> {
        let builder = self
            .request(Method::PATCH, self.document_url(id, None))
            .json(&json!({ "contactName": name, "contactEmail": email }));
        Ok(self.confirm(builder).await?)
    }

    async fn delete(&self, id: &DocumentId) -> frontdesk_core::Result<()> {
        match self
            .send(self.request(Method::DELETE, self.document_url(id, None)))
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => Err(frontdesk_core::Error::DocumentNotFound(id.clone())),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use frontdesk_core::DocumentStatus;
    use tokio_test::{assert_err, assert_ok};

    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Some("secret".into()), DEFAULT_TIMEOUT).unwrap()
    }

    #[test]
    fn test_rejects_unusable_base_urls() {
        assert_err!(ApiClient::new("not a url", None, DEFAULT_TIMEOUT));
        assert_err!(ApiClient::new("mailto:desk@example.com", None, DEFAULT_TIMEOUT));
        assert_ok!(ApiClient::new("https://api.example.com/v1", None, DEFAULT_TIMEOUT));
    }

    #[test]
    fn test_contacts_url_encodes_query() {
        let url = client("https://api.example.com/v1/").contacts_url("Müller & Co", 10, SortOrder::NameAsc);
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v1/contacts?search=M%C3%BCller+%26+Co&pageSize=10&sort=name_asc"
        );
    }

    #[test]
    fn test_documents_url_carries_filter() {
        let api = client("https://api.example.com");
        assert_eq!(
            api.documents_url(None).as_str(),
            "https://api.example.com/mailbox/documents"
        );

        let filter = DocumentFilter::new()
            .with_status(DocumentStatus::PickedUp)
            .with_dates(NaiveDate::from_ymd_opt(2026, 3, 1), None)
            .with_name(" acme ");
        assert_eq!(
            api.documents_url(Some(&filter)).as_str(),
            "https://api.example.com/mailbox/documents?status=picked_up&dateFrom=2026-03-01&name=acme"
        );
        assert_eq!(
            api.documents_url(Some(&DocumentFilter::default())).query(),
            None
        );
    }

    #[test]
    fn test_document_action_url_escapes_id() {
        let api = client("https://api.example.com/v1");
        let url = api.document_url(&DocumentId::new("a/b"), Some("notify"));
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v1/mailbox/documents/a%2Fb/notify"
        );
        assert_eq!(
            api.download_url(&DocumentId::new("d1")).as_str(),
            "https://api.example.com/v1/mailbox/documents/d1/download"
        );
    }

    #[test]
    fn test_parse_confirmation_shapes() {
        assert!(parse_confirmation("").unwrap().is_none());
        assert!(parse_confirmation("{}").unwrap().is_none());
        let single = parse_confirmation(r#"{"id":"d1","status":"notified"}"#).unwrap();
        assert_eq!(single.unwrap().id_string().as_deref(), Some("d1"));
        let wrapped = parse_confirmation(r#"{"data":{"_id":7}}"#).unwrap();
        assert_eq!(wrapped.unwrap().id_string().as_deref(), Some("7"));
        assert_err!(parse_confirmation("<html>"));
    }

    #[test]
    fn test_listing_accepts_bare_and_wrapped() {
        let bare: Listing<Room> = serde_json::from_str(r#"[{"id":"r1","name":"Atlas"}]"#).unwrap();
        assert_eq!(bare.into_vec().len(), 1);
        let wrapped: Listing<Service> =
            serde_json::from_str(r#"{"data":[{"id":"s1","name":"Scan","type":"mail-scan"}]}"#)
                .unwrap();
        assert_eq!(wrapped.into_vec()[0].service_type, "mail-scan");
    }

    #[test]
    fn test_read_upload_reports_missing_file() {
        let result = tokio_test::block_on(read_upload(Path::new("/definitely/not/here.pdf")));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let api = ApiClient::new("https://api.example.com", Some("  ".into()), DEFAULT_TIMEOUT).unwrap();
        assert!(api.token.is_none());
    }
}
