//! # frontdesk-core
//!
//! Core logic for the `Frontdesk` coworking operations dashboard.
//!
//! This crate provides:
//! - **Result sources** - uniform adapters over the tenant directory, room
//!   catalog and service catalog, with settle-all fan-out
//! - **Header search** - debounced, race-guarded aggregation of all sources
//! - **Document registry** - mail and packages normalized from storage payloads
//! - **Lifecycle** - forward-only status transitions and action eligibility
//! - **Query engine** - status/date/text filters with stable pagination
//! - **Mailbox** - the view model and actions a mailbox screen drives
//!
//! No network code lives here; collaborators are traits implemented by
//! `frontdesk-api` (or by fakes in tests).

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod directory;
pub mod document;
mod error;
pub mod lifecycle;
pub mod mailbox;
pub mod query;
pub mod search;
pub mod source;

pub use catalog::{Room, Service};
pub use config::{MailboxConfig, SearchConfig};
pub use directory::{Contact, ContactPage, SortOrder};
pub use document::{
    Document, DocumentId, DocumentKind, DocumentRegistry, DocumentStatus, DownloadLinks,
    PickupCode, RawDocument, SummaryCounts, UploadResponse,
};
pub use error::{Error, Result};
pub use lifecycle::{Action, Eligibility};
pub use mailbox::{DocumentStore, IntakeRequest, Mailbox, MailboxView, ValidationError};
pub use query::{DocumentFilter, MailboxQuery, PageView, StatusFilter};
pub use search::{NavigationTarget, ResultKind, SearchAggregator, SearchResult, SearchSnapshot, Tab};
pub use source::{DirectorySearch, ResultSource, RoomCatalog, ServiceCatalog, settle_all};
