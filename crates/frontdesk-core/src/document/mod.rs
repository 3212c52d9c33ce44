//! Mail and package documents.
//!
//! - [`Document`] and its status/kind types
//! - [`RawDocument`] storage payloads and [`normalize`]
//! - [`DocumentRegistry`], the in-memory owner of all documents
//! - [`DownloadLinks`] for file download URLs

mod codes;
mod link;
mod model;
mod raw;
mod registry;

pub use codes::CodeIssuer;
pub use link::DownloadLinks;
pub use model::{Document, DocumentId, DocumentKind, DocumentStatus, PickupCode};
pub use raw::{OneOrMany, RawDocument, UploadResponse, normalize};
pub use registry::{DocumentRegistry, RefreshTicket, SummaryCounts};
