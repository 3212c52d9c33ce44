//! # frontdesk-api
//!
//! HTTP implementations of the collaborators the frontdesk core depends on.
//!
//! ## Features
//!
//! - **Directory search**: `GET contacts?search=..&pageSize=..&sort=..`
//! - **Catalogs**: `GET rooms` and `GET services`, bare or wrapped listings
//! - **Mailbox storage**: listing, multipart upload, status actions, delete
//! - **Download links**: resolved locally, no request made
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use frontdesk_api::{ApiClient, DEFAULT_TIMEOUT};
//! use frontdesk_core::{Mailbox, MailboxConfig};
//!
//! let api = Arc::new(ApiClient::new("https://api.example.com/v1", Some(token), DEFAULT_TIMEOUT)?);
//! let mailbox = Mailbox::new(Arc::clone(&api), &MailboxConfig::default());
//! mailbox.refresh().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod client;
mod error;

pub use client::{ApiClient, DEFAULT_TIMEOUT, parse_confirmation, read_upload};
pub use error::{Error, Result};
