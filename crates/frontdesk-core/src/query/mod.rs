//! Filtering and pagination over the document registry.

mod filter;
mod page;

pub use filter::{DocumentFilter, StatusFilter};
pub use page::{MailboxQuery, PageView, clamp_page, total_pages};
