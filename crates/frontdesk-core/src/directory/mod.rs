//! Tenant directory lookups used for search and contact backfill.

mod model;

pub use model::{Contact, ContactPage, SortOrder};
