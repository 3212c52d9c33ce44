//! Room/location and service/automation catalogs.
//!
//! Both catalogs are listed in full and filtered client-side.

mod model;

pub use model::{Room, Service, name_matches};
