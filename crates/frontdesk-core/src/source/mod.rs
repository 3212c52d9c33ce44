//! Result source adapters.
//!
//! Collaborator traits describe the external endpoints (directory, room
//! catalog, service catalog). [`ResultSource`] gives the search aggregator one
//! uniform contract over all of them, and [`settle_all`] runs any number of
//! sources concurrently, collecting every outcome without letting one failure
//! cancel the rest.

mod adapter;

pub use adapter::{
    DirectorySearch, DirectorySource, ResultSource, RoomCatalog, RoomSource, ServiceCatalog,
    ServiceSource, SourceOutcome, settle_all,
};
