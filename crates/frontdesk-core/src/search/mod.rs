//! Global header search.
//!
//! A query typed into the header fans out to the tenant directory, the room
//! catalog, and the service catalog. Results are merged in that order,
//! de-duplicated, and capped. See [`SearchAggregator`] for the debounce and
//! staleness rules.

mod aggregator;
mod model;

pub use aggregator::SearchAggregator;
pub use model::{NavigationTarget, ResultKind, SearchResult, SearchSnapshot, Tab};
