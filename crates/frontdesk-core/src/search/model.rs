//! Search result models.

use serde::{Deserialize, Serialize};

use crate::catalog::{Room, Service};
use crate::directory::Contact;

/// The entity a search result points at.
///
/// Variant order is source precedence when results are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    /// A tenant from the contact directory.
    Tenant,
    /// A room or location.
    Room,
    /// A service or automation.
    Automation,
}

impl ResultKind {
    /// Human-readable name of the source that yields this kind.
    #[must_use]
    pub const fn source_name(&self) -> &'static str {
        match self {
            Self::Tenant => "tenant directory",
            Self::Room => "room catalog",
            Self::Automation => "service catalog",
        }
    }

    /// Dashboard tab that owns this kind of entity.
    #[must_use]
    pub const fn tab(&self) -> Tab {
        match self {
            Self::Tenant => Tab::Contacts,
            Self::Room => Tab::Bookings,
            Self::Automation => Tab::Services,
        }
    }

    /// Lowercase label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tenant => "tenant",
            Self::Room => "room",
            Self::Automation => "automation",
        }
    }
}

impl std::fmt::Display for ResultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dashboard tabs a search selection can switch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tab {
    /// Tenant contacts.
    Contacts,
    /// Rooms and bookings.
    Bookings,
    /// Services and automations.
    Services,
}

/// A single cross-entity search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SearchResult {
    /// Tenant/contact hit.
    Tenant {
        /// Directory id.
        id: String,
        /// Contact name.
        name: String,
        /// Contact email.
        email: String,
    },
    /// Room/location hit.
    Room {
        /// Catalog id.
        id: String,
        /// Room name.
        name: String,
        /// Location code.
        code: String,
    },
    /// Service/automation hit.
    Automation {
        /// Catalog id.
        id: String,
        /// Service name.
        name: String,
        /// Service category.
        service_type: String,
        /// Owning center.
        center_code: String,
    },
}

impl SearchResult {
    /// Kind tag of this result.
    #[must_use]
    pub const fn kind(&self) -> ResultKind {
        match self {
            Self::Tenant { .. } => ResultKind::Tenant,
            Self::Room { .. } => ResultKind::Room,
            Self::Automation { .. } => ResultKind::Automation,
        }
    }

    /// Id within the result's kind.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Tenant { id, .. } | Self::Room { id, .. } | Self::Automation { id, .. } => id,
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Tenant { name, .. } | Self::Room { name, .. } | Self::Automation { name, .. } => {
                name
            }
        }
    }

    /// Where selecting this result should navigate.
    #[must_use]
    pub fn target(&self) -> NavigationTarget {
        NavigationTarget {
            kind: self.kind(),
            id: self.id().to_string(),
            tab: self.kind().tab(),
        }
    }
}

impl From<Contact> for SearchResult {
    fn from(contact: Contact) -> Self {
        Self::Tenant {
            id: contact.id,
            name: contact.name,
            email: contact.email,
        }
    }
}

impl From<Room> for SearchResult {
    fn from(room: Room) -> Self {
        Self::Room {
            id: room.id,
            name: room.name,
            code: room.code,
        }
    }
}

impl From<Service> for SearchResult {
    fn from(service: Service) -> Self {
        Self::Automation {
            id: service.id,
            name: service.name,
            service_type: service.service_type,
            center_code: service.center_code,
        }
    }
}

/// Message sent to the owning container when a result is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationTarget {
    /// Kind of the chosen entity.
    pub kind: ResultKind,
    /// Id of the chosen entity, forwarded to the tab as a parameter.
    pub id: String,
    /// Tab to activate.
    pub tab: Tab,
}

/// State handed to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSnapshot {
    /// Latest query text as typed.
    pub query: String,
    /// Committed results for the latest query.
    pub results: Vec<SearchResult>,
    /// Whether the run for the latest query is still outstanding.
    pub is_searching: bool,
    pub(crate) generation: u64,
}

impl SearchSnapshot {
    /// Sequence number of the latest issued query.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}
