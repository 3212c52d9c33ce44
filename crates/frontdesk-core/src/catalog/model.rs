//! Room and service catalog models.

use serde::{Deserialize, Serialize};

/// A bookable room or location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Catalog identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short location code (e.g. `"BER-2-14"`).
    #[serde(default)]
    pub code: String,
}

/// A service or automation offered at a center.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Catalog identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Service category (e.g. `"mail-scan"`, `"reminder"`).
    #[serde(rename = "type", default)]
    pub service_type: String,
    /// Center the service belongs to.
    #[serde(default)]
    pub center_code: String,
}

/// Case-insensitive substring match on a catalog name.
#[must_use]
pub fn name_matches(name: &str, query: &str) -> bool {
    name.to_lowercase().contains(&query.trim().to_lowercase())
}
