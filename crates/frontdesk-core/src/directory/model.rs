//! Tenant directory models.

use serde::{Deserialize, Deserializer, Serialize};

/// A tenant contact returned by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Directory identifier. Numeric ids are kept in their decimal form.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Display name (may be empty).
    #[serde(default)]
    pub name: String,
    /// Email address (may be empty).
    #[serde(default)]
    pub email: String,
}

impl Contact {
    /// Creates a new contact.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
        }
    }

    /// Returns a display string for the contact.
    ///
    /// If a name is present, returns "Name <email>", otherwise just "email".
    #[must_use]
    pub fn display(&self) -> String {
        if self.name.is_empty() {
            self.email.clone()
        } else if self.email.is_empty() {
            self.name.clone()
        } else {
            format!("{} <{}>", self.name, self.email)
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

/// Sort order requested from the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Alphabetical by name.
    #[default]
    NameAsc,
    /// Reverse alphabetical by name.
    NameDesc,
    /// Most recently created first.
    Newest,
}

impl SortOrder {
    /// Query-string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NameAsc => "name_asc",
            Self::NameDesc => "name_desc",
            Self::Newest => "newest",
        }
    }
}

/// One page of directory search results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPage {
    /// Matching contacts.
    #[serde(default)]
    pub items: Vec<Contact>,
}
