//! Download links for stored documents.

use url::Url;

use super::model::DocumentId;
use crate::{Error, Result};

/// Builds download URLs under a storage base URL. Pure; performs no I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLinks {
    base: Url,
}

impl DownloadLinks {
    /// Creates a resolver rooted at `base` (e.g. `https://api.example.com/v1/`).
    ///
    /// # Errors
    ///
    /// Returns an error if `base` cannot carry a path (e.g. `mailto:`).
    pub fn new(base: Url) -> Result<Self> {
        if base.cannot_be_a_base() {
            return Err(Error::Config(format!("{base} cannot be used as a base URL")));
        }
        Ok(Self { base })
    }

    /// URL that downloads the stored file for `id`.
    #[must_use]
    pub fn resolve_download_url(&self, id: &DocumentId) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["mailbox", "documents", id.as_str(), "download"]);
        }
        url
    }
}
