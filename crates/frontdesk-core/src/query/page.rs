//! Stable pagination over filtered documents.

use serde::Serialize;

use super::filter::DocumentFilter;
use crate::config::PAGE_SIZE;
use crate::document::Document;

/// One evaluated page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    /// Documents on this page, in registry order.
    pub items: Vec<Document>,
    /// 1-based page index after clamping.
    pub page: usize,
    /// Pages implied by the match count; zero when nothing matches.
    pub total_pages: usize,
    /// Documents matching the filter across all pages.
    pub total_matches: usize,
}

/// Number of pages needed for `matches` items.
#[must_use]
pub const fn total_pages(matches: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    matches.div_ceil(page_size)
}

/// Clamps a 1-based page index to `1..=max(total_pages, 1)`.
#[must_use]
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// Current filter and page selection of a mailbox view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxQuery {
    filter: DocumentFilter,
    page: usize,
    page_size: usize,
}

impl Default for MailboxQuery {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl MailboxQuery {
    /// Starts on page 1 with no filter.
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            filter: DocumentFilter::default(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Active filter.
    #[must_use]
    pub const fn filter(&self) -> &DocumentFilter {
        &self.filter
    }

    /// Requested page, before clamping.
    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    /// Documents per page.
    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Replaces the filter. Any change returns to page 1.
    pub fn set_filter(&mut self, filter: DocumentFilter) {
        if filter != self.filter {
            self.filter = filter;
            self.page = 1;
        }
    }

    /// Selects a page; out-of-range values are clamped on evaluation.
    pub const fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// Filters `docs` and cuts out the selected page.
    ///
    /// Evaluation is pure: the same documents and query always produce the
    /// same page, in the order of `docs`.
    #[must_use]
    pub fn evaluate(&self, docs: &[Document]) -> PageView {
        let matching: Vec<&Document> = docs.iter().filter(|d| self.filter.matches(d)).collect();
        let total_matches = matching.len();
        let total_pages = total_pages(total_matches, self.page_size);
        let page = clamp_page(self.page, total_pages);
        let items = matching
            .into_iter()
            .skip((page - 1) * self.page_size)
            .take(self.page_size)
            .cloned()
            .collect();

        PageView {
            items,
            page,
            total_pages,
            total_matches,
        }
    }

    /// Evaluates and stores the clamped page back into the query.
    pub fn evaluate_and_clamp(&mut self, docs: &[Document]) -> PageView {
        let view = self.evaluate(docs);
        self.page = view.page;
        view
    }
}
