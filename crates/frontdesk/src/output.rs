//! Plain-text rendering of core views.

use std::fmt::Write;

use frontdesk_core::{Document, DocumentKind, NavigationTarget, PageView, SearchResult, SummaryCounts};

/// One line per search result, numbered from 1.
pub fn search_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No results".to_string();
    }
    let mut out = String::new();
    for (i, result) in results.iter().enumerate() {
        let detail = match result {
            SearchResult::Tenant { email, .. } => email.as_str(),
            SearchResult::Room { code, .. } => code.as_str(),
            SearchResult::Automation { service_type, .. } => service_type.as_str(),
        };
        let _ = writeln!(
            out,
            "{:>2}. [{}] {} ({detail})",
            i + 1,
            result.kind(),
            result.name()
        );
    }
    out
}

/// Where a chosen result leads.
pub fn navigation(target: &NavigationTarget) -> String {
    format!("open {:?} tab with {} {}", target.tab, target.kind, target.id)
}

/// A single document line.
pub fn document(doc: &Document) -> String {
    let recipient = match (&doc.contact_name, &doc.contact_email) {
        (Some(name), Some(email)) => format!("{name} <{email}>"),
        (Some(name), None) => name.clone(),
        (None, Some(email)) => email.clone(),
        (None, None) => "unassigned".to_string(),
    };
    let mut line = format!(
        "{:<12} {:<7} {:<9} {} {} - {recipient}",
        doc.id().as_str(),
        doc.kind().as_str(),
        doc.status().as_str(),
        doc.received_at().format("%Y-%m-%d"),
        doc.title,
    );
    if doc.kind() == DocumentKind::Package
        && let Some(code) = doc.pickup_code()
    {
        let _ = write!(line, " [code {}]", code.as_str());
    }
    if doc.notification_count() > 1 {
        let _ = write!(line, " (notified {}x)", doc.notification_count());
    }
    line
}

/// A page of documents with its position.
pub fn page(view: &PageView) -> String {
    let mut out = String::new();
    for doc in &view.items {
        out.push_str(&document(doc));
        out.push('\n');
    }
    let _ = write!(
        out,
        "page {} of {} ({} matching)",
        view.page,
        view.total_pages.max(1),
        view.total_matches
    );
    out
}

/// Registry counts.
pub fn summary(counts: &SummaryCounts) -> String {
    format!(
        "total {}\n  new {}\n  notified {}\n  viewed {}\n  picked up {}\nmail {}, packages {} ({} awaiting pickup)",
        counts.total,
        counts.new,
        counts.notified,
        counts.viewed,
        counts.picked_up,
        counts.mail,
        counts.packages,
        counts.awaiting_pickup,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use frontdesk_core::{ResultKind, Tab};

    use super::*;

    #[test]
    fn test_search_results_are_numbered() {
        let results = vec![
            SearchResult::Tenant {
                id: "t1".into(),
                name: "Ada Lovelace".into(),
                email: "ada@example.com".into(),
            },
            SearchResult::Room {
                id: "r1".into(),
                name: "Atlas".into(),
                code: "BER-2-14".into(),
            },
        ];
        let text = search_results(&results);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(" 1."));
        assert!(lines[0].contains("Ada Lovelace (ada@example.com)"));
        assert!(lines[1].contains("Atlas (BER-2-14)"));
        assert_eq!(search_results(&[]), "No results");
    }

    #[test]
    fn test_document_line_shows_recipient() {
        let at = Utc.with_ymd_and_hms(2026, 3, 4, 9, 0, 0).unwrap();
        let doc = Document::mail("m1", "Tax notice", at).with_contact("Ada", "ada@example.com");
        let line = document(&doc);
        assert!(line.contains("2026-03-04 Tax notice - Ada <ada@example.com>"));
        let bare = Document::mail("m2", "Flyer", at);
        assert!(document(&bare).ends_with("- unassigned"));
    }

    #[test]
    fn test_navigation_names_tab() {
        let target = NavigationTarget {
            kind: ResultKind::Room,
            id: "r2".into(),
            tab: Tab::Bookings,
        };
        assert_eq!(navigation(&target), "open Bookings tab with room r2");
    }

    #[test]
    fn test_empty_page_reports_page_one() {
        let view = PageView {
            items: Vec::new(),
            page: 1,
            total_pages: 0,
            total_matches: 0,
        };
        assert_eq!(page(&view), "page 1 of 1 (0 matching)");
    }
}
