//! Document lifecycle state machine.
//!
//! Transitions are forward-only. A refused transition returns
//! [`Error::InvalidTransition`] and leaves the document untouched.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::document::{Document, DocumentKind, DocumentStatus};
use crate::error::{Error, Result};

/// A user-triggered lifecycle action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Tell the recipient the document arrived.
    Notify,
    /// Record that the recipient opened the document.
    MarkViewed,
    /// Release a package against its pickup code.
    RedeemPickup,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Notify => "notify",
            Self::MarkViewed => "mark as viewed",
            Self::RedeemPickup => "redeem pickup for",
        })
    }
}

fn refuse(doc: &Document, action: Action, reason: &'static str) -> Error {
    Error::InvalidTransition {
        id: doc.id.clone(),
        status: doc.status,
        action,
        reason,
    }
}

/// Checks whether `action` may run against `doc` right now.
///
/// # Errors
///
/// Returns `InvalidTransition` naming the failed precondition.
fn check(doc: &Document, action: Action) -> Result<()> {
    match (action, doc.status) {
        (Action::Notify, DocumentStatus::New | DocumentStatus::Notified) => Ok(()),
        (Action::Notify, _) => Err(refuse(doc, action, "already past notification")),
        (Action::MarkViewed, _) if doc.kind == DocumentKind::Package => {
            Err(refuse(doc, action, "packages are redeemed, not viewed"))
        }
        (Action::MarkViewed, DocumentStatus::Notified) => Ok(()),
        (Action::MarkViewed, DocumentStatus::New) => {
            Err(refuse(doc, action, "recipient has not been notified"))
        }
        (Action::MarkViewed, _) => Err(refuse(doc, action, "already viewed")),
        (Action::RedeemPickup, _) if doc.kind != DocumentKind::Package => {
            Err(refuse(doc, action, "only packages can be picked up"))
        }
        (Action::RedeemPickup, DocumentStatus::PickedUp) => {
            Err(refuse(doc, action, "already picked up"))
        }
        (Action::RedeemPickup, _) => Ok(()),
    }
}

/// Returns `true` if `action` would currently be accepted for `doc`.
///
/// Pickup redemption still needs a matching code on top of this.
#[must_use]
pub fn can_apply(doc: &Document, action: Action) -> bool {
    check(doc, action).is_ok()
}

/// Notifies the recipient.
///
/// `New` moves to `Notified`. A repeat notification on `Notified` refreshes
/// `last_notified_at` and bumps the notification count.
///
/// # Errors
///
/// Returns `InvalidTransition` once the document is `Viewed` or `PickedUp`.
pub fn notify(doc: &mut Document, now: DateTime<Utc>) -> Result<()> {
    check(doc, Action::Notify)?;
    let repeat = doc.status == DocumentStatus::Notified;
    doc.status = DocumentStatus::Notified;
    doc.last_notified_at = Some(now);
    doc.notification_count = doc.notification_count.saturating_add(1);
    debug!(id = %doc.id, repeat, count = doc.notification_count, "Document notified");
    Ok(())
}

/// Marks a notified mail document as viewed.
///
/// # Errors
///
/// Returns `InvalidTransition` for packages and for documents that are not
/// `Notified`.
pub fn mark_viewed(doc: &mut Document) -> Result<()> {
    check(doc, Action::MarkViewed)?;
    doc.status = DocumentStatus::Viewed;
    debug!(id = %doc.id, "Document viewed");
    Ok(())
}

/// Redeems a package with the code the recipient presented.
///
/// # Errors
///
/// Returns `InvalidTransition` for mail, for packages already picked up, and
/// when `presented` does not match the pickup code.
pub fn redeem_pickup(doc: &mut Document, presented: &str) -> Result<()> {
    check(doc, Action::RedeemPickup)?;
    let matches = doc
        .pickup_code
        .as_ref()
        .is_some_and(|code| code.matches(presented));
    if !matches {
        return Err(refuse(doc, Action::RedeemPickup, "pickup code does not match"));
    }
    doc.status = DocumentStatus::PickedUp;
    debug!(id = %doc.id, "Package picked up");
    Ok(())
}

/// Which actions a presentation layer should offer for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Eligibility {
    /// Notify (or re-notify) is accepted.
    pub notify: bool,
    /// Mark-viewed is accepted.
    pub mark_viewed: bool,
    /// The pickup code may be shown and redeemed.
    pub show_pickup_code: bool,
}

/// Derives action eligibility from the document's current state.
#[must_use]
pub fn eligibility(doc: &Document) -> Eligibility {
    Eligibility {
        notify: can_apply(doc, Action::Notify),
        mark_viewed: can_apply(doc, Action::MarkViewed),
        show_pickup_code: doc.pickup_code.is_some() && can_apply(doc, Action::RedeemPickup),
    }
}
