//! Mailbox administration: intake, storage and the exposed view model.

mod intake;
mod service;
mod store;

pub use intake::{IntakeRequest, UploadMetadata, ValidationError, ValidationResult, validate_intake};
pub use service::{Mailbox, MailboxView};
pub use store::DocumentStore;
