//! CLI command definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Front desk for the coworking mailroom and header search
#[derive(Parser, Debug)]
#[command(name = "frontdesk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the settings file (default: <config dir>/frontdesk/settings.json)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, overriding settings and environment
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search tenants, rooms and services
    Search {
        /// Search text; omit with --interactive
        query: Option<String>,

        /// Read queries line by line from stdin, debounced
        #[arg(short, long)]
        interactive: bool,

        /// Choose the result at this position (1-based) and print its navigation target
        #[arg(long)]
        open: Option<usize>,
    },

    /// Mailbox administration
    #[command(subcommand)]
    Mail(MailCommand),

    /// Show or write the effective settings
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Subcommand, Debug)]
pub enum MailCommand {
    /// List documents, filtered and paginated
    List(ListArgs),

    /// Show counts per status and kind
    Summary,

    /// Send (or resend) the arrival notification
    Notify {
        /// Document id
        id: String,
    },

    /// Mark a notified letter as viewed
    Viewed {
        /// Document id
        id: String,
    },

    /// Hand out a package against its pickup code
    Pickup {
        /// Document id
        id: String,
        /// Code presented by the tenant
        code: String,
    },

    /// Assign a recipient to a document
    Assign {
        /// Document id
        id: String,
        /// Recipient name
        #[arg(long)]
        name: String,
        /// Recipient email
        #[arg(long)]
        email: String,
    },

    /// Delete a document
    Delete {
        /// Document id
        id: String,
    },

    /// Register a scanned letter or a package
    Upload(UploadArgs),

    /// Open a document: print its download URL and mark notified mail viewed
    Open {
        /// Document id
        id: String,
    },

    /// Print the download URL of a document
    Link {
        /// Document id
        id: String,
    },
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Status (`all`, `new`, `notified`, `viewed`, `picked_up`)
    #[arg(long, default_value = "all")]
    pub status: String,

    /// First day of the intake range (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day of the intake range (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Substring of the recipient name or title
    #[arg(long, default_value = "")]
    pub name: String,

    /// Substring of the recipient email
    #[arg(long, default_value = "")]
    pub email: String,

    /// Page to show (1-based; clamped to the available pages)
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,
}

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// File to upload
    pub path: PathBuf,

    /// Title (defaults to the file name)
    #[arg(long)]
    pub title: Option<String>,

    /// Register a package instead of a letter
    #[arg(long)]
    pub package: bool,

    /// Recipient name
    #[arg(long, requires = "contact_email")]
    pub contact_name: Option<String>,

    /// Recipient email
    #[arg(long)]
    pub contact_email: Option<String>,

    /// Number of scanned pages
    #[arg(long)]
    pub pages: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Print the effective settings
    Show,
    /// Write the effective settings to the settings file
    Save,
}
