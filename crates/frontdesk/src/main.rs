//! `frontdesk` - command-line front desk for the coworking mailroom
//!
//! Drives the header search and the mailbox model against the dashboard backend.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;
mod output;
mod settings;

use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use frontdesk_api::{ApiClient, read_upload};
use frontdesk_core::{
    DocumentFilter, DocumentId, DocumentKind, IntakeRequest, Mailbox, MailboxConfig,
    SearchAggregator, StatusFilter,
};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands, ListArgs, MailCommand, SettingsCommand, UploadArgs};
use settings::Settings;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "frontdesk=info,frontdesk_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let path = cli.config.clone().unwrap_or_else(Settings::default_path);
    let settings = Settings::load(&path)
        .await?
        .with_overrides(|key| std::env::var(key).ok(), cli.api_url.as_deref());
    debug!(base = %settings.api_base_url, "Settings loaded");

    if let Commands::Settings(command) = &cli.command {
        return match command {
            SettingsCommand::Show => {
                println!("{}", serde_json::to_string_pretty(&settings)?);
                Ok(())
            }
            SettingsCommand::Save => settings.save(&path).await,
        };
    }

    let api = Arc::new(
        ApiClient::new(
            &settings.api_base_url,
            settings.api_token.clone(),
            settings.request_timeout(),
        )
        .with_context(|| format!("invalid API base URL {}", settings.api_base_url))?,
    );

    match cli.command {
        Commands::Search {
            query,
            interactive,
            open,
        } => {
            let search = SearchAggregator::standard(
                Arc::clone(&api),
                Arc::clone(&api),
                Arc::clone(&api),
                settings.search_config(),
            );
            if interactive {
                interactive_search(search, settings.search_config().debounce).await
            } else {
                let Some(query) = query else {
                    bail!("a query is required unless --interactive is given");
                };
                one_shot_search(search, &query, open, cli.json).await
            }
        }
        Commands::Mail(command) => mail(api, command, cli.json).await,
        Commands::Settings(_) => Ok(()),
    }
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn one_shot_search(
    search: SearchAggregator,
    query: &str,
    open: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let search = search.with_navigation(tx);

    let Some(results) = search.search_now(query).await else {
        println!("Query too short");
        return Ok(());
    };
    if json {
        print_json(&results)?;
    } else {
        println!("{}", output::search_results(&results).trim_end());
    }

    if let Some(position) = open {
        let Some(chosen) = position.checked_sub(1).and_then(|i| results.get(i)) else {
            bail!("no result at position {position}");
        };
        search.choose(chosen);
        if let Some(target) = rx.recv().await {
            println!("{}", output::navigation(&target));
        }
    }
    Ok(())
}

async fn interactive_search(mut search: SearchAggregator, debounce: Duration) -> anyhow::Result<()> {
    let mut updates = search.subscribe();
    let printer = tokio::spawn(async move {
        let mut was_searching = false;
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            // Only finished runs; a keystroke alone leaves the previous results in place.
            if snapshot.is_searching {
                was_searching = true;
            } else if was_searching {
                was_searching = false;
                println!("> {}", snapshot.query);
                println!("{}", output::search_results(&snapshot.results).trim_end());
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        search.set_query(line);
    }

    // Let the last keystroke's run finish before tearing down.
    tokio::time::sleep(debounce).await;
    let mut settled = search.subscribe();
    if let Err(e) = settled.wait_for(|snapshot| !snapshot.is_searching).await {
        debug!(error = %e, "Search state closed before settling");
    }
    drop(search);
    if let Err(e) = printer.await {
        debug!(error = %e, "Result printer ended abnormally");
    }
    Ok(())
}

fn filter_from(args: &ListArgs) -> anyhow::Result<DocumentFilter> {
    let Some(status) = StatusFilter::parse(&args.status) else {
        bail!("unknown status {:?}", args.status);
    };
    Ok(DocumentFilter {
        status,
        date_from: args.from,
        date_to: args.to,
        name_query: args.name.clone(),
        email_query: args.email.clone(),
    })
}

async fn intake_request(args: &UploadArgs) -> anyhow::Result<IntakeRequest> {
    let (file_name, content) = read_upload(&args.path)
        .await
        .with_context(|| format!("reading {}", args.path.display()))?;
    let mut request = IntakeRequest::new(file_name, content);
    if let Some(title) = &args.title {
        request = request.with_title(title.clone());
    }
    if args.package {
        request = request.with_kind(DocumentKind::Package);
    }
    if let Some(email) = &args.contact_email {
        request = request.with_typed_contact(args.contact_name.clone().unwrap_or_default(), email.clone());
    }
    if let Some(pages) = args.pages {
        request = request.with_page_count(pages);
    }
    Ok(request)
}

async fn mail(api: Arc<ApiClient>, command: MailCommand, json: bool) -> anyhow::Result<()> {
    let mailbox =
        Mailbox::new(Arc::clone(&api), &MailboxConfig::default()).with_links(api.links().clone());

    if let MailCommand::Link { id } = &command {
        println!("{}", api.download_url(&DocumentId::new(id.as_str())));
        return Ok(());
    }
    if let MailCommand::Upload(args) = &command {
        let request = intake_request(args).await?;
        let registered = mailbox.intake(request).await?;
        info!(count = registered.len(), "Intake complete");
        if json {
            return print_json(&registered);
        }
        for doc in &registered {
            println!("{}", output::document(doc));
        }
        return Ok(());
    }

    mailbox.refresh().await?;

    let changed = match command {
        MailCommand::List(args) => {
            mailbox.set_filters(filter_from(&args)?);
            mailbox.set_page(args.page);
            let view = mailbox.view();
            if json {
                return print_json(&view.filtered_page);
            }
            println!("{}", output::page(&view.filtered_page));
            return Ok(());
        }
        MailCommand::Summary => {
            let counts = mailbox.view().summary_counts;
            if json {
                return print_json(&counts);
            }
            println!("{}", output::summary(&counts));
            return Ok(());
        }
        MailCommand::Notify { id } => mailbox.notify(&DocumentId::new(id)).await?,
        MailCommand::Viewed { id } => mailbox.mark_viewed(&DocumentId::new(id)).await?,
        MailCommand::Open { id } => {
            let url = mailbox.open(&DocumentId::new(id)).await?;
            println!("{url}");
            return Ok(());
        }
        MailCommand::Pickup { id, code } => {
            mailbox.redeem_pickup(&DocumentId::new(id), &code).await?
        }
        MailCommand::Assign { id, name, email } => {
            let contact = frontdesk_core::Contact::new(String::new(), name, email);
            mailbox.assign_contact(&DocumentId::new(id), &contact).await?
        }
        MailCommand::Delete { id } => {
            let id = DocumentId::new(id);
            mailbox.delete(&id).await?;
            println!("deleted {id}");
            return Ok(());
        }
        MailCommand::Upload(_) | MailCommand::Link { .. } => return Ok(()),
    };

    if json {
        print_json(&changed)
    } else {
        println!("{}", output::document(&changed));
        Ok(())
    }
}
