use anyhow::Result;
use serde::Serialize;

use parkctl_core::catalog::{ListingFilter, StatusFilter, StatusSummary};
use parkctl_core::listing::CanonicalListing;
use parkctl_core::status::Intent;
use parkctl_core::types::ListingId;
use parkctl_engine::{ActionOutcome, AdminConsole, DispatchAck};
use parkctl_store::ListingStore;

use crate::cli::Commands;
use crate::output::json::print_json;
use crate::output::table::{listings_table, summary_table};
use crate::output::OutputFormat;

/// JSON shape of an action result.
#[derive(Serialize)]
struct ActionReport<'a> {
    ack: &'a DispatchAck,
    listing: Option<&'a CanonicalListing>,
}

pub async fn run<S: ListingStore>(console: &AdminConsole<S>, command: Commands, format: OutputFormat) -> Result<()> {
    match command {
        Commands::List { status, search } => list(console, status, search, format).await,
        Commands::Summary => summary(console, format).await,
        Commands::Approve { id } => act(console, id, Intent::Approve, None, format).await,
        Commands::Reject { id, reason } => {
            act(console, id, Intent::Reject, reason.as_deref(), format).await
        }
        Commands::Toggle { id } => act(console, id, Intent::ToggleActivation, None, format).await,
    }
}

async fn list<S: ListingStore>(
    console: &AdminConsole<S>,
    status: StatusFilter,
    search: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let listings = console.refresh().await?;
    let filter = ListingFilter::new(status, search.unwrap_or_default());
    let shown = filter.apply(&listings);

    if format.is_json() {
        return print_json(&shown);
    }

    if shown.is_empty() {
        println!("No listings match.");
        return Ok(());
    }
    println!("{}", listings_table(shown));
    Ok(())
}

async fn summary<S: ListingStore>(console: &AdminConsole<S>, format: OutputFormat) -> Result<()> {
    let listings = console.refresh().await?;
    let summary = StatusSummary::of(&listings);

    if format.is_json() {
        return print_json(&summary);
    }
    println!("{}", summary_table(&summary));
    Ok(())
}

async fn act<S: ListingStore>(
    console: &AdminConsole<S>,
    id: ListingId,
    intent: Intent,
    reason: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let ActionOutcome { ack, listings } = console.perform_by_id(id, intent, reason).await?;
    let listing = listings
        .as_deref()
        .and_then(|all| all.iter().find(|l| l.id == id));

    if format.is_json() {
        return print_json(&ActionReport { ack: &ack, listing });
    }

    println!("{}", describe(&ack));
    match (listings.is_some(), listing) {
        (_, Some(listing)) => println!("{}", listings_table([listing])),
        (true, None) => println!("Listing {id} is no longer in the listing set."),
        (false, None) => println!("Refresh failed; run `parkctl list` to see the current state."),
    }
    Ok(())
}

fn describe(ack: &DispatchAck) -> String {
    let mut line = format!(
        "{} {}: done via {} ({} attempt(s))",
        ack.intent, ack.listing_id, ack.operation, ack.attempts
    );
    if let Some(reason) = &ack.recorded_reason {
        line.push_str(&format!("; listing deleted, reason kept locally: {reason}"));
    }
    line
}
