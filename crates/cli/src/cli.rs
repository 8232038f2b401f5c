use clap::{Parser, Subcommand};

use parkctl_core::capability::RejectPolicy;
use parkctl_core::catalog::StatusFilter;
use parkctl_core::types::ListingId;

use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "parkctl")]
#[command(version, about = "Parking listing approval console")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend API base URL
    #[arg(long, global = true, env = "PARKCTL_API_BASE")]
    pub api_base: Option<String>,

    /// Bearer token sent with every request
    #[arg(long, global = true, env = "PARKCTL_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Whether rejecting a listing may fall back to deleting it
    #[arg(long, global = true, env = "PARKCTL_REJECT_POLICY", default_value = "allow-delete-fallback")]
    pub reject_policy: RejectPolicy,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List listings and approval requests
    List {
        /// all, pending, active, suspended or rejected
        #[arg(long, default_value = "all")]
        status: StatusFilter,

        /// Case-insensitive match on name, address or owner
        #[arg(long)]
        search: Option<String>,
    },

    /// Show per-status counts
    Summary,

    /// Approve a listing or approval request
    Approve {
        /// Listing id (`12`) or approval request id (`req-7`)
        id: ListingId,
    },

    /// Reject a listing or approval request
    Reject {
        id: ListingId,

        /// Reason sent to the backend
        #[arg(long)]
        reason: Option<String>,
    },

    /// Suspend an active listing or reactivate a suspended one
    Toggle { id: ListingId },
}
