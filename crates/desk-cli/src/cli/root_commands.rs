use clap::{Args, Subcommand};

use crate::cli::subcommands::{NotifyCommands, ReportCommands, StockCommands, UserCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Create `.shopdesk/` with a config and an empty database.
    Init(InitArgs),
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// User accounts.
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
    /// Reports.
    Report {
        #[command(subcommand)]
        action: ReportCommands,
    },
    /// Inventory levels.
    Stock {
        #[command(subcommand)]
        action: StockCommands,
    },
    /// Notification feed.
    Notify {
        #[command(subcommand)]
        action: NotifyCommands,
    },
}

#[derive(Clone, Debug, Args)]
pub struct InitArgs {
    /// Shop name shown in reports.
    #[arg(long)]
    pub name: Option<String>,

    /// Overwrite an existing config (generates a new signing secret).
    #[arg(long)]
    pub force: bool,
}

#[derive(Clone, Debug, Args)]
pub struct ServeArgs {
    /// Listen address, overriding `server.listen`.
    #[arg(long)]
    pub listen: Option<String>,
}
