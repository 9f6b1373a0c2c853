use clap::{Args, Subcommand};

#[derive(Clone, Debug, Subcommand)]
pub enum NotifyCommands {
    /// Most recent notifications.
    List,
    /// Post a notification to the shared feed.
    Send(NotifySendArgs),
}

#[derive(Clone, Debug, Args)]
pub struct NotifySendArgs {
    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub message: String,

    /// info, warning, success or error.
    #[arg(long, default_value = "info")]
    pub kind: String,
}
