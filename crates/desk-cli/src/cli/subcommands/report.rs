use clap::Subcommand;

#[derive(Clone, Debug, Subcommand)]
pub enum ReportCommands {
    /// Revenue, expenses, and profit totals.
    Finance,
}
